//! `Transport` backed by `eventsource-client`.

use crate::connection::{Connection, Transport};
use crate::error::Error;
use domain::gateway::stream_url;
use domain::StreamEvent;
use eventsource_client::{self as es, Client};
use futures_util::stream::StreamExt;
use log::*;
use service::config::Config;
use std::time::Duration;
use tokio::sync::mpsc;

/// Opens `{api_url}/sse/{channel}` streams.
///
/// Reconnection is entirely the client library's business: after a failure it
/// reports `Closed`, and once items flow again after a reconnect it reports
/// `Opened` before the next message.
pub struct EventSourceTransport {
    base_url: String,
    reconnect: bool,
    reconnect_delay: Duration,
    reconnect_delay_max: Duration,
}

impl EventSourceTransport {
    pub fn new(config: &Config) -> Self {
        Self {
            base_url: config.api_base_url().to_string(),
            reconnect: config.sse_reconnect,
            reconnect_delay: config.sse_reconnect_delay(),
            reconnect_delay_max: config.sse_reconnect_delay_max(),
        }
    }

    fn reconnect_options(&self) -> es::ReconnectOptions {
        es::ReconnectOptions::reconnect(self.reconnect)
            .retry_initial(false)
            .delay(self.reconnect_delay)
            .backoff_factor(2)
            .delay_max(self.reconnect_delay_max)
            .build()
    }
}

impl Transport for EventSourceTransport {
    fn open(&self, channel: &str) -> Result<Connection, Error> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| Error::Transport(e.to_string()))?;

        let url = stream_url(&self.base_url, channel);

        let client = es::ClientBuilder::for_url(&url)
            .map_err(|e| Error::InvalidUrl(format!("{url}: {e:?}")))?
            .reconnect(self.reconnect_options())
            .build();

        let (tx, rx) = mpsc::unbounded_channel();
        let label = channel.to_string();

        debug!("Opening status stream {url}");

        let task = runtime.spawn(async move {
            let mut stream = client.stream();
            let mut live = false;

            loop {
                let data = match stream.next().await {
                    Some(Ok(es::SSE::Event(event))) => Some(event.data),
                    Some(Ok(es::SSE::Comment(_))) => {
                        // Keep-alive; only proves the stream is up
                        None
                    }
                    Some(Err(e)) => {
                        warn!("Status stream error for channel {}: {:?}", label, e);
                        live = false;
                        if tx.send(StreamEvent::Closed).is_err() {
                            break;
                        }
                        continue;
                    }
                    None => {
                        debug!("Status stream ended for channel {}", label);
                        let _ = tx.send(StreamEvent::Closed);
                        break;
                    }
                };

                if !live {
                    live = true;
                    if tx.send(StreamEvent::Opened).is_err() {
                        break;
                    }
                }

                if let Some(data) = data {
                    trace!("Status stream message for channel {}: {}", label, data);
                    if tx.send(StreamEvent::Message(data)).is_err() {
                        debug!("Status stream receiver dropped for channel {}", label);
                        break;
                    }
                }
            }
        });

        Ok(Connection::new(channel.to_string(), rx, Some(task)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config(args: &[&str]) -> Config {
        let mut argv = vec!["hospital_match"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn transport_takes_settings_from_config() {
        let transport = EventSourceTransport::new(&config(&[
            "--api-url",
            "http://localhost:8080/",
            "--sse-reconnect",
            "false",
            "--sse-reconnect-delay-ms",
            "250",
        ]));

        assert_eq!(transport.base_url, "http://localhost:8080");
        assert!(!transport.reconnect);
        assert_eq!(transport.reconnect_delay, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn unparseable_base_url_is_rejected() {
        let transport = EventSourceTransport::new(&config(&["--api-url", "http://bad host"]));

        let result = transport.open("channel-1");

        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn opening_outside_a_runtime_is_an_error() {
        let transport = EventSourceTransport::new(&config(&["--api-url", "http://localhost:8080"]));

        let result = transport.open("channel-1");

        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn refused_connection_reports_closed() {
        let transport = EventSourceTransport::new(&config(&[
            "--api-url",
            "http://127.0.0.1:9",
            "--sse-reconnect",
            "false",
        ]));

        let mut connection = transport.open("channel-1").unwrap();
        let first = tokio::time::timeout(Duration::from_secs(5), connection.recv())
            .await
            .unwrap();

        assert_eq!(first, Some(StreamEvent::Closed));
    }
}
