use clap::builder::TypedValueParser as _;
use clap::Parser;
use log::LevelFilter;
use std::time::Duration;

/// Default timeout for requests to the matching backend.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Base URL of the matching backend (e.g. https://api.example.com). Both the
    /// session-start endpoint and the status stream are resolved against it.
    #[arg(long, env)]
    api_url: String,

    /// Timeout in seconds for requests to the matching backend
    #[arg(long, env, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,

    /// Let the stream transport reconnect after a dropped connection. The status
    /// reconciler itself never retries; it only observes the stream going up and down.
    #[arg(long, env, default_value_t = true, action = clap::ArgAction::Set)]
    pub sse_reconnect: bool,

    /// Initial delay in milliseconds before the transport reconnects
    #[arg(long, env, default_value_t = 1000)]
    pub sse_reconnect_delay_ms: u64,

    /// Upper bound in milliseconds for the transport's reconnect delay
    #[arg(long, env, default_value_t = 30_000)]
    pub sse_reconnect_delay_max_ms: u64,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Config {
    /// The backend base URL without a trailing slash, ready for path joining.
    pub fn api_base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn sse_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.sse_reconnect_delay_ms)
    }

    pub fn sse_reconnect_delay_max(&self) -> Duration {
        Duration::from_millis(self.sse_reconnect_delay_max_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["hospital_match"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn api_base_url_strips_trailing_slash() {
        let config = parse(&["--api-url", "http://localhost:8080/"]);
        assert_eq!(config.api_base_url(), "http://localhost:8080");
    }

    #[test]
    fn api_base_url_without_trailing_slash_is_unchanged() {
        let config = parse(&["--api-url", "https://api.example.com/v1"]);
        assert_eq!(config.api_base_url(), "https://api.example.com/v1");
    }

    #[test]
    fn defaults_apply_when_only_api_url_is_given() {
        let config = parse(&["--api-url", "http://localhost"]);

        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.sse_reconnect);
        assert_eq!(config.sse_reconnect_delay(), Duration::from_millis(1000));
        assert_eq!(config.sse_reconnect_delay_max(), Duration::from_secs(30));
        assert_eq!(config.log_level_filter, LevelFilter::Info);
    }

    #[test]
    fn reconnect_can_be_disabled() {
        let config = parse(&["--api-url", "http://localhost", "--sse-reconnect", "false"]);
        assert!(!config.sse_reconnect);
    }

    #[test]
    fn log_level_accepts_upper_case_names() {
        let config = parse(&["--api-url", "http://localhost", "--log-level-filter", "DEBUG"]);
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
    }
}
