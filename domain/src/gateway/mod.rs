//! Clients for the external matching backend.

pub mod matching;

/// URL of the status stream for `channel`, resolved against the backend base URL.
/// The channel is percent-encoded so any backend-assigned identifier is a single path segment.
pub fn stream_url(base_url: &str, channel: &str) -> String {
    format!(
        "{}/sse/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(channel)
    )
}
