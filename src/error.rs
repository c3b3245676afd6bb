use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("malformed URL '{0}'")]
    MalformedUrl(String),

    #[error("HTTP response {status} for {url}")]
    Unreachable { url: String, status: StatusCode },

    #[error("URL is not 'text/html' ({content_type}) for {url}")]
    UnsupportedContentType { url: String, content_type: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("invalid denylist file: {0}")]
    Denylist(#[from] serde_json::Error),
}
