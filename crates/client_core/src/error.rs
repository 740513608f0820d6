use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Server error: {message}")]
    Server { status: u16, message: String },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("server answered HTTP {status} with an unreadable body: {source}")]
    UnreadableBody {
        status: u16,
        source: serde_json::Error,
    },
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),
}
