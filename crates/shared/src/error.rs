use serde::{Deserialize, Serialize};

/// Error body returned by every backend route: `{ "error": "...", "stderr": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            stderr: None,
        }
    }

    pub fn with_stderr(error: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            stderr: Some(stderr.into()),
        }
    }
}
