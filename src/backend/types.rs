use thiserror::Error;

/// Any failure talking to the recipe backend. Callers treat every kind the same way;
/// the split only exists to make log lines useful.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {detail}")]
    Server { status: u16, detail: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            BackendError::InvalidResponse(e.to_string())
        } else {
            BackendError::Network(e.to_string())
        }
    }
}
