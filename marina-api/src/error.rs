/// Message used when a failed response carries no usable `message` field.
pub const FALLBACK_MESSAGE: &str = "API request failed";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Request body could not be encoded: {0}")]
    Encode(String),
}

impl ApiError {
    /// Build the error for a non-2xx response from its raw body.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
        ApiError::Status { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
