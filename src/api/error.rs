use thiserror::Error;

/// Shown when the server fails without saying why
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Unable to fetch the result right now. Please try again.";

/// Failures talking to the results API.
///
/// "No result for these credentials" is not an error; see
/// [`LookupOutcome::NotFound`](super::types::LookupOutcome::NotFound).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Could not reach the results server: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Server returned {status}{}", .message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default())]
    Server { status: u16, message: Option<String> },

    #[error("Unexpected response from server: {0}")]
    Decode(String),

    #[error("Invalid API configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Text to show the person who made the request. The server's own message
    /// wins when there is one.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Transport(_) => {
                "Could not reach the results server. Check your connection and try again."
                    .to_string()
            }
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Server { status: 401 | 403, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err)
        }
    }
}
