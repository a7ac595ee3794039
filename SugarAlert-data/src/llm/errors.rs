use thiserror::Error;

/// Error type for language model calls
#[derive(Error, Debug)]
pub enum LlmError {
    /// The request never produced a response
    #[error("LLM request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with an error status or error payload
    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The provider answered but the body could not be interpreted
    #[error("Malformed LLM response: {0}")]
    MalformedResponse(String),
}

impl From<serde_json::Error> for LlmError {
    fn from(error: serde_json::Error) -> Self {
        LlmError::MalformedResponse(error.to_string())
    }
}
