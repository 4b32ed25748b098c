use thiserror::Error;

/// Failures surfaced by a generation service call.
///
/// The `Display` text is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenAiError {
    #[error("API Key not found in environment variables.")]
    AuthenticationMissing,

    /// Transport or service failure, message passed through verbatim
    #[error("{0}")]
    Upstream(String),

    #[error("No image data found in the response.")]
    NoImageInResponse,
}

impl GenAiError {
    /// Build an upstream error, substituting `fallback` for a blank message
    pub fn upstream(message: impl Into<String>, fallback: &str) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::Upstream(fallback.to_string())
        } else {
            Self::Upstream(message)
        }
    }

    /// Missing credentials rather than a failed call
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::AuthenticationMissing)
    }
}

pub type Result<T> = std::result::Result<T, GenAiError>;
