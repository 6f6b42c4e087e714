//! Error types for the tutor gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the tutor gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Blank or missing question
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Subject outside the fixed set
    #[error("unknown subject: {0}")]
    UnknownSubject(String),

    /// Upload that is not an image
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// AI backend failure, message passed through as received
    #[error("backend error: {0}")]
    Backend(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Whether the caller sent something invalid, as opposed to a server or backend fault
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::UnknownSubject(_) | Self::InvalidImage(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_client_errors() {
        assert!(Error::InvalidInput("blank".into()).is_client_error());
        assert!(Error::UnknownSubject("arabic".into()).is_client_error());
        assert!(Error::InvalidImage("text/plain".into()).is_client_error());
        assert!(!Error::Backend("429 Too Many Requests".into()).is_client_error());
        assert!(!Error::Config("port".into()).is_client_error());
    }

    #[test]
    fn backend_message_is_preserved() {
        let err = Error::Backend("API error 503: overloaded".into());
        assert_eq!(err.to_string(), "backend error: API error 503: overloaded");
    }
}
