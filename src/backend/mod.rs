//! Generative AI backend
//!
//! The backend is a stateless collaborator: it receives instructions, the
//! assembled context, and optionally an image, and returns generated text.
//! Failures are passed through unchanged and never retried here.

mod gemini;

use async_trait::async_trait;

pub use gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiClient};

use crate::Result;

/// Raw image bytes forwarded to the backend
#[derive(Debug, Clone)]
pub struct ImagePayload {
    /// MIME type, e.g. `image/png`
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Image types the backend accepts, in canonical form
pub const SUPPORTED_IMAGE_TYPES: [&str; 5] = [
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/heic",
    "image/heif",
];

/// Canonical form of a supported image MIME type, `None` if unsupported
#[must_use]
pub fn supported_image_type(mime_type: &str) -> Option<&'static str> {
    let mime_type = mime_type.trim().to_ascii_lowercase();
    let mime_type = match mime_type.as_str() {
        "image/jpg" | "image/pjpeg" => "image/jpeg",
        other => other,
    };
    SUPPORTED_IMAGE_TYPES
        .into_iter()
        .find(|supported| *supported == mime_type)
}

/// A single generation call
#[derive(Debug, Clone, Copy)]
pub struct BackendRequest<'a> {
    /// System instructions for the subject
    pub instructions: &'a str,
    /// User prompt: prior context followed by the new question
    pub prompt: &'a str,
    /// Optional image to analyze alongside the prompt
    pub image: Option<&'a ImagePayload>,
}

impl<'a> BackendRequest<'a> {
    #[must_use]
    pub const fn new(instructions: &'a str, prompt: &'a str) -> Self {
        Self {
            instructions,
            prompt,
            image: None,
        }
    }

    #[must_use]
    pub const fn with_image(mut self, image: Option<&'a ImagePayload>) -> Self {
        self.image = image;
        self
    }
}

/// Text generation backend
#[async_trait]
pub trait AiBackend: Send + Sync {
    /// Short identifier used in logs and readiness output
    fn name(&self) -> &str;

    /// Generate an answer
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the call fails or yields no text
    async fn generate(&self, request: BackendRequest<'_>) -> Result<String>;

    /// Verify that credentials are accepted
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the backend rejects the credentials
    async fn check(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_image_types_are_canonicalized() {
        assert_eq!(supported_image_type("IMAGE/PNG"), Some("image/png"));
        assert_eq!(supported_image_type("image/jpg"), Some("image/jpeg"));
        assert_eq!(supported_image_type(" image/heic "), Some("image/heic"));
    }

    #[test]
    fn unsupported_image_types_are_refused() {
        for mime_type in ["image/gif", "image/bmp", "image/svg+xml", "text/plain", ""] {
            assert_eq!(supported_image_type(mime_type), None, "{mime_type}");
        }
    }
}
