//! A single question/answer turn

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Metadata for an image that accompanied a question
///
/// The bytes themselves are forwarded to the backend and never retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    /// Original upload filename, if the client sent one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// MIME type reported by the client
    pub mime_type: String,
    /// Payload size in bytes
    pub size_bytes: usize,
}

/// One answered turn in a subject's conversation
///
/// Created once the backend has produced an answer and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub id: Uuid,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

impl Exchange {
    /// Create an exchange stamped with the current time
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            image: None,
            answer: answer.into(),
            timestamp: Utc::now(),
        }
    }

    /// Attach image metadata
    #[must_use]
    pub fn with_image(mut self, image: Option<ImageRef>) -> Self {
        self.image = image;
        self
    }

    /// Override the timestamp
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
