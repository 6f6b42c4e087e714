//! Request orchestration
//!
//! validate → screen → assemble context → call backend → record exchange.
//! History is only written after the backend has produced an answer, so a
//! failed call never leaves an unanswered question behind.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::backend::{
    AiBackend, BackendRequest, ImagePayload, SUPPORTED_IMAGE_TYPES, supported_image_type,
};
use crate::context::ContextAssembler;
use crate::guard::{self, SubjectGuard};
use crate::history::{Exchange, HistoryStore, ImageRef};
use crate::{Error, Result, Subject, prompt};

/// Question recorded for image uploads that arrive without one
pub const IMAGE_DEFAULT_QUESTION: &str = "Image analysis (no specific question)";

/// An uploaded image and its metadata
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: Option<String>,
    pub payload: ImagePayload,
}

impl ImageUpload {
    /// Validate an upload, rejecting anything that is not a non-empty image
    /// of a type the backend accepts
    ///
    /// # Errors
    ///
    /// Returns `InvalidImage` for a non-image or unsupported content type, or
    /// an empty body
    pub fn new(filename: Option<String>, mime_type: &str, data: Vec<u8>) -> Result<Self> {
        if !mime_type.trim().to_ascii_lowercase().starts_with("image/") {
            return Err(Error::InvalidImage(format!(
                "please upload a valid image file (got {mime_type:?})"
            )));
        }
        let Some(mime_type) = supported_image_type(mime_type) else {
            return Err(Error::InvalidImage(format!(
                "unsupported image type {mime_type:?}, expected one of {}",
                SUPPORTED_IMAGE_TYPES.join(", ")
            )));
        };
        if data.is_empty() {
            return Err(Error::InvalidImage("image file is empty".to_string()));
        }

        Ok(Self {
            filename,
            payload: ImagePayload {
                mime_type: mime_type.to_string(),
                data,
            },
        })
    }

    fn reference(&self) -> ImageRef {
        ImageRef {
            filename: self.filename.clone(),
            mime_type: self.payload.mime_type.clone(),
            size_bytes: self.payload.data.len(),
        }
    }
}

/// Reply returned to the caller
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    pub subject: Subject,
    pub timestamp: DateTime<Utc>,
    pub session_id: Uuid,
    /// The question was off topic and was answered with a canned rejection
    pub rejected: bool,
}

impl Answer {
    fn new(subject: Subject, answer: String, rejected: bool) -> Self {
        Self {
            answer,
            subject,
            timestamp: Utc::now(),
            session_id: Uuid::new_v4(),
            rejected,
        }
    }
}

/// Handles student questions end to end
#[derive(Clone)]
pub struct RequestHandler {
    store: Arc<HistoryStore>,
    assembler: ContextAssembler,
    backend: Arc<dyn AiBackend>,
    guard: SubjectGuard,
}

impl RequestHandler {
    #[must_use]
    pub fn new(
        store: Arc<HistoryStore>,
        assembler: ContextAssembler,
        backend: Arc<dyn AiBackend>,
        guard: SubjectGuard,
    ) -> Self {
        Self {
            store,
            assembler,
            backend,
            guard,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<HistoryStore> {
        &self.store
    }

    #[must_use]
    pub fn backend(&self) -> &dyn AiBackend {
        self.backend.as_ref()
    }

    /// Answer a text question
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a blank question or `Backend` if generation fails
    pub async fn ask(&self, subject: Subject, question: &str) -> Result<Answer> {
        self.handle(subject, question, None).await
    }

    /// Answer a question about an uploaded image
    ///
    /// A missing or blank question is replaced by [`IMAGE_DEFAULT_QUESTION`].
    ///
    /// # Errors
    ///
    /// Returns `Backend` if generation fails
    pub async fn ask_with_image(&self, question: Option<&str>, image: ImageUpload) -> Result<Answer> {
        let question = question
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .unwrap_or(IMAGE_DEFAULT_QUESTION);
        self.handle(Subject::ImageAnalysis, question, Some(&image)).await
    }

    async fn handle(
        &self,
        subject: Subject,
        question: &str,
        image: Option<&ImageUpload>,
    ) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("question must not be empty".to_string()));
        }

        if !self.guard.admit(self.backend(), subject, question).await {
            let preview: String = question.chars().take(50).collect();
            tracing::debug!(%subject, question = %preview, "not saving rejected question");
            let message = guard::rejection_message(subject, question);
            return Ok(Answer::new(subject, message.to_string(), true));
        }

        let context = self.assembler.build_default(subject, question)?;
        let social = guard::is_social_interaction(question);
        let user_prompt = prompt::with_intent_hint(&context.format_prompt(), social);
        let instructions = prompt::instructions(subject);

        let request = BackendRequest::new(&instructions, &user_prompt)
            .with_image(image.map(|i| &i.payload));

        let answer = match self.backend.generate(request).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(%subject, backend = self.backend.name(), error = %e, "backend call failed");
                return Err(e);
            }
        };

        let exchange =
            Exchange::new(question, answer.clone()).with_image(image.map(ImageUpload::reference));
        self.store.append(subject, exchange);

        tracing::info!(
            %subject,
            context_turns = context.turns.len(),
            dropped = context.dropped,
            "answered question"
        );

        Ok(Answer::new(subject, answer, false))
    }
}
