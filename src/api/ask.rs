//! Subject question endpoints

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State, multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    routing::post,
};
use serde::Deserialize;

use super::ApiState;
use crate::handler::{Answer, ImageUpload};
use crate::{Error, Result, Subject};

/// Largest accepted image upload
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Build question router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route(Subject::MathPhysics.route(), post(math_physics))
        .route(Subject::Chemistry.route(), post(chemistry))
        .route(
            Subject::ImageAnalysis.route(),
            post(image_analysis).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .with_state(state)
}

/// Text question request
#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    #[serde(default)]
    pub question: String,
}

async fn math_physics(
    State(state): State<Arc<ApiState>>,
    request: std::result::Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<Json<Answer>> {
    let Json(request) = request?;
    ask(&state, Subject::MathPhysics, &request.question).await
}

async fn chemistry(
    State(state): State<Arc<ApiState>>,
    request: std::result::Result<Json<QuestionRequest>, JsonRejection>,
) -> Result<Json<Answer>> {
    let Json(request) = request?;
    ask(&state, Subject::Chemistry, &request.question).await
}

async fn ask(state: &ApiState, subject: Subject, question: &str) -> Result<Json<Answer>> {
    tracing::info!(%subject, chars = question.chars().count(), "question received");
    let answer = state.handler.ask(subject, question).await?;
    Ok(Json(answer))
}

/// Analyze an uploaded image
///
/// Multipart fields: `file` (required, `image/*`) and `question` (optional).
async fn image_analysis(
    State(state): State<Arc<ApiState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<Answer>> {
    let mut multipart = multipart?;
    let mut question: Option<String> = None;
    let mut upload: Option<ImageUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidInput(format!("failed to read form field: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "question" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| Error::InvalidInput(format!("invalid question: {e}")))?;
                question = Some(text);
            }
            "file" => {
                let filename = field.file_name().map(ToString::to_string);
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Error::InvalidImage(format!("failed to read file: {e}")))?;
                upload = Some(ImageUpload::new(filename, &content_type, data.to_vec())?);
            }
            _ => {}
        }
    }

    let upload = upload.ok_or_else(|| Error::InvalidImage("file is required".to_string()))?;

    tracing::info!(
        filename = upload.filename.as_deref().unwrap_or("-"),
        mime_type = %upload.payload.mime_type,
        bytes = upload.payload.data.len(),
        "image received"
    );

    let answer = state
        .handler
        .ask_with_image(question.as_deref(), upload)
        .await?;
    Ok(Json(answer))
}
