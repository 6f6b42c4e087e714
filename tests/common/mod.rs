//! Shared test utilities

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;
use tutor_gateway::{
    AiBackend, ApiServerBuilder, BackendRequest, ContextAssembler, ContextConfig, Error,
    GuardConfig, HistoryStore, RequestHandler, Result, SubjectGuard,
};

/// Backend that replays scripted replies in order, then echoes a fixed answer
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
    healthy: bool,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            healthy: true,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_replies(replies: Vec<Result<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            healthy: true,
            ..Self::default()
        })
    }

    /// Backend whose credential check fails
    #[must_use]
    pub fn unhealthy() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: BackendRequest<'_>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("scripted answer".to_string()))
    }

    async fn check(&self) -> Result<()> {
        if self.healthy {
            Ok(())
        } else {
            Err(Error::Backend("API error 401 Unauthorized: invalid key".to_string()))
        }
    }
}

/// Build a request handler around a fresh store
pub fn build_handler(backend: Arc<ScriptedBackend>, max_entries: usize) -> RequestHandler {
    let store = Arc::new(HistoryStore::new(max_entries));
    let assembler = ContextAssembler::new(ContextConfig::default(), store.clone());
    RequestHandler::new(store, assembler, backend, SubjectGuard::new(GuardConfig::default()))
}

/// Build a test API router
pub fn build_test_router(handler: RequestHandler) -> Router {
    ApiServerBuilder::new(handler).build().router()
}

/// Send a request and decode the JSON body
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// POST a raw body with the given content type
pub fn post_raw(uri: &str, content_type: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a multipart upload with a `file` part and an optional `question` part
pub fn post_image(uri: &str, content_type: &str, data: &[u8], question: Option<&str>) -> Request<Body> {
    const BOUNDARY: &str = "tutor-test-boundary";

    let mut body = Vec::new();
    if let Some(question) = question {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"question\"\r\n\r\n{question}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
