//! Tutor Gateway - Subject-scoped homework tutor in front of a generative AI backend
//!
//! This library provides the core functionality for the tutor gateway:
//! - Per-subject conversation history with bounded retention
//! - Context assembly from recent exchanges under a size ceiling
//! - Subject relevance screening
//! - HTTP endpoints for questions, image analysis and history
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     HTTP API                         │
//! │  /math-physics  │  /chemistry  │  /image-analysis   │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 RequestHandler                       │
//! │  SubjectGuard  │  ContextAssembler  │  HistoryStore │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                 AiBackend (Gemini)                   │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod handler;
pub mod history;
pub mod prompt;
pub mod subject;

pub use api::{ApiServer, ApiServerBuilder};
pub use backend::{AiBackend, BackendRequest, GeminiClient, ImagePayload};
pub use config::Config;
pub use context::{ContextAssembler, ContextConfig, ConversationContext};
pub use error::{Error, Result};
pub use guard::{GuardConfig, SubjectGuard};
pub use handler::{Answer, ImageUpload, RequestHandler};
pub use history::{Exchange, HistorySnapshot, HistoryStore};
pub use subject::Subject;
