//! Context assembly for backend calls
//!
//! Turns a subject's recent history into a bounded, prompt-ready context and
//! appends the new question as the final unanswered turn.

mod assembler;

pub use assembler::{ContextAssembler, ContextConfig, ContextTurn, ConversationContext};
