//! Context assembler for subject conversations

use std::collections::VecDeque;
use std::sync::Arc;

use crate::history::{Exchange, HistoryStore};
use crate::{Error, Result, Subject};

const HISTORY_HEADER: &str = "Recent conversation context:\n";
const QUESTION_PREFIX: &str = "Student's message: ";
const BLOCK_SEPARATOR: &str = "\n\n";

/// Configuration for context assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    /// Default number of prior exchanges to include
    pub max_exchanges: usize,
    /// Ceiling on the formatted context size, in characters
    pub max_chars: usize,
    /// Prior answers are clipped to this many characters
    pub answer_preview_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_exchanges: 3,
            max_chars: 4000,
            answer_preview_chars: 200,
        }
    }
}

/// A prior question/answer pair as it appears in the context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextTurn {
    pub question: String,
    pub answer: String,
}

impl ContextTurn {
    fn render(&self) -> String {
        format!("Previous Q: {}\nPrevious A: {}", self.question, self.answer)
    }
}

/// Context ready to hand to the backend
#[derive(Debug, Clone)]
pub struct ConversationContext {
    /// Subject the context was built for
    pub subject: Subject,
    /// Prior turns, oldest first
    pub turns: Vec<ContextTurn>,
    /// The new, unanswered question
    pub question: String,
    /// Prior turns dropped to stay under the size ceiling
    pub dropped: usize,
    /// Formatted size in characters
    pub chars: usize,
}

impl ConversationContext {
    /// Rendered prior turns, empty when there is no history
    #[must_use]
    pub fn history_text(&self) -> String {
        self.turns
            .iter()
            .map(ContextTurn::render)
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR)
    }

    /// Format the full user prompt: prior turns followed by the new question
    #[must_use]
    pub fn format_prompt(&self) -> String {
        let mut parts = Vec::new();

        if !self.turns.is_empty() {
            parts.push(format!("{HISTORY_HEADER}{}", self.history_text()));
        }

        parts.push(format!("{QUESTION_PREFIX}{}", self.question));

        parts.join(BLOCK_SEPARATOR)
    }
}

/// Builds conversation context from a shared [`HistoryStore`]
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    config: ContextConfig,
    store: Arc<HistoryStore>,
}

impl ContextAssembler {
    #[must_use]
    pub const fn new(config: ContextConfig, store: Arc<HistoryStore>) -> Self {
        Self { config, store }
    }

    #[must_use]
    pub const fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Build context using the configured default exchange count
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the question is blank
    pub fn build_default(&self, subject: Subject, question: &str) -> Result<ConversationContext> {
        self.build(subject, question, self.config.max_exchanges)
    }

    /// Build context for a new question
    ///
    /// Takes up to `max_exchanges` of the subject's most recent exchanges, then
    /// drops the oldest until the formatted size fits under the ceiling. The new
    /// question is always included, even if it alone exceeds the ceiling.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the question is blank
    pub fn build(
        &self,
        subject: Subject,
        question: &str,
        max_exchanges: usize,
    ) -> Result<ConversationContext> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("question must not be empty".to_string()));
        }

        let snapshot = self.store.recent(subject, max_exchanges);
        let mut turns: Vec<ContextTurn> = snapshot
            .iter()
            .map(|exchange| self.to_turn(exchange))
            .collect();

        let (dropped, chars) = self.prune(&mut turns, question);
        if dropped > 0 {
            tracing::debug!(
                %subject,
                dropped,
                kept = turns.len(),
                ceiling = self.config.max_chars,
                "dropped oldest turns to fit context ceiling"
            );
        }

        Ok(ConversationContext {
            subject,
            turns,
            question: question.to_string(),
            dropped,
            chars,
        })
    }

    /// Build context for a raw subject identifier
    ///
    /// # Errors
    ///
    /// Returns `UnknownSubject` for identifiers outside the subject set, or
    /// `InvalidInput` if the question is blank
    pub fn build_by_name(
        &self,
        subject: &str,
        question: &str,
        max_exchanges: usize,
    ) -> Result<ConversationContext> {
        let subject: Subject = subject.parse()?;
        self.build(subject, question, max_exchanges)
    }

    fn to_turn(&self, exchange: &Exchange) -> ContextTurn {
        ContextTurn {
            question: exchange.question.clone(),
            answer: clip(&exchange.answer, self.config.answer_preview_chars),
        }
    }

    /// Drop oldest turns until the formatted prompt fits, returning (dropped, final size)
    ///
    /// Sizes follow `ConversationContext::format_prompt` exactly: the question
    /// line, plus the history header and one separator per turn once any turn
    /// is kept.
    fn prune(&self, turns: &mut Vec<ContextTurn>, question: &str) -> (usize, usize) {
        let sep = BLOCK_SEPARATOR.chars().count();
        let header = HISTORY_HEADER.chars().count();
        let base = QUESTION_PREFIX.chars().count() + question.chars().count();

        let mut sizes: VecDeque<usize> = turns
            .iter()
            .map(|t| t.render().chars().count() + sep)
            .collect();
        let formatted = |sizes: &VecDeque<usize>| {
            if sizes.is_empty() {
                base
            } else {
                base + header + sizes.iter().sum::<usize>()
            }
        };

        let mut total = formatted(&sizes);
        let mut dropped = 0;
        while total > self.config.max_chars && sizes.pop_front().is_some() {
            dropped += 1;
            total = formatted(&sizes);
        }
        turns.drain(..dropped);

        (dropped, total)
    }
}

/// Clip text to `max_chars` characters, marking the cut with `...`
fn clip(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
