//! Subject relevance screening
//!
//! Keeps each subject channel on topic. Keyword rules settle most questions;
//! the rest are either accepted or, when enabled, classified by the backend.
//! Small talk is always let through.

use std::sync::LazyLock;

use regex::Regex;

use crate::backend::{AiBackend, BackendRequest};
use crate::{Subject, prompt};

/// Outcome of keyword screening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// On topic (or small talk)
    Accept,
    /// Clearly belongs to another subject
    Reject,
    /// No rule matched
    Undecided,
}

/// Screening configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardConfig {
    /// Screen questions at all
    pub enabled: bool,
    /// Ask the backend to classify undecided questions
    pub ai_validation: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ai_validation: false,
        }
    }
}

fn alternation(patterns: &[&str]) -> Regex {
    Regex::new(&format!("(?:{})", patterns.join("|"))).expect("valid regex")
}

static SOCIAL: LazyLock<Regex> = LazyLock::new(|| {
    alternation(&[
        r"مرحب|هلا|السلام|أهلا|هاي|\b(?:hello|hi|hey|greetings)\b",
        r"شكر|متشكر|\b(?:thanks|thank you|thx)\b",
        r"رائع|جميل|ممتاز|عظيم|حلو|كويس|\b(?:great|awesome|amazing|excellent|good|nice|perfect)\b",
        r"كيف حالك|ازيك|عامل ايه|\bhow are you\b",
        r"صباح|مساء|\b(?:good morning|good evening)\b",
        r"وداع|باي|مع السلامة|\b(?:bye|see you)\b",
        r"انت شاطر|\byou are (?:smart|good)\b",
        r"بحبك|احبك|\bi love you\b",
        r"انا سعيد|مبسوط|\bi am happy\b",
        r"^(?:ok|okay|تمام|حاضر|ماشي)$",
    ])
});

static CHEMISTRY: LazyLock<Regex> = LazyLock::new(|| {
    alternation(&[
        r"\bph\b", "acid", "base", "chemical", "reaction", "element", "compound", "molecule",
        "atom", "h2o", "co2", "nacl", "ionic", "covalent", "oxidation", "reduction", "catalyst",
        "equilibrium", "molarity", "stoichiometry", r"periodic\s+table", "organic", "inorganic",
        "كيمياء", "تفاعل", "حمض", "قاعدة", "عنصر", "مركب", "جزيء", "ذرة", "أكسدة", "اختزال",
        "محفز", "محلول", "تركيز", "معادلة كيميائية",
    ])
});

/// Chemistry terms that rule a message out of math/physics
///
/// Narrower than the chemistry accept list: terms such as "organic" also
/// appear in math wording.
static CHEMISTRY_IN_MATH: LazyLock<Regex> = LazyLock::new(|| {
    alternation(&[
        r"\bph\b", "acid", "base", "chemical", "reaction", "element", "compound", "molecule",
        "atom", "h2o", "co2", "nacl", "ionic", "covalent", "oxidation", "reduction", "catalyst",
        "equilibrium", "molarity", "كيمياء", "تفاعل", "حمض", "قاعدة", "عنصر", "مركب", "جزيء",
        "أكسدة", "اختزال", "محلول", "تركيز", "معادلة كيميائية",
    ])
});

static MATH_PHYSICS: LazyLock<Regex> = LazyLock::new(|| {
    alternation(&[
        "derivative", "integral", "calculus", "algebra", "geometry", r"equation\s+of\s+motion",
        "velocity", "acceleration", "force", "newton", "energy", "momentum", "friction",
        "gravity", r"electric\s+field", "magnetic", "wave", "frequency", "circuit", "current",
        "voltage", "resistance", "kirchhoff", "ohm", "ampere", "watt", "capacitor", "inductor",
        "تفاضل", "تكامل", "هندسة", "جبر", "سرعة", "تسارع", "قوة", "نيوتن", "طاقة", "زخم",
        "احتكاك", "جاذبية", "دائرة", "تيار", "جهد", "مقاومة", "كيرشوف", "أوم",
    ])
});

static ARABIC_LANGUAGE: LazyLock<Regex> = LazyLock::new(|| {
    alternation(&[
        "أعرب", "إعراب", "نحو", "بلاغة", "استعارة", "تشبيه", "كناية", "طباق", "جناس", "سجع",
        "قصيدة", "شعر", "أدب", "grammar", "rhetoric", "metaphor", "poetry", "literature",
    ])
});

static ARABIC_SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[؀-ۿ]").expect("valid regex"));

/// Whether a message is a greeting, thanks, praise or farewell
#[must_use]
pub fn is_social_interaction(question: &str) -> bool {
    SOCIAL.is_match(question.trim().to_lowercase().as_str())
}

/// Screen a question against a subject's keyword rules
#[must_use]
pub fn screen(subject: Subject, question: &str) -> Verdict {
    if subject == Subject::ImageAnalysis || is_social_interaction(question) {
        return Verdict::Accept;
    }

    let q = question.to_lowercase();
    match subject {
        Subject::MathPhysics => {
            if CHEMISTRY_IN_MATH.is_match(&q) || ARABIC_LANGUAGE.is_match(&q) {
                Verdict::Reject
            } else {
                Verdict::Undecided
            }
        }
        Subject::Chemistry => {
            if CHEMISTRY.is_match(&q) {
                Verdict::Accept
            } else if MATH_PHYSICS.is_match(&q) || ARABIC_LANGUAGE.is_match(&q) {
                Verdict::Reject
            } else {
                Verdict::Undecided
            }
        }
        Subject::ImageAnalysis => Verdict::Accept,
    }
}

/// Polite rejection in the language of the question
#[must_use]
pub fn rejection_message(subject: Subject, question: &str) -> &'static str {
    let arabic = ARABIC_SCRIPT.is_match(question);
    match (subject, arabic) {
        (Subject::MathPhysics, false) => {
            "I'm sorry, but I specialize in Mathematics and Physics only. Please ask me questions about Math or Physics."
        }
        (Subject::MathPhysics, true) => {
            "آسف، لكنني متخصص في الرياضيات والفيزياء فقط. يرجى سؤالي عن الرياضيات أو الفيزياء."
        }
        (Subject::Chemistry, false) => {
            "I'm sorry, but I specialize in Chemistry only. Please ask me questions about Chemistry."
        }
        (Subject::Chemistry, true) => "آسف، لكنني متخصص في الكيمياء فقط. يرجى سؤالي عن الكيمياء.",
        (Subject::ImageAnalysis, false) => {
            "I'm sorry, but I can only help with images about Mathematics, Physics or Chemistry."
        }
        (Subject::ImageAnalysis, true) => {
            "آسف، لكنني أساعد فقط في الصور المتعلقة بالرياضيات أو الفيزياء أو الكيمياء."
        }
    }
}

/// Interpret a classification reply
///
/// `NOT_RELEVANT` contains `RELEVANT`, so the negative form is checked first.
#[must_use]
pub fn parse_relevance(reply: &str) -> bool {
    let reply = reply.trim().to_uppercase();
    if reply.contains("NOT_RELEVANT") || reply.contains("NOT RELEVANT") {
        return false;
    }
    reply.contains("RELEVANT")
}

/// Subject screening backed by keyword rules and optional backend classification
#[derive(Debug, Clone, Copy, Default)]
pub struct SubjectGuard {
    config: GuardConfig,
}

impl SubjectGuard {
    #[must_use]
    pub const fn new(config: GuardConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> GuardConfig {
        self.config
    }

    /// Decide whether a question belongs in the subject channel
    ///
    /// Backend classification failures count as a rejection.
    pub async fn admit(&self, backend: &dyn AiBackend, subject: Subject, question: &str) -> bool {
        if !self.config.enabled {
            return true;
        }

        match screen(subject, question) {
            Verdict::Accept => true,
            Verdict::Reject => false,
            Verdict::Undecided if !self.config.ai_validation => true,
            Verdict::Undecided => {
                let check = prompt::relevance_check(subject, question);
                let request = BackendRequest::new("Classify the question.", &check);
                match backend.generate(request).await {
                    Ok(reply) => {
                        let relevant = parse_relevance(&reply);
                        tracing::debug!(%subject, relevant, "backend relevance check");
                        relevant
                    }
                    Err(e) => {
                        tracing::warn!(%subject, error = %e, "relevance check failed, rejecting");
                        false
                    }
                }
            }
        }
    }
}
