//! Configuration management for the tutor gateway

pub mod file;

use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;

use crate::backend::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::context::ContextConfig;
use crate::guard::GuardConfig;
use crate::history::DEFAULT_MAX_ENTRIES;
use crate::{Error, Result};

use self::file::TutorConfigFile;

/// Tutor gateway configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API server configuration
    pub server: ServerConfig,

    /// AI backend configuration
    pub backend: BackendConfig,

    /// History retention and context assembly
    pub history: HistoryConfig,

    /// Subject relevance screening
    pub guard: GuardConfig,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Global request quota per minute, unlimited when `None`
    pub rate_limit_per_minute: Option<u32>,
}

/// AI backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// API key (from `GEMINI_API_KEY`)
    pub api_key: Option<SecretString>,

    /// Model identifier
    pub model: String,

    pub base_url: String,

    /// Per-request HTTP timeout
    pub timeout: Duration,
}

/// History configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Exchanges retained per subject
    pub max_entries: usize,

    /// Prior exchanges included in the context
    pub context_exchanges: usize,

    /// Context size ceiling in characters
    pub max_context_chars: usize,

    /// Prior answers are clipped to this many characters in the context
    pub answer_preview_chars: usize,

    /// Default `limit` for history reads
    pub default_read_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        let context = ContextConfig::default();
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            context_exchanges: context.max_exchanges,
            max_context_chars: context.max_chars,
            answer_preview_chars: context.answer_preview_chars,
            default_read_limit: 10,
        }
    }
}

impl HistoryConfig {
    /// Context assembly settings derived from this configuration
    #[must_use]
    pub const fn context_config(&self) -> ContextConfig {
        ContextConfig {
            max_exchanges: self.context_exchanges,
            max_chars: self.max_context_chars,
            answer_preview_chars: self.answer_preview_chars,
        }
    }

    fn validate(&self) -> Result<()> {
        let bounds = [
            ("history.max_entries", self.max_entries),
            ("history.max_context_chars", self.max_context_chars),
            ("history.answer_preview_chars", self.answer_preview_chars),
            ("history.default_read_limit", self.default_read_limit),
        ];

        for (name, value) in bounds {
            if value == 0 {
                return Err(Error::Config(format!("{name} must be at least 1")));
            }
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from the environment and the TOML config file
    ///
    /// `path` overrides the standard config file location.
    ///
    /// # Errors
    ///
    /// Returns error if a bound is zero
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let fc = file::load_config_file(path);
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a bound is zero
    pub fn from_sources(fc: TutorConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let parsed = |key: &str| env(key).and_then(|v| v.trim().parse::<usize>().ok());

        // API server config (env > toml > default)
        let server = ServerConfig {
            port: env("TUTOR_PORT")
                .or_else(|| env("PORT"))
                .and_then(|s| s.trim().parse().ok())
                .or(fc.server.port)
                .unwrap_or(8000),
            rate_limit_per_minute: env("TUTOR_RATE_LIMIT")
                .and_then(|s| s.trim().parse().ok())
                .or(fc.server.rate_limit_per_minute)
                .filter(|n| *n > 0),
        };

        let backend = BackendConfig {
            api_key: env("GEMINI_API_KEY")
                .or(fc.backend.api_key)
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
            model: env("TUTOR_MODEL")
                .or(fc.backend.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: env("TUTOR_BACKEND_URL")
                .or(fc.backend.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(
                env("TUTOR_BACKEND_TIMEOUT")
                    .and_then(|s| s.trim().parse().ok())
                    .or(fc.backend.timeout_secs)
                    .unwrap_or(60),
            ),
        };

        let defaults = HistoryConfig::default();
        let history = HistoryConfig {
            max_entries: parsed("TUTOR_HISTORY_MAX")
                .or(fc.history.max_entries)
                .unwrap_or(defaults.max_entries),
            context_exchanges: parsed("TUTOR_CONTEXT_EXCHANGES")
                .or(fc.history.context_exchanges)
                .unwrap_or(defaults.context_exchanges),
            max_context_chars: parsed("TUTOR_CONTEXT_MAX_CHARS")
                .or(fc.history.max_context_chars)
                .unwrap_or(defaults.max_context_chars),
            answer_preview_chars: parsed("TUTOR_ANSWER_PREVIEW")
                .or(fc.history.answer_preview_chars)
                .unwrap_or(defaults.answer_preview_chars),
            default_read_limit: fc
                .history
                .default_read_limit
                .unwrap_or(defaults.default_read_limit),
        };
        history.validate()?;

        let guard = GuardConfig {
            enabled: env("TUTOR_GUARD")
                .as_deref()
                .and_then(parse_bool)
                .or(fc.guard.enabled)
                .unwrap_or(true),
            ai_validation: env("TUTOR_GUARD_AI")
                .as_deref()
                .and_then(parse_bool)
                .or(fc.guard.ai_validation)
                .unwrap_or(false),
        };

        Ok(Self {
            server,
            backend,
            history,
            guard,
        })
    }
}
