//! TOML configuration file loading
//!
//! Supports `~/.config/tutor/config.toml` as a persistent config source.
//! All fields are optional: the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct TutorConfigFile {
    /// Server/runtime configuration
    #[serde(default)]
    pub server: ServerFileConfig,

    /// AI backend configuration
    #[serde(default)]
    pub backend: BackendFileConfig,

    /// History retention and context assembly
    #[serde(default)]
    pub history: HistoryFileConfig,

    /// Subject relevance screening
    #[serde(default)]
    pub guard: GuardFileConfig,
}

/// Server/runtime configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Global request quota per minute
    pub rate_limit_per_minute: Option<u32>,
}

/// AI backend configuration
#[derive(Debug, Default, Deserialize)]
pub struct BackendFileConfig {
    pub api_key: Option<String>,

    /// Model identifier (e.g. "gemini-2.0-flash")
    pub model: Option<String>,

    pub base_url: Option<String>,

    /// HTTP timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// History configuration
#[derive(Debug, Default, Deserialize)]
pub struct HistoryFileConfig {
    /// Exchanges retained per subject
    pub max_entries: Option<usize>,

    /// Prior exchanges included in the context
    pub context_exchanges: Option<usize>,

    /// Context size ceiling in characters
    pub max_context_chars: Option<usize>,

    pub answer_preview_chars: Option<usize>,

    /// Default `limit` for history reads
    pub default_read_limit: Option<usize>,
}

/// Guard configuration
#[derive(Debug, Default, Deserialize)]
pub struct GuardFileConfig {
    pub enabled: Option<bool>,
    pub ai_validation: Option<bool>,
}

/// Load the TOML config file from `path`, or the standard path when `None`
///
/// Returns `TutorConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file(path: Option<&Path>) -> TutorConfigFile {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_file_path) else {
        return TutorConfigFile::default();
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file");
        return TutorConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                TutorConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            TutorConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/tutor/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("tutor").join("config.toml"))
}
