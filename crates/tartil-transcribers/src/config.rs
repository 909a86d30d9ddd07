//! Transcriber configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tartil_core::engine::EngineConfig;
use tartil_core::traits::{Transcriber, DEFAULT_LANGUAGE};

use crate::whisper::{WhisperApiTranscriber, DEFAULT_TIMEOUT_SECS};

/// Configuration for a single transcription backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TranscriberConfig {
    /// The OpenAI Whisper API, or any proxy speaking its protocol.
    #[serde(rename = "openai")]
    OpenAI {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    /// A self-hosted Whisper server running a Quran-tuned model.
    Local {
        #[serde(default = "default_local_url")]
        base_url: String,
        #[serde(default)]
        model: Option<String>,
    },
}

impl std::fmt::Debug for TranscriberConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranscriberConfig::OpenAI {
                api_key: _,
                base_url,
                model,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
            TranscriberConfig::Local { base_url, model } => f
                .debug_struct("Local")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
        }
    }
}

fn default_local_url() -> String {
    "http://localhost:9000".to_string()
}

/// Top-level tartil configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TartilConfig {
    /// Transcriber configurations keyed by name.
    #[serde(default)]
    pub transcribers: HashMap<String, TranscriberConfig>,
    /// Fallback order; names refer to keys of `transcribers`.
    #[serde(default = "default_chain")]
    pub chain: Vec<String>,
    /// Language hint sent with every upload.
    #[serde(default = "default_language")]
    pub language: String,
    /// Max concurrent transcriptions in a batch.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_chain() -> Vec<String> {
    vec!["local".to_string(), "openai".to_string()]
}
fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}
fn default_parallelism() -> usize {
    4
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for TartilConfig {
    fn default() -> Self {
        Self {
            transcribers: HashMap::new(),
            chain: default_chain(),
            language: default_language(),
            parallelism: default_parallelism(),
            timeout_secs: default_timeout(),
        }
    }
}

impl TartilConfig {
    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            parallelism: self.parallelism.max(1),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(len) = result[start..].find('}') else {
            break;
        };
        let value = std::env::var(&result[start + 2..start + len]).unwrap_or_default();
        result.replace_range(start..start + len + 1, &value);
        // Substituted values are not expanded again.
        from = start + value.len();
    }
    result
}

fn resolve_transcriber_config(config: &TranscriberConfig) -> TranscriberConfig {
    match config {
        TranscriberConfig::OpenAI {
            api_key,
            base_url,
            model,
        } => TranscriberConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_deref().map(resolve_env_vars),
            model: model.clone(),
        },
        TranscriberConfig::Local { base_url, model } => TranscriberConfig::Local {
            base_url: resolve_env_vars(base_url),
            model: model.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `tartil.toml` in the current directory
/// 2. `~/.config/tartil/config.toml`
///
/// `TARTIL_OPENAI_KEY` overrides (or creates) the `openai` transcriber's key.
pub fn load_config() -> Result<TartilConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TartilConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("tartil.toml");
            if local.exists() {
                Some(local)
            } else {
                config_dir()
                    .map(|dir| dir.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            parse_config(&path)?
        }
        None => TartilConfig::default(),
    };

    apply_openai_key(&mut config, std::env::var("TARTIL_OPENAI_KEY").ok());

    config.transcribers = config
        .transcribers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_transcriber_config(v)))
        .collect();

    Ok(config)
}

fn parse_config(path: &Path) -> Result<TartilConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse config: {}", path.display()))
}

fn apply_openai_key(config: &mut TartilConfig, key: Option<String>) {
    let Some(key) = key.filter(|k| !k.is_empty()) else {
        return;
    };
    let entry = config
        .transcribers
        .entry("openai".into())
        .or_insert(TranscriberConfig::OpenAI {
            api_key: String::new(),
            base_url: None,
            model: None,
        });
    match entry {
        TranscriberConfig::OpenAI { api_key, .. } => *api_key = key,
        TranscriberConfig::Local { .. } => {
            tracing::warn!("TARTIL_OPENAI_KEY ignored: transcriber 'openai' is not of type openai");
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("tartil"))
}

/// Create a transcriber instance from its configuration.
pub fn create_transcriber(
    name: &str,
    config: &TranscriberConfig,
    timeout_secs: u64,
) -> Result<Arc<dyn Transcriber>> {
    let transcriber = match config {
        TranscriberConfig::OpenAI {
            api_key,
            base_url,
            model,
        } => {
            anyhow::ensure!(!api_key.is_empty(), "transcriber '{name}' has an empty api_key");
            WhisperApiTranscriber::openai(
                name,
                api_key,
                base_url.as_deref(),
                model.as_deref(),
                timeout_secs,
            )?
        }
        TranscriberConfig::Local { base_url, model } => {
            WhisperApiTranscriber::local(name, base_url, model.as_deref(), timeout_secs)?
        }
    };
    Ok(Arc::new(transcriber))
}

/// Build the fallback chain named by `config.chain`.
///
/// Names without a configured transcriber are skipped with a warning. An
/// empty result is an error.
pub fn build_chain(config: &TartilConfig) -> Result<Vec<Arc<dyn Transcriber>>> {
    let mut chain = Vec::with_capacity(config.chain.len());
    for name in &config.chain {
        match config.transcribers.get(name) {
            Some(tconfig) => chain.push(
                create_transcriber(name, tconfig, config.timeout_secs)
                    .with_context(|| format!("failed to create transcriber '{name}'"))?,
            ),
            None => tracing::warn!(transcriber = %name, "not configured, skipping"),
        }
    }

    anyhow::ensure!(
        !chain.is_empty(),
        "no transcribers configured. Chain: {:?}, available: {:?}",
        config.chain,
        config.transcribers.keys().collect::<Vec<_>>()
    );
    Ok(chain)
}
