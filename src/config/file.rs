//! JSON config file at `~/.quill/config.json`.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ConfigError, LlmError};
use crate::llm::{Provider, ProviderSettings};
use crate::ollama::DEFAULT_OLLAMA_URL;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "QUILL_CONFIG";

const CONFIG_DIR: &str = ".quill";
const CONFIG_FILE: &str = "config.json";

/// Persisted user preferences. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,

    /// Model per provider, e.g. `{"ollama": "qwen2.5-coder"}`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub models: BTreeMap<Provider, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ollama_url: Option<String>,
}

/// Per-run values from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub provider: Option<String>,
    pub model: Option<String>,
}

impl Config {
    /// `$QUILL_CONFIG` if set, otherwise `~/.quill/config.json`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load the config. A missing or blank file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::ReadFailed {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&content).map_err(|source| ConfigError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the config atomically: temp file in the same directory, then rename.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let write_failed = |source| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(write_failed)?;

        let mut json = serde_json::to_string_pretty(self).map_err(ConfigError::SerializeFailed)?;
        json.push('\n');

        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_failed)?;
        tmp.write_all(json.as_bytes()).map_err(write_failed)?;
        tmp.as_file().sync_all().map_err(write_failed)?;
        tmp.persist(path).map_err(|e| write_failed(e.error))?;

        debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Configured provider, or Ollama.
    pub fn provider(&self) -> Provider {
        self.provider.unwrap_or_default()
    }

    /// Configured model for `provider`, or its built-in default.
    pub fn model_for(&self, provider: Provider) -> String {
        self.models
            .get(&provider)
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| provider.default_model())
            .to_string()
    }

    pub fn ollama_url(&self) -> &str {
        self.ollama_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_OLLAMA_URL)
    }

    /// Combine flags and config into the settings for this run.
    ///
    /// Flags win over the config file, which wins over built-in defaults.
    pub fn resolve(&self, overrides: &Overrides) -> Result<ProviderSettings, LlmError> {
        let provider = match overrides.provider.as_deref() {
            Some(name) => name.parse::<Provider>()?,
            None => self.provider(),
        };

        let model = overrides
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.model_for(provider));

        Ok(ProviderSettings {
            provider,
            model,
            ollama_url: self.ollama_url().to_string(),
        })
    }
}
