//! Application configuration
//!
//! Loaded from an optional TOML file:
//!
//! ```toml
//! store = "axiom-store.json"
//!
//! [gemini]
//! model = "gemini-2.0-flash-exp"
//! ```
//!
//! `GEMINI_API_KEY` overrides `gemini.api_key`.

use anyhow::{Context, Result};
use axiom_gemini::GeminiConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Store file used when neither the command line nor the config names one
pub const DEFAULT_STORE: &str = "axiom-store.json";

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Local store file
    pub store: PathBuf,
    /// Assistant backend settings
    pub gemini: GeminiConfig,
}

impl AppConfig {
    /// Parse from TOML text, without environment overrides
    ///
    /// # Errors
    /// If the text is not a valid configuration document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    /// Load from `path`, or defaults when no path is given
    ///
    /// # Errors
    /// If the file cannot be read or parsed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Self::from_toml_str(&text)
                    .with_context(|| format!("in config {}", path.display()))?
            }
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Apply environment overrides
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        self.gemini = self.gemini.with_env_overrides();
        self
    }

    /// With store path
    #[inline]
    #[must_use]
    pub fn with_store(mut self, store: impl Into<PathBuf>) -> Self {
        self.store = store.into();
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: PathBuf::from(DEFAULT_STORE),
            gemini: GeminiConfig::default(),
        }
    }
}
