// src/config/scorer.rs
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, time::Duration};
use tracing::info;

pub const DEFAULT_SCORER_CONFIG_PATH: &str = "config/scorer.toml";
pub const ENV_SCORER_CONFIG_PATH: &str = "SCORER_CONFIG_PATH";

pub const ENV_HF_TOKEN: &str = "HF_TOKEN";
pub const ENV_SCORER_ENDPOINT: &str = "SCORER_ENDPOINT";
pub const ENV_SCORER_MODEL: &str = "SCORER_MODEL";
pub const ENV_SCORER_TIMEOUT_SECS: &str = "SCORER_TIMEOUT_SECS";

const HF_INFERENCE_BASE: &str = "https://api-inference.huggingface.co/models";

fn default_model() -> String {
    "mistralai/Mistral-7B-Instruct".to_string()
}
fn default_timeout_secs() -> u64 {
    45
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_length() -> u32 {
    500
}
fn default_cache_capacity() -> usize {
    100
}

/// Settings for the external text-generation scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Bearer token. `"ENV"` (or absent) means: read from `HF_TOKEN`.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Full inference URL; derived from `model` when absent.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_length")]
    pub max_length: u32,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            token: None,
            model: default_model(),
            endpoint: None,
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_length: default_max_length(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl ScorerConfig {
    /// Parse a TOML file. A missing file is an error here; see [`ScorerConfig::from_env`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading scorer config {}", path.display()))?;
        let cfg: ScorerConfig = toml::from_str(&data)
            .with_context(|| format!("parsing scorer config {}", path.display()))?;
        Ok(cfg)
    }

    /// Load from `SCORER_CONFIG_PATH` (or the default path), falling back to
    /// defaults when the file does not exist, then apply env overrides.
    pub fn from_env() -> anyhow::Result<Self> {
        let path = env::var(ENV_SCORER_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_SCORER_CONFIG_PATH.to_string());

        let cfg = if Path::new(&path).exists() {
            Self::load_from_file(&path)?
        } else {
            info!(%path, "scorer config not found, using defaults");
            Self::default()
        };

        Ok(cfg.with_env_overrides())
    }

    /// Apply `HF_TOKEN`, `SCORER_ENDPOINT`, `SCORER_MODEL`, `SCORER_TIMEOUT_SECS`.
    pub fn with_env_overrides(mut self) -> Self {
        let file_token = self
            .token
            .take()
            .filter(|t| !t.trim().is_empty() && !t.trim().eq_ignore_ascii_case("env"));
        self.token = non_empty_env(ENV_HF_TOKEN).or(file_token);

        if let Some(model) = non_empty_env(ENV_SCORER_MODEL) {
            self.model = model;
        }
        if let Some(endpoint) = non_empty_env(ENV_SCORER_ENDPOINT) {
            self.endpoint = Some(endpoint);
        }
        if let Some(secs) =
            non_empty_env(ENV_SCORER_TIMEOUT_SECS).and_then(|s| s.trim().parse::<u64>().ok())
        {
            self.timeout_secs = secs;
        }

        // Sanitize
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            self.temperature = default_temperature();
        }
        self
    }

    /// Whether a credential is available; without one the scorer stays off.
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn endpoint_url(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| format!("{HF_INFERENCE_BASE}/{}", self.model))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for k in [
            ENV_HF_TOKEN,
            ENV_SCORER_ENDPOINT,
            ENV_SCORER_MODEL,
            ENV_SCORER_TIMEOUT_SECS,
        ] {
            env::remove_var(k);
        }
    }

    #[test]
    fn defaults_match_inference_contract() {
        let cfg = ScorerConfig::default();
        assert_eq!(cfg.timeout(), Duration::from_secs(45));
        assert_eq!(cfg.max_length, 500);
        assert!((cfg.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(cfg.cache_capacity, 100);
        assert_eq!(
            cfg.endpoint_url(),
            "https://api-inference.huggingface.co/models/mistralai/Mistral-7B-Instruct"
        );
        assert!(!cfg.has_token());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: ScorerConfig = toml::from_str("model = \"org/other\"\ncache_capacity = 8\n")
            .expect("parse toml");
        assert_eq!(cfg.model, "org/other");
        assert_eq!(cfg.cache_capacity, 8);
        assert_eq!(cfg.timeout_secs, 45);
        assert!(cfg.endpoint_url().ends_with("/org/other"));
    }

    #[test]
    #[serial]
    fn env_token_wins_and_env_placeholder_is_ignored() {
        clear_env();
        let cfg = ScorerConfig {
            token: Some("ENV".into()),
            ..ScorerConfig::default()
        }
        .with_env_overrides();
        assert!(!cfg.has_token());

        env::set_var(ENV_HF_TOKEN, "hf_test");
        env::set_var(ENV_SCORER_TIMEOUT_SECS, "3");
        let cfg = ScorerConfig::default().with_env_overrides();
        assert_eq!(cfg.token.as_deref(), Some("hf_test"));
        assert_eq!(cfg.timeout(), Duration::from_secs(3));
        clear_env();
    }

    #[test]
    #[serial]
    fn zero_timeout_falls_back_to_default() {
        clear_env();
        env::set_var(ENV_SCORER_TIMEOUT_SECS, "0");
        let cfg = ScorerConfig::default().with_env_overrides();
        assert_eq!(cfg.timeout_secs, 45);
        clear_env();
    }
}
