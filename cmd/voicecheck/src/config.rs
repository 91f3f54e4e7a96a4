//! Server configuration loading.
//!
//! Configuration files are YAML or JSON, chosen by extension. Every field
//! is optional. API keys of the form `$VAR` or `${VAR}` are read from the
//! environment so secrets can stay out of the file.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use voicecheck_detect::EngineConfig;

/// Default listen address.
pub const DEFAULT_LISTEN: &str = ":8001";

/// Default request body limit. Base64 inflates audio by a third, so this
/// admits clips of roughly 18MB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Service configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address, e.g. ":8001" or "127.0.0.1:8001".
    pub listen: String,
    /// Accepted API keys.
    pub api_keys: Vec<String>,
    /// Accepted values of the request's `language` field (case-insensitive).
    pub languages: Vec<String>,
    /// The single accepted value of the request's `audioFormat` field.
    pub audio_format: String,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
            api_keys: Vec::new(),
            languages: ["Tamil", "English", "Hindi", "Malayalam", "Telugu"]
                .into_iter()
                .map(String::from)
                .collect(),
            audio_format: "mp3".to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Expands environment references in API keys, drops empty keys and
    /// duplicates, and checks the result is usable.
    pub fn finalize(&mut self) -> Result<()> {
        let keys: BTreeSet<String> = self
            .api_keys
            .iter()
            .map(|k| expand_env(k.trim()))
            .filter(|k| !k.is_empty())
            .collect();
        self.api_keys = keys.into_iter().collect();

        if self.api_keys.is_empty() {
            anyhow::bail!(
                "no API keys configured; pass --api-key, set VOICECHECK_API_KEYS, or add api_keys to the config file"
            );
        }
        if self.languages.is_empty() {
            anyhow::bail!("languages must not be empty");
        }
        self.engine
            .validate()
            .context("invalid engine configuration")?;
        Ok(())
    }
}

/// Loads a configuration file.
pub fn load(path: &Path) -> Result<ServerConfig> {
    let data = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");

    let cfg = match ext {
        "json" => serde_json::from_slice(&data)?,
        "yaml" | "yml" => serde_yaml::from_slice(&data)?,
        _ => anyhow::bail!("unsupported config format: {}", path.display()),
    };
    Ok(cfg)
}

/// Expands `$VAR` / `${VAR}`; unset variables expand to the empty string.
fn expand_env(s: &str) -> String {
    if let Some(rest) = s.strip_prefix('$') {
        let var_name = rest
            .strip_prefix('{')
            .and_then(|r| r.strip_suffix('}'))
            .unwrap_or(rest);
        std::env::var(var_name).unwrap_or_default()
    } else {
        s.to_string()
    }
}
