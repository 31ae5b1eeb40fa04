//! Global configuration types.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! model settings, agent limits, and the harvest service endpoint.

use serde::{Deserialize, Serialize};

/// Top-level configuration for ProperBot.
///
/// Loaded from `~/.properbot/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Model identifier sent to the LLM provider.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature. Zero keeps structured actions deterministic.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum output tokens per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound on tool-call iterations per user turn.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Number of past turns kept in the conversation window.
    #[serde(default = "default_window_turns")]
    pub window_turns: usize,

    /// Maximum listing rows surfaced per search.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Override the provider's default base URL (for compatible gateways).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Harvest service settings.
    #[serde(default)]
    pub harvest: HarvestConfig,
}

/// Settings for the external harvest service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Base URL of the harvest service.
    #[serde(default = "default_harvest_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_harvest_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.0
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_max_iterations() -> u32 {
    6
}

fn default_window_turns() -> usize {
    5
}

fn default_max_results() -> usize {
    20
}

fn default_harvest_base_url() -> String {
    "http://127.0.0.1:8643".to_string()
}

fn default_harvest_timeout_secs() -> u64 {
    30
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_iterations: default_max_iterations(),
            window_turns: default_window_turns(),
            max_results: default_max_results(),
            base_url: None,
            harvest: HarvestConfig::default(),
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: default_harvest_base_url(),
            timeout_secs: default_harvest_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.model, "gpt-4o-mini");
        assert!((config.temperature - 0.0).abs() < f64::EPSILON);
        assert_eq!(config.max_results, 20);
        assert_eq!(config.window_turns, 5);
        assert!(config.base_url.is_none());
        assert_eq!(config.harvest.timeout_secs, 30);
    }

    #[test]
    fn test_global_config_deserialize_empty() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.max_iterations, 6);
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
model = "gpt-4o"
temperature = 0.2
max_results = 10

[harvest]
base_url = "http://harvest.internal:9000"
timeout_secs = 10
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert!((config.temperature - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.max_results, 10);
        assert_eq!(config.harvest.base_url, "http://harvest.internal:9000");
        assert_eq!(config.harvest.timeout_secs, 10);
        // Unspecified fields keep defaults
        assert_eq!(config.window_turns, 5);
    }
}
