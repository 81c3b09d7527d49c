//! Application configuration types
//!
//! Library-level settings (`CollaborationConfig`, `DispatcherConfig`) are
//! embedded as-is so the TOML tables map one-to-one onto the core crate.

use anyhow::{bail, Result};
use roster_core::{CollaborationConfig, DispatcherConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub agents: AgentsSettings,
    #[serde(default)]
    pub collaboration: CollaborationConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub events: EventSettings,
}

impl AppConfig {
    /// Check cross-field constraints the deserializer cannot express
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for provider in &self.llm.providers {
            if provider.name.trim().is_empty() {
                bail!("llm.providers entries need a non-empty name");
            }
            if !seen.insert(provider.name.as_str()) {
                bail!("duplicate llm provider name: {}", provider.name);
            }
        }
        if self.collaboration.call_timeout_ms == 0 || self.dispatcher.call_timeout_ms == 0 {
            bail!("call_timeout_ms must be greater than zero");
        }
        Ok(())
    }
}

/// Model backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Provider used when an agent inherits the default binding
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Backends to register with the router
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderSettings>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: default_providers(),
        }
    }
}

fn default_provider() -> String {
    "mock".to_string()
}

fn default_providers() -> Vec<ProviderSettings> {
    vec![ProviderSettings::mock("mock")]
}

/// Backend kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible `/chat/completions` endpoint
    OpenAi,
    /// Offline canned replies
    Mock,
}

/// One model backend
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Router registration name (referenced by agent model bindings)
    pub name: String,
    pub kind: ProviderKind,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Inline API key; prefer `api_key_env`
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Canned answer for mock backends
    #[serde(default)]
    pub reply: Option<String>,
}

// SECURITY: keep inline keys out of logs
impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("api_key_env", &self.api_key_env)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderSettings {
    /// Offline provider with the default canned reply
    pub fn mock(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ProviderKind::Mock,
            base_url: None,
            api_key: None,
            api_key_env: None,
            model: None,
            timeout_secs: default_timeout_secs(),
            reply: None,
        }
    }

    /// Resolve the API key: inline value first, then the named env var
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                self.api_key_env
                    .as_deref()
                    .and_then(|var| std::env::var(var).ok())
                    .filter(|key| !key.trim().is_empty())
            })
    }
}

fn default_timeout_secs() -> u64 {
    60
}

/// Agent directory settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsSettings {
    /// Directory of `*.toml` agent definitions
    #[serde(default = "default_agents_dir")]
    pub dir: String,
    /// Use the built-in roster when the directory yields no agents
    #[serde(default = "default_true")]
    pub builtin_fallback: bool,
}

impl Default for AgentsSettings {
    fn default() -> Self {
        Self {
            dir: default_agents_dir(),
            builtin_fallback: true,
        }
    }
}

fn default_agents_dir() -> String {
    "config/agents".to_string()
}

fn default_true() -> bool {
    true
}

/// Event bus settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSettings {
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

fn default_event_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_offline() {
        let config = AppConfig::default();
        assert_eq!(config.llm.default_provider, "mock");
        assert_eq!(config.llm.providers.len(), 1);
        assert_eq!(config.llm.providers[0].kind, ProviderKind::Mock);
        assert_eq!(config.agents.dir, "config/agents");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_provider_names_rejected() {
        let mut config = AppConfig::default();
        config.llm.providers.push(ProviderSettings::mock("mock"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.dispatcher.call_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inline_key_wins_over_env() {
        let mut settings = ProviderSettings::mock("x");
        settings.api_key = Some("sk-inline".to_string());
        settings.api_key_env = Some("ROSTER_TEST_UNSET_KEY_VAR".to_string());
        assert_eq!(settings.resolve_api_key().as_deref(), Some("sk-inline"));
    }

    #[test]
    fn test_missing_key_resolves_to_none() {
        let mut settings = ProviderSettings::mock("x");
        settings.api_key = Some("   ".to_string());
        settings.api_key_env = Some("ROSTER_TEST_DEFINITELY_UNSET_VAR".to_string());
        assert!(settings.resolve_api_key().is_none());
    }

    #[test]
    fn test_debug_masks_inline_key() {
        let mut settings = ProviderSettings::mock("x");
        settings.api_key = Some("sk-secret-value".to_string());
        let debug = format!("{settings:?}");
        assert!(!debug.contains("sk-secret-value"));
        assert!(debug.contains("****"));
    }
}
