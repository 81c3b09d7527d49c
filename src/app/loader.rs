//! Configuration loading
//!
//! Embedded defaults, then optional files, then environment variables.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let env_name = std::env::var("ROSTER_ENV").unwrap_or_else(|_| "development".to_string());

    let config = Config::builder()
        // 1. Embedded defaults (always available)
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. External overrides (optional)
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{env_name}")).required(false))
        .add_source(File::with_name("config/local").required(false))
        // 3. Environment variables (highest priority): ROSTER_LLM__DEFAULT_PROVIDER
        .add_source(
            Environment::with_prefix("ROSTER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let app: AppConfig = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;
    app.validate().context("Invalid configuration")?;
    Ok(app)
}

/// Parse a configuration from TOML text layered over the embedded defaults
#[cfg(test)]
fn load_from_str(overrides: &str) -> Result<AppConfig> {
    let config = Config::builder()
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        .add_source(File::from_str(overrides, FileFormat::Toml))
        .build()
        .context("Failed to build configuration")?;
    let app: AppConfig = config.try_deserialize()?;
    app.validate()?;
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::ProviderKind;

    #[test]
    fn test_embedded_defaults_parse() {
        let config = load_from_str("").unwrap();
        assert_eq!(config.llm.default_provider, "mock");
        assert_eq!(config.llm.providers.len(), 2);
        assert_eq!(config.llm.providers[1].kind, ProviderKind::OpenAi);
        assert_eq!(config.collaboration.contribution_max_tokens, 400);
        assert_eq!(config.collaboration.synthesis_max_tokens, 1200);
        assert_eq!(config.dispatcher.history_window, 10);
        assert_eq!(config.dispatcher.workflow_patterns.len(), 2);
        assert_eq!(config.events.capacity, 256);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = load_from_str(
            r#"
            [llm]
            default_provider = "openai"

            [collaboration]
            max_discussion_pairs = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.llm.default_provider, "openai");
        assert_eq!(config.collaboration.max_discussion_pairs, 1);
        assert_eq!(config.collaboration.discussion_max_tokens, 200);
    }

    #[test]
    fn test_embedded_workflow_patterns_compile() {
        let config = load_from_str("").unwrap();
        let detector =
            roster_core::PatternWorkflowDetector::new(&config.dispatcher.workflow_patterns);
        assert!(detector.is_ok());
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let result = load_from_str("[dispatcher]\ncall_timeout_ms = 0\n");
        assert!(result.is_err());
    }
}
