//! LLM provider resolution
//!
//! Registers every configured backend with the router.

use super::config::{LlmSettings, ProviderKind, ProviderSettings};
use anyhow::{bail, Context, Result};
use roster_llm::{LlmProvider, LlmRouter, MockProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Build the router from configuration
///
/// OpenAI-compatible backends without an API key are skipped with a warning.
/// When the configured default is unavailable the first registered backend
/// takes its place.
pub fn resolve_llm_provider(settings: &LlmSettings) -> Result<Arc<LlmRouter>> {
    let mut router = LlmRouter::new(&settings.default_provider);
    let mut registered: Vec<String> = Vec::new();

    for provider_settings in &settings.providers {
        match build_provider(provider_settings)? {
            Some(provider) => {
                router.register(&provider_settings.name, provider);
                registered.push(provider_settings.name.clone());
                info!(
                    provider = %provider_settings.name,
                    kind = ?provider_settings.kind,
                    "Registered LLM provider"
                );
            }
            None => warn!(
                provider = %provider_settings.name,
                "Skipping LLM provider without an API key"
            ),
        }
    }

    let Some(first) = registered.first() else {
        bail!("No LLM providers could be registered; check [llm.providers] and API keys");
    };

    if !registered.contains(&settings.default_provider) {
        warn!(
            requested = %settings.default_provider,
            fallback = %first,
            "Default LLM provider unavailable, falling back"
        );
        router.set_default(first.clone());
    }

    Ok(Arc::new(router))
}

fn build_provider(settings: &ProviderSettings) -> Result<Option<Arc<dyn LlmProvider>>> {
    match settings.kind {
        ProviderKind::Mock => {
            let mut provider = MockProvider::named(&settings.name);
            if let Some(reply) = &settings.reply {
                provider = provider.with_default_reply(reply);
            }
            Ok(Some(Arc::new(provider)))
        }
        ProviderKind::OpenAi => {
            let Some(api_key) = settings.resolve_api_key() else {
                return Ok(None);
            };
            let mut config = OpenAiCompatibleConfig::new(api_key)
                .with_name(&settings.name)
                .with_timeout(Duration::from_secs(settings.timeout_secs));
            if let Some(base_url) = &settings.base_url {
                config = config.with_base_url(base_url);
            }
            if let Some(model) = &settings.model {
                config = config.with_model(model);
            }
            let provider = OpenAiCompatibleProvider::new(config)
                .with_context(|| format!("Failed to initialize provider '{}'", settings.name))?;
            Ok(Some(Arc::new(provider)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openai_without_key(name: &str) -> ProviderSettings {
        ProviderSettings {
            kind: ProviderKind::OpenAi,
            api_key_env: Some("ROSTER_TEST_NO_SUCH_API_KEY".to_string()),
            ..ProviderSettings::mock(name)
        }
    }

    #[test]
    fn test_mock_provider_registered_as_default() {
        let router = resolve_llm_provider(&LlmSettings::default()).unwrap();
        assert_eq!(router.default_provider_name(), "mock");
        assert!(router.get("mock").is_some());
    }

    #[test]
    fn test_openai_without_key_is_skipped() {
        let settings = LlmSettings {
            default_provider: "mock".to_string(),
            providers: vec![ProviderSettings::mock("mock"), openai_without_key("openai")],
        };
        let router = resolve_llm_provider(&settings).unwrap();
        assert!(router.get("openai").is_none());
        assert!(router.get("mock").is_some());
    }

    #[test]
    fn test_unavailable_default_falls_back_to_first() {
        let settings = LlmSettings {
            default_provider: "openai".to_string(),
            providers: vec![openai_without_key("openai"), ProviderSettings::mock("offline")],
        };
        let router = resolve_llm_provider(&settings).unwrap();
        assert_eq!(router.default_provider_name(), "offline");
    }

    #[test]
    fn test_no_providers_is_an_error() {
        let settings = LlmSettings {
            default_provider: "openai".to_string(),
            providers: vec![openai_without_key("openai")],
        };
        assert!(resolve_llm_provider(&settings).is_err());
    }

    #[test]
    fn test_openai_with_inline_key_registers() {
        let mut settings = openai_without_key("gateway");
        settings.api_key = Some("sk-test-key-123456".to_string());
        settings.base_url = Some("http://localhost:8080/v1/".to_string());
        let router = resolve_llm_provider(&LlmSettings {
            default_provider: "gateway".to_string(),
            providers: vec![settings],
        })
        .unwrap();
        let provider = router.get("gateway").unwrap();
        assert_eq!(provider.name(), "gateway");
    }

    #[tokio::test]
    async fn test_mock_reply_is_configurable() {
        let mut settings = ProviderSettings::mock("mock");
        settings.reply = Some("offline answer".to_string());
        let router = resolve_llm_provider(&LlmSettings {
            default_provider: "mock".to_string(),
            providers: vec![settings],
        })
        .unwrap();
        let response = router
            .resolve(None)
            .unwrap()
            .complete(roster_llm::CompletionRequest::new("mock-model"))
            .await
            .unwrap();
        assert_eq!(response.content, "offline answer");
    }
}
