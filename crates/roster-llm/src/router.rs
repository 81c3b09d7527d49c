//! LLM Router
//!
//! Registry of named providers with a default. Agents either bind to a named
//! provider or inherit the default one; `resolve` applies that rule.

use crate::error::{Error, Result};
use crate::provider::LlmProvider;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// LLM Router for managing multiple providers
pub struct LlmRouter {
    providers: HashMap<String, Arc<dyn LlmProvider>>,
    default_provider: String,
}

impl LlmRouter {
    /// Create a new router
    #[must_use]
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Create a router holding a single provider, which is also the default
    #[must_use]
    pub fn single(provider: Arc<dyn LlmProvider>) -> Self {
        let mut router = Self::new(provider.name().to_string());
        router.register(provider.name().to_string(), provider);
        router
    }

    /// Register a provider
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn LlmProvider>) {
        let name = name.into();
        debug!(provider = %name, "Registering LLM provider");
        self.providers.insert(name, provider);
    }

    /// Get a provider by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn LlmProvider>> {
        self.providers.get(name).cloned()
    }

    /// Get the default provider
    #[must_use]
    pub fn default_provider(&self) -> Option<Arc<dyn LlmProvider>> {
        self.get(&self.default_provider)
    }

    /// Get the default provider name
    #[must_use]
    pub fn default_provider_name(&self) -> &str {
        &self.default_provider
    }

    /// Set the default provider
    pub fn set_default(&mut self, name: impl Into<String>) {
        self.default_provider = name.into();
    }

    /// List registered provider names (sorted)
    #[must_use]
    pub fn list_providers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a provider binding.
    ///
    /// `Some(name)` picks that provider, falling back to the default with a
    /// warning when the name is not registered. `None` means "inherit default".
    pub fn resolve(&self, name: Option<&str>) -> Result<Arc<dyn LlmProvider>> {
        if let Some(name) = name {
            if let Some(provider) = self.get(name) {
                return Ok(provider);
            }
            warn!(provider = %name, default = %self.default_provider, "Bound provider not registered, using default");
        }

        self.default_provider()
            .ok_or_else(|| Error::NotConfigured(self.default_provider.clone()))
    }
}

impl std::fmt::Debug for LlmRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmRouter")
            .field("providers", &self.list_providers())
            .field("default_provider", &self.default_provider)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;

    fn router() -> LlmRouter {
        let mut router = LlmRouter::new("primary");
        router.register("primary", Arc::new(MockProvider::named("primary")));
        router.register("secondary", Arc::new(MockProvider::named("secondary")));
        router
    }

    #[test]
    fn test_resolve_named_provider() {
        let router = router();
        assert_eq!(router.resolve(Some("secondary")).unwrap().name(), "secondary");
    }

    #[test]
    fn test_resolve_inherits_default() {
        let router = router();
        assert_eq!(router.resolve(None).unwrap().name(), "primary");
        assert_eq!(router.resolve(Some("missing")).unwrap().name(), "primary");
    }

    #[test]
    fn test_resolve_without_default_fails() {
        let router = LlmRouter::new("nothing");
        assert!(matches!(router.resolve(None), Err(Error::NotConfigured(_))));
    }

    #[test]
    fn test_list_providers_sorted() {
        assert_eq!(router().list_providers(), vec!["primary", "secondary"]);
    }
}
