//! Application bootstrap
//!
//! Wires configuration, the agent directory, model backends and the
//! dispatcher into one [`App`] the CLI commands share.

pub mod config;
pub mod loader;
pub mod providers;

use anyhow::{Context, Result};
use roster_core::{
    AgentDirectory, Dispatcher, EventBus, StaticAgentLoader, StatusBoard, TomlAgentLoader,
};
use roster_llm::LlmRouter;
use std::sync::Arc;
use tracing::{info, warn};

pub use config::AppConfig;
pub use loader::load_config;
pub use providers::resolve_llm_provider;

/// Fully wired application
pub struct App {
    pub config: AppConfig,
    pub directory: Arc<AgentDirectory>,
    pub router: Arc<LlmRouter>,
    pub dispatcher: Dispatcher,
}

impl App {
    /// Load configuration and build every component
    pub async fn bootstrap() -> Result<Self> {
        let config = load_config()?;
        Self::from_config(config).await
    }

    /// Build every component from an already-loaded configuration
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let directory = Arc::new(load_directory(&config).await?);
        let router = resolve_llm_provider(&config.llm)?;

        let status = StatusBoard::new(EventBus::new(config.events.capacity));
        let dispatcher = Dispatcher::builder(directory.clone(), router.clone())
            .status_board(status)
            .config(config.dispatcher.clone())
            .collaboration_config(config.collaboration.clone())
            .build()
            .context("Failed to build dispatcher")?;

        info!(
            agents = directory.len(),
            default_provider = router.default_provider_name(),
            "Roster ready"
        );

        Ok(Self {
            config,
            directory,
            router,
            dispatcher,
        })
    }
}

/// Load agents from the configured directory, falling back to the built-in
/// roster when nothing usable is found there
async fn load_directory(config: &AppConfig) -> Result<AgentDirectory> {
    let loader = TomlAgentLoader::with_path(&config.agents.dir);
    let toml_directory = AgentDirectory::new(Arc::new(loader));
    let count = toml_directory
        .load()
        .await
        .with_context(|| format!("Failed to load agents from {}", config.agents.dir))?;

    if count > 0 || !config.agents.builtin_fallback {
        return Ok(toml_directory);
    }

    warn!(dir = %config.agents.dir, "No agent definitions found, using the built-in roster");
    let directory = AgentDirectory::new(Arc::new(StaticAgentLoader::builtin()));
    directory
        .load()
        .await
        .context("Failed to load the built-in roster")?;
    Ok(directory)
}
