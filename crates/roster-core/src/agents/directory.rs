//! Agent Directory
//!
//! Explicitly constructed registry of agents. The directory is loaded once
//! through an [`AgentLoader`] and is read-only afterwards, so it can be shared
//! behind an `Arc` across concurrent requests.

use super::config::Agent;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Default agent configuration directory
const DEFAULT_AGENTS_DIR: &str = "config/agents";

/// Source of agent definitions
#[async_trait]
pub trait AgentLoader: Send + Sync {
    /// Load all agent definitions in directory order
    async fn load_agents(&self) -> Result<Vec<Agent>>;
}

/// Loader over an in-memory list
#[derive(Debug, Clone, Default)]
pub struct StaticAgentLoader {
    agents: Vec<Agent>,
}

impl StaticAgentLoader {
    /// Create from a list of agents
    #[must_use]
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    /// Loader serving the built-in roster
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(Agent::defaults())
    }
}

#[async_trait]
impl AgentLoader for StaticAgentLoader {
    async fn load_agents(&self) -> Result<Vec<Agent>> {
        Ok(self.agents.clone())
    }
}

/// Loader reading one TOML file per agent
#[derive(Debug, Clone)]
pub struct TomlAgentLoader {
    config_dir: PathBuf,
}

impl TomlAgentLoader {
    /// Create loader with default path (`config/agents/`)
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_AGENTS_DIR),
        }
    }

    /// Create loader with custom path
    #[must_use]
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            config_dir: path.as_ref().to_path_buf(),
        }
    }

    /// Return configuration directory path
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Read every `*.toml` file, sorted by file name
    ///
    /// # Errors
    /// - Directory read failure
    /// - Individual file parse failures are warned and skipped
    pub fn load_all(&self) -> Result<Vec<Agent>> {
        if !self.config_dir.exists() {
            warn!("Agents directory not found: {:?}", self.config_dir);
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.config_dir).map_err(|e| {
            Error::Configuration(format!(
                "Failed to read agents directory {:?}: {}",
                self.config_dir, e
            ))
        })?;

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| Self::is_toml_file(path))
            .collect();
        paths.sort();

        let mut agents = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::load_file(&path) {
                Ok(agent) => {
                    debug!(agent = %agent.id, "Loaded agent from {:?}", path);
                    agents.push(agent);
                }
                Err(e) => {
                    warn!("Failed to load {:?}: {}", path, e);
                }
            }
        }

        Ok(agents)
    }

    fn load_file(path: &Path) -> Result<Agent> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Configuration(format!("Failed to read {:?}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Configuration(format!("Failed to parse {:?}: {}", path, e)))
    }

    fn is_toml_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "toml")
    }
}

impl Default for TomlAgentLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentLoader for TomlAgentLoader {
    async fn load_agents(&self) -> Result<Vec<Agent>> {
        let loader = self.clone();
        tokio::task::spawn_blocking(move || loader.load_all())
            .await
            .map_err(|e| Error::Internal(format!("agent loader task failed: {e}")))?
    }
}

/// Read-only agent registry with an explicit load lifecycle
pub struct AgentDirectory {
    loader: Arc<dyn AgentLoader>,
    agents: OnceCell<Vec<Agent>>,
}

impl AgentDirectory {
    /// Create an unloaded directory
    #[must_use]
    pub fn new(loader: Arc<dyn AgentLoader>) -> Self {
        Self {
            loader,
            agents: OnceCell::new(),
        }
    }

    /// Create a directory that is already loaded
    ///
    /// # Errors
    /// Returns `Error::Configuration` on duplicate agent ids.
    pub fn from_agents(agents: Vec<Agent>) -> Result<Self> {
        Self::validate(&agents)?;
        Ok(Self {
            loader: Arc::new(StaticAgentLoader::new(agents.clone())),
            agents: OnceCell::new_with(Some(agents)),
        })
    }

    /// Load agents through the loader. Runs at most once; later calls
    /// return the cached count.
    ///
    /// # Errors
    /// Loader failures and duplicate ids. A failed load leaves the
    /// directory unloaded so it can be retried.
    pub async fn load(&self) -> Result<usize> {
        let agents = self
            .agents
            .get_or_try_init(|| async {
                let agents = self.loader.load_agents().await?;
                Self::validate(&agents)?;
                info!(count = agents.len(), "Agent directory loaded");
                Ok::<_, Error>(agents)
            })
            .await?;
        Ok(agents.len())
    }

    /// Whether `load()` has completed
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.agents.initialized()
    }

    /// All agents in directory order
    ///
    /// # Errors
    /// `Error::DirectoryNotReady` before `load()`.
    pub fn agents(&self) -> Result<&[Agent]> {
        self.agents
            .get()
            .map(Vec::as_slice)
            .ok_or(Error::DirectoryNotReady)
    }

    /// Look up an agent by id
    ///
    /// # Errors
    /// `Error::DirectoryNotReady` before `load()`, `Error::AgentNotFound`
    /// for unknown ids.
    pub fn get(&self, id: &str) -> Result<&Agent> {
        self.agents()?
            .iter()
            .find(|agent| agent.id == id)
            .ok_or_else(|| Error::AgentNotFound(id.to_string()))
    }

    /// Number of loaded agents (0 before load)
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.get().map_or(0, Vec::len)
    }

    /// Whether no agents are loaded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(agents: &[Agent]) -> Result<()> {
        let mut seen = HashSet::new();
        for agent in agents {
            if agent.id.trim().is_empty() {
                return Err(Error::Configuration(format!(
                    "agent '{}' has an empty id",
                    agent.name
                )));
            }
            if !seen.insert(agent.id.as_str()) {
                return Err(Error::Configuration(format!(
                    "duplicate agent id: {}",
                    agent.id
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for AgentDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentDirectory")
            .field("ready", &self.is_ready())
            .field("agents", &self.len())
            .finish()
    }
}
