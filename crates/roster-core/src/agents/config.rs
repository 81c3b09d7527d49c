//! Agent Configuration
//!
//! Types describing an agent: identity, expertise tags, tool capabilities and
//! the model backend it is bound to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// External actions an agent may invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCapability {
    /// Run code in a sandbox
    CodeExecution,
    /// Search the web
    WebSearch,
    /// Read and write user files
    FileAccess,
    /// Generate images
    ImageGeneration,
    /// Open and read web pages
    WebBrowse,
    /// Analyze tabular data
    DataAnalysis,
}

impl ToolCapability {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CodeExecution => "code_execution",
            Self::WebSearch => "web_search",
            Self::FileAccess => "file_access",
            Self::ImageGeneration => "image_generation",
            Self::WebBrowse => "web_browse",
            Self::DataAnalysis => "data_analysis",
        }
    }
}

impl fmt::Display for ToolCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which model backend serves an agent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelBinding {
    /// Use the router's default provider and model
    #[default]
    Inherit,
    /// Use a named provider, optionally with a specific model
    Specific {
        /// Provider name registered in the router
        provider: String,
        /// Model id (provider default when absent)
        #[serde(default)]
        model: Option<String>,
    },
}

impl ModelBinding {
    /// Provider name, `None` when inheriting
    #[must_use]
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Inherit => None,
            Self::Specific { provider, .. } => Some(provider),
        }
    }

    /// Model id, `None` when the provider default applies
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Inherit => None,
            Self::Specific { model, .. } => model.as_deref(),
        }
    }
}

/// Runtime status of an agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Waiting for work
    #[default]
    Idle,
    /// A model call is in flight
    Thinking,
    /// The last call failed
    Error,
}

/// Lightweight reference returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRef {
    /// Agent id
    pub id: String,
    /// Display name
    pub name: String,
}

/// Agent definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Unique agent identifier (e.g., "design-specialist")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Agent description
    pub description: String,
    /// Declared expertise tags
    #[serde(default)]
    pub expertise: Vec<String>,
    /// Tool capabilities
    #[serde(default)]
    pub tools: BTreeSet<ToolCapability>,
    /// Model backend binding
    #[serde(default)]
    pub model: ModelBinding,
    /// Persona prompt (generated from the description when empty)
    #[serde(default)]
    pub prompt: String,
}

impl Agent {
    /// Create a new agent with basic settings
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            expertise: Vec::new(),
            tools: BTreeSet::new(),
            model: ModelBinding::Inherit,
            prompt: String::new(),
        }
    }

    /// Set expertise tags
    #[must_use]
    pub fn with_expertise(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.expertise = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set tool capabilities
    #[must_use]
    pub fn with_tools(mut self, tools: impl IntoIterator<Item = ToolCapability>) -> Self {
        self.tools = tools.into_iter().collect();
        self
    }

    /// Bind to a specific provider/model
    #[must_use]
    pub fn with_model(mut self, provider: impl Into<String>, model: Option<String>) -> Self {
        self.model = ModelBinding::Specific {
            provider: provider.into(),
            model,
        };
        self
    }

    /// Set the persona prompt
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Whether the agent holds a tool capability
    #[must_use]
    pub fn has_tool(&self, tool: ToolCapability) -> bool {
        self.tools.contains(&tool)
    }

    /// Whether the agent declares an expertise tag (case-insensitive)
    #[must_use]
    pub fn has_expertise(&self, tag: &str) -> bool {
        self.expertise.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Number of declared expertise tags plus tools
    #[must_use]
    pub fn capability_count(&self) -> usize {
        self.expertise.len() + self.tools.len()
    }

    /// Persona prompt, falling back to one built from the description
    #[must_use]
    pub fn persona_prompt(&self) -> String {
        if self.prompt.trim().is_empty() {
            format!("You are {}, {}.", self.name, self.description.trim_end_matches('.'))
        } else {
            self.prompt.clone()
        }
    }

    /// Reference for responses
    #[must_use]
    pub fn to_ref(&self) -> AgentRef {
        AgentRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }

    /// Create a frontend developer agent
    pub fn frontend_developer() -> Self {
        Self::new(
            "frontend-developer",
            "Frontend Developer",
            "Builds responsive user interfaces, web components and client-side state",
        )
        .with_expertise(["frontend", "design"])
        .with_tools([ToolCapability::CodeExecution, ToolCapability::FileAccess])
    }

    /// Create a backend engineer agent
    pub fn backend_engineer() -> Self {
        Self::new(
            "backend-engineer",
            "Backend Engineer",
            "Designs APIs, server logic and service integrations",
        )
        .with_expertise(["backend", "database", "security"])
        .with_tools([ToolCapability::CodeExecution, ToolCapability::FileAccess])
    }

    /// Create a design specialist agent
    pub fn design_specialist() -> Self {
        Self::new(
            "design-specialist",
            "Design Specialist",
            "Creates visual identities, layouts, wireframes and interface mockups",
        )
        .with_expertise(["design"])
        .with_tools([ToolCapability::ImageGeneration])
    }

    /// Create a database architect agent
    pub fn database_architect() -> Self {
        Self::new(
            "database-architect",
            "Database Architect",
            "Models schemas, tunes queries and plans data migrations",
        )
        .with_expertise(["database", "data"])
        .with_tools([ToolCapability::CodeExecution, ToolCapability::DataAnalysis])
    }

    /// Create a security analyst agent
    pub fn security_analyst() -> Self {
        Self::new(
            "security-analyst",
            "Security Analyst",
            "Reviews systems for vulnerabilities, authentication flaws and compliance gaps",
        )
        .with_expertise(["security"])
        .with_tools([ToolCapability::WebSearch])
    }

    /// Create a QA engineer agent
    pub fn qa_engineer() -> Self {
        Self::new(
            "qa-engineer",
            "QA Engineer",
            "Writes test plans, automated tests and bug reports",
        )
        .with_expertise(["testing"])
        .with_tools([ToolCapability::CodeExecution])
    }

    /// Create a DevOps engineer agent
    pub fn devops_engineer() -> Self {
        Self::new(
            "devops-engineer",
            "DevOps Engineer",
            "Automates deployment pipelines, containers and cloud infrastructure",
        )
        .with_expertise(["devops"])
        .with_tools([ToolCapability::CodeExecution, ToolCapability::WebBrowse])
    }

    /// Create a data analyst agent
    pub fn data_analyst() -> Self {
        Self::new(
            "data-analyst",
            "Data Analyst",
            "Analyzes datasets, builds reports and explains metrics",
        )
        .with_expertise(["data", "research"])
        .with_tools([ToolCapability::DataAnalysis, ToolCapability::CodeExecution])
    }

    /// Create a content writer agent
    pub fn content_writer() -> Self {
        Self::new(
            "content-writer",
            "Content Writer",
            "Writes articles, documentation, emails and product copy",
        )
        .with_expertise(["writing"])
        .with_tools([ToolCapability::WebSearch])
    }

    /// Create a marketing strategist agent
    pub fn marketing_strategist() -> Self {
        Self::new(
            "marketing-strategist",
            "Marketing Strategist",
            "Plans campaigns, positioning, audience growth and brand messaging",
        )
        .with_expertise(["marketing"])
        .with_tools([ToolCapability::WebSearch, ToolCapability::WebBrowse])
    }

    /// Create a research analyst agent
    pub fn research_analyst() -> Self {
        Self::new(
            "research-analyst",
            "Research Analyst",
            "Gathers sources, compares options and summarizes findings",
        )
        .with_expertise(["research"])
        .with_tools([ToolCapability::WebSearch, ToolCapability::WebBrowse])
    }

    /// Get the built-in roster
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::frontend_developer(),
            Self::backend_engineer(),
            Self::design_specialist(),
            Self::database_architect(),
            Self::security_analyst(),
            Self::qa_engineer(),
            Self::devops_engineer(),
            Self::data_analyst(),
            Self::content_writer(),
            Self::marketing_strategist(),
            Self::research_analyst(),
        ]
    }
}
