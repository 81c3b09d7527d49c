//! Agents - directory, definitions and runtime status

mod config;
mod directory;
mod status;

pub use config::{Agent, AgentRef, AgentStatus, ModelBinding, ToolCapability};
pub use directory::{AgentDirectory, AgentLoader, StaticAgentLoader, TomlAgentLoader};
pub use status::StatusBoard;
