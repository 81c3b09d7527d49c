//! Error types for roster-core
//!
//! Most failures below the dispatcher are recovered locally (fallback
//! contributions, fallback synthesis, single-agent downgrade). The variants
//! here are the ones that can still reach a caller.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration (agent files, duplicate ids, bad patterns)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Directory used before `load()` completed
    #[error("agent directory not loaded")]
    DirectoryNotReady,

    /// Directory loaded but holds no agents
    #[error("agent directory is empty")]
    EmptyDirectory,

    /// Agent id not present in the directory
    #[error("agent '{0}' not found")]
    AgentNotFound(String),

    /// Malformed dispatch request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Collaboration could not be set up
    #[error("collaboration error: {0}")]
    Collaboration(String),

    /// Workflow or consulting engine failure
    #[error("{engine} engine failed: {message}")]
    Delegate {
        /// Engine name ("workflow", "consulting")
        engine: String,
        /// Failure description
        message: String,
    },

    /// Model call exceeded its deadline
    #[error("model call timed out after {0}ms")]
    Timeout(u64),

    /// Model backend error
    #[error("llm error: {0}")]
    Llm(#[from] roster_llm::Error),

    /// Internal error (I/O, serialization)
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a delegate-engine error
    pub fn delegate(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Delegate {
            engine: engine.into(),
            message: message.into(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for user-friendly error messages
///
/// Provides human-readable error messages and suggestions for fixing.
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::Configuration(msg) => format!("Configuration problem: {msg}"),
            Error::DirectoryNotReady => "The agent roster is still loading.".to_string(),
            Error::EmptyDirectory => "No agents are configured.".to_string(),
            Error::AgentNotFound(id) => format!("There is no agent called '{id}'."),
            Error::InvalidRequest(msg) => format!("The request could not be handled: {msg}"),
            Error::Collaboration(msg) => format!("The team could not be assembled: {msg}"),
            Error::Delegate { engine, message } => {
                format!("The {engine} flow could not complete: {message}")
            }
            Error::Timeout(ms) => format!("The model did not answer within {ms}ms."),
            Error::Llm(e) => format!("Model backend error: {e}"),
            Error::Internal(msg) => format!("Internal error: {msg}"),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::Configuration(_) | Error::EmptyDirectory => {
                Some("Check the files under config/agents/.".to_string())
            }
            Error::AgentNotFound(_) => Some("Run `roster agents` to list available agents.".to_string()),
            Error::Delegate { .. } => {
                Some("Try again in team or solo mode for a general answer.".to_string())
            }
            Error::Timeout(_) | Error::Llm(_) => {
                Some("Check the model backend settings under [llm] and retry.".to_string())
            }
            _ => None,
        }
    }
}

/// Format an error for CLI display
#[must_use]
pub fn format_error_for_cli(error: &Error) -> String {
    match error.suggestion() {
        Some(suggestion) => format!("{}\n{}", error.user_message(), suggestion),
        None => error.user_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delegate_error_display() {
        let err = Error::delegate("workflow", "engine offline");
        assert_eq!(err.to_string(), "workflow engine failed: engine offline");
        assert!(err.user_message().contains("workflow flow"));
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_llm_error_converts() {
        let err: Error = roster_llm::Error::RateLimit.into();
        assert!(matches!(err, Error::Llm(_)));
    }

    #[test]
    fn test_format_for_cli_includes_suggestion() {
        let text = format_error_for_cli(&Error::AgentNotFound("ghost".into()));
        assert!(text.contains("ghost"));
        assert!(text.contains("roster agents"));
    }
}
