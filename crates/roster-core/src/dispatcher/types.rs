//! Dispatcher request/response types

use crate::agents::AgentRef;
use crate::classifier::ComplexityVerdict;
use crate::collaboration::CollaborationMessage;
use crate::error::{Error, Result};
use super::detector::WorkflowPattern;
use crate::heuristics::ExecutionBias;
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_history_window() -> usize {
    10
}

fn default_single_agent_max_tokens() -> u32 {
    800
}

fn default_temperature() -> f32 {
    0.7
}

fn default_call_timeout_ms() -> u64 {
    60_000
}

/// Dispatcher settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// History turns forwarded on single-agent paths
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Token limit for single-agent answers
    #[serde(default = "default_single_agent_max_tokens")]
    pub single_agent_max_tokens: u32,
    /// Sampling temperature for single-agent answers
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Per-call timeout in milliseconds
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    /// Recurring-task patterns that redirect team requests to a workflow
    #[serde(default)]
    pub workflow_patterns: Vec<WorkflowPattern>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            single_agent_max_tokens: default_single_agent_max_tokens(),
            temperature: default_temperature(),
            call_timeout_ms: default_call_timeout_ms(),
            workflow_patterns: Vec::new(),
        }
    }
}

/// Operating mode requested by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    /// Classify, then collaborate or answer alone
    #[default]
    Team,
    /// Single best agent, no classification
    Solo,
    /// One-on-one chat with a named agent
    Direct,
    /// Sequential workflow engine
    Workflow,
    /// Domain consulting engine
    Consulting,
}

impl ModeKind {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Team => "team",
            Self::Solo => "solo",
            Self::Direct => "direct",
            Self::Workflow => "workflow",
            Self::Consulting => "consulting",
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ModeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "team" => Ok(Self::Team),
            "solo" => Ok(Self::Solo),
            "direct" => Ok(Self::Direct),
            "workflow" => Ok(Self::Workflow),
            "consulting" => Ok(Self::Consulting),
            other => Err(Error::InvalidRequest(format!("unknown mode: {other}"))),
        }
    }
}

/// Options accompanying a request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOptions {
    /// Operating mode (team when absent)
    #[serde(default)]
    pub mode: Option<ModeKind>,
    /// Target agent for direct mode
    #[serde(default)]
    pub target_agent_id: Option<String>,
    /// Calling user
    #[serde(default)]
    pub user_id: Option<String>,
    /// Chat session
    #[serde(default)]
    pub session_id: Option<String>,
    /// Workflow to start in workflow mode
    #[serde(default)]
    pub workflow_id: Option<String>,
    /// Consulting domain
    #[serde(default)]
    pub domain: Option<String>,
    /// Selection bias hint
    #[serde(default)]
    pub execution_mode: Option<ExecutionBias>,
}

impl DispatchOptions {
    /// Options for a mode
    #[must_use]
    pub fn mode(mode: ModeKind) -> Self {
        Self {
            mode: Some(mode),
            ..Default::default()
        }
    }

    /// Options for direct mode with a target agent
    #[must_use]
    pub fn direct(target_agent_id: impl Into<String>) -> Self {
        Self {
            mode: Some(ModeKind::Direct),
            target_agent_id: Some(target_agent_id.into()),
            ..Default::default()
        }
    }

    /// Set the user id
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the session id
    #[must_use]
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set the execution bias
    #[must_use]
    pub fn with_execution_mode(mut self, bias: ExecutionBias) -> Self {
        self.execution_mode = Some(bias);
        self
    }
}

/// Validated dispatch mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchMode {
    /// One-on-one chat with an agent
    Direct {
        /// Agent id
        target_agent_id: String,
    },
    /// Sequential workflow
    Workflow {
        /// Workflow to start (engine decides when absent)
        workflow_id: Option<String>,
    },
    /// Domain consulting
    Consulting {
        /// Consulting domain (engine decides when absent)
        domain: Option<String>,
    },
    /// Single best agent
    Solo,
    /// Classify, then collaborate or answer alone
    Team,
}

impl DispatchMode {
    /// Build a mode from caller options
    ///
    /// # Errors
    /// `Error::InvalidRequest` for direct mode without a target agent.
    pub fn from_options(options: &DispatchOptions) -> Result<Self> {
        Ok(match options.mode.unwrap_or_default() {
            ModeKind::Direct => {
                let target_agent_id = options
                    .target_agent_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| {
                        Error::InvalidRequest("direct mode requires targetAgentId".to_string())
                    })?;
                Self::Direct {
                    target_agent_id: target_agent_id.to_string(),
                }
            }
            ModeKind::Workflow => Self::Workflow {
                workflow_id: options.workflow_id.clone(),
            },
            ModeKind::Consulting => Self::Consulting {
                domain: options.domain.clone(),
            },
            ModeKind::Solo => Self::Solo,
            ModeKind::Team => Self::Team,
        })
    }

    /// Mode kind
    #[must_use]
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Direct { .. } => ModeKind::Direct,
            Self::Workflow { .. } => ModeKind::Workflow,
            Self::Consulting { .. } => ModeKind::Consulting,
            Self::Solo => ModeKind::Solo,
            Self::Team => ModeKind::Team,
        }
    }
}

/// Metadata attached to every response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Model (or "multi-agent") that produced the answer
    pub model: String,
    /// Tokens spent, when known
    pub tokens_used: Option<u32>,
    /// Whether several agents collaborated
    pub is_multi_agent: bool,
    /// Agents that collaborated
    pub agents_involved: Option<Vec<AgentRef>>,
    /// Mode that handled the request
    pub mode: String,
    /// Selection confidence (single-agent paths)
    pub confidence: Option<f64>,
    /// Estimated cost in USD, when known
    pub estimated_cost_usd: Option<f64>,
    /// Complexity verdict (team mode only)
    pub complexity: Option<ComplexityVerdict>,
}

/// Response returned to the chat surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    /// Answer text
    pub answer: String,
    /// Agent that answered (single-agent paths)
    pub selected_agent: Option<AgentRef>,
    /// Why this path/agent was chosen
    pub reason: String,
    /// Collaboration transcript (team collaboration only)
    pub transcript: Option<Vec<CollaborationMessage>>,
    /// Usage and routing metadata
    pub metadata: ResponseMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_defaults_to_team() {
        let mode = DispatchMode::from_options(&DispatchOptions::default()).unwrap();
        assert_eq!(mode, DispatchMode::Team);
    }

    #[test]
    fn test_direct_requires_target() {
        let err = DispatchMode::from_options(&DispatchOptions::mode(ModeKind::Direct)).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));

        let mut options = DispatchOptions::direct("  ");
        assert!(DispatchMode::from_options(&options).is_err());

        options.target_agent_id = Some("qa-engineer".to_string());
        assert_eq!(
            DispatchMode::from_options(&options).unwrap(),
            DispatchMode::Direct {
                target_agent_id: "qa-engineer".to_string()
            }
        );
    }

    #[test]
    fn test_mode_kind_parse() {
        assert_eq!("Consulting".parse::<ModeKind>().unwrap(), ModeKind::Consulting);
        assert_eq!("".parse::<ModeKind>().unwrap(), ModeKind::Team);
        assert!("party".parse::<ModeKind>().is_err());
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let options: DispatchOptions = serde_json::from_str(
            r#"{"mode":"direct","targetAgentId":"qa-engineer","executionMode":"technical"}"#,
        )
        .unwrap();
        assert_eq!(options.mode, Some(ModeKind::Direct));
        assert_eq!(options.target_agent_id.as_deref(), Some("qa-engineer"));
        assert_eq!(options.execution_mode, Some(ExecutionBias::Technical));
    }
}
