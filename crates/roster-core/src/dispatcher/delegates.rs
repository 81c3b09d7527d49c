//! Collaborator interfaces consumed by the dispatcher
//!
//! The direct-chat path, the workflow and consulting engines, the per-user
//! memory store and the recurring-task detector live outside the core. The
//! dispatcher only talks to them through these traits.

use crate::agents::{Agent, AgentRef};
use crate::error::Result;
use async_trait::async_trait;
use roster_llm::{Message, TokenUsage};
use serde::{Deserialize, Serialize};

/// Request forwarded to a delegate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateRequest {
    /// Request text
    pub request: String,
    /// Conversation so far
    pub history: Vec<Message>,
    /// Calling user
    pub user_id: Option<String>,
    /// Chat session
    pub session_id: Option<String>,
}

/// Reply from a direct chat
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectChatReply {
    /// Answer text
    pub content: String,
    /// Model that produced it
    pub model: String,
    /// Token usage, when reported
    pub usage: Option<TokenUsage>,
}

/// Result reported by a workflow or consulting engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateOutcome {
    /// Whether the engine succeeded
    pub success: bool,
    /// Result text on success
    pub result: Option<String>,
    /// Error text on failure
    pub error: Option<String>,
    /// Agent that produced the result, if the engine reports one
    pub agent: Option<AgentRef>,
    /// Model used, if reported
    pub model: Option<String>,
    /// Tokens spent, if reported
    pub tokens_used: Option<u32>,
}

impl DelegateOutcome {
    /// Successful outcome
    pub fn succeeded(result: impl Into<String>) -> Self {
        Self {
            success: true,
            result: Some(result.into()),
            ..Default::default()
        }
    }

    /// Failed outcome
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// One exchange recorded in the memory store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionTurn {
    /// What the user asked
    pub request: String,
    /// What the agent answered
    pub response: String,
}

/// One-on-one chat with a specific agent
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectChat: Send + Sync {
    /// Answer `request` as `agent`
    async fn chat(&self, agent: &Agent, request: &DelegateRequest) -> Result<DirectChatReply>;
}

/// Sequential-workflow engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowEngine: Send + Sync {
    /// Start a workflow for the request
    async fn start(
        &self,
        workflow_id: Option<String>,
        request: &DelegateRequest,
    ) -> Result<DelegateOutcome>;
}

/// Domain-consulting engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConsultingEngine: Send + Sync {
    /// Start a consultation for the request
    async fn start(&self, domain: Option<String>, request: &DelegateRequest)
        -> Result<DelegateOutcome>;
}

/// Per-user long-term memory
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Context to prepend for this user and agent, if any
    async fn build_context(&self, user_id: &str, agent_id: &str) -> Result<Option<String>>;

    /// Remember one exchange
    async fn record_interaction(
        &self,
        user_id: &str,
        agent_id: &str,
        turn: &InteractionTurn,
    ) -> Result<()>;
}

/// Recurring-task detection hook for team mode
#[cfg_attr(test, mockall::automock)]
pub trait WorkflowDetector: Send + Sync {
    /// Workflow id matching the request, if any
    fn detect(&self, request: &str) -> Option<String>;
}
