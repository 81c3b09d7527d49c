//! Collaboration types

use crate::agents::AgentRef;
use chrono::{DateTime, Utc};
use roster_llm::TokenUsage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Sender id used for the synthesis turn
pub const SUPERVISOR: &str = "supervisor";

fn default_contribution_max_tokens() -> u32 {
    400
}

fn default_discussion_max_tokens() -> u32 {
    200
}

fn default_synthesis_max_tokens() -> u32 {
    1200
}

fn default_temperature() -> f32 {
    0.7
}

fn default_call_timeout_ms() -> u64 {
    60_000
}

fn default_max_discussion_pairs() -> usize {
    2
}

fn default_min_agents_for_discussion() -> usize {
    3
}

fn default_history_window() -> usize {
    10
}

/// Collaboration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationConfig {
    /// Token limit for a contribution
    #[serde(default = "default_contribution_max_tokens")]
    pub contribution_max_tokens: u32,
    /// Token limit for a discussion reply
    #[serde(default = "default_discussion_max_tokens")]
    pub discussion_max_tokens: u32,
    /// Token limit for the synthesis
    #[serde(default = "default_synthesis_max_tokens")]
    pub synthesis_max_tokens: u32,
    /// Sampling temperature for every call
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Per-call timeout in milliseconds
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
    /// Maximum number of discussion pairs
    #[serde(default = "default_max_discussion_pairs")]
    pub max_discussion_pairs: usize,
    /// Team size at which the discussion phase runs
    #[serde(default = "default_min_agents_for_discussion")]
    pub min_agents_for_discussion: usize,
    /// History turns forwarded to contributors
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for CollaborationConfig {
    fn default() -> Self {
        Self {
            contribution_max_tokens: default_contribution_max_tokens(),
            discussion_max_tokens: default_discussion_max_tokens(),
            synthesis_max_tokens: default_synthesis_max_tokens(),
            temperature: default_temperature(),
            call_timeout_ms: default_call_timeout_ms(),
            max_discussion_pairs: default_max_discussion_pairs(),
            min_agents_for_discussion: default_min_agents_for_discussion(),
            history_window: default_history_window(),
        }
    }
}

/// Kind of transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Independent contribution from one agent
    Contribution,
    /// Reaction to another agent's contribution
    Discussion,
    /// Discussion reply phrased as a question
    Question,
    /// Final merged answer
    Synthesis,
}

impl MessageType {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contribution => "contribution",
            Self::Discussion => "discussion",
            Self::Question => "question",
            Self::Synthesis => "synthesis",
        }
    }
}

/// One turn in a collaboration transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationMessage {
    /// Message id
    pub id: Uuid,
    /// Sender agent id, or [`SUPERVISOR`]
    pub from: String,
    /// Recipient agent id (directed discussion turns only)
    pub to: Option<String>,
    /// Message text
    pub content: String,
    /// Message kind
    pub message_type: MessageType,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Tokens spent producing this message
    pub tokens: u32,
}

impl CollaborationMessage {
    /// Create a message stamped now
    pub fn new(
        from: impl Into<String>,
        to: Option<String>,
        content: impl Into<String>,
        message_type: MessageType,
        tokens: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from: from.into(),
            to,
            content: content.into(),
            message_type,
            timestamp: Utc::now(),
            tokens,
        }
    }
}

/// Usage and timing of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationMetadata {
    /// Run id
    pub run_id: Uuid,
    /// Run start time
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Token usage summed over all phases
    pub usage: TokenUsage,
    /// Estimated cost in USD
    pub estimated_cost_usd: f64,
    /// Contribution and discussion messages per agent id
    pub messages_per_agent: BTreeMap<String, usize>,
    /// Model calls that failed or timed out
    pub failed_calls: usize,
    /// Whether the final answer is the concatenation fallback
    pub synthesis_fallback: bool,
}

impl CollaborationMetadata {
    /// Total tokens across all phases
    #[must_use]
    pub fn total_tokens(&self) -> u32 {
        self.usage.total_tokens
    }
}

/// Outcome of one collaboration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationResult {
    /// Whether the request was judged complex
    pub is_complex: bool,
    /// Shortlisted agents in order
    pub agents_involved: Vec<AgentRef>,
    /// Contributions, then discussion turns, then the synthesis
    pub messages: Vec<CollaborationMessage>,
    /// Final answer
    pub final_answer: String,
    /// Classifier justification
    pub reasoning: String,
    /// Usage and timing
    pub metadata: CollaborationMetadata,
}

impl CollaborationResult {
    /// Messages of one kind, in transcript order
    pub fn messages_of(&self, kind: MessageType) -> impl Iterator<Item = &CollaborationMessage> {
        self.messages
            .iter()
            .filter(move |m| m.message_type == kind)
    }
}
