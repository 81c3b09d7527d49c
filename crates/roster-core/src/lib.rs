//! Roster Core - Agent orchestration
//!
//! This crate decides who answers a request and how:
//! - Agents: directory of specialized agents with an explicit load lifecycle
//! - Classifier: keyword/domain complexity verdict for a request
//! - Selector: capability scoring, confidence buckets and team shortlists
//! - Collaboration: contribution, discussion and synthesis with fallbacks
//! - Dispatcher: team / solo / direct / workflow / consulting modes
//! - Events: status and transcript events for the chat surface

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agents;
pub mod classifier;
pub mod collaboration;
pub mod dispatcher;
pub mod error;
pub mod event_bus;
pub mod heuristics;
pub mod selector;

pub use agents::{
    Agent, AgentDirectory, AgentLoader, AgentRef, AgentStatus, ModelBinding, StaticAgentLoader,
    StatusBoard, TomlAgentLoader, ToolCapability,
};
pub use classifier::{ComplexityClassifier, ComplexityVerdict};
pub use collaboration::{
    CollaborationConfig, CollaborationMessage, CollaborationMetadata, CollaborationOrchestrator,
    CollaborationResult, MessageType,
};
pub use dispatcher::{
    ConsultingEngine, DelegateOutcome, DelegateRequest, DirectChat, DirectChatReply,
    DirectChatService, DispatchMode, DispatchOptions, DispatchResponse, Dispatcher,
    DispatcherBuilder, DispatcherConfig, InteractionTurn, MemoryStore, ModeKind,
    PatternWorkflowDetector, ResponseMetadata, WorkflowDetector, WorkflowEngine, WorkflowPattern,
};
pub use error::{format_error_for_cli, Error, Result, UserFriendlyError};
pub use event_bus::{EventBus, RosterEvent};
pub use heuristics::ExecutionBias;
pub use selector::{confidence_for, AgentSelector, SelectionResult, MAX_TEAM_SIZE};

pub use roster_llm::{Message, MessageRole};
