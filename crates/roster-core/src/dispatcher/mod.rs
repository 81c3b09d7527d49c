//! Mode Dispatcher
//!
//! Single entry point for a user request. Each [`DispatchMode`] variant has
//! its own handler:
//!
//! - `Direct` → direct-chat delegate, no classification
//! - `Workflow` / `Consulting` → external engines
//! - `Solo` → best single agent
//! - `Team` → classify, optional workflow redirect, then collaboration or a
//!   single agent. A collaboration that cannot be set up is downgraded to
//!   the single-agent path.

mod delegates;
mod detector;
mod direct;
mod types;

#[cfg(test)]
mod tests;

pub use delegates::{
    ConsultingEngine, DelegateOutcome, DelegateRequest, DirectChat, DirectChatReply,
    InteractionTurn, MemoryStore, WorkflowDetector, WorkflowEngine,
};
pub use detector::{PatternWorkflowDetector, WorkflowPattern};
pub use direct::{DirectChatService, UNAVAILABLE_MODEL};
pub use types::{
    DispatchMode, DispatchOptions, DispatchResponse, DispatcherConfig, ModeKind,
    ResponseMetadata,
};

use crate::agents::{Agent, AgentDirectory, AgentStatus, StatusBoard};
use crate::classifier::{ComplexityClassifier, ComplexityVerdict};
use crate::collaboration::{CollaborationConfig, CollaborationOrchestrator};
use crate::error::{Error, Result};
use crate::event_bus::{EventBus, RosterEvent};
use crate::heuristics::ExecutionBias;
use crate::selector::AgentSelector;
use roster_llm::{estimate_cost, LlmRouter, Message};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Model name reported for collaborative answers
pub const MULTI_AGENT_MODEL: &str = "multi-agent";

/// Builder for [`Dispatcher`]
pub struct DispatcherBuilder {
    directory: Arc<AgentDirectory>,
    router: Arc<LlmRouter>,
    status: StatusBoard,
    config: DispatcherConfig,
    collaboration: CollaborationConfig,
    direct_chat: Option<Arc<dyn DirectChat>>,
    memory: Option<Arc<dyn MemoryStore>>,
    workflow_engine: Option<Arc<dyn WorkflowEngine>>,
    consulting_engine: Option<Arc<dyn ConsultingEngine>>,
    workflow_detector: Option<Arc<dyn WorkflowDetector>>,
}

impl DispatcherBuilder {
    /// Status board (and event bus) shared with the chat surface
    #[must_use]
    pub fn status_board(mut self, status: StatusBoard) -> Self {
        self.status = status;
        self
    }

    /// Dispatcher settings
    #[must_use]
    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Collaboration settings
    #[must_use]
    pub fn collaboration_config(mut self, config: CollaborationConfig) -> Self {
        self.collaboration = config;
        self
    }

    /// Replace the default direct-chat implementation
    #[must_use]
    pub fn direct_chat(mut self, direct_chat: Arc<dyn DirectChat>) -> Self {
        self.direct_chat = Some(direct_chat);
        self
    }

    /// Memory store for the default direct-chat implementation
    #[must_use]
    pub fn memory_store(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Workflow engine
    #[must_use]
    pub fn workflow_engine(mut self, engine: Arc<dyn WorkflowEngine>) -> Self {
        self.workflow_engine = Some(engine);
        self
    }

    /// Consulting engine
    #[must_use]
    pub fn consulting_engine(mut self, engine: Arc<dyn ConsultingEngine>) -> Self {
        self.consulting_engine = Some(engine);
        self
    }

    /// Recurring-task detector (overrides configured patterns)
    #[must_use]
    pub fn workflow_detector(mut self, detector: Arc<dyn WorkflowDetector>) -> Self {
        self.workflow_detector = Some(detector);
        self
    }

    /// Build the dispatcher
    ///
    /// # Errors
    /// `Error::Configuration` for invalid workflow patterns.
    pub fn build(self) -> Result<Dispatcher> {
        let workflow_detector = match self.workflow_detector {
            Some(detector) => Some(detector),
            None if self.config.workflow_patterns.is_empty() => None,
            None => Some(Arc::new(PatternWorkflowDetector::new(
                &self.config.workflow_patterns,
            )?) as Arc<dyn WorkflowDetector>),
        };

        let direct_chat = self.direct_chat.unwrap_or_else(|| {
            let mut service = DirectChatService::new(self.router.clone(), self.config.clone());
            if let Some(memory) = self.memory {
                service = service.with_memory(memory);
            }
            Arc::new(service)
        });

        let orchestrator = CollaborationOrchestrator::new(
            self.router.clone(),
            self.status.clone(),
            self.collaboration,
        );

        Ok(Dispatcher {
            selector: AgentSelector::new(self.directory.clone()),
            directory: self.directory,
            classifier: ComplexityClassifier::new(),
            orchestrator,
            router: self.router,
            status: self.status,
            config: self.config,
            direct_chat,
            workflow_engine: self.workflow_engine,
            consulting_engine: self.consulting_engine,
            workflow_detector,
        })
    }
}

/// Mode dispatcher
pub struct Dispatcher {
    directory: Arc<AgentDirectory>,
    classifier: ComplexityClassifier,
    selector: AgentSelector,
    orchestrator: CollaborationOrchestrator,
    router: Arc<LlmRouter>,
    status: StatusBoard,
    config: DispatcherConfig,
    direct_chat: Arc<dyn DirectChat>,
    workflow_engine: Option<Arc<dyn WorkflowEngine>>,
    consulting_engine: Option<Arc<dyn ConsultingEngine>>,
    workflow_detector: Option<Arc<dyn WorkflowDetector>>,
}

impl Dispatcher {
    /// Start building a dispatcher
    #[must_use]
    pub fn builder(directory: Arc<AgentDirectory>, router: Arc<LlmRouter>) -> DispatcherBuilder {
        DispatcherBuilder {
            directory,
            router,
            status: StatusBoard::default(),
            config: DispatcherConfig::default(),
            collaboration: CollaborationConfig::default(),
            direct_chat: None,
            memory: None,
            workflow_engine: None,
            consulting_engine: None,
            workflow_detector: None,
        }
    }

    /// Agent directory
    #[must_use]
    pub fn directory(&self) -> &Arc<AgentDirectory> {
        &self.directory
    }

    /// Event bus carrying status, message and mode events
    #[must_use]
    pub fn events(&self) -> &EventBus {
        self.status.events()
    }

    /// Status board
    #[must_use]
    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// Handle one request
    ///
    /// Loads the directory on first use.
    ///
    /// # Errors
    /// Invalid options, unknown direct-mode target, directory load failures
    /// and workflow/consulting engine failures. Model failures never surface
    /// here; they degrade the answer instead.
    #[instrument(skip(self, request, history, options), fields(mode = tracing::field::Empty))]
    pub async fn dispatch(
        &self,
        request: &str,
        history: &[Message],
        options: &DispatchOptions,
    ) -> Result<DispatchResponse> {
        self.directory.load().await?;
        let mode = DispatchMode::from_options(options)?;
        tracing::Span::current().record("mode", mode.kind().as_str());

        let delegate_request = || DelegateRequest {
            request: request.to_string(),
            history: history.to_vec(),
            user_id: options.user_id.clone(),
            session_id: options.session_id.clone(),
        };
        let bias = options.execution_mode.unwrap_or_default();

        match mode {
            DispatchMode::Direct { target_agent_id } => {
                self.handle_direct(&target_agent_id, delegate_request()).await
            }
            DispatchMode::Workflow { workflow_id } => {
                self.handle_workflow(workflow_id, delegate_request(), "workflow mode requested")
                    .await
            }
            DispatchMode::Consulting { domain } => {
                self.handle_consulting(domain, delegate_request()).await
            }
            DispatchMode::Solo => {
                self.announce(ModeKind::Solo, "solo mode requested");
                self.handle_single(request, history, bias, "solo", None).await
            }
            DispatchMode::Team => self.handle_team(request, history, bias, delegate_request).await,
        }
    }

    async fn handle_team(
        &self,
        request: &str,
        history: &[Message],
        bias: ExecutionBias,
        delegate_request: impl FnOnce() -> DelegateRequest,
    ) -> Result<DispatchResponse> {
        let verdict = self.classifier.classify(request);

        if let Some(workflow_id) = self.detect_workflow(request) {
            return self
                .handle_workflow(
                    Some(workflow_id),
                    delegate_request(),
                    "matched a recurring task pattern",
                )
                .await;
        }

        if !verdict.is_complex {
            self.announce(ModeKind::Team, "single agent: task is not complex");
            return self
                .handle_single(request, history, bias, &verdict.reasoning, Some(verdict.clone()))
                .await;
        }

        let team = match self.build_team(request, history, &verdict, bias) {
            Ok(team) => team,
            Err(e) => {
                warn!(error = %e, "Collaboration unavailable, falling back to a single agent");
                self.announce(ModeKind::Team, "fallback to single agent");
                let reason = format!("fallback: collaboration unavailable ({e})");
                return self
                    .handle_single(request, history, bias, &reason, Some(verdict))
                    .await;
            }
        };

        self.announce(ModeKind::Team, "team collaboration");
        let result = self.orchestrator.run(request, history, &team, &verdict).await;

        Ok(DispatchResponse {
            answer: result.final_answer,
            selected_agent: None,
            reason: result.reasoning,
            metadata: ResponseMetadata {
                model: MULTI_AGENT_MODEL.to_string(),
                tokens_used: Some(result.metadata.usage.total_tokens),
                is_multi_agent: true,
                agents_involved: Some(result.agents_involved),
                mode: ModeKind::Team.to_string(),
                confidence: None,
                estimated_cost_usd: Some(result.metadata.estimated_cost_usd),
                complexity: Some(verdict),
            },
            transcript: Some(result.messages),
        })
    }

    /// Shortlist for collaboration; fewer than two agents cannot collaborate
    fn build_team(
        &self,
        request: &str,
        history: &[Message],
        verdict: &ComplexityVerdict,
        bias: ExecutionBias,
    ) -> Result<Vec<Agent>> {
        let team = self
            .selector
            .shortlist(request, history, verdict.estimated_team_size, bias)?;
        if team.len() < 2 {
            return Err(Error::Collaboration(format!(
                "need at least two agents, found {}",
                team.len()
            )));
        }
        Ok(team)
    }

    async fn handle_single(
        &self,
        request: &str,
        history: &[Message],
        bias: ExecutionBias,
        reason: &str,
        verdict: Option<ComplexityVerdict>,
    ) -> Result<DispatchResponse> {
        let selection = self.selector.select(request, history, bias)?;
        let agent = &selection.agent;
        info!(agent = %agent.id, confidence = selection.confidence, "Single agent selected");

        self.status.set(&agent.id, AgentStatus::Thinking, "answering");
        let result =
            direct::ask_agent(&self.router, &self.config, agent, None, history, request).await;

        let (answer, model, usage) = match result {
            Ok(response) => {
                self.status.set(&agent.id, AgentStatus::Idle, "done");
                (response.content, response.model, response.usage)
            }
            Err(e) => {
                warn!(agent = %agent.id, error = %e, "Single agent call failed, answering with apology");
                self.status.set(&agent.id, AgentStatus::Error, e.to_string());
                (direct::apology(agent), UNAVAILABLE_MODEL.to_string(), None)
            }
        };

        let mode = if verdict.is_some() {
            ModeKind::Team
        } else {
            ModeKind::Solo
        };

        Ok(DispatchResponse {
            answer,
            selected_agent: Some(selection.agent_ref()),
            reason: format!("{reason}; selected {} ({})", agent.name, selection.reasons.join(", ")),
            transcript: None,
            metadata: ResponseMetadata {
                estimated_cost_usd: usage.as_ref().map(|u| estimate_cost(&model, u)),
                tokens_used: usage.map(|u| u.total_tokens),
                model,
                is_multi_agent: false,
                agents_involved: None,
                mode: mode.to_string(),
                confidence: Some(selection.confidence),
                complexity: verdict,
            },
        })
    }

    async fn handle_direct(
        &self,
        target_agent_id: &str,
        request: DelegateRequest,
    ) -> Result<DispatchResponse> {
        let agent = self.directory.get(target_agent_id)?;
        self.announce(ModeKind::Direct, &format!("direct chat with {}", agent.name));

        self.status.set(&agent.id, AgentStatus::Thinking, "direct chat");
        let reply = match self.direct_chat.chat(agent, &request).await {
            Ok(reply) => {
                self.status.set(&agent.id, AgentStatus::Idle, "done");
                reply
            }
            Err(e) => {
                warn!(agent = %agent.id, error = %e, "Direct chat failed, answering with apology");
                self.status.set(&agent.id, AgentStatus::Error, e.to_string());
                DirectChatReply {
                    content: direct::apology(agent),
                    model: UNAVAILABLE_MODEL.to_string(),
                    usage: None,
                }
            }
        };

        Ok(DispatchResponse {
            answer: reply.content,
            selected_agent: Some(agent.to_ref()),
            reason: format!("direct chat with {}", agent.name),
            transcript: None,
            metadata: ResponseMetadata {
                estimated_cost_usd: reply.usage.as_ref().map(|u| estimate_cost(&reply.model, u)),
                tokens_used: reply.usage.map(|u| u.total_tokens),
                model: reply.model,
                mode: ModeKind::Direct.to_string(),
                ..Default::default()
            },
        })
    }

    async fn handle_workflow(
        &self,
        workflow_id: Option<String>,
        request: DelegateRequest,
        reason: &str,
    ) -> Result<DispatchResponse> {
        const ENGINE: &str = "workflow";
        self.announce(ModeKind::Workflow, reason);

        let Some(engine) = &self.workflow_engine else {
            return Err(self.delegate_failed(ENGINE, "no workflow engine is configured"));
        };

        let outcome = engine
            .start(workflow_id.clone(), &request)
            .await
            .map_err(|e| self.delegate_failed(ENGINE, &e.to_string()))?;

        let label = workflow_id.unwrap_or_else(|| "auto".to_string());
        self.shape_delegate(ENGINE, ModeKind::Workflow, outcome, format!("workflow {label}: {reason}"))
    }

    async fn handle_consulting(
        &self,
        domain: Option<String>,
        request: DelegateRequest,
    ) -> Result<DispatchResponse> {
        const ENGINE: &str = "consulting";
        self.announce(ModeKind::Consulting, "consulting mode requested");

        let Some(engine) = &self.consulting_engine else {
            return Err(self.delegate_failed(ENGINE, "no consulting engine is configured"));
        };

        let outcome = engine
            .start(domain.clone(), &request)
            .await
            .map_err(|e| self.delegate_failed(ENGINE, &e.to_string()))?;

        let label = domain.unwrap_or_else(|| "general".to_string());
        self.shape_delegate(ENGINE, ModeKind::Consulting, outcome, format!("consulting on {label}"))
    }

    /// Turn an engine outcome into a response, or a terminal error
    fn shape_delegate(
        &self,
        engine: &str,
        mode: ModeKind,
        outcome: DelegateOutcome,
        reason: String,
    ) -> Result<DispatchResponse> {
        if !outcome.success {
            let message = outcome
                .error
                .unwrap_or_else(|| format!("{engine} engine reported failure"));
            return Err(self.delegate_failed(engine, &message));
        }

        Ok(DispatchResponse {
            answer: outcome.result.unwrap_or_default(),
            selected_agent: outcome.agent,
            reason,
            transcript: None,
            metadata: ResponseMetadata {
                model: outcome.model.unwrap_or_else(|| engine.to_string()),
                tokens_used: outcome.tokens_used,
                mode: mode.to_string(),
                ..Default::default()
            },
        })
    }

    fn delegate_failed(&self, engine: &str, message: &str) -> Error {
        warn!(engine, error = message, "Delegate engine failed");
        self.events().publish(RosterEvent::DelegateFailed {
            engine: engine.to_string(),
            error: message.to_string(),
        });
        Error::delegate(engine, message)
    }

    fn detect_workflow(&self, request: &str) -> Option<String> {
        let detector = self.workflow_detector.as_ref()?;
        let workflow_id = detector.detect(request)?;
        if self.workflow_engine.is_none() {
            debug!(workflow_id = %workflow_id, "Recurring task detected but no workflow engine");
            return None;
        }
        Some(workflow_id)
    }

    fn announce(&self, mode: ModeKind, reason: &str) {
        debug!(mode = %mode, reason, "Mode selected");
        self.events().publish(RosterEvent::ModeSelected {
            mode: mode.to_string(),
            reason: reason.to_string(),
        });
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("directory", &self.directory)
            .field("router", &self.router)
            .field("workflow_engine", &self.workflow_engine.is_some())
            .field("consulting_engine", &self.consulting_engine.is_some())
            .field("workflow_detector", &self.workflow_detector.is_some())
            .finish()
    }
}
