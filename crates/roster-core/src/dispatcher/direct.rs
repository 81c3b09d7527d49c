//! Single-agent answering
//!
//! Used by the solo/team single-agent path and by [`DirectChatService`], the
//! default one-on-one chat implementation.

use super::delegates::{DelegateRequest, DirectChat, DirectChatReply, InteractionTurn, MemoryStore};
use super::types::DispatcherConfig;
use crate::agents::Agent;
use crate::error::{Error, Result};
use async_trait::async_trait;
use roster_llm::{CompletionRequest, CompletionResponse, LlmRouter, Message, MessageRole};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Model name reported when no model produced the answer
pub const UNAVAILABLE_MODEL: &str = "unavailable";

/// Degraded answer used when the agent's model call fails
pub(crate) fn apology(agent: &Agent) -> String {
    format!(
        "I'm sorry, {} couldn't put together a response right now. \
         Please try again in a moment.",
        agent.name
    )
}

/// Non-system history turns, newest `window` kept
pub(crate) fn truncate_history(history: &[Message], window: usize) -> Vec<Message> {
    let turns: Vec<&Message> = history
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .collect();
    let skip = turns.len().saturating_sub(window);
    turns.into_iter().skip(skip).cloned().collect()
}

/// One model call answering `request` as `agent`
pub(crate) async fn ask_agent(
    router: &LlmRouter,
    config: &DispatcherConfig,
    agent: &Agent,
    memory_context: Option<&str>,
    history: &[Message],
    request: &str,
) -> Result<CompletionResponse> {
    let mut system = agent.persona_prompt();
    if let Some(context) = memory_context.filter(|c| !c.trim().is_empty()) {
        system.push_str("\n\nWhat you remember about this user:\n");
        system.push_str(context);
    }

    let mut messages = truncate_history(history, config.history_window);
    messages.push(Message::user(request));

    let provider = router.resolve(agent.model.provider())?;
    let completion = CompletionRequest::new(agent.model.model().unwrap_or_default())
        .with_system_prompt(system)
        .with_messages(messages)
        .with_max_tokens(config.single_agent_max_tokens)
        .with_temperature(config.temperature);

    let timeout = Duration::from_millis(config.call_timeout_ms);
    let response = tokio::time::timeout(timeout, provider.complete(completion))
        .await
        .map_err(|_| Error::Timeout(config.call_timeout_ms))??;
    Ok(response)
}

/// Direct chat backed by the model router and an optional memory store
pub struct DirectChatService {
    router: Arc<LlmRouter>,
    memory: Option<Arc<dyn MemoryStore>>,
    config: DispatcherConfig,
}

impl DirectChatService {
    /// Create a service without memory
    #[must_use]
    pub fn new(router: Arc<LlmRouter>, config: DispatcherConfig) -> Self {
        Self {
            router,
            memory: None,
            config,
        }
    }

    /// Attach a per-user memory store
    #[must_use]
    pub fn with_memory(mut self, memory: Arc<dyn MemoryStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    async fn memory_context(&self, user_id: &str, agent_id: &str) -> Option<String> {
        let memory = self.memory.as_ref()?;
        match memory.build_context(user_id, agent_id).await {
            Ok(context) => context,
            Err(e) => {
                warn!(user_id, agent_id, error = %e, "Memory lookup failed, continuing without it");
                None
            }
        }
    }

    async fn remember(&self, user_id: &str, agent_id: &str, turn: InteractionTurn) {
        let Some(memory) = &self.memory else {
            return;
        };
        if let Err(e) = memory.record_interaction(user_id, agent_id, &turn).await {
            warn!(user_id, agent_id, error = %e, "Failed to record interaction");
        }
    }
}

impl std::fmt::Debug for DirectChatService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectChatService")
            .field("router", &self.router)
            .field("memory", &self.memory.is_some())
            .finish()
    }
}

#[async_trait]
impl DirectChat for DirectChatService {
    #[instrument(skip(self, agent, request), fields(agent = %agent.id))]
    async fn chat(&self, agent: &Agent, request: &DelegateRequest) -> Result<DirectChatReply> {
        let context = match &request.user_id {
            Some(user_id) => self.memory_context(user_id, &agent.id).await,
            None => None,
        };

        let result = ask_agent(
            &self.router,
            &self.config,
            agent,
            context.as_deref(),
            &request.history,
            &request.request,
        )
        .await;

        let reply = match result {
            Ok(response) => DirectChatReply {
                content: response.content,
                model: response.model,
                usage: response.usage,
            },
            Err(e) => {
                warn!(error = %e, "Direct chat model call failed");
                return Ok(DirectChatReply {
                    content: apology(agent),
                    model: UNAVAILABLE_MODEL.to_string(),
                    usage: None,
                });
            }
        };

        if let Some(user_id) = &request.user_id {
            let turn = InteractionTurn {
                request: request.request.clone(),
                response: reply.content.clone(),
            };
            self.remember(user_id, &agent.id, turn).await;
        }
        debug!(model = %reply.model, "Direct chat answered");
        Ok(reply)
    }
}
