//! Collaboration Orchestrator
//!
//! Runs the team protocol for a shortlisted set of agents:
//!
//! 1. **Contribution** - every agent answers independently (concurrent)
//! 2. **Discussion** - with three or more agents, adjacent pairs react to
//!    each other's contributions (concurrent, failures omitted)
//! 3. **Synthesis** - one supervisor call merges the contributions; on
//!    failure the contributions are concatenated
//!
//! A run never fails. Every model call is bounded by a timeout and every
//! failure is replaced or dropped locally.

mod prompts;
mod types;

#[cfg(test)]
mod tests;

pub use prompts::EMPTY_TEAM_ANSWER;
pub use types::{
    CollaborationConfig, CollaborationMessage, CollaborationMetadata, CollaborationResult,
    MessageType, SUPERVISOR,
};

use crate::agents::{Agent, AgentStatus, StatusBoard};
use crate::classifier::ComplexityVerdict;
use crate::error::{Error, Result};
use chrono::Utc;
use futures::future::join_all;
use roster_llm::{estimate_cost, CompletionRequest, LlmRouter, Message, MessageRole, TokenUsage};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// Output of one successful model call
#[derive(Debug)]
struct CallOutcome {
    content: String,
    usage: TokenUsage,
    cost: f64,
}

/// Contribution kept for discussion and synthesis
#[derive(Debug)]
struct Contribution<'a> {
    agent: &'a Agent,
    content: String,
    succeeded: bool,
}

/// Running totals for a run
#[derive(Debug, Default)]
struct Ledger {
    usage: TokenUsage,
    cost: f64,
    failed_calls: usize,
}

impl Ledger {
    fn record(&mut self, outcome: &CallOutcome) {
        self.usage.accumulate(&outcome.usage);
        self.cost += outcome.cost;
    }
}

/// Multi-agent collaboration runner
#[derive(Debug, Clone)]
pub struct CollaborationOrchestrator {
    router: Arc<LlmRouter>,
    status: StatusBoard,
    config: CollaborationConfig,
}

impl CollaborationOrchestrator {
    /// Create an orchestrator
    #[must_use]
    pub fn new(router: Arc<LlmRouter>, status: StatusBoard, config: CollaborationConfig) -> Self {
        Self {
            router,
            status,
            config,
        }
    }

    /// Current settings
    #[must_use]
    pub fn config(&self) -> &CollaborationConfig {
        &self.config
    }

    /// Status board updated during runs
    #[must_use]
    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// Run the full protocol for `team`
    #[instrument(skip_all, fields(team = team.len()))]
    pub async fn run(
        &self,
        request: &str,
        history: &[Message],
        team: &[Agent],
        verdict: &ComplexityVerdict,
    ) -> CollaborationResult {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let start = Instant::now();
        let mut ledger = Ledger::default();
        let mut messages = Vec::new();

        info!(
            run_id = %run_id,
            agents = ?team.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            "Starting collaboration"
        );

        let contributions = self
            .contribution_phase(request, history, team, &mut ledger, &mut messages)
            .await;

        if team.len() >= self.config.min_agents_for_discussion {
            self.discussion_phase(request, &contributions, &mut ledger, &mut messages)
                .await;
        }

        let (final_answer, synthesis_tokens, synthesis_fallback) =
            self.synthesis_phase(request, &contributions, &mut ledger).await;
        let synthesis = CollaborationMessage::new(
            SUPERVISOR,
            None,
            final_answer.clone(),
            MessageType::Synthesis,
            synthesis_tokens,
        );
        self.post(&synthesis);
        messages.push(synthesis);

        let mut messages_per_agent = BTreeMap::new();
        for message in messages.iter().filter(|m| m.from != SUPERVISOR) {
            *messages_per_agent.entry(message.from.clone()).or_insert(0) += 1;
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            run_id = %run_id,
            duration_ms,
            total_tokens = ledger.usage.total_tokens,
            failed_calls = ledger.failed_calls,
            "Collaboration completed"
        );

        CollaborationResult {
            is_complex: verdict.is_complex,
            agents_involved: team.iter().map(Agent::to_ref).collect(),
            messages,
            final_answer,
            reasoning: verdict.reasoning.clone(),
            metadata: CollaborationMetadata {
                run_id,
                started_at,
                duration_ms,
                usage: ledger.usage,
                estimated_cost_usd: ledger.cost,
                messages_per_agent,
                failed_calls: ledger.failed_calls,
                synthesis_fallback,
            },
        }
    }

    async fn contribution_phase<'a>(
        &self,
        request: &str,
        history: &[Message],
        team: &'a [Agent],
        ledger: &mut Ledger,
        messages: &mut Vec<CollaborationMessage>,
    ) -> Vec<Contribution<'a>> {
        let names: Vec<&str> = team.iter().map(|a| a.name.as_str()).collect();
        let mut conversation = self.recent_history(history);
        conversation.push(Message::user(request));

        let outcomes = join_all(team.iter().map(|agent| {
            let system = prompts::contribution_system_prompt(agent, &names);
            let conversation = conversation.clone();
            async move {
                self.agent_call(
                    agent,
                    system,
                    conversation,
                    self.config.contribution_max_tokens,
                    "contributing",
                )
                .await
            }
        }))
        .await;

        let mut contributions = Vec::with_capacity(team.len());
        for (agent, outcome) in team.iter().zip(outcomes) {
            let (content, tokens, succeeded) = match outcome {
                Ok(outcome) => {
                    ledger.record(&outcome);
                    (outcome.content, outcome.usage.total_tokens, true)
                }
                Err(e) => {
                    warn!(agent = %agent.id, error = %e, "Contribution failed, using fallback");
                    ledger.failed_calls += 1;
                    (prompts::fallback_contribution(agent), 0, false)
                }
            };

            let message = CollaborationMessage::new(
                agent.id.clone(),
                None,
                content.clone(),
                MessageType::Contribution,
                tokens,
            );
            self.post(&message);
            messages.push(message);
            contributions.push(Contribution {
                agent,
                content,
                succeeded,
            });
        }
        contributions
    }

    async fn discussion_phase(
        &self,
        request: &str,
        contributions: &[Contribution<'_>],
        ledger: &mut Ledger,
        messages: &mut Vec<CollaborationMessage>,
    ) {
        // (0 -> 1), (1 -> 2): the second agent reacts to the first
        let pairs: Vec<(usize, usize)> = (1..contributions.len())
            .map(|i| (i - 1, i))
            .take(self.config.max_discussion_pairs)
            .filter(|(source, _)| {
                let keep = contributions[*source].succeeded;
                if !keep {
                    debug!(
                        agent = %contributions[*source].agent.id,
                        "Skipping discussion on fallback contribution"
                    );
                }
                keep
            })
            .collect();

        let outcomes = join_all(pairs.iter().map(|&(source, responder)| {
            let source = &contributions[source];
            let responder = contributions[responder].agent;
            let prompt = prompts::discussion_prompt(request, &source.agent.name, &source.content);
            async move {
                self.agent_call(
                    responder,
                    responder.persona_prompt(),
                    vec![Message::user(prompt)],
                    self.config.discussion_max_tokens,
                    "discussing",
                )
                .await
            }
        }))
        .await;

        for (&(source, responder), outcome) in pairs.iter().zip(outcomes) {
            let source = contributions[source].agent;
            let responder = contributions[responder].agent;
            match outcome {
                Ok(outcome) => {
                    ledger.record(&outcome);
                    let message_type = if outcome.content.trim_end().ends_with('?') {
                        MessageType::Question
                    } else {
                        MessageType::Discussion
                    };
                    let message = CollaborationMessage::new(
                        responder.id.clone(),
                        Some(source.id.clone()),
                        outcome.content,
                        message_type,
                        outcome.usage.total_tokens,
                    );
                    self.post(&message);
                    messages.push(message);
                }
                Err(e) => {
                    warn!(
                        agent = %responder.id,
                        target = %source.id,
                        error = %e,
                        "Discussion turn failed, omitting"
                    );
                    ledger.failed_calls += 1;
                }
            }
        }
    }

    /// Returns the final answer, its token count and whether the fallback was used
    async fn synthesis_phase(
        &self,
        request: &str,
        contributions: &[Contribution<'_>],
        ledger: &mut Ledger,
    ) -> (String, u32, bool) {
        if contributions.is_empty() {
            return (EMPTY_TEAM_ANSWER.to_string(), 0, true);
        }

        let sections: Vec<(String, String)> = contributions
            .iter()
            .map(|c| (c.agent.name.clone(), c.content.clone()))
            .collect();

        let prompt = prompts::synthesis_prompt(request, &sections);
        let result = self
            .call(
                None,
                None,
                prompts::SYNTHESIS_SYSTEM_PROMPT.to_string(),
                vec![Message::user(prompt)],
                self.config.synthesis_max_tokens,
            )
            .await;

        match result {
            Ok(outcome) => {
                ledger.record(&outcome);
                (outcome.content, outcome.usage.total_tokens, false)
            }
            Err(e) => {
                warn!(error = %e, "Synthesis failed, concatenating contributions");
                ledger.failed_calls += 1;
                (prompts::fallback_synthesis(&sections), 0, true)
            }
        }
    }

    /// Model call on behalf of an agent, with status transitions
    async fn agent_call(
        &self,
        agent: &Agent,
        system: String,
        conversation: Vec<Message>,
        max_tokens: u32,
        activity: &str,
    ) -> Result<CallOutcome> {
        self.status.set(&agent.id, AgentStatus::Thinking, activity);
        let result = self
            .call(
                agent.model.provider(),
                agent.model.model(),
                system,
                conversation,
                max_tokens,
            )
            .await;
        match &result {
            Ok(_) => self.status.set(&agent.id, AgentStatus::Idle, "done"),
            Err(e) => self.status.set(&agent.id, AgentStatus::Error, e.to_string()),
        };
        result
    }

    async fn call(
        &self,
        provider: Option<&str>,
        model: Option<&str>,
        system: String,
        conversation: Vec<Message>,
        max_tokens: u32,
    ) -> Result<CallOutcome> {
        let provider = self.router.resolve(provider)?;
        let request = CompletionRequest::new(model.unwrap_or_default())
            .with_system_prompt(system)
            .with_messages(conversation)
            .with_max_tokens(max_tokens)
            .with_temperature(self.config.temperature);

        let timeout = Duration::from_millis(self.config.call_timeout_ms);
        let response = tokio::time::timeout(timeout, provider.complete(request))
            .await
            .map_err(|_| Error::Timeout(self.config.call_timeout_ms))??;

        if response.content.trim().is_empty() {
            return Err(roster_llm::Error::InvalidResponse("empty completion".to_string()).into());
        }

        let usage = response.usage.unwrap_or_default();
        Ok(CallOutcome {
            cost: estimate_cost(&response.model, &usage),
            content: response.content,
            usage,
        })
    }

    fn recent_history(&self, history: &[Message]) -> Vec<Message> {
        let turns: Vec<&Message> = history
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .collect();
        let skip = turns.len().saturating_sub(self.config.history_window);
        turns.into_iter().skip(skip).cloned().collect()
    }

    fn post(&self, message: &CollaborationMessage) {
        self.status.events().emit_message(
            &message.from,
            message.to.as_deref(),
            message.message_type,
            &message.content,
            json!({ "message_id": message.id, "tokens": message.tokens }),
        );
    }
}
