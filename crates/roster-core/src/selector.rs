//! Agent Selector
//!
//! Scores every agent in the directory against a request and returns either
//! the single best match or a team shortlist. Scoring is additive over a
//! fixed set of signals; see [`AgentSelector::score_agent`].

use crate::agents::{Agent, AgentDirectory, AgentRef};
use crate::error::{Error, Result};
use crate::heuristics::{
    contains_whole_word, content_words, expertise_keywords, implied_tools, match_keyword,
    ExecutionBias, MatchStrength,
};
use roster_llm::Message;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Hard cap on collaborating agents
pub const MAX_TEAM_SIZE: usize = 3;

/// Points for a direct name/id mention
pub const DIRECT_MENTION_POINTS: f64 = 100.0;
const WHOLE_WORD_POINTS: f64 = 10.0;
const SUBSTRING_POINTS: f64 = 5.0;
const PARTIAL_POINTS: f64 = 2.0;
const DESCRIPTION_WORD_POINTS: f64 = 3.0;
const DESCRIPTION_MAX_POINTS: f64 = 15.0;
const TOOL_POINTS: f64 = 8.0;
const CAPABILITY_POINTS: f64 = 0.5;
const CAPABILITY_MAX_POINTS: f64 = 3.0;
const BIAS_POINTS: f64 = 5.0;
const CONTINUITY_MENTION_POINTS: f64 = 8.0;
const CONTINUITY_TOPIC_POINTS: f64 = 4.0;
/// History turns considered for continuity
const CONTINUITY_WINDOW: usize = 3;
/// Reasons reported per selection
const MAX_REASONS: usize = 3;

/// Reason given when the request names the agent
pub const REASON_DIRECT_MENTION: &str = "directly mentioned";
/// Reason given when nothing matched
pub const REASON_GENERAL: &str = "general capabilities";

/// Map a raw score to a confidence bucket
#[must_use]
pub fn confidence_for(score: f64) -> f64 {
    if score >= 50.0 {
        0.95
    } else if score >= 30.0 {
        0.8
    } else if score >= 15.0 {
        0.6
    } else if score > 0.0 {
        0.3
    } else {
        0.1
    }
}

/// One contribution to an agent's score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReason {
    /// Human-readable label
    pub label: String,
    /// Points contributed
    pub points: f64,
}

/// Score of one agent for one request
#[derive(Debug, Clone)]
pub struct AgentScore<'a> {
    /// Scored agent
    pub agent: &'a Agent,
    /// Total points
    pub score: f64,
    /// Contributions in the order they were computed
    pub reasons: Vec<ScoreReason>,
}

impl AgentScore<'_> {
    /// Top reason labels by points (ties keep computation order)
    #[must_use]
    pub fn top_reasons(&self, limit: usize) -> Vec<String> {
        let mut reasons: Vec<&ScoreReason> = self.reasons.iter().collect();
        reasons.sort_by(|a, b| b.points.total_cmp(&a.points));
        reasons
            .into_iter()
            .take(limit)
            .map(|r| r.label.clone())
            .collect()
    }
}

/// Ranked entry in a selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAgent {
    /// Agent id
    pub id: String,
    /// Raw score
    pub score: f64,
}

/// Outcome of single-agent selection
#[derive(Debug, Clone, Serialize)]
pub struct SelectionResult {
    /// Chosen agent
    pub agent: Agent,
    /// Top matched reasons
    pub reasons: Vec<String>,
    /// Bucketed confidence in `[0, 1]`
    pub confidence: f64,
    /// Raw score of the chosen agent
    pub score: f64,
    /// All agents, best first
    pub ranked: Vec<RankedAgent>,
}

impl SelectionResult {
    /// Reference to the chosen agent
    #[must_use]
    pub fn agent_ref(&self) -> AgentRef {
        self.agent.to_ref()
    }
}

/// Capability-matching agent selector
#[derive(Debug, Clone)]
pub struct AgentSelector {
    directory: Arc<AgentDirectory>,
}

impl AgentSelector {
    /// Create a selector over a directory
    #[must_use]
    pub fn new(directory: Arc<AgentDirectory>) -> Self {
        Self { directory }
    }

    /// Directory being scored
    #[must_use]
    pub fn directory(&self) -> &Arc<AgentDirectory> {
        &self.directory
    }

    /// Score one agent
    ///
    /// Signals, in order: direct mention (short-circuits), expertise
    /// keywords, description overlap, tool relevance, capability count
    /// (only when something above matched), execution bias, and
    /// conversation continuity.
    #[must_use]
    pub fn score_agent<'a>(
        &self,
        agent: &'a Agent,
        request: &str,
        history: &[Message],
        bias: ExecutionBias,
    ) -> AgentScore<'a> {
        let normalized_request = normalize_name(request);
        if mentions_agent(&normalized_request, agent) {
            return AgentScore {
                agent,
                score: DIRECT_MENTION_POINTS,
                reasons: vec![ScoreReason {
                    label: REASON_DIRECT_MENTION.to_string(),
                    points: DIRECT_MENTION_POINTS,
                }],
            };
        }

        let mut reasons = Vec::new();

        // expertise
        let mut seen = HashSet::new();
        for tag in &agent.expertise {
            let mut points = 0.0;
            let mut hits = Vec::new();
            for keyword in expertise_keywords(tag) {
                if !seen.insert(*keyword) {
                    continue;
                }
                let earned = match match_keyword(request, keyword) {
                    Some(MatchStrength::WholeWord) => WHOLE_WORD_POINTS,
                    Some(MatchStrength::Substring) => SUBSTRING_POINTS,
                    Some(MatchStrength::Partial) => PARTIAL_POINTS,
                    None => continue,
                };
                points += earned;
                hits.push(*keyword);
            }
            if points > 0.0 {
                reasons.push(ScoreReason {
                    label: format!("{tag} expertise ({})", hits.join(", ")),
                    points,
                });
            }
        }

        // description overlap
        let request_words = content_words(request);
        let description_words = content_words(&agent.description);
        let overlap: Vec<&String> = request_words
            .iter()
            .filter(|word| description_words.contains(word))
            .collect();
        if !overlap.is_empty() {
            let points = (overlap.len() as f64 * DESCRIPTION_WORD_POINTS).min(DESCRIPTION_MAX_POINTS);
            reasons.push(ScoreReason {
                label: format!(
                    "description match ({})",
                    overlap
                        .iter()
                        .map(|w| w.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                points,
            });
        }

        // tools
        for tool in implied_tools(request) {
            if agent.has_tool(tool) {
                reasons.push(ScoreReason {
                    label: format!("{tool} capability"),
                    points: TOOL_POINTS,
                });
            }
        }

        let matched: f64 = reasons.iter().map(|r| r.points).sum();
        if matched > 0.0 && agent.capability_count() > 0 {
            let points =
                (agent.capability_count() as f64 * CAPABILITY_POINTS).min(CAPABILITY_MAX_POINTS);
            reasons.push(ScoreReason {
                label: "broad capabilities".to_string(),
                points,
            });
        }

        if bias
            .favored_expertise()
            .iter()
            .any(|tag| agent.has_expertise(tag))
        {
            reasons.push(ScoreReason {
                label: format!("{} mode", bias.as_str()),
                points: BIAS_POINTS,
            });
        }

        if let Some(reason) = continuity(agent, history) {
            reasons.push(reason);
        }

        let score = reasons.iter().map(|r| r.points).sum();
        AgentScore {
            agent,
            score,
            reasons,
        }
    }

    /// Score all agents, best first; ties keep directory order
    ///
    /// # Errors
    /// `DirectoryNotReady` before load.
    pub fn rank(
        &self,
        request: &str,
        history: &[Message],
        bias: ExecutionBias,
    ) -> Result<Vec<AgentScore<'_>>> {
        let mut scores: Vec<AgentScore<'_>> = self
            .directory
            .agents()?
            .iter()
            .map(|agent| self.score_agent(agent, request, history, bias))
            .collect();
        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(scores)
    }

    /// Pick the single best agent
    ///
    /// Falls back to the first directory entry with
    /// [`REASON_GENERAL`] when no agent scores above zero.
    ///
    /// # Errors
    /// `DirectoryNotReady` before load, `EmptyDirectory` when there is no
    /// agent to fall back to.
    #[instrument(skip(self, request, history))]
    pub fn select(
        &self,
        request: &str,
        history: &[Message],
        bias: ExecutionBias,
    ) -> Result<SelectionResult> {
        let ranked = self.rank(request, history, bias)?;
        let best = ranked.first().ok_or(Error::EmptyDirectory)?;

        let ranked_summary: Vec<RankedAgent> = ranked
            .iter()
            .map(|s| RankedAgent {
                id: s.agent.id.clone(),
                score: s.score,
            })
            .collect();

        let result = if best.score > 0.0 {
            SelectionResult {
                agent: best.agent.clone(),
                reasons: best.top_reasons(MAX_REASONS),
                confidence: confidence_for(best.score),
                score: best.score,
                ranked: ranked_summary,
            }
        } else {
            let first = self
                .directory
                .agents()?
                .first()
                .ok_or(Error::EmptyDirectory)?;
            SelectionResult {
                agent: first.clone(),
                reasons: vec![REASON_GENERAL.to_string()],
                confidence: confidence_for(0.0),
                score: 0.0,
                ranked: ranked_summary,
            }
        };

        debug!(
            agent = %result.agent.id,
            score = result.score,
            confidence = result.confidence,
            "agent selected"
        );
        Ok(result)
    }

    /// Build a collaboration shortlist
    ///
    /// Takes the top `min(team_size, MAX_TEAM_SIZE)` agents with a positive
    /// score. An empty shortlist becomes the first two directory entries; a
    /// single agent gets the first distinct directory agent as a partner.
    ///
    /// # Errors
    /// `DirectoryNotReady` before load, `EmptyDirectory` when the directory
    /// holds no agents.
    #[instrument(skip(self, request, history))]
    pub fn shortlist(
        &self,
        request: &str,
        history: &[Message],
        team_size: usize,
        bias: ExecutionBias,
    ) -> Result<Vec<Agent>> {
        let agents = self.directory.agents()?;
        if agents.is_empty() {
            return Err(Error::EmptyDirectory);
        }

        let limit = team_size.min(MAX_TEAM_SIZE);
        let mut team: Vec<Agent> = self
            .rank(request, history, bias)?
            .into_iter()
            .filter(|s| s.score > 0.0)
            .take(limit)
            .map(|s| s.agent.clone())
            .collect();

        if team.is_empty() {
            team.extend(agents.iter().take(2).cloned());
        } else if team.len() == 1 {
            if let Some(partner) = agents.iter().find(|a| a.id != team[0].id) {
                team.push(partner.clone());
            }
        }

        debug!(
            team = ?team.iter().map(|a| a.id.as_str()).collect::<Vec<_>>(),
            "shortlist built"
        );
        Ok(team)
    }
}

/// Lowercase and turn hyphens/underscores into spaces
fn normalize_name(text: &str) -> String {
    text.to_lowercase().replace(['-', '_'], " ")
}

fn mentions_agent(normalized_text: &str, agent: &Agent) -> bool {
    [agent.id.as_str(), agent.name.as_str()]
        .into_iter()
        .map(normalize_name)
        .any(|name| !name.trim().is_empty() && contains_whole_word(normalized_text, name.trim()))
}

fn continuity(agent: &Agent, history: &[Message]) -> Option<ScoreReason> {
    let recent: Vec<&Message> = history.iter().rev().take(CONTINUITY_WINDOW).collect();
    if recent.is_empty() {
        return None;
    }

    let mentioned = recent
        .iter()
        .any(|turn| mentions_agent(&normalize_name(&turn.content), agent));
    if mentioned {
        return Some(ScoreReason {
            label: "mentioned recently".to_string(),
            points: CONTINUITY_MENTION_POINTS,
        });
    }

    let on_topic = recent.iter().any(|turn| {
        let lower = turn.content.to_lowercase();
        agent
            .expertise
            .iter()
            .flat_map(|tag| expertise_keywords(tag).iter())
            .any(|keyword| contains_whole_word(&lower, keyword))
    });
    on_topic.then(|| ScoreReason {
        label: "continues recent topic".to_string(),
        points: CONTINUITY_TOPIC_POINTS,
    })
}
