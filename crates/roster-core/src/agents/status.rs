//! Per-agent runtime status
//!
//! Agents are immutable after load except for their status. The board keeps
//! one entry per agent id; each entry is guarded by its own shard lock so
//! concurrent runs touching the same agent never race on a transition.

use super::config::AgentStatus;
use crate::event_bus::EventBus;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::trace;

/// Shared status map that publishes transitions to the event bus
#[derive(Debug, Clone)]
pub struct StatusBoard {
    statuses: Arc<DashMap<String, AgentStatus>>,
    events: EventBus,
}

impl StatusBoard {
    /// Create a board publishing on the given bus
    #[must_use]
    pub fn new(events: EventBus) -> Self {
        Self {
            statuses: Arc::new(DashMap::new()),
            events,
        }
    }

    /// Current status (idle when never set)
    #[must_use]
    pub fn get(&self, agent: &str) -> AgentStatus {
        self.statuses
            .get(agent)
            .map(|entry| *entry.value())
            .unwrap_or_default()
    }

    /// Record a transition. Returns `true` if the status changed; an event is
    /// published only on change.
    pub fn set(&self, agent: &str, status: AgentStatus, detail: impl Into<String>) -> bool {
        let previous = self.statuses.insert(agent.to_string(), status);
        let changed = previous != Some(status);
        if changed {
            trace!(agent, ?status, "agent status changed");
            self.events.emit_status(agent, status, detail);
        }
        changed
    }

    /// Snapshot of all known statuses, sorted by agent id
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, AgentStatus)> {
        let mut entries: Vec<_> = self
            .statuses
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Event bus the board publishes on
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new(EventBus::default())
    }
}
