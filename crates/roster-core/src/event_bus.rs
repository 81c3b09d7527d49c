//! EventBus - broadcast-based status and message events.
//!
//! The chat surface subscribes to follow progress: agent status transitions,
//! transcript messages as they are produced, mode decisions and delegate
//! failures. Publishing never blocks orchestration.

use crate::agents::AgentStatus;
use crate::collaboration::MessageType;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

/// Events emitted while a request is handled.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RosterEvent {
    /// An agent changed status
    AgentStatusChanged {
        /// Agent id
        agent: String,
        /// New status
        status: AgentStatus,
        /// Short human-readable detail
        detail: String,
    },
    /// A transcript message was produced
    MessagePosted {
        /// Sender id
        from: String,
        /// Recipient id (directed discussion turns only)
        to: Option<String>,
        /// Message kind
        message_type: MessageType,
        /// Message text
        content: String,
        /// Free-form metadata (tokens, model)
        metadata: Value,
    },
    /// The dispatcher picked an operating mode
    ModeSelected {
        /// Mode name
        mode: String,
        /// Why this mode was used
        reason: String,
    },
    /// A workflow or consulting engine failed
    DelegateFailed {
        /// Engine name
        engine: String,
        /// User-visible error text
        error: String,
    },
}

/// Broadcast-based event bus.
///
/// Slow subscribers will miss events (lagged) rather than blocking the publisher.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RosterEvent>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RosterEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all active subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: RosterEvent) -> usize {
        // send() returns Err if there are no receivers, which is fine
        self.sender.send(event).unwrap_or(0)
    }

    /// Report an agent status transition
    pub fn emit_status(&self, agent: &str, status: AgentStatus, detail: impl Into<String>) {
        self.publish(RosterEvent::AgentStatusChanged {
            agent: agent.to_string(),
            status,
            detail: detail.into(),
        });
    }

    /// Report a transcript message
    pub fn emit_message(
        &self,
        from: &str,
        to: Option<&str>,
        message_type: MessageType,
        content: &str,
        metadata: Value,
    ) {
        self.publish(RosterEvent::MessagePosted {
            from: from.to_string(),
            to: to.map(str::to_string),
            message_type,
            content: content.to_string(),
            metadata,
        });
    }

    /// Get the current number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
