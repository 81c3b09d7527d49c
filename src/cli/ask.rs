//! `roster ask`

use crate::app::App;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use roster_core::{
    format_error_for_cli, DispatchOptions, DispatchResponse, EventBus, ExecutionBias, ModeKind,
    RosterEvent,
};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Request text
    pub request: String,

    /// Operating mode: team, solo, direct, workflow or consulting
    #[arg(long)]
    pub mode: Option<String>,

    /// Target agent id (direct mode)
    #[arg(long)]
    pub agent: Option<String>,

    /// Selection bias: technical, creative, analytical or general
    #[arg(long)]
    pub execution_mode: Option<String>,

    /// Workflow id (workflow mode)
    #[arg(long)]
    pub workflow: Option<String>,

    /// Consulting domain (consulting mode)
    #[arg(long)]
    pub domain: Option<String>,

    /// Calling user id
    #[arg(long)]
    pub user: Option<String>,

    /// Chat session id
    #[arg(long)]
    pub session: Option<String>,

    /// Stream agent status and transcript events to stderr
    #[arg(long)]
    pub progress: bool,
}

impl AskArgs {
    fn options(&self) -> Result<DispatchOptions> {
        let mode = match self.mode.as_deref() {
            Some(mode) => Some(
                mode.parse::<ModeKind>()
                    .map_err(|e| anyhow!(format_error_for_cli(&e)))?,
            ),
            // --agent alone implies direct mode
            None if self.agent.is_some() => Some(ModeKind::Direct),
            None => None,
        };

        Ok(DispatchOptions {
            mode,
            target_agent_id: self.agent.clone(),
            user_id: self.user.clone(),
            session_id: self.session.clone(),
            workflow_id: self.workflow.clone(),
            domain: self.domain.clone(),
            execution_mode: self
                .execution_mode
                .as_deref()
                .map(|hint| hint.parse::<ExecutionBias>().unwrap_or(ExecutionBias::General)),
        })
    }
}

/// Dispatch one request and print the response
pub async fn run(args: AskArgs, json: bool) -> Result<()> {
    let options = args.options()?;
    let app = App::bootstrap().await?;

    let progress = args.progress.then(|| spawn_progress(app.dispatcher.events()));
    let result = app.dispatcher.dispatch(&args.request, &[], &options).await;
    if let Some((stop, handle)) = progress {
        let _ = stop.send(());
        let _ = handle.await;
    }

    let response = result.map_err(|e| anyhow!(format_error_for_cli(&e)))?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&response).context("Failed to serialize response")?;
        println!("{rendered}");
    } else {
        println!("{}", render(&response));
    }
    Ok(())
}

/// Print events until stopped; queued events are flushed on stop
fn spawn_progress(events: &EventBus) -> (oneshot::Sender<()>, JoinHandle<()>) {
    let mut receiver = events.subscribe();
    let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                received = receiver.recv() => match received {
                    Ok(event) => eprintln!("{}", describe_event(&event)),
                    Err(RecvError::Lagged(skipped)) => eprintln!("... {skipped} events skipped"),
                    Err(RecvError::Closed) => break,
                },
                _ = &mut stop_rx => {
                    for line in drain_pending(&mut receiver) {
                        eprintln!("{line}");
                    }
                    break;
                }
            }
        }
    });
    (stop_tx, handle)
}

fn drain_pending(receiver: &mut Receiver<RosterEvent>) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(event) => lines.push(describe_event(&event)),
            Err(TryRecvError::Lagged(skipped)) => {
                lines.push(format!("... {skipped} events skipped"));
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    lines
}

fn describe_event(event: &RosterEvent) -> String {
    match event {
        RosterEvent::AgentStatusChanged { agent, status, detail } => {
            format!("[status] {agent}: {status:?} {detail}")
        }
        RosterEvent::MessagePosted {
            from,
            to,
            message_type,
            ..
        } => match to {
            Some(to) => format!("[message] {from} -> {to} ({message_type:?})"),
            None => format!("[message] {from} ({message_type:?})"),
        },
        RosterEvent::ModeSelected { mode, reason } => format!("[mode] {mode}: {reason}"),
        RosterEvent::DelegateFailed { engine, error } => format!("[delegate] {engine} failed: {error}"),
    }
}

fn render(response: &DispatchResponse) -> String {
    let mut out = String::new();
    out.push_str(&response.answer);
    out.push_str("\n\n---\n");

    let meta = &response.metadata;
    match (&response.selected_agent, &meta.agents_involved) {
        (_, Some(team)) if meta.is_multi_agent => {
            let names: Vec<&str> = team.iter().map(|agent| agent.name.as_str()).collect();
            out.push_str(&format!("team: {}\n", names.join(", ")));
        }
        (Some(agent), _) => out.push_str(&format!("agent: {} ({})\n", agent.name, agent.id)),
        _ => {}
    }
    out.push_str(&format!("mode: {}  model: {}\n", meta.mode, meta.model));
    if let Some(confidence) = meta.confidence {
        out.push_str(&format!("confidence: {confidence:.2}\n"));
    }
    if let Some(tokens) = meta.tokens_used {
        out.push_str(&format!("tokens: {tokens}"));
        if let Some(cost) = meta.estimated_cost_usd {
            out.push_str(&format!("  cost: ${cost:.5}"));
        }
        out.push('\n');
    }
    out.push_str(&format!("reason: {}", response.reason));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{AgentRef, ResponseMetadata};

    fn args(request: &str) -> AskArgs {
        AskArgs {
            request: request.to_string(),
            mode: None,
            agent: None,
            execution_mode: None,
            workflow: None,
            domain: None,
            user: None,
            session: None,
            progress: false,
        }
    }

    #[test]
    fn test_agent_flag_implies_direct() {
        let mut ask = args("hi");
        ask.agent = Some("qa-engineer".to_string());
        let options = ask.options().unwrap();
        assert_eq!(options.mode, Some(ModeKind::Direct));
        assert_eq!(options.target_agent_id.as_deref(), Some("qa-engineer"));
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let mut ask = args("hi");
        ask.mode = Some("committee".to_string());
        assert!(ask.options().is_err());
    }

    #[test]
    fn test_execution_mode_is_parsed() {
        let mut ask = args("hi");
        ask.execution_mode = Some("creative".to_string());
        let options = ask.options().unwrap();
        assert_eq!(options.execution_mode, Some(ExecutionBias::Creative));
    }

    #[test]
    fn test_render_single_agent() {
        let response = DispatchResponse {
            answer: "Use a CTE.".to_string(),
            selected_agent: Some(AgentRef {
                id: "database-architect".to_string(),
                name: "Database Architect".to_string(),
            }),
            reason: "expertise: database".to_string(),
            transcript: None,
            metadata: ResponseMetadata {
                model: "gpt-4o-mini".to_string(),
                tokens_used: Some(42),
                mode: "solo".to_string(),
                confidence: Some(0.8),
                ..Default::default()
            },
        };
        let text = render(&response);
        assert!(text.starts_with("Use a CTE."));
        assert!(text.contains("agent: Database Architect (database-architect)"));
        assert!(text.contains("confidence: 0.80"));
        assert!(text.contains("tokens: 42"));
    }

    #[test]
    fn test_drain_pending_flushes_queued_events() {
        let bus = EventBus::new(16);
        let mut receiver = bus.subscribe();
        bus.publish(RosterEvent::ModeSelected {
            mode: "team".to_string(),
            reason: "complex request".to_string(),
        });
        bus.emit_status("alpha", roster_core::AgentStatus::Idle, "done");

        let lines = drain_pending(&mut receiver);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "[mode] team: complex request");
        assert!(lines[1].starts_with("[status] alpha"));
        assert!(drain_pending(&mut receiver).is_empty());
    }

    #[tokio::test]
    async fn test_progress_task_stops_after_flush() {
        let bus = EventBus::new(16);
        let (stop, handle) = spawn_progress(&bus);
        bus.emit_status("alpha", roster_core::AgentStatus::Thinking, "contributing");
        stop.send(()).unwrap();
        handle.await.unwrap();
    }

    #[test]
    fn test_describe_mode_event() {
        let event = RosterEvent::ModeSelected {
            mode: "team".to_string(),
            reason: "complex request".to_string(),
        };
        assert_eq!(describe_event(&event), "[mode] team: complex request");
    }
}
