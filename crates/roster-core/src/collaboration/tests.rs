use super::*;
use crate::classifier::ComplexityClassifier;
use crate::event_bus::{EventBus, RosterEvent};
use roster_llm::{LlmProvider, MockProvider};

fn agent(id: &str, name: &str, prompt: &str) -> Agent {
    Agent::new(id, name, format!("{name} specialist"))
        .with_expertise(["research"])
        .with_prompt(prompt)
}

fn team(n: usize) -> Vec<Agent> {
    [
        agent("alpha", "Alpha", "You are Alpha."),
        agent("bravo", "Bravo", "You are Bravo."),
        agent("charlie", "Charlie", "You are Charlie."),
    ]
    .into_iter()
    .take(n)
    .collect()
}

fn orchestrator(mock: MockProvider) -> CollaborationOrchestrator {
    orchestrator_with(mock, CollaborationConfig::default())
}

fn orchestrator_with(mock: MockProvider, config: CollaborationConfig) -> CollaborationOrchestrator {
    let router = LlmRouter::single(Arc::new(mock));
    CollaborationOrchestrator::new(Arc::new(router), StatusBoard::default(), config)
}

fn verdict() -> ComplexityVerdict {
    ComplexityClassifier::new()
        .classify("Build a production-ready full-stack application with frontend, backend, and database")
}

#[tokio::test]
async fn test_three_agents_full_protocol() {
    let mock = MockProvider::new()
        .with_reply("Team contributions", "merged answer")
        .with_reply("React briefly", "Consider caching.");
    let result = orchestrator(mock)
        .run("plan the launch", &[], &team(3), &verdict())
        .await;

    let kinds: Vec<MessageType> = result.messages.iter().map(|m| m.message_type).collect();
    assert_eq!(
        kinds,
        vec![
            MessageType::Contribution,
            MessageType::Contribution,
            MessageType::Contribution,
            MessageType::Discussion,
            MessageType::Discussion,
            MessageType::Synthesis,
        ]
    );
    assert_eq!(result.final_answer, "merged answer");
    assert!(result.is_complex);
    assert_eq!(result.agents_involved.len(), 3);

    let discussion: Vec<_> = result.messages_of(MessageType::Discussion).collect();
    assert_eq!(discussion[0].from, "bravo");
    assert_eq!(discussion[0].to.as_deref(), Some("alpha"));
    assert_eq!(discussion[1].from, "charlie");
    assert_eq!(discussion[1].to.as_deref(), Some("bravo"));

    // six calls at 15 tokens each
    assert_eq!(result.metadata.total_tokens(), 90);
    assert_eq!(result.metadata.failed_calls, 0);
    assert!(!result.metadata.synthesis_fallback);
    assert_eq!(result.metadata.messages_per_agent.get("bravo"), Some(&2));
    assert_eq!(result.metadata.messages_per_agent.get("alpha"), Some(&1));
    assert!(!result.metadata.messages_per_agent.contains_key(SUPERVISOR));
}

#[tokio::test]
async fn test_two_agents_skip_discussion() {
    let mock = MockProvider::new();
    let result = orchestrator(mock)
        .run("plan the launch", &[], &team(2), &verdict())
        .await;

    assert_eq!(result.messages.len(), 3);
    assert_eq!(result.messages_of(MessageType::Discussion).count(), 0);
    assert_eq!(
        result.messages.last().map(|m| m.message_type),
        Some(MessageType::Synthesis)
    );
}

#[tokio::test]
async fn test_one_contribution_fails_still_synthesizes() {
    let mut agents = team(2);
    agents[1] = agent("broken", "Broken", "FAIL-ME persona");
    let mock = MockProvider::new()
        .failing_on("FAIL-ME")
        .with_reply("Team contributions", "merged answer");

    let result = orchestrator(mock)
        .run("plan the launch", &[], &agents, &verdict())
        .await;

    let contributions: Vec<_> = result.messages_of(MessageType::Contribution).collect();
    assert_eq!(contributions.len(), 2);
    assert_eq!(contributions[1].from, "broken");
    assert!(contributions[1].content.starts_with("Broken could not"));
    assert_eq!(contributions[1].tokens, 0);

    assert_eq!(result.final_answer, "merged answer");
    assert_eq!(result.metadata.failed_calls, 1);
    // one contribution + synthesis
    assert_eq!(result.metadata.total_tokens(), 30);
}

#[tokio::test]
async fn test_all_calls_fail_concatenates() {
    let result = orchestrator(MockProvider::new().failing())
        .run("plan the launch", &[], &team(3), &verdict())
        .await;

    assert!(!result.final_answer.is_empty());
    assert!(result.final_answer.starts_with("## Alpha\n"));
    assert!(result.final_answer.contains("\n\n## Bravo\n"));
    assert!(result.metadata.synthesis_fallback);
    assert_eq!(result.metadata.total_tokens(), 0);
    // discussion is skipped for fallback contributions
    assert_eq!(result.messages.len(), 4);
    assert_eq!(result.metadata.failed_calls, 4);
}

#[tokio::test]
async fn test_discussion_failure_is_isolated() {
    let mock = MockProvider::new().failing_on("Alpha contributed:");
    let result = orchestrator(mock)
        .run("plan the launch", &[], &team(3), &verdict())
        .await;

    let discussion: Vec<_> = result.messages_of(MessageType::Discussion).collect();
    assert_eq!(discussion.len(), 1);
    assert_eq!(discussion[0].from, "charlie");
    assert_eq!(result.metadata.failed_calls, 1);
    assert!(!result.metadata.synthesis_fallback);
}

#[tokio::test]
async fn test_question_replies_are_tagged() {
    let mock = MockProvider::new().with_reply("React briefly", "Should we add caching?");
    let result = orchestrator(mock)
        .run("plan the launch", &[], &team(3), &verdict())
        .await;

    assert_eq!(result.messages_of(MessageType::Question).count(), 2);
    assert_eq!(result.messages_of(MessageType::Discussion).count(), 0);
}

#[tokio::test]
async fn test_empty_team_returns_generic_synthesis() {
    let mock = Arc::new(MockProvider::new());
    let router = LlmRouter::single(mock.clone());
    let orchestrator = CollaborationOrchestrator::new(
        Arc::new(router),
        StatusBoard::default(),
        CollaborationConfig::default(),
    );

    let result = orchestrator.run("anything", &[], &[], &verdict()).await;
    assert_eq!(result.messages.len(), 1);
    assert_eq!(result.final_answer, EMPTY_TEAM_ANSWER);
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn test_timeout_counts_as_failure() {
    let mock = MockProvider::new().with_latency(Duration::from_millis(500));
    let config = CollaborationConfig {
        call_timeout_ms: 20,
        ..Default::default()
    };
    let orchestrator = orchestrator_with(mock, config);
    let result = orchestrator
        .run("plan the launch", &[], &team(2), &verdict())
        .await;

    assert!(result.metadata.synthesis_fallback);
    assert_eq!(result.metadata.failed_calls, 3);
    assert_eq!(orchestrator.status().get("alpha"), AgentStatus::Error);
}

#[tokio::test]
async fn test_contributions_run_concurrently() {
    // 3 contributions + 1 synthesis at 300ms each: 600ms concurrent, 1200ms serial
    let mock = MockProvider::new().with_latency(Duration::from_millis(300));
    let config = CollaborationConfig {
        max_discussion_pairs: 0,
        ..Default::default()
    };
    let started = std::time::Instant::now();
    let result = orchestrator_with(mock, config)
        .run("plan the launch", &[], &team(3), &verdict())
        .await;
    let elapsed = started.elapsed();

    assert_eq!(result.messages_of(MessageType::Contribution).count(), 3);
    assert_eq!(result.messages_of(MessageType::Discussion).count(), 0);
    assert!(elapsed < Duration::from_millis(1000), "took {elapsed:?}");
}

#[tokio::test]
async fn test_discussion_turns_run_concurrently() {
    // contributions, 2 discussion turns, synthesis at 400ms each:
    // 1200ms concurrent, 1600ms with serial discussion
    let mock = MockProvider::new().with_latency(Duration::from_millis(400));
    let started = std::time::Instant::now();
    let result = orchestrator(mock)
        .run("plan the launch", &[], &team(3), &verdict())
        .await;
    let elapsed = started.elapsed();

    assert_eq!(result.messages_of(MessageType::Discussion).count(), 2);
    assert!(elapsed < Duration::from_millis(1500), "took {elapsed:?}");
}

#[tokio::test]
async fn test_status_returns_to_idle() {
    let orchestrator = orchestrator(MockProvider::new());
    orchestrator
        .run("plan the launch", &[], &team(2), &verdict())
        .await;
    assert_eq!(orchestrator.status().get("alpha"), AgentStatus::Idle);
    assert_eq!(orchestrator.status().get("bravo"), AgentStatus::Idle);
}

#[tokio::test]
async fn test_agent_model_binding_is_used() {
    let primary = Arc::new(MockProvider::named("primary"));
    let secondary = Arc::new(MockProvider::named("secondary"));
    let mut router = LlmRouter::new("primary");
    router.register("primary", primary.clone() as Arc<dyn LlmProvider>);
    router.register("secondary", secondary.clone() as Arc<dyn LlmProvider>);

    let mut agents = team(2);
    agents[1] = agents[1]
        .clone()
        .with_model("secondary", Some("special-model".to_string()));

    let orchestrator = CollaborationOrchestrator::new(
        Arc::new(router),
        StatusBoard::default(),
        CollaborationConfig::default(),
    );
    orchestrator
        .run("plan the launch", &[], &agents, &verdict())
        .await;

    let calls = secondary.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, "special-model");
    // alpha contribution + synthesis on the default provider
    assert_eq!(primary.call_count(), 2);
}

#[tokio::test]
async fn test_history_window_and_request_forwarded() {
    let mock = Arc::new(MockProvider::new());
    let orchestrator = CollaborationOrchestrator::new(
        Arc::new(LlmRouter::single(mock.clone())),
        StatusBoard::default(),
        CollaborationConfig {
            history_window: 2,
            ..Default::default()
        },
    );
    let history = vec![
        Message::user("one"),
        Message::assistant("two"),
        Message::user("three"),
    ];
    orchestrator
        .run("plan the launch", &history, &team(2), &verdict())
        .await;

    let first = &mock.calls()[0];
    let contents: Vec<&str> = first.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(&contents[1..], &["two", "three", "plan the launch"]);
    assert_eq!(first.max_tokens, Some(400));
}

#[tokio::test]
async fn test_messages_published_on_event_bus() {
    let bus = EventBus::new(64);
    let mut rx = bus.subscribe();
    let orchestrator = CollaborationOrchestrator::new(
        Arc::new(LlmRouter::single(Arc::new(MockProvider::new()))),
        StatusBoard::new(bus),
        CollaborationConfig::default(),
    );
    orchestrator
        .run("plan the launch", &[], &team(2), &verdict())
        .await;

    let mut posted = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let RosterEvent::MessagePosted { message_type, .. } = event {
            posted.push(message_type);
        }
    }
    assert_eq!(
        posted,
        vec![
            MessageType::Contribution,
            MessageType::Contribution,
            MessageType::Synthesis
        ]
    );
}
