//! End-to-end orchestration tests
//!
//! Drive the public API with the bundled agent definitions and a scripted
//! model backend.

use roster_core::collaboration::{CollaborationConfig, CollaborationOrchestrator, MessageType};
use roster_core::{
    Agent, AgentDirectory, AgentSelector, ComplexityClassifier, DispatchOptions, Dispatcher,
    ExecutionBias, StatusBoard, TomlAgentLoader, MAX_TEAM_SIZE,
};
use roster_llm::{LlmRouter, MockProvider};
use std::path::PathBuf;
use std::sync::Arc;

fn project_agents_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("config/agents")
}

async fn project_directory() -> Arc<AgentDirectory> {
    let directory = AgentDirectory::new(Arc::new(TomlAgentLoader::with_path(project_agents_dir())));
    directory.load().await.expect("Failed to load agents");
    Arc::new(directory)
}

#[tokio::test]
async fn test_bundled_agents_match_builtin_roster() {
    let directory = project_directory().await;
    let loaded: Vec<_> = directory
        .agents()
        .unwrap()
        .iter()
        .map(|a| a.id.clone())
        .collect();
    let builtin: Vec<_> = Agent::defaults().into_iter().map(|a| a.id).collect();
    assert_eq!(loaded, builtin, "config/agents should mirror the built-in roster");

    for agent in directory.agents().unwrap() {
        assert!(!agent.prompt.trim().is_empty(), "{} has no prompt", agent.id);
        assert!(!agent.expertise.is_empty(), "{} has no expertise", agent.id);
    }
}

#[test]
fn test_full_stack_scenario() {
    let verdict = ComplexityClassifier::new().classify(
        "Build a production-ready full-stack application with frontend, backend, and database",
    );
    assert!(verdict.is_complex);
    for domain in ["frontend", "backend", "database"] {
        assert!(
            verdict.required_expertise.iter().any(|d| d == domain),
            "missing {domain}"
        );
    }
    assert_eq!(verdict.estimated_team_size, 3);
}

#[tokio::test]
async fn test_direct_mention_scenario() {
    let selector = AgentSelector::new(project_directory().await);
    let result = selector
        .select("design-specialist, can you help?", &[], ExecutionBias::General)
        .unwrap();
    assert_eq!(result.agent.id, "design-specialist");
    assert_eq!(result.confidence, 0.95);
    assert!(result.reasons.iter().any(|r| r == "directly mentioned"));
}

#[tokio::test]
async fn test_shortlist_never_exceeds_cap_or_empties() {
    let selector = AgentSelector::new(project_directory().await);
    let requests = [
        "",
        "hello",
        "Build a production-ready full-stack application with frontend, backend, and database",
        "Deploy a secure React dashboard with analytics, tests, SEO copy and a new logo",
    ];
    for request in requests {
        for size in 0..6 {
            let team = selector
                .shortlist(request, &[], size, ExecutionBias::General)
                .unwrap();
            assert!(!team.is_empty());
            assert!(team.len() <= MAX_TEAM_SIZE);
        }
    }
}

#[tokio::test]
async fn test_two_agent_failure_scenario() {
    let directory = project_directory().await;
    let team = vec![
        directory.get("frontend-developer").unwrap().clone(),
        directory.get("security-analyst").unwrap().clone(),
    ];
    let provider = MockProvider::new()
        .failing_on("You are the Security Analyst")
        .with_reply("Team contributions", "merged");
    let orchestrator = CollaborationOrchestrator::new(
        Arc::new(LlmRouter::single(Arc::new(provider))),
        StatusBoard::default(),
        CollaborationConfig::default(),
    );
    let verdict = ComplexityClassifier::new().classify("secure the login page");

    let result = orchestrator
        .run("secure the login page", &[], &team, &verdict)
        .await;

    let contributions: Vec<_> = result.messages_of(MessageType::Contribution).collect();
    assert_eq!(contributions.len(), 2);
    assert!(contributions[1].content.starts_with("Security Analyst could not"));
    assert_eq!(
        result.messages.last().map(|m| m.message_type),
        Some(MessageType::Synthesis)
    );
    assert_eq!(result.final_answer, "merged");
}

#[tokio::test]
async fn test_everything_fails_still_answers() {
    let directory = project_directory().await;
    let provider = Arc::new(MockProvider::new().failing());
    let dispatcher = Dispatcher::builder(directory, Arc::new(LlmRouter::single(provider)))
        .build()
        .unwrap();

    let response = dispatcher
        .dispatch(
            "Build a production-ready full-stack application with frontend, backend, and database",
            &[],
            &DispatchOptions::default(),
        )
        .await
        .unwrap();

    assert!(response.metadata.is_multi_agent);
    assert!(!response.answer.is_empty());
    assert!(response.answer.starts_with("## "));
}

#[tokio::test]
async fn test_direct_mode_never_scores() {
    let directory = project_directory().await;
    let provider = Arc::new(MockProvider::new().with_default_reply("direct answer"));
    let dispatcher =
        Dispatcher::builder(directory, Arc::new(LlmRouter::single(provider.clone())))
            .build()
            .unwrap();

    let response = dispatcher
        .dispatch(
            "Build a production-ready full-stack application with frontend, backend, and database",
            &[],
            &DispatchOptions::direct("qa-engineer"),
        )
        .await
        .unwrap();

    assert_eq!(response.answer, "direct answer");
    assert!(response.metadata.complexity.is_none());
    assert!(response.metadata.confidence.is_none());
    assert!(!response.metadata.is_multi_agent);
    assert_eq!(provider.call_count(), 1);
    let system = provider.calls()[0].system_prompt().unwrap_or_default().to_string();
    assert!(system.contains("QA Engineer"));
}
