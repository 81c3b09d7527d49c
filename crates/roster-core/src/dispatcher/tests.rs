use super::delegates::{
    MockConsultingEngine, MockDirectChat, MockWorkflowDetector, MockWorkflowEngine,
};
use super::*;
use crate::agents::Agent;
use crate::collaboration::MessageType;
use roster_llm::MockProvider;

const COMPLEX_REQUEST: &str =
    "Build a production-ready full-stack application with frontend, backend, and database";

fn directory() -> Arc<AgentDirectory> {
    Arc::new(AgentDirectory::new(Arc::new(
        crate::agents::StaticAgentLoader::builtin(),
    )))
}

fn builder(mock: Arc<MockProvider>) -> DispatcherBuilder {
    Dispatcher::builder(directory(), Arc::new(LlmRouter::single(mock)))
}

#[tokio::test]
async fn test_direct_mode_only_calls_direct_chat() {
    let provider = Arc::new(MockProvider::new());
    let mut chat = MockDirectChat::new();
    chat.expect_chat()
        .withf(|agent, request| agent.id == "qa-engineer" && request.request == "hello")
        .times(1)
        .returning(|agent, _| {
            Ok(DirectChatReply {
                content: format!("hi from {}", agent.name),
                model: "mock-model".to_string(),
                usage: None,
            })
        });

    let dispatcher = builder(provider.clone())
        .direct_chat(Arc::new(chat))
        .build()
        .unwrap();
    let response = dispatcher
        .dispatch("hello", &[], &DispatchOptions::direct("qa-engineer"))
        .await
        .unwrap();

    assert_eq!(response.answer, "hi from QA Engineer");
    assert_eq!(response.metadata.mode, "direct");
    assert!(response.metadata.complexity.is_none());
    assert!(response.metadata.confidence.is_none());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_direct_mode_unknown_agent() {
    let mut chat = MockDirectChat::new();
    chat.expect_chat().times(0);
    let dispatcher = builder(Arc::new(MockProvider::new()))
        .direct_chat(Arc::new(chat))
        .build()
        .unwrap();

    let err = dispatcher
        .dispatch("hello", &[], &DispatchOptions::direct("ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AgentNotFound(id) if id == "ghost"));
}

#[tokio::test]
async fn test_direct_mode_requires_target() {
    let dispatcher = builder(Arc::new(MockProvider::new())).build().unwrap();
    let err = dispatcher
        .dispatch("hello", &[], &DispatchOptions::mode(ModeKind::Direct))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
}

#[tokio::test]
async fn test_direct_chat_error_degrades() {
    let mut chat = MockDirectChat::new();
    chat.expect_chat()
        .returning(|_, _| Err(Error::Internal("boom".to_string())));
    let dispatcher = builder(Arc::new(MockProvider::new()))
        .direct_chat(Arc::new(chat))
        .build()
        .unwrap();

    let response = dispatcher
        .dispatch("hello", &[], &DispatchOptions::direct("qa-engineer"))
        .await
        .unwrap();
    assert!(response.answer.starts_with("I'm sorry"));
    assert_eq!(response.metadata.model, UNAVAILABLE_MODEL);
}

#[tokio::test]
async fn test_team_simple_request_uses_single_agent() {
    let provider = Arc::new(MockProvider::new().with_default_reply("Here is your blog post."));
    let dispatcher = builder(provider.clone()).build().unwrap();

    let response = dispatcher
        .dispatch("Write a blog article", &[], &DispatchOptions::default())
        .await
        .unwrap();

    assert_eq!(response.answer, "Here is your blog post.");
    assert!(!response.metadata.is_multi_agent);
    assert_eq!(
        response.selected_agent.map(|a| a.id),
        Some("content-writer".to_string())
    );
    let verdict = response.metadata.complexity.unwrap();
    assert!(!verdict.is_complex);
    assert!(response.metadata.confidence.is_some());
    assert_eq!(response.metadata.tokens_used, Some(15));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_team_complex_request_collaborates() {
    let provider = Arc::new(MockProvider::new().with_reply("Team contributions", "merged"));
    let dispatcher = builder(provider).build().unwrap();

    let response = dispatcher
        .dispatch(COMPLEX_REQUEST, &[], &DispatchOptions::default())
        .await
        .unwrap();

    assert!(response.metadata.is_multi_agent);
    assert_eq!(response.metadata.model, MULTI_AGENT_MODEL);
    assert_eq!(response.answer, "merged");
    assert_eq!(response.metadata.agents_involved.as_ref().map(Vec::len), Some(3));
    let transcript = response.transcript.unwrap();
    assert_eq!(
        transcript.last().map(|m| m.message_type),
        Some(MessageType::Synthesis)
    );
    assert!(response.metadata.complexity.unwrap().is_complex);
}

#[tokio::test]
async fn test_team_falls_back_when_team_cannot_form() {
    let directory = Arc::new(AgentDirectory::from_agents(vec![Agent::backend_engineer()]).unwrap());
    let provider = Arc::new(MockProvider::new().with_default_reply("solo answer"));
    let dispatcher = Dispatcher::builder(directory, Arc::new(LlmRouter::single(provider)))
        .build()
        .unwrap();

    let response = dispatcher
        .dispatch(COMPLEX_REQUEST, &[], &DispatchOptions::default())
        .await
        .unwrap();

    assert_eq!(response.answer, "solo answer");
    assert!(response.reason.starts_with("fallback"));
    assert!(!response.metadata.is_multi_agent);
    assert!(response.metadata.complexity.unwrap().is_complex);
}

#[tokio::test]
async fn test_solo_skips_classification() {
    let dispatcher = builder(Arc::new(MockProvider::new())).build().unwrap();
    let response = dispatcher
        .dispatch(COMPLEX_REQUEST, &[], &DispatchOptions::mode(ModeKind::Solo))
        .await
        .unwrap();

    assert!(!response.metadata.is_multi_agent);
    assert!(response.metadata.complexity.is_none());
    assert_eq!(response.metadata.mode, "solo");
    assert!(response.selected_agent.is_some());
}

#[tokio::test]
async fn test_single_agent_model_failure_apologizes() {
    let dispatcher = builder(Arc::new(MockProvider::new().failing()))
        .build()
        .unwrap();
    let response = dispatcher
        .dispatch("Write a blog article", &[], &DispatchOptions::mode(ModeKind::Solo))
        .await
        .unwrap();

    assert!(response.answer.starts_with("I'm sorry, Content Writer"));
    assert_eq!(response.metadata.tokens_used, None);
    assert_eq!(
        dispatcher.status().get("content-writer"),
        crate::agents::AgentStatus::Error
    );
}

#[tokio::test]
async fn test_workflow_mode_success() {
    let mut engine = MockWorkflowEngine::new();
    engine
        .expect_start()
        .withf(|id, request| id.as_deref() == Some("onboarding") && request.user_id.as_deref() == Some("u1"))
        .times(1)
        .returning(|_, _| Ok(DelegateOutcome::succeeded("workflow done")));

    let dispatcher = builder(Arc::new(MockProvider::new()))
        .workflow_engine(Arc::new(engine))
        .build()
        .unwrap();

    let options = DispatchOptions {
        mode: Some(ModeKind::Workflow),
        workflow_id: Some("onboarding".to_string()),
        ..Default::default()
    }
    .with_user("u1");
    let response = dispatcher.dispatch("start", &[], &options).await.unwrap();
    assert_eq!(response.answer, "workflow done");
    assert_eq!(response.metadata.mode, "workflow");
}

#[tokio::test]
async fn test_workflow_failure_is_terminal_and_reported() {
    let mut engine = MockWorkflowEngine::new();
    engine
        .expect_start()
        .returning(|_, _| Ok(DelegateOutcome::failed("step 2 crashed")));

    let dispatcher = builder(Arc::new(MockProvider::new()))
        .workflow_engine(Arc::new(engine))
        .build()
        .unwrap();
    let mut rx = dispatcher.events().subscribe();

    let err = dispatcher
        .dispatch("start", &[], &DispatchOptions::mode(ModeKind::Workflow))
        .await
        .unwrap_err();
    assert!(matches!(&err, Error::Delegate { engine, message } if engine == "workflow" && message == "step 2 crashed"));

    let mut saw_failure = false;
    while let Ok(event) = rx.try_recv() {
        if let RosterEvent::DelegateFailed { engine, .. } = event {
            assert_eq!(engine, "workflow");
            saw_failure = true;
        }
    }
    assert!(saw_failure);
}

#[tokio::test]
async fn test_missing_consulting_engine() {
    let dispatcher = builder(Arc::new(MockProvider::new())).build().unwrap();
    let err = dispatcher
        .dispatch("help", &[], &DispatchOptions::mode(ModeKind::Consulting))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Delegate { .. }));
}

#[tokio::test]
async fn test_consulting_engine_error_propagates() {
    let mut engine = MockConsultingEngine::new();
    engine
        .expect_start()
        .withf(|domain, _| domain.as_deref() == Some("legal"))
        .returning(|_, _| Err(Error::Internal("unreachable".to_string())));

    let dispatcher = builder(Arc::new(MockProvider::new()))
        .consulting_engine(Arc::new(engine))
        .build()
        .unwrap();
    let options = DispatchOptions {
        mode: Some(ModeKind::Consulting),
        domain: Some("legal".to_string()),
        ..Default::default()
    };
    let err = dispatcher.dispatch("help", &[], &options).await.unwrap_err();
    assert!(matches!(err, Error::Delegate { engine, .. } if engine == "consulting"));
}

#[tokio::test]
async fn test_consulting_success() {
    let mut engine = MockConsultingEngine::new();
    engine
        .expect_start()
        .returning(|_, _| Ok(DelegateOutcome::succeeded("consulted")));

    let dispatcher = builder(Arc::new(MockProvider::new()))
        .consulting_engine(Arc::new(engine))
        .build()
        .unwrap();
    let response = dispatcher
        .dispatch("help", &[], &DispatchOptions::mode(ModeKind::Consulting))
        .await
        .unwrap();
    assert_eq!(response.answer, "consulted");
    assert_eq!(response.reason, "consulting on general");
}

#[tokio::test]
async fn test_team_redirects_recurring_task_to_workflow() {
    let provider = Arc::new(MockProvider::new());
    let mut detector = MockWorkflowDetector::new();
    detector
        .expect_detect()
        .returning(|_| Some("weekly-report".to_string()));
    let mut engine = MockWorkflowEngine::new();
    engine
        .expect_start()
        .withf(|id, _| id.as_deref() == Some("weekly-report"))
        .times(1)
        .returning(|_, _| Ok(DelegateOutcome::succeeded("report ready")));

    let dispatcher = builder(provider.clone())
        .workflow_detector(Arc::new(detector))
        .workflow_engine(Arc::new(engine))
        .build()
        .unwrap();

    let response = dispatcher
        .dispatch("do the weekly report", &[], &DispatchOptions::default())
        .await
        .unwrap();
    assert_eq!(response.answer, "report ready");
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_detected_workflow_ignored_without_engine() {
    let dispatcher = builder(Arc::new(MockProvider::new()))
        .config(DispatcherConfig {
            workflow_patterns: vec![WorkflowPattern {
                pattern: "weekly report".to_string(),
                workflow_id: "weekly-report".to_string(),
            }],
            ..Default::default()
        })
        .build()
        .unwrap();

    let response = dispatcher
        .dispatch("do the weekly report", &[], &DispatchOptions::default())
        .await
        .unwrap();
    assert_eq!(response.metadata.mode, "team");
    assert_eq!(response.answer, "mock response");
}

#[tokio::test]
async fn test_invalid_workflow_pattern_fails_build() {
    let result = builder(Arc::new(MockProvider::new()))
        .config(DispatcherConfig {
            workflow_patterns: vec![WorkflowPattern {
                pattern: "(".to_string(),
                workflow_id: "x".to_string(),
            }],
            ..Default::default()
        })
        .build();
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[tokio::test]
async fn test_mode_selected_event() {
    let dispatcher = builder(Arc::new(MockProvider::new())).build().unwrap();
    let mut rx = dispatcher.events().subscribe();
    dispatcher
        .dispatch("hi there", &[], &DispatchOptions::default())
        .await
        .unwrap();

    let mut modes = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let RosterEvent::ModeSelected { mode, .. } = event {
            modes.push(mode);
        }
    }
    assert_eq!(modes, vec!["team".to_string()]);
}
