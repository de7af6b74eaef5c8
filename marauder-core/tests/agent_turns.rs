use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use marauder_core::llm::{
    LLMError, LLMProvider, LLMRequest, LLMResponse, MessageRole, ToolCall, Usage,
};
use marauder_core::tools::ToolRegistry;
use marauder_core::{
    AgentRunner, ConversationSession, NoopObserver, TurnError, TurnObserver, TurnOutcome,
    TurnPhase,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Replays canned responses and records every request it receives.
struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<LLMResponse, LLMError>>>,
    requests: Mutex<Vec<LLMRequest>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<Result<LLMResponse, LLMError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<LLMRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, request: LLMRequest) -> Result<LLMResponse, LLMError> {
        self.requests.lock().push(request);
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(LLMError::provider("script exhausted")))
    }
}

fn calls(calls: Vec<(&str, &str, Value)>, prompt_tokens: u32) -> Result<LLMResponse, LLMError> {
    Ok(LLMResponse {
        tool_calls: Some(
            calls
                .into_iter()
                .map(|(id, name, args)| ToolCall::function(id, name, args.to_string()))
                .collect(),
        ),
        usage: Some(Usage::new(prompt_tokens, 20)),
        ..LLMResponse::default()
    })
}

fn answer(text: &str) -> Result<LLMResponse, LLMError> {
    Ok(LLMResponse {
        content: Some(text.to_owned()),
        usage: Some(Usage::new(100, 10)),
        ..LLMResponse::default()
    })
}

fn runner(provider: Arc<ScriptedProvider>, workspace: &TempDir) -> AgentRunner {
    let tools = Arc::new(ToolRegistry::new(workspace.path()).unwrap());
    AgentRunner::new(provider, tools, "scripted-model")
}

#[derive(Default)]
struct Recorder {
    phases: Mutex<Vec<String>>,
    tools: Mutex<Vec<(String, String)>>,
    reasoning: Mutex<Vec<String>>,
    notices: Mutex<Vec<String>>,
}

impl TurnObserver for Recorder {
    fn on_phase(&self, phase: &TurnPhase) {
        self.phases.lock().push(phase.to_string());
    }

    fn on_reasoning(&self, reasoning: &str) {
        self.reasoning.lock().push(reasoning.to_owned());
    }

    fn on_tool_finished(&self, call: &ToolCall, _args: &Value, result: &str) {
        self.tools.lock().push((call.name().to_owned(), result.to_owned()));
    }

    fn on_notice(&self, notice: &str) {
        self.notices.lock().push(notice.to_owned());
    }
}

#[tokio::test]
async fn tool_calls_are_answered_in_order_before_next_request() {
    let workspace = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![
        calls(
            vec![
                ("c1", "write_file", json!({"path": "a.txt", "content": "hi"})),
                ("c2", "read_file", json!({"path": "a.txt"})),
                ("c3", "edit_file", json!({"path": "a.txt", "old_str": "hi", "new_str": "hello"})),
            ],
            500,
        ),
        answer("All done."),
    ]);
    let runner = runner(provider.clone(), &workspace);
    let mut session = ConversationSession::new();
    let recorder = Recorder::default();

    let report = runner
        .run_turn(&mut session, "create a.txt", &recorder)
        .await
        .expect("turn should finish");

    assert_eq!(report.outcome, TurnOutcome::Answered("All done.".to_owned()));
    assert_eq!(report.actions, 3);
    assert_eq!(report.files_touched, vec!["a.txt".to_owned()]);
    assert_eq!(report.usage.api_calls, 2);
    assert_eq!(report.usage.total(), 630);

    let roles: Vec<MessageRole> = session.history.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::Tool,
            MessageRole::Tool,
            MessageRole::Tool,
            MessageRole::Assistant,
        ]
    );
    let ids: Vec<Option<&str>> = session.history[2..5]
        .iter()
        .map(|m| m.tool_call_id.as_deref())
        .collect();
    assert_eq!(ids, vec![Some("c1"), Some("c2"), Some("c3")]);
    assert_eq!(session.history[3].content, "hi");

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].messages.len(), 5);
    assert_eq!(requests[1].temperature, Some(0.0));
    assert_eq!(requests[0].tools.as_ref().map(|t| t.len()), Some(9));
    assert!(requests[0].system_prompt.is_some());

    let phases = recorder.phases.lock().clone();
    assert!(phases.contains(&"writing a.txt".to_owned()));
    assert!(phases.contains(&"waiting for API...".to_owned()));
    assert_eq!(
        std::fs::read_to_string(workspace.path().join("a.txt")).unwrap(),
        "hello"
    );
}

#[tokio::test]
async fn reasoning_is_shown_but_never_stored() {
    let workspace = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![Ok(LLMResponse {
        content: Some("The answer is 4.".to_owned()),
        reasoning: Some("2 + 2 = 4".to_owned()),
        ..LLMResponse::default()
    })]);
    let runner = runner(provider, &workspace);
    let mut session = ConversationSession::new();
    let recorder = Recorder::default();

    runner.run_turn(&mut session, "2+2?", &recorder).await.unwrap();

    assert_eq!(recorder.reasoning.lock().clone(), vec!["2 + 2 = 4".to_owned()]);
    assert!(session.history.iter().all(|m| !m.content.contains("2 + 2 = 4")));
    assert!(recorder.phases.lock().contains(&"thinking deeply...".to_owned()));
}

#[tokio::test]
async fn transport_error_ends_turn_and_keeps_history() {
    let workspace = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![
        calls(vec![("c1", "list_files", json!({}))], 100),
        Err(LLMError::RateLimit { metadata: None }),
    ]);
    let runner = runner(provider, &workspace);
    let mut session = ConversationSession::new();

    let result = runner.run_turn(&mut session, "look around", &NoopObserver).await;

    assert!(matches!(
        result,
        Err(TurnError::Transport(LLMError::RateLimit { .. }))
    ));
    assert_eq!(session.history.len(), 3);
    assert_eq!(session.history[2].content, "(empty directory)");
    assert_eq!(session.usage.api_calls, 1);
}

#[tokio::test]
async fn unknown_tools_and_bad_arguments_are_reported_to_the_model() {
    let workspace = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![
        Ok(LLMResponse {
            tool_calls: Some(vec![
                ToolCall::function("c1", "format_disk", "{}"),
                ToolCall::function("c2", "read_file", "{oops"),
            ]),
            ..LLMResponse::default()
        }),
        answer("Sorry."),
    ]);
    let runner = runner(provider, &workspace);
    let mut session = ConversationSession::new();
    let recorder = Recorder::default();

    runner.run_turn(&mut session, "go", &recorder).await.unwrap();

    let tools = recorder.tools.lock().clone();
    assert_eq!(tools[0].1, "Error: unknown tool 'format_disk'");
    assert!(tools[1].1.starts_with("Error: invalid arguments for read_file:"));
}

#[tokio::test]
async fn round_cap_stops_runaway_loops() {
    let workspace = TempDir::new().unwrap();
    let replies = (0..5)
        .map(|i| calls(vec![(&*format!("c{i}"), "list_background", json!({}))], 10))
        .collect();
    let provider = ScriptedProvider::new(replies);
    let runner = runner(provider.clone(), &workspace).with_max_rounds(3);
    let mut session = ConversationSession::new();
    let recorder = Recorder::default();

    let report = runner.run_turn(&mut session, "loop", &recorder).await.unwrap();

    assert_eq!(report.outcome, TurnOutcome::RoundLimit);
    assert_eq!(report.actions, 3);
    assert_eq!(provider.requests().len(), 3);
    assert_eq!(recorder.notices.lock().len(), 1);
    assert!(session.history.last().unwrap().is_tool_response());
}

#[tokio::test]
async fn large_tool_output_is_capped_before_storage() {
    let workspace = TempDir::new().unwrap();
    let body: Vec<String> = (0..400).map(|i| format!("row {i} {}", "x".repeat(20))).collect();
    std::fs::write(workspace.path().join("big.txt"), body.join("\n")).unwrap();
    let provider = ScriptedProvider::new(vec![
        calls(vec![("c1", "read_file", json!({"path": "big.txt"}))], 10),
        answer("Read it."),
    ]);
    let runner = runner(provider, &workspace);
    let mut session = ConversationSession::new();

    runner.run_turn(&mut session, "read big.txt", &NoopObserver).await.unwrap();

    let stored = &session.history[2].content;
    assert!(stored.contains("... (370 lines omitted) ..."));
    assert_eq!(stored.lines().count(), 31);
}

#[tokio::test]
async fn compaction_then_next_turn_still_calls_tools() {
    let workspace = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![
        calls(vec![("c1", "write_file", json!({"path": "app.py", "content": "print(1)"}))], 50),
        answer("Wrote app.py."),
        answer("Project: a python script app.py printing 1."),
        calls(vec![("c2", "read_file", json!({"path": "app.py"}))], 60),
        answer("It prints 1."),
    ]);
    let runner = runner(provider.clone(), &workspace);
    let mut session = ConversationSession::new();

    runner.run_turn(&mut session, "make app.py", &NoopObserver).await.unwrap();
    runner.compact(&mut session).await.expect("compaction should succeed");

    assert_eq!(session.history.len(), 1);
    assert_eq!(session.history[0].role, MessageRole::System);
    assert_eq!(
        session.history[0].content,
        "[Conversation summary]\nProject: a python script app.py printing 1."
    );

    let report = runner
        .run_turn(&mut session, "what does it print?", &NoopObserver)
        .await
        .unwrap();
    assert_eq!(report.answer(), Some("It prints 1."));
    assert_eq!(session.history[3].tool_call_id.as_deref(), Some("c2"));
    assert_eq!(session.history[3].content, "print(1)");

    let summary_request = &provider.requests()[2];
    assert_eq!(summary_request.max_tokens, Some(500));
    assert!(summary_request.tools.is_none());
}

#[tokio::test]
async fn context_pressure_triggers_automatic_compaction() {
    let workspace = TempDir::new().unwrap();
    let provider = ScriptedProvider::new(vec![
        calls(vec![("c1", "list_files", json!({}))], 9_000),
        answer("Empty workspace."),
        answer("Summary: the workspace is empty."),
        answer("Still empty."),
    ]);
    let runner = runner(provider.clone(), &workspace).with_context_limit(1_000);
    let mut session = ConversationSession::new();
    let recorder = Recorder::default();

    runner.run_turn(&mut session, "look", &NoopObserver).await.unwrap();
    // the last request of that turn reported 100 prompt tokens: 10% of the limit
    assert_eq!(session.usage.last_prompt_tokens, 100);

    session.usage.last_prompt_tokens = 900;
    runner.run_turn(&mut session, "again", &recorder).await.unwrap();

    assert_eq!(recorder.notices.lock().len(), 1);
    assert!(session.history[0].content.starts_with("[Conversation summary]"));
    assert_eq!(session.history[1].content, "again");
    assert_eq!(session.compactor.used(), 1);
}
