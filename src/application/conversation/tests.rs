use super::*;
use crate::application::tooling::{CallToolResult, ToolInvokeError, ToolSession};
use crate::model::{ChatClient, ModelError, ModelResponse};
use crate::types::{AssistantMessage, ChatMessage, Tool, ToolCall, ToolSpec};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::VecDeque;
use std::future::{pending, ready};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::BufReader;
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct CompletionCall {
    messages: Vec<ChatMessage>,
    tools: Vec<ToolSpec>,
}

#[derive(Clone)]
struct ScriptedClient {
    responses: Arc<Mutex<VecDeque<Result<ModelResponse, ModelError>>>>,
    recordings: Arc<Mutex<Vec<CompletionCall>>>,
}

impl ScriptedClient {
    fn new(responses: Vec<Result<ModelResponse, ModelError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            recordings: Arc::new(Mutex::new(Vec::new())),
        }
    }

    async fn calls(&self) -> Vec<CompletionCall> {
        self.recordings.lock().await.clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ModelResponse, ModelError> {
        self.recordings.lock().await.push(CompletionCall {
            messages: messages.to_vec(),
            tools: tools.to_vec(),
        });
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::api(None, "script exhausted")))
    }
}

#[derive(Clone)]
struct RecordingSession {
    tools: Vec<Tool>,
    results: Arc<Mutex<VecDeque<Result<CallToolResult, ToolInvokeError>>>>,
    calls: Arc<Mutex<Vec<(String, Map<String, Value>)>>>,
    list_calls: Arc<AtomicUsize>,
}

impl RecordingSession {
    fn new(results: Vec<Result<CallToolResult, ToolInvokeError>>) -> Self {
        Self {
            tools: vec![test_tool()],
            results: Arc::new(Mutex::new(results.into())),
            calls: Arc::new(Mutex::new(Vec::new())),
            list_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    async fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.lock().await.clone()
    }

    fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolSession for RecordingSession {
    async fn list_tools(&self) -> Result<Vec<Tool>, ToolInvokeError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<CallToolResult, ToolInvokeError> {
        self.calls.lock().await.push((name.to_string(), arguments));
        self.results
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(CallToolResult::text("default result")))
    }
}

fn test_tool() -> Tool {
    Tool::new(
        "test_tool",
        "A test tool",
        json!({"type": "object", "properties": {}}),
    )
}

fn tool_call(arguments: &str) -> ModelResponse {
    ModelResponse::tool_calls(vec![ToolCall::new("call_123", "test_tool", arguments)])
}

fn rpc_error(message: &str) -> ToolInvokeError {
    ToolInvokeError::Rpc {
        server: "stub".into(),
        code: -32603,
        message: message.into(),
    }
}

async fn bootstrap(
    client: &ScriptedClient,
    session: &RecordingSession,
    options: ConversationOptions,
) -> Conversation<ScriptedClient, RecordingSession> {
    Conversation::bootstrap(client.clone(), session.clone(), options)
        .await
        .expect("bootstrap succeeds")
}

/// Feed `input` to a fresh loop and return everything it printed.
async fn run_with_input(
    client: &ScriptedClient,
    session: &RecordingSession,
    options: ConversationOptions,
    input: &str,
) -> (String, Conversation<ScriptedClient, RecordingSession>) {
    let mut conversation = bootstrap(client, session, options).await;
    let mut output = Vec::new();
    conversation
        .run(BufReader::new(input.as_bytes()), &mut output, pending::<()>())
        .await
        .expect("loop completes");
    (String::from_utf8(output).expect("utf8 output"), conversation)
}

fn has_line(output: &str, expected: &str) -> bool {
    output.lines().any(|line| line == expected)
}

#[tokio::test]
async fn fetches_tools_once_and_exits_on_immediate_end_of_input() {
    let client = ScriptedClient::new(Vec::new());
    let session = RecordingSession::new(Vec::new());

    let (output, conversation) =
        run_with_input(&client, &session, ConversationOptions::default(), "").await;

    assert_eq!(session.list_count(), 1);
    assert!(client.calls().await.is_empty());
    assert!(session.calls().await.is_empty());
    assert_eq!(conversation.registry().len(), 1);
    assert_eq!(conversation.state().phase(), TurnPhase::Shutdown);
    assert!(!output.contains(ERROR_PREFIX));
    assert!(output.ends_with("Prompt: "));
}

#[tokio::test]
async fn dispatches_single_tool_call_and_prints_follow_up() {
    let client = ScriptedClient::new(vec![
        Ok(tool_call(r#"{"param": "value"}"#)),
        Ok(ModelResponse::text("Final response")),
    ]);
    let session = RecordingSession::new(vec![Ok(CallToolResult {
        content: vec![Value::String("Tool executed successfully".into())],
        ..Default::default()
    })]);

    let (output, conversation) = run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "test prompt\n",
    )
    .await;

    let calls = session.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "test_tool");
    assert_eq!(Value::Object(calls[0].1.clone()), json!({"param": "value"}));
    assert!(has_line(&output, "Final response"));

    let completions = client.calls().await;
    assert_eq!(completions.len(), 2);
    assert_eq!(completions[0].tools[0].name, "test_tool");
    assert_eq!(completions[1].tools.len(), 1);

    let follow_up = &completions[1].messages;
    assert_eq!(follow_up[0], ChatMessage::user("test prompt"));
    assert!(matches!(
        &follow_up[1],
        ChatMessage::Assistant(AssistantMessage::ToolCalls { calls, .. }) if calls[0].id == "call_123"
    ));
    assert_eq!(
        follow_up[2],
        ChatMessage::Tool {
            tool_call_id: "call_123".into(),
            content: "Tool executed successfully".into(),
        }
    );

    assert_eq!(session.list_count(), 1);
    assert_eq!(conversation.history().len(), 4);
    assert_eq!(
        conversation.history()[3],
        ChatMessage::assistant(AssistantMessage::Text("Final response".into()))
    );
}

#[tokio::test]
async fn direct_answer_never_touches_the_session() {
    let client = ScriptedClient::new(vec![Ok(ModelResponse::text("Direct response"))]);
    let session = RecordingSession::new(Vec::new());

    let (output, _) = run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "test prompt\n",
    )
    .await;

    assert!(session.calls().await.is_empty());
    assert_eq!(client.calls().await.len(), 1);
    assert!(has_line(&output, "Direct response"));
}

#[tokio::test]
async fn completion_failure_is_reported_and_loop_continues() {
    let client = ScriptedClient::new(vec![
        Err(ModelError::api(None, "API Error")),
        Ok(ModelResponse::text("recovered")),
    ]);
    let session = RecordingSession::new(Vec::new());

    let (output, conversation) = run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "test prompt\nsecond prompt\n",
    )
    .await;

    assert!(has_line(&output, "An error occurred: API Error"));
    assert!(has_line(&output, "recovered"));
    assert_eq!(client.calls().await.len(), 2);
    assert_eq!(conversation.state().phase(), TurnPhase::Shutdown);
}

#[tokio::test]
async fn failed_turn_is_rolled_back_from_history() {
    let client = ScriptedClient::new(vec![
        Err(ModelError::api(Some(500), "API Error")),
        Ok(ModelResponse::text("second answer")),
    ]);
    let session = RecordingSession::new(Vec::new());

    let (_, conversation) = run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "first\nsecond\n",
    )
    .await;

    let completions = client.calls().await;
    assert_eq!(completions[1].messages, [ChatMessage::user("second")]);
    assert_eq!(
        conversation.history(),
        [
            ChatMessage::user("second"),
            ChatMessage::assistant(AssistantMessage::Text("second answer".into())),
        ]
    );
}

#[tokio::test]
async fn shutdown_signal_at_input_wait_skips_pending_input() {
    let client = ScriptedClient::new(vec![Ok(ModelResponse::text("never"))]);
    let session = RecordingSession::new(Vec::new());
    let mut conversation = bootstrap(&client, &session, ConversationOptions::default()).await;

    let mut output = Vec::new();
    conversation
        .run(BufReader::new(&b"test prompt\n"[..]), &mut output, ready(()))
        .await
        .expect("loop completes");

    assert!(client.calls().await.is_empty());
    assert!(session.calls().await.is_empty());
    assert_eq!(conversation.state().phase(), TurnPhase::Shutdown);
}

#[tokio::test]
async fn follow_up_is_final_even_when_it_requests_tools() {
    let client = ScriptedClient::new(vec![
        Ok(tool_call("{}")),
        Ok(ModelResponse::new(
            AssistantMessage::from_parts(
                Some("Final response".into()),
                vec![ToolCall::new("call_456", "test_tool", "{}")],
            ),
            Some("tool_calls".into()),
        )),
    ]);
    let session = RecordingSession::new(Vec::new());

    let (output, conversation) = run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "test prompt\n",
    )
    .await;

    assert_eq!(session.calls().await.len(), 1);
    assert_eq!(client.calls().await.len(), 2);
    assert!(has_line(&output, "Final response"));
    assert!(!output.contains(ERROR_PREFIX));
    assert_eq!(conversation.history().len(), 4);
    assert_eq!(
        conversation.history()[3],
        ChatMessage::assistant(AssistantMessage::Text("Final response".into()))
    );
}

#[tokio::test]
async fn follow_up_without_content_prints_empty_response() {
    let client = ScriptedClient::new(vec![Ok(tool_call("{}")), Ok(tool_call("{}"))]);
    let session = RecordingSession::new(Vec::new());

    let (output, _) = run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "test prompt\n",
    )
    .await;

    assert_eq!(session.calls().await.len(), 1);
    assert!(has_line(&output, "(empty response)"));
    assert!(!output.contains(ERROR_PREFIX));
}

#[tokio::test]
async fn configured_rounds_allow_chained_tool_calls() {
    let client = ScriptedClient::new(vec![
        Ok(tool_call(r#"{"step": 1}"#)),
        Ok(tool_call(r#"{"step": 2}"#)),
        Ok(ModelResponse::text("chained answer")),
    ]);
    let session = RecordingSession::new(Vec::new());

    let (output, _) = run_with_input(
        &client,
        &session,
        ConversationOptions::default().with_max_tool_rounds(2),
        "test prompt\n",
    )
    .await;

    let calls = session.calls().await;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].1.get("step"), Some(&json!(2)));
    assert!(has_line(&output, "chained answer"));
}

#[tokio::test]
async fn multiple_calls_in_one_response_run_in_order() {
    let client = ScriptedClient::new(vec![
        Ok(ModelResponse::tool_calls(vec![
            ToolCall::new("a", "test_tool", r#"{"n": 1}"#),
            ToolCall::new("b", "test_tool", r#"{"n": 2}"#),
        ])),
        Ok(ModelResponse::text("both done")),
    ]);
    let session = RecordingSession::new(vec![
        Ok(CallToolResult::text("one")),
        Ok(CallToolResult::text("two")),
    ]);

    let (output, _) = run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "go\n",
    )
    .await;

    let order: Vec<Value> = session
        .calls()
        .await
        .into_iter()
        .map(|(_, args)| args["n"].clone())
        .collect();
    assert_eq!(order, [json!(1), json!(2)]);

    let follow_up = &client.calls().await[1].messages;
    assert_eq!(
        follow_up[2],
        ChatMessage::Tool {
            tool_call_id: "a".into(),
            content: "one".into()
        }
    );
    assert_eq!(
        follow_up[3],
        ChatMessage::Tool {
            tool_call_id: "b".into(),
            content: "two".into()
        }
    );
    assert!(has_line(&output, "both done"));
}

#[tokio::test]
async fn malformed_arguments_fail_the_turn_without_dispatch() {
    let client = ScriptedClient::new(vec![Ok(tool_call("{not json"))]);
    let session = RecordingSession::new(Vec::new());

    let (output, _) = run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "test prompt\n",
    )
    .await;

    assert!(session.calls().await.is_empty());
    assert!(
        output
            .lines()
            .any(|line| line
                .starts_with("An error occurred: tool 'test_tool' received malformed arguments"))
    );
}

#[tokio::test]
async fn non_object_arguments_are_malformed() {
    let client = ScriptedClient::new(vec![Ok(tool_call("[1, 2]"))]);
    let session = RecordingSession::new(Vec::new());

    let (output, _) = run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "test prompt\n",
    )
    .await;

    assert!(session.calls().await.is_empty());
    assert!(has_line(
        &output,
        "An error occurred: tool 'test_tool' received malformed arguments: expected a JSON object, got an array"
    ));
}

#[tokio::test]
async fn blank_arguments_dispatch_with_empty_mapping() {
    let client = ScriptedClient::new(vec![
        Ok(tool_call("")),
        Ok(ModelResponse::text("ok")),
    ]);
    let session = RecordingSession::new(Vec::new());

    run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "test prompt\n",
    )
    .await;

    let calls = session.calls().await;
    assert_eq!(calls.len(), 1);
    assert!(calls[0].1.is_empty());
}

#[tokio::test]
async fn unknown_tool_fails_the_turn() {
    let client = ScriptedClient::new(vec![Ok(ModelResponse::tool_calls(vec![ToolCall::new(
        "call_1", "ghost", "{}",
    )]))]);
    let session = RecordingSession::new(Vec::new());

    let (output, _) = run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "test prompt\n",
    )
    .await;

    assert!(session.calls().await.is_empty());
    assert!(has_line(
        &output,
        "An error occurred: model requested unknown tool 'ghost'"
    ));
}

#[tokio::test]
async fn tool_failure_is_reported_and_next_turn_still_runs() {
    let client = ScriptedClient::new(vec![
        Ok(tool_call("{}")),
        Ok(ModelResponse::text("after failure")),
    ]);
    let session = RecordingSession::new(vec![Err(rpc_error("boom"))]);

    let (output, _) = run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "first\nsecond\n",
    )
    .await;

    assert!(has_line(
        &output,
        "An error occurred: MCP server 'stub' returned JSON-RPC error -32603: boom"
    ));
    assert!(has_line(&output, "after failure"));
}

#[tokio::test]
async fn system_prompt_leads_every_request() {
    let client = ScriptedClient::new(vec![Ok(ModelResponse::text("hi"))]);
    let session = RecordingSession::new(Vec::new());

    run_with_input(
        &client,
        &session,
        ConversationOptions::default().with_system_prompt("Be terse."),
        "hello\n",
    )
    .await;

    let completions = client.calls().await;
    assert_eq!(completions[0].messages[0], ChatMessage::system("Be terse."));
    assert_eq!(completions[0].messages[1], ChatMessage::user("hello"));
}

#[tokio::test]
async fn blank_lines_are_ignored() {
    let client = ScriptedClient::new(Vec::new());
    let session = RecordingSession::new(Vec::new());

    let (output, _) = run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "\n   \n",
    )
    .await;

    assert!(client.calls().await.is_empty());
    assert!(!output.contains(ERROR_PREFIX));
}

#[tokio::test]
async fn commands_are_handled_locally() {
    let client = ScriptedClient::new(vec![
        Ok(ModelResponse::text("first answer")),
        Ok(ModelResponse::text("second answer")),
    ]);
    let session = RecordingSession::new(Vec::new());

    let (output, conversation) = run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "/tools\nfirst\n/reset\nsecond\n/exit\nnever sent\n",
    )
    .await;

    assert!(has_line(&output, "  - test_tool: A test tool"));
    assert!(has_line(&output, "Conversation history cleared."));

    let completions = client.calls().await;
    assert_eq!(completions.len(), 2);
    assert_eq!(completions[1].messages, [ChatMessage::user("second")]);
    assert_eq!(conversation.history().len(), 2);
    assert_eq!(conversation.state().phase(), TurnPhase::Shutdown);
}

#[tokio::test]
async fn unknown_command_is_not_sent_to_model() {
    let client = ScriptedClient::new(Vec::new());
    let session = RecordingSession::new(Vec::new());

    let (output, _) = run_with_input(
        &client,
        &session,
        ConversationOptions::default(),
        "/frobnicate\n",
    )
    .await;

    assert!(client.calls().await.is_empty());
    assert!(has_line(
        &output,
        "Unknown command '/frobnicate'. Use /help to list commands."
    ));
}

#[tokio::test]
async fn bootstrap_propagates_listing_failure() {
    struct BrokenSession;

    #[async_trait]
    impl ToolSession for BrokenSession {
        async fn list_tools(&self) -> Result<Vec<Tool>, ToolInvokeError> {
            Err(ToolInvokeError::Terminated {
                server: "broken".into(),
            })
        }

        async fn call_tool(
            &self,
            _name: &str,
            _arguments: Map<String, Value>,
        ) -> Result<CallToolResult, ToolInvokeError> {
            unreachable!("never dispatched")
        }
    }

    let client = ScriptedClient::new(Vec::new());
    let result =
        Conversation::bootstrap(client.clone(), BrokenSession, ConversationOptions::default())
            .await;

    assert!(matches!(result, Err(ToolInvokeError::Terminated { .. })));
    assert!(client.calls().await.is_empty());
}
