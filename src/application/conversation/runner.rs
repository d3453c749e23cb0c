use super::errors::{ConversationError, TurnError};
use super::state::{ConversationState, TurnPhase};
use crate::application::tooling::{ToolInvokeError, ToolRegistry, ToolSession};
use crate::constants::DEFAULT_MAX_TOOL_ROUNDS;
use crate::model::ChatClient;
use crate::types::{AssistantMessage, ChatMessage, ToolCall, ToolResult};
use serde_json::{Map, Value};
use std::future::Future;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

/// Prefix of the line written when a turn fails.
pub const ERROR_PREFIX: &str = "An error occurred: ";

#[derive(Debug, Clone)]
pub struct ConversationOptions {
    pub system_prompt: Option<String>,
    /// How many times one turn may dispatch tool calls before the follow-up
    /// answer must be final.
    pub max_tool_rounds: u32,
}

impl Default for ConversationOptions {
    fn default() -> Self {
        Self {
            system_prompt: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

impl ConversationOptions {
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds.max(1);
        self
    }
}

enum LoopControl {
    Continue,
    Exit,
}

/// Sequential read-complete-dispatch loop over one chat client and one tool
/// session.
pub struct Conversation<C: ChatClient, S: ToolSession> {
    client: C,
    session: S,
    registry: ToolRegistry,
    state: ConversationState,
    options: ConversationOptions,
}

impl<C: ChatClient, S: ToolSession> Conversation<C, S> {
    /// Fetch the tool catalogue (exactly once) and build the loop around it.
    pub async fn bootstrap(
        client: C,
        session: S,
        options: ConversationOptions,
    ) -> Result<Self, ToolInvokeError> {
        let tools = session.list_tools().await?;
        info!(count = tools.len(), "Fetched tool catalogue");
        Ok(Self::new(client, session, ToolRegistry::new(tools), options))
    }

    pub fn new(
        client: C,
        session: S,
        registry: ToolRegistry,
        options: ConversationOptions,
    ) -> Self {
        let state = ConversationState::new(options.system_prompt.clone());
        Self {
            client,
            session,
            registry,
            state,
            options,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn history(&self) -> &[ChatMessage] {
        self.state.history()
    }

    /// Run until end of input, `/exit`, or `shutdown` resolves while waiting
    /// for input. Turn failures are reported on `output` and do not end the
    /// loop; only I/O errors on the conversation's own streams do.
    pub async fn run<R, W, F>(
        &mut self,
        input: R,
        output: &mut W,
        shutdown: F,
    ) -> Result<(), ConversationError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        F: Future<Output = ()>,
    {
        let mut lines = input.lines();
        tokio::pin!(shutdown);

        print_banner(output, self.registry.len()).await?;

        loop {
            prompt(output).await?;
            let next = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("Shutdown signal received while awaiting input");
                    None
                }
                line = lines.next_line() => line?,
            };

            let Some(line) = next else {
                debug!("End of input");
                break;
            };

            let input = line.trim();
            if input.is_empty() {
                continue;
            }

            if input.starts_with('/') {
                match self.handle_command(input, output).await? {
                    LoopControl::Continue => continue,
                    LoopControl::Exit => break,
                }
            }

            self.handle_turn(input.to_string(), output).await?;
        }

        self.state.transition(TurnPhase::Shutdown);
        output.flush().await?;
        info!("Conversation loop stopped");
        Ok(())
    }

    /// The single error boundary around one turn.
    async fn handle_turn<W>(&mut self, prompt: String, output: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let checkpoint = self.state.checkpoint();
        match self.process_turn(prompt).await {
            Ok(answer) => {
                write_line(output, "").await?;
                write_line(output, "Assistant:").await?;
                if answer.trim().is_empty() {
                    write_line(output, "(empty response)").await?;
                } else {
                    write_line(output, &answer).await?;
                }
            }
            Err(err) => {
                error!(%err, "Turn failed");
                self.state.rollback(checkpoint);
                write_line(output, "").await?;
                write_line(output, &format!("{ERROR_PREFIX}{err}")).await?;
            }
        }
        self.state.transition(TurnPhase::AwaitingInput);
        output.flush().await
    }

    async fn process_turn(&mut self, prompt: String) -> Result<String, TurnError> {
        self.state.push(ChatMessage::user(prompt));
        let mut rounds = 0u32;

        loop {
            self.state.transition(TurnPhase::RequestSent);
            let response = self
                .client
                .complete(self.state.history(), self.registry.specs())
                .await?;
            debug!(
                client = self.client.id(),
                finish_reason = ?response.finish_reason,
                tool_calls = response.message.tool_calls().len(),
                "Received completion"
            );

            let message = match response.message {
                AssistantMessage::Text(text) => {
                    self.state.transition(TurnPhase::FinalAnswer);
                    self.state
                        .push(ChatMessage::assistant(AssistantMessage::Text(text.clone())));
                    return Ok(text);
                }
                message => message,
            };

            // Past the limit the follow-up's text is the answer; its calls are dropped.
            if rounds >= self.options.max_tool_rounds {
                warn!(
                    limit = self.options.max_tool_rounds,
                    ignored_calls = message.tool_calls().len(),
                    "Tool round limit reached; using follow-up content as the answer"
                );
                let text = message.text().unwrap_or_default().to_string();
                self.state.transition(TurnPhase::FinalAnswer);
                self.state
                    .push(ChatMessage::assistant(AssistantMessage::Text(text.clone())));
                return Ok(text);
            }
            rounds += 1;

            self.state.transition(TurnPhase::ToolDispatch);
            let calls = message.tool_calls().to_vec();
            self.state.push(ChatMessage::assistant(message));
            for call in &calls {
                let result = self.dispatch(call).await?;
                self.state.push(ChatMessage::tool_result(result));
            }
        }
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<ToolResult, TurnError> {
        let arguments = parse_arguments(call)?;
        if !self.registry.contains(&call.name) {
            return Err(TurnError::UnknownTool(call.name.clone()));
        }

        info!(tool = %call.name, call_id = %call.id, "Invoking tool");
        let result = self.session.call_tool(&call.name, arguments).await?;
        if result.is_error {
            warn!(tool = %call.name, "Tool reported an error result");
        }

        Ok(ToolResult {
            call_id: call.id.clone(),
            content: result.to_text(),
        })
    }

    async fn handle_command<W>(&mut self, input: &str, output: &mut W) -> io::Result<LoopControl>
    where
        W: AsyncWrite + Unpin,
    {
        let name = input
            .trim_start_matches('/')
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        debug!(command = %name, "Processing command");

        match name.as_str() {
            "exit" | "quit" | "q" => Ok(LoopControl::Exit),
            "help" | "?" => {
                print_help(output).await?;
                Ok(LoopControl::Continue)
            }
            "tools" => {
                print_tools(output, &self.registry).await?;
                Ok(LoopControl::Continue)
            }
            "reset" | "clear" => {
                self.state.reset();
                write_line(output, "").await?;
                write_line(output, "Conversation history cleared.").await?;
                Ok(LoopControl::Continue)
            }
            other => {
                write_line(output, "").await?;
                write_line(
                    output,
                    &format!("Unknown command '/{other}'. Use /help to list commands."),
                )
                .await?;
                Ok(LoopControl::Continue)
            }
        }
    }
}

/// Parse a tool call's argument text into the mapping the session expects.
/// Blank text and `null` mean "no arguments".
pub(crate) fn parse_arguments(call: &ToolCall) -> Result<Map<String, Value>, TurnError> {
    let raw = call.arguments.trim();
    if raw.is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(other) => Err(TurnError::MalformedArguments {
            tool: call.name.clone(),
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
        Err(err) => Err(TurnError::MalformedArguments {
            tool: call.name.clone(),
            reason: err.to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

async fn print_banner<W: AsyncWrite + Unpin>(output: &mut W, tool_count: usize) -> io::Result<()> {
    write_line(
        output,
        &format!("Connected. {tool_count} tool(s) available."),
    )
    .await?;
    write_line(
        output,
        "Type a message and press Enter. Use /help for commands, Ctrl-C or Ctrl-D to quit.",
    )
    .await
}

async fn print_help<W: AsyncWrite + Unpin>(output: &mut W) -> io::Result<()> {
    write_line(output, "\nAvailable commands:").await?;
    write_line(output, "  /help      Show this help").await?;
    write_line(output, "  /tools     List the tools offered to the model").await?;
    write_line(output, "  /reset     Clear the conversation history").await?;
    write_line(output, "  /exit      Quit").await
}

async fn print_tools<W: AsyncWrite + Unpin>(output: &mut W, registry: &ToolRegistry) -> io::Result<()> {
    if registry.is_empty() {
        return write_line(output, "No tools available.").await;
    }
    write_line(output, "\nTools:").await?;
    for spec in registry.specs() {
        let line = match &spec.description {
            Some(description) => format!("  - {}: {}", spec.name, description),
            None => format!("  - {}", spec.name),
        };
        write_line(output, &line).await?;
    }
    Ok(())
}

async fn prompt<W: AsyncWrite + Unpin>(output: &mut W) -> io::Result<()> {
    output.write_all(b"\nPrompt: ").await?;
    output.flush().await
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> io::Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    Ok(())
}
