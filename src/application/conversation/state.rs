use crate::types::ChatMessage;
use tracing::debug;

/// Where the loop is within a turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TurnPhase {
    #[default]
    AwaitingInput,
    RequestSent,
    ToolDispatch,
    FinalAnswer,
    /// Terminal; no transition leaves it.
    Shutdown,
}

impl TurnPhase {
    pub fn can_transition_to(self, next: TurnPhase) -> bool {
        use TurnPhase::*;
        matches!(
            (self, next),
            (AwaitingInput, RequestSent)
                | (AwaitingInput, Shutdown)
                | (RequestSent, ToolDispatch)
                | (RequestSent, FinalAnswer)
                | (RequestSent, AwaitingInput)
                | (ToolDispatch, RequestSent)
                | (ToolDispatch, AwaitingInput)
                | (FinalAnswer, AwaitingInput)
        )
    }
}

/// History plus phase, owned by exactly one conversation loop.
#[derive(Debug, Default)]
pub struct ConversationState {
    history: Vec<ChatMessage>,
    phase: TurnPhase,
}

impl ConversationState {
    pub fn new(system_prompt: Option<String>) -> Self {
        let history = system_prompt
            .map(|prompt| vec![ChatMessage::system(prompt)])
            .unwrap_or_default();
        Self {
            history,
            phase: TurnPhase::AwaitingInput,
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.history.push(message);
    }

    pub fn transition(&mut self, next: TurnPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal turn transition {:?} -> {:?}",
            self.phase,
            next
        );
        debug!(from = ?self.phase, to = ?next, "Turn phase transition");
        self.phase = next;
    }

    /// Marks the history length before a turn starts.
    pub fn checkpoint(&self) -> usize {
        self.history.len()
    }

    /// Drops everything a failed turn appended.
    pub fn rollback(&mut self, checkpoint: usize) {
        self.history.truncate(checkpoint);
    }

    /// Forget the conversation, keeping the system prompt if there is one.
    pub fn reset(&mut self) {
        self.history
            .retain(|message| matches!(message, ChatMessage::System { .. }));
    }
}
