use tracing::warn;

use crate::api::{ApiError, CompletionClient};
use crate::config::ChatSettings;

/// Shown in place of a reply when a completion request fails.
pub const COMPLETION_FAILURE_NOTICE: &str = "Something went wrong, please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Idle,
    Pending,
    Fulfilled,
    Failed,
}

/// What `begin_submit` decided to do with the current draft.
pub enum SubmitStart {
    /// A request was dispatched; await or spawn the call to resolve it.
    Started(CompletionCall),
    /// The trimmed draft was empty. Ignored without a state change.
    EmptyInput,
    /// A request is already in flight. Rejected without a state change.
    Busy,
}

/// An owned, sendable completion request, detached from the controller so a
/// front end can run it on a background task while the controller stays
/// available for rendering.
pub struct CompletionCall {
    client: CompletionClient,
    model: String,
    prompt: String,
}

impl CompletionCall {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub async fn send(self) -> Result<String, ApiError> {
        self.client.complete(&self.model, &self.prompt).await
    }
}

/// Single-shot text-completion flow: edit a draft, submit it, read the reply
/// (or a failure notice) back out.
///
/// Phases: `Idle -> Pending -> {Fulfilled, Failed}`, re-entrant from either
/// terminal phase. At most one request is in flight per controller;
/// `begin_submit` rejects a second dispatch while one is pending.
pub struct ChatController {
    client: CompletionClient,
    model: String,
    input: String,
    response: String,
    phase: ChatPhase,
    error: Option<ApiError>,
}

impl ChatController {
    pub fn new(settings: ChatSettings) -> Self {
        Self::with_input(settings, String::new())
    }

    /// `seed` pre-fills the draft, for callers that hand off a prompt.
    pub fn with_input(settings: ChatSettings, seed: impl Into<String>) -> Self {
        Self {
            client: CompletionClient::new(&settings.api_key),
            model: settings.model,
            input: seed.into(),
            response: String::new(),
            phase: ChatPhase::Idle,
            error: None,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn response(&self) -> &str {
        &self.response
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase == ChatPhase::Pending
    }

    /// The kind of the most recent failure, if the last request failed.
    pub fn last_error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    /// Replace the draft. No side effects; allowed in any phase.
    pub fn update_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Validate the draft and, if it holds anything, move to `Pending` and
    /// hand back the outbound request. The previous response is cleared so
    /// the display never pairs an old reply with a new prompt.
    pub fn begin_submit(&mut self) -> SubmitStart {
        let prompt = self.input.trim();
        if prompt.is_empty() {
            return SubmitStart::EmptyInput;
        }
        if self.is_pending() {
            return SubmitStart::Busy;
        }

        self.phase = ChatPhase::Pending;
        self.response.clear();
        self.error = None;
        SubmitStart::Started(CompletionCall {
            client: self.client.clone(),
            model: self.model.clone(),
            prompt: prompt.to_string(),
        })
    }

    /// Resolve the in-flight request. Failures are absorbed into display
    /// state, never propagated. Returns the text to show.
    pub fn finish_submit(&mut self, result: Result<String, ApiError>) -> &str {
        match result {
            Ok(content) => {
                self.response = content;
                self.phase = ChatPhase::Fulfilled;
            }
            Err(err) => {
                warn!(error = %err, "completion request failed");
                self.response = COMPLETION_FAILURE_NOTICE.to_string();
                self.error = Some(err);
                self.phase = ChatPhase::Failed;
            }
        }
        &self.response
    }

    /// Submit and wait for the reply in one step. The await on the network
    /// exchange is the only suspension point.
    pub async fn submit(&mut self) {
        if let SubmitStart::Started(call) = self.begin_submit() {
            let result = call.send().await;
            self.finish_submit(result);
        }
    }
}
