use tracing::{debug, info, warn};

use crate::errors::{GuidanceError, GuidanceResult};
use crate::guidance::{GuidanceClient, GuidanceResponse};
use crate::history::{Conversation, Turn};
use crate::request::{validate_input, RequestAssembler};

/// How the most recent submission ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed(GuidanceError),
}

/// One multi-turn guidance conversation.
///
/// The session owns its [`Conversation`]. `submit` takes `&mut self`: while a
/// request is in flight the session stays borrowed, so at most one request runs
/// and turns are always appended in order. Once `submit` returns the session is
/// idle again and [`GuidanceSession::last_outcome`] says how the call ended.
///
/// The user turn and the assistant turn are appended together, and only after
/// the call succeeds. A failed or abandoned call leaves the history exactly as
/// it was.
pub struct GuidanceSession<C> {
    client: C,
    assembler: RequestAssembler,
    conversation: Conversation,
    last_outcome: Option<Outcome>,
}

impl<C: GuidanceClient> GuidanceSession<C> {
    pub fn new(client: C, assembler: RequestAssembler) -> Self {
        Self {
            client,
            assembler,
            conversation: Conversation::new(),
            last_outcome: None,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// Starts over with an empty conversation.
    pub fn reset(&mut self) {
        self.conversation.clear();
        self.last_outcome = None;
    }

    /// Sends `input` with the current history and records the answer.
    ///
    /// Blank input is rejected before anything is sent and does not change the
    /// last outcome.
    pub async fn submit(&mut self, input: &str) -> GuidanceResult<GuidanceResponse> {
        validate_input("input", input)?;

        let request = self.assembler.assemble(self.conversation.snapshot(), input)?;
        debug!(
            history_len = request.history().len(),
            input_len = input.len(),
            "Sending guidance request"
        );

        let result = self.client.generate(&request).await;

        match result {
            Ok(response) => {
                self.conversation.append(Turn::user(input));
                self.conversation.append(Turn::assistant(response.advice.clone()));
                self.last_outcome = Some(Outcome::Succeeded);
                info!(turns = self.conversation.len(), "Guidance received");
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "Guidance request failed");
                self.last_outcome = Some(Outcome::Failed(e.clone()));
                Err(e)
            }
        }
    }
}
