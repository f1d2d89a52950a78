use tedai_llm::{AnswerError, FailureKind};

/// Prefix of every user-facing failure message.
pub const FAILURE_PREFIX: &str = "Sorry, I couldn't get a response.";

/// Why a submission was dropped without touching the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreReason {
    EmptyPrompt,
    RequestPending,
}

/// User-facing description of the last failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastError {
    pub kind: FailureKind,
    pub message: String,
}

impl LastError {
    pub fn from_answer_error(error: &AnswerError) -> Self {
        Self {
            kind: error.kind(),
            message: format!("{FAILURE_PREFIX} {error}"),
        }
    }
}

/// In-flight flag and last failure for one controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    pending: bool,
    last_error: Option<LastError>,
}

impl RequestState {
    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn last_error(&self) -> Option<&LastError> {
        self.last_error.as_ref()
    }

    /// Starts a request; at most one may be in flight.
    pub fn begin(&mut self) -> Result<(), IgnoreReason> {
        if self.pending {
            return Err(IgnoreReason::RequestPending);
        }
        self.pending = true;
        self.last_error = None;
        Ok(())
    }

    pub fn succeed(&mut self) {
        self.pending = false;
        self.last_error = None;
    }

    pub fn fail(&mut self, error: &AnswerError) -> LastError {
        let last_error = LastError::from_answer_error(error);
        self.pending = false;
        self.last_error = Some(last_error.clone());
        last_error
    }
}
