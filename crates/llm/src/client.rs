use std::sync::Arc;

use snafu::{ResultExt, Snafu};

use super::backend::{BackendError, GenerationBackend, GenerationRequest};
use super::fence::strip_code_fence;
use super::schema::{ContractError, StructuredAnswer, response_schema, validate};

/// Fixed persona sent as the system instruction with every prompt.
pub const PERSONA_INSTRUCTION: &str = "You are ted.ai, a helpful AI assistant for university students. \
Your persona is like a friendly, knowledgeable librarian. Your goal is to help students learn and \
understand topics better, not to do their work for them. For the user's prompt, provide a clear, \
helpful answer formatted in Markdown. Also, find up to 3 relevant educational YouTube videos and \
provide one multiple-choice quiz question with 4 options and the correct answer to help them test \
their knowledge. Stay away from plagiarism and cite reliable sources implicitly through your \
expert-level answers.";

/// Diagnostic class of a failed answer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Upstream,
    Malformed,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AnswerError {
    #[snafu(display("Failed to get a valid response from AI: {source}"))]
    Upstream {
        stage: &'static str,
        source: BackendError,
    },
    #[snafu(display("Failed to get a valid response from AI: {source}"))]
    MalformedResponse {
        stage: &'static str,
        source: ContractError,
    },
}

impl AnswerError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Upstream { .. } => FailureKind::Upstream,
            Self::MalformedResponse { .. } => FailureKind::Malformed,
        }
    }
}

pub type AnswerResult<T> = Result<T, AnswerError>;

/// Turns a prompt into a validated [`StructuredAnswer`].
///
/// Every call is one fresh round trip; nothing is cached or retried.
#[derive(Clone)]
pub struct AnswerClient {
    backend: Arc<dyn GenerationBackend>,
    model_id: String,
    temperature: Option<f64>,
}

impl AnswerClient {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        let model_id = backend.default_model().to_string();
        Self {
            backend,
            model_id,
            temperature: None,
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        let model_id = model_id.into();
        if !model_id.trim().is_empty() {
            self.model_id = model_id.trim().to_string();
        }
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn backend_id(&self) -> &str {
        self.backend.id()
    }

    pub fn build_request(&self, prompt: &str) -> GenerationRequest {
        let request = GenerationRequest::new(
            self.model_id.clone(),
            prompt,
            PERSONA_INSTRUCTION,
            response_schema(),
        );
        match self.temperature {
            Some(temperature) => request.with_temperature(temperature),
            None => request,
        }
    }

    /// The caller guarantees `prompt` is non-blank.
    pub async fn request_answer(&self, prompt: &str) -> AnswerResult<StructuredAnswer> {
        let request = self.build_request(prompt);

        let raw = match self.backend.generate(request).await {
            Ok(raw) => raw,
            Err(error) => {
                tracing::error!(
                    backend_id = %self.backend.id(),
                    model_id = %self.model_id,
                    error = %error,
                    "generation endpoint call failed"
                );
                return Err(error).context(UpstreamSnafu {
                    stage: "generate-answer",
                });
            }
        };

        parse_answer(&raw).inspect_err(|error| {
            tracing::warn!(
                backend_id = %self.backend.id(),
                model_id = %self.model_id,
                raw_len = raw.len(),
                error = %error,
                "model response failed contract validation"
            );
        })
    }
}

/// Strips incidental fences from `raw` and validates it against the contract.
pub fn parse_answer(raw: &str) -> AnswerResult<StructuredAnswer> {
    validate(strip_code_fence(raw)).context(MalformedResponseSnafu {
        stage: "validate-answer",
    })
}
