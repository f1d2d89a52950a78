use futures::future::BoxFuture;
use serde_json::Value;
use snafu::Snafu;

/// Mime type requested for structured output.
pub const JSON_MIME_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub backend_id: String,
    pub api_key: String,
    pub endpoint: String,
    pub default_model: Option<String>,
}

impl BackendConfig {
    pub fn new(
        backend_id: impl Into<String>,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        default_model: Option<String>,
    ) -> Self {
        Self {
            backend_id: backend_id.into().trim().to_string(),
            api_key: api_key.into().trim().to_string(),
            endpoint: endpoint.into().trim().to_string(),
            default_model: default_model
                .map(|model| model.trim().to_string())
                .filter(|model| !model.is_empty()),
        }
    }
}

/// One structured-output generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model_id: String,
    pub prompt: String,
    pub system_instruction: String,
    pub output_schema: Value,
    pub output_mime_type: String,
    pub temperature: Option<f64>,
}

impl GenerationRequest {
    pub fn new(
        model_id: impl Into<String>,
        prompt: impl Into<String>,
        system_instruction: impl Into<String>,
        output_schema: Value,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            prompt: prompt.into(),
            system_instruction: system_instruction.into(),
            output_schema,
            output_mime_type: JSON_MIME_TYPE.to_string(),
            temperature: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum BackendError {
    #[snafu(display("missing API key for backend '{backend_id}'"))]
    MissingApiKey {
        stage: &'static str,
        backend_id: String,
    },
    #[snafu(display("backend '{backend_id}' is not supported"))]
    UnsupportedBackend {
        stage: &'static str,
        backend_id: String,
    },
    #[snafu(display("http client failed on `{stage}`, {source}"))]
    HttpClient {
        stage: &'static str,
        source: rig::http_client::Error,
    },
    #[snafu(display("generation failed on `{stage}`, {source}"))]
    CompletionsFailed {
        stage: &'static str,
        source: rig::completion::CompletionError,
    },
    #[snafu(display("model '{model_id}' returned no text"))]
    EmptyCompletion {
        stage: &'static str,
        model_id: String,
    },
    #[snafu(display("{message}"))]
    Transport {
        stage: &'static str,
        message: String,
    },
}

/// Outbound seam to a generative-language endpoint.
///
/// Implementations perform exactly one round trip per `generate` call and return
/// the raw text payload, untouched.
pub trait GenerationBackend: Send + Sync {
    fn id(&self) -> &str;
    fn default_model(&self) -> &str;
    fn generate<'a>(&'a self, request: GenerationRequest) -> BoxFuture<'a, BackendResult<String>>;
}
