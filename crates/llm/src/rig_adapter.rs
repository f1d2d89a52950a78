use futures::FutureExt;
use futures::future::BoxFuture;
use rig::completion::message::AssistantContent;
use rig::completion::{CompletionModel, Message as RigMessage};
use rig::prelude::CompletionClient;
use rig::providers::gemini;
use serde_json::{Value, json};
use snafu::{ResultExt, ensure};

use super::backend::{
    BackendConfig, BackendResult, CompletionsFailedSnafu, EmptyCompletionSnafu, GenerationBackend,
    GenerationRequest, HttpClientSnafu, MissingApiKeySnafu,
};
use super::model::DEFAULT_GEMINI_MODEL;

pub const RIG_GEMINI_BACKEND_ID: &str = "gemini";

/// Gemini `generateContent` over rig's provider client.
pub struct RigGeminiBackend {
    config: BackendConfig,
    default_model: String,
}

impl RigGeminiBackend {
    pub fn new(config: BackendConfig) -> BackendResult<Self> {
        ensure!(
            !config.api_key.is_empty(),
            MissingApiKeySnafu {
                stage: "rig-gemini-new",
                backend_id: config.backend_id.clone(),
            }
        );

        let default_model = config
            .default_model
            .clone()
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        Ok(Self {
            config,
            default_model,
        })
    }

    fn build_client(config: &BackendConfig) -> BackendResult<gemini::Client> {
        let mut builder = gemini::Client::builder().api_key(config.api_key.as_str());
        if !config.endpoint.is_empty() {
            builder = builder.base_url(config.endpoint.as_str());
        }
        builder.build().context(HttpClientSnafu {
            stage: "build-client",
        })
    }

    /// Gemini reads structured-output settings from `generationConfig`.
    fn generation_params(request: &GenerationRequest) -> Value {
        json!({
            "generationConfig": {
                "responseMimeType": request.output_mime_type,
                "responseSchema": request.output_schema,
            }
        })
    }

    fn collect_text(content: impl IntoIterator<Item = AssistantContent>) -> String {
        content
            .into_iter()
            .filter_map(|part| match part {
                AssistantContent::Text(text) => Some(text.text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    async fn run_generation(&self, request: GenerationRequest) -> BackendResult<String> {
        let client = Self::build_client(&self.config)?;
        let model = client.completion_model(request.model_id.clone());

        let mut builder = model
            .completion_request(RigMessage::user(request.prompt.clone()))
            .preamble(request.system_instruction.clone())
            .additional_params(Self::generation_params(&request));

        if let Some(temperature) = request.temperature {
            builder = builder.temperature(temperature);
        }

        tracing::debug!(
            backend_id = %self.config.backend_id,
            model_id = %request.model_id,
            prompt_len = request.prompt.len(),
            "sending generation request"
        );

        let response = builder.send().await.context(CompletionsFailedSnafu {
            stage: "send-generation",
        })?;

        let text = Self::collect_text(response.choice);
        ensure!(
            !text.trim().is_empty(),
            EmptyCompletionSnafu {
                stage: "collect-generation-text",
                model_id: request.model_id,
            }
        );

        Ok(text)
    }
}

impl GenerationBackend for RigGeminiBackend {
    fn id(&self) -> &str {
        &self.config.backend_id
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn generate<'a>(&'a self, request: GenerationRequest) -> BoxFuture<'a, BackendResult<String>> {
        self.run_generation(request).boxed()
    }
}
