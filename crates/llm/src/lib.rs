#![deny(unsafe_code)]

//! Structured-answer pipeline against a generative-language endpoint.

use std::sync::Arc;

mod backend;
mod client;
mod fence;
mod model;
mod rig_adapter;
mod schema;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use backend::{
    BackendConfig, BackendError, BackendResult, GenerationBackend, GenerationRequest,
    JSON_MIME_TYPE,
};
pub use client::{
    AnswerClient, AnswerError, AnswerResult, FailureKind, PERSONA_INSTRUCTION, parse_answer,
};
pub use fence::strip_code_fence;
pub use model::{
    DEFAULT_GEMINI_ENDPOINT, DEFAULT_GEMINI_MODEL, KNOWN_GEMINI_MODELS, is_known_gemini_model,
};
pub use rig_adapter::{RIG_GEMINI_BACKEND_ID, RigGeminiBackend};
pub use schema::{
    ContractError, ContractResult, MAX_VIDEOS, QUIZ_OPTION_COUNT, Quiz, StructuredAnswer,
    VideoRef, response_schema, validate,
};

pub fn create_backend(mut config: BackendConfig) -> BackendResult<Arc<dyn GenerationBackend>> {
    if config.backend_id.trim().is_empty() {
        config.backend_id = RIG_GEMINI_BACKEND_ID.to_string();
    }

    match config.backend_id.as_str() {
        "gemini" | "google" | "rig-gemini" => {
            config.backend_id = RIG_GEMINI_BACKEND_ID.to_string();
            Ok(Arc::new(RigGeminiBackend::new(config)?))
        }
        _ => Err(BackendError::UnsupportedBackend {
            stage: "create-backend",
            backend_id: config.backend_id,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_backend_id_resolves_to_gemini() {
        let backend = create_backend(BackendConfig::new("", "key", "", None))
            .expect("gemini backend");
        assert_eq!(backend.id(), RIG_GEMINI_BACKEND_ID);
    }

    #[test]
    fn unknown_backend_is_unsupported() {
        assert!(matches!(
            create_backend(BackendConfig::new("openai", "key", "", None)),
            Err(BackendError::UnsupportedBackend { .. })
        ));
    }
}
