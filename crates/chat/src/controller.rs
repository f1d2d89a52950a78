use tedai_llm::AnswerClient;
use tokio::sync::Mutex;

use crate::message::{ChatMessage, MessageId, Transcript};
use crate::state::{IgnoreReason, LastError, RequestState};

/// Result of one `submit` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The assistant answer with this id was appended.
    Answered(MessageId),
    /// Only the user message was appended; `last_error` is set.
    Failed(LastError),
    /// Nothing changed.
    Ignored(IgnoreReason),
}

/// Read-only view of controller state for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSnapshot {
    pub messages: Vec<ChatMessage>,
    pub pending: bool,
    pub last_error: Option<LastError>,
}

#[derive(Debug, Default)]
struct ChatSession {
    transcript: Transcript,
    request: RequestState,
    input: String,
}

/// Owns the transcript and request state and sequences submit/respond cycles.
///
/// Submissions made while a request is in flight are dropped, not queued.
pub struct ChatController {
    client: AnswerClient,
    session: Mutex<ChatSession>,
}

impl ChatController {
    pub fn new(client: AnswerClient) -> Self {
        Self {
            client,
            session: Mutex::new(ChatSession::default()),
        }
    }

    pub fn client(&self) -> &AnswerClient {
        &self.client
    }

    pub async fn set_input(&self, input: impl Into<String>) {
        self.session.lock().await.input = input.into();
    }

    pub async fn input(&self) -> String {
        self.session.lock().await.input.clone()
    }

    /// Submits the current draft input.
    pub async fn submit_input(&self) -> SubmitOutcome {
        let input = self.input().await;
        self.submit(input).await
    }

    pub async fn submit(&self, prompt: impl Into<String>) -> SubmitOutcome {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            tracing::debug!("ignoring blank prompt");
            return SubmitOutcome::Ignored(IgnoreReason::EmptyPrompt);
        }

        {
            let mut session = self.session.lock().await;
            if let Err(reason) = session.request.begin() {
                tracing::debug!(?reason, "ignoring submit while a request is in flight");
                return SubmitOutcome::Ignored(reason);
            }
            session.transcript.append(ChatMessage::user(prompt.clone()));
            session.input.clear();
        }

        tracing::debug!(
            prompt_len = prompt.len(),
            model_id = %self.client.model_id(),
            "requesting structured answer"
        );

        // The lock is released for the round trip so readers can observe `pending`.
        let result = self.client.request_answer(&prompt).await;

        let mut session = self.session.lock().await;
        match result {
            Ok(answer) => {
                let message = ChatMessage::assistant_answer(answer);
                let message_id = message.id();
                session.transcript.append(message);
                session.request.succeed();
                tracing::info!(%message_id, "assistant answer appended");
                SubmitOutcome::Answered(message_id)
            }
            Err(error) => {
                let last_error = session.request.fail(&error);
                tracing::warn!(kind = ?last_error.kind, error = %error, "submission failed");
                SubmitOutcome::Failed(last_error)
            }
        }
    }

    pub async fn snapshot(&self) -> ChatSnapshot {
        let session = self.session.lock().await;
        ChatSnapshot {
            messages: session.transcript.messages().to_vec(),
            pending: session.request.pending(),
            last_error: session.request.last_error().cloned(),
        }
    }

    pub async fn is_pending(&self) -> bool {
        self.session.lock().await.request.pending()
    }

    pub async fn last_error(&self) -> Option<LastError> {
        self.session.lock().await.request.last_error().cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tedai_llm::testing::ScriptedBackend;
    use tedai_llm::{BackendResult, FailureKind};

    use super::*;
    use crate::message::{MessageContent, Role};

    const VALID: &str = r#"```json
{"answer": "Entropy measures disorder.", "videos": [{"title": "Physics 101", "url": "https://example.com/v1"}], "quiz": {"question": "What is F=ma?", "options": ["A", "B", "C", "D"], "answer": "A"}}
```"#;

    fn network_failure() -> BackendResult<String> {
        ScriptedBackend::network_failure("network unreachable")
    }

    fn controller(backend: Arc<ScriptedBackend>) -> ChatController {
        ChatController::new(AnswerClient::new(backend))
    }

    #[tokio::test]
    async fn starts_with_seeded_greeting_only() {
        let chat = controller(Arc::new(ScriptedBackend::default()));
        let snapshot = chat.snapshot().await;

        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].role(), Role::Assistant);
        assert!(!snapshot.pending);
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test]
    async fn successful_submit_appends_user_and_answer() {
        let backend = Arc::new(ScriptedBackend::replying(vec![Ok(VALID.to_string())]));
        let chat = controller(backend);

        let outcome = chat.submit("What is entropy?").await;
        let snapshot = chat.snapshot().await;

        assert_eq!(snapshot.messages.len(), 3);
        assert!(!snapshot.pending);
        assert!(snapshot.last_error.is_none());

        let user = &snapshot.messages[1];
        assert_eq!(user.role(), Role::User);
        assert_eq!(
            user.content(),
            &MessageContent::PlainText("What is entropy?".to_string())
        );

        let answer = &snapshot.messages[2];
        assert_eq!(outcome, SubmitOutcome::Answered(answer.id()));
        match answer.content() {
            MessageContent::Structured(structured) => {
                assert_eq!(structured.answer, "Entropy measures disorder.");
                assert_eq!(structured.quiz.options.len(), 4);
            }
            other => panic!("expected structured answer, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn network_failure_keeps_only_user_message() {
        let backend = Arc::new(ScriptedBackend::replying(vec![network_failure()]));
        let chat = controller(backend);

        let outcome = chat.submit("Explain recursion").await;
        let snapshot = chat.snapshot().await;

        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[1].role(), Role::User);
        assert!(!snapshot.pending);

        let last_error = snapshot.last_error.expect("error recorded");
        assert_eq!(last_error.kind, FailureKind::Upstream);
        assert!(last_error.message.contains("network unreachable"));
        assert_eq!(outcome, SubmitOutcome::Failed(last_error));
    }

    #[tokio::test]
    async fn malformed_answer_never_enters_transcript() {
        let backend = Arc::new(ScriptedBackend::replying(vec![Ok(
            r#"{"answer": "x", "quiz": {"question": "q", "options": ["a","b","c","d"], "answer": "a"}}"#
                .to_string(),
        )]));
        let chat = controller(backend);

        chat.submit("Explain recursion").await;
        let snapshot = chat.snapshot().await;

        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(
            snapshot.last_error.map(|error| error.kind),
            Some(FailureKind::Malformed)
        );
    }

    #[tokio::test]
    async fn blank_prompt_is_ignored() {
        let backend = Arc::new(ScriptedBackend::default());
        let chat = controller(backend.clone());

        for prompt in ["", "   ", "\n\t"] {
            assert_eq!(
                chat.submit(prompt).await,
                SubmitOutcome::Ignored(IgnoreReason::EmptyPrompt)
            );
        }

        let snapshot = chat.snapshot().await;
        assert_eq!(snapshot.messages.len(), 1);
        assert!(!snapshot.pending);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn submit_while_pending_is_dropped() {
        let backend = Arc::new(ScriptedBackend::gated(vec![Ok(VALID.to_string())]));
        let chat = controller(backend.clone());

        let first = chat.submit("What is entropy?");
        let second = async {
            backend.wait_until_called().await;

            let before = chat.snapshot().await;
            assert!(before.pending);
            assert_eq!(before.messages.len(), 2);

            let outcome = chat.submit("And enthalpy?").await;

            let after = chat.snapshot().await;
            assert!(after.pending);
            assert_eq!(after.messages.len(), 2);

            backend.release();
            outcome
        };

        let (first, second) = tokio::join!(first, second);

        assert!(matches!(first, SubmitOutcome::Answered(_)));
        assert_eq!(second, SubmitOutcome::Ignored(IgnoreReason::RequestPending));
        assert_eq!(backend.calls(), 1);
        assert_eq!(chat.snapshot().await.messages.len(), 3);
    }

    #[tokio::test]
    async fn resubmit_after_failure_clears_error() {
        let backend = Arc::new(ScriptedBackend::replying(vec![
            network_failure(),
            Ok(VALID.to_string()),
        ]));
        let chat = controller(backend);

        chat.submit("Explain recursion").await;
        assert!(chat.last_error().await.is_some());

        chat.submit("Explain recursion").await;
        let snapshot = chat.snapshot().await;
        assert_eq!(snapshot.messages.len(), 4);
        assert!(snapshot.last_error.is_none());
    }

    #[tokio::test]
    async fn submit_input_consumes_draft() {
        let backend = Arc::new(ScriptedBackend::replying(vec![Ok(VALID.to_string())]));
        let chat = controller(backend);

        chat.set_input("What is entropy?").await;
        let outcome = chat.submit_input().await;

        assert!(matches!(outcome, SubmitOutcome::Answered(_)));
        assert!(chat.input().await.is_empty());
        assert!(!chat.is_pending().await);
    }
}
