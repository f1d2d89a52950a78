#![deny(unsafe_code)]

/// Submit/respond orchestration over one transcript.
pub mod controller;
/// Transcript entities.
pub mod message;
/// Pure mapping from message content to presentational output.
pub mod render;
pub mod state;

pub use controller::{ChatController, ChatSnapshot, SubmitOutcome};
pub use message::{ChatMessage, GREETING, MessageContent, MessageId, Role, Transcript};
pub use render::{
    AnswerDisclosure, AnswerView, Block, Disclosure, ListMarker, QuizCard, QuizReveals,
    RenderedBody, RenderedMessage, ResourcesSection, Span, SpanStyle, render_content,
    render_markdown, render_message, render_transcript,
};
pub use state::{FAILURE_PREFIX, IgnoreReason, LastError, RequestState};
