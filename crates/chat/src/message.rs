use std::fmt;

use tedai_llm::StructuredAnswer;
use uuid::Uuid;

/// Fixed assistant greeting seeded into every new transcript.
pub const GREETING: &str = "Hello! I'm ted.ai, your university assistant. How can I help you study today? \
You can ask me about complex topics, request summaries, or get help with exam preparation.";

/// Stable, time-ordered identifier for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new_v7() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Chat speaker role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

/// Tagged message body: narrative text or a validated structured answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    PlainText(String),
    Structured(StructuredAnswer),
}

/// Immutable transcript entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    id: MessageId,
    role: Role,
    content: MessageContent,
}

impl ChatMessage {
    fn new(role: Role, content: MessageContent) -> Self {
        Self {
            id: MessageId::new_v7(),
            role,
            content,
        }
    }

    /// User turn holding the prompt exactly as submitted.
    pub fn user(prompt: impl Into<String>) -> Self {
        Self::new(Role::User, MessageContent::PlainText(prompt.into()))
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, MessageContent::PlainText(text.into()))
    }

    pub fn assistant_answer(answer: StructuredAnswer) -> Self {
        Self::new(Role::Assistant, MessageContent::Structured(answer))
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &MessageContent {
        &self.content
    }
}

/// Append-only ordered message sequence for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Creates a transcript holding only the fixed greeting.
    pub fn seeded() -> Self {
        Self {
            messages: vec![ChatMessage::assistant_text(GREETING)],
        }
    }

    pub(crate) fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|message| message.id == id)
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn seeded_transcript_holds_only_the_greeting() {
        let transcript = Transcript::seeded();
        assert_eq!(transcript.len(), 1);

        let greeting = &transcript.messages()[0];
        assert_eq!(greeting.role(), Role::Assistant);
        assert_eq!(
            greeting.content(),
            &MessageContent::PlainText(GREETING.to_string())
        );
    }

    #[test]
    fn ids_created_in_one_turn_never_collide() {
        let ids = (0..1_000)
            .map(|_| ChatMessage::user("same prompt").id())
            .collect::<HashSet<_>>();
        assert_eq!(ids.len(), 1_000);
    }

    #[test]
    fn append_preserves_order_and_lookup() {
        let mut transcript = Transcript::seeded();
        let user = ChatMessage::user("  raw prompt  ");
        let user_id = user.id();
        transcript.append(user);

        assert_eq!(transcript.len(), 2);
        let found = transcript.get(user_id).expect("appended message");
        assert_eq!(
            found.content(),
            &MessageContent::PlainText("  raw prompt  ".to_string())
        );
        assert_eq!(transcript.messages()[1].id(), user_id);
    }
}
