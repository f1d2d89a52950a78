use std::collections::HashSet;

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use tedai_llm::{StructuredAnswer, VideoRef};

use crate::message::{ChatMessage, MessageContent, MessageId, Role};

pub const RESOURCES_HEADING: &str = "Related Videos";
pub const QUIZ_HEADING: &str = "Check Your Understanding";
pub const SHOW_ANSWER_PROMPT: &str = "Show Answer";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SpanStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub code: bool,
}

/// Run of inline text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
    pub link: Option<String>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: SpanStyle::default(),
            link: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMarker {
    Bullet,
    Ordered(u64),
}

/// Presentational block resolved from markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        spans: Vec<Span>,
    },
    Paragraph(Vec<Span>),
    ListItem {
        marker: ListMarker,
        depth: usize,
        spans: Vec<Span>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    Rule,
}

/// Whether the quiz answer should be shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Disclosure {
    #[default]
    Hidden,
    Revealed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerDisclosure {
    Hidden { prompt: &'static str },
    Revealed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcesSection {
    pub heading: &'static str,
    pub videos: Vec<VideoRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizCard {
    pub heading: &'static str,
    pub question: String,
    pub options: Vec<String>,
    pub answer: AnswerDisclosure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerView {
    pub narrative: Vec<Block>,
    pub resources: Option<ResourcesSection>,
    pub quiz: QuizCard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBody {
    Narrative(Vec<Block>),
    Answer(AnswerView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub id: MessageId,
    pub role: Role,
    pub body: RenderedBody,
}

/// Messages whose quiz answer the user explicitly asked to see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizReveals {
    revealed: HashSet<MessageId>,
}

impl QuizReveals {
    /// Returns false when the answer was already revealed.
    pub fn reveal(&mut self, id: MessageId) -> bool {
        self.revealed.insert(id)
    }

    pub fn is_revealed(&self, id: MessageId) -> bool {
        self.revealed.contains(&id)
    }

    pub fn disclosure_for(&self, id: MessageId) -> Disclosure {
        if self.is_revealed(id) {
            Disclosure::Revealed
        } else {
            Disclosure::Hidden
        }
    }
}

pub fn render_transcript(messages: &[ChatMessage], reveals: &QuizReveals) -> Vec<RenderedMessage> {
    messages
        .iter()
        .map(|message| render_message(message, reveals.disclosure_for(message.id())))
        .collect()
}

pub fn render_message(message: &ChatMessage, disclosure: Disclosure) -> RenderedMessage {
    RenderedMessage {
        id: message.id(),
        role: message.role(),
        body: render_content(message.content(), disclosure),
    }
}

pub fn render_content(content: &MessageContent, disclosure: Disclosure) -> RenderedBody {
    match content {
        MessageContent::PlainText(text) => RenderedBody::Narrative(render_markdown(text)),
        MessageContent::Structured(answer) => RenderedBody::Answer(render_answer(answer, disclosure)),
    }
}

fn render_answer(answer: &StructuredAnswer, disclosure: Disclosure) -> AnswerView {
    let resources = (!answer.videos.is_empty()).then(|| ResourcesSection {
        heading: RESOURCES_HEADING,
        videos: answer.videos.clone(),
    });

    let quiz_answer = match disclosure {
        Disclosure::Hidden => AnswerDisclosure::Hidden {
            prompt: SHOW_ANSWER_PROMPT,
        },
        Disclosure::Revealed => AnswerDisclosure::Revealed(answer.quiz.answer.clone()),
    };

    AnswerView {
        narrative: render_markdown(&answer.answer),
        resources,
        quiz: QuizCard {
            heading: QUIZ_HEADING,
            question: answer.quiz.question.clone(),
            options: answer.quiz.options.clone(),
            answer: quiz_answer,
        },
    }
}

/// Resolves markdown into blocks. Raw HTML is kept as literal text.
pub fn render_markdown(text: &str) -> Vec<Block> {
    let mut builder = NarrativeBuilder::default();
    for event in Parser::new(text) {
        builder.push_event(event);
    }
    builder.finish()
}

#[derive(Default)]
struct NarrativeBuilder {
    blocks: Vec<Block>,
    spans: Vec<Span>,
    strong: usize,
    emphasis: usize,
    link: Option<String>,
    lists: Vec<Option<u64>>,
    heading: Option<u8>,
    code: Option<(Option<String>, String)>,
}

impl NarrativeBuilder {
    fn push_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if let Some((_, code)) = &mut self.code {
                    code.push_str(&text);
                } else {
                    self.push_text(&text, false);
                }
            }
            Event::Code(text) => self.push_text(&text, true),
            Event::Html(text) | Event::InlineHtml(text) => self.push_text(&text, false),
            Event::SoftBreak => self.push_text(" ", false),
            Event::HardBreak => self.push_text("\n", false),
            Event::Rule => {
                self.flush_paragraph();
                self.blocks.push(Block::Rule);
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_paragraph();
                self.heading = Some(level as u8);
            }
            Tag::CodeBlock(kind) => {
                self.flush_paragraph();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::List(start) => {
                self.flush_item();
                self.lists.push(start);
            }
            Tag::Strong => self.strong += 1,
            Tag::Emphasis => self.emphasis += 1,
            Tag::Link { dest_url, .. } => self.link = Some(dest_url.to_string()),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if self.lists.is_empty() {
                    self.flush_paragraph();
                } else {
                    self.push_text("\n", false);
                }
            }
            TagEnd::Heading(_) => {
                let spans = self.take_spans();
                let level = self.heading.take().unwrap_or(1);
                self.blocks.push(Block::Heading { level, spans });
            }
            TagEnd::CodeBlock => {
                if let Some((language, code)) = self.code.take() {
                    self.blocks.push(Block::CodeBlock {
                        language,
                        code: code.trim_end_matches('\n').to_string(),
                    });
                }
            }
            TagEnd::Item => self.flush_item(),
            TagEnd::List(_) => {
                self.flush_item();
                self.lists.pop();
            }
            TagEnd::Strong => self.strong = self.strong.saturating_sub(1),
            TagEnd::Emphasis => self.emphasis = self.emphasis.saturating_sub(1),
            TagEnd::Link => self.link = None,
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str, code: bool) {
        let style = SpanStyle {
            strong: self.strong > 0,
            emphasis: self.emphasis > 0,
            code,
        };

        if let Some(last) = self.spans.last_mut()
            && last.style == style
            && last.link == self.link
        {
            last.text.push_str(text);
            return;
        }

        self.spans.push(Span {
            text: text.to_string(),
            style,
            link: self.link.clone(),
        });
    }

    fn take_spans(&mut self) -> Vec<Span> {
        let mut spans = std::mem::take(&mut self.spans);
        while let Some(last) = spans.last_mut() {
            let trimmed_len = last.text.trim_end().len();
            if trimmed_len == 0 {
                spans.pop();
            } else {
                last.text.truncate(trimmed_len);
                break;
            }
        }
        spans
    }

    fn flush_paragraph(&mut self) {
        let spans = self.take_spans();
        if !spans.is_empty() {
            self.blocks.push(Block::Paragraph(spans));
        }
    }

    fn flush_item(&mut self) {
        if self.lists.is_empty() {
            self.flush_paragraph();
            return;
        }

        let spans = self.take_spans();
        if spans.is_empty() {
            return;
        }

        let depth = self.lists.len() - 1;
        let marker = match self.lists.last_mut() {
            Some(Some(next)) => {
                let marker = ListMarker::Ordered(*next);
                *next += 1;
                marker
            }
            _ => ListMarker::Bullet,
        };
        self.blocks.push(Block::ListItem {
            marker,
            depth,
            spans,
        });
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush_paragraph();
        self.blocks
    }
}
