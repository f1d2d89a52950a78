use tedai_campus::{EventItem, ScheduleItem, Tracker};
use tedai_chat::{
    AnswerDisclosure, AnswerView, Block, ListMarker, RenderedBody, RenderedMessage, Role, Span,
};

const INDENT: &str = "  ";

pub fn view_header(label: &str) -> String {
    format!("== {label} ==")
}

pub fn format_spans(spans: &[Span]) -> String {
    let mut line = String::new();
    for span in spans {
        let text = if span.style.code {
            format!("`{}`", span.text)
        } else if span.style.strong {
            format!("*{}*", span.text)
        } else if span.style.emphasis {
            format!("_{}_", span.text)
        } else {
            span.text.clone()
        };

        line.push_str(&text);
        if let Some(link) = &span.link
            && link != &span.text
        {
            line.push_str(&format!(" <{link}>"));
        }
    }
    line
}

pub fn format_blocks(blocks: &[Block], indent: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for block in blocks {
        match block {
            Block::Heading { level, spans } => {
                let marks = "#".repeat(usize::from(*level));
                lines.push(format!("{indent}{marks} {}", format_spans(spans)));
            }
            Block::Paragraph(spans) => {
                for text in format_spans(spans).lines() {
                    lines.push(format!("{indent}{text}"));
                }
            }
            Block::ListItem {
                marker,
                depth,
                spans,
            } => {
                let nesting = INDENT.repeat(*depth);
                let marker = match marker {
                    ListMarker::Bullet => "-".to_string(),
                    ListMarker::Ordered(number) => format!("{number}."),
                };
                lines.push(format!("{indent}{nesting}{marker} {}", format_spans(spans)));
            }
            Block::CodeBlock { code, .. } => {
                for text in code.lines() {
                    lines.push(format!("{indent}    {text}"));
                }
            }
            Block::Rule => lines.push(format!("{indent}----")),
        }
    }
    lines
}

fn format_answer(view: &AnswerView, position: usize) -> Vec<String> {
    let mut lines = format_blocks(&view.narrative, INDENT);

    if let Some(resources) = &view.resources {
        lines.push(String::new());
        lines.push(format!("{INDENT}{}", resources.heading));
        for video in &resources.videos {
            lines.push(format!("{INDENT}{INDENT}- {} <{}>", video.title, video.url));
        }
    }

    let quiz = &view.quiz;
    lines.push(String::new());
    lines.push(format!("{INDENT}{}", quiz.heading));
    lines.push(format!("{INDENT}{INDENT}{}", quiz.question));
    for (index, option) in quiz.options.iter().enumerate() {
        lines.push(format!("{INDENT}{INDENT}{}. {option}", index + 1));
    }
    match &quiz.answer {
        AnswerDisclosure::Hidden { prompt } => {
            lines.push(format!("{INDENT}{INDENT}[{prompt}: /reveal {position}]"));
        }
        AnswerDisclosure::Revealed(answer) => {
            lines.push(format!("{INDENT}{INDENT}Answer: {answer}"));
        }
    }
    lines
}

/// Formats one transcript entry; `position` is its 1-based transcript index.
pub fn format_message(message: &RenderedMessage, position: usize) -> Vec<String> {
    let speaker = match message.role {
        Role::User => "you",
        Role::Assistant => "ted.ai",
    };

    let mut lines = vec![format!("[{position}] {speaker}:")];
    match &message.body {
        RenderedBody::Narrative(blocks) => lines.extend(format_blocks(blocks, INDENT)),
        RenderedBody::Answer(view) => lines.extend(format_answer(view, position)),
    }
    lines
}

pub fn format_schedule(items: &[ScheduleItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| {
            format!(
                "{}  {} ({}) @ {}",
                item.time,
                item.title,
                item.kind.label(),
                item.location
            )
        })
        .collect()
}

pub fn format_events(items: &[EventItem]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| {
            [
                format!("{}  {}", item.date, item.title),
                format!("{INDENT}{}", item.description),
            ]
        })
        .collect()
}

pub fn format_tracker(tracker: &Tracker) -> Vec<String> {
    tracker
        .assignments()
        .iter()
        .map(|assignment| {
            format!(
                "{}  [{}] {} ({}), {}",
                assignment.id,
                assignment.status,
                assignment.title,
                assignment.course,
                assignment.due
            )
        })
        .collect()
}
