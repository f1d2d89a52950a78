use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use snafu::{ResultExt, Snafu, ensure};

/// Number of videos the model is asked for at most.
pub const MAX_VIDEOS: usize = 3;

/// Number of options every quiz must carry.
pub const QUIZ_OPTION_COUNT: usize = 4;

/// One related video resource surfaced next to an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    pub title: String,
    pub url: String,
}

impl VideoRef {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Multiple-choice check attached to every structured answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl Quiz {
    /// Returns true when the stated answer is literally one of the options.
    pub fn answer_is_listed(&self) -> bool {
        self.options.iter().any(|option| option == &self.answer)
    }
}

/// Validated model output: markdown answer, related videos, one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAnswer {
    pub answer: String,
    pub videos: Vec<VideoRef>,
    pub quiz: Quiz,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ContractError {
    #[snafu(display("response is not valid JSON: {source}"))]
    InvalidJson {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("response field `{field}` is invalid: {details}"))]
    SchemaViolation {
        stage: &'static str,
        field: &'static str,
        details: String,
    },
}

pub type ContractResult<T> = Result<T, ContractError>;

/// Output shape requested from the generation endpoint.
///
/// Uses the OpenAPI subset accepted by Gemini `responseSchema`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "answer": {
                "type": "STRING",
                "description": "A clear, concise, and helpful answer to the student's question. Format using Markdown."
            },
            "videos": {
                "type": "ARRAY",
                "description": format!("An array of up to {MAX_VIDEOS} relevant YouTube video resources."),
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING", "description": "The title of the video." },
                        "url": { "type": "STRING", "description": "The full URL of the YouTube video." }
                    },
                    "required": ["title", "url"]
                }
            },
            "quiz": {
                "type": "OBJECT",
                "description": "A multiple-choice quiz question to test understanding.",
                "properties": {
                    "question": { "type": "STRING", "description": "The quiz question." },
                    "options": {
                        "type": "ARRAY",
                        "description": format!("An array of {QUIZ_OPTION_COUNT} possible answers."),
                        "items": { "type": "STRING" }
                    },
                    "answer": { "type": "STRING", "description": "The correct answer from the options." }
                },
                "required": ["question", "options", "answer"]
            }
        },
        "required": ["answer", "videos", "quiz"]
    })
}

/// Parses an already fence-stripped payload and checks it against the contract.
pub fn validate(payload: &str) -> ContractResult<StructuredAnswer> {
    let value: Value = serde_json::from_str(payload).context(InvalidJsonSnafu {
        stage: "parse-response-json",
    })?;

    let Value::Object(mut object) = value else {
        return SchemaViolationSnafu {
            stage: "check-response-root",
            field: "<root>",
            details: "expected a JSON object".to_string(),
        }
        .fail();
    };

    let answer = take_string(&mut object, "answer", "answer")?;
    ensure!(
        !answer.trim().is_empty(),
        SchemaViolationSnafu {
            stage: "check-answer",
            field: "answer",
            details: "must not be empty",
        }
    );

    let videos = take_videos(&mut object)?;

    let Some(Value::Object(mut quiz)) = object.remove("quiz") else {
        return SchemaViolationSnafu {
            stage: "check-quiz",
            field: "quiz",
            details: "missing or not an object".to_string(),
        }
        .fail();
    };
    let quiz = Quiz {
        question: take_non_empty(&mut quiz, "question", "quiz.question")?,
        options: take_options(&mut quiz)?,
        answer: take_non_empty(&mut quiz, "answer", "quiz.answer")?,
    };

    if !quiz.answer_is_listed() {
        tracing::warn!(
            quiz_answer = %quiz.answer,
            option_count = quiz.options.len(),
            "quiz answer does not match any option; accepting as-is"
        );
    }

    Ok(StructuredAnswer {
        answer,
        videos,
        quiz,
    })
}

fn take_string(
    object: &mut serde_json::Map<String, Value>,
    key: &str,
    field: &'static str,
) -> ContractResult<String> {
    match object.remove(key) {
        Some(Value::String(text)) => Ok(text),
        Some(other) => SchemaViolationSnafu {
            stage: "check-string-field",
            field,
            details: format!("expected a string, found {}", json_kind(&other)),
        }
        .fail(),
        None => SchemaViolationSnafu {
            stage: "check-string-field",
            field,
            details: "required field is missing".to_string(),
        }
        .fail(),
    }
}

fn take_non_empty(
    object: &mut serde_json::Map<String, Value>,
    key: &str,
    field: &'static str,
) -> ContractResult<String> {
    let text = take_string(object, key, field)?;
    ensure!(
        !text.trim().is_empty(),
        SchemaViolationSnafu {
            stage: "check-non-empty-field",
            field,
            details: "must not be empty",
        }
    );
    Ok(text)
}

fn take_videos(object: &mut serde_json::Map<String, Value>) -> ContractResult<Vec<VideoRef>> {
    let Some(Value::Array(items)) = object.remove("videos") else {
        return SchemaViolationSnafu {
            stage: "check-videos",
            field: "videos",
            details: "missing or not a list".to_string(),
        }
        .fail();
    };

    if items.len() > MAX_VIDEOS {
        // Over-long lists are accepted untruncated.
        tracing::debug!(
            video_count = items.len(),
            max_videos = MAX_VIDEOS,
            "model returned more videos than requested"
        );
    }

    items
        .into_iter()
        .map(|item| {
            let Value::Object(mut video) = item else {
                return SchemaViolationSnafu {
                    stage: "check-video-entry",
                    field: "videos",
                    details: "each entry must be an object".to_string(),
                }
                .fail();
            };
            Ok(VideoRef {
                title: take_non_empty(&mut video, "title", "videos.title")?,
                url: take_non_empty(&mut video, "url", "videos.url")?,
            })
        })
        .collect()
}

fn take_options(quiz: &mut serde_json::Map<String, Value>) -> ContractResult<Vec<String>> {
    let Some(Value::Array(items)) = quiz.remove("options") else {
        return SchemaViolationSnafu {
            stage: "check-quiz-options",
            field: "quiz.options",
            details: "missing or not a list".to_string(),
        }
        .fail();
    };

    ensure!(
        items.len() == QUIZ_OPTION_COUNT,
        SchemaViolationSnafu {
            stage: "check-quiz-option-count",
            field: "quiz.options",
            details: format!(
                "expected exactly {QUIZ_OPTION_COUNT} options, found {}",
                items.len()
            ),
        }
    );

    items
        .into_iter()
        .map(|item| match item {
            Value::String(option) if !option.trim().is_empty() => Ok(option),
            other => SchemaViolationSnafu {
                stage: "check-quiz-option",
                field: "quiz.options",
                details: format!("expected a non-empty string, found {}", json_kind(&other)),
            }
            .fail(),
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(text) if text.trim().is_empty() => "an empty string",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(videos: &str) -> String {
        format!(
            r#"{{
                "answer": "Newton's laws...",
                "videos": {videos},
                "quiz": {{
                    "question": "What is F=ma?",
                    "options": ["A", "B", "C", "D"],
                    "answer": "A"
                }}
            }}"#
        )
    }

    #[test]
    fn well_formed_payload_keeps_every_field() {
        let parsed = validate(&payload(
            r#"[{"title": "Physics 101", "url": "https://example.com/v1"}]"#,
        ))
        .expect("payload should validate");

        assert_eq!(
            parsed,
            StructuredAnswer {
                answer: "Newton's laws...".to_string(),
                videos: vec![VideoRef::new("Physics 101", "https://example.com/v1")],
                quiz: Quiz {
                    question: "What is F=ma?".to_string(),
                    options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    answer: "A".to_string(),
                },
            }
        );
    }

    #[test]
    fn accepts_zero_through_four_videos() {
        for count in 0..=4 {
            let entries = (0..count)
                .map(|index| format!(r#"{{"title": "v{index}", "url": "https://e.com/{index}"}}"#))
                .collect::<Vec<_>>()
                .join(",");
            let parsed = validate(&payload(&format!("[{entries}]"))).expect("videos accepted");
            assert_eq!(parsed.videos.len(), count);
        }
    }

    #[test]
    fn rejects_missing_top_level_fields() {
        let missing_answer = r#"{"videos": [], "quiz": {"question": "q", "options": ["a","b","c","d"], "answer": "a"}}"#;
        let missing_videos = r#"{"answer": "x", "quiz": {"question": "q", "options": ["a","b","c","d"], "answer": "a"}}"#;
        let videos_not_list = r#"{"answer": "x", "videos": {}, "quiz": {"question": "q", "options": ["a","b","c","d"], "answer": "a"}}"#;
        let missing_quiz = r#"{"answer": "x", "videos": []}"#;

        for (raw, field) in [
            (missing_answer, "answer"),
            (missing_videos, "videos"),
            (videos_not_list, "videos"),
            (missing_quiz, "quiz"),
        ] {
            match validate(raw) {
                Err(ContractError::SchemaViolation { field: found, .. }) => assert_eq!(found, field),
                other => panic!("expected schema violation for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_blank_answer_and_wrong_option_count() {
        let blank = r#"{"answer": "   ", "videos": [], "quiz": {"question": "q", "options": ["a","b","c","d"], "answer": "a"}}"#;
        assert!(matches!(
            validate(blank),
            Err(ContractError::SchemaViolation { field: "answer", .. })
        ));

        let three = r#"{"answer": "x", "videos": [], "quiz": {"question": "q", "options": ["a","b","c"], "answer": "a"}}"#;
        assert!(matches!(
            validate(three),
            Err(ContractError::SchemaViolation { field: "quiz.options", .. })
        ));
    }

    #[test]
    fn rejects_video_without_url() {
        let raw = payload(r#"[{"title": "Physics 101", "url": ""}]"#);
        assert!(matches!(
            validate(&raw),
            Err(ContractError::SchemaViolation { field: "videos.url", .. })
        ));
    }

    #[test]
    fn unparseable_text_is_invalid_json() {
        assert!(matches!(
            validate("Sure! Here is your answer"),
            Err(ContractError::InvalidJson { .. })
        ));
    }

    #[test]
    fn unlisted_quiz_answer_is_tolerated() {
        let raw = r#"{"answer": "x", "videos": [], "quiz": {"question": "q", "options": ["a","b","c","d"], "answer": "e"}}"#;
        let parsed = validate(raw).expect("lenient on quiz answer");
        assert!(!parsed.quiz.answer_is_listed());
    }

    #[test]
    fn schema_requires_all_top_level_fields() {
        let schema = response_schema();
        assert_eq!(schema["required"], json!(["answer", "videos", "quiz"]));
        assert_eq!(
            schema["properties"]["quiz"]["required"],
            json!(["question", "options", "answer"])
        );
    }
}
