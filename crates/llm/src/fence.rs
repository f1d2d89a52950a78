const FENCE: &str = "```";

/// Removes a markdown code fence the model may wrap around a JSON payload.
///
/// Handles a leading fence with an optional language tag (```` ```json ````) and a
/// trailing fence independently. Unfenced input is only trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut body = raw.trim();

    if let Some(rest) = body.strip_prefix(FENCE) {
        let tag_len = rest
            .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'))
            .unwrap_or(rest.len());
        body = rest[tag_len..].trim_start();
    }

    if let Some(rest) = body.strip_suffix(FENCE) {
        body = rest.trim_end();
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_tagged_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn strips_untagged_fence_and_surrounding_whitespace() {
        assert_eq!(strip_code_fence("  ```\n{\"a\": 1}\n```  \n"), "{\"a\": 1}");
    }

    #[test]
    fn leaves_unfenced_payload_untouched() {
        assert_eq!(strip_code_fence("{\"a\": 1}"), "{\"a\": 1}");
    }

    #[test]
    fn fence_without_newline_keeps_payload() {
        assert_eq!(strip_code_fence("```json{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn trailing_fence_alone_is_removed() {
        assert_eq!(strip_code_fence("{\"a\": 1}\n```"), "{\"a\": 1}");
    }
}
