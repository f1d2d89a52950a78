pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Gemini models the structured-output request has been exercised against.
pub const KNOWN_GEMINI_MODELS: [&str; 3] =
    [DEFAULT_GEMINI_MODEL, "gemini-2.5-pro", "gemini-2.0-flash"];

pub fn is_known_gemini_model(model_id: &str) -> bool {
    KNOWN_GEMINI_MODELS.contains(&model_id.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_model_is_known() {
        assert_eq!(KNOWN_GEMINI_MODELS[0], DEFAULT_GEMINI_MODEL);
        assert!(is_known_gemini_model(DEFAULT_GEMINI_MODEL));
    }

    #[test]
    fn lookup_ignores_surrounding_whitespace() {
        assert!(is_known_gemini_model(" gemini-2.5-pro "));
        assert!(!is_known_gemini_model("gpt-4o"));
        assert!(!is_known_gemini_model(""));
    }
}
