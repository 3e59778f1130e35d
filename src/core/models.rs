//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language value asking the engine to pick the direction
pub const AUTO: &str = "auto";

/// Check whether a language value is unresolved
pub fn is_auto(lang: &str) -> bool {
    lang.is_empty() || lang.eq_ignore_ascii_case(AUTO)
}

/// Check whether every character is plain ASCII
pub fn check_english(text: &str) -> bool {
    text.chars().all(|ch| (ch as u32) < 128)
}

/// Guess the translation direction from the text alone
///
/// ASCII-only text is treated as English and translated to Chinese,
/// anything else the other way round. This is a heuristic default,
/// explicit language codes always take precedence.
pub fn guess_language(text: &str) -> (&'static str, &'static str) {
    if check_english(text) {
        ("en-US", "zh-CN")
    } else {
        ("zh-CN", "en-US")
    }
}

/// Translation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Source language code or `auto`
    pub source_lang: String,
    /// Target language code or `auto`
    pub target_lang: String,
    /// Text to translate
    pub text: String,
}

impl TranslationRequest {
    /// New request
    pub fn new(
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            text: text.into(),
        }
    }

    /// Replace an `auto`/`auto` pair with the guessed direction
    pub fn resolve(mut self) -> Self {
        if is_auto(&self.source_lang) && is_auto(&self.target_lang) {
            let (sl, tl) = guess_language(&self.text);
            self.source_lang = sl.to_string();
            self.target_lang = tl.to_string();
        }
        self
    }
}

/// Translation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Engine that produced the result
    pub engine: String,
    /// Source language reported by the engine
    pub source_lang: String,
    /// Target language
    pub target_lang: String,
    /// Original text
    pub text: String,
    /// Rendered translation, absent on failure
    pub translation: Option<String>,
    /// Whether the service produced a translation
    pub success: bool,
    /// Service-reported reason when `success` is false
    pub error_info: Option<String>,
    /// Decoded response body, kept for diagnostics
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub raw: serde_json::Value,
}

impl TranslationResult {
    /// Successful result for `request`
    pub fn success(engine: &str, request: &TranslationRequest, translation: String) -> Self {
        Self {
            engine: engine.to_string(),
            source_lang: request.source_lang.clone(),
            target_lang: request.target_lang.clone(),
            text: request.text.clone(),
            translation: Some(translation),
            success: true,
            error_info: None,
            raw: serde_json::Value::Null,
        }
    }

    /// Result for a request the service answered but refused
    pub fn failure(engine: &str, request: &TranslationRequest, info: impl Into<String>) -> Self {
        Self {
            engine: engine.to_string(),
            source_lang: request.source_lang.clone(),
            target_lang: request.target_lang.clone(),
            text: request.text.clone(),
            translation: None,
            success: false,
            error_info: Some(info.into()),
            raw: serde_json::Value::Null,
        }
    }

    /// Override the languages with what the service detected
    pub fn with_languages(mut self, source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        self.source_lang = source_lang.into();
        self.target_lang = target_lang.into();
        self
    }

    /// Attach the decoded response body
    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = raw;
        self
    }
}

impl fmt::Display for TranslationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.translation, &self.error_info) {
            (Some(translation), _) if self.success => write!(f, "{}", translation),
            (_, Some(info)) => write!(f, "[{}] {}", self.engine, info),
            _ => write!(f, "[{}] no translation", self.engine),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_language_ascii() {
        assert_eq!(guess_language("Hello, World !!"), ("en-US", "zh-CN"));
        assert_eq!(guess_language(""), ("en-US", "zh-CN"));
        assert_eq!(guess_language("kiss\t~\x7f"), ("en-US", "zh-CN"));
    }

    #[test]
    fn test_guess_language_non_ascii() {
        assert_eq!(guess_language("你吃饭了没有?"), ("zh-CN", "en-US"));
        assert_eq!(guess_language("café"), ("zh-CN", "en-US"));
        assert_eq!(guess_language("abc\u{80}"), ("zh-CN", "en-US"));
    }

    #[test]
    fn test_resolve_only_when_both_auto() {
        let request = TranslationRequest::new("auto", "auto", "kiss").resolve();
        assert_eq!(request.source_lang, "en-US");
        assert_eq!(request.target_lang, "zh-CN");

        let request = TranslationRequest::new("auto", "ja", "kiss").resolve();
        assert_eq!(request.source_lang, "auto");
        assert_eq!(request.target_lang, "ja");

        let request = TranslationRequest::new("", "AUTO", "亲吻").resolve();
        assert_eq!(request.source_lang, "zh-CN");
        assert_eq!(request.target_lang, "en-US");
    }

    #[test]
    fn test_result_display() {
        let request = TranslationRequest::new("en", "zh", "kiss");
        let ok = TranslationResult::success("google", &request, "亲吻".to_string());
        assert_eq!(ok.to_string(), "亲吻");

        let failed = TranslationResult::failure("baidu", &request, "54001: Invalid Sign");
        assert_eq!(failed.to_string(), "[baidu] 54001: Invalid Sign");
        assert!(!failed.success);
    }
}
