//! Response Sanitizing
//!
//! Lexical cleanup of a raw frame: splits it into tokens and removes the
//! prompt, status placeholders and the command echo. Nothing here looks at
//! what the tokens mean.

use crate::frame::{RawFrame, DEFAULT_PROMPT};
use tracing::debug;

/// Status text the adapter prints while it is still working
pub const DEFAULT_PLACEHOLDERS: &[&str] = &["SEARCHING...", "BUS INIT: ...OK"];

/// Whitespace-delimited tokens of a response, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedResponse {
    tokens: Vec<String>,
}

impl CleanedResponse {
    pub fn new(tokens: Vec<String>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens joined by single spaces
    pub fn joined(&self) -> String {
        self.tokens.join(" ")
    }

    /// Tokens concatenated without separators
    pub fn compact(&self) -> String {
        self.tokens.concat()
    }
}

/// Strips framing artifacts from raw adapter output
#[derive(Debug, Clone)]
pub struct Sanitizer {
    prompt: u8,
    placeholders: Vec<Vec<String>>,
}

impl Sanitizer {
    /// Create a sanitizer for the given prompt byte and placeholder phrases
    pub fn new<S: AsRef<str>>(prompt: u8, placeholders: &[S]) -> Self {
        let placeholders = placeholders
            .iter()
            .map(|phrase| {
                phrase
                    .as_ref()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|words| !words.is_empty())
            .collect();

        Self {
            prompt,
            placeholders,
        }
    }

    /// Clean a raw frame.
    ///
    /// `echo` is the command string that was sent; it is removed from the
    /// front of the response when the adapter repeated it.
    pub fn sanitize(&self, frame: &RawFrame, echo: Option<&str>) -> CleanedResponse {
        let text = String::from_utf8_lossy(frame.as_bytes());
        let prompt = char::from(self.prompt);

        let mut tokens: Vec<String> = text
            .split(|c: char| c.is_whitespace() || c.is_control() || c == prompt)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();

        for phrase in &self.placeholders {
            remove_phrase(&mut tokens, phrase);
        }

        if let Some(echo) = echo {
            strip_echo(&mut tokens, echo);
        }

        debug!("Sanitized response into {} tokens", tokens.len());
        CleanedResponse::new(tokens)
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT, DEFAULT_PLACEHOLDERS)
    }
}

/// Token comparison ignoring case and surrounding dots
fn same_word(token: &str, word: &str) -> bool {
    token
        .trim_matches('.')
        .eq_ignore_ascii_case(word.trim_matches('.'))
}

fn remove_phrase(tokens: &mut Vec<String>, phrase: &[String]) {
    let n = phrase.len();
    let mut i = 0;
    while i + n <= tokens.len() {
        let matched = tokens[i..i + n]
            .iter()
            .zip(phrase)
            .all(|(token, word)| same_word(token, word));
        if matched {
            tokens.drain(i..i + n);
        } else {
            i += 1;
        }
    }
}

fn strip_echo(tokens: &mut Vec<String>, echo: &str) {
    let echo: String = echo.split_whitespace().collect();
    if echo.is_empty() {
        return;
    }

    let mut seen = String::new();
    let mut echo_tokens = None;
    for (i, token) in tokens.iter().enumerate() {
        seen.push_str(token);
        match echo.get(..seen.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(&seen) => {}
            _ => return,
        }
        if seen.len() == echo.len() {
            echo_tokens = Some(i + 1);
            break;
        }
    }

    if let Some(n) = echo_tokens {
        tokens.drain(..n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(text: &str) -> RawFrame {
        RawFrame::new(text.as_bytes().to_vec(), DEFAULT_PROMPT)
    }

    #[test]
    fn test_strips_prompt_and_whitespace() {
        let cleaned = Sanitizer::default().sanitize(&frame("41 0F 40\r\r>"), None);
        assert_eq!(cleaned.tokens(), ["41", "0F", "40"]);
    }

    #[test]
    fn test_prompt_glued_to_last_token() {
        let cleaned = Sanitizer::default().sanitize(&frame("41 0F 40>"), None);
        assert_eq!(cleaned.compact(), "410F40");
    }

    #[test]
    fn test_removes_searching_placeholder() {
        let cleaned = Sanitizer::default().sanitize(&frame("SEARCHING...\r41 0D 32\r\r>"), None);
        assert_eq!(cleaned.joined(), "41 0D 32");

        let cleaned = Sanitizer::default().sanitize(&frame("searching\r41 0D 32>"), None);
        assert_eq!(cleaned.joined(), "41 0D 32");
    }

    #[test]
    fn test_removes_multi_word_placeholder() {
        let cleaned = Sanitizer::default().sanitize(&frame("BUS INIT: ...OK\r41 05 7B\r>"), None);
        assert_eq!(cleaned.joined(), "41 05 7B");
    }

    #[test]
    fn test_keeps_failed_bus_init() {
        let cleaned = Sanitizer::default().sanitize(&frame("BUS INIT: ...ERROR\r>"), None);
        assert_eq!(cleaned.joined(), "BUS INIT: ...ERROR");
    }

    #[test]
    fn test_strips_compact_echo() {
        let cleaned = Sanitizer::default().sanitize(&frame("010F\r41 0F 40\r\r>"), Some("010F"));
        assert_eq!(cleaned.joined(), "41 0F 40");
    }

    #[test]
    fn test_strips_spaced_echo() {
        let cleaned = Sanitizer::default().sanitize(&frame("01 0f\r41 0F 40>"), Some("010F"));
        assert_eq!(cleaned.joined(), "41 0F 40");
    }

    #[test]
    fn test_leaves_response_without_echo() {
        let cleaned = Sanitizer::default().sanitize(&frame("41 0F 40>"), Some("010F"));
        assert_eq!(cleaned.joined(), "41 0F 40");
    }

    #[test]
    fn test_empty_frame() {
        let cleaned = Sanitizer::default().sanitize(&frame(">"), None);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn test_fault_text_passes_through() {
        let cleaned = Sanitizer::default().sanitize(&frame("NO DATA\r\r>"), Some("010F"));
        assert_eq!(cleaned.tokens(), ["NO", "DATA"]);
    }
}
