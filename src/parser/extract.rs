//! Pure field-extraction functions used by each parser worker. Parsing is
//! purely functional and touches no shared state, so workers need no mutual
//! exclusion (`spec.md` §4.2).

use regex::Regex;
use std::sync::OnceLock;

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];
const MIN_KEYWORD_LEN: usize = 4;

fn ip_regex() -> &'static Regex {
    static IP_REGEX: OnceLock<Regex> = OnceLock::new();
    IP_REGEX.get_or_init(|| Regex::new(r"\b(?:\d{1,3}\.){3}\d{1,3}\b").expect("valid IP regex"))
}

fn error_code_regex() -> &'static Regex {
    static ERROR_CODE_REGEX: OnceLock<Regex> = OnceLock::new();
    ERROR_CODE_REGEX.get_or_init(|| {
        Regex::new(r"\b(?:ERROR|FATAL|CRITICAL|[45]\d{2})\b").expect("valid error code regex")
    })
}

/// Leftmost IPv4 dotted-quad in `message`, or empty if none.
pub fn extract_ip(message: &str) -> String {
    ip_regex()
        .find(message)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Leftmost match of the level tokens or a 4xx/5xx-style code, or empty.
pub fn extract_error_code(message: &str) -> String {
    error_code_regex()
        .find(message)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Lowercased whitespace-split tokens with trailing punctuation stripped,
/// keeping only tokens longer than `MIN_KEYWORD_LEN - 1` characters.
/// Duplicates are preserved; order matches first occurrence in `message`.
pub fn extract_keywords(message: &str) -> Vec<String> {
    message
        .split_whitespace()
        .map(|token| token.trim_end_matches(TRAILING_PUNCTUATION).to_lowercase())
        .filter(|token| token.len() >= MIN_KEYWORD_LEN)
        .collect()
}
