use super::ParsedLog;
use serde::{Deserialize, Serialize};

/// Alert severity. Serializes to the upper-case strings used on the wire
/// (`HIGH` / `MEDIUM` / `LOW`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// The upper-case wire spelling (`HIGH` / `MEDIUM` / `LOW`), used by the
    /// alerter's stdout banner line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "HIGH",
            Severity::Medium => "MEDIUM",
            Severity::Low => "LOW",
        }
    }
}

/// A named predicate over `ParsedLog` with an associated severity.
///
/// Predicates are plain function pointers rather than `Box<dyn Fn>`: none of
/// the rules below close over state, so there is nothing to box. The rule
/// set is immutable after startup and evaluated in the order it is declared.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub severity: Severity,
    pub predicate: fn(&ParsedLog) -> bool,
}

fn is_critical_level(log: &ParsedLog) -> bool {
    matches!(log.level.as_str(), "CRITICAL" | "FATAL")
}

fn is_5xx_error_code(log: &ParsedLog) -> bool {
    log.error_code.starts_with('5')
}

const SUSPICIOUS_KEYWORDS: &[&str] = &["attack", "breach", "unauthorized", "exploit", "malicious"];

fn has_suspicious_keyword(log: &ParsedLog) -> bool {
    log.keywords
        .iter()
        .any(|k| SUSPICIOUS_KEYWORDS.contains(&k.as_str()))
}

fn is_error_level(log: &ParsedLog) -> bool {
    log.level == "ERROR"
}

/// The default rule set, in registration order. Order is significant: it
/// determines both the order Alerts are enqueued for a single record and
/// the iteration order the analyzer uses to sample/update the Bloom filter
/// and window counter.
pub const DEFAULT_RULES: &[Rule] = &[
    Rule {
        name: "Critical Error Level",
        severity: Severity::High,
        predicate: is_critical_level,
    },
    Rule {
        name: "Error Code 5xx",
        severity: Severity::High,
        predicate: is_5xx_error_code,
    },
    Rule {
        name: "Suspicious Keywords",
        severity: Severity::Medium,
        predicate: has_suspicious_keyword,
    },
    Rule {
        name: "Error Rate Threshold",
        severity: Severity::Medium,
        predicate: is_error_level,
    },
];
