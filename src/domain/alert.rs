use super::{ParsedLog, Severity};
use serde::{Deserialize, Serialize};

/// Metadata attached to every Alert. The key set is fixed by the spec, so
/// this is a typed struct rather than an untyped map; it serializes to the
/// same JSON object the spec's schema names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMetadata {
    pub rule_name: String,
    pub is_known_pattern: bool,
    pub count_in_window: u64,
}

/// A structured detection event produced by a single rule firing on a
/// single `ParsedLog`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub timestamp: String,
    pub severity: Severity,
    pub reason: String,
    pub log: ParsedLog,
    pub metadata: AlertMetadata,
}

impl Alert {
    /// Construct an Alert firing `rule_name` at `severity` for `log`, stamped
    /// with the current time in RFC3339.
    pub fn new(
        severity: Severity,
        rule_name: &str,
        log: ParsedLog,
        is_known_pattern: bool,
        count_in_window: u64,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            severity,
            reason: rule_name.to_string(),
            log,
            metadata: AlertMetadata {
                rule_name: rule_name.to_string(),
                is_known_pattern,
                count_in_window,
            },
        }
    }
}
