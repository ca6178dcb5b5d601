use super::RawLog;
use serde::{Deserialize, Serialize};

/// `RawLog` augmented with fields derived from `message` by the parser stage.
///
/// Field names on the wire match the alert schema documented for the alert
/// file (`Timestamp`, `Level`, `Source`, `Message`, `IP`, `ErrorCode`,
/// `Keywords`); the struct keeps idiomatic snake_case members internally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLog {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Level")]
    pub level: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "IP")]
    pub ip: String,
    #[serde(rename = "ErrorCode")]
    pub error_code: String,
    #[serde(rename = "Keywords")]
    pub keywords: Vec<String>,
}

impl ParsedLog {
    /// Build a `ParsedLog` from a `RawLog` plus its already-derived fields.
    /// `raw`'s four fields are carried through byte-identical.
    pub fn from_raw(raw: RawLog, ip: String, error_code: String, keywords: Vec<String>) -> Self {
        Self {
            timestamp: raw.timestamp,
            level: raw.level,
            source: raw.source,
            message: raw.message,
            ip,
            error_code,
            keywords,
        }
    }
}
