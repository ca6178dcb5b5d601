use serde::{Deserialize, Serialize};

/// Wire input: one structured log record as submitted over HTTP or TCP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLog {
    pub timestamp: String,
    pub level: String,
    pub source: String,
    pub message: String,
}
