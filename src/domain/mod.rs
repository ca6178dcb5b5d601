mod alert;
mod parsed_log;
mod raw_log;
mod rule;

pub use alert::{Alert, AlertMetadata};
pub use parsed_log::ParsedLog;
pub use raw_log::RawLog;
pub use rule::{Rule, Severity, DEFAULT_RULES};
