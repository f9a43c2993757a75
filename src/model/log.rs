//! Log entries produced by lifecycle transitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::agent::Team;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Routine information
    Info,
    /// Noteworthy but expected activity
    Warn,
    /// Failure or hostile activity
    Critical,
    /// A defensive win
    Success,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Critical => "CRITICAL",
            Self::Success => "SUCCESS",
        };
        write!(f, "{s}")
    }
}

/// A timestamped entry destined for the bounded event log and any
/// caller-supplied sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Entry identity
    pub id: Uuid,
    /// When the entry was produced
    pub timestamp: DateTime<Utc>,
    /// Source label, usually an agent name
    pub source: String,
    /// Severity
    pub level: LogLevel,
    /// Message text
    pub message: String,
    /// Team the entry is attributed to
    pub team: Team,
}

impl LogEntry {
    /// Creates an entry stamped with the current time.
    #[must_use]
    pub fn new(source: impl Into<String>, level: LogLevel, message: impl Into<String>, team: Team) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            level,
            message: message.into(),
            team,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_carries_source_and_team() {
        let entry = LogEntry::new("Sentinel-AI", LogLevel::Warn, "Threat detected", Team::Blue);
        assert_eq!(entry.source, "Sentinel-AI");
        assert_eq!(entry.team, Team::Blue);
        assert_eq!(entry.level.to_string(), "WARN");
    }
}
