//! Attack records and their forward-only status progression.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::agent::AgentId;

/// The fixed set of staged attack kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    /// Malicious SQL through unsanitized inputs
    SqlInjection,
    /// Client-side script injection
    CrossSiteScripting,
    /// Systematic credential guessing
    BruteForce,
    /// Credential harvesting via social engineering
    Phishing,
    /// Staged file-encryption scenario
    Ransomware,
    /// Traffic flooding for service disruption
    DenialOfService,
    /// Escalation to elevated system privileges
    PrivilegeEscalation,
    /// Extraction of sensitive data
    DataExfiltration,
}

impl AttackKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 8] = [
        Self::SqlInjection,
        Self::CrossSiteScripting,
        Self::BruteForce,
        Self::Phishing,
        Self::Ransomware,
        Self::DenialOfService,
        Self::PrivilegeEscalation,
        Self::DataExfiltration,
    ];

    /// Short description shown alongside the kind.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::SqlInjection => {
                "Inject malicious SQL queries to bypass authentication or extract data"
            }
            Self::CrossSiteScripting => {
                "Inject client-side scripts to steal cookies or session tokens"
            }
            Self::BruteForce => {
                "Systematically attempt password combinations to gain unauthorized access"
            }
            Self::Phishing => {
                "Social engineering attack to harvest credentials via fake login pages"
            }
            Self::Ransomware => "Simulate file encryption and ransom demand scenarios",
            Self::DenialOfService => "Overwhelm target with traffic to cause service disruption",
            Self::PrivilegeEscalation => {
                "Exploit vulnerabilities to gain elevated system privileges"
            }
            Self::DataExfiltration => "Extract sensitive data from the target system",
        }
    }
}

impl std::fmt::Display for AttackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SqlInjection => "SQL Injection",
            Self::CrossSiteScripting => "Cross-Site Scripting",
            Self::BruteForce => "Brute Force",
            Self::Phishing => "Phishing Campaign",
            Self::Ransomware => "Ransomware Simulation",
            Self::DenialOfService => "DDoS Attack",
            Self::PrivilegeEscalation => "Privilege Escalation",
            Self::DataExfiltration => "Data Exfiltration",
        };
        write!(f, "{s}")
    }
}

/// Status of an attack record.
///
/// The ordered prefix `[Initiated, InProgress, Detected]` is the only
/// path `advance` walks; `Blocked` and `Success` are terminal branches
/// applied externally once a paired defense resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttackStatus {
    /// Attack created, not yet progressing
    Initiated,
    /// Attack underway against the target
    InProgress,
    /// Attack noticed by the defensive side
    Detected,
    /// Terminal: a defense succeeded against this attack
    Blocked,
    /// Terminal: the paired defense failed
    Success,
}

impl AttackStatus {
    /// Returns the next status in the forward progression, or `None` at
    /// the end of the ordered prefix and for terminal statuses.
    #[must_use]
    pub const fn next_in_progression(self) -> Option<Self> {
        match self {
            Self::Initiated => Some(Self::InProgress),
            Self::InProgress => Some(Self::Detected),
            Self::Detected | Self::Blocked | Self::Success => None,
        }
    }

    /// Whether this status ends the record's lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Blocked | Self::Success)
    }
}

impl std::fmt::Display for AttackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Initiated => "INITIATED",
            Self::InProgress => "IN_PROGRESS",
            Self::Detected => "DETECTED",
            Self::Blocked => "BLOCKED",
            Self::Success => "SUCCESS",
        };
        write!(f, "{s}")
    }
}

/// Newtype wrapper for attack record identities.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct AttackId(pub Uuid);

impl AttackId {
    /// Generates a fresh random identity.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for AttackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tracked offensive action instance.
///
/// Records are immutable snapshots: [`advanced`](Self::advanced) and
/// [`resolved`](Self::resolved) return a new record and never mutate the
/// receiver. Records are retained for the session and never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackRecord {
    /// Record identity
    pub id: AttackId,
    /// Kind of attack staged
    pub kind: AttackKind,
    /// The red agent that launched it
    pub agent_id: AgentId,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Narrative attack strategy
    pub strategy: String,
    /// Generated payload text
    pub payload: String,
    /// Expected impact narrative
    pub expected_impact: String,
    /// Current status
    pub status: AttackStatus,
    /// Ordered human-readable log lines
    pub logs: Vec<String>,
}

impl AttackRecord {
    /// Returns a copy advanced to the next status in the forward
    /// progression, with a log line naming the new status.
    ///
    /// At `Detected` (the end of the ordered prefix) and at terminal
    /// statuses this returns the record unchanged. Never fails.
    #[must_use]
    pub fn advanced(&self, at: DateTime<Utc>) -> Self {
        self.status.next_in_progression().map_or_else(
            || self.clone(),
            |next| {
                let mut out = self.clone();
                out.status = next;
                out.logs.push(format!("[{}] Status: {next}", at.format("%H:%M:%S")));
                out
            },
        )
    }

    /// Returns a copy moved to a terminal status (`Blocked` or `Success`).
    ///
    /// Only a `Detected` record can be resolved; any other status returns
    /// the record unchanged.
    #[must_use]
    pub fn resolved(&self, terminal: AttackStatus, at: DateTime<Utc>) -> Self {
        if self.status != AttackStatus::Detected || !terminal.is_terminal() {
            return self.clone();
        }
        let mut out = self.clone();
        out.status = terminal;
        out.logs
            .push(format!("[{}] Status: {terminal}", at.format("%H:%M:%S")));
        out
    }
}
