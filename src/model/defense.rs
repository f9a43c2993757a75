//! Defense records bound to exactly one attack.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::agent::AgentId;
use super::attack::AttackId;

/// Status of a defense record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefenseStatus {
    /// Examining the detected attack
    Analyzing,
    /// Applying the selected mitigation
    Mitigating,
    /// Terminal: the attack was stopped
    Blocked,
    /// Terminal: mitigation did not hold
    Failed,
}

impl DefenseStatus {
    /// Whether this status ends the record's lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Blocked | Self::Failed)
    }
}

impl std::fmt::Display for DefenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Analyzing => "ANALYZING",
            Self::Mitigating => "MITIGATING",
            Self::Blocked => "BLOCKED",
            Self::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}

/// Newtype wrapper for defense record identities.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct DefenseId(pub Uuid);

impl DefenseId {
    /// Generates a fresh random identity.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for DefenseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tracked defensive response to exactly one attack record.
///
/// At most one defense record exists per attack identity; the lifecycle
/// manager enforces the deduplication on creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseRecord {
    /// Record identity
    pub id: DefenseId,
    /// The attack this defense responds to
    pub attack_id: AttackId,
    /// The blue agent handling the response
    pub agent_id: AgentId,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Threat analysis narrative
    pub analysis: String,
    /// Selected mitigation narrative
    pub mitigation: String,
    /// Confidence score, 0–100
    pub confidence: u8,
    /// Current status
    pub status: DefenseStatus,
}

impl DefenseRecord {
    /// Returns a copy advanced one step.
    ///
    /// `Analyzing` moves to `Mitigating` unconditionally; `Mitigating`
    /// moves to `Blocked` when `success` is true, else `Failed`. Terminal
    /// statuses are absorbing: the record is returned unchanged.
    #[must_use]
    pub fn advanced(&self, success: bool) -> Self {
        let mut out = self.clone();
        match self.status {
            DefenseStatus::Analyzing => out.status = DefenseStatus::Mitigating,
            DefenseStatus::Mitigating => {
                out.status = if success {
                    DefenseStatus::Blocked
                } else {
                    DefenseStatus::Failed
                };
            }
            DefenseStatus::Blocked | DefenseStatus::Failed => {}
        }
        out
    }
}
