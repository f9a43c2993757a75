//! Agents and team affiliation.
//!
//! Agent identity and creation are owned by the roster; lifecycle managers
//! only ever change status and task through the roster boundary.

use serde::{Deserialize, Serialize};

/// Team affiliation for agents and log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Team {
    /// Offensive agents
    Red,
    /// Defensive agents
    Blue,
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Red => write!(f, "RED"),
            Self::Blue => write!(f, "BLUE"),
        }
    }
}

/// Activity state of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentStatus {
    /// Available for assignment
    #[default]
    Idle,
    /// Preparing an action
    Planning,
    /// Carrying out an attack
    Executing,
    /// Examining a detected threat
    Analyzing,
    /// Applying a mitigation
    Mitigating,
    /// Blocked on an external dependency
    Waiting,
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "IDLE",
            Self::Planning => "PLANNING",
            Self::Executing => "EXECUTING",
            Self::Analyzing => "ANALYZING",
            Self::Mitigating => "MITIGATING",
            Self::Waiting => "WAITING",
        };
        write!(f, "{s}")
    }
}

/// Newtype wrapper for roster agent identifiers (e.g. `"r-1"`, `"b-2"`).
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    /// Creates a new `AgentId` from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A simulated red or blue team agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    /// Roster identifier
    pub id: AgentId,
    /// Display name (e.g. `"Sentinel-AI"`)
    pub name: String,
    /// Role description (e.g. `"Threat Detection System"`)
    pub role: String,
    /// Team affiliation
    pub team: Team,
    /// Current activity state
    pub status: AgentStatus,
    /// Human-readable description of the current task
    pub current_task: String,
    /// Efficiency score, 0–100
    pub efficiency: u8,
    /// Accumulated log lines
    pub logs: Vec<String>,
}

impl Agent {
    /// Creates a trained agent in the idle state with seeded log lines
    /// describing its specializations.
    #[must_use]
    pub fn trained(
        id: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
        team: Team,
        specializations: &[&str],
        efficiency: u8,
    ) -> Self {
        let name = name.into();
        let logs = vec![
            format!("Agent {name} initialized"),
            format!("Specialization: {}", specializations.join(", ")),
            "Training complete - Ready for deployment".to_string(),
        ];
        Self {
            id: AgentId::new(id),
            name,
            role: role.into(),
            team,
            status: AgentStatus::Idle,
            current_task: "Awaiting orders".to_string(),
            efficiency: efficiency.min(100),
            logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trained_agent_starts_idle() {
        let agent = Agent::trained(
            "b-1",
            "Sentinel-AI",
            "Threat Detection System",
            Team::Blue,
            &["SIEM Analysis", "Anomaly Detection"],
            92,
        );
        assert_eq!(agent.status, AgentStatus::Idle);
        assert_eq!(agent.current_task, "Awaiting orders");
        assert_eq!(agent.logs.len(), 3);
        assert!(agent.logs[1].contains("SIEM Analysis, Anomaly Detection"));
    }

    #[test]
    fn efficiency_is_clamped() {
        let agent = Agent::trained("r-1", "x", "y", Team::Red, &[], 250);
        assert_eq!(agent.efficiency, 100);
    }

    #[test]
    fn status_display_is_uppercase() {
        assert_eq!(AgentStatus::Mitigating.to_string(), "MITIGATING");
        assert_eq!(Team::Blue.to_string(), "BLUE");
    }
}
