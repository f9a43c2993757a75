//! Scenario configuration schema.
//!
//! A scenario YAML file describes one exercise: the target, stage
//! delays, the defense outcome draw, log capacities, the agent rosters,
//! and the workflow graph. Every section has defaults mirroring the
//! reference behavior, so an empty file is a valid scenario.

use serde::{Deserialize, Serialize};

use crate::model::{Agent, NodeId, NodeRole, NodeStatus, Team, WorkflowEdge, WorkflowNode};
use crate::orchestrator::OutcomeSource;

/// Root scenario document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Exercise identity
    #[serde(default)]
    pub exercise: ExerciseSection,
    /// Stage delays
    #[serde(default)]
    pub timings: TimingsSection,
    /// Defense outcome draw
    #[serde(default)]
    pub defense: DefenseSection,
    /// Log capacities
    #[serde(default)]
    pub logs: LogSection,
    /// Agent rosters
    #[serde(default)]
    pub agents: AgentsSection,
    /// Workflow graph
    #[serde(default)]
    pub workflow: WorkflowSection,
}

/// Exercise identity and target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExerciseSection {
    /// Exercise name, used in emitted events
    #[serde(default = "default_exercise_name")]
    pub name: String,
    /// Target description handed to attack planning
    #[serde(default = "default_target")]
    pub target: String,
}

fn default_exercise_name() -> String {
    "baseline drill".to_string()
}

fn default_target() -> String {
    "Enterprise Web Application".to_string()
}

impl Default for ExerciseSection {
    fn default() -> Self {
        Self {
            name: default_exercise_name(),
            target: default_target(),
        }
    }
}

/// Stage delays as humantime strings (e.g. `"2s"`, `"500ms"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimingsSection {
    /// Delay to the attack's first advance
    #[serde(default = "default_attack_advance")]
    pub attack_advance: String,
    /// Delay until the launching agent returns to idle
    #[serde(default = "default_agent_reset")]
    pub agent_reset: String,
    /// Delay to the defense's mitigating step
    #[serde(default = "default_defense_advance")]
    pub defense_advance: String,
}

fn default_attack_advance() -> String {
    "2s".to_string()
}

fn default_agent_reset() -> String {
    "5s".to_string()
}

fn default_defense_advance() -> String {
    "2s".to_string()
}

impl Default for TimingsSection {
    fn default() -> Self {
        Self {
            attack_advance: default_attack_advance(),
            agent_reset: default_agent_reset(),
            defense_advance: default_defense_advance(),
        }
    }
}

/// Defense outcome draw parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefenseSection {
    /// Probability a mitigation holds
    #[serde(default = "default_success_probability")]
    pub success_probability: f64,
    /// Fixed RNG seed for reproducible runs; omitted means OS-seeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

const fn default_success_probability() -> f64 {
    OutcomeSource::DEFAULT_SUCCESS_PROBABILITY
}

impl Default for DefenseSection {
    fn default() -> Self {
        Self {
            success_probability: default_success_probability(),
            seed: None,
        }
    }
}

/// Retained entry counts for the bounded logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// Session-wide log capacity
    #[serde(default = "default_session_capacity")]
    pub session_capacity: usize,
    /// Per-workflow-run log capacity
    #[serde(default = "default_workflow_capacity")]
    pub workflow_capacity: usize,
}

const fn default_session_capacity() -> usize {
    crate::eventlog::SESSION_LOG_CAPACITY
}

const fn default_workflow_capacity() -> usize {
    crate::eventlog::WORKFLOW_LOG_CAPACITY
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            session_capacity: default_session_capacity(),
            workflow_capacity: default_workflow_capacity(),
        }
    }
}

/// One agent definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Roster id (e.g. `"r-1"`)
    pub id: String,
    /// Display name
    pub name: String,
    /// Role description
    pub role: String,
    /// Specializations listed in the agent's seeded log
    #[serde(default)]
    pub specializations: Vec<String>,
    /// Efficiency score, 0–100
    #[serde(default = "default_efficiency")]
    pub efficiency: u8,
}

const fn default_efficiency() -> u8 {
    90
}

/// Red and blue rosters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentsSection {
    /// Offensive agents
    #[serde(default = "default_red_agents")]
    pub red: Vec<AgentConfig>,
    /// Defensive agents
    #[serde(default = "default_blue_agents")]
    pub blue: Vec<AgentConfig>,
}

impl Default for AgentsSection {
    fn default() -> Self {
        Self {
            red: default_red_agents(),
            blue: default_blue_agents(),
        }
    }
}

fn agent(id: &str, name: &str, role: &str, specializations: &[&str], efficiency: u8) -> AgentConfig {
    AgentConfig {
        id: id.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        specializations: specializations.iter().map(ToString::to_string).collect(),
        efficiency,
    }
}

fn default_red_agents() -> Vec<AgentConfig> {
    vec![
        agent(
            "r-1",
            "Recon-Alpha",
            "Reconnaissance Specialist",
            &["Network Scanning", "Port Discovery", "Service Enumeration", "OSINT"],
            94,
        ),
        agent(
            "r-2",
            "Exploit-Dev",
            "Exploitation Engineer",
            &["SQL Injection", "XSS", "Buffer Overflow", "Zero-Day Research"],
            91,
        ),
        agent(
            "r-3",
            "Social-Engineer",
            "Social Engineering Specialist",
            &["Phishing", "Pretexting", "Credential Harvesting", "OSINT"],
            88,
        ),
        agent(
            "r-4",
            "Crypto-Breaker",
            "Cryptanalysis Expert",
            &["Password Cracking", "Brute Force", "Rainbow Tables", "Hash Analysis"],
            90,
        ),
    ]
}

fn default_blue_agents() -> Vec<AgentConfig> {
    vec![
        agent(
            "b-1",
            "Sentinel-AI",
            "Threat Detection System",
            &["SIEM Analysis", "Anomaly Detection", "Pattern Recognition", "Real-time Monitoring"],
            95,
        ),
        agent(
            "b-2",
            "Guardian-Firewall",
            "Perimeter Defense",
            &["Traffic Filtering", "IP Blocking", "Rate Limiting", "DDoS Mitigation"],
            92,
        ),
        agent(
            "b-3",
            "Forensic-Bot",
            "Incident Response",
            &["Log Analysis", "Attack Attribution", "Evidence Collection", "Root Cause Analysis"],
            89,
        ),
        agent(
            "b-4",
            "Patch-Master",
            "Vulnerability Management",
            &["CVE Monitoring", "Patch Deployment", "Configuration Hardening", "Compliance"],
            87,
        ),
    ]
}

/// One workflow node definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    /// Node id (e.g. `"red-1"`)
    pub id: String,
    /// Node role
    pub role: NodeRole,
    /// Display label; drives keyword routing in the no-backend path
    pub label: String,
    /// Optional role prose handed to the reasoning backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_label: Option<String>,
}

/// One workflow edge definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeConfig {
    /// Upstream node id
    pub source: String,
    /// Downstream node id
    pub target: String,
}

/// Workflow graph definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowSection {
    /// Nodes, in declaration order
    #[serde(default = "default_workflow_nodes")]
    pub nodes: Vec<NodeConfig>,
    /// Edges defining the traversal chain
    #[serde(default = "default_workflow_edges")]
    pub edges: Vec<EdgeConfig>,
    /// Input text handed to the first node
    #[serde(default = "default_initial_input")]
    pub initial_input: String,
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            nodes: default_workflow_nodes(),
            edges: default_workflow_edges(),
            initial_input: default_initial_input(),
        }
    }
}

fn node(id: &str, role: NodeRole, label: &str, sub_label: Option<&str>) -> NodeConfig {
    NodeConfig {
        id: id.to_string(),
        role,
        label: label.to_string(),
        sub_label: sub_label.map(ToString::to_string),
    }
}

fn default_workflow_nodes() -> Vec<NodeConfig> {
    vec![
        node("data-1", NodeRole::Data, "Target System", None),
        node("red-1", NodeRole::Agent, "Recon Agent", Some("Network reconnaissance")),
        node("red-2", NodeRole::Agent, "Exploit Agent", Some("Exploit development")),
        node("blue-1", NodeRole::Agent, "Detection Agent", Some("Anomaly detection")),
        node("blue-2", NodeRole::Agent, "Response Agent", Some("Incident response")),
        node("data-2", NodeRole::Data, "Security Logs", None),
    ]
}

fn default_workflow_edges() -> Vec<EdgeConfig> {
    let chain = ["data-1", "red-1", "red-2", "blue-1", "blue-2", "data-2"];
    chain
        .windows(2)
        .map(|pair| EdgeConfig {
            source: pair[0].to_string(),
            target: pair[1].to_string(),
        })
        .collect()
}

fn default_initial_input() -> String {
    "Begin assessment of the target system".to_string()
}

// ============================================================================
// Conversions into model types
// ============================================================================

impl AgentConfig {
    /// Builds the runtime agent for a team.
    #[must_use]
    pub fn build(&self, team: Team) -> Agent {
        let specializations: Vec<&str> =
            self.specializations.iter().map(String::as_str).collect();
        Agent::trained(&self.id, &self.name, &self.role, team, &specializations, self.efficiency)
    }
}

impl WorkflowSection {
    /// Builds the runtime node list, all idle.
    #[must_use]
    pub fn build_nodes(&self) -> Vec<WorkflowNode> {
        self.nodes
            .iter()
            .map(|n| WorkflowNode {
                id: NodeId::new(&n.id),
                role: n.role,
                label: n.label.clone(),
                sub_label: n.sub_label.clone(),
                status: NodeStatus::Idle,
            })
            .collect()
    }

    /// Builds the runtime edge list.
    #[must_use]
    pub fn build_edges(&self) -> Vec<WorkflowEdge> {
        self.edges
            .iter()
            .map(|e| WorkflowEdge {
                source: NodeId::new(&e.source),
                target: NodeId::new(&e.target),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_full_defaults() {
        let config: ScenarioConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.exercise.name, "baseline drill");
        assert_eq!(config.timings.attack_advance, "2s");
        assert!((config.defense.success_probability - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.logs.session_capacity, 100);
        assert_eq!(config.agents.red.len(), 4);
        assert_eq!(config.agents.blue.len(), 4);
        assert_eq!(config.workflow.nodes.len(), 6);
        assert_eq!(config.workflow.edges.len(), 5);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: std::result::Result<ScenarioConfig, _> =
            serde_yaml::from_str("exercise:\n  name: x\n  typo_field: y\n");
        assert!(result.is_err());
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let yaml = "defense:\n  success_probability: 0.5\n  seed: 7\n";
        let config: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
        assert!((config.defense.success_probability - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.defense.seed, Some(7));
        assert_eq!(config.timings.agent_reset, "5s");
    }

    #[test]
    fn agent_config_builds_runtime_agent() {
        let config = agent("b-1", "Sentinel-AI", "Detection", &["SIEM"], 95);
        let built = config.build(Team::Blue);
        assert_eq!(built.team, Team::Blue);
        assert_eq!(built.efficiency, 95);
        assert!(built.logs[1].contains("SIEM"));
    }

    #[test]
    fn workflow_section_builds_model_types() {
        let section = WorkflowSection::default();
        let nodes = section.build_nodes();
        let edges = section.build_edges();
        assert_eq!(nodes.len(), 6);
        assert!(nodes.iter().all(|n| n.status == NodeStatus::Idle));
        assert_eq!(edges[0].source, NodeId::new("data-1"));
        assert_eq!(edges[0].target, NodeId::new("red-1"));
    }
}
