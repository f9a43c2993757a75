//! Scenario loading and validation.
//!
//! Loading is load → parse → validate: parse failures surface with the
//! file path, and validation collects every issue before failing so a
//! scenario author sees the full list at once. Warnings are logged but
//! do not block loading.

pub mod schema;

use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::error::{ConfigError, CyberdrillError, Severity, ValidationIssue};
use crate::orchestrator::StageTimings;

pub use schema::ScenarioConfig;

/// Loads and validates a scenario file.
///
/// # Errors
///
/// Returns [`ConfigError::MissingFile`] when the path does not exist,
/// [`ConfigError::ParseError`] for YAML failures, and
/// [`ConfigError::ValidationError`] when validation finds errors.
pub fn load(path: &Path) -> Result<ScenarioConfig, CyberdrillError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile {
            path: path.to_path_buf(),
        }
        .into());
    }

    let raw = std::fs::read_to_string(path)?;
    let config: ScenarioConfig =
        serde_yaml::from_str(&raw).map_err(|err| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    let issues = validate(&config);
    for issue in issues.iter().filter(|i| i.severity == Severity::Warning) {
        warn!(%issue, "scenario warning");
    }
    let errors: Vec<ValidationIssue> = issues
        .into_iter()
        .filter(|i| i.severity == Severity::Error)
        .collect();
    if !errors.is_empty() {
        return Err(ConfigError::ValidationError {
            path: path.display().to_string(),
            errors,
        }
        .into());
    }

    Ok(config)
}

/// Validates a scenario, collecting every issue found.
#[must_use]
pub fn validate(config: &ScenarioConfig) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let error = |path: &str, message: String| ValidationIssue {
        path: path.to_string(),
        message,
        severity: Severity::Error,
    };
    let warning = |path: &str, message: String| ValidationIssue {
        path: path.to_string(),
        message,
        severity: Severity::Warning,
    };

    if config.exercise.name.is_empty() {
        issues.push(warning("exercise.name", "name is empty".to_string()));
    }

    let probability = config.defense.success_probability;
    if !(0.0..=1.0).contains(&probability) || probability.is_nan() {
        issues.push(error(
            "defense.success_probability",
            format!("must be between 0.0 and 1.0, got {probability}"),
        ));
    }

    for (path, value) in [
        ("timings.attack_advance", &config.timings.attack_advance),
        ("timings.agent_reset", &config.timings.agent_reset),
        ("timings.defense_advance", &config.timings.defense_advance),
    ] {
        if let Err(err) = humantime::parse_duration(value) {
            issues.push(error(path, format!("invalid duration '{value}': {err}")));
        }
    }

    if config.logs.session_capacity == 0 {
        issues.push(error("logs.session_capacity", "must be at least 1".to_string()));
    }
    if config.logs.workflow_capacity == 0 {
        issues.push(error("logs.workflow_capacity", "must be at least 1".to_string()));
    }

    for (team, agents) in [("red", &config.agents.red), ("blue", &config.agents.blue)] {
        let mut seen = std::collections::HashSet::new();
        for (i, agent) in agents.iter().enumerate() {
            if !seen.insert(agent.id.as_str()) {
                issues.push(error(
                    &format!("agents.{team}[{i}].id"),
                    format!("duplicate agent id '{}'", agent.id),
                ));
            }
            if agent.efficiency > 100 {
                issues.push(warning(
                    &format!("agents.{team}[{i}].efficiency"),
                    format!("efficiency {} exceeds 100 and will be clamped", agent.efficiency),
                ));
            }
        }
    }
    if config.agents.blue.is_empty() {
        issues.push(warning(
            "agents.blue",
            "no blue agents; detected attacks will go unanswered".to_string(),
        ));
    }

    let mut node_ids = std::collections::HashSet::new();
    for (i, node) in config.workflow.nodes.iter().enumerate() {
        if !node_ids.insert(node.id.as_str()) {
            issues.push(error(
                &format!("workflow.nodes[{i}].id"),
                format!("duplicate node id '{}'", node.id),
            ));
        }
    }
    if config.workflow.nodes.is_empty() {
        issues.push(warning("workflow.nodes", "no workflow nodes defined".to_string()));
    }
    for (i, edge) in config.workflow.edges.iter().enumerate() {
        for (end, id) in [("source", &edge.source), ("target", &edge.target)] {
            if !node_ids.contains(id.as_str()) {
                issues.push(error(
                    &format!("workflow.edges[{i}].{end}"),
                    format!("unknown node id '{id}'"),
                ));
            }
        }
    }

    issues
}

impl ScenarioConfig {
    /// Converts the humantime delay strings into stage timings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unparseable
    /// duration; `validate` reports the same condition up front.
    pub fn stage_timings(&self) -> Result<StageTimings, CyberdrillError> {
        let parse = |field: &str, value: &str| -> Result<Duration, CyberdrillError> {
            humantime::parse_duration(value).map_err(|err| {
                ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                    expected: format!("a duration such as '2s' ({err})"),
                }
                .into()
            })
        };
        Ok(StageTimings {
            attack_advance: parse("timings.attack_advance", &self.timings.attack_advance)?,
            agent_reset: parse("timings.agent_reset", &self.timings.agent_reset)?,
            defense_advance: parse("timings.defense_advance", &self.timings.defense_advance)?,
        })
    }
}
