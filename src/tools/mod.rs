//! Simulated tool registry and invocation gateway.
//!
//! Declares the fixed set of tools available to pipeline steps and
//! executes them by name. Execution is total: every input, including an
//! unknown tool name or malformed arguments, produces a structured text
//! payload rather than an error.

pub mod args;
pub mod gateway;

use std::sync::LazyLock;

use indexmap::IndexMap;
use serde_json::json;

use crate::reasoning::ToolDeclaration;

pub use args::{ToolArgs, ToolArgsError};
pub use gateway::{LatencyProfile, ToolGateway};

/// Tool name: subnet scan for open ports and services.
pub const NETWORK_SCAN: &str = "network_scan";
/// Tool name: vulnerability database lookup for a service.
pub const CVE_LOOKUP: &str = "cve_lookup";
/// Tool name: simulated exploit payload generation.
pub const EXPLOIT_GENERATOR: &str = "exploit_generator";
/// Tool name: anomaly analysis over raw log lines.
pub const LOG_ANALYZER: &str = "log_analyzer";
/// Tool name: firewall rule update.
pub const FIREWALL_UPDATE: &str = "firewall_update";

/// Description and parameter schema for one registered tool.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Human-readable description
    pub description: &'static str,
    /// JSON parameter schema
    pub parameters: serde_json::Value,
}

/// The fixed tool registry, in declaration order.
static REGISTRY: LazyLock<IndexMap<&'static str, ToolSpec>> = LazyLock::new(|| {
    IndexMap::from([
        (
            NETWORK_SCAN,
            ToolSpec {
                description: "Scans a target subnet for open ports and services.",
                parameters: json!({
                    "type": "object",
                    "properties": { "target": { "type": "string" } },
                    "required": ["target"],
                }),
            },
        ),
        (
            CVE_LOOKUP,
            ToolSpec {
                description:
                    "Searches the National Vulnerability Database for CVEs related to a service.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "service": { "type": "string" },
                        "version": { "type": "string" },
                    },
                    "required": ["service"],
                }),
            },
        ),
        (
            EXPLOIT_GENERATOR,
            ToolSpec {
                description: "Simulates generating a payload for a specific vulnerability.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "cve": { "type": "string" },
                        "targetType": { "type": "string" },
                    },
                    "required": ["cve"],
                }),
            },
        ),
        (
            LOG_ANALYZER,
            ToolSpec {
                description: "Analyzes raw log lines for anomaly patterns.",
                parameters: json!({
                    "type": "object",
                    "properties": { "logs": { "type": "string" } },
                    "required": ["logs"],
                }),
            },
        ),
        (
            FIREWALL_UPDATE,
            ToolSpec {
                description: "Updates firewall rules to block specific IPs or patterns.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "rule": { "type": "string" },
                        "action": { "type": "string" },
                    },
                    "required": ["rule"],
                }),
            },
        ),
    ])
});

/// Returns the registry of available tools, in declaration order.
#[must_use]
pub fn registry() -> &'static IndexMap<&'static str, ToolSpec> {
    &REGISTRY
}

/// Returns the full tool declaration set for the reasoning backend.
#[must_use]
pub fn declarations() -> Vec<ToolDeclaration> {
    REGISTRY
        .iter()
        .map(|(name, spec)| ToolDeclaration {
            name: (*name).to_string(),
            description: spec.description.to_string(),
            parameters: spec.parameters.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_declares_five_tools_in_order() {
        let names: Vec<&str> = registry().keys().copied().collect();
        assert_eq!(
            names,
            vec![
                NETWORK_SCAN,
                CVE_LOOKUP,
                EXPLOIT_GENERATOR,
                LOG_ANALYZER,
                FIREWALL_UPDATE
            ]
        );
    }

    #[test]
    fn declarations_match_registry() {
        let decls = declarations();
        assert_eq!(decls.len(), registry().len());
        assert_eq!(decls[0].name, NETWORK_SCAN);
        assert!(decls[0].parameters["properties"]["target"].is_object());
    }
}
