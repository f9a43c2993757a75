//! Typed tool arguments, validated at the gateway boundary.
//!
//! Backend tool-call requests arrive as loose JSON; each tool gets a
//! named variant so the rest of the crate never handles an untyped bag.

use serde_json::Value;
use thiserror::Error;

use super::{CVE_LOOKUP, EXPLOIT_GENERATOR, FIREWALL_UPDATE, LOG_ANALYZER, NETWORK_SCAN};

/// Argument validation errors.
///
/// These never escape the gateway — they are converted into structured
/// error payloads there.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolArgsError {
    /// Tool name not present in the registry
    #[error("tool not found: {0}")]
    UnknownTool(String),

    /// Required field missing or not a string
    #[error("tool '{tool}' requires string field '{field}'")]
    MissingField {
        /// Tool name
        tool: &'static str,
        /// Missing field name
        field: &'static str,
    },
}

/// Validated arguments for one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolArgs {
    /// `network_scan`
    NetworkScan {
        /// Target host or subnet
        target: String,
    },
    /// `cve_lookup`
    CveLookup {
        /// Service name to search for
        service: String,
        /// Optional service version
        version: Option<String>,
    },
    /// `exploit_generator`
    ExploitGenerator {
        /// CVE identifier to target
        cve: String,
        /// Optional target type hint
        target_type: Option<String>,
    },
    /// `log_analyzer`
    LogAnalyzer {
        /// Raw log lines to analyze
        logs: String,
    },
    /// `firewall_update`
    FirewallUpdate {
        /// Rule text to apply
        rule: String,
        /// Optional action (e.g. `"DROP"`)
        action: Option<String>,
    },
}

fn required(args: &Value, tool: &'static str, field: &'static str) -> Result<String, ToolArgsError> {
    args.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(ToolArgsError::MissingField { tool, field })
}

fn optional(args: &Value, field: &str) -> Option<String> {
    args.get(field).and_then(Value::as_str).map(str::to_string)
}

impl ToolArgs {
    /// Parses loose JSON arguments for the named tool.
    ///
    /// # Errors
    ///
    /// Returns [`ToolArgsError::UnknownTool`] for names outside the
    /// registry and [`ToolArgsError::MissingField`] when a required
    /// string field is absent.
    pub fn parse(name: &str, args: &Value) -> Result<Self, ToolArgsError> {
        match name {
            NETWORK_SCAN => Ok(Self::NetworkScan {
                target: required(args, NETWORK_SCAN, "target")?,
            }),
            CVE_LOOKUP => Ok(Self::CveLookup {
                service: required(args, CVE_LOOKUP, "service")?,
                version: optional(args, "version"),
            }),
            EXPLOIT_GENERATOR => Ok(Self::ExploitGenerator {
                cve: required(args, EXPLOIT_GENERATOR, "cve")?,
                target_type: optional(args, "targetType"),
            }),
            LOG_ANALYZER => Ok(Self::LogAnalyzer {
                logs: required(args, LOG_ANALYZER, "logs")?,
            }),
            FIREWALL_UPDATE => Ok(Self::FirewallUpdate {
                rule: required(args, FIREWALL_UPDATE, "rule")?,
                action: optional(args, "action"),
            }),
            other => Err(ToolArgsError::UnknownTool(other.to_string())),
        }
    }

    /// The registry name of the tool these arguments belong to.
    #[must_use]
    pub const fn tool_name(&self) -> &'static str {
        match self {
            Self::NetworkScan { .. } => NETWORK_SCAN,
            Self::CveLookup { .. } => CVE_LOOKUP,
            Self::ExploitGenerator { .. } => EXPLOIT_GENERATOR,
            Self::LogAnalyzer { .. } => LOG_ANALYZER,
            Self::FirewallUpdate { .. } => FIREWALL_UPDATE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_network_scan() {
        let args = ToolArgs::parse(NETWORK_SCAN, &json!({"target": "192.168.1.50"})).unwrap();
        assert_eq!(
            args,
            ToolArgs::NetworkScan {
                target: "192.168.1.50".to_string()
            }
        );
        assert_eq!(args.tool_name(), NETWORK_SCAN);
    }

    #[test]
    fn parses_optional_fields() {
        let args = ToolArgs::parse(
            CVE_LOOKUP,
            &json!({"service": "Apache/2.4.41", "version": "2.4.41"}),
        )
        .unwrap();
        assert_eq!(
            args,
            ToolArgs::CveLookup {
                service: "Apache/2.4.41".to_string(),
                version: Some("2.4.41".to_string()),
            }
        );

        let args = ToolArgs::parse(FIREWALL_UPDATE, &json!({"rule": "Block IP"})).unwrap();
        assert_eq!(
            args,
            ToolArgs::FirewallUpdate {
                rule: "Block IP".to_string(),
                action: None,
            }
        );
    }

    #[test]
    fn missing_required_field_is_reported() {
        let err = ToolArgs::parse(NETWORK_SCAN, &json!({})).unwrap_err();
        assert_eq!(
            err,
            ToolArgsError::MissingField {
                tool: NETWORK_SCAN,
                field: "target"
            }
        );
    }

    #[test]
    fn non_string_field_is_rejected() {
        let err = ToolArgs::parse(LOG_ANALYZER, &json!({"logs": 42})).unwrap_err();
        assert!(matches!(err, ToolArgsError::MissingField { .. }));
    }

    #[test]
    fn unknown_tool_is_reported() {
        let err = ToolArgs::parse("port_knocker", &json!({})).unwrap_err();
        assert_eq!(err, ToolArgsError::UnknownTool("port_knocker".to_string()));
    }
}
