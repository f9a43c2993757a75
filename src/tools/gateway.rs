//! Tool invocation gateway.
//!
//! Applies a simulated, bounded-random latency and returns canned
//! deterministic payloads per tool. The payload content depends only on
//! the tool name and argument shape; latency is the only varying part
//! and is injectable for tests.

use std::sync::Mutex;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};
use tracing::debug;

use super::args::{ToolArgs, ToolArgsError};

/// Bounds for the simulated per-call latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyProfile {
    /// Minimum simulated delay
    pub min: Duration,
    /// Maximum simulated delay
    pub max: Duration,
}

impl LatencyProfile {
    /// No delay at all; makes `execute` fully deterministic for tests.
    pub const ZERO: Self = Self {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };
}

impl Default for LatencyProfile {
    /// The reference latency window of 800–1800ms.
    fn default() -> Self {
        Self {
            min: Duration::from_millis(800),
            max: Duration::from_millis(1800),
        }
    }
}

/// Executes registered tools by name.
pub struct ToolGateway {
    latency: LatencyProfile,
    rng: Mutex<StdRng>,
}

impl ToolGateway {
    /// Creates a gateway with the given latency profile and an
    /// OS-seeded latency source.
    #[must_use]
    pub fn new(latency: LatencyProfile) -> Self {
        Self::seeded(latency, rand::random())
    }

    /// Creates a gateway with a fixed latency seed for reproducible runs.
    #[must_use]
    pub fn seeded(latency: LatencyProfile, seed: u64) -> Self {
        Self {
            latency,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Executes a tool by name with loose JSON arguments.
    ///
    /// This operation is total: unknown tools and malformed arguments
    /// produce a structured error payload, never a Rust error.
    pub async fn execute(&self, name: &str, args: &Value) -> String {
        let parsed = match ToolArgs::parse(name, args) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(tool = name, %err, "tool invocation rejected");
                return error_payload(&err);
            }
        };

        self.simulate_latency().await;
        metrics::counter!("cyberdrill_tool_invocations_total", "tool" => parsed.tool_name())
            .increment(1);
        debug!(tool = parsed.tool_name(), "executing tool");
        payload_for(&parsed)
    }

    async fn simulate_latency(&self) {
        if self.latency.max.is_zero() {
            return;
        }
        let (min, max) = (self.latency.min.as_millis(), self.latency.max.as_millis());
        let millis = {
            let mut rng = self.rng.lock().expect("latency rng lock poisoned");
            rng.random_range(min..=max.max(min))
        };
        #[allow(clippy::cast_possible_truncation)]
        tokio::time::sleep(Duration::from_millis(millis as u64)).await;
    }
}

impl std::fmt::Debug for ToolGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolGateway")
            .field("latency", &self.latency)
            .finish_non_exhaustive()
    }
}

/// Structured error payload for rejected invocations.
fn error_payload(err: &ToolArgsError) -> String {
    match err {
        ToolArgsError::UnknownTool(_) => json!({ "error": "Tool not found" }).to_string(),
        ToolArgsError::MissingField { .. } => json!({ "error": err.to_string() }).to_string(),
    }
}

/// Canned payload for a validated invocation.
fn payload_for(args: &ToolArgs) -> String {
    match args {
        ToolArgs::NetworkScan { target } => json!({
            "status": "success",
            "host": target,
            "open_ports": [80, 443, 22],
            "services": {
                "80": "Apache/2.4.41",
                "443": "nginx/1.18.0",
                "22": "OpenSSH_8.2p1",
            },
        })
        .to_string(),
        ToolArgs::CveLookup { service, .. } => {
            if service.contains("Apache") {
                json!({
                    "cves": ["CVE-2021-41773", "CVE-2021-42013"],
                    "severity": "CRITICAL",
                    "description":
                        "Path traversal vulnerability in Apache HTTP Server 2.4.49/2.4.50",
                })
                .to_string()
            } else {
                json!({ "cves": [], "severity": "LOW" }).to_string()
            }
        }
        ToolArgs::ExploitGenerator { .. } => json!({
            "payload_type": "Path Traversal",
            "payload": "GET /cgi-bin/.%2e/%2e%2e/%2e%2e/etc/passwd",
            "obfuscation": "medium",
        })
        .to_string(),
        ToolArgs::LogAnalyzer { .. } => json!({
            "verdict": "MALICIOUS",
            "confidence": 0.98,
            "attack_type": "Path Traversal / LFI",
            "signature_match": "ET WEB_SERVER Apache Path Traversal",
        })
        .to_string(),
        ToolArgs::FirewallUpdate { .. } => json!({
            "status": "APPLIED",
            "rule_id": "BLOCK-9921",
            "impact": "Traffic from attacker blocked at perimeter.",
        })
        .to_string(),
    }
}
