//! Attack lifecycle management.
//!
//! Creates attack records and advances them through the fixed forward
//! progression. Terminal resolution is driven by the orchestrating
//! caller once the paired defense settles; this manager only exposes the
//! forward-advance primitive and the terminal-branch setter.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::model::{Agent, AgentStatus, AttackId, AttackKind, AttackRecord, AttackStatus};
use crate::reasoning::narrative::{AttackPlan, attack_prompt, truncate_chars};
use crate::reasoning::{Completion, CompletionRequest, ReasoningClient};
use crate::roster::AgentRoster;

/// Characters of payload carried into the launch log line.
const PAYLOAD_LOG_PREFIX: usize = 50;

/// Creates and advances attack records.
pub struct AttackLifecycleManager {
    reasoning: Arc<dyn ReasoningClient>,
    roster: Arc<AgentRoster>,
}

impl AttackLifecycleManager {
    /// Creates a manager over the red team roster.
    #[must_use]
    pub fn new(reasoning: Arc<dyn ReasoningClient>, roster: Arc<AgentRoster>) -> Self {
        Self { reasoning, roster }
    }

    /// Launches an attack of the given kind against the target.
    ///
    /// Consults the reasoning backend for a strategy/payload/impact
    /// triple; unavailability and call failures substitute fixed labeled
    /// fallback content, so launch always returns a record in
    /// `Initiated`. Marks the launching agent `Executing` as a side
    /// effect.
    pub async fn launch(&self, kind: AttackKind, agent: &Agent, target: &str) -> AttackRecord {
        let plan = if self.reasoning.available() {
            let request = CompletionRequest::text(attack_prompt(kind, target));
            match self.reasoning.complete(request).await {
                Ok(Completion::Text(text)) => AttackPlan::parse(&text),
                Ok(Completion::ToolCall(call)) => {
                    warn!(tool = %call.name, "unexpected tool call in attack planning");
                    AttackPlan::fallback_error("unexpected tool-call response")
                }
                Err(err) => {
                    warn!(%err, "attack planning call failed");
                    AttackPlan::fallback_error(&err.to_string())
                }
            }
        } else {
            AttackPlan::fallback_unavailable(kind)
        };

        let now = Utc::now();
        let time = now.format("%H:%M:%S");
        let record = AttackRecord {
            id: AttackId::generate(),
            kind,
            agent_id: agent.id.clone(),
            created_at: now,
            strategy: plan.strategy.clone(),
            payload: plan.payload.clone(),
            expected_impact: plan.expected_impact,
            status: AttackStatus::Initiated,
            logs: vec![
                format!("[{time}] Attack initiated by {}", agent.name),
                format!("[{time}] Strategy: {}", plan.strategy),
                format!(
                    "[{time}] Payload generated: {}...",
                    truncate_chars(&plan.payload, PAYLOAD_LOG_PREFIX)
                ),
            ],
        };

        self.roster
            .assign(&agent.id, AgentStatus::Executing, format!("Executing {kind}"));
        info!(attack = %record.id, %kind, agent = %agent.id, "attack launched");
        record
    }

    /// Returns a record advanced to the next status in the forward
    /// progression; a `Detected` record is returned unchanged.
    ///
    /// Pure apart from the timestamp in the appended log line; never
    /// fails.
    #[must_use]
    pub fn advance(&self, record: &AttackRecord) -> AttackRecord {
        record.advanced(Utc::now())
    }

    /// Applies a terminal branch (`Blocked` or `Success`) to a
    /// `Detected` record; any other input is returned unchanged.
    #[must_use]
    pub fn resolve(&self, record: &AttackRecord, terminal: AttackStatus) -> AttackRecord {
        let out = record.resolved(terminal, Utc::now());
        if out.status != record.status {
            info!(attack = %record.id, status = %out.status, "attack resolved");
        }
        out
    }
}

impl std::fmt::Debug for AttackLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttackLifecycleManager").finish_non_exhaustive()
    }
}
