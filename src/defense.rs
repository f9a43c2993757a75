//! Defense lifecycle management.
//!
//! At most one defense record exists per attack identity; `respond`
//! enforces the deduplication and returns a skip for repeats. Advancing
//! walks ANALYZING → MITIGATING unconditionally, then branches to
//! BLOCKED or FAILED on the caller-supplied outcome.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::model::{
    AgentStatus, AttackKind, AttackRecord, DefenseId, DefenseRecord, DefenseStatus,
};
use crate::reasoning::narrative::{DefenseAssessment, defense_prompt};
use crate::reasoning::{Completion, CompletionRequest, ReasoningClient};
use crate::roster::AgentRoster;

/// Task description for an agent returned to monitoring duty.
pub const MONITORING_TASK: &str = "Monitoring for threats";

/// Creates and advances defense records.
pub struct DefenseLifecycleManager {
    reasoning: Arc<dyn ReasoningClient>,
    roster: Arc<AgentRoster>,
}

impl DefenseLifecycleManager {
    /// Creates a manager over the blue team roster.
    #[must_use]
    pub fn new(reasoning: Arc<dyn ReasoningClient>, roster: Arc<AgentRoster>) -> Self {
        Self { reasoning, roster }
    }

    /// Opens a defense for a detected attack, or skips.
    ///
    /// Returns `None` when `existing` already holds a record for the
    /// attack's identity (the dedup invariant — not an error) or when
    /// the roster is empty. Otherwise claims a responding agent (first
    /// idle, else the deterministic first), marks it `Analyzing`, and
    /// consults the reasoning backend with the attack's kind, strategy,
    /// and payload as context.
    pub async fn respond(
        &self,
        attack: &AttackRecord,
        existing: &[DefenseRecord],
    ) -> Option<DefenseRecord> {
        if existing.iter().any(|d| d.attack_id == attack.id) {
            debug!(attack = %attack.id, "defense already open, skipping");
            return None;
        }

        let Some(agent) = self
            .roster
            .claim(AgentStatus::Analyzing, format!("Analyzing {}", attack.kind))
        else {
            warn!(attack = %attack.id, "no agents available to respond");
            return None;
        };

        let assessment = if self.reasoning.available() {
            let threat_info = format!(
                "{} attack detected. Strategy: {}. Payload: {}",
                attack.kind, attack.strategy, attack.payload
            );
            let request = CompletionRequest::text(defense_prompt(attack.kind, &threat_info));
            match self.reasoning.complete(request).await {
                Ok(Completion::Text(text)) => DefenseAssessment::parse(&text),
                Ok(Completion::ToolCall(call)) => {
                    warn!(tool = %call.name, "unexpected tool call in threat analysis");
                    DefenseAssessment::fallback_error("unexpected tool-call response")
                }
                Err(err) => {
                    warn!(%err, "threat analysis call failed");
                    DefenseAssessment::fallback_error(&err.to_string())
                }
            }
        } else {
            DefenseAssessment::fallback_unavailable()
        };

        let record = DefenseRecord {
            id: DefenseId::generate(),
            attack_id: attack.id,
            agent_id: agent.id.clone(),
            created_at: Utc::now(),
            analysis: assessment.analysis,
            mitigation: assessment.mitigation,
            confidence: assessment.confidence,
            status: DefenseStatus::Analyzing,
        };
        info!(defense = %record.id, attack = %attack.id, agent = %agent.id, "defense opened");
        Some(record)
    }

    /// Advances a defense record one step.
    ///
    /// `Analyzing` moves to `Mitigating` unconditionally (the outcome is
    /// not consulted) and the responding agent follows. `Mitigating`
    /// branches to `Blocked` on success, else `Failed`, and the agent is
    /// reset to idle monitoring. Terminal records are returned unchanged.
    #[must_use]
    pub fn advance(
        &self,
        record: &DefenseRecord,
        attack_kind: AttackKind,
        success: bool,
    ) -> DefenseRecord {
        let out = record.advanced(success);
        match out.status {
            DefenseStatus::Mitigating if record.status == DefenseStatus::Analyzing => {
                self.roster.assign(
                    &record.agent_id,
                    AgentStatus::Mitigating,
                    format!("Mitigating {attack_kind}"),
                );
            }
            DefenseStatus::Blocked | DefenseStatus::Failed
                if record.status == DefenseStatus::Mitigating =>
            {
                self.roster
                    .assign(&record.agent_id, AgentStatus::Idle, MONITORING_TASK);
                info!(defense = %record.id, status = %out.status, "defense resolved");
            }
            _ => {}
        }
        out
    }
}

impl std::fmt::Debug for DefenseLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefenseLifecycleManager").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Agent, AgentId, AttackId, AttackStatus, Team};
    use crate::reasoning::Unconfigured;

    fn detected_attack() -> AttackRecord {
        AttackRecord {
            id: AttackId::generate(),
            kind: AttackKind::CrossSiteScripting,
            agent_id: AgentId::new("r-1"),
            created_at: Utc::now(),
            strategy: "inject script".to_string(),
            payload: "<script>".to_string(),
            expected_impact: "session theft".to_string(),
            status: AttackStatus::Detected,
            logs: vec![],
        }
    }

    fn manager() -> (DefenseLifecycleManager, Arc<AgentRoster>) {
        let roster = Arc::new(AgentRoster::new(vec![
            Agent::trained("b-1", "Sentinel-AI", "Threat Detection System", Team::Blue, &[], 90),
            Agent::trained("b-2", "Guardian-Firewall", "Perimeter Defense", Team::Blue, &[], 88),
        ]));
        (
            DefenseLifecycleManager::new(Arc::new(Unconfigured), Arc::clone(&roster)),
            roster,
        )
    }

    #[tokio::test]
    async fn respond_opens_analyzing_defense_with_fallback() {
        let (manager, roster) = manager();
        let attack = detected_attack();
        let defense = manager.respond(&attack, &[]).await.unwrap();
        assert_eq!(defense.status, DefenseStatus::Analyzing);
        assert_eq!(defense.attack_id, attack.id);
        assert_eq!(defense.confidence, 0);
        assert!(defense.analysis.contains("not configured"));

        let agent = roster.get(&defense.agent_id).unwrap();
        assert_eq!(agent.status, AgentStatus::Analyzing);
        assert_eq!(agent.current_task, "Analyzing Cross-Site Scripting");
    }

    #[tokio::test]
    async fn respond_skips_already_defended_attack() {
        let (manager, _) = manager();
        let attack = detected_attack();
        let first = manager.respond(&attack, &[]).await.unwrap();
        let existing = vec![first.clone()];
        assert!(manager.respond(&attack, &existing).await.is_none());
        // The existing list is untouched by the skip.
        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0], first);
    }

    #[tokio::test]
    async fn advance_walks_both_steps() {
        let (manager, roster) = manager();
        let attack = detected_attack();
        let defense = manager.respond(&attack, &[]).await.unwrap();

        let mitigating = manager.advance(&defense, attack.kind, false);
        assert_eq!(mitigating.status, DefenseStatus::Mitigating);
        let agent = roster.get(&defense.agent_id).unwrap();
        assert_eq!(agent.status, AgentStatus::Mitigating);
        assert_eq!(agent.current_task, "Mitigating Cross-Site Scripting");

        let failed = manager.advance(&mitigating, attack.kind, false);
        assert_eq!(failed.status, DefenseStatus::Failed);
        let agent = roster.get(&defense.agent_id).unwrap();
        assert_eq!(agent.status, AgentStatus::Idle);
        assert_eq!(agent.current_task, MONITORING_TASK);
    }

    #[tokio::test]
    async fn advance_success_blocks() {
        let (manager, _) = manager();
        let attack = detected_attack();
        let defense = manager.respond(&attack, &[]).await.unwrap();
        let mitigating = manager.advance(&defense, attack.kind, true);
        let blocked = manager.advance(&mitigating, attack.kind, true);
        assert_eq!(blocked.status, DefenseStatus::Blocked);
    }

    #[tokio::test]
    async fn terminal_records_absorb_further_advances() {
        let (manager, roster) = manager();
        let attack = detected_attack();
        let defense = manager.respond(&attack, &[]).await.unwrap();
        let blocked = manager.advance(
            &manager.advance(&defense, attack.kind, true),
            attack.kind,
            true,
        );

        let again = manager.advance(&blocked, attack.kind, false);
        assert_eq!(again, blocked);
        // Agent stays idle; no second reset occurs.
        let agent = roster.get(&defense.agent_id).unwrap();
        assert_eq!(agent.status, AgentStatus::Idle);
    }
}
