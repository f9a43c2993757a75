//! Exercise orchestration.
//!
//! Owns both lifecycle managers, the agent rosters, the scheduler, and
//! the bounded event log. A launched attack is advanced by scheduled
//! continuations; the orchestrator observes the DETECTED transition
//! exactly once per attack, opens the paired defense, schedules its two
//! advances, draws the outcome, and mirrors the result back onto the
//! attack's terminal status. `reset` cancels every outstanding
//! continuation before discarding run state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::attack::AttackLifecycleManager;
use crate::defense::DefenseLifecycleManager;
use crate::eventlog::{BoundedLog, SESSION_LOG_CAPACITY};
use crate::model::{
    AgentId, AgentStatus, AttackId, AttackKind, AttackRecord, AttackStatus, DefenseId,
    DefenseRecord, DefenseStatus, LogEntry, LogLevel, Team,
};
use crate::reasoning::narrative::{strategic_fallback, strategic_prompt};
use crate::reasoning::{Completion, CompletionRequest, ReasoningClient};
use crate::roster::AgentRoster;
use crate::scheduler::Scheduler;

/// Number of strategic summaries retained.
const STRATEGY_HISTORY_CAPACITY: usize = 5;

/// Caller-supplied sink for log entries.
pub type LogSink = Arc<dyn Fn(&LogEntry) + Send + Sync>;

// ============================================================================
// Outcome source
// ============================================================================

/// Seeded random source for the defense success draw.
///
/// Injectable so lifecycle advancement is deterministic under test.
pub struct OutcomeSource {
    rng: Mutex<StdRng>,
    success_probability: f64,
}

impl OutcomeSource {
    /// The reference success probability.
    pub const DEFAULT_SUCCESS_PROBABILITY: f64 = 0.8;

    /// Creates a source with the given probability and seed.
    ///
    /// The probability is clamped into `[0.0, 1.0]`.
    #[must_use]
    pub fn seeded(success_probability: f64, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            success_probability: success_probability.clamp(0.0, 1.0),
        }
    }

    /// Creates an OS-seeded source with the given probability.
    #[must_use]
    pub fn new(success_probability: f64) -> Self {
        Self::seeded(success_probability, rand::random())
    }

    /// Creates an OS-seeded source with the reference probability.
    #[must_use]
    pub fn with_default_probability() -> Self {
        Self::new(Self::DEFAULT_SUCCESS_PROBABILITY)
    }

    /// Draws one success/failure outcome.
    #[must_use]
    pub fn draw(&self) -> bool {
        self.rng
            .lock()
            .expect("outcome rng lock poisoned")
            .random_bool(self.success_probability)
    }
}

impl std::fmt::Debug for OutcomeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeSource")
            .field("success_probability", &self.success_probability)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Stage timings
// ============================================================================

/// Delays for the staged lifecycle progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimings {
    /// Delay to the attack's first advance; the second fires at twice this
    pub attack_advance: Duration,
    /// Delay until the launching agent returns to idle
    pub agent_reset: Duration,
    /// Delay to the defense's mitigating step; resolution fires at twice this
    pub defense_advance: Duration,
}

impl Default for StageTimings {
    /// The reference timeline: advances at 2s/4s, agent reset at 5s,
    /// defense steps at 2s/4s after detection.
    fn default() -> Self {
        Self {
            attack_advance: Duration::from_secs(2),
            agent_reset: Duration::from_secs(5),
            defense_advance: Duration::from_secs(2),
        }
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Drives a red vs. blue exercise end to end.
pub struct ExerciseOrchestrator {
    reasoning: Arc<dyn ReasoningClient>,
    red: Arc<AgentRoster>,
    blue: Arc<AgentRoster>,
    attack_mgr: AttackLifecycleManager,
    defense_mgr: DefenseLifecycleManager,
    scheduler: Scheduler,
    outcome: OutcomeSource,
    timings: StageTimings,
    target: String,
    attacks: Mutex<Vec<AttackRecord>>,
    defenses: Mutex<Vec<DefenseRecord>>,
    /// Attack ids whose DETECTED transition has already been observed.
    defended: DashMap<AttackId, ()>,
    event_log: BoundedLog<LogEntry>,
    strategy_history: BoundedLog<String>,
    sink: Option<LogSink>,
}

impl ExerciseOrchestrator {
    /// Creates an orchestrator over the given rosters.
    #[must_use]
    pub fn new(
        reasoning: Arc<dyn ReasoningClient>,
        red: Arc<AgentRoster>,
        blue: Arc<AgentRoster>,
        timings: StageTimings,
        outcome: OutcomeSource,
        target: impl Into<String>,
    ) -> Self {
        Self {
            attack_mgr: AttackLifecycleManager::new(Arc::clone(&reasoning), Arc::clone(&red)),
            defense_mgr: DefenseLifecycleManager::new(Arc::clone(&reasoning), Arc::clone(&blue)),
            reasoning,
            red,
            blue,
            scheduler: Scheduler::new(),
            outcome,
            timings,
            target: target.into(),
            attacks: Mutex::new(Vec::new()),
            defenses: Mutex::new(Vec::new()),
            defended: DashMap::new(),
            event_log: BoundedLog::new(SESSION_LOG_CAPACITY),
            strategy_history: BoundedLog::new(STRATEGY_HISTORY_CAPACITY),
            sink: None,
        }
    }

    /// Attaches a sink receiving every log entry.
    #[must_use]
    pub fn with_sink(mut self, sink: LogSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Launches an attack and schedules its staged progression.
    ///
    /// Returns `None` when the agent id is not on the red roster.
    pub async fn launch_attack(
        self: &Arc<Self>,
        kind: AttackKind,
        agent_id: &AgentId,
    ) -> Option<AttackRecord> {
        let Some(agent) = self.red.get(agent_id) else {
            warn!(agent = %agent_id, "launch requested for unknown agent");
            return None;
        };

        self.log(&agent.name, LogLevel::Warn, format!("Initiating {kind} attack"), Team::Red);

        let record = self.attack_mgr.launch(kind, &agent, &self.target).await;
        self.log(
            &agent.name,
            LogLevel::Critical,
            format!("{kind}: {}", record.strategy),
            Team::Red,
        );
        metrics::counter!("cyberdrill_attacks_launched_total").increment(1);

        self.attacks
            .lock()
            .expect("attack list lock poisoned")
            .push(record.clone());

        let attack_id = record.id;
        for stage in 1..=2u32 {
            let this = Arc::clone(self);
            self.scheduler
                .schedule(self.timings.attack_advance * stage, async move {
                    this.advance_attack(attack_id).await;
                });
        }

        let this = Arc::clone(self);
        let reset_id = agent.id.clone();
        self.scheduler.schedule(self.timings.agent_reset, async move {
            this.red.assign(&reset_id, AgentStatus::Idle, "Awaiting orders");
        });

        Some(record)
    }

    /// Advances one attack record and reacts to a DETECTED transition.
    async fn advance_attack(self: &Arc<Self>, id: AttackId) {
        let advanced = {
            let mut attacks = self.attacks.lock().expect("attack list lock poisoned");
            let Some(slot) = attacks.iter_mut().find(|a| a.id == id) else {
                debug!(attack = %id, "advance for discarded attack ignored");
                return;
            };
            let advanced = self.attack_mgr.advance(slot);
            *slot = advanced.clone();
            advanced
        };

        // Only the continuation that observes the DETECTED transition
        // first opens a defense.
        if advanced.status == AttackStatus::Detected
            && self.defended.insert(advanced.id, ()).is_none()
        {
            self.open_defense(advanced).await;
        }
    }

    /// Opens the paired defense and schedules its two advances.
    async fn open_defense(self: &Arc<Self>, attack: AttackRecord) {
        let existing = self.defenses.lock().expect("defense list lock poisoned").clone();
        let Some(defense) = self.defense_mgr.respond(&attack, &existing).await else {
            return;
        };

        let responder = self
            .blue
            .get(&defense.agent_id)
            .map_or_else(|| defense.agent_id.to_string(), |a| a.name);
        self.log(
            &responder,
            LogLevel::Warn,
            format!("Threat detected: {}", attack.kind),
            Team::Blue,
        );
        self.log(
            &responder,
            LogLevel::Info,
            format!("Analysis: {}", defense.analysis),
            Team::Blue,
        );

        self.defenses
            .lock()
            .expect("defense list lock poisoned")
            .push(defense.clone());

        let defense_id = defense.id;
        let kind = attack.kind;

        let this = Arc::clone(self);
        self.scheduler
            .schedule(self.timings.defense_advance, async move {
                this.advance_defense(defense_id, kind);
            });

        let this = Arc::clone(self);
        self.scheduler
            .schedule(self.timings.defense_advance * 2, async move {
                this.resolve_defense(defense_id, kind);
            });
    }

    /// ANALYZING → MITIGATING; the outcome is not consulted here.
    fn advance_defense(&self, id: DefenseId, kind: AttackKind) {
        let mut defenses = self.defenses.lock().expect("defense list lock poisoned");
        if let Some(slot) = defenses.iter_mut().find(|d| d.id == id) {
            *slot = self.defense_mgr.advance(slot, kind, true);
        }
    }

    /// MITIGATING → terminal, with the attack status mirroring the draw.
    fn resolve_defense(&self, id: DefenseId, kind: AttackKind) {
        let success = self.outcome.draw();

        let resolved = {
            let mut defenses = self.defenses.lock().expect("defense list lock poisoned");
            let Some(slot) = defenses.iter_mut().find(|d| d.id == id) else {
                debug!(defense = %id, "resolution for discarded defense ignored");
                return;
            };
            let resolved = self.defense_mgr.advance(slot, kind, success);
            *slot = resolved.clone();
            resolved
        };
        if !resolved.status.is_terminal() {
            return;
        }

        let responder = self
            .blue
            .get(&resolved.agent_id)
            .map_or_else(|| resolved.agent_id.to_string(), |a| a.name);
        if success {
            self.log(
                &responder,
                LogLevel::Success,
                format!("Attack blocked: {}", resolved.mitigation),
                Team::Blue,
            );
        } else {
            self.log(
                &responder,
                LogLevel::Critical,
                "Mitigation failed - Manual intervention required",
                Team::Blue,
            );
        }
        let outcome_label = if success { "blocked" } else { "failed" };
        metrics::counter!("cyberdrill_defenses_resolved_total", "outcome" => outcome_label)
            .increment(1);

        // BLOCKED mirrors a successful defense, SUCCESS a failed one.
        let terminal = if success {
            AttackStatus::Blocked
        } else {
            AttackStatus::Success
        };
        let mut attacks = self.attacks.lock().expect("attack list lock poisoned");
        if let Some(slot) = attacks.iter_mut().find(|a| a.id == resolved.attack_id) {
            *slot = self.attack_mgr.resolve(slot, terminal);
        }
    }

    /// Digests the current red/blue task roster through the reasoning
    /// backend, retaining a bounded history of summaries.
    pub async fn strategic_summary(&self) -> String {
        let tasks = |roster: &AgentRoster| {
            roster
                .snapshot()
                .iter()
                .map(|a| a.current_task.clone())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let context = format!(
            "Red Agents: {}. Blue Agents: {}.",
            tasks(&self.red),
            tasks(&self.blue)
        );

        let summary = if self.reasoning.available() {
            let request = CompletionRequest::text(strategic_prompt(&context));
            match self.reasoning.complete(request).await {
                Ok(Completion::Text(text)) if !text.is_empty() => text,
                Ok(Completion::Text(_)) => "Analysis incomplete.".to_string(),
                Ok(Completion::ToolCall(call)) => {
                    warn!(tool = %call.name, "unexpected tool call in strategic summary");
                    "Analysis incomplete.".to_string()
                }
                Err(err) => format!("Backend error: {err}"),
            }
        } else {
            strategic_fallback()
        };

        self.strategy_history.push(summary.clone());
        summary
    }

    /// Cancels every outstanding continuation, then discards run state.
    ///
    /// A continuation firing after the cancellation is a no-op; nothing
    /// mutates the discarded records.
    pub fn reset(&self) {
        info!("exercise reset");
        self.scheduler.cancel_all();
        self.attacks.lock().expect("attack list lock poisoned").clear();
        self.defenses.lock().expect("defense list lock poisoned").clear();
        self.defended.clear();
        self.event_log.clear();
    }

    /// Awaits every scheduled continuation so the timeline settles.
    ///
    /// Continuations may schedule further continuations (a detection
    /// opens a defense with two more stages), so draining repeats until
    /// the scheduler is empty.
    pub async fn settle(&self) {
        while !self.scheduler.is_idle() {
            self.scheduler.drain().await;
        }
    }

    /// Snapshot of all attack records, oldest first.
    #[must_use]
    pub fn attacks(&self) -> Vec<AttackRecord> {
        self.attacks.lock().expect("attack list lock poisoned").clone()
    }

    /// Snapshot of all defense records, oldest first.
    #[must_use]
    pub fn defenses(&self) -> Vec<DefenseRecord> {
        self.defenses.lock().expect("defense list lock poisoned").clone()
    }

    /// Snapshot of the bounded session log.
    #[must_use]
    pub fn log_entries(&self) -> Vec<LogEntry> {
        self.event_log.snapshot()
    }

    /// Snapshot of the retained strategic summaries, oldest first.
    #[must_use]
    pub fn strategy_history(&self) -> Vec<String> {
        self.strategy_history.snapshot()
    }

    /// The red team roster.
    #[must_use]
    pub fn red_roster(&self) -> &Arc<AgentRoster> {
        &self.red
    }

    /// The blue team roster.
    #[must_use]
    pub fn blue_roster(&self) -> &Arc<AgentRoster> {
        &self.blue
    }

    /// Counts of defenses by terminal outcome: `(blocked, failed)`.
    #[must_use]
    pub fn defense_tally(&self) -> (usize, usize) {
        let defenses = self.defenses.lock().expect("defense list lock poisoned");
        let blocked = defenses
            .iter()
            .filter(|d| d.status == DefenseStatus::Blocked)
            .count();
        let failed = defenses
            .iter()
            .filter(|d| d.status == DefenseStatus::Failed)
            .count();
        (blocked, failed)
    }

    fn log(&self, source: &str, level: LogLevel, message: impl Into<String>, team: Team) {
        let entry = LogEntry::new(source, level, message, team);
        if let Some(sink) = &self.sink {
            sink(&entry);
        }
        self.event_log.push(entry);
    }
}

impl std::fmt::Debug for ExerciseOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExerciseOrchestrator")
            .field("target", &self.target)
            .field("attacks", &self.attacks().len())
            .field("defenses", &self.defenses().len())
            .finish_non_exhaustive()
    }
}
