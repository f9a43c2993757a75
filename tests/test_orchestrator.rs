mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{blue_agent, red_agent};
use cyberdrill::defense::MONITORING_TASK;
use cyberdrill::model::{AgentId, AgentStatus, AttackKind, AttackStatus, DefenseStatus, LogLevel};
use cyberdrill::orchestrator::{ExerciseOrchestrator, OutcomeSource, StageTimings};
use cyberdrill::reasoning::Unconfigured;
use cyberdrill::roster::AgentRoster;

fn orchestrator(success_probability: f64) -> Arc<ExerciseOrchestrator> {
    let red = Arc::new(AgentRoster::new(vec![red_agent("r-1", "Exploit-Dev")]));
    let blue = Arc::new(AgentRoster::new(vec![blue_agent("b-1", "Sentinel-AI")]));
    Arc::new(ExerciseOrchestrator::new(
        Arc::new(Unconfigured),
        red,
        blue,
        StageTimings::default(),
        OutcomeSource::seeded(success_probability, 11),
        "Enterprise Web Application",
    ))
}

async fn advance_time(duration: Duration) {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    tokio::time::advance(duration).await;
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn staged_timeline_walks_attack_and_defense_to_blocked() {
    let orchestrator = orchestrator(1.0);
    let agent_id = AgentId::new("r-1");

    let record = orchestrator
        .launch_attack(AttackKind::SqlInjection, &agent_id)
        .await
        .unwrap();
    assert_eq!(record.status, AttackStatus::Initiated);

    // t=2s: first advance.
    advance_time(Duration::from_millis(2100)).await;
    assert_eq!(orchestrator.attacks()[0].status, AttackStatus::InProgress);
    assert!(orchestrator.defenses().is_empty());

    // t=4s: detection opens the paired defense.
    advance_time(Duration::from_secs(2)).await;
    assert_eq!(orchestrator.attacks()[0].status, AttackStatus::Detected);
    let defenses = orchestrator.defenses();
    assert_eq!(defenses.len(), 1);
    assert_eq!(defenses[0].status, DefenseStatus::Analyzing);

    // t=5s: the launching agent returns to idle.
    advance_time(Duration::from_secs(1)).await;
    let red = orchestrator.red_roster().get(&agent_id).unwrap();
    assert_eq!(red.status, AgentStatus::Idle);
    assert_eq!(red.current_task, "Awaiting orders");

    // t=6s: ANALYZING -> MITIGATING.
    advance_time(Duration::from_secs(1)).await;
    assert_eq!(orchestrator.defenses()[0].status, DefenseStatus::Mitigating);

    // t=8s: MITIGATING -> BLOCKED, mirrored onto the attack.
    advance_time(Duration::from_secs(2)).await;
    orchestrator.settle().await;
    assert_eq!(orchestrator.defenses()[0].status, DefenseStatus::Blocked);
    assert_eq!(orchestrator.attacks()[0].status, AttackStatus::Blocked);

    let blue = orchestrator
        .blue_roster()
        .get(&AgentId::new("b-1"))
        .unwrap();
    assert_eq!(blue.status, AgentStatus::Idle);
    assert_eq!(blue.current_task, MONITORING_TASK);
}

#[tokio::test(start_paused = true)]
async fn failed_defense_mirrors_attack_success() {
    let orchestrator = orchestrator(0.0);
    let agent_id = AgentId::new("r-1");

    orchestrator
        .launch_attack(AttackKind::CrossSiteScripting, &agent_id)
        .await
        .unwrap();
    orchestrator.settle().await;

    assert_eq!(orchestrator.defenses()[0].status, DefenseStatus::Failed);
    assert_eq!(orchestrator.attacks()[0].status, AttackStatus::Success);
    assert_eq!(orchestrator.defense_tally(), (0, 1));

    // The failure is logged as CRITICAL.
    assert!(orchestrator.log_entries().iter().any(|e| {
        e.level == LogLevel::Critical && e.message.contains("Mitigation failed")
    }));
}

#[tokio::test(start_paused = true)]
async fn each_attack_gets_exactly_one_defense() {
    let orchestrator = orchestrator(1.0);
    let agent_id = AgentId::new("r-1");

    orchestrator
        .launch_attack(AttackKind::SqlInjection, &agent_id)
        .await
        .unwrap();
    orchestrator
        .launch_attack(AttackKind::BruteForce, &agent_id)
        .await
        .unwrap();
    orchestrator.settle().await;

    let attacks = orchestrator.attacks();
    let defenses = orchestrator.defenses();
    assert_eq!(attacks.len(), 2);
    assert_eq!(defenses.len(), 2);
    for attack in &attacks {
        assert_eq!(
            defenses.iter().filter(|d| d.attack_id == attack.id).count(),
            1,
            "attack {} should have exactly one defense",
            attack.id
        );
    }
}

#[tokio::test(start_paused = true)]
async fn reset_cancels_outstanding_continuations() {
    let orchestrator = orchestrator(1.0);
    let agent_id = AgentId::new("r-1");

    orchestrator
        .launch_attack(AttackKind::Ransomware, &agent_id)
        .await
        .unwrap();

    // t=2s: in progress, then the run is discarded.
    advance_time(Duration::from_millis(2100)).await;
    orchestrator.reset();

    // Continuations that were pending at reset fire into the void.
    advance_time(Duration::from_secs(30)).await;
    orchestrator.settle().await;

    assert!(orchestrator.attacks().is_empty());
    assert!(orchestrator.defenses().is_empty());
    assert!(orchestrator.log_entries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn launch_logs_warn_then_critical_strategy_line() {
    let orchestrator = orchestrator(1.0);
    let agent_id = AgentId::new("r-1");

    orchestrator
        .launch_attack(AttackKind::Phishing, &agent_id)
        .await
        .unwrap();

    let entries = orchestrator.log_entries();
    assert_eq!(entries[0].level, LogLevel::Warn);
    assert!(entries[0].message.contains("Initiating Phishing Campaign attack"));
    assert_eq!(entries[1].level, LogLevel::Critical);
    assert!(entries[1].message.starts_with("Phishing Campaign:"));
    assert_eq!(entries[0].source, "Exploit-Dev");
}

#[tokio::test(start_paused = true)]
async fn unknown_agent_cannot_launch() {
    let orchestrator = orchestrator(1.0);
    let record = orchestrator
        .launch_attack(AttackKind::SqlInjection, &AgentId::new("r-99"))
        .await;
    assert!(record.is_none());
    assert!(orchestrator.attacks().is_empty());
}

#[tokio::test]
async fn strategic_summary_falls_back_and_bounds_history() {
    let orchestrator = orchestrator(1.0);

    let summary = orchestrator.strategic_summary().await;
    assert!(summary.contains("not configured"));

    for _ in 0..7 {
        orchestrator.strategic_summary().await;
    }
    assert_eq!(orchestrator.strategy_history().len(), 5);
}
