mod common;

use std::sync::Arc;

use common::{ScriptedClient, Scripted, red_agent};
use cyberdrill::attack::AttackLifecycleManager;
use cyberdrill::model::{AgentStatus, AttackKind, AttackStatus};
use cyberdrill::reasoning::Unconfigured;
use cyberdrill::roster::AgentRoster;

fn roster() -> Arc<AgentRoster> {
    Arc::new(AgentRoster::new(vec![red_agent("r-1", "Exploit-Dev")]))
}

#[tokio::test]
async fn launch_without_backend_yields_initiated_with_fallback_strategy() {
    let roster = roster();
    let manager = AttackLifecycleManager::new(Arc::new(Unconfigured), Arc::clone(&roster));
    let agent = roster.get(&cyberdrill::model::AgentId::new("r-1")).unwrap();

    let record = manager
        .launch(AttackKind::SqlInjection, &agent, "Enterprise Web Application")
        .await;

    assert_eq!(record.status, AttackStatus::Initiated);
    assert!(record.strategy.contains("not configured"));
    assert!(record.strategy.contains("SQL Injection"));
}

#[tokio::test]
async fn launch_with_backend_populates_narrative_fields() {
    let roster = roster();
    let client = ScriptedClient::new(vec![Scripted::Text(
        r#"{"strategy": "Enumerate login forms", "payload": "' OR 1=1 --", "expectedImpact": "Auth bypass"}"#,
    )]);
    let manager = AttackLifecycleManager::new(Arc::new(client), Arc::clone(&roster));
    let agent = roster.get(&cyberdrill::model::AgentId::new("r-1")).unwrap();

    let record = manager.launch(AttackKind::SqlInjection, &agent, "target").await;
    assert_eq!(record.strategy, "Enumerate login forms");
    assert_eq!(record.payload, "' OR 1=1 --");
    assert_eq!(record.expected_impact, "Auth bypass");
    assert_eq!(record.status, AttackStatus::Initiated);
}

#[tokio::test]
async fn launch_recovers_from_malformed_backend_output() {
    let roster = roster();
    let client = ScriptedClient::new(vec![Scripted::Text(
        "The best approach here is to probe the login form directly.",
    )]);
    let manager = AttackLifecycleManager::new(Arc::new(client), Arc::clone(&roster));
    let agent = roster.get(&cyberdrill::model::AgentId::new("r-1")).unwrap();

    let record = manager.launch(AttackKind::BruteForce, &agent, "target").await;
    assert!(record.strategy.starts_with("The best approach"));
    assert_eq!(record.payload, "Generated payload");
}

#[tokio::test]
async fn launch_survives_backend_failure_with_error_fallback() {
    let roster = roster();
    let client = ScriptedClient::new(vec![Scripted::Fail("quota exceeded")]);
    let manager = AttackLifecycleManager::new(Arc::new(client), Arc::clone(&roster));
    let agent = roster.get(&cyberdrill::model::AgentId::new("r-1")).unwrap();

    let record = manager.launch(AttackKind::Phishing, &agent, "target").await;
    assert_eq!(record.status, AttackStatus::Initiated);
    assert!(record.strategy.contains("quota exceeded"));
}

#[tokio::test]
async fn launch_marks_the_agent_executing() {
    let roster = roster();
    let manager = AttackLifecycleManager::new(Arc::new(Unconfigured), Arc::clone(&roster));
    let id = cyberdrill::model::AgentId::new("r-1");
    let agent = roster.get(&id).unwrap();

    manager.launch(AttackKind::Ransomware, &agent, "target").await;

    let updated = roster.get(&id).unwrap();
    assert_eq!(updated.status, AgentStatus::Executing);
    assert_eq!(updated.current_task, "Executing Ransomware Simulation");
}

#[tokio::test]
async fn status_only_walks_the_forward_order() {
    let roster = roster();
    let manager = AttackLifecycleManager::new(Arc::new(Unconfigured), Arc::clone(&roster));
    let agent = roster.get(&cyberdrill::model::AgentId::new("r-1")).unwrap();

    let record = manager.launch(AttackKind::DenialOfService, &agent, "target").await;
    let mut statuses = vec![record.status];
    let mut current = record;
    for _ in 0..5 {
        current = manager.advance(&current);
        statuses.push(current.status);
    }

    // Forward prefix only, then idempotent at DETECTED.
    assert_eq!(
        statuses,
        vec![
            AttackStatus::Initiated,
            AttackStatus::InProgress,
            AttackStatus::Detected,
            AttackStatus::Detected,
            AttackStatus::Detected,
            AttackStatus::Detected,
        ]
    );
}

#[tokio::test]
async fn advance_never_mutates_its_argument() {
    let roster = roster();
    let manager = AttackLifecycleManager::new(Arc::new(Unconfigured), Arc::clone(&roster));
    let agent = roster.get(&cyberdrill::model::AgentId::new("r-1")).unwrap();

    let record = manager.launch(AttackKind::DataExfiltration, &agent, "target").await;
    let before_logs = record.logs.len();

    let advanced = manager.advance(&record);
    assert_eq!(record.status, AttackStatus::Initiated);
    assert_eq!(record.logs.len(), before_logs);
    assert_eq!(advanced.status, AttackStatus::InProgress);

    // Same transition both times.
    let again = manager.advance(&record);
    assert_eq!(again.status, advanced.status);
}
