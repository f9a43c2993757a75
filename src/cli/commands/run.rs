//! The `run` command: drive a scripted exercise.
//!
//! Builds the rosters and orchestrator from the scenario, launches the
//! requested attacks round-robin across the red roster, waits for the
//! staged timeline to settle, and emits the full JSONL event stream.
//! The binary ships without a reasoning backend, so narrative content
//! comes from the simulation fallbacks.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::cli::args::RunArgs;
use crate::config;
use crate::error::CyberdrillError;
use crate::model::{AttackKind, Team};
use crate::observability::{Event, EventEmitter};
use crate::orchestrator::{ExerciseOrchestrator, LogSink, OutcomeSource};
use crate::reasoning::Unconfigured;
use crate::roster::AgentRoster;

/// Runs an exercise end to end.
///
/// # Errors
///
/// Returns an error for scenario loading/validation failures or an
/// unwritable events file.
pub async fn run(args: &RunArgs) -> Result<(), CyberdrillError> {
    let scenario = args
        .config
        .as_deref()
        .map(config::load)
        .transpose()?
        .unwrap_or_default();
    let timings = scenario.stage_timings()?;

    let red = Arc::new(AgentRoster::new(
        scenario.agents.red.iter().map(|a| a.build(Team::Red)).collect(),
    ));
    let blue = Arc::new(AgentRoster::new(
        scenario.agents.blue.iter().map(|a| a.build(Team::Blue)).collect(),
    ));

    let probability = scenario.defense.success_probability;
    let outcome = scenario.defense.seed.map_or_else(
        || OutcomeSource::new(probability),
        |seed| OutcomeSource::seeded(probability, seed),
    );

    let emitter = Arc::new(match &args.events_file {
        Some(path) => EventEmitter::to_file(path)?,
        None => EventEmitter::stdout(),
    });
    emitter.emit(&Event::ExerciseStarted {
        timestamp: Utc::now(),
        exercise: scenario.exercise.name.clone(),
        target: scenario.exercise.target.clone(),
    });

    let sink: LogSink = {
        let emitter = Arc::clone(&emitter);
        Arc::new(move |entry| {
            emitter.emit(&Event::Log {
                entry: entry.clone(),
            });
        })
    };

    let orchestrator = Arc::new(
        ExerciseOrchestrator::new(
            Arc::new(Unconfigured),
            red,
            blue,
            timings,
            outcome,
            scenario.exercise.target.clone(),
        )
        .with_sink(sink),
    );

    let launchers = orchestrator.red_roster().snapshot();
    if launchers.is_empty() {
        tracing::warn!("no red agents in the scenario; nothing to launch");
    } else {
        for (i, choice) in args.attacks.iter().enumerate() {
            let kind: AttackKind = (*choice).into();
            let agent = &launchers[i % launchers.len()];
            let _ = orchestrator.launch_attack(kind, &agent.id).await;
        }
    }

    info!("waiting for the staged timeline to settle");
    orchestrator.settle().await;

    for attack in orchestrator.attacks() {
        if attack.status.is_terminal() {
            emitter.emit(&Event::AttackResolved {
                timestamp: Utc::now(),
                attack_id: attack.id,
                status: attack.status,
            });
        }
    }
    let (blocked, failed) = orchestrator.defense_tally();
    emitter.emit(&Event::ExerciseCompleted {
        timestamp: Utc::now(),
        attacks: orchestrator.attacks().len(),
        blocked,
        failed,
    });

    Ok(())
}
