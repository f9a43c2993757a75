//! The `workflow` command: run the pipeline once.

use std::sync::Arc;

use crate::cli::args::WorkflowArgs;
use crate::config;
use crate::error::CyberdrillError;
use crate::observability::{Event, EventEmitter};
use crate::reasoning::Unconfigured;
use crate::tools::{LatencyProfile, ToolGateway};
use crate::workflow::{WorkflowSink, WorkflowStepExecutor, traversal_order};

/// Runs the scenario's workflow chain once and emits its event stream.
///
/// # Errors
///
/// Returns an error for scenario loading/validation failures or an
/// unwritable events file.
pub async fn run(args: &WorkflowArgs) -> Result<(), CyberdrillError> {
    let scenario = args
        .config
        .as_deref()
        .map(config::load)
        .transpose()?
        .unwrap_or_default();

    let nodes = scenario.workflow.build_nodes();
    let edges = scenario.workflow.build_edges();
    let order = traversal_order(&nodes, &edges);

    // Arrange nodes into traversal order for the linear walk.
    let mut ordered = Vec::with_capacity(nodes.len());
    for id in &order {
        if let Some(node) = nodes.iter().find(|n| &n.id == id) {
            ordered.push(node.clone());
        }
    }

    let emitter = Arc::new(match &args.events_file {
        Some(path) => EventEmitter::to_file(path)?,
        None => EventEmitter::stdout(),
    });
    let sink: WorkflowSink = {
        let emitter = Arc::clone(&emitter);
        Arc::new(move |event| {
            emitter.emit(&Event::Workflow {
                event: event.clone(),
            });
        })
    };

    let executor = WorkflowStepExecutor::new(
        Arc::new(Unconfigured),
        Arc::new(ToolGateway::new(LatencyProfile::default())),
    )
    .with_sink(sink);

    let outputs = executor
        .run_chain(&mut ordered, &scenario.workflow.initial_input)
        .await;
    if let Some(last) = outputs.last() {
        println!("{last}");
    }

    Ok(())
}
