//! Workflow step executor.
//!
//! Runs an ordered chain of nodes, feeding each node's output to the
//! next. Each step consults the reasoning backend with the full tool
//! declaration set; without a backend, a keyword match on the node label
//! routes to a canned tool invocation instead. A failed step emits a
//! fixed error sentinel and the chain keeps going — a run never aborts.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::eventlog::{BoundedLog, WORKFLOW_LOG_CAPACITY};
use crate::model::{
    NodeId, NodeStatus, WorkflowEdge, WorkflowEvent, WorkflowEventKind, WorkflowNode,
};
use crate::reasoning::narrative::{node_prompt, truncate_chars};
use crate::reasoning::{Completion, CompletionRequest, ReasoningClient};
use crate::tools::{self, ToolGateway};

/// Sentinel output of a failed step; becomes the next node's input.
pub const ERROR_SENTINEL: &str = "Error";

/// Fixed OUTPUT event content for a failed step.
const ERROR_EVENT_MESSAGE: &str = "Error executing agent logic.";

/// Fixed output when no keyword routes and no backend is configured.
const COMPLETION_MESSAGE: &str = "Analysis complete.";

/// Fixed output when the backend returns empty text.
const EMPTY_OUTPUT_MESSAGE: &str = "No output generated.";

/// Characters of the previous output quoted in the INPUT event.
const INPUT_PREFIX: usize = 100;

/// Characters of the previous output quoted in the simulated THOUGHT.
const THOUGHT_PREFIX: usize = 20;

/// Fixed simulated step delay when no backend is configured.
const SIMULATED_STEP_DELAY: Duration = Duration::from_millis(1500);

/// Caller-supplied sink for workflow events.
pub type WorkflowSink = Arc<dyn Fn(&WorkflowEvent) + Send + Sync>;

/// Executes a linear chain of workflow nodes.
pub struct WorkflowStepExecutor {
    reasoning: Arc<dyn ReasoningClient>,
    gateway: Arc<ToolGateway>,
    run_log: BoundedLog<WorkflowEvent>,
    sink: Option<WorkflowSink>,
    simulated_delay: Duration,
}

impl WorkflowStepExecutor {
    /// Creates an executor with the reference simulated delay and no sink.
    #[must_use]
    pub fn new(reasoning: Arc<dyn ReasoningClient>, gateway: Arc<ToolGateway>) -> Self {
        Self {
            reasoning,
            gateway,
            run_log: BoundedLog::new(WORKFLOW_LOG_CAPACITY),
            sink: None,
            simulated_delay: SIMULATED_STEP_DELAY,
        }
    }

    /// Attaches a sink receiving every emitted event.
    #[must_use]
    pub fn with_sink(mut self, sink: WorkflowSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Overrides the simulated step delay (tests use zero).
    #[must_use]
    pub const fn with_simulated_delay(mut self, delay: Duration) -> Self {
        self.simulated_delay = delay;
        self
    }

    /// Returns a snapshot of the bounded run log.
    #[must_use]
    pub fn events(&self) -> Vec<WorkflowEvent> {
        self.run_log.snapshot()
    }

    /// Runs a single node with the previous node's output as input.
    ///
    /// Always emits an INPUT event first. With a backend, a response
    /// requesting exactly one tool produces TOOL_CALL and OUTPUT events
    /// around the gateway execution; plain text produces a THOUGHT
    /// event. Without a backend, the node label is keyword-routed to a
    /// canned tool invocation. A backend failure emits a fixed OUTPUT
    /// event and returns [`ERROR_SENTINEL`] — never an error.
    pub async fn run_node(&self, node: &WorkflowNode, previous_output: &str) -> String {
        self.emit(
            &node.id,
            WorkflowEventKind::Input,
            format!(
                "Received input: {}...",
                truncate_chars(previous_output, INPUT_PREFIX)
            ),
        );

        if !self.reasoning.available() {
            return self.run_node_simulated(node, previous_output).await;
        }

        let request = CompletionRequest::with_tools(
            node_prompt(&node.label, node.sub_label.as_deref(), previous_output),
            tools::declarations(),
        );
        match self.reasoning.complete(request).await {
            Ok(Completion::ToolCall(call)) => {
                self.emit(
                    &node.id,
                    WorkflowEventKind::ToolCall,
                    format!("Calling tool: {} with {}", call.name, call.args),
                );
                let result = self.gateway.execute(&call.name, &call.args).await;
                self.emit(
                    &node.id,
                    WorkflowEventKind::Output,
                    format!("Tool result: {result}"),
                );
                result
            }
            Ok(Completion::Text(text)) => {
                let text = if text.is_empty() {
                    EMPTY_OUTPUT_MESSAGE.to_string()
                } else {
                    text
                };
                self.emit(&node.id, WorkflowEventKind::Thought, text.clone());
                text
            }
            Err(err) => {
                warn!(node = %node.id, %err, "step execution failed");
                self.emit(&node.id, WorkflowEventKind::Output, ERROR_EVENT_MESSAGE);
                ERROR_SENTINEL.to_string()
            }
        }
    }

    /// Simulation path when no backend is configured: fixed delay, a
    /// labeled THOUGHT, then a keyword-routed canned tool invocation.
    async fn run_node_simulated(&self, node: &WorkflowNode, previous_output: &str) -> String {
        tokio::time::sleep(self.simulated_delay).await;
        self.emit(
            &node.id,
            WorkflowEventKind::Thought,
            format!(
                "[SIM] Processing {}...",
                truncate_chars(previous_output, THOUGHT_PREFIX)
            ),
        );

        match route_by_label(&node.label) {
            Some((tool, args)) => self.gateway.execute(tool, &args).await,
            None => COMPLETION_MESSAGE.to_string(),
        }
    }

    /// Runs every node in order, threading outputs into inputs.
    ///
    /// Node statuses move idle → running → success/error around each
    /// step; a sentinel output marks the node as errored but the chain
    /// proceeds with the sentinel as the next input. Clears the run log
    /// first so the bounded log covers exactly one run.
    pub async fn run_chain(
        &self,
        nodes: &mut [WorkflowNode],
        initial_input: &str,
    ) -> Vec<String> {
        self.run_log.clear();
        metrics::counter!("cyberdrill_workflow_runs_total").increment(1);
        info!(nodes = nodes.len(), "workflow run started");

        let mut previous = initial_input.to_string();
        let mut outputs = Vec::with_capacity(nodes.len());
        for node in nodes.iter_mut() {
            node.status = NodeStatus::Running;
            let output = self.run_node(node, &previous).await;
            node.status = if output == ERROR_SENTINEL {
                NodeStatus::Error
            } else {
                NodeStatus::Success
            };
            debug!(node = %node.id, status = ?node.status, "step finished");
            previous.clone_from(&output);
            outputs.push(output);
        }

        info!("workflow run finished");
        outputs
    }

    fn emit(&self, node_id: &NodeId, kind: WorkflowEventKind, content: impl Into<String>) {
        let event = WorkflowEvent::new(node_id.clone(), kind, content);
        if let Some(sink) = &self.sink {
            sink(&event);
        }
        self.run_log.push(event);
    }
}

impl std::fmt::Debug for WorkflowStepExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowStepExecutor")
            .field("simulated_delay", &self.simulated_delay)
            .finish_non_exhaustive()
    }
}

/// Keyword routing for the no-backend simulation path.
fn route_by_label(label: &str) -> Option<(&'static str, serde_json::Value)> {
    if label.contains("Recon") {
        Some((tools::NETWORK_SCAN, json!({ "target": "192.168.1.50" })))
    } else if label.contains("Exploit") {
        Some((tools::EXPLOIT_GENERATOR, json!({ "cve": "CVE-2021-41773" })))
    } else if label.contains("Sensor") || label.contains("Detection") {
        Some((tools::LOG_ANALYZER, json!({ "logs": "GET /cgi-bin/..." })))
    } else if label.contains("Response") {
        Some((tools::FIREWALL_UPDATE, json!({ "rule": "Block IP", "action": "DROP" })))
    } else {
        None
    }
}

/// Resolves the linear traversal order from edges.
///
/// The start node is the one that never appears as an edge target; the
/// walk follows one outgoing edge per node. Nodes unreachable from the
/// start keep their declaration order at the end so every node is
/// visited exactly once.
#[must_use]
pub fn traversal_order(nodes: &[WorkflowNode], edges: &[WorkflowEdge]) -> Vec<NodeId> {
    let mut next: std::collections::HashMap<&NodeId, &NodeId> = std::collections::HashMap::new();
    for edge in edges {
        next.entry(&edge.source).or_insert(&edge.target);
    }

    let start = nodes
        .iter()
        .map(|n| &n.id)
        .find(|id| edges.iter().all(|e| &e.target != *id));

    let mut order: Vec<NodeId> = Vec::with_capacity(nodes.len());
    let mut current = start;
    while let Some(id) = current {
        if order.contains(id) {
            break;
        }
        order.push(id.clone());
        current = next.get(id).copied();
    }
    for node in nodes {
        if !order.contains(&node.id) {
            order.push(node.id.clone());
        }
    }
    order
}
