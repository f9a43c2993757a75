//! Metric registration.
//!
//! Counters are recorded through the `metrics` facade; installing a
//! recorder (and any exporter) is left to the embedding application.

use metrics::describe_counter;

/// Registers descriptions for every counter the crate records.
pub fn describe_metrics() {
    describe_counter!(
        "cyberdrill_attacks_launched_total",
        "Attacks launched by the orchestrator"
    );
    describe_counter!(
        "cyberdrill_defenses_resolved_total",
        "Defenses that reached a terminal status, labeled by outcome"
    );
    describe_counter!(
        "cyberdrill_tool_invocations_total",
        "Tool invocations executed by the gateway, labeled by tool"
    );
    describe_counter!(
        "cyberdrill_workflow_runs_total",
        "Workflow chains executed"
    );
}
