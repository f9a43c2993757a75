//! Core data model for the simulation.
//!
//! Lifecycle records are immutable value snapshots: transitions produce a
//! new record rather than mutating in place, so no locking is needed to
//! share them across scheduled continuations.

pub mod agent;
pub mod attack;
pub mod defense;
pub mod log;
pub mod workflow;

pub use agent::{Agent, AgentId, AgentStatus, Team};
pub use attack::{AttackId, AttackKind, AttackRecord, AttackStatus};
pub use defense::{DefenseId, DefenseRecord, DefenseStatus};
pub use log::{LogEntry, LogLevel};
pub use workflow::{
    NodeId, NodeRole, NodeStatus, WorkflowEdge, WorkflowEvent, WorkflowEventKind, WorkflowNode,
};
