//! Agent roster ownership.
//!
//! All agent status/task writes funnel through this one component, so a
//! lifecycle transition can never race another into a lost update. Reads
//! hand out whole-list snapshots; selection and assignment happen inside
//! a single lock acquisition.

use std::sync::Mutex;

use tracing::{debug, warn};

use crate::model::{Agent, AgentId, AgentStatus};

/// Exclusive owner of the mutable agent pool.
pub struct AgentRoster {
    agents: Mutex<Vec<Agent>>,
}

impl AgentRoster {
    /// Creates a roster from the initial agent list.
    #[must_use]
    pub fn new(agents: Vec<Agent>) -> Self {
        Self {
            agents: Mutex::new(agents),
        }
    }

    /// Returns a snapshot of the full agent list.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Agent> {
        self.agents.lock().expect("roster lock poisoned").clone()
    }

    /// Returns a snapshot of one agent, if present.
    #[must_use]
    pub fn get(&self, id: &AgentId) -> Option<Agent> {
        self.agents
            .lock()
            .expect("roster lock poisoned")
            .iter()
            .find(|a| &a.id == id)
            .cloned()
    }

    /// Replaces the whole list, preserving nothing from the old one.
    pub fn replace_all(&self, agents: Vec<Agent>) {
        *self.agents.lock().expect("roster lock poisoned") = agents;
    }

    /// Sets the status and task of one agent.
    ///
    /// Unknown ids are logged and ignored — the roster does not own
    /// agent creation and cannot invent one.
    pub fn assign(&self, id: &AgentId, status: AgentStatus, task: impl Into<String>) {
        let mut agents = self.agents.lock().expect("roster lock poisoned");
        if let Some(agent) = agents.iter_mut().find(|a| &a.id == id) {
            agent.status = status;
            agent.current_task = task.into();
            debug!(agent = %id, %status, "agent assigned");
        } else {
            warn!(agent = %id, "assignment for unknown agent ignored");
        }
    }

    /// Appends a log line to one agent.
    pub fn append_log(&self, id: &AgentId, line: impl Into<String>) {
        let mut agents = self.agents.lock().expect("roster lock poisoned");
        if let Some(agent) = agents.iter_mut().find(|a| &a.id == id) {
            agent.logs.push(line.into());
        }
    }

    /// Selects a responder and marks it in one step.
    ///
    /// Prefers the first idle agent, falling back to the first agent in
    /// the list. Selection and assignment share the lock acquisition, so
    /// two concurrent claims can never both observe the same agent as
    /// idle.
    #[must_use]
    pub fn claim(&self, status: AgentStatus, task: impl Into<String>) -> Option<Agent> {
        let mut agents = self.agents.lock().expect("roster lock poisoned");
        let index = agents
            .iter()
            .position(|a| a.status == AgentStatus::Idle)
            .unwrap_or(0);
        let agent = agents.get_mut(index)?;
        agent.status = status;
        agent.current_task = task.into();
        Some(agent.clone())
    }
}

impl std::fmt::Debug for AgentRoster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRoster")
            .field("agents", &self.snapshot().len())
            .finish_non_exhaustive()
    }
}
