//! Shared test fixtures.
#![allow(dead_code)] // Each test binary uses a different subset.

use std::collections::VecDeque;
use std::sync::Mutex;

use cyberdrill::error::ReasoningError;
use cyberdrill::model::{Agent, Team};
use cyberdrill::reasoning::{Completion, CompletionRequest, ReasoningClient, ToolCallRequest};

/// One scripted backend response.
pub enum Scripted {
    /// Plain text completion.
    Text(&'static str),
    /// A requested tool invocation.
    ToolCall(&'static str, serde_json::Value),
    /// A backend call failure.
    Fail(&'static str),
}

/// A reasoning backend that replays a fixed response script.
///
/// Reports itself available and pops one scripted response per call;
/// an exhausted script fails the call.
pub struct ScriptedClient {
    script: Mutex<VecDeque<Scripted>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }
}

#[async_trait::async_trait]
impl ReasoningClient for ScriptedClient {
    fn available(&self) -> bool {
        true
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<Completion, ReasoningError> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(Completion::Text(text.to_string())),
            Some(Scripted::ToolCall(name, args)) => Ok(Completion::ToolCall(ToolCallRequest {
                name: name.to_string(),
                args,
            })),
            Some(Scripted::Fail(message)) => Err(ReasoningError::Backend(message.to_string())),
            None => Err(ReasoningError::Backend("script exhausted".to_string())),
        }
    }
}

/// A red agent fixture.
#[must_use]
pub fn red_agent(id: &str, name: &str) -> Agent {
    Agent::trained(id, name, "Exploitation Engineer", Team::Red, &["SQL Injection"], 90)
}

/// A blue agent fixture.
#[must_use]
pub fn blue_agent(id: &str, name: &str) -> Agent {
    Agent::trained(id, name, "Threat Detection System", Team::Blue, &["SIEM Analysis"], 92)
}
