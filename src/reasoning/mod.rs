//! Reasoning backend boundary.
//!
//! The backend is consumed through a narrow request/response contract:
//! given a prompt and optional tool declarations it returns either free
//! text or a request to invoke exactly one tool. The backend may be
//! absent entirely; every caller owns a deterministic fallback for that
//! case, so nothing in the simulation hard-depends on it.
//!
//! The client is injected as an explicit capability parameter into each
//! component that needs it — there is no process-wide singleton.

pub mod narrative;

use serde::{Deserialize, Serialize};

use crate::error::ReasoningError;

/// A tool made visible to the reasoning backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// Tool name (e.g. `"network_scan"`)
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON parameter schema
    pub parameters: serde_json::Value,
}

/// A request to the reasoning backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Prompt text
    pub prompt: String,
    /// Tools the backend may request; empty when tool use is not wanted
    #[serde(default)]
    pub tools: Vec<ToolDeclaration>,
}

impl CompletionRequest {
    /// Builds a text-only request with no tool declarations.
    #[must_use]
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            tools: Vec::new(),
        }
    }

    /// Builds a request carrying the given tool declarations.
    #[must_use]
    pub fn with_tools(prompt: impl Into<String>, tools: Vec<ToolDeclaration>) -> Self {
        Self {
            prompt: prompt.into(),
            tools,
        }
    }
}

/// A requested tool invocation from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Name of the tool to invoke
    pub name: String,
    /// Loose JSON arguments; validated at the gateway boundary
    pub args: serde_json::Value,
}

/// A completion from the reasoning backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Completion {
    /// Free text
    Text(String),
    /// A request to invoke exactly one tool
    ToolCall(ToolCallRequest),
}

/// The reasoning backend capability.
///
/// Implementations fail closed: a rejected call surfaces as
/// [`ReasoningError`], never as a panic, and callers substitute fixed
/// fallback content at the call site.
#[async_trait::async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Whether a backend is configured and reachable.
    fn available(&self) -> bool;

    /// Sends one request and awaits the completion.
    ///
    /// # Errors
    ///
    /// Returns [`ReasoningError::Unavailable`] when no backend is
    /// configured, or [`ReasoningError::Backend`] for call failures.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, ReasoningError>;
}

/// The no-backend client.
///
/// `available` is always false and `complete` always fails, which routes
/// every caller onto its deterministic fallback path.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

#[async_trait::async_trait]
impl ReasoningClient for Unconfigured {
    fn available(&self) -> bool {
        false
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<Completion, ReasoningError> {
        Err(ReasoningError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_is_unavailable() {
        let client = Unconfigured;
        assert!(!client.available());
        let err = tokio_test::block_on(client.complete(CompletionRequest::text("hello")))
            .unwrap_err();
        assert!(matches!(err, ReasoningError::Unavailable));
    }

    #[test]
    fn request_builders() {
        let req = CompletionRequest::text("p");
        assert!(req.tools.is_empty());

        let decl = ToolDeclaration {
            name: "network_scan".to_string(),
            description: "Scans a subnet".to_string(),
            parameters: serde_json::json!({"type": "object"}),
        };
        let req = CompletionRequest::with_tools("p", vec![decl]);
        assert_eq!(req.tools.len(), 1);
    }
}
