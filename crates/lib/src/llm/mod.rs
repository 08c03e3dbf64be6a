//! AI capability: chat completion with optional function calling.
//!
//! The pipeline depends on [`LlmBackend`] only; [`OpenAiClient`] is the production backend
//! (OpenAI or any OpenAI-compatible endpoint).

mod openai;

pub use openai::OpenAiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("ai request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("ai api error: {0}")]
    Api(String),
    #[error("ai returned no choices")]
    EmptyResponse,
}

/// A message sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One function call returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: Option<String>,
    pub function: ToolCallFunction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallFunction {
    pub name: String,
    /// Raw argument payload exactly as the provider sent it (a JSON document in a string).
    /// Not trusted: callers validate it before use.
    #[serde(default)]
    pub arguments: String,
}

/// Tool definition offered to the model (OpenAI function-calling shape).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub typ: String,
    pub function: ToolFunctionDefinition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolFunctionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: serde_json::Value,
}

/// Assistant message from one completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl ChatResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    /// Accompanying text, or None when the model sent nothing but whitespace.
    pub fn content_text(&self) -> Option<&str> {
        let t = self.content.trim();
        if t.is_empty() {
            None
        } else {
            Some(t)
        }
    }
}

/// Chat completion backend.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// One non-streaming completion. When `tools` is Some, the model chooses between text and a call.
    async fn chat(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        tools: Option<Vec<ToolDefinition>>,
    ) -> Result<ChatResponse, LlmError>;
}
