//! Response strategies: the three ways a message gets answered.
//!
//! The intent classifier picks a [`StrategySelector`]; together with the deployment's assistant
//! mode that yields a [`Strategy`]. Each strategy produces an [`AssistantDecision`] and the
//! [`ReplyKind`] used for the ticket.

mod assistant;
mod menu;

use std::time::Duration;

use crate::actions::ActionRequest;
use crate::channels::InboundMessage;
use crate::config::{AssistantMode, DeploymentConfig};
use crate::intent::StrategySelector;
use crate::llm::LlmBackend;
use crate::store::RecordStore;

/// What a strategy decided. Exactly one variant per message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantDecision {
    TextReply { content: String },
    ActionRequest(ActionRequest),
}

impl AssistantDecision {
    pub fn text(content: impl Into<String>) -> Self {
        AssistantDecision::TextReply {
            content: content.into(),
        }
    }
}

/// How the final reply came about; maps to a ticket status/tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Menu,
    MenuFallback,
    Assistant,
    AssistantUnavailable,
    Booked,
    BookingFailed,
}

/// Decision plus how it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyOutput {
    pub decision: AssistantDecision,
    pub kind: ReplyKind,
}

impl StrategyOutput {
    pub fn text(content: impl Into<String>, kind: ReplyKind) -> Self {
        Self {
            decision: AssistantDecision::text(content),
            kind,
        }
    }
}

/// Collaborators and limits a strategy may use. Built per request from the pipeline's shared parts.
pub struct StrategyContext<'a> {
    pub deployment: &'a DeploymentConfig,
    pub llm: &'a dyn LlmBackend,
    pub store: &'a dyn RecordStore,
    pub model: &'a str,
    /// Bound on the completion request.
    pub ai_timeout: Duration,
    /// Bound on the settings lookup that precedes it.
    pub settings_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// Fixed text by menu key; `None` re-presents the menu.
    ScriptedMenu { key: Option<String> },
    KnowledgeGrounded,
    ToolInvoking,
}

impl Strategy {
    pub fn select(selector: StrategySelector, deployment: &DeploymentConfig) -> Self {
        match selector {
            StrategySelector::Menu(key) => Strategy::ScriptedMenu { key: Some(key) },
            StrategySelector::MenuFallback => Strategy::ScriptedMenu { key: None },
            StrategySelector::Assistant => match deployment.assistant {
                AssistantMode::Knowledge => Strategy::KnowledgeGrounded,
                AssistantMode::ToolInvoking => Strategy::ToolInvoking,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::ScriptedMenu { .. } => "scripted_menu",
            Strategy::KnowledgeGrounded => "knowledge_grounded",
            Strategy::ToolInvoking => "tool_invoking",
        }
    }

    /// Produce a decision. Never fails: provider errors and timeouts become the fallback text.
    pub async fn respond(
        &self,
        message: &InboundMessage,
        ctx: &StrategyContext<'_>,
    ) -> StrategyOutput {
        match self {
            Strategy::ScriptedMenu { key } => menu::respond(key.as_deref(), ctx.deployment),
            Strategy::KnowledgeGrounded => assistant::respond_with_knowledge(message, ctx).await,
            Strategy::ToolInvoking => assistant::respond_with_tools(message, ctx).await,
        }
    }
}
