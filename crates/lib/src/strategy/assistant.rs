//! Knowledge-grounded and tool-invoking assistants: one bounded call to the AI capability.
//!
//! Provider errors, timeouts and empty completions become the deployment's fallback text;
//! the raw error is logged only.

use super::{AssistantDecision, ReplyKind, StrategyContext, StrategyOutput};
use crate::actions::{self, ActionRequest};
use crate::channels::InboundMessage;
use crate::llm::{ChatMessage, ChatResponse, LlmError, ToolDefinition};
use crate::store::StoreError;

const TOOLS_HINT: &str = "If the customer asks to book an appointment and has given a date and time, call create_appointment with the date exactly as the customer wrote it. Otherwise answer in text.";

enum CallError {
    Timeout,
    Provider(LlmError),
}

pub(super) async fn respond_with_knowledge(
    message: &InboundMessage,
    ctx: &StrategyContext<'_>,
) -> StrategyOutput {
    match call(message, ctx, None).await {
        Ok(res) => match res.content_text() {
            Some(text) => StrategyOutput::text(text, ReplyKind::Assistant),
            None => {
                log::warn!("assistant: empty completion, sending fallback");
                fallback(ctx)
            }
        },
        Err(e) => {
            log_call_error(&e);
            fallback(ctx)
        }
    }
}

pub(super) async fn respond_with_tools(
    message: &InboundMessage,
    ctx: &StrategyContext<'_>,
) -> StrategyOutput {
    let res = match call(message, ctx, Some(actions::definitions())).await {
        Ok(res) => res,
        Err(e) => {
            log_call_error(&e);
            return fallback(ctx);
        }
    };
    let Some(tool_call) = res.tool_calls.first() else {
        return match res.content_text() {
            Some(text) => StrategyOutput::text(text, ReplyKind::Assistant),
            None => {
                log::warn!("assistant: empty completion, sending fallback");
                fallback(ctx)
            }
        };
    };
    if res.tool_calls.len() > 1 {
        log::debug!(
            "assistant: {} tool calls returned, using the first",
            res.tool_calls.len()
        );
    }
    match ActionRequest::validate(&tool_call.function.name, &tool_call.function.arguments) {
        Ok(request) => StrategyOutput {
            decision: AssistantDecision::ActionRequest(request),
            kind: ReplyKind::Assistant,
        },
        Err(e) => {
            log::warn!(
                "assistant: rejected call to {}: {}",
                tool_call.function.name,
                e
            );
            match res.content_text() {
                Some(text) => StrategyOutput::text(text, ReplyKind::Assistant),
                None => fallback(ctx),
            }
        }
    }
}

fn fallback(ctx: &StrategyContext<'_>) -> StrategyOutput {
    StrategyOutput::text(
        ctx.deployment.fallback_text.clone(),
        ReplyKind::AssistantUnavailable,
    )
}

fn log_call_error(e: &CallError) {
    match e {
        CallError::Timeout => log::warn!("assistant: ai call timed out, sending fallback"),
        CallError::Provider(e) => log::warn!("assistant: ai call failed: {}, sending fallback", e),
    }
}

/// Resolve the instruction, then run one completion. Each step has its own bound so a slow
/// settings read never takes the completion's turn.
async fn call(
    message: &InboundMessage,
    ctx: &StrategyContext<'_>,
    tools: Option<Vec<ToolDefinition>>,
) -> Result<ChatResponse, CallError> {
    let instructions = resolve_instructions(ctx).await;
    let system = build_system_context(
        &instructions,
        ctx.deployment.knowledge.as_deref(),
        tools.is_some(),
    );
    let messages = vec![
        ChatMessage::system(system),
        ChatMessage::user(message.text.trim()),
    ];
    let completion = ctx.llm.chat(ctx.model, messages, tools);
    match tokio::time::timeout(ctx.ai_timeout, completion).await {
        Ok(Ok(res)) => Ok(res),
        Ok(Err(e)) => Err(CallError::Provider(e)),
        Err(_) => Err(CallError::Timeout),
    }
}

/// Settings record when enabled and present, else the deployment's instruction, else the built-in
/// one. A settings read slower than `ctx.settings_timeout` counts as a failed read.
async fn resolve_instructions(ctx: &StrategyContext<'_>) -> String {
    if ctx.deployment.load_instructions_from_store {
        let lookup = ctx.store.load_instructions();
        let loaded = tokio::time::timeout(ctx.settings_timeout, lookup)
            .await
            .unwrap_or(Err(StoreError::Timeout(ctx.settings_timeout)));
        match loaded {
            Ok(Some(s)) if !s.trim().is_empty() => return s,
            Ok(_) => log::debug!("assistant: no instructions in settings, using configured"),
            Err(e) => log::warn!("assistant: loading settings failed: {}", e),
        }
    }
    ctx.deployment.instructions_or_default().to_string()
}

/// System message: today's date (for bookings), the instruction, then the business knowledge.
fn build_system_context(instructions: &str, knowledge: Option<&str>, with_tools: bool) -> String {
    let mut out = String::new();
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    out.push_str("Today's date: ");
    out.push_str(&today);
    out.push_str("\n\n");
    out.push_str(instructions.trim());
    if let Some(k) = knowledge.map(str::trim).filter(|k| !k.is_empty()) {
        out.push_str("\n\n## Knowledge\n\n");
        out.push_str(k);
    }
    if with_tools {
        out.push_str("\n\n");
        out.push_str(TOOLS_HINT);
    }
    out
}
