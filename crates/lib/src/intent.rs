//! Intent classification: map raw inbound text to the strategy that answers it.
//!
//! Pure over the trimmed text and the deployment; never touches the AI or the store.

use crate::config::DeploymentConfig;

/// Which way of answering a message was selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategySelector {
    /// A configured menu key; carries the key.
    Menu(String),
    /// Free text for the assistant.
    Assistant,
    /// Empty, short, or unrecognized: re-present the menu.
    MenuFallback,
}

/// Classify `text` for `deployment`. First matching rule wins:
/// menu key, then long text or the expert key, then menu fallback.
pub fn classify(text: &str, deployment: &DeploymentConfig) -> StrategySelector {
    let trimmed = text.trim();
    if deployment.menu_entry(trimmed).is_some() {
        return StrategySelector::Menu(trimmed.to_string());
    }
    let is_expert_key = deployment
        .expert_key
        .as_deref()
        .map(str::trim)
        .is_some_and(|k| !k.is_empty() && k == trimmed);
    if is_expert_key || trimmed.chars().count() > deployment.short_message_threshold {
        return StrategySelector::Assistant;
    }
    StrategySelector::MenuFallback
}
