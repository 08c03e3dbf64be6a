//! Scripted menu: fixed replies from the deployment, no external calls.

use super::{ReplyKind, StrategyOutput};
use crate::config::DeploymentConfig;

pub(super) fn respond(key: Option<&str>, deployment: &DeploymentConfig) -> StrategyOutput {
    let Some(key) = key else {
        return StrategyOutput::text(deployment.menu_text.clone(), ReplyKind::MenuFallback);
    };
    match deployment.menu_entry(key) {
        Some(text) if !text.trim().is_empty() => StrategyOutput::text(text, ReplyKind::Menu),
        _ => {
            log::warn!("menu: no reply configured for key {:?}, sending menu", key);
            StrategyOutput::text(deployment.menu_text.clone(), ReplyKind::MenuFallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Script;
    use crate::strategy::AssistantDecision;

    fn deployment() -> DeploymentConfig {
        let mut d = DeploymentConfig {
            script: Script::Menu,
            menu_text: "1) prices 2) hours".to_string(),
            ..DeploymentConfig::default()
        };
        d.menu_entries.insert("1".to_string(), "iPhone 15: 3999 SAR".to_string());
        d.menu_entries.insert("2".to_string(), " ".to_string());
        d
    }

    #[test]
    fn key_returns_configured_text() {
        assert_eq!(
            respond(Some("1"), &deployment()),
            StrategyOutput::text("iPhone 15: 3999 SAR", ReplyKind::Menu)
        );
    }

    #[test]
    fn no_key_returns_menu() {
        assert_eq!(
            respond(None, &deployment()),
            StrategyOutput::text("1) prices 2) hours", ReplyKind::MenuFallback)
        );
    }

    #[test]
    fn misconfigured_key_returns_menu() {
        for key in ["2", "7"] {
            assert_eq!(
                respond(Some(key), &deployment()).decision,
                AssistantDecision::text("1) prices 2) hours")
            );
        }
    }
}
