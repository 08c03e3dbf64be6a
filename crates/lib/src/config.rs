//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.wathiq/config.json`) and environment.
//! Secrets (AI key, store key) may come from the environment instead of the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::store::TicketStatus;

/// Instruction used when neither the settings store nor the deployment provides one.
pub const DEFAULT_INSTRUCTIONS: &str =
    "أنت مساعد ذكي لنظام الواثق، رد بمهنية بناءً على قاعدة المعرفة.";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// AI capability (OpenAI-compatible chat completions).
    #[serde(default)]
    pub ai: AiConfig,

    /// Record store (tickets, appointments, settings).
    #[serde(default)]
    pub store: StoreConfig,

    /// The business this gateway answers for: script, menu, knowledge, texts.
    #[serde(default)]
    pub deployment: DeploymentConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 3000).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    3000
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// AI capability settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    /// OpenAI-compatible base URL (including `/v1`). Overridden by OPENAI_BASE_URL env.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Model id passed as-is to the provider.
    #[serde(default = "default_ai_model")]
    pub model: String,

    /// API key. Overridden by OPENAI_API_KEY env.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Upper bound for the completion request. The settings lookup has its own bound
    /// (`store.timeoutMs`). Must stay below the telephony webhook timeout (15s for Twilio).
    #[serde(default = "default_ai_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub max_tokens: Option<u32>,

    #[serde(default)]
    pub temperature: Option<f32>,
}

fn default_ai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_ai_timeout_ms() -> u64 {
    8000
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: default_ai_model(),
            api_key: None,
            timeout_ms: default_ai_timeout_ms(),
            max_tokens: None,
            temperature: None,
        }
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Supabase (PostgREST) store settings. When no URL is configured an in-memory store is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Project URL (e.g. https://xyz.supabase.co). Overridden by SUPABASE_URL env.
    #[serde(default)]
    pub url: Option<String>,

    /// Service or anon key. Overridden by SUPABASE_KEY env.
    #[serde(default)]
    pub key: Option<String>,

    /// Upper bound for each store request (settings read, appointment and ticket writes).
    /// Together with `ai.timeoutMs` it must stay below the telephony webhook timeout.
    #[serde(default = "default_store_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_store_timeout_ms() -> u64 {
    2000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            key: None,
            timeout_ms: default_store_timeout_ms(),
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// How short codes are treated: `menu` deployments answer numbered keys from a fixed table,
/// `plain` deployments have no keys and only distinguish short from long messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Menu,
    #[default]
    Plain,
}

/// Which assistant answers free-text messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssistantMode {
    /// Knowledge-grounded text only.
    #[default]
    Knowledge,
    /// Knowledge-grounded with callable actions (e.g. booking).
    ToolInvoking,
}

/// Status and tag written on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketLabel {
    pub status: TicketStatus,
    pub tag: String,
}

impl TicketLabel {
    pub fn new(status: TicketStatus, tag: impl Into<String>) -> Self {
        Self {
            status,
            tag: tag.into(),
        }
    }
}

/// Ticket status/tag per way of answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TicketPolicy {
    /// Menu answers, including the menu re-presented for short messages.
    pub menu: TicketLabel,
    pub assistant: TicketLabel,
    /// Assistant unavailable: the customer got the fallback text and still needs a human.
    pub fallback: TicketLabel,
    pub booked: TicketLabel,
    pub booking_failed: TicketLabel,
}

impl Default for TicketPolicy {
    fn default() -> Self {
        Self {
            menu: TicketLabel::new(TicketStatus::Automated, "menu"),
            assistant: TicketLabel::new(TicketStatus::Answered, "ai"),
            fallback: TicketLabel::new(TicketStatus::Pending, "ai-unavailable"),
            booked: TicketLabel::new(TicketStatus::Answered, "booking"),
            booking_failed: TicketLabel::new(TicketStatus::Escalated, "booking-failed"),
        }
    }
}

/// Per-business configuration. Every field has a default so partial files load.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeploymentConfig {
    pub name: String,
    pub script: Script,
    pub assistant: AssistantMode,
    /// Shown for short/unrecognized messages and as the safe default on menu misconfiguration.
    pub menu_text: String,
    /// Menu key (e.g. "1") -> fixed reply. Ignored for `plain` scripts.
    pub menu_entries: BTreeMap<String, String>,
    /// Key that routes straight to the assistant regardless of length.
    pub expert_key: Option<String>,
    /// Messages longer than this many characters go to the assistant.
    pub short_message_threshold: usize,
    /// System instruction; the settings store takes precedence when enabled.
    pub instructions: Option<String>,
    /// Business facts and tone policy appended to the system instruction.
    pub knowledge: Option<String>,
    pub load_instructions_from_store: bool,
    /// Reply when the assistant is unavailable; should offer a human channel.
    pub fallback_text: String,
    /// Booking confirmation; `{date}` is replaced by the stored date verbatim.
    pub booking_confirmation: String,
    pub booking_failed_text: String,
    /// Sender used for web requests without `From`.
    pub web_visitor_label: String,
    pub ticket_policy: TicketPolicy,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            name: "wathiq".to_string(),
            script: Script::Plain,
            assistant: AssistantMode::Knowledge,
            menu_text: "Hello! Please describe your question and we will get back to you."
                .to_string(),
            menu_entries: BTreeMap::new(),
            expert_key: None,
            short_message_threshold: 3,
            instructions: None,
            knowledge: None,
            load_instructions_from_store: false,
            fallback_text: "Sorry, our assistant is unavailable right now. A member of our team will reply to you shortly."
                .to_string(),
            booking_confirmation: "Your appointment is booked for {date}.".to_string(),
            booking_failed_text: "Sorry, we could not confirm your booking. Please try again later."
                .to_string(),
            web_visitor_label: "Web visitor".to_string(),
            ticket_policy: TicketPolicy::default(),
        }
    }
}

impl DeploymentConfig {
    /// Fixed reply for a menu key, if the script is `menu` and the key is configured.
    pub fn menu_entry(&self, key: &str) -> Option<&str> {
        match self.script {
            Script::Menu => self.menu_entries.get(key).map(String::as_str),
            Script::Plain => None,
        }
    }

    /// Configured instruction or the built-in default.
    pub fn instructions_or_default(&self) -> &str {
        self.instructions
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_INSTRUCTIONS)
    }

    /// Booking confirmation with the date substituted verbatim.
    pub fn confirmation_for(&self, date: &str) -> String {
        if self.booking_confirmation.contains("{date}") {
            self.booking_confirmation.replace("{date}", date)
        } else {
            format!("{} {}", self.booking_confirmation.trim_end(), date)
        }
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolve the AI API key: env OPENAI_API_KEY overrides config.
pub fn resolve_ai_api_key(config: &Config) -> Option<String> {
    non_empty_env("OPENAI_API_KEY").or_else(|| non_empty(config.ai.api_key.as_ref()))
}

/// Resolve the AI base URL: env OPENAI_BASE_URL overrides config.
pub fn resolve_ai_base_url(config: &Config) -> Option<String> {
    non_empty_env("OPENAI_BASE_URL").or_else(|| non_empty(config.ai.base_url.as_ref()))
}

/// Resolve the store URL: env SUPABASE_URL overrides config.
pub fn resolve_store_url(config: &Config) -> Option<String> {
    non_empty_env("SUPABASE_URL").or_else(|| non_empty(config.store.url.as_ref()))
}

/// Resolve the store key: env SUPABASE_KEY overrides config.
pub fn resolve_store_key(config: &Config) -> Option<String> {
    non_empty_env("SUPABASE_KEY").or_else(|| non_empty(config.store.key.as_ref()))
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("WATHIQ_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".wathiq").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, WATHIQ_CONFIG_PATH, or the default. Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gateway_port_and_bind() {
        let g = GatewayConfig::default();
        assert_eq!(g.port, 3000);
        assert_eq!(g.bind, "127.0.0.1");
    }

    #[test]
    fn partial_deployment_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"deployment":{"script":"menu","menuEntries":{"1":"hours"},"shortMessageThreshold":5}}"#,
        )
        .unwrap();
        let d = &config.deployment;
        assert_eq!(d.script, Script::Menu);
        assert_eq!(d.short_message_threshold, 5);
        assert_eq!(d.menu_entry("1"), Some("hours"));
        assert_eq!(d.web_visitor_label, "Web visitor");
        assert_eq!(config.ai.model, "gpt-3.5-turbo");
        assert_eq!(config.ai.timeout(), Duration::from_millis(8000));
        assert_eq!(config.store.timeout(), Duration::from_millis(2000));
    }

    #[test]
    fn store_timeout_is_configurable() {
        let config: Config =
            serde_json::from_str(r#"{"store":{"url":"https://x.supabase.co","timeoutMs":750}}"#)
                .unwrap();
        assert_eq!(config.store.timeout(), Duration::from_millis(750));
        assert_eq!(config.store.key, None);
    }

    #[test]
    fn plain_script_ignores_menu_entries() {
        let mut d = DeploymentConfig::default();
        d.menu_entries.insert("1".to_string(), "hours".to_string());
        assert_eq!(d.menu_entry("1"), None);
    }

    #[test]
    fn blank_instructions_fall_back_to_builtin() {
        let mut d = DeploymentConfig::default();
        assert_eq!(d.instructions_or_default(), DEFAULT_INSTRUCTIONS);
        d.instructions = Some("   ".to_string());
        assert_eq!(d.instructions_or_default(), DEFAULT_INSTRUCTIONS);
        d.instructions = Some("Be brief.".to_string());
        assert_eq!(d.instructions_or_default(), "Be brief.");
    }

    #[test]
    fn confirmation_echoes_date_verbatim() {
        let mut d = DeploymentConfig::default();
        assert_eq!(
            d.confirmation_for("2025-05-01 10:00"),
            "Your appointment is booked for 2025-05-01 10:00."
        );
        d.booking_confirmation = "Booked:".to_string();
        assert_eq!(d.confirmation_for("tomorrow 5pm"), "Booked: tomorrow 5pm");
    }

    #[test]
    fn ticket_policy_parses_lowercase_status() {
        let policy: TicketPolicy = serde_json::from_str(
            r#"{"menu":{"status":"answered","tag":"faq"}}"#,
        )
        .unwrap();
        assert_eq!(policy.menu, TicketLabel::new(TicketStatus::Answered, "faq"));
        assert_eq!(policy.fallback.status, TicketStatus::Pending);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir()
            .join(format!("wathiq-config-test-{}", uuid::Uuid::new_v4()))
            .join("config.json");
        let (config, used) = load_config(Some(path.clone())).unwrap();
        assert_eq!(used, path);
        assert_eq!(config.deployment.name, "wathiq");
    }
}
