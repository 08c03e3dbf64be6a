//! Bundled deployment presets (`crates/lib/presets/*.json`), used by `init` and tests.

use anyhow::{Context, Result};
use include_dir::{include_dir, Dir};

use crate::config::DeploymentConfig;

static PRESETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/presets");

/// Preset written by `init` when none is named.
pub const DEFAULT_PRESET: &str = "wathiq";

/// Names of bundled presets, sorted.
pub fn names() -> Vec<String> {
    let mut names: Vec<String> = PRESETS
        .files()
        .filter(|f| f.path().extension().is_some_and(|e| e == "json"))
        .filter_map(|f| f.path().file_stem()?.to_str().map(String::from))
        .collect();
    names.sort();
    names
}

/// Parse the named preset.
pub fn load(name: &str) -> Result<DeploymentConfig> {
    let file = PRESETS
        .get_file(format!("{}.json", name))
        .with_context(|| format!("unknown preset {:?} (available: {})", name, names().join(", ")))?;
    let text = file
        .contents_utf8()
        .with_context(|| format!("preset {} is not UTF-8", name))?;
    serde_json::from_str(text).with_context(|| format!("parsing preset {}", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AssistantMode, Script};

    #[test]
    fn bundled_presets_are_listed() {
        assert_eq!(names(), vec!["iphone-store".to_string(), "wathiq".to_string()]);
    }

    #[test]
    fn every_preset_parses() {
        for name in names() {
            let d = load(&name).unwrap();
            assert_eq!(d.name, name);
            assert!(!d.menu_text.trim().is_empty());
            assert!(!d.fallback_text.trim().is_empty());
        }
    }

    #[test]
    fn iphone_store_menu() {
        let d = load("iphone-store").unwrap();
        assert_eq!(d.script, Script::Menu);
        assert_eq!(d.assistant, AssistantMode::ToolInvoking);
        assert!(d.menu_entry("1").unwrap().contains("jotform.com"));
        assert_eq!(d.expert_key.as_deref(), Some("5"));
        assert!(d.menu_entry("5").is_none());
        assert!(d.booking_confirmation.contains("{date}"));
    }

    #[test]
    fn unknown_preset_is_an_error() {
        assert!(load("bakery").is_err());
    }
}
