//! Hook registration
//!
//! Adds a command hook for every subscribed event to the assistant's
//! `settings.json`, leaving everything else in the file untouched.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Map, Value};

use pet_core::events::SUBSCRIBED_HOOKS;

/// Marker used to recognise a hook we installed earlier
const COMMAND_MARKER: &str = "pet-hook";

/// Which events were registered by one run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Newly registered
    pub added: Vec<&'static str>,
    /// Already registered
    pub skipped: Vec<&'static str>,
}

/// `~/.claude/settings.json`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".claude").join("settings.json"))
}

/// Register `command` for every subscribed event in `settings_path`
pub fn register_hooks(settings_path: &Path, command: &str) -> Result<InstallReport> {
    let mut settings = read_settings(settings_path)?;

    let hooks = settings
        .as_object_mut()
        .ok_or_else(|| anyhow!("{} is not a JSON object", settings_path.display()))?
        .entry("hooks")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| anyhow!("\"hooks\" is not an object"))?;

    let entry = json!({
        "matcher": "",
        "hooks": [{ "type": "command", "command": command }]
    });

    let mut report = InstallReport::default();
    for &event in SUBSCRIBED_HOOKS {
        let registered = hooks
            .entry(event)
            .or_insert_with(|| Value::Array(Vec::new()))
            .as_array_mut()
            .ok_or_else(|| anyhow!("\"hooks.{event}\" is not an array"))?;

        if registered.iter().any(is_pet_hook) {
            report.skipped.push(event);
        } else {
            registered.push(entry.clone());
            report.added.push(event);
        }
    }

    if let Some(parent) = settings_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(&settings)?;
    std::fs::write(settings_path, text + "\n")
        .with_context(|| format!("Failed to write {}", settings_path.display()))?;

    tracing::info!(
        path = %settings_path.display(),
        added = report.added.len(),
        skipped = report.skipped.len(),
        "Hooks registered"
    );
    Ok(report)
}

fn read_settings(path: &Path) -> Result<Value> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(json!({})),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };
    if text.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn is_pet_hook(entry: &Value) -> bool {
    entry
        .get("hooks")
        .and_then(Value::as_array)
        .is_some_and(|hooks| {
            hooks.iter().any(|h| {
                h.get("command")
                    .and_then(Value::as_str)
                    .is_some_and(|c| c.contains(COMMAND_MARKER))
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const COMMAND: &str = "/usr/local/bin/pet-hook send";

    #[test]
    fn test_fresh_install_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".claude").join("settings.json");

        let report = register_hooks(&path, COMMAND).unwrap();
        assert_eq!(report.added, SUBSCRIBED_HOOKS.to_vec());
        assert!(report.skipped.is_empty());

        let settings: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            settings["hooks"]["Stop"][0]["hooks"][0]["command"],
            json!(COMMAND)
        );
        assert_eq!(settings["hooks"]["PreToolUse"][0]["matcher"], json!(""));
    }

    #[test]
    fn test_second_install_skips_everything() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");

        register_hooks(&path, COMMAND).unwrap();
        let report = register_hooks(&path, COMMAND).unwrap();
        assert!(report.added.is_empty());
        assert_eq!(report.skipped.len(), SUBSCRIBED_HOOKS.len());

        let settings: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(settings["hooks"]["Notification"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_existing_settings_are_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{
                "model": "opus",
                "hooks": {
                    "Stop": [{"matcher": "", "hooks": [{"type": "command", "command": "notify-send done"}]}]
                }
            }"#,
        )
        .unwrap();

        let report = register_hooks(&path, COMMAND).unwrap();
        assert_eq!(report.added.len(), 4);

        let settings: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(settings["model"], json!("opus"));
        assert_eq!(settings["hooks"]["Stop"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_malformed_settings_are_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"hooks": []}"#).unwrap();

        assert!(register_hooks(&path, COMMAND).is_err());
        // File left as it was
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"hooks": []}"#);
    }
}
