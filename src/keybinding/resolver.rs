//! Command-to-label resolution.
//!
//! Finds the raw key string bound to a command id — user override rules
//! first, then the extension's declared defaults — and renders it for
//! display. Later-declared rules for the same command and "when"-clause
//! filtering are ignored (first match wins).

use crate::host::HostEnv;
use crate::keybinding::discovery::load_user_keybindings;
use crate::keybinding::format::format_keybinding;
use serde::Deserialize;
use std::collections::BTreeMap;

// ===== KeybindingEntry =====

/// One rule from a user override file or an extension's declared defaults.
///
/// Every field is optional in the file format; rules without a command or
/// without a non-empty key never match. No uniqueness invariant is
/// enforced across a rule list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeybindingEntry {
    /// Raw key string (e.g. `"ctrl+k ctrl+s"`)
    #[serde(default)]
    key: Option<String>,
    /// Command id this rule binds
    #[serde(default)]
    command: Option<String>,
    /// Context clause; recorded but never evaluated
    #[serde(default)]
    when: Option<String>,
    /// Command arguments; recorded but never evaluated
    #[serde(default)]
    args: Option<serde_json::Value>,
}

impl KeybindingEntry {
    /// Create a rule binding `key` to `command`.
    ///
    /// Smart constructor for extension-declared defaults and tests.
    pub fn new(key: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            command: Some(command.into()),
            when: None,
            args: None,
        }
    }

    /// Raw key string, if declared.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Bound command id, if declared.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    /// Context clause, if declared (never evaluated).
    pub fn when(&self) -> Option<&str> {
        self.when.as_deref()
    }
}

/// First non-empty key bound to `command_id` in a rule list.
///
/// A rule matches when its command equals the id and its key is non-empty
/// after trimming; the trimmed key is returned.
fn raw_key_for<'a>(command_id: &str, rules: &'a [KeybindingEntry]) -> Option<&'a str> {
    rules.iter().find_map(|rule| {
        if rule.command() != Some(command_id) {
            return None;
        }
        let key = rule.key()?.trim();
        if key.is_empty() {
            None
        } else {
            Some(key)
        }
    })
}

/// Resolve the display label for one command id.
///
/// User override rules take precedence over the extension's declared
/// defaults. Returns `None` when neither source binds a non-empty key to
/// the command. Override-file access errors are absorbed by discovery and
/// degrade to "no override found".
pub fn resolve_label(
    command_id: &str,
    env: &HostEnv,
    defaults: &[KeybindingEntry],
) -> Option<String> {
    let overrides = load_user_keybindings(env);
    let raw = raw_key_for(command_id, &overrides).or_else(|| raw_key_for(command_id, defaults))?;
    Some(format_keybinding(raw, env.platform()))
}

/// Resolve display labels for an ordered list of command ids.
///
/// Each id resolves independently (no shared state, no deduplication);
/// every requested id appears as a key, mapping to `None` when unresolved.
pub fn resolve_labels(
    command_ids: &[String],
    env: &HostEnv,
    defaults: &[KeybindingEntry],
) -> BTreeMap<String, Option<String>> {
    command_ids
        .iter()
        .map(|id| (id.clone(), resolve_label(id, env, defaults)))
        .collect()
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Platform;

    fn offline_env(platform: Platform) -> HostEnv {
        // Remote sessions skip override discovery, so resolution exercises
        // only the extension defaults supplied by the test.
        HostEnv::new(platform, "Visual Studio Code", true)
    }

    #[test]
    fn entry_deserializes_with_all_fields_optional() {
        let entry: KeybindingEntry = serde_json::from_str("{}").expect("valid entry");
        assert_eq!(entry.key(), None);
        assert_eq!(entry.command(), None);
        assert_eq!(entry.when(), None);
    }

    #[test]
    fn entry_deserializes_full_rule() {
        let entry: KeybindingEntry = serde_json::from_str(
            r#"{"key": "ctrl+i", "command": "ext.open", "when": "editorFocus", "args": {"x": 1}}"#,
        )
        .expect("valid entry");

        assert_eq!(entry.key(), Some("ctrl+i"));
        assert_eq!(entry.command(), Some("ext.open"));
        assert_eq!(entry.when(), Some("editorFocus"));
    }

    #[test]
    fn raw_key_skips_rules_with_blank_keys() {
        let rules = vec![
            KeybindingEntry::new("   ", "ext.open"),
            KeybindingEntry::new("ctrl+i", "ext.open"),
        ];

        assert_eq!(raw_key_for("ext.open", &rules), Some("ctrl+i"));
    }

    #[test]
    fn raw_key_takes_first_match_not_last() {
        let rules = vec![
            KeybindingEntry::new("ctrl+1", "ext.open"),
            KeybindingEntry::new("ctrl+2", "ext.open"),
        ];

        assert_eq!(raw_key_for("ext.open", &rules), Some("ctrl+1"));
    }

    #[test]
    fn raw_key_trims_surrounding_whitespace() {
        let rules = vec![KeybindingEntry::new("  cmd+i ", "ext.open")];
        assert_eq!(raw_key_for("ext.open", &rules), Some("cmd+i"));
    }

    #[test]
    fn resolve_label_uses_extension_default() {
        let defaults = vec![KeybindingEntry::new("cmd+i", "ext.open")];
        let env = offline_env(Platform::MacOs);

        assert_eq!(
            resolve_label("ext.open", &env, &defaults),
            Some("Cmd+I".to_string())
        );
    }

    #[test]
    fn resolve_label_formats_for_host_platform() {
        let defaults = vec![KeybindingEntry::new("cmd+i", "ext.open")];
        let env = offline_env(Platform::Windows);

        assert_eq!(
            resolve_label("ext.open", &env, &defaults),
            Some("Ctrl+I".to_string())
        );
    }

    #[test]
    fn resolve_label_returns_none_for_unknown_command() {
        let defaults = vec![KeybindingEntry::new("cmd+i", "ext.open")];
        let env = offline_env(Platform::Linux);

        assert_eq!(resolve_label("ext.unknown", &env, &defaults), None);
    }

    #[test]
    fn resolve_labels_preserves_all_requested_ids() {
        let defaults = vec![
            KeybindingEntry::new("cmd+i", "ext.open"),
            KeybindingEntry::new("ctrl+k ctrl+s", "ext.chord"),
        ];
        let env = offline_env(Platform::Linux);
        let ids = vec![
            "ext.open".to_string(),
            "ext.unknown".to_string(),
            "ext.chord".to_string(),
        ];

        let labels = resolve_labels(&ids, &env, &defaults);

        assert_eq!(labels.len(), 3);
        assert_eq!(labels["ext.open"], Some("Ctrl+I".to_string()));
        assert_eq!(labels["ext.unknown"], None);
        assert_eq!(labels["ext.chord"], Some("Ctrl+K, Ctrl+S".to_string()));
    }
}
