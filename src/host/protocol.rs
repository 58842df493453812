//! Webview messaging protocol for keybinding lookup.
//!
//! The webview UI requests labels with `{type:"getKeybindings"}` and the
//! extension host replies with `{type:"keybindings"}`. There is no request
//! id; the consumer correlates by observing the next message of that type.

use crate::host::HostEnv;
use crate::keybinding::{resolve_labels, KeybindingEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ===== HostRequest =====

/// Message sent from the webview UI to the extension host.
///
/// Tagged on the wire by the `type` field in camelCase, matching the host
/// editor's messaging channel format.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostRequest {
    /// Request display labels for an ordered list of command ids.
    #[serde(rename_all = "camelCase")]
    GetKeybindings {
        /// Command ids to resolve, in request order
        command_ids: Vec<String>,
    },
}

// ===== HostResponse =====

/// Message sent from the extension host back to the webview UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostResponse {
    /// Resolved labels keyed by command id.
    ///
    /// Every requested id is present; unresolvable ids map to `null`.
    Keybindings {
        /// Command id to optional display label
        keybindings: BTreeMap<String, Option<String>>,
    },
}

/// Handle a webview request against the injected host environment.
///
/// Each command id resolves independently (no shared state, no
/// deduplication); the response preserves all requested ids as keys.
pub fn handle_request(
    request: &HostRequest,
    env: &HostEnv,
    defaults: &[KeybindingEntry],
) -> HostResponse {
    match request {
        HostRequest::GetKeybindings { command_ids } => HostResponse::Keybindings {
            keybindings: resolve_labels(command_ids, env, defaults),
        },
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Platform;

    #[test]
    fn request_deserializes_from_camel_case_wire_format() {
        let json = r#"{"type":"getKeybindings","commandIds":["a.b","c.d"]}"#;
        let request: HostRequest = serde_json::from_str(json).expect("valid request");

        assert_eq!(
            request,
            HostRequest::GetKeybindings {
                command_ids: vec!["a.b".to_string(), "c.d".to_string()],
            }
        );
    }

    #[test]
    fn response_serializes_with_type_tag_and_null_for_unresolved() {
        let mut keybindings = BTreeMap::new();
        keybindings.insert("a.b".to_string(), Some("Ctrl+I".to_string()));
        keybindings.insert("c.d".to_string(), None);

        let response = HostResponse::Keybindings { keybindings };
        let json = serde_json::to_string(&response).expect("serializable");

        assert_eq!(
            json,
            r#"{"type":"keybindings","keybindings":{"a.b":"Ctrl+I","c.d":null}}"#
        );
    }

    #[test]
    fn handle_request_resolves_from_extension_defaults() {
        let env = HostEnv::new(Platform::Linux, "Visual Studio Code", true);
        let defaults = vec![KeybindingEntry::new("ctrl+i", "ext.open")];
        let request = HostRequest::GetKeybindings {
            command_ids: vec!["ext.open".to_string(), "ext.unknown".to_string()],
        };

        let HostResponse::Keybindings { keybindings } = handle_request(&request, &env, &defaults);

        assert_eq!(
            keybindings.get("ext.open"),
            Some(&Some("Ctrl+I".to_string()))
        );
        assert_eq!(keybindings.get("ext.unknown"), Some(&None));
    }
}
