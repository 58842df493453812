//! User keybinding override file discovery.
//!
//! Locates the most relevant `keybindings.json` for the current
//! installation, across editor forks, portable installs, server-hosted
//! variants, and user profiles. Parsing is permissive (comments and
//! trailing commas allowed); every failure mode degrades to an empty rule
//! set rather than an error.

use crate::host::{HostEnv, Platform};
use crate::keybinding::resolver::KeybindingEntry;
use std::path::PathBuf;
use std::time::SystemTime;
use tracing::debug;

/// Override file name inside a user configuration directory.
const OVERRIDE_FILE_NAME: &str = "keybindings.json";

/// Subdirectory holding one configuration directory per user profile.
const PROFILES_DIR_NAME: &str = "profiles";

/// Environment variable pointing at a portable-install data directory.
const PORTABLE_VAR: &str = "VSCODE_PORTABLE";

// ===== ProductVariant =====

/// Known editor forks, recognized by display-name substring.
///
/// Closed enumeration with an explicit unknown-to-default fallback, so the
/// app-name-to-directory mapping is exhaustively testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductVariant {
    /// Visual Studio Code stable (also the fallback for unrecognized names)
    Stable,
    /// Visual Studio Code Insiders
    Insiders,
    /// VSCodium community build
    Vscodium,
    /// Cursor fork
    Cursor,
    /// Server-hosted code-server (XDG data directory layout)
    Server,
}

impl ProductVariant {
    /// Recognize the product from the running application's display name.
    ///
    /// Matching is case-insensitive substring matching, most specific
    /// first; unrecognized names fall back to [`ProductVariant::Stable`].
    pub fn from_app_name(app_name: &str) -> Self {
        let lower = app_name.to_lowercase();
        if lower.contains("insiders") {
            Self::Insiders
        } else if lower.contains("vscodium") {
            Self::Vscodium
        } else if lower.contains("cursor") {
            Self::Cursor
        } else if lower.contains("code-server") {
            Self::Server
        } else {
            Self::Stable
        }
    }

    /// Product-specific configuration directory name.
    pub fn config_dir_name(self) -> &'static str {
        match self {
            Self::Stable => "Code",
            Self::Insiders => "Code - Insiders",
            Self::Vscodium => "VSCodium",
            Self::Cursor => "Cursor",
            Self::Server => "code-server",
        }
    }
}

// ===== Discovery =====

/// Load the user's keybinding override rules for this installation.
///
/// Returns an empty rule set when the session is remote or browser-hosted
/// (capability check), when no candidate file exists, or when every
/// candidate fails to read or parse. Never returns an error.
pub fn load_user_keybindings(env: &HostEnv) -> Vec<KeybindingEntry> {
    if env.is_remote() {
        debug!("remote session, skipping keybinding override discovery");
        return Vec::new();
    }

    let Some(user_dir) = resolve_user_dir(env) else {
        debug!("no user configuration directory resolvable");
        return Vec::new();
    };

    for candidate in candidate_files(&user_dir) {
        match read_rules(&candidate) {
            Some(rules) => {
                debug!(path = %candidate.display(), rules = rules.len(), "loaded keybinding overrides");
                return rules;
            }
            None => {
                debug!(path = %candidate.display(), "candidate unreadable or not a rule list, trying next");
            }
        }
    }

    Vec::new()
}

/// Resolve the user configuration directory for the current product.
///
/// Precedence: portable-install override, then the server-hosted XDG data
/// layout, then the OS-conventional per-platform config root.
pub fn resolve_user_dir(env: &HostEnv) -> Option<PathBuf> {
    if let Some(portable) = env.var(PORTABLE_VAR) {
        return Some(PathBuf::from(portable).join("user-data").join("User"));
    }

    let variant = ProductVariant::from_app_name(env.app_name());

    if variant == ProductVariant::Server {
        // code-server keeps user data under the XDG data dir, not config.
        let data_home = match env.var("XDG_DATA_HOME") {
            Some(dir) => PathBuf::from(dir),
            None => env.home_dir()?.join(".local").join("share"),
        };
        return Some(data_home.join(variant.config_dir_name()).join("User"));
    }

    let config_root = match env.platform() {
        Platform::Windows => match env.var("APPDATA") {
            Some(dir) => PathBuf::from(dir),
            None => env.home_dir()?.join("AppData").join("Roaming"),
        },
        Platform::MacOs => env.home_dir()?.join("Library").join("Application Support"),
        Platform::Linux => match env.var("XDG_CONFIG_HOME") {
            Some(dir) => PathBuf::from(dir),
            None => env.home_dir()?.join(".config"),
        },
    };

    Some(config_root.join(variant.config_dir_name()).join("User"))
}

/// Enumerate candidate override files under the user directory.
///
/// The top-level `keybindings.json` plus one per profile subdirectory.
/// Only existing files are returned; when more than one exists they are
/// ordered by descending last-modified time, since the most recently
/// touched file is assumed to belong to the active profile (the active
/// profile id itself is not independently obtainable).
fn candidate_files(user_dir: &std::path::Path) -> Vec<PathBuf> {
    let mut candidates = vec![user_dir.join(OVERRIDE_FILE_NAME)];

    let profiles_dir = user_dir.join(PROFILES_DIR_NAME);
    if let Ok(entries) = std::fs::read_dir(&profiles_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                candidates.push(path.join(OVERRIDE_FILE_NAME));
            }
        }
    }

    candidates.retain(|path| path.is_file());

    if candidates.len() > 1 {
        candidates.sort_by_key(|path| {
            let modified = std::fs::metadata(path)
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            std::cmp::Reverse(modified)
        });
    }

    candidates
}

/// Read and permissively parse one candidate file.
///
/// Accepts comments and trailing commas. Returns `None` unless the file
/// reads as UTF-8 and parses to a top-level list of entries.
fn read_rules(path: &std::path::Path) -> Option<Vec<KeybindingEntry>> {
    let contents = std::fs::read_to_string(path).ok()?;
    json5::from_str(&contents).ok()
}

// ===== Tests =====
