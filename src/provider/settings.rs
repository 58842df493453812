//! Claude Code CLI settings lookup and provider detection.
//!
//! The CLI's settings live in JSON files checked across five fixed
//! candidate paths in priority order. The first file that reads and parses
//! wins; every failure falls through to the next candidate, and exhausting
//! all candidates means "no settings" (primary defaults apply).

use crate::provider::models::AlternativeProvider;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings directory name under the home or project directory.
const SETTINGS_DIR_NAME: &str = ".claude";

/// Settings file name inside the settings directory.
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Machine-local overrides file name inside the settings directory.
const LOCAL_SETTINGS_FILE_NAME: &str = "settings.local.json";

/// Legacy single-file global config in the home directory.
const LEGACY_SETTINGS_FILE_NAME: &str = ".claude.json";

// ===== CliSettings =====

/// Parsed CLI settings file.
///
/// Only the `env` section matters here; unknown fields are ignored so any
/// valid settings file parses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CliSettings {
    /// Environment overrides the CLI applies to itself
    #[serde(default)]
    env: Option<CliEnvSettings>,
}

/// The `env` section of a CLI settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CliEnvSettings {
    /// Alternative backend base URL, if configured
    #[serde(default, rename = "ANTHROPIC_BASE_URL")]
    anthropic_base_url: Option<String>,
    /// Explicitly configured model id, if any
    #[serde(default, rename = "ANTHROPIC_MODEL")]
    anthropic_model: Option<String>,
}

impl CliSettings {
    /// Configured base URL, if any.
    ///
    /// Absence of the `env` section or of the URL field is equivalent to
    /// "no alternative provider".
    pub fn base_url(&self) -> Option<&str> {
        self.env.as_ref()?.anthropic_base_url.as_deref()
    }

    /// Explicitly configured model id, if any.
    pub fn model(&self) -> Option<&str> {
        self.env.as_ref()?.anthropic_model.as_deref()
    }

    /// Detect whether a recognized alternative backend is configured.
    pub fn detect_provider(&self) -> Option<AlternativeProvider> {
        AlternativeProvider::from_base_url(self.base_url()?)
    }
}

/// Candidate settings paths in priority order.
///
/// Global user settings, global local overrides, project settings, project
/// local overrides, then the legacy single-file global config.
pub fn candidate_paths(home_dir: Option<&Path>, project_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(5);

    if let Some(home) = home_dir {
        let global = home.join(SETTINGS_DIR_NAME);
        candidates.push(global.join(SETTINGS_FILE_NAME));
        candidates.push(global.join(LOCAL_SETTINGS_FILE_NAME));
    }
    if let Some(project) = project_dir {
        let local = project.join(SETTINGS_DIR_NAME);
        candidates.push(local.join(SETTINGS_FILE_NAME));
        candidates.push(local.join(LOCAL_SETTINGS_FILE_NAME));
    }
    if let Some(home) = home_dir {
        candidates.push(home.join(LEGACY_SETTINGS_FILE_NAME));
    }

    candidates
}

/// Load settings from the first candidate that reads and parses.
///
/// Read and parse failures skip silently to the next candidate; `None`
/// means no candidate succeeded and the primary defaults apply. Callers
/// cache the result per handler instance and never re-read.
pub fn load_settings(home_dir: Option<&Path>, project_dir: Option<&Path>) -> Option<CliSettings> {
    for candidate in candidate_paths(home_dir, project_dir) {
        let Ok(contents) = std::fs::read_to_string(&candidate) else {
            continue;
        };
        match serde_json::from_str::<CliSettings>(&contents) {
            Ok(settings) => {
                debug!(path = %candidate.display(), "loaded CLI settings");
                return Some(settings);
            }
            Err(error) => {
                debug!(path = %candidate.display(), %error, "skipping unparseable settings file");
            }
        }
    }
    None
}

// ===== Tests =====
