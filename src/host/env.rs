//! Injected host environment.
//!
//! Platform and environment reads are threaded through an explicit snapshot
//! rather than `std::env` globals, so tests and alternate hosts can supply
//! their own values without mutating shared process state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

// ===== Platform =====

/// Operating-system family the host is running on.
///
/// Drives keybinding display formatting (mac vs non-mac modifier names) and
/// per-platform configuration root resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Windows (roaming app-data config root, "Win" meta key)
    Windows,
    /// macOS (`Library/Application Support` config root, "Cmd" modifier)
    MacOs,
    /// Linux and other Unix-likes (XDG config root)
    Linux,
}

impl Platform {
    /// Detect the platform the current process is compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    /// Whether this platform uses the mac modifier family (Cmd/Option).
    pub fn is_mac(self) -> bool {
        matches!(self, Self::MacOs)
    }
}

// ===== HostEnv =====

/// Immutable snapshot of the host environment.
///
/// Captures everything the keybinding and provider chains need from the
/// host: platform family, the running application's display name (used to
/// recognize editor forks), whether the session is remote or browser-hosted,
/// the user's home directory, and a map of environment variables.
///
/// Build with [`HostEnv::from_process`] in the extension host, or with
/// [`HostEnv::new`] plus the `with_*` builders in tests.
#[derive(Debug, Clone)]
pub struct HostEnv {
    /// Platform family
    platform: Platform,
    /// Application display name (e.g. "Visual Studio Code")
    app_name: String,
    /// Remote or browser-hosted session (no local file system access)
    remote: bool,
    /// User home directory, if resolvable
    home_dir: Option<PathBuf>,
    /// Environment variable snapshot
    vars: HashMap<String, String>,
}

impl HostEnv {
    /// Create an environment snapshot with no variables and no home dir.
    ///
    /// Smart constructor for tests and alternate hosts; chain `with_var` and
    /// `with_home_dir` to populate.
    pub fn new(platform: Platform, app_name: impl Into<String>, remote: bool) -> Self {
        Self {
            platform,
            app_name: app_name.into(),
            remote,
            home_dir: None,
            vars: HashMap::new(),
        }
    }

    /// Capture the real process environment (impure shell constructor).
    ///
    /// Reads the current platform, all environment variables, and the home
    /// directory once; the snapshot never re-reads afterwards.
    pub fn from_process(app_name: impl Into<String>, remote: bool) -> Self {
        Self {
            platform: Platform::current(),
            app_name: app_name.into(),
            remote,
            home_dir: dirs::home_dir(),
            vars: std::env::vars().collect(),
        }
    }

    /// Add an environment variable (builder pattern).
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Set the home directory (builder pattern).
    pub fn with_home_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(path.into());
        self
    }

    /// Platform family of the host.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Application display name reported by the host.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Whether the session is remote or browser-hosted.
    ///
    /// Remote sessions cannot reach the local keybinding override files, so
    /// discovery is skipped entirely (capability check, not an error).
    pub fn is_remote(&self) -> bool {
        self.remote
    }

    /// Look up an environment variable from the snapshot.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// User home directory, if one was resolvable.
    pub fn home_dir(&self) -> Option<&Path> {
        self.home_dir.as_deref()
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_is_mac_only_for_macos() {
        assert!(Platform::MacOs.is_mac());
        assert!(!Platform::Windows.is_mac());
        assert!(!Platform::Linux.is_mac());
    }

    #[test]
    fn new_env_has_no_vars_or_home() {
        let env = HostEnv::new(Platform::Linux, "Visual Studio Code", false);
        assert_eq!(env.var("HOME"), None);
        assert!(env.home_dir().is_none());
    }

    #[test]
    fn with_var_makes_variable_visible() {
        let env = HostEnv::new(Platform::Linux, "Code", false).with_var("XDG_CONFIG_HOME", "/cfg");
        assert_eq!(env.var("XDG_CONFIG_HOME"), Some("/cfg"));
    }

    #[test]
    fn with_home_dir_sets_home() {
        let env = HostEnv::new(Platform::MacOs, "Code", false).with_home_dir("/Users/dev");
        assert_eq!(env.home_dir(), Some(Path::new("/Users/dev")));
    }

    #[test]
    fn accessors_return_constructor_values() {
        let env = HostEnv::new(Platform::Windows, "VSCodium", true);
        assert_eq!(env.platform(), Platform::Windows);
        assert_eq!(env.app_name(), "VSCodium");
        assert!(env.is_remote());
    }

    #[test]
    fn from_process_captures_platform() {
        let env = HostEnv::from_process("Code", false);
        assert_eq!(env.platform(), Platform::current());
    }
}
