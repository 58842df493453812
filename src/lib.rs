//! ccbridge
//!
//! Backend slice of a code-editor extension, split into two independent
//! utility chains with no shared runtime state:
//!
//! - [`keybinding`] resolves human-readable keybinding labels for commands,
//!   honoring user override files across editor forks and profiles.
//! - [`provider`] wraps the Claude Code CLI as a streaming chat backend with
//!   provider/model detection from local settings files.
//!
//! Both chains are invoked on demand by the extension host; neither owns
//! background tasks, timers, or persistent processes. Host facilities
//! (platform, environment, extension metadata) are injected via [`host`]
//! following the Pure Core / Impure Shell architecture.

pub mod host;
pub mod keybinding;
pub mod logging;
pub mod provider;
