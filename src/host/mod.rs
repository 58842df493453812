//! Host integration layer.
//!
//! The extension host supplies the environment (platform, env vars, app
//! identity) and speaks a small message protocol with the webview UI. Both
//! are modeled here so the rest of the crate stays pure: functions receive a
//! [`HostEnv`] snapshot instead of reading process globals.

pub mod env;
pub mod protocol;

pub use env::{HostEnv, Platform};
pub use protocol::{handle_request, HostRequest, HostResponse};
