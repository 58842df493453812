//! Keybinding label resolution.
//!
//! Resolves a human-readable, platform-formatted display string for a
//! command id. User override rules (read from the editor's keybinding
//! override file, see [`discovery`]) take precedence over the extension's
//! declared defaults; the winning raw key string is rendered by [`format`].
//!
//! Known simplification: "when"-clause evaluation and removal rules
//! (entries that unbind a default) are not modeled. The first matching
//! rule wins.

pub mod discovery;
pub mod format;
pub mod resolver;

pub use discovery::{load_user_keybindings, ProductVariant};
pub use format::format_keybinding;
pub use resolver::{resolve_label, resolve_labels, KeybindingEntry};
