//! Claude Code CLI chat backend.
//!
//! Wraps the third-party CLI as a streaming chat backend: [`settings`]
//! discovers which backend the CLI is configured to talk to, [`models`]
//! holds the static model tables, [`handler`] freezes a per-instance model
//! selection, and [`stream`] translates the CLI's message stream into
//! normalized chunks with usage and cost accounting.

pub mod handler;
pub mod models;
pub mod settings;
pub mod stream;

pub use handler::{ClaudeCodeHandler, HandlerOptions, ModelSelection};
pub use models::{claude_models, AlternativeProvider, ModelInfo, ModelTable, DEFAULT_MODEL_ID};
pub use settings::{load_settings, CliSettings};
pub use stream::{adapt_stream, AdapterError, CliMessage, StreamChunk, UsageChunk};
