//! Streaming response adapter for the Claude Code CLI.
//!
//! Consumes the CLI's heterogeneous message stream and lazily produces a
//! normalized chunk stream, suspending at each upstream yield. Token usage
//! accumulates across every assistant message seen; exactly one usage chunk
//! is emitted at stream end, whether or not the CLI sent its terminal
//! result message.
//!
//! Wire shapes are owned by the external CLI and matched exactly, not
//! redesigned. Raw constructors mirror the wire; domain types are the
//! closed sum consumed by the adapter.

use crate::provider::models::ModelInfo;
use async_stream::try_stream;
use futures::{pin_mut, Stream, StreamExt};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Prefix marking an assistant text block as an escalated API error.
const ERROR_PREFIX: &str = "API Error";

/// Failure substring translated into a user-facing composed error.
const INVALID_MODEL_MARKER: &str = "Invalid model name";

/// Hint appended to invalid-model errors.
pub const INVALID_MODEL_HINT: &str = "The selected model is not recognized by the Claude Code CLI. \
     Pick a different model in the extension settings, or update the ANTHROPIC_MODEL override in \
     the CLI settings file.";

/// Placeholder emitted for redacted thinking blocks.
const REDACTED_THINKING_PLACEHOLDER: &str = "[Redacted thinking block]";

/// Marker value of `apiKeySource` indicating subscription (free) usage.
const API_KEY_SOURCE_NONE: &str = "none";

// ===== Wire structures =====

/// Raw JSON structure of one CLI output message.
#[derive(Debug, Deserialize)]
struct RawCliMessage {
    #[serde(rename = "type")]
    message_type: String,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default, rename = "apiKeySource")]
    api_key_source: Option<String>,
    #[serde(default)]
    message: Option<RawAssistantMessage>,
    #[serde(default)]
    total_cost_usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawAssistantMessage {
    #[serde(default)]
    content: Vec<RawContentBlock>,
    #[serde(default)]
    usage: Option<TurnUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawContentBlock {
    Text { text: String },
    Thinking { thinking: String },
    RedactedThinking {},
    ToolUse { name: String },
    #[serde(other)]
    Unknown,
}

// ===== Domain types =====

/// Token usage reported with one assistant message.
///
/// Field names follow the CLI wire format; all fields default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TurnUsage {
    /// Input tokens for this turn
    #[serde(default)]
    pub input_tokens: u64,
    /// Output tokens for this turn
    #[serde(default)]
    pub output_tokens: u64,
    /// Prompt-cache read tokens for this turn
    #[serde(default)]
    pub cache_read_input_tokens: u64,
    /// Prompt-cache write tokens for this turn
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
}

/// One content block of an assistant message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// Visible assistant text
    Text(String),
    /// Extended reasoning text
    Thinking(String),
    /// Reasoning the backend redacted; only its presence is known
    RedactedThinking,
    /// Tool invocation; not translated by this adapter
    ToolUse {
        /// Tool the assistant attempted to invoke
        name: String,
    },
    /// Block type this adapter does not recognize
    Unknown,
}

/// One assistant turn: content blocks plus usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantTurn {
    /// Content blocks in wire order
    content: Vec<ContentBlock>,
    /// Usage reported for this turn
    usage: TurnUsage,
}

impl AssistantTurn {
    /// Create an assistant turn from blocks and usage.
    pub fn new(content: Vec<ContentBlock>, usage: TurnUsage) -> Self {
        Self { content, usage }
    }

    /// Content blocks in wire order.
    pub fn content(&self) -> &[ContentBlock] {
        &self.content
    }

    /// Usage reported for this turn.
    pub fn usage(&self) -> TurnUsage {
        self.usage
    }
}

/// One message from the CLI output stream.
///
/// Closed sum over the shapes the CLI produces. Unknown tags land in
/// [`CliMessage::Unrecognized`] so new upstream message types surface as an
/// explicit diagnostic case instead of a silent fallthrough.
#[derive(Debug, Clone, PartialEq)]
pub enum CliMessage {
    /// Plain text fragment (raw, non-JSON CLI output)
    Text(String),
    /// Initialization message carrying the usage attribution marker
    SystemInit {
        /// Where the CLI's credentials come from; the sentinel `"none"`
        /// means subscription usage (cost forced to zero)
        api_key_source: Option<String>,
    },
    /// Assistant message with content blocks and usage
    Assistant(AssistantTurn),
    /// Terminal result message
    Result {
        /// Result subtype reported by the CLI
        subtype: Option<String>,
        /// Total cost the CLI attributes to the session
        total_cost_usd: Option<f64>,
    },
    /// Message with a tag this adapter does not handle
    Unrecognized(serde_json::Value),
}

impl CliMessage {
    /// Decode one line of CLI output.
    ///
    /// Non-JSON lines and JSON string values become plain text fragments;
    /// JSON objects with unhandled tags become [`CliMessage::Unrecognized`].
    pub fn parse_line(line: &str) -> Self {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(line) else {
            return Self::Text(line.to_string());
        };
        match value {
            serde_json::Value::String(text) => Self::Text(text),
            serde_json::Value::Object(_) => Self::from_object(value),
            other => Self::Unrecognized(other),
        }
    }

    /// Convert a decoded JSON object into the closed message sum.
    fn from_object(value: serde_json::Value) -> Self {
        let raw: RawCliMessage = match serde_json::from_value(value.clone()) {
            Ok(raw) => raw,
            Err(_) => return Self::Unrecognized(value),
        };

        match raw.message_type.as_str() {
            "system" if raw.subtype.as_deref() == Some("init") => Self::SystemInit {
                api_key_source: raw.api_key_source,
            },
            "assistant" => match raw.message {
                Some(message) => {
                    let usage = message.usage.unwrap_or_default();
                    let content = message.content.into_iter().map(ContentBlock::from).collect();
                    Self::Assistant(AssistantTurn::new(content, usage))
                }
                None => Self::Unrecognized(value),
            },
            "result" => Self::Result {
                subtype: raw.subtype,
                total_cost_usd: raw.total_cost_usd,
            },
            _ => Self::Unrecognized(value),
        }
    }
}

impl From<RawContentBlock> for ContentBlock {
    fn from(raw: RawContentBlock) -> Self {
        match raw {
            RawContentBlock::Text { text } => Self::Text(text),
            RawContentBlock::Thinking { thinking } => Self::Thinking(thinking),
            RawContentBlock::RedactedThinking {} => Self::RedactedThinking,
            RawContentBlock::ToolUse { name } => Self::ToolUse { name },
            RawContentBlock::Unknown => Self::Unknown,
        }
    }
}

// ===== Output chunks =====

/// Accumulated usage emitted once at stream end.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageChunk {
    /// Input tokens summed across all assistant messages
    pub input_tokens: u64,
    /// Output tokens summed across all assistant messages
    pub output_tokens: u64,
    /// Cache-read tokens summed across all assistant messages
    pub cache_read_tokens: u64,
    /// Cache-write tokens summed across all assistant messages
    pub cache_write_tokens: u64,
    /// Cost in USD; zero for subscription usage
    pub total_cost: f64,
}

/// Normalized chunk produced by the adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    /// Visible assistant text
    Text(String),
    /// Reasoning text (thinking blocks, or the redacted placeholder)
    Reasoning(String),
    /// Accumulated usage; exactly one per stream, at stream end
    Usage(UsageChunk),
}

// ===== Errors =====

/// Fatal errors surfaced by the CLI during message generation.
///
/// These terminate the consuming iteration; the caller sees a rejected
/// pull and no usage chunk for the failed turn.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The CLI rejected the configured model id.
    #[error("{text}\n\n{}", INVALID_MODEL_HINT)]
    InvalidModel {
        /// Full error text reported by the CLI
        text: String,
    },
    /// Any other error payload surfaced by the CLI.
    #[error("Claude Code error: {text}")]
    Upstream {
        /// Error message extracted from the payload, or the raw text
        text: String,
    },
}

/// Classify an escalated error text from an assistant message.
///
/// A JSON payload is extracted starting at the first `{` when present; the
/// known invalid-model failure composes the original text with a hint,
/// anything else is raised as an upstream error.
fn escalate(text: &str) -> AdapterError {
    if text.contains(INVALID_MODEL_MARKER) {
        return AdapterError::InvalidModel {
            text: text.to_string(),
        };
    }

    let payload = text
        .find('{')
        .and_then(|start| serde_json::from_str::<serde_json::Value>(&text[start..]).ok());
    let detail = payload
        .as_ref()
        .and_then(extract_error_message)
        .unwrap_or_else(|| text.to_string());

    AdapterError::Upstream { text: detail }
}

/// Pull a human-readable message out of an error payload.
fn extract_error_message(payload: &serde_json::Value) -> Option<String> {
    let nested = payload
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(serde_json::Value::as_str);
    let top_level = payload.get("message").and_then(serde_json::Value::as_str);
    nested.or(top_level).map(str::to_string)
}

// ===== Accumulator =====

/// Running token totals across one stream.
#[derive(Debug, Clone, Copy, Default)]
struct UsageAccumulator {
    input_tokens: u64,
    output_tokens: u64,
    cache_read_tokens: u64,
    cache_write_tokens: u64,
}

impl UsageAccumulator {
    /// Add one assistant turn's usage to the running totals.
    fn add(&mut self, usage: TurnUsage) {
        self.input_tokens += usage.input_tokens;
        self.output_tokens += usage.output_tokens;
        self.cache_read_tokens += usage.cache_read_input_tokens;
        self.cache_write_tokens += usage.cache_creation_input_tokens;
    }

    /// Produce the terminal usage chunk.
    ///
    /// Cost is computed from the accumulated tokens at the model's prices
    /// and forced to zero for subscription usage, regardless of any cost
    /// the CLI reported.
    fn finalize(self, model: &ModelInfo, paid: bool) -> UsageChunk {
        let total_cost = if paid {
            model.cost_usd(
                self.input_tokens,
                self.output_tokens,
                self.cache_read_tokens,
                self.cache_write_tokens,
            )
        } else {
            0.0
        };

        UsageChunk {
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            cache_read_tokens: self.cache_read_tokens,
            cache_write_tokens: self.cache_write_tokens,
            total_cost,
        }
    }
}

// ===== Adapter =====

/// Adapt the CLI message stream into normalized chunks.
///
/// Lazy one-pass mapping: the adapter suspends at each upstream yield and
/// holds no state beyond its local accumulator. Exactly one usage chunk is
/// emitted, on the terminal result message or on upstream exhaustion.
pub fn adapt_stream<S>(
    upstream: S,
    model: ModelInfo,
) -> impl Stream<Item = Result<StreamChunk, AdapterError>>
where
    S: Stream<Item = CliMessage>,
{
    try_stream! {
        pin_mut!(upstream);

        let mut usage = UsageAccumulator::default();
        // Paid unless the init message marks subscription usage.
        let mut paid = true;
        let mut usage_emitted = false;

        while let Some(message) = upstream.next().await {
            match message {
                CliMessage::Text(text) => {
                    yield StreamChunk::Text(text);
                }
                CliMessage::SystemInit { api_key_source } => {
                    paid = api_key_source.as_deref() != Some(API_KEY_SOURCE_NONE);
                }
                CliMessage::Assistant(turn) => {
                    if let Some(ContentBlock::Text(text)) = turn.content().first() {
                        if text.starts_with(ERROR_PREFIX) {
                            Err(escalate(text))?;
                        }
                    }

                    for block in turn.content() {
                        match block {
                            ContentBlock::Text(text) => {
                                yield StreamChunk::Text(text.clone());
                            }
                            ContentBlock::Thinking(thinking) => {
                                yield StreamChunk::Reasoning(thinking.clone());
                            }
                            ContentBlock::RedactedThinking => {
                                yield StreamChunk::Reasoning(
                                    REDACTED_THINKING_PLACEHOLDER.to_string(),
                                );
                            }
                            ContentBlock::ToolUse { name } => {
                                warn!(tool = %name, "dropping unsupported tool_use block");
                            }
                            ContentBlock::Unknown => {
                                warn!("dropping unrecognized content block");
                            }
                        }
                    }

                    usage.add(turn.usage());
                }
                CliMessage::Result { subtype, .. } => {
                    if !usage_emitted {
                        usage_emitted = true;
                        tracing::debug!(?subtype, "finalizing usage on result message");
                        yield StreamChunk::Usage(usage.finalize(&model, paid));
                    }
                }
                CliMessage::Unrecognized(value) => {
                    let tag = value.get("type").and_then(serde_json::Value::as_str);
                    warn!(?tag, "ignoring unrecognized CLI message");
                }
            }
        }

        // The CLI exited without a result message; still account for what
        // was seen.
        if !usage_emitted {
            yield StreamChunk::Usage(usage.finalize(&model, paid));
        }
    }
}

// ===== Tests =====
