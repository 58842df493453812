//! Claude Code chat handler.
//!
//! One handler instance per chat backend. Initialization reads the CLI
//! settings at most once, detects an alternative provider, and freezes the
//! model selection into an immutable snapshot; `model` and
//! `create_message` read that snapshot and never re-derive it.

use crate::provider::models::{claude_models, AlternativeProvider, ModelInfo, DEFAULT_MODEL_ID};
use crate::provider::settings::{load_settings, CliSettings};
use crate::provider::stream::{adapt_stream, AdapterError, CliMessage, StreamChunk};
use futures::Stream;
use std::path::PathBuf;
use tracing::debug;

// ===== HandlerOptions =====

/// Caller-supplied configuration for a handler instance.
#[derive(Debug, Clone, Default)]
pub struct HandlerOptions {
    /// Model id requested by the caller (primary provider only)
    pub model_id: Option<String>,
    /// Project directory searched for project-level settings
    pub project_dir: Option<PathBuf>,
    /// Home directory override; defaults to the process home directory
    pub home_dir: Option<PathBuf>,
}

// ===== ModelSelection =====

/// Model id and record frozen at handler initialization.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSelection {
    /// Selected model id
    id: String,
    /// Pricing/capability record for the selected id
    info: ModelInfo,
}

impl ModelSelection {
    /// Selected model id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Pricing/capability record for the selected id.
    pub fn info(&self) -> &ModelInfo {
        &self.info
    }
}

// ===== ClaudeCodeHandler =====

/// Streaming chat backend wrapping the Claude Code CLI.
///
/// The settings cache and model selection are written exactly once by
/// [`ClaudeCodeHandler::initialize`] and read-only afterwards; each
/// instance owns its own snapshot, so no cross-instance sharing or locking
/// exists.
#[derive(Debug, Clone)]
pub struct ClaudeCodeHandler {
    /// Settings file content cached at initialization (never re-read)
    settings: Option<CliSettings>,
    /// Frozen model selection
    selection: ModelSelection,
}

impl ClaudeCodeHandler {
    /// Create a handler, detecting the provider and selecting a model.
    ///
    /// All initialization failures (unreadable files, parse errors) are
    /// absorbed: the handler silently resolves to the primary default
    /// model and never surfaces an error to the caller.
    pub async fn initialize(options: HandlerOptions) -> Self {
        let home_dir = options.home_dir.or_else(dirs::home_dir);
        let settings = load_settings(home_dir.as_deref(), options.project_dir.as_deref());
        let selection = select_model(settings.as_ref(), options.model_id.as_deref());

        debug!(model = %selection.id(), "claude code handler initialized");
        Self {
            settings,
            selection,
        }
    }

    /// The frozen model selection.
    pub fn model(&self) -> &ModelSelection {
        &self.selection
    }

    /// Settings cached at initialization, if any candidate file was read.
    pub fn settings(&self) -> Option<&CliSettings> {
        self.settings.as_ref()
    }

    /// Adapt one CLI invocation's message stream into normalized chunks.
    ///
    /// Pricing for usage accounting comes from the frozen selection.
    pub fn create_message<S>(
        &self,
        upstream: S,
    ) -> impl Stream<Item = Result<StreamChunk, AdapterError>>
    where
        S: Stream<Item = CliMessage>,
    {
        adapt_stream(upstream, self.selection.info().clone())
    }
}

/// Select the model id and record from cached settings.
///
/// A detected alternative provider pins selection to its table: the
/// explicitly configured model id when the table contains it, else the
/// table's first declared key. Without an alternative provider, the
/// caller-supplied id is used when the primary table recognizes it, else
/// the fixed default.
fn select_model(settings: Option<&CliSettings>, requested: Option<&str>) -> ModelSelection {
    if let Some(provider) = settings.and_then(CliSettings::detect_provider) {
        return select_from_alternative(provider, settings);
    }

    let table = claude_models();
    let id = requested
        .filter(|id| table.contains_key(id))
        .unwrap_or(DEFAULT_MODEL_ID);
    ModelSelection {
        id: id.to_string(),
        info: table[id].clone(),
    }
}

/// Select within a detected alternative provider's table.
fn select_from_alternative(
    provider: AlternativeProvider,
    settings: Option<&CliSettings>,
) -> ModelSelection {
    let table = provider.models();
    let configured = settings
        .and_then(CliSettings::model)
        .filter(|id| table.contains_key(id));

    let (id, info) = match configured {
        Some(id) => (id, table[id].clone()),
        // First declared key; tables are order-preserving by construction.
        None => {
            let (first_id, first_info) = table.first().expect("provider tables are non-empty");
            (*first_id, first_info.clone())
        }
    };

    ModelSelection {
        id: id.to_string(),
        info,
    }
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::models::zai_models;
    use std::fs;
    use tempfile::TempDir;

    fn write_global_settings(home: &TempDir, contents: &str) {
        let dir = home.path().join(".claude");
        fs::create_dir_all(&dir).expect("create settings dir");
        fs::write(dir.join("settings.json"), contents).expect("write settings");
    }

    fn options_with_home(home: &TempDir) -> HandlerOptions {
        HandlerOptions {
            home_dir: Some(home.path().to_path_buf()),
            ..HandlerOptions::default()
        }
    }

    #[tokio::test]
    async fn no_settings_selects_primary_default() {
        let home = TempDir::new().expect("temp dir");

        let handler = ClaudeCodeHandler::initialize(options_with_home(&home)).await;

        assert_eq!(handler.model().id(), DEFAULT_MODEL_ID);
        assert_eq!(handler.model().info(), &claude_models()[DEFAULT_MODEL_ID]);
        assert!(handler.settings().is_none());
    }

    #[tokio::test]
    async fn recognized_requested_model_is_honored() {
        let home = TempDir::new().expect("temp dir");
        let options = HandlerOptions {
            model_id: Some("claude-opus-4-1".to_string()),
            ..options_with_home(&home)
        };

        let handler = ClaudeCodeHandler::initialize(options).await;

        assert_eq!(handler.model().id(), "claude-opus-4-1");
    }

    #[tokio::test]
    async fn unrecognized_requested_model_falls_back_to_default() {
        let home = TempDir::new().expect("temp dir");
        let options = HandlerOptions {
            model_id: Some("gpt-4".to_string()),
            ..options_with_home(&home)
        };

        let handler = ClaudeCodeHandler::initialize(options).await;

        assert_eq!(handler.model().id(), DEFAULT_MODEL_ID);
        assert_eq!(handler.model().info(), &claude_models()[DEFAULT_MODEL_ID]);
    }

    #[tokio::test]
    async fn zai_base_url_selects_from_zai_table() {
        let home = TempDir::new().expect("temp dir");
        write_global_settings(
            &home,
            r#"{"env": {"ANTHROPIC_BASE_URL": "https://api.z.ai/api/anthropic"}}"#,
        );

        let handler = ClaudeCodeHandler::initialize(options_with_home(&home)).await;

        // No configured model: first declared key of the Z AI table.
        let expected = *zai_models().keys().next().expect("non-empty table");
        assert_eq!(handler.model().id(), expected);
    }

    #[tokio::test]
    async fn configured_model_in_alternative_table_wins() {
        let home = TempDir::new().expect("temp dir");
        write_global_settings(
            &home,
            r#"{"env": {"ANTHROPIC_BASE_URL": "https://api.z.ai/api/anthropic", "ANTHROPIC_MODEL": "glm-4.5-air"}}"#,
        );

        let handler = ClaudeCodeHandler::initialize(options_with_home(&home)).await;

        assert_eq!(handler.model().id(), "glm-4.5-air");
    }

    #[tokio::test]
    async fn configured_model_absent_from_table_falls_back_to_first_key() {
        let home = TempDir::new().expect("temp dir");
        // glm-4.5v is the documented exclusion from the Z AI table.
        write_global_settings(
            &home,
            r#"{"env": {"ANTHROPIC_BASE_URL": "https://api.z.ai/api/anthropic", "ANTHROPIC_MODEL": "glm-4.5v"}}"#,
        );

        let handler = ClaudeCodeHandler::initialize(options_with_home(&home)).await;

        assert_eq!(handler.model().id(), "glm-4.6");
    }

    #[tokio::test]
    async fn alternative_provider_ignores_caller_requested_model() {
        let home = TempDir::new().expect("temp dir");
        write_global_settings(
            &home,
            r#"{"env": {"ANTHROPIC_BASE_URL": "https://api.deepseek.com/anthropic"}}"#,
        );
        let options = HandlerOptions {
            model_id: Some("claude-opus-4-1".to_string()),
            ..options_with_home(&home)
        };

        let handler = ClaudeCodeHandler::initialize(options).await;

        assert_eq!(handler.model().id(), "deepseek-chat");
    }

    #[tokio::test]
    async fn broken_settings_are_absorbed_to_primary_default() {
        let home = TempDir::new().expect("temp dir");
        write_global_settings(&home, "{{{ not json");

        let handler = ClaudeCodeHandler::initialize(options_with_home(&home)).await;

        assert_eq!(handler.model().id(), DEFAULT_MODEL_ID);
    }

    #[tokio::test]
    async fn project_settings_apply_when_global_missing() {
        let home = TempDir::new().expect("temp dir");
        let project = TempDir::new().expect("temp dir");
        let dir = project.path().join(".claude");
        fs::create_dir_all(&dir).expect("create settings dir");
        fs::write(
            dir.join("settings.json"),
            r#"{"env": {"ANTHROPIC_BASE_URL": "https://dashscope-intl.aliyuncs.com/anthropic"}}"#,
        )
        .expect("write settings");

        let options = HandlerOptions {
            project_dir: Some(project.path().to_path_buf()),
            ..options_with_home(&home)
        };
        let handler = ClaudeCodeHandler::initialize(options).await;

        assert_eq!(handler.model().id(), "qwen3-coder-plus");
    }
}
