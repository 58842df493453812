//! Static model and pricing tables.
//!
//! One table per recognized alternative backend plus the primary Claude
//! table. Tables are static data declared here, never derived at runtime;
//! declaration order matters because selection falls back to the first
//! declared key, so tables use an order-preserving map.

use indexmap::IndexMap;
use serde::Serialize;

/// Default model id for the primary provider.
pub const DEFAULT_MODEL_ID: &str = "claude-sonnet-4-5";

/// Tokens per pricing unit: prices below are USD per million tokens.
const TOKENS_PER_PRICE_UNIT: f64 = 1_000_000.0;

// ===== ModelInfo =====

/// Pricing and capability record for one model id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    /// Maximum output tokens per request
    pub max_tokens: u32,
    /// Context window size in tokens
    pub context_window: u32,
    /// Whether the backend supports prompt caching for this model
    pub supports_prompt_cache: bool,
    /// USD per million input tokens
    pub input_price: f64,
    /// USD per million output tokens
    pub output_price: f64,
    /// USD per million cache-write tokens
    pub cache_writes_price: f64,
    /// USD per million cache-read tokens
    pub cache_reads_price: f64,
}

impl ModelInfo {
    /// Cost in USD for the given token counts at this model's prices.
    pub fn cost_usd(
        &self,
        input_tokens: u64,
        output_tokens: u64,
        cache_read_tokens: u64,
        cache_write_tokens: u64,
    ) -> f64 {
        (input_tokens as f64 * self.input_price
            + output_tokens as f64 * self.output_price
            + cache_read_tokens as f64 * self.cache_reads_price
            + cache_write_tokens as f64 * self.cache_writes_price)
            / TOKENS_PER_PRICE_UNIT
    }
}

/// Order-preserving model table keyed by model id.
pub type ModelTable = IndexMap<&'static str, ModelInfo>;

// ===== AlternativeProvider =====

/// Recognized alternative backends, detected by base-URL substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternativeProvider {
    /// Z AI (GLM models via an Anthropic-compatible proxy)
    Zai,
    /// Alibaba DashScope (Qwen models)
    Qwen,
    /// DeepSeek
    DeepSeek,
}

impl AlternativeProvider {
    /// Detect a provider from a configured base URL.
    ///
    /// Substring tests run in a fixed order and are mutually exclusive;
    /// the first match wins. `None` means the primary defaults apply.
    pub fn from_base_url(base_url: &str) -> Option<Self> {
        if base_url.contains("z.ai") {
            Some(Self::Zai)
        } else if base_url.contains("aliyuncs.com") {
            Some(Self::Qwen)
        } else if base_url.contains("deepseek.com") {
            Some(Self::DeepSeek)
        } else {
            None
        }
    }

    /// Model table for this backend.
    pub fn models(self) -> ModelTable {
        match self {
            Self::Zai => zai_models(),
            Self::Qwen => qwen_models(),
            Self::DeepSeek => deepseek_models(),
        }
    }
}

// ===== Tables =====

/// Primary Claude model table.
pub fn claude_models() -> ModelTable {
    IndexMap::from([
        (
            "claude-sonnet-4-5",
            ModelInfo {
                max_tokens: 8192,
                context_window: 200_000,
                supports_prompt_cache: true,
                input_price: 3.0,
                output_price: 15.0,
                cache_writes_price: 3.75,
                cache_reads_price: 0.3,
            },
        ),
        (
            "claude-opus-4-1",
            ModelInfo {
                max_tokens: 8192,
                context_window: 200_000,
                supports_prompt_cache: true,
                input_price: 15.0,
                output_price: 75.0,
                cache_writes_price: 18.75,
                cache_reads_price: 1.5,
            },
        ),
        (
            "claude-haiku-4-5",
            ModelInfo {
                max_tokens: 8192,
                context_window: 200_000,
                supports_prompt_cache: true,
                input_price: 1.0,
                output_price: 5.0,
                cache_writes_price: 1.25,
                cache_reads_price: 0.1,
            },
        ),
    ])
}

/// GLM model family as exposed by the upstream vendor.
fn glm_models() -> ModelTable {
    IndexMap::from([
        (
            "glm-4.6",
            ModelInfo {
                max_tokens: 98_304,
                context_window: 200_000,
                supports_prompt_cache: true,
                input_price: 0.6,
                output_price: 2.2,
                cache_writes_price: 0.0,
                cache_reads_price: 0.11,
            },
        ),
        (
            "glm-4.5",
            ModelInfo {
                max_tokens: 98_304,
                context_window: 131_072,
                supports_prompt_cache: true,
                input_price: 0.6,
                output_price: 2.2,
                cache_writes_price: 0.0,
                cache_reads_price: 0.11,
            },
        ),
        (
            "glm-4.5-air",
            ModelInfo {
                max_tokens: 98_304,
                context_window: 131_072,
                supports_prompt_cache: true,
                input_price: 0.2,
                output_price: 1.1,
                cache_writes_price: 0.0,
                cache_reads_price: 0.03,
            },
        ),
        (
            "glm-4.5-flash",
            ModelInfo {
                max_tokens: 98_304,
                context_window: 131_072,
                supports_prompt_cache: true,
                input_price: 0.0,
                output_price: 0.0,
                cache_writes_price: 0.0,
                cache_reads_price: 0.0,
            },
        ),
        (
            "glm-4.5v",
            ModelInfo {
                max_tokens: 16_384,
                context_window: 65_536,
                supports_prompt_cache: true,
                input_price: 0.6,
                output_price: 1.8,
                cache_writes_price: 0.0,
                cache_reads_price: 0.11,
            },
        ),
    ])
}

/// Z AI table: the GLM family minus the vision model.
///
/// `glm-4.5v` is excluded because the CLI text path cannot carry image
/// input, so the id is never valid through this backend.
pub fn zai_models() -> ModelTable {
    let mut models = glm_models();
    models.shift_remove("glm-4.5v");
    models
}

/// Qwen model table (DashScope Anthropic-compatible endpoint).
pub fn qwen_models() -> ModelTable {
    IndexMap::from([
        (
            "qwen3-coder-plus",
            ModelInfo {
                max_tokens: 65_536,
                context_window: 1_000_000,
                supports_prompt_cache: true,
                input_price: 1.0,
                output_price: 5.0,
                cache_writes_price: 0.0,
                cache_reads_price: 0.1,
            },
        ),
        (
            "qwen3-coder-flash",
            ModelInfo {
                max_tokens: 65_536,
                context_window: 1_000_000,
                supports_prompt_cache: true,
                input_price: 0.3,
                output_price: 1.5,
                cache_writes_price: 0.0,
                cache_reads_price: 0.03,
            },
        ),
        (
            "qwen3-max",
            ModelInfo {
                max_tokens: 65_536,
                context_window: 262_144,
                supports_prompt_cache: true,
                input_price: 1.2,
                output_price: 6.0,
                cache_writes_price: 0.0,
                cache_reads_price: 0.12,
            },
        ),
    ])
}

/// DeepSeek model table.
pub fn deepseek_models() -> ModelTable {
    IndexMap::from([
        (
            "deepseek-chat",
            ModelInfo {
                max_tokens: 8192,
                context_window: 131_072,
                supports_prompt_cache: true,
                input_price: 0.27,
                output_price: 1.1,
                cache_writes_price: 0.0,
                cache_reads_price: 0.07,
            },
        ),
        (
            "deepseek-reasoner",
            ModelInfo {
                max_tokens: 65_536,
                context_window: 131_072,
                supports_prompt_cache: true,
                input_price: 0.55,
                output_price: 2.19,
                cache_writes_price: 0.0,
                cache_reads_price: 0.14,
            },
        ),
    ])
}

// ===== Tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_with_zai_substring_detects_zai() {
        assert_eq!(
            AlternativeProvider::from_base_url("https://api.z.ai/api/anthropic"),
            Some(AlternativeProvider::Zai)
        );
    }

    #[test]
    fn base_url_with_aliyuncs_substring_detects_qwen() {
        assert_eq!(
            AlternativeProvider::from_base_url(
                "https://dashscope-intl.aliyuncs.com/api/v2/apps/claude-code-proxy"
            ),
            Some(AlternativeProvider::Qwen)
        );
    }

    #[test]
    fn base_url_with_deepseek_substring_detects_deepseek() {
        assert_eq!(
            AlternativeProvider::from_base_url("https://api.deepseek.com/anthropic"),
            Some(AlternativeProvider::DeepSeek)
        );
    }

    #[test]
    fn unrecognized_base_url_detects_nothing() {
        assert_eq!(
            AlternativeProvider::from_base_url("https://api.anthropic.com"),
            None
        );
    }

    #[test]
    fn default_model_id_is_in_primary_table() {
        assert!(claude_models().contains_key(DEFAULT_MODEL_ID));
    }

    #[test]
    fn zai_table_excludes_the_vision_model() {
        let models = zai_models();
        assert!(!models.contains_key("glm-4.5v"));
        assert!(models.contains_key("glm-4.6"));
        assert_eq!(models.len(), glm_models().len() - 1);
    }

    #[test]
    fn zai_table_first_key_is_glm_4_6() {
        let models = zai_models();
        assert_eq!(models.keys().next(), Some(&"glm-4.6"));
    }

    #[test]
    fn cost_sums_all_four_token_kinds() {
        let info = ModelInfo {
            max_tokens: 8192,
            context_window: 200_000,
            supports_prompt_cache: true,
            input_price: 3.0,
            output_price: 15.0,
            cache_writes_price: 3.75,
            cache_reads_price: 0.3,
        };

        let cost = info.cost_usd(1_000_000, 1_000_000, 1_000_000, 1_000_000);
        assert!((cost - (3.0 + 15.0 + 0.3 + 3.75)).abs() < 1e-9);
    }

    #[test]
    fn cost_is_zero_for_zero_tokens() {
        let info = claude_models()[DEFAULT_MODEL_ID].clone();
        assert_eq!(info.cost_usd(0, 0, 0, 0), 0.0);
    }
}
