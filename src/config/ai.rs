// src/config/ai.rs
use std::env;
use std::time::Duration;

pub const ENV_ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const ENV_AI_SEARCH_MODEL: &str = "AI_SEARCH_MODEL";
pub const ENV_AI_SEARCH_TIMEOUT_MS: &str = "AI_SEARCH_TIMEOUT_MS";

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_MAX_TOKENS: u32 = 2_000;
/// Kept under `HttpConfig::adapter_deadline_ms` so a slow search fails on its
/// own timeout rather than the pass deadline.
const DEFAULT_TIMEOUT_MS: u64 = 40_000;

/// Settings for the web-search completion adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiSearchConfig {
    /// Empty when no key is configured; the adapter then returns no jobs.
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_ms: u64,
}

impl Default for AiSearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl AiSearchConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let model = env::var(ENV_AI_SEARCH_MODEL)
            .ok()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or(defaults.model);
        let timeout_ms = env::var(ENV_AI_SEARCH_TIMEOUT_MS)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(defaults.timeout_ms);
        Self {
            api_key: env::var(ENV_ANTHROPIC_API_KEY)
                .map(|k| k.trim().to_string())
                .unwrap_or_default(),
            model,
            max_tokens: defaults.max_tokens,
            timeout_ms,
        }
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
