use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum LLMProvider {
    Local,
    OpenAI,
    OpenRouter,
    /// Never call a model; always use the deterministic fallback explanation
    Disabled,
}

/// Settings for the explanation model (any OpenAI-compatible chat endpoint)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LLMConfig {
    pub provider: LLMProvider,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub timeout_secs: u64,
}

impl LLMConfig {
    /// Whether a generation call can be attempted at all
    pub fn is_enabled(&self) -> bool {
        match self.provider {
            LLMProvider::Disabled => false,
            LLMProvider::Local => !self.base_url.trim().is_empty(),
            LLMProvider::OpenAI | LLMProvider::OpenRouter => self
                .api_key
                .as_deref()
                .map(|k| !k.trim().is_empty())
                .unwrap_or(false),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::OpenAI,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            max_tokens: Some(450),
            temperature: Some(0.2),
            timeout_secs: 30,
        }
    }
}
