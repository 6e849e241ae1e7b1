//! Model metadata - response token limits per model

use serde::{Deserialize, Serialize};

/// Metadata about a specific model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier (e.g., "gpt-4o")
    pub model_id: String,
    /// Maximum tokens the model may produce in one response
    pub max_response_tokens: u32,
    /// Optional display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ModelInfo {
    pub fn new(model_id: impl Into<String>, max_response_tokens: u32) -> Self {
        Self {
            model_id: model_id.into(),
            max_response_tokens,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.model_id)
    }
}

/// Read-only source of model limits
pub trait ModelCatalog: Send + Sync {
    /// All known models, in catalog order
    fn models(&self) -> &[ModelInfo];

    /// Exact lookup by model id
    fn get(&self, model_id: &str) -> Option<&ModelInfo> {
        self.models().iter().find(|m| m.model_id == model_id)
    }

    fn max_response_tokens(&self, model_id: &str) -> Option<u32> {
        self.get(model_id).map(|m| m.max_response_tokens)
    }
}

/// Catalog of known models, seeded with defaults and extended from config
#[derive(Debug, Clone)]
pub struct StaticModelCatalog {
    models: Vec<ModelInfo>,
}

impl StaticModelCatalog {
    /// Create a new catalog seeded with known models
    pub fn new() -> Self {
        let mut catalog = Self::empty();
        catalog.seed_defaults();
        catalog
    }

    pub fn empty() -> Self {
        Self { models: Vec::new() }
    }

    /// Register a model, replacing any entry with the same id
    pub fn register(&mut self, info: ModelInfo) {
        match self.models.iter_mut().find(|m| m.model_id == info.model_id) {
            Some(existing) => *existing = info,
            None => self.models.push(info),
        }
    }

    pub fn extend(&mut self, models: impl IntoIterator<Item = ModelInfo>) {
        for info in models {
            self.register(info);
        }
    }

    fn seed_defaults(&mut self) {
        // ─────────────────────────────────────────────────────────────────────
        // OpenAI Models
        // ─────────────────────────────────────────────────────────────────────
        self.register(ModelInfo::new("gpt-3.5-turbo", 4_000).with_name("GPT-3.5"));
        self.register(ModelInfo::new("gpt-3.5-turbo-16k", 16_000).with_name("GPT-3.5-16k"));
        self.register(ModelInfo::new("gpt-4", 8_000).with_name("GPT-4"));
        self.register(ModelInfo::new("gpt-4o", 16_000).with_name("GPT-4o"));
        self.register(ModelInfo::new("gpt-4o-mini", 16_000).with_name("GPT-4o Mini"));

        // ─────────────────────────────────────────────────────────────────────
        // Anthropic Claude Models
        // ─────────────────────────────────────────────────────────────────────
        self.register(
            ModelInfo::new("claude-sonnet-4-20250514", 8_192).with_name("Claude Sonnet 4"),
        );
        self.register(
            ModelInfo::new("claude-3-5-haiku-20241022", 8_192).with_name("Claude 3.5 Haiku"),
        );

        // ─────────────────────────────────────────────────────────────────────
        // Google Gemini Models
        // ─────────────────────────────────────────────────────────────────────
        self.register(ModelInfo::new("gemini-2.0-flash", 8_192).with_name("Gemini 2.0 Flash"));
    }
}

impl Default for StaticModelCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelCatalog for StaticModelCatalog {
    fn models(&self) -> &[ModelInfo] {
        &self.models
    }
}
