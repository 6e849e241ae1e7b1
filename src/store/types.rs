//! AI chat step configuration and the field vocabulary used to edit it

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const DEFAULT_MAX_TOKEN: u32 = 2000;

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_token() -> u32 {
    DEFAULT_MAX_TOKEN
}

/// Configuration of one AI chat step in a workflow graph.
///
/// Keys serialize in camelCase. Inputs this editor does not know about are kept
/// in `extra` and written back untouched on commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiChatConfig {
    /// Selected model identifier
    #[serde(alias = "model")]
    pub ai_model: String,
    /// Whether the step streams a textual response (advanced edit only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_response_text: Option<bool>,
    /// Response randomness, 0 - 10
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Response token budget
    #[serde(default = "default_max_token")]
    pub max_token: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_prompt: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AiChatConfig {
    pub fn new(ai_model: impl Into<String>) -> Self {
        Self {
            ai_model: ai_model.into(),
            is_response_text: None,
            temperature: DEFAULT_TEMPERATURE,
            max_token: DEFAULT_MAX_TOKEN,
            quote_template: None,
            quote_prompt: None,
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
impl AiChatConfig {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_token(mut self, max_token: u32) -> Self {
        self.max_token = max_token;
        self
    }

    pub fn with_response_text(mut self, is_response_text: bool) -> Self {
        self.is_response_text = Some(is_response_text);
        self
    }
}

/// Editable fields of [`AiChatConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    AiModel,
    IsResponseText,
    Temperature,
    MaxToken,
    QuoteTemplate,
    QuotePrompt,
}

impl ConfigField {
    /// JSON key of the field in the workflow graph
    pub fn key(&self) -> &'static str {
        match self {
            ConfigField::AiModel => "aiModel",
            ConfigField::IsResponseText => "isResponseText",
            ConfigField::Temperature => "temperature",
            ConfigField::MaxToken => "maxToken",
            ConfigField::QuoteTemplate => "quoteTemplate",
            ConfigField::QuotePrompt => "quotePrompt",
        }
    }
}

/// A typed value for one [`ConfigField`].
///
/// The payload type is fixed per variant, so a value can never be written into
/// a field of the wrong shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    AiModel(String),
    IsResponseText(Option<bool>),
    Temperature(f32),
    MaxToken(u32),
    QuoteTemplate(Option<String>),
    QuotePrompt(Option<String>),
}

impl FieldValue {
    pub fn field(&self) -> ConfigField {
        match self {
            FieldValue::AiModel(_) => ConfigField::AiModel,
            FieldValue::IsResponseText(_) => ConfigField::IsResponseText,
            FieldValue::Temperature(_) => ConfigField::Temperature,
            FieldValue::MaxToken(_) => ConfigField::MaxToken,
            FieldValue::QuoteTemplate(_) => ConfigField::QuoteTemplate,
            FieldValue::QuotePrompt(_) => ConfigField::QuotePrompt,
        }
    }
}

/// State transitions accepted by the draft store
#[derive(Debug, Clone, PartialEq)]
pub enum DraftAction {
    /// Overwrite a single field
    Set(FieldValue),
    /// Replace quote template and quote prompt in one step
    ApplyTemplate {
        quote_template: Option<String>,
        quote_prompt: Option<String>,
    },
}

/// Notifications sent to draft observers
#[derive(Debug, Clone, PartialEq)]
pub enum DraftEvent {
    FieldChanged(ConfigField),
    TemplateApplied,
    /// The derived max-token bound moved (model switched)
    TokenLimitChanged { limit: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_deserialize_partial_config() {
        let config: AiChatConfig = serde_json::from_value(json!({
            "aiModel": "gpt-x",
            "temperature": 1,
            "maxToken": 2000
        }))
        .unwrap();

        assert_eq!(config.ai_model, "gpt-x");
        assert_eq!(config.temperature, 1.0);
        assert_eq!(config.max_token, 2000);
        assert_eq!(config.is_response_text, None);
        assert_eq!(config.quote_template, None);
        assert_eq!(config.quote_prompt, None);
        assert!(config.extra.is_empty());
    }

    #[test]
    fn test_model_alias_accepted() {
        let config: AiChatConfig = serde_json::from_value(json!({ "model": "gpt-4" })).unwrap();
        assert_eq!(config.ai_model, "gpt-4");
        assert_eq!(config.max_token, DEFAULT_MAX_TOKEN);
    }

    #[test]
    fn test_unknown_inputs_preserved() {
        let input = json!({
            "aiModel": "gpt-4",
            "temperature": 3,
            "maxToken": 1500,
            "systemPrompt": "be brief",
            "history": 6
        });
        let config: AiChatConfig = serde_json::from_value(input).unwrap();
        assert_eq!(config.extra.get("systemPrompt"), Some(&json!("be brief")));

        let output = serde_json::to_value(&config).unwrap();
        assert_eq!(output["history"], json!(6));
        assert_eq!(output["aiModel"], json!("gpt-4"));
        assert!(output.get("quotePrompt").is_none());
    }

    #[test]
    fn test_field_value_maps_to_field() {
        assert_eq!(FieldValue::Temperature(1.0).field(), ConfigField::Temperature);
        assert_eq!(FieldValue::QuotePrompt(None).field(), ConfigField::QuotePrompt);
        assert_eq!(ConfigField::MaxToken.key(), "maxToken");
    }
}
