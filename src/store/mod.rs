//! Draft store for one AI chat settings editing session
//!
//! Holds the in-progress [`AiChatConfig`] apart from the configuration it was
//! opened with, derives the max-token bound from the injected model catalog,
//! and notifies subscribers about every change.

mod types;

pub use types::{AiChatConfig, ConfigField, DraftAction, DraftEvent, FieldValue};

use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::catalog::ModelCatalog;

/// Token bound offered when the selected model is not in the catalog
pub const FALLBACK_MAX_TOKEN_LIMIT: u32 = 4000;

/// Lowest token budget the token control offers
pub const MIN_MAX_TOKEN: u32 = 100;

pub struct ConfigDraftStore {
    initial: AiChatConfig,
    draft: AiChatConfig,
    models: Arc<dyn ModelCatalog>,
    observers: Vec<Sender<DraftEvent>>,
}

impl ConfigDraftStore {
    pub fn new(initial: AiChatConfig, models: Arc<dyn ModelCatalog>) -> Self {
        Self {
            draft: initial.clone(),
            initial,
            models,
            observers: Vec::new(),
        }
    }

    /// Register an observer. Receivers that are dropped are pruned on the next change.
    pub fn subscribe(&mut self) -> Receiver<DraftEvent> {
        let (tx, rx) = unbounded();
        self.observers.push(tx);
        rx
    }

    pub fn get(&self, field: ConfigField) -> FieldValue {
        match field {
            ConfigField::AiModel => FieldValue::AiModel(self.draft.ai_model.clone()),
            ConfigField::IsResponseText => FieldValue::IsResponseText(self.draft.is_response_text),
            ConfigField::Temperature => FieldValue::Temperature(self.draft.temperature),
            ConfigField::MaxToken => FieldValue::MaxToken(self.draft.max_token),
            ConfigField::QuoteTemplate => FieldValue::QuoteTemplate(self.draft.quote_template.clone()),
            ConfigField::QuotePrompt => FieldValue::QuotePrompt(self.draft.quote_prompt.clone()),
        }
    }

    /// Overwrite one field. Returns false when the value was already current.
    pub fn set(&mut self, value: FieldValue) -> bool {
        self.dispatch(DraftAction::Set(value))
    }

    /// Replace quote template and quote prompt as a single transition
    pub fn apply_template(
        &mut self,
        quote_template: Option<String>,
        quote_prompt: Option<String>,
    ) -> bool {
        self.dispatch(DraftAction::ApplyTemplate {
            quote_template,
            quote_prompt,
        })
    }

    pub fn dispatch(&mut self, action: DraftAction) -> bool {
        match action {
            DraftAction::Set(value) => {
                let field = value.field();
                if self.get(field) == value {
                    return false;
                }

                let limit_before = self.derive_max_token_limit();
                self.write(value);
                tracing::debug!(field = field.key(), "draft field updated");
                self.notify(DraftEvent::FieldChanged(field));

                if field == ConfigField::AiModel {
                    let limit = self.derive_max_token_limit();
                    if limit != limit_before {
                        tracing::debug!(limit, "max token bound changed");
                        self.notify(DraftEvent::TokenLimitChanged { limit });
                    }
                }
            }
            DraftAction::ApplyTemplate {
                quote_template,
                quote_prompt,
            } => {
                self.draft.quote_template = quote_template;
                self.draft.quote_prompt = quote_prompt;
                tracing::debug!(
                    has_prompt = self.draft.quote_prompt.is_some(),
                    "quote template applied"
                );
                self.notify(DraftEvent::TemplateApplied);
            }
        }
        true
    }

    fn write(&mut self, value: FieldValue) {
        match value {
            FieldValue::AiModel(v) => self.draft.ai_model = v,
            FieldValue::IsResponseText(v) => self.draft.is_response_text = v,
            FieldValue::Temperature(v) => self.draft.temperature = v,
            FieldValue::MaxToken(v) => self.draft.max_token = v,
            FieldValue::QuoteTemplate(v) => self.draft.quote_template = v,
            FieldValue::QuotePrompt(v) => self.draft.quote_prompt = v,
        }
    }

    fn notify(&mut self, event: DraftEvent) {
        self.observers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Upper bound for the max-token control.
    ///
    /// Never used to rewrite a stored `max_token` that already exceeds it.
    pub fn derive_max_token_limit(&self) -> u32 {
        self.models
            .max_response_tokens(&self.draft.ai_model)
            .unwrap_or(FALLBACK_MAX_TOKEN_LIMIT)
    }

    /// Display name of the draft's model, or its raw id when the catalog lacks it
    pub fn model_label(&self) -> String {
        self.models
            .get(&self.draft.ai_model)
            .map(|m| m.display_name().to_string())
            .unwrap_or_else(|| self.draft.ai_model.clone())
    }

    /// Current draft, read-only
    pub fn draft(&self) -> &AiChatConfig {
        &self.draft
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.initial
    }

    /// Snapshot of the draft as the final configuration
    pub fn commit(&self) -> AiChatConfig {
        tracing::info!(
            model = %self.draft.ai_model,
            temperature = self.draft.temperature,
            max_token = self.draft.max_token,
            "committing AI chat settings"
        );
        self.draft.clone()
    }

    /// Drop the draft without side effects
    pub fn discard(self) {
        tracing::info!(dirty = self.is_dirty(), "discarding AI chat settings draft");
    }
}
