//! Interpolation variables offered to the quote template and quote prompt editors

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Icon shared by the built-in variables
pub const VARIABLE_ICON: &str = "core/app/simpleMode/variable";

/// `{{key}}` on one line; the key may be padded with spaces or tabs but holds no braces
static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{[ \t]*([^{}\s][^{}\n]*?)[ \t]*\}\}").expect("placeholder pattern is valid")
});

/// One `{{key}}` placeholder usable inside a text field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDescriptor {
    pub key: String,
    pub label: String,
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_icon() -> String {
    VARIABLE_ICON.to_string()
}

impl VariableDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            icon: default_icon(),
        }
    }
}

/// Text fields that take interpolation variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    QuoteTemplate,
    QuotePrompt,
}

/// Display labels for the built-in variables.
///
/// English defaults; the `[labels]` section of `settings.toml` overrides them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableLabels {
    pub source: String,
    pub source_id: String,
    pub index: String,
    pub quote: String,
    pub question: String,
}

impl Default for VariableLabels {
    fn default() -> Self {
        Self {
            source: "Source name".to_string(),
            source_id: "Source id".to_string(),
            index: "Quote index".to_string(),
            quote: "Quote templates".to_string(),
            question: "User question".to_string(),
        }
    }
}

/// Builds the variable list of each text field: fixed entries first, caller extras last
#[derive(Debug, Clone, Default)]
pub struct VariableCatalogBuilder {
    labels: VariableLabels,
    picker_menu: Vec<VariableDescriptor>,
}

impl VariableCatalogBuilder {
    pub fn new(labels: VariableLabels, picker_menu: Vec<VariableDescriptor>) -> Self {
        Self { labels, picker_menu }
    }

    pub fn quote_template_variables(&self) -> Vec<VariableDescriptor> {
        let mut variables = vec![
            VariableDescriptor::new("q", "q"),
            VariableDescriptor::new("a", "a"),
            VariableDescriptor::new("source", &self.labels.source),
            VariableDescriptor::new("sourceId", &self.labels.source_id),
            VariableDescriptor::new("index", &self.labels.index),
        ];
        variables.extend(self.picker_menu.iter().cloned());
        variables
    }

    pub fn quote_prompt_variables(&self) -> Vec<VariableDescriptor> {
        let mut variables = vec![
            VariableDescriptor::new("quote", &self.labels.quote),
            VariableDescriptor::new("question", &self.labels.question),
        ];
        variables.extend(self.picker_menu.iter().cloned());
        variables
    }

    pub fn variables_for(&self, field: TextField) -> Vec<VariableDescriptor> {
        match field {
            TextField::QuoteTemplate => self.quote_template_variables(),
            TextField::QuotePrompt => self.quote_prompt_variables(),
        }
    }
}

/// One `{{key}}` occurrence in a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Byte range of the whole token, braces included
    pub range: Range<usize>,
    pub key: &'a str,
}

/// Every `{{key}}` token in `text`, in order
pub fn find_placeholders(text: &str) -> impl Iterator<Item = Placeholder<'_>> {
    PLACEHOLDER_REGEX.captures_iter(text).filter_map(|caps| {
        let token = caps.get(0)?;
        let key = caps.get(1)?;
        Some(Placeholder {
            range: token.range(),
            key: key.as_str(),
        })
    })
}

/// Keys of the `{{key}}` placeholders in `text`, first occurrence order, no duplicates
pub fn placeholders(text: &str) -> Vec<&str> {
    let mut keys: Vec<&str> = Vec::new();
    for placeholder in find_placeholders(text) {
        if !keys.contains(&placeholder.key) {
            keys.push(placeholder.key);
        }
    }
    keys
}

/// Placeholders used in `text` that are not in `variables`
pub fn unknown_placeholders(text: &str, variables: &[VariableDescriptor]) -> Vec<String> {
    placeholders(text)
        .into_iter()
        .filter(|key| !variables.iter().any(|v| v.key == *key))
        .map(str::to_string)
        .collect()
}
