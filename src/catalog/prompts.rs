//! Built-in quote templates and the quote prompts paired with them by title

use serde::{Deserialize, Serialize};

/// A named template string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplateItem {
    pub title: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

impl PromptTemplateItem {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            desc: None,
        }
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }
}

/// Read-only source of quote templates and quote prompts.
///
/// A quote template and a quote prompt belong together when their titles match.
pub trait PromptTemplateCatalog: Send + Sync {
    fn quote_templates(&self) -> &[PromptTemplateItem];

    fn quote_prompts(&self) -> &[PromptTemplateItem];

    /// Quote prompt paired with the template called `title`
    fn quote_prompt_for(&self, title: &str) -> Option<&str> {
        self.quote_prompts()
            .iter()
            .find(|item| item.title == title)
            .map(|item| item.value.as_str())
    }
}

const STANDARD: &str = "Standard template";
const QA: &str = "Q&A template";
const STANDARD_STRICT: &str = "Standard strict template";
const QA_STRICT: &str = "Strict Q&A template";

const STANDARD_QUOTE: &str = r#"{instruction:"{{q}}",output:"{{a}}",source:"{{source}}"}"#;
const QA_QUOTE: &str = r#"{question:"{{q}}",answer:"{{a}}"}"#;

const STANDARD_PROMPT: &str = r#"Use the content inside <Data></Data> as your knowledge:

<Data>
{{quote}}
</Data>

Answer requirements:
- If the answer is unclear, ask the user for clarification.
- Do not mention that your knowledge comes from the data.
- Keep the answer consistent with the description inside <Data></Data>.

Question: "{{question}}""#;

const QA_PROMPT: &str = r#"Use the Q&A pairs inside <QA></QA> to answer.

<QA>
{{quote}}
</QA>

Answer requirements:
- Pick one or more Q&A pairs that fit the question.
- Keep the answer close to the answer of the chosen pairs.
- If no pair fits, say that you do not know.

Question: "{{question}}""#;

const STANDARD_STRICT_PROMPT: &str = r#"Forget your prior knowledge. Use only the content inside <Data></Data> as your knowledge:

<Data>
{{quote}}
</Data>

Think first, then answer:
1. Decide whether the data is relevant to the question.
2. If it is not, say that you do not know.
3. Do not mention that your knowledge comes from the data.
4. Keep the answer consistent with the description inside <Data></Data>.

Question: "{{question}}""#;

const QA_STRICT_PROMPT: &str = r#"Forget your prior knowledge. Use only the Q&A pairs inside <QA></QA> to answer.

<QA>
{{quote}}
</QA>

Answer requirements:
- Find the pair whose question best matches the user question.
- Reply with that pair's answer, exactly as written.
- If no pair fits, say that you do not know.

Question: "{{question}}""#;

/// Catalog seeded with the built-in templates, extendable from config
#[derive(Debug, Clone)]
pub struct BuiltinPromptCatalog {
    quote_templates: Vec<PromptTemplateItem>,
    quote_prompts: Vec<PromptTemplateItem>,
}

impl BuiltinPromptCatalog {
    pub fn new() -> Self {
        Self {
            quote_templates: vec![
                PromptTemplateItem::new(STANDARD, STANDARD_QUOTE)
                    .with_desc("Instruction, output and source fields for general datasets"),
                PromptTemplateItem::new(QA, QA_QUOTE)
                    .with_desc("Question and answer fields for Q&A datasets"),
                PromptTemplateItem::new(STANDARD_STRICT, STANDARD_QUOTE)
                    .with_desc("Standard fields, answers restricted to the quoted data"),
                PromptTemplateItem::new(QA_STRICT, QA_QUOTE)
                    .with_desc("Q&A fields, answers copied from the best matching pair"),
            ],
            quote_prompts: vec![
                PromptTemplateItem::new(STANDARD, STANDARD_PROMPT),
                PromptTemplateItem::new(QA, QA_PROMPT),
                PromptTemplateItem::new(STANDARD_STRICT, STANDARD_STRICT_PROMPT),
                PromptTemplateItem::new(QA_STRICT, QA_STRICT_PROMPT),
            ],
        }
    }

    pub fn empty() -> Self {
        Self {
            quote_templates: Vec::new(),
            quote_prompts: Vec::new(),
        }
    }

    /// Add entries, replacing built-ins that share a title
    pub fn extend(
        &mut self,
        quote_templates: impl IntoIterator<Item = PromptTemplateItem>,
        quote_prompts: impl IntoIterator<Item = PromptTemplateItem>,
    ) {
        for item in quote_templates {
            upsert(&mut self.quote_templates, item);
        }
        for item in quote_prompts {
            upsert(&mut self.quote_prompts, item);
        }
    }
}

fn upsert(items: &mut Vec<PromptTemplateItem>, item: PromptTemplateItem) {
    match items.iter_mut().find(|existing| existing.title == item.title) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

impl Default for BuiltinPromptCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptTemplateCatalog for BuiltinPromptCatalog {
    fn quote_templates(&self) -> &[PromptTemplateItem] {
        &self.quote_templates
    }

    fn quote_prompts(&self) -> &[PromptTemplateItem] {
        &self.quote_prompts
    }
}
