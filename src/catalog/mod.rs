//! Read-only catalogs injected into the settings editor

pub mod models;
pub mod prompts;

pub use models::{ModelCatalog, ModelInfo, StaticModelCatalog};
pub use prompts::{BuiltinPromptCatalog, PromptTemplateCatalog, PromptTemplateItem};
