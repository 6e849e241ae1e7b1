use crate::catalog::PromptTemplateItem;
use crate::variables::TextField;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Render,
    Resize { cols: u16, rows: u16 },

    FocusNext,
    FocusPrev,

    ToggleResponseText,
    AdjustSlider { increase: bool },

    /// Editor text changed and must be written back to the draft
    TextEdited(TextField),
    VariablePickerOpen(TextField),
    VariablePickerClose(TextField),
    VariableInserted { field: TextField, key: String },

    TemplatePickerOpen,
    TemplatePickerClose,
    TemplateSelected(PromptTemplateItem),

    Confirm,
    Close,
}
