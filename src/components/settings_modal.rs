//! AI chat settings modal
//!
//! Provides UI for editing:
//! - AI response switch (advanced edit only)
//! - Temperature and max tokens sliders
//! - Quote template and quote prompt, with variable and template pickers
//!
//! All edits go through the [`ConfigDraftStore`]; Ctrl+S commits the draft to
//! the success handler, Esc discards it.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::action::Action;
use crate::catalog::PromptTemplateCatalog;
use crate::components::prompt_editor::PromptEditor;
use crate::components::slider::Slider;
use crate::components::template_picker::TemplatePicker;
use crate::components::Component;
use crate::config::Theme;
use crate::store::{AiChatConfig, ConfigDraftStore, ConfigField, DraftEvent, FieldValue, MIN_MAX_TOKEN};
use crate::variables::{unknown_placeholders, TextField, VariableCatalogBuilder};

pub const TEMPERATURE_MIN: f64 = 0.0;
pub const TEMPERATURE_MAX: f64 = 10.0;
pub const TEMPERATURE_STEP: f64 = 1.0;
pub const MAX_TOKEN_STEP: f64 = 50.0;

const TEMPLATE_PICKER_TITLE: &str = "Select quote template";

/// Receives the committed configuration, at most once per session
pub type SuccessHandler = Box<dyn FnOnce(AiChatConfig)>;
/// Close signal, sent after either commit or discard
pub type CloseHandler = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalFocus {
    ResponseText,
    Temperature,
    MaxToken,
    QuoteTemplate,
    QuotePrompt,
}

impl ModalFocus {
    const ADVANCED: [ModalFocus; 5] = [
        ModalFocus::ResponseText,
        ModalFocus::Temperature,
        ModalFocus::MaxToken,
        ModalFocus::QuoteTemplate,
        ModalFocus::QuotePrompt,
    ];

    /// Focus order; the response switch only exists in advanced edit
    pub fn order(advanced: bool) -> &'static [ModalFocus] {
        if advanced {
            &Self::ADVANCED
        } else {
            &Self::ADVANCED[1..]
        }
    }
}

pub struct SettingsModal {
    store: Option<ConfigDraftStore>,
    events: Receiver<DraftEvent>,
    prompts: Arc<dyn PromptTemplateCatalog>,
    advanced: bool,
    focus: ModalFocus,
    temperature: Slider,
    max_token: Slider,
    quote_template: PromptEditor,
    quote_prompt: PromptEditor,
    template_picker: TemplatePicker,
    on_success: Option<SuccessHandler>,
    on_close: Option<CloseHandler>,
}

impl SettingsModal {
    pub fn new(
        mut store: ConfigDraftStore,
        prompts: Arc<dyn PromptTemplateCatalog>,
        variables: &VariableCatalogBuilder,
        advanced: bool,
    ) -> Self {
        let events = store.subscribe();
        let draft = store.draft();

        let temperature = Slider::new("Temperature", TEMPERATURE_MIN, TEMPERATURE_MAX, TEMPERATURE_STEP)
            .with_marks("Deterministic", "Random")
            .with_value(draft.temperature as f64);
        let max_token = Slider::new(
            "Max tokens",
            MIN_MAX_TOKEN as f64,
            store.derive_max_token_limit() as f64,
            MAX_TOKEN_STEP,
        )
        .with_value(draft.max_token as f64);

        let template_default = prompts.quote_templates().first().map(|t| t.value.clone()).unwrap_or_default();
        let prompt_default = prompts.quote_prompts().first().map(|t| t.value.clone()).unwrap_or_default();

        let mut quote_template = PromptEditor::new(
            TextField::QuoteTemplate,
            "Quote templates [Ctrl+T: select template]",
            variables.variables_for(TextField::QuoteTemplate),
        )
        .with_placeholder(template_default);
        quote_template.set_text(draft.quote_template.as_deref().unwrap_or(""));

        let mut quote_prompt = PromptEditor::new(
            TextField::QuotePrompt,
            "Quote prompt",
            variables.variables_for(TextField::QuotePrompt),
        )
        .with_placeholder(prompt_default);
        quote_prompt.set_text(draft.quote_prompt.as_deref().unwrap_or(""));

        let focus = ModalFocus::order(advanced)[0];

        Self {
            store: Some(store),
            events,
            prompts,
            advanced,
            focus,
            temperature,
            max_token,
            quote_template,
            quote_prompt,
            template_picker: TemplatePicker::new(),
            on_success: None,
            on_close: None,
        }
    }

    pub fn on_success(mut self, handler: impl FnOnce(AiChatConfig) + 'static) -> Self {
        self.on_success = Some(Box::new(handler));
        self
    }

    pub fn on_close(mut self, handler: impl FnOnce() + 'static) -> Self {
        self.on_close = Some(Box::new(handler));
        self
    }

    pub fn is_open(&self) -> bool {
        self.store.is_some()
    }

    pub fn draft(&self) -> Option<&AiChatConfig> {
        self.store.as_ref().map(ConfigDraftStore::draft)
    }

    /// Commit the draft, hand it to the success handler and close
    pub fn confirm(&mut self) {
        let Some(store) = self.store.take() else {
            return;
        };
        let config = store.commit();
        if let Some(on_success) = self.on_success.take() {
            on_success(config);
        }
        self.finish();
    }

    /// Discard the draft and close
    pub fn close(&mut self) {
        let Some(store) = self.store.take() else {
            return;
        };
        store.discard();
        self.on_success = None;
        self.finish();
    }

    fn finish(&mut self) {
        self.template_picker.close();
        if let Some(on_close) = self.on_close.take() {
            on_close();
        }
    }

    /// Apply pending store notifications to the controls. Returns true if any arrived.
    pub fn sync(&mut self) -> bool {
        let events: Vec<DraftEvent> = self.events.try_iter().collect();
        let Some(store) = self.store.as_ref() else {
            return !events.is_empty();
        };
        let draft = store.draft();

        for event in &events {
            match event {
                DraftEvent::TemplateApplied => {
                    self.quote_template.set_text(draft.quote_template.as_deref().unwrap_or(""));
                    self.quote_prompt.set_text(draft.quote_prompt.as_deref().unwrap_or(""));
                }
                DraftEvent::TokenLimitChanged { limit } => self.max_token.set_max(*limit as f64),
                DraftEvent::FieldChanged(ConfigField::Temperature) => {
                    self.temperature.set_value(draft.temperature as f64)
                }
                DraftEvent::FieldChanged(ConfigField::MaxToken) => {
                    self.max_token.set_value(draft.max_token as f64)
                }
                DraftEvent::FieldChanged(_) => {}
            }
        }

        !events.is_empty()
    }

    fn move_focus(&mut self, forward: bool) {
        let order = ModalFocus::order(self.advanced);
        let current = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (current + 1) % order.len()
        } else {
            (current + order.len() - 1) % order.len()
        };
        self.focus = order[next];
    }

    fn editor_mut(&mut self, field: TextField) -> &mut PromptEditor {
        match field {
            TextField::QuoteTemplate => &mut self.quote_template,
            TextField::QuotePrompt => &mut self.quote_prompt,
        }
    }

    fn focused_editor_mut(&mut self) -> Option<&mut PromptEditor> {
        match self.focus {
            ModalFocus::QuoteTemplate => Some(&mut self.quote_template),
            ModalFocus::QuotePrompt => Some(&mut self.quote_prompt),
            _ => None,
        }
    }

    fn set_field(&mut self, value: FieldValue) {
        if let Some(store) = self.store.as_mut() {
            store.set(value);
        }
    }

    fn write_back_text(&mut self, field: TextField) {
        let value = self.editor_mut(field).value();
        let value = match field {
            TextField::QuoteTemplate => FieldValue::QuoteTemplate(value),
            TextField::QuotePrompt => FieldValue::QuotePrompt(value),
        };
        self.set_field(value);
    }

    fn forward_to_editor(&mut self, event: &Event) -> Option<Action> {
        let action = self.focused_editor_mut()?.handle_event(event)?;
        self.update(&action);
        Some(action)
    }

    fn handle_focused_key(&mut self, event: &Event, key: KeyEvent) -> Option<Action> {
        let action = match self.focus {
            ModalFocus::ResponseText => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Left | KeyCode::Right
                | KeyCode::Char('h') | KeyCode::Char('l') => Action::ToggleResponseText,
                _ => return None,
            },
            ModalFocus::Temperature | ModalFocus::MaxToken => match key.code {
                KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') | KeyCode::Char('_') => {
                    Action::AdjustSlider { increase: false }
                }
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') | KeyCode::Char('=') => {
                    Action::AdjustSlider { increase: true }
                }
                _ => return None,
            },
            ModalFocus::QuoteTemplate | ModalFocus::QuotePrompt => return self.forward_to_editor(event),
        };
        self.update(&action);
        Some(action)
    }

    fn render_response_switch(&self, theme: &Theme) -> Line<'static> {
        let focused = self.focus == ModalFocus::ResponseText;
        let on = self.draft().and_then(|d| d.is_response_text).unwrap_or(false);
        let selector = if focused { theme.focus.focus_indicator.clone() } else { " ".to_string() };
        let label_style = if focused {
            Style::default().fg(theme.colors.accent.to_color()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.colors.foreground.to_color())
        };
        let (switch, switch_color) = if on {
            ("[ on]", theme.colors.success.to_color())
        } else {
            ("[off]", theme.colors.muted.to_color())
        };

        Line::from(vec![
            Span::styled(format!(" {} ", selector), Style::default().fg(theme.colors.accent.to_color())),
            Span::styled("AI response  ", label_style),
            Span::styled(switch, Style::default().fg(switch_color).add_modifier(Modifier::BOLD)),
        ])
    }

    fn render_hints(&self, theme: &Theme) -> Line<'static> {
        let mut spans = Vec::new();
        for (label, editor) in [("quote template", &self.quote_template), ("quote prompt", &self.quote_prompt)] {
            let unknown = unknown_placeholders(&editor.text(), editor.variables());
            if unknown.is_empty() {
                continue;
            }
            let keys: Vec<String> = unknown.iter().map(|k| format!("{{{{{}}}}}", k)).collect();
            spans.push(Span::styled(
                format!(" Unknown variables in {}: {} ", label, keys.join(", ")),
                Style::default().fg(theme.colors.warning.to_color()),
            ));
        }
        Line::from(spans)
    }

    fn render_footer(&self, theme: &Theme) -> Line<'static> {
        let key_style = Style::default().fg(theme.colors.accent.to_color()).add_modifier(Modifier::BOLD);
        let text_style = Style::default().fg(theme.colors.muted.to_color());
        let mut spans = Vec::new();
        for (key, text) in [
            ("Tab", "focus"),
            ("←/→", "adjust"),
            ("Ctrl+T", "template"),
            ("{{", "variables"),
            ("Ctrl+S", "confirm"),
            ("Esc", "close"),
        ] {
            spans.push(Span::styled(format!(" {}", key), key_style));
            spans.push(Span::styled(format!(" {} ", text), text_style));
        }
        Line::from(spans)
    }

    fn render_themed(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let Some(store) = self.store.as_ref() else {
            return;
        };

        let dialog_width = (area.width * 80 / 100).clamp(60.min(area.width), 110.min(area.width));
        let dialog_x = area.x + (area.width.saturating_sub(dialog_width)) / 2;
        let dialog_area = Rect::new(dialog_x, area.y, dialog_width, area.height);

        frame.render_widget(Clear, dialog_area);

        let dirty = if store.is_dirty() { " *" } else { "" };
        let block = Block::default()
            .title(format!(" More settings{} ", dirty))
            .title_bottom(
                Line::styled(
                    format!(" {} ", store.model_label()),
                    Style::default().fg(theme.colors.secondary.to_color()),
                )
                .right_aligned(),
            )
            .title_style(theme.title_style(focused))
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused));
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let mut constraints = Vec::new();
        if self.advanced {
            constraints.push(Constraint::Length(2)); // Response switch
        }
        constraints.extend([
            Constraint::Length(4), // Temperature
            Constraint::Length(4), // Max tokens
            Constraint::Fill(2),   // Quote template
            Constraint::Fill(3),   // Quote prompt
            Constraint::Length(1), // Hints
            Constraint::Length(1), // Footer
        ]);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let mut idx = 0;
        if self.advanced {
            frame.render_widget(Paragraph::new(self.render_response_switch(theme)), chunks[idx]);
            idx += 1;
        }
        frame.render_widget(
            Paragraph::new(self.temperature.lines(self.focus == ModalFocus::Temperature, theme)),
            chunks[idx],
        );
        frame.render_widget(
            Paragraph::new(self.max_token.lines(self.focus == ModalFocus::MaxToken, theme)),
            chunks[idx + 1],
        );
        self.quote_template
            .render(frame, chunks[idx + 2], self.focus == ModalFocus::QuoteTemplate, theme);
        self.quote_prompt
            .render(frame, chunks[idx + 3], self.focus == ModalFocus::QuotePrompt, theme);
        frame.render_widget(Paragraph::new(self.render_hints(theme)), chunks[idx + 4]);
        frame.render_widget(Paragraph::new(self.render_footer(theme)), chunks[idx + 5]);

        self.template_picker.render(frame, area, theme);
    }
}

impl Component for SettingsModal {
    fn handle_event(&mut self, event: &Event) -> Option<Action> {
        if !self.is_open() {
            return None;
        }

        if self.template_picker.is_visible() {
            let action = self.template_picker.handle_event(event)?;
            self.update(&action);
            return Some(action);
        }

        let key = match event {
            Event::Key(key) => *key,
            Event::Paste(_) => return self.forward_to_editor(event),
            Event::Resize(cols, rows) => {
                return Some(Action::Resize {
                    cols: *cols,
                    rows: *rows,
                })
            }
            _ => return None,
        };

        // An open variable popup owns Esc, Enter and the arrows
        if self.focused_editor_mut().is_some_and(|editor| editor.is_picking()) {
            return self.forward_to_editor(event);
        }

        let action = match (key.modifiers, key.code) {
            (mods, KeyCode::Char('s')) if mods.contains(KeyModifiers::CONTROL) => Action::Confirm,
            (mods, KeyCode::Char('t')) if mods.contains(KeyModifiers::CONTROL) => Action::TemplatePickerOpen,
            (_, KeyCode::Esc) => Action::Close,
            (_, KeyCode::Tab) => Action::FocusNext,
            (_, KeyCode::BackTab) => Action::FocusPrev,
            _ => return self.handle_focused_key(event, key),
        };
        self.update(&action);
        Some(action)
    }

    fn update(&mut self, action: &Action) {
        match action {
            Action::FocusNext => self.move_focus(true),
            Action::FocusPrev => self.move_focus(false),
            Action::ToggleResponseText => {
                if !self.advanced {
                    return;
                }
                let current = self.draft().and_then(|d| d.is_response_text).unwrap_or(false);
                self.set_field(FieldValue::IsResponseText(Some(!current)));
            }
            Action::AdjustSlider { increase } => match self.focus {
                ModalFocus::Temperature => {
                    let value = self.temperature.adjust(*increase);
                    self.set_field(FieldValue::Temperature(value as f32));
                }
                ModalFocus::MaxToken => {
                    let value = self.max_token.adjust(*increase);
                    self.set_field(FieldValue::MaxToken(value.round() as u32));
                }
                _ => {}
            },
            Action::TextEdited(field) | Action::VariableInserted { field, .. } => {
                self.write_back_text(*field);
            }
            Action::TemplatePickerOpen => {
                self.focus = ModalFocus::QuoteTemplate;
                self.template_picker
                    .open(TEMPLATE_PICKER_TITLE, self.prompts.quote_templates().to_vec());
            }
            Action::TemplatePickerClose => self.template_picker.close(),
            Action::TemplateSelected(item) => {
                if let Some(store) = self.store.as_mut() {
                    self.template_picker.select(item, store, self.prompts.as_ref());
                }
                self.sync();
            }
            Action::Confirm => self.confirm(),
            Action::Close => self.close(),
            Action::Render
            | Action::Resize { .. }
            | Action::VariablePickerOpen(_)
            | Action::VariablePickerClose(_) => {}
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        self.render_themed(frame, area, focused, theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BuiltinPromptCatalog, ModelCatalog, ModelInfo, PromptTemplateItem, StaticModelCatalog};
    use crate::variables::{VariableDescriptor, VariableLabels};
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, Terminal};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn prompts() -> Arc<dyn PromptTemplateCatalog> {
        let mut catalog = BuiltinPromptCatalog::empty();
        catalog.extend(
            vec![
                PromptTemplateItem::new("Standard", "{{q}} / {{a}}"),
                PromptTemplateItem::new("Lonely", "{{source}}"),
            ],
            vec![PromptTemplateItem::new("Standard", "{{quote}}\n{{question}}")],
        );
        Arc::new(catalog)
    }

    fn modal_for(config: AiChatConfig, advanced: bool) -> SettingsModal {
        let mut models = StaticModelCatalog::empty();
        models.extend(vec![ModelInfo::new("gpt-4", 8000), ModelInfo::new("small", 1000)]);
        let models: Arc<dyn ModelCatalog> = Arc::new(models);
        let variables = VariableCatalogBuilder::new(
            VariableLabels::default(),
            vec![VariableDescriptor::new("x", "Extra")],
        );
        SettingsModal::new(ConfigDraftStore::new(config, models), prompts(), &variables, advanced)
    }

    fn screen_text(modal: &SettingsModal) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal
            .draw(|frame| modal.render(frame, frame.area(), true, &Theme::default()))
            .unwrap();
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_unknown_model_bound_and_untouched_value() {
        let config = AiChatConfig::new("gpt-x").with_temperature(1.0).with_max_token(2000);
        let mut modal = modal_for(config, false);

        assert_eq!(modal.max_token.max(), 4000.0);
        assert_eq!(modal.max_token.value(), 2000.0);
        assert_eq!(modal.draft().map(|d| d.max_token), Some(2000));

        modal.handle_event(&key(KeyCode::Tab));
        assert_eq!(modal.focus, ModalFocus::MaxToken);
        modal.handle_event(&key(KeyCode::Right));
        assert_eq!(modal.draft().map(|d| d.max_token), Some(2050));
    }

    #[test]
    fn test_stored_value_above_bound_clamps_when_moved() {
        let config = AiChatConfig::new("small").with_max_token(3000);
        let mut modal = modal_for(config, false);
        assert_eq!(modal.draft().map(|d| d.max_token), Some(3000));

        modal.handle_event(&key(KeyCode::Tab));
        modal.handle_event(&key(KeyCode::Char('-')));
        assert_eq!(modal.draft().map(|d| d.max_token), Some(1000));
    }

    #[test]
    fn test_temperature_slider_steps() {
        let mut modal = modal_for(AiChatConfig::new("gpt-4").with_temperature(9.0), false);
        assert_eq!(modal.focus, ModalFocus::Temperature);

        modal.handle_event(&key(KeyCode::Char('l')));
        modal.handle_event(&key(KeyCode::Char('l')));
        assert_eq!(modal.draft().map(|d| d.temperature), Some(10.0));

        modal.handle_event(&key(KeyCode::Left));
        assert_eq!(modal.draft().map(|d| d.temperature), Some(9.0));
    }

    #[test]
    fn test_focus_order_depends_on_advanced() {
        let mut basic = modal_for(AiChatConfig::new("gpt-4"), false);
        assert_eq!(basic.focus, ModalFocus::Temperature);
        basic.handle_event(&key(KeyCode::BackTab));
        assert_eq!(basic.focus, ModalFocus::QuotePrompt);

        let advanced = modal_for(AiChatConfig::new("gpt-4"), true);
        assert_eq!(advanced.focus, ModalFocus::ResponseText);
    }

    #[test]
    fn test_response_switch_only_in_advanced() {
        let mut advanced = modal_for(AiChatConfig::new("gpt-4"), true);
        advanced.handle_event(&key(KeyCode::Char(' ')));
        assert_eq!(advanced.draft().and_then(|d| d.is_response_text), Some(true));

        let mut basic = modal_for(AiChatConfig::new("gpt-4"), false);
        basic.update(&Action::ToggleResponseText);
        assert_eq!(basic.draft().and_then(|d| d.is_response_text), None);

        let mut enabled = modal_for(AiChatConfig::new("gpt-4").with_response_text(true), true);
        enabled.handle_event(&key(KeyCode::Enter));
        assert_eq!(enabled.draft().and_then(|d| d.is_response_text), Some(false));
    }

    #[test]
    fn test_discard_never_calls_success_handler() {
        let successes = Rc::new(Cell::new(0));
        let closes = Rc::new(Cell::new(0));
        let (s, c) = (successes.clone(), closes.clone());
        let mut modal = modal_for(AiChatConfig::new("gpt-4"), false)
            .on_success(move |_| s.set(s.get() + 1))
            .on_close(move || c.set(c.get() + 1));

        modal.handle_event(&key(KeyCode::Right));
        assert_eq!(modal.handle_event(&key(KeyCode::Esc)), Some(Action::Close));

        assert!(!modal.is_open());
        assert_eq!(successes.get(), 0);
        assert_eq!(closes.get(), 1);

        modal.confirm();
        assert_eq!(successes.get(), 0);
    }

    #[test]
    fn test_confirm_delivers_config_once() {
        let received: Rc<RefCell<Vec<AiChatConfig>>> = Rc::new(RefCell::new(Vec::new()));
        let closes = Rc::new(Cell::new(0));
        let (r, c) = (received.clone(), closes.clone());
        let mut modal = modal_for(AiChatConfig::new("gpt-4").with_temperature(2.0), false)
            .on_success(move |config| r.borrow_mut().push(config))
            .on_close(move || c.set(c.get() + 1));

        modal.handle_event(&key(KeyCode::Right));
        assert_eq!(modal.handle_event(&ctrl('s')), Some(Action::Confirm));
        assert_eq!(modal.handle_event(&ctrl('s')), None);
        modal.close();

        let received = received.borrow();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].temperature, 3.0);
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_template_selection_fills_both_editors() {
        let mut modal = modal_for(AiChatConfig::new("gpt-4"), false);

        modal.handle_event(&ctrl('t'));
        assert!(modal.template_picker.is_visible());
        assert_eq!(modal.focus, ModalFocus::QuoteTemplate);

        let action = modal.handle_event(&key(KeyCode::Enter));
        assert!(matches!(action, Some(Action::TemplateSelected(_))));
        assert!(!modal.template_picker.is_visible());

        let draft = modal.draft().cloned().unwrap();
        assert_eq!(draft.quote_template.as_deref(), Some("{{q}} / {{a}}"));
        assert_eq!(draft.quote_prompt.as_deref(), Some("{{quote}}\n{{question}}"));
        assert_eq!(modal.quote_template.text(), "{{q}} / {{a}}");
        assert_eq!(modal.quote_prompt.text(), "{{quote}}\n{{question}}");
    }

    #[test]
    fn test_template_picker_escape_keeps_modal_open() {
        let mut modal = modal_for(AiChatConfig::new("gpt-4"), false);
        modal.handle_event(&ctrl('t'));
        modal.handle_event(&key(KeyCode::Esc));

        assert!(!modal.template_picker.is_visible());
        assert!(modal.is_open());
        assert_eq!(modal.draft().and_then(|d| d.quote_template.clone()), None);
    }

    #[test]
    fn test_editor_typing_updates_draft() {
        let mut modal = modal_for(AiChatConfig::new("gpt-4"), false);
        modal.handle_event(&key(KeyCode::Tab));
        modal.handle_event(&key(KeyCode::Tab));
        assert_eq!(modal.focus, ModalFocus::QuoteTemplate);

        for c in "a {{".chars() {
            modal.handle_event(&key(KeyCode::Char(c)));
        }
        // Escape closes the variable popup, not the modal
        modal.handle_event(&key(KeyCode::Esc));
        assert!(modal.is_open());

        modal.handle_event(&Event::Key(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::CONTROL)));
        for _ in 0..5 {
            modal.handle_event(&key(KeyCode::Down));
        }
        modal.handle_event(&key(KeyCode::Enter));

        assert_eq!(
            modal.draft().and_then(|d| d.quote_template.clone()).as_deref(),
            Some("a {{x}}")
        );
    }

    #[test]
    fn test_token_limit_follows_model_change() {
        let mut modal = modal_for(AiChatConfig::new("gpt-4").with_max_token(6000), false);
        assert_eq!(modal.max_token.max(), 8000.0);

        if let Some(store) = modal.store.as_mut() {
            store.set(FieldValue::AiModel("small".to_string()));
        }
        assert!(modal.sync());

        assert_eq!(modal.max_token.max(), 1000.0);
        assert_eq!(modal.max_token.value(), 6000.0);
    }

    #[test]
    fn test_render_shows_controls() {
        let config = AiChatConfig::new("gpt-x").with_max_token(2000);
        let text = screen_text(&modal_for(config, true));

        assert!(text.contains("More settings"));
        assert!(text.contains("AI response"));
        assert!(text.contains("Deterministic"));
        assert!(text.contains("Random"));
        assert!(text.contains("4000"));
        assert!(text.contains("Quote prompt"));
        assert!(text.contains(" gpt-x "));
        // Empty editors show the first catalog entry
        assert!(text.contains("{{q}} / {{a}}"));
    }

    #[test]
    fn test_render_flags_unknown_variables_and_dirty_state() {
        let mut config = AiChatConfig::new("gpt-4");
        config.quote_prompt = Some("{{quote}} {{nope}}".to_string());
        let mut modal = modal_for(config, false);
        modal.handle_event(&key(KeyCode::Right));

        let text = screen_text(&modal);
        assert!(text.contains("More settings *"));
        assert!(text.contains("Unknown variables in quote prompt: {{nope}}"));
    }

    #[test]
    fn test_closed_modal_ignores_input() {
        let mut modal = modal_for(AiChatConfig::new("gpt-4"), false);
        modal.close();
        assert_eq!(modal.handle_event(&key(KeyCode::Right)), None);
        assert!(screen_text(&modal).trim().is_empty());
    }
}
