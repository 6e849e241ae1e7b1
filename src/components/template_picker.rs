//! Template picker dialog for quote templates
//!
//! Lists the quote-template catalog with fuzzy search on the title and a
//! preview of the highlighted template. Selecting an entry writes the
//! template and its paired quote prompt into the draft in one transition.

use crossterm::event::{Event, KeyCode, KeyModifiers};
use nucleo::{Config, Matcher, Utf32String};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::action::Action;
use crate::catalog::{PromptTemplateCatalog, PromptTemplateItem};
use crate::config::Theme;
use crate::store::ConfigDraftStore;

/// Fuzzy matcher result with score and indices
struct MatchResult {
    template_idx: usize,
    score: u32,
    indices: Vec<u32>,
}

pub struct TemplatePicker {
    visible: bool,
    title: String,
    query: String,
    templates: Vec<PromptTemplateItem>,
    matcher: Matcher,
    filtered_results: Vec<MatchResult>,
    list_state: ListState,
}

impl TemplatePicker {
    pub fn new() -> Self {
        Self {
            visible: false,
            title: String::new(),
            query: String::new(),
            templates: Vec::new(),
            matcher: Matcher::new(Config::DEFAULT),
            filtered_results: Vec::new(),
            list_state: ListState::default(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show the picker over the given templates
    pub fn open(&mut self, title: impl Into<String>, templates: Vec<PromptTemplateItem>) {
        self.visible = true;
        self.title = title.into();
        self.query.clear();
        self.templates = templates;
        self.update_filtered_results();
    }

    /// Dismiss without touching the draft
    pub fn close(&mut self) {
        self.visible = false;
        self.query.clear();
        self.templates.clear();
        self.filtered_results.clear();
        self.list_state.select(None);
    }

    /// Apply `item` to the draft and close.
    ///
    /// The quote prompt comes from the prompt catalog entry with the same
    /// title; when there is none the prompt is left unset.
    pub fn select(
        &mut self,
        item: &PromptTemplateItem,
        store: &mut ConfigDraftStore,
        prompts: &dyn PromptTemplateCatalog,
    ) {
        let quote_prompt = prompts.quote_prompt_for(&item.title).map(str::to_string);
        if quote_prompt.is_none() {
            tracing::debug!(title = %item.title, "no quote prompt paired with template");
        }
        store.apply_template(Some(item.value.clone()), quote_prompt);
        self.close();
    }

    fn update_filtered_results(&mut self) {
        self.filtered_results.clear();

        if self.query.is_empty() {
            self.filtered_results.extend((0..self.templates.len()).map(|idx| MatchResult {
                template_idx: idx,
                score: 0,
                indices: Vec::new(),
            }));
        } else {
            let pattern = nucleo::pattern::Pattern::parse(
                &self.query,
                nucleo::pattern::CaseMatching::Smart,
                nucleo::pattern::Normalization::Smart,
            );

            for (idx, template) in self.templates.iter().enumerate() {
                let title_utf32: Utf32String = template.title.as_str().into();
                let mut indices = Vec::new();
                if let Some(score) = pattern.indices(title_utf32.slice(..), &mut self.matcher, &mut indices) {
                    self.filtered_results.push(MatchResult {
                        template_idx: idx,
                        score,
                        indices,
                    });
                }
            }

            self.filtered_results.sort_by(|a, b| b.score.cmp(&a.score));
        }

        if self.filtered_results.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(0));
        }
    }

    fn select_next(&mut self) {
        if self.filtered_results.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some((current + 1) % self.filtered_results.len()));
    }

    fn select_prev(&mut self) {
        if self.filtered_results.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        let prev = if current == 0 {
            self.filtered_results.len() - 1
        } else {
            current - 1
        };
        self.list_state.select(Some(prev));
    }

    /// Highlighted template, if any
    pub fn highlighted(&self) -> Option<&PromptTemplateItem> {
        let selected_idx = self.list_state.selected()?;
        let result = self.filtered_results.get(selected_idx)?;
        self.templates.get(result.template_idx)
    }

    /// Handle keyboard events while visible
    pub fn handle_event(&mut self, event: &Event) -> Option<Action> {
        if !self.visible {
            return None;
        }

        match event {
            Event::Key(key) => match key.code {
                KeyCode::Esc => {
                    self.close();
                    Some(Action::TemplatePickerClose)
                }
                KeyCode::Enter => self.highlighted().cloned().map(Action::TemplateSelected),
                KeyCode::Up | KeyCode::BackTab => {
                    self.select_prev();
                    Some(Action::Render)
                }
                KeyCode::Down | KeyCode::Tab => {
                    self.select_next();
                    Some(Action::Render)
                }
                KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.select_next();
                    Some(Action::Render)
                }
                KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.select_prev();
                    Some(Action::Render)
                }
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.query.push(c);
                    self.update_filtered_results();
                    Some(Action::Render)
                }
                KeyCode::Backspace => {
                    self.query.pop();
                    self.update_filtered_results();
                    Some(Action::Render)
                }
                _ => None,
            },
            Event::Paste(text) => {
                self.query.push_str(text.trim());
                self.update_filtered_results();
                Some(Action::Render)
            }
            _ => None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if !self.visible {
            return;
        }

        let dialog_width = (area.width * 70 / 100).clamp(50.min(area.width), 110.min(area.width));
        let dialog_height = (area.height * 60 / 100).clamp(12.min(area.height), 32.min(area.height));
        let dialog_x = area.x + (area.width.saturating_sub(dialog_width)) / 2;
        let dialog_y = area.y + (area.height.saturating_sub(dialog_height)) / 2;
        let dialog_area = Rect::new(dialog_x, dialog_y, dialog_width, dialog_height);

        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(Style::default().fg(theme.picker.border.to_color()).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.picker.border.to_color()));

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Input
                Constraint::Length(1), // Info
                Constraint::Min(1),    // List + preview
            ])
            .split(inner);

        let input_line = Line::from(vec![
            Span::styled(": ", Style::default().fg(theme.colors.primary.to_color()).add_modifier(Modifier::BOLD)),
            Span::styled(self.query.clone(), Style::default().fg(theme.picker.input_fg.to_color())),
            Span::styled("▎", Style::default().fg(theme.colors.primary.to_color())),
        ]);
        frame.render_widget(Paragraph::new(input_line), rows[0]);

        let total = self.templates.len();
        let info = if self.query.is_empty() {
            format!("{} templates", total)
        } else {
            format!("{}/{} matching", self.filtered_results.len(), total)
        };
        frame.render_widget(
            Paragraph::new(info)
                .style(Style::default().fg(theme.picker.description_fg.to_color()))
                .alignment(Alignment::Right),
            rows[1],
        );

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[2]);

        let items: Vec<ListItem> = self
            .filtered_results
            .iter()
            .map(|result| self.render_template_item(&self.templates[result.template_idx], &result.indices, theme))
            .collect();

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(theme.picker.selected_bg.to_color())
                    .fg(theme.picker.selected_fg.to_color())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut list_state = self.list_state.clone();
        frame.render_stateful_widget(list, columns[0], &mut list_state);

        self.render_preview(frame, columns[1], theme);
    }

    fn render_template_item(&self, template: &PromptTemplateItem, indices: &[u32], theme: &Theme) -> ListItem<'static> {
        let item_style = Style::default().fg(theme.picker.item_fg.to_color());
        let match_style = Style::default()
            .fg(theme.picker.match_highlight.to_color())
            .add_modifier(Modifier::BOLD);

        let spans: Vec<Span> = if indices.is_empty() {
            vec![Span::styled(template.title.clone(), item_style)]
        } else {
            template
                .title
                .chars()
                .enumerate()
                .map(|(i, ch)| {
                    let style = if indices.contains(&(i as u32)) { match_style } else { item_style };
                    Span::styled(ch.to_string(), style)
                })
                .collect()
        };

        ListItem::new(Line::from(spans))
    }

    fn render_preview(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(" Preview ")
            .borders(Borders::LEFT)
            .border_style(Style::default().fg(theme.focus.unfocused_border.to_color()));

        let mut lines: Vec<Line> = Vec::new();
        if let Some(template) = self.highlighted() {
            if let Some(desc) = &template.desc {
                lines.push(Line::from(Span::styled(
                    desc.clone(),
                    Style::default().fg(theme.picker.description_fg.to_color()),
                )));
                lines.push(Line::default());
            }
            lines.extend(template.value.lines().map(|l| {
                Line::from(Span::styled(l.to_string(), Style::default().fg(theme.editor.text.to_color())))
            }));
        } else {
            lines.push(Line::from(Span::styled(
                "No matching template",
                Style::default().fg(theme.colors.muted.to_color()),
            )));
        }

        frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
    }
}

impl Default for TemplatePicker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{BuiltinPromptCatalog, ModelCatalog, StaticModelCatalog};
    use crate::store::{AiChatConfig, DraftEvent};
    use crossterm::event::KeyEvent;
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn templates() -> Vec<PromptTemplateItem> {
        vec![
            PromptTemplateItem::new("Standard", "{{q}}\n{{a}}").with_desc("Plain quote"),
            PromptTemplateItem::new("Question answer", "Q: {{q}} A: {{a}}"),
            PromptTemplateItem::new("Orphan", "{{source}}"),
        ]
    }

    fn prompts() -> BuiltinPromptCatalog {
        let mut catalog = BuiltinPromptCatalog::empty();
        catalog.extend(
            templates(),
            vec![
                PromptTemplateItem::new("Standard", "P-standard"),
                PromptTemplateItem::new("Question answer", "P-qa"),
            ],
        );
        catalog
    }

    fn store() -> ConfigDraftStore {
        let models: Arc<dyn ModelCatalog> = Arc::new(StaticModelCatalog::empty());
        let mut config = AiChatConfig::new("gpt-4");
        config.quote_prompt = Some("old".to_string());
        ConfigDraftStore::new(config, models)
    }

    #[test]
    fn test_open_and_close() {
        let mut picker = TemplatePicker::new();
        assert!(!picker.is_visible());

        picker.open("Select template", templates());
        assert!(picker.is_visible());
        assert_eq!(picker.filtered_results.len(), 3);
        assert_eq!(picker.list_state.selected(), Some(0));

        assert_eq!(picker.handle_event(&key(KeyCode::Esc)), Some(Action::TemplatePickerClose));
        assert!(!picker.is_visible());
        assert!(picker.templates.is_empty());
    }

    #[test]
    fn test_fuzzy_filtering_on_title() {
        let mut picker = TemplatePicker::new();
        picker.open("Select template", templates());

        for c in "qans".chars() {
            picker.handle_event(&key(KeyCode::Char(c)));
        }

        assert_eq!(picker.highlighted().map(|t| t.title.as_str()), Some("Question answer"));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut picker = TemplatePicker::new();
        picker.open("Select template", templates());

        picker.handle_event(&key(KeyCode::Up));
        assert_eq!(picker.list_state.selected(), Some(2));
        picker.handle_event(&key(KeyCode::Down));
        assert_eq!(picker.list_state.selected(), Some(0));
    }

    #[test]
    fn test_enter_reports_highlighted_template() {
        let mut picker = TemplatePicker::new();
        picker.open("Select template", templates());
        picker.handle_event(&key(KeyCode::Down));

        let action = picker.handle_event(&key(KeyCode::Enter));
        assert_eq!(action, Some(Action::TemplateSelected(templates()[1].clone())));
    }

    #[test]
    fn test_select_sets_template_and_prompt_together() {
        let mut picker = TemplatePicker::new();
        let mut store = store();
        let rx = store.subscribe();
        picker.open("Select template", templates());

        picker.select(&templates()[0], &mut store, &prompts());

        assert_eq!(store.draft().quote_template.as_deref(), Some("{{q}}\n{{a}}"));
        assert_eq!(store.draft().quote_prompt.as_deref(), Some("P-standard"));
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![DraftEvent::TemplateApplied]);
        assert!(!picker.is_visible());
    }

    #[test]
    fn test_select_without_paired_prompt_unsets_prompt() {
        let mut picker = TemplatePicker::new();
        let mut store = store();
        picker.open("Select template", templates());

        picker.select(&templates()[2], &mut store, &prompts());

        assert_eq!(store.draft().quote_template.as_deref(), Some("{{source}}"));
        assert_eq!(store.draft().quote_prompt, None);
    }

    #[test]
    fn test_close_leaves_draft_untouched() {
        let mut picker = TemplatePicker::new();
        let store = store();
        let before = store.draft().clone();
        picker.open("Select template", templates());
        picker.close();
        assert_eq!(store.draft(), &before);
    }

    #[test]
    fn test_render_shows_titles_and_preview() {
        let mut picker = TemplatePicker::new();
        picker.open("Select template", templates());

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|frame| picker.render(frame, frame.area(), &Theme::default()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Select template"));
        assert!(text.contains("Question answer"));
        assert!(text.contains("Plain quote"));
        assert!(text.contains("3 templates"));
    }
}
