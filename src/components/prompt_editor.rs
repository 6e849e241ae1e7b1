//! Multi-line editor for quote templates and quote prompts
//!
//! Highlights `{{key}}` placeholders and offers the field's interpolation
//! variables in a popup list. The popup opens when `{{` is typed or on
//! Ctrl+Space; Enter inserts `{{key}}` at the cursor.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::action::Action;
use crate::config::Theme;
use crate::variables::{find_placeholders, TextField, VariableDescriptor};

const CURSOR: char = '▎';
const PICKER_HEIGHT: u16 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VariablePicker {
    selected: usize,
    /// Characters typed to open the picker (`{{`) that the insertion replaces
    trigger_len: usize,
}

pub struct PromptEditor {
    field: TextField,
    title: String,
    lines: Vec<String>,
    /// (line_index, column_index)
    cursor: (usize, usize),
    /// Shown while the buffer is empty
    placeholder: String,
    variables: Vec<VariableDescriptor>,
    picker: Option<VariablePicker>,
}

impl PromptEditor {
    pub fn new(field: TextField, title: impl Into<String>, variables: Vec<VariableDescriptor>) -> Self {
        Self {
            field,
            title: title.into(),
            lines: vec![String::new()],
            cursor: (0, 0),
            placeholder: String::new(),
            variables,
            picker: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn variables(&self) -> &[VariableDescriptor] {
        &self.variables
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// Replace the buffer, cursor moves to the end
    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(|l| l.trim_end_matches('\r').to_string()).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        let last = self.lines.len() - 1;
        self.cursor = (last, self.lines[last].chars().count());
        self.picker = None;
    }

    /// Value to store in the draft, `None` once the buffer is cleared
    pub fn value(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.text())
        }
    }

    pub fn is_picking(&self) -> bool {
        self.picker.is_some()
    }

    pub fn open_variable_picker(&mut self, trigger_len: usize) -> Option<Action> {
        if self.variables.is_empty() {
            return None;
        }
        self.picker = Some(VariablePicker {
            selected: 0,
            trigger_len,
        });
        Some(Action::VariablePickerOpen(self.field))
    }

    pub fn close_variable_picker(&mut self) -> Option<Action> {
        self.picker.take().map(|_| Action::VariablePickerClose(self.field))
    }

    pub fn paste_text(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.insert_newline();
            } else if c != '\r' {
                self.insert_char(c);
            }
        }
    }

    fn insert_char(&mut self, c: char) {
        let (line, col) = self.cursor;
        let current_line = &mut self.lines[line];
        let byte_pos = char_to_byte_pos(current_line, col);
        current_line.insert(byte_pos, c);
        self.cursor.1 = col + 1;
    }

    fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert_char(c);
        }
    }

    fn insert_newline(&mut self) {
        let (line, col) = self.cursor;
        let current_line = &self.lines[line];
        let byte_pos = char_to_byte_pos(current_line, col);
        let remainder = current_line[byte_pos..].to_string();
        self.lines[line].truncate(byte_pos);
        self.lines.insert(line + 1, remainder);
        self.cursor = (line + 1, 0);
    }

    fn delete_char_before(&mut self) -> bool {
        let (line, col) = self.cursor;
        if col > 0 {
            let current_line = &mut self.lines[line];
            let byte_pos = char_to_byte_pos(current_line, col - 1);
            let next_byte_pos = char_to_byte_pos(current_line, col);
            current_line.replace_range(byte_pos..next_byte_pos, "");
            self.cursor.1 = col - 1;
            true
        } else if line > 0 {
            let current_line = self.lines.remove(line);
            let prev_line_len = self.lines[line - 1].chars().count();
            self.lines[line - 1].push_str(&current_line);
            self.cursor = (line - 1, prev_line_len);
            true
        } else {
            false
        }
    }

    fn delete_char_at(&mut self) -> bool {
        let (line, col) = self.cursor;
        let char_count = self.lines[line].chars().count();
        if col < char_count {
            let current_line = &mut self.lines[line];
            let byte_pos = char_to_byte_pos(current_line, col);
            let next_byte_pos = char_to_byte_pos(current_line, col + 1);
            current_line.replace_range(byte_pos..next_byte_pos, "");
            true
        } else if line + 1 < self.lines.len() {
            let next_line = self.lines.remove(line + 1);
            self.lines[line].push_str(&next_line);
            true
        } else {
            false
        }
    }

    fn move_left(&mut self) {
        let (line, col) = self.cursor;
        if col > 0 {
            self.cursor.1 = col - 1;
        } else if line > 0 {
            self.cursor = (line - 1, self.lines[line - 1].chars().count());
        }
    }

    fn move_right(&mut self) {
        let (line, col) = self.cursor;
        if col < self.lines[line].chars().count() {
            self.cursor.1 = col + 1;
        } else if line + 1 < self.lines.len() {
            self.cursor = (line + 1, 0);
        }
    }

    fn move_up(&mut self) {
        let (line, col) = self.cursor;
        if line > 0 {
            self.cursor = (line - 1, col.min(self.lines[line - 1].chars().count()));
        }
    }

    fn move_down(&mut self) {
        let (line, col) = self.cursor;
        if line + 1 < self.lines.len() {
            self.cursor = (line + 1, col.min(self.lines[line + 1].chars().count()));
        }
    }

    /// Whether the two characters before the cursor are `{{`
    fn just_opened_braces(&self) -> bool {
        let (line, col) = self.cursor;
        if col < 2 {
            return false;
        }
        let before: String = self.lines[line].chars().skip(col - 2).take(2).collect();
        before == "{{"
    }

    /// Braces already typed before the cursor that an insertion should replace
    fn trigger_before_cursor(&self) -> usize {
        if self.just_opened_braces() {
            2
        } else {
            0
        }
    }

    /// Insert the highlighted variable and close the picker
    pub fn insert_selected_variable(&mut self) -> Option<Action> {
        let picker = self.picker.take()?;
        let variable = self.variables.get(picker.selected)?;
        let key = variable.key.clone();

        for _ in 0..picker.trigger_len {
            self.delete_char_before();
        }
        self.insert_str(&format!("{{{{{}}}}}", key));
        tracing::debug!(key = %key, "variable inserted");

        Some(Action::VariableInserted { field: self.field, key })
    }

    fn handle_picker_key(&mut self, key: KeyEvent) -> Option<Action> {
        let count = self.variables.len();
        let picker = self.picker.as_mut()?;
        match key.code {
            KeyCode::Esc => self.close_variable_picker(),
            KeyCode::Enter | KeyCode::Tab => self.insert_selected_variable(),
            KeyCode::Up | KeyCode::BackTab => {
                picker.selected = if picker.selected == 0 { count - 1 } else { picker.selected - 1 };
                Some(Action::Render)
            }
            KeyCode::Down => {
                picker.selected = (picker.selected + 1) % count;
                Some(Action::Render)
            }
            _ => {
                // Any other key dismisses the popup and edits as usual
                self.picker = None;
                self.handle_key(key)
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if self.picker.is_some() {
            return self.handle_picker_key(key);
        }

        let edited = Some(Action::TextEdited(self.field));
        match (key.modifiers, key.code) {
            (mods, KeyCode::Char(' ')) if mods.contains(KeyModifiers::CONTROL) => {
                self.open_variable_picker(self.trigger_before_cursor())
            }
            (_, KeyCode::Null) => self.open_variable_picker(self.trigger_before_cursor()),

            (_, KeyCode::Enter) => {
                self.insert_newline();
                edited
            }
            (_, KeyCode::Backspace) => self.delete_char_before().then_some(Action::TextEdited(self.field)),
            (_, KeyCode::Delete) => self.delete_char_at().then_some(Action::TextEdited(self.field)),

            (KeyModifiers::NONE, KeyCode::Left) => {
                self.move_left();
                Some(Action::Render)
            }
            (KeyModifiers::NONE, KeyCode::Right) => {
                self.move_right();
                Some(Action::Render)
            }
            (KeyModifiers::NONE, KeyCode::Up) => {
                self.move_up();
                Some(Action::Render)
            }
            (KeyModifiers::NONE, KeyCode::Down) => {
                self.move_down();
                Some(Action::Render)
            }
            (KeyModifiers::NONE, KeyCode::Home) | (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
                self.cursor.1 = 0;
                Some(Action::Render)
            }
            (KeyModifiers::NONE, KeyCode::End) | (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                self.cursor.1 = self.lines[self.cursor.0].chars().count();
                Some(Action::Render)
            }

            (KeyModifiers::NONE, KeyCode::Char(c)) | (KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                self.insert_char(c);
                if c == '{' && self.just_opened_braces() {
                    self.open_variable_picker(2);
                }
                edited
            }

            _ => None,
        }
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<Action> {
        match event {
            Event::Key(key) => self.handle_key(*key),
            Event::Paste(text) => {
                self.picker = None;
                self.paste_text(text);
                Some(Action::TextEdited(self.field))
            }
            _ => None,
        }
    }

    /// Style every character of `line`, placeholders in the variable colors
    fn styled_chars(&self, line: &str, theme: &Theme) -> Vec<(char, Style)> {
        let text_style = Style::default().fg(theme.editor.text.to_color());
        let known_style = Style::default()
            .fg(theme.editor.variable.to_color())
            .add_modifier(Modifier::BOLD);
        let unknown_style = Style::default().fg(theme.editor.unknown_variable.to_color());

        let mut tokens = find_placeholders(line).peekable();
        let mut styled = Vec::with_capacity(line.len());
        for (pos, c) in line.char_indices() {
            while tokens.next_if(|t| t.range.end <= pos).is_some() {}
            let style = match tokens.peek() {
                Some(token) if token.range.contains(&pos) => {
                    if self.variables.iter().any(|v| v.key == token.key) {
                        known_style
                    } else {
                        unknown_style
                    }
                }
                _ => text_style,
            };
            styled.push((c, style));
        }
        styled
    }

    fn render_line(&self, idx: usize, show_cursor: bool, theme: &Theme) -> Line<'static> {
        let mut styled = self.styled_chars(&self.lines[idx], theme);
        if show_cursor && idx == self.cursor.0 {
            let col = self.cursor.1.min(styled.len());
            styled.insert(col, (CURSOR, Style::default().fg(theme.editor.cursor.to_color())));
        }

        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut run = String::new();
        let mut run_style: Option<Style> = None;
        for (c, style) in styled {
            if run_style != Some(style) {
                if let Some(prev) = run_style {
                    spans.push(Span::styled(std::mem::take(&mut run), prev));
                }
                run_style = Some(style);
            }
            run.push(c);
        }
        if let Some(style) = run_style {
            spans.push(Span::styled(run, style));
        }
        Line::from(spans)
    }

    /// Visible lines for an inner area of `height` rows
    pub fn lines_for_height(&self, height: u16, focused: bool, theme: &Theme) -> Vec<Line<'static>> {
        if self.is_empty() && !self.placeholder.is_empty() {
            let style = Style::default()
                .fg(theme.editor.placeholder.to_color())
                .add_modifier(Modifier::ITALIC);
            let mut lines: Vec<Line<'static>> = self
                .placeholder
                .lines()
                .take(height as usize)
                .map(|l| Line::from(Span::styled(l.to_string(), style)))
                .collect();
            if focused {
                let cursor = Span::styled(CURSOR.to_string(), Style::default().fg(theme.editor.cursor.to_color()));
                match lines.first_mut() {
                    Some(first) => first.spans.insert(0, cursor),
                    None => lines.push(Line::from(cursor)),
                }
            }
            return lines;
        }

        let visible = (height as usize).max(1);
        let start = self.cursor.0.saturating_sub(visible - 1);
        (start..self.lines.len())
            .take(visible)
            .map(|idx| self.render_line(idx, focused, theme))
            .collect()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool, theme: &Theme) {
        let hint = if focused { " [{{ or Ctrl+Space: variables] " } else { "" };
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(theme.title_style(focused))
            .title_bottom(Line::from(Span::styled(hint, Style::default().fg(theme.colors.muted.to_color()))))
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused));
        let inner = block.inner(area);

        let lines = self.lines_for_height(inner.height, focused, theme);
        frame.render_widget(Paragraph::new(lines).block(block), area);

        if focused {
            if let Some(picker) = self.picker {
                self.render_variable_picker(frame, inner, picker, theme);
            }
        }
    }

    fn render_variable_picker(&self, frame: &mut Frame, inner: Rect, picker: VariablePicker, theme: &Theme) {
        let width = inner.width.min(40);
        let height = (self.variables.len() as u16 + 2).min(PICKER_HEIGHT).min(inner.height.max(3));
        let popup = Rect::new(inner.x + inner.width.saturating_sub(width), inner.y, width, height);

        frame.render_widget(Clear, popup);

        let items: Vec<ListItem> = self
            .variables
            .iter()
            .map(|v| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{{{{{}}}}}", v.key), Style::default().fg(theme.editor.variable.to_color())),
                    Span::styled(format!("  {}", v.label), Style::default().fg(theme.picker.description_fg.to_color())),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title(" Variables ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.picker.border.to_color())),
            )
            .highlight_style(
                Style::default()
                    .bg(theme.picker.selected_bg.to_color())
                    .fg(theme.picker.selected_fg.to_color())
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut state = ListState::default();
        state.select(Some(picker.selected));
        frame.render_stateful_widget(list, popup, &mut state);
    }
}

/// Convert character position to byte position in a string
fn char_to_byte_pos(s: &str, char_pos: usize) -> usize {
    s.char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
