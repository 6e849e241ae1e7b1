// Rendering - draw() method

use ratatui::{style::Style, widgets::Block};

use super::App;
use crate::components::Component;
use crate::error::{Result, SettingsError};

impl App {
    pub(super) fn draw(&mut self) -> Result<()> {
        let modal = &self.modal;
        let theme = &self.theme;

        self.terminal
            .draw(|frame| {
                let area = frame.area();
                frame.render_widget(
                    Block::default().style(Style::default().bg(theme.colors.background.to_color())),
                    area,
                );
                modal.render(frame, area, true, theme);
            })
            .map_err(|e| SettingsError::Terminal(e.to_string()))?;

        Ok(())
    }
}
