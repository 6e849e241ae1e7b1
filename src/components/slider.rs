//! Slider control for bounded numeric settings
//!
//! Renders a labelled bar with endpoint marks. Stepping snaps to the step grid
//! anchored at `min` and clamps into `[min, max]`; setting a value from outside
//! keeps it as-is so a stored out-of-range value is shown until the user moves
//! the slider.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::config::Theme;

pub const SLIDER_WIDTH: usize = 30;

#[derive(Debug, Clone)]
pub struct Slider {
    label: String,
    min: f64,
    max: f64,
    step: f64,
    value: f64,
    /// Text under the left end, numeric `min` when unset
    min_mark: Option<String>,
    /// Text under the right end, numeric `max` when unset
    max_mark: Option<String>,
}

impl Slider {
    pub fn new(label: impl Into<String>, min: f64, max: f64, step: f64) -> Self {
        Self {
            label: label.into(),
            min,
            max: max.max(min),
            step,
            value: min,
            min_mark: None,
            max_mark: None,
        }
    }

    pub fn with_marks(mut self, min_mark: impl Into<String>, max_mark: impl Into<String>) -> Self {
        self.min_mark = Some(min_mark.into());
        self.max_mark = Some(max_mark.into());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = value;
        self
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Move the upper bound. The current value is left alone.
    pub fn set_max(&mut self, max: f64) {
        self.max = max.max(self.min);
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    fn snap(&self, value: f64) -> f64 {
        if self.step <= 0.0 {
            return value;
        }
        self.min + ((value - self.min) / self.step).round() * self.step
    }

    /// Step up, returns the new value
    pub fn increase(&mut self) -> f64 {
        self.value = self.clamp(self.snap(self.value + self.step));
        self.value
    }

    /// Step down, returns the new value
    pub fn decrease(&mut self) -> f64 {
        self.value = self.clamp(self.snap(self.value - self.step));
        self.value
    }

    pub fn adjust(&mut self, increase: bool) -> f64 {
        if increase {
            self.increase()
        } else {
            self.decrease()
        }
    }

    /// Position of the value in the range, 0-100
    pub fn percentage(&self) -> u8 {
        let range = self.max - self.min;
        if range <= 0.0 {
            return 100;
        }
        let normalized = ((self.value - self.min) / range).clamp(0.0, 1.0);
        (normalized * 100.0).round() as u8
    }

    /// Bar of `width` cells filled to `percentage`
    pub fn render_slider_bar(percentage: u8, width: usize, filled_char: char, empty_char: char) -> (String, String) {
        let filled = (percentage.min(100) as usize * width) / 100;
        let empty = width.saturating_sub(filled);
        (
            filled_char.to_string().repeat(filled),
            empty_char.to_string().repeat(empty),
        )
    }

    fn format_number(value: f64) -> String {
        if value.fract() == 0.0 {
            format!("{}", value as i64)
        } else {
            format!("{:.1}", value)
        }
    }

    fn min_mark(&self) -> String {
        self.min_mark.clone().unwrap_or_else(|| Self::format_number(self.min))
    }

    fn max_mark(&self) -> String {
        self.max_mark.clone().unwrap_or_else(|| Self::format_number(self.max))
    }

    /// Label line, bar line and mark line
    pub fn lines(&self, focused: bool, theme: &Theme) -> Vec<Line<'static>> {
        let selector = if focused {
            theme.focus.focus_indicator.clone()
        } else {
            " ".to_string()
        };
        let label_style = if focused {
            Style::default()
                .fg(theme.colors.accent.to_color())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.colors.foreground.to_color())
        };

        let mut header = vec![
            Span::styled(format!(" {} ", selector), Style::default().fg(theme.colors.accent.to_color())),
            Span::styled(self.label.clone(), label_style),
            Span::raw("  "),
            Span::styled(
                Self::format_number(self.value),
                Style::default().fg(theme.slider.value.to_color()).add_modifier(Modifier::BOLD),
            ),
        ];
        if focused {
            header.push(Span::styled(
                "  ←/→ adjust",
                Style::default().fg(theme.colors.muted.to_color()),
            ));
        }

        let (filled, empty) = Self::render_slider_bar(
            self.percentage(),
            SLIDER_WIDTH,
            theme.slider.filled_char,
            theme.slider.empty_char,
        );
        let bar = Line::from(vec![
            Span::raw("    "),
            Span::styled(filled, Style::default().fg(theme.slider.filled.to_color())),
            Span::styled(empty, Style::default().fg(theme.slider.empty.to_color())),
        ]);

        let left = self.min_mark();
        let right = self.max_mark();
        let gap = SLIDER_WIDTH.saturating_sub(left.chars().count() + right.chars().count()).max(1);
        let marks = Line::from(vec![
            Span::raw("    "),
            Span::styled(
                format!("{}{}{}", left, " ".repeat(gap), right),
                Style::default().fg(theme.slider.mark.to_color()),
            ),
        ]);

        vec![Line::from(header), bar, marks]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_render_slider_bar() {
        let bar = |pct| {
            let (f, e) = Slider::render_slider_bar(pct, 10, '█', '░');
            format!("{}{}", f, e)
        };
        assert_eq!(bar(0), "░░░░░░░░░░");
        assert_eq!(bar(100), "██████████");
        assert_eq!(bar(50), "█████░░░░░");
    }

    #[rstest]
    #[case(0.0, 0)]
    #[case(5.0, 50)]
    #[case(10.0, 100)]
    #[case(14.0, 100)]
    fn test_percentage(#[case] value: f64, #[case] expected: u8) {
        let slider = Slider::new("Temperature", 0.0, 10.0, 1.0).with_value(value);
        assert_eq!(slider.percentage(), expected);
    }

    #[test]
    fn test_steps_snap_and_clamp() {
        let mut slider = Slider::new("Max tokens", 100.0, 4000.0, 50.0).with_value(2000.0);
        assert_eq!(slider.increase(), 2050.0);
        assert_eq!(slider.decrease(), 2000.0);

        slider.set_value(3990.0);
        assert_eq!(slider.increase(), 4000.0);

        slider.set_value(120.0);
        assert_eq!(slider.decrease(), 100.0);
    }

    #[test]
    fn test_out_of_range_value_kept_until_moved() {
        let mut slider = Slider::new("Max tokens", 100.0, 8000.0, 50.0).with_value(8000.0);
        slider.set_max(4000.0);
        assert_eq!(slider.value(), 8000.0);

        assert_eq!(slider.decrease(), 4000.0);
    }

    #[test]
    fn test_temperature_clamps_outside_values() {
        let mut slider = Slider::new("Temperature", 0.0, 10.0, 1.0).with_value(12.0);
        assert_eq!(slider.increase(), 10.0);

        slider.set_value(-3.0);
        assert_eq!(slider.decrease(), 0.0);
        assert_eq!(slider.clamp(7.5), 7.5);
    }

    #[test]
    fn test_lines_show_marks_and_value() {
        let slider = Slider::new("Temperature", 0.0, 10.0, 1.0)
            .with_marks("Deterministic", "Random")
            .with_value(3.0);
        let lines = slider.lines(true, &Theme::default());

        assert_eq!(lines.len(), 3);
        let header = line_text(&lines[0]);
        assert!(header.contains("Temperature"));
        assert!(header.contains('3'));
        assert!(header.contains("←/→ adjust"));
        let marks = line_text(&lines[2]);
        assert!(marks.trim_start().starts_with("Deterministic"));
        assert!(marks.trim_end().ends_with("Random"));
    }

    #[test]
    fn test_numeric_marks_follow_max() {
        let mut slider = Slider::new("Max tokens", 100.0, 4000.0, 50.0);
        slider.set_max(16000.0);
        let marks = line_text(&slider.lines(false, &Theme::default())[2]);
        assert!(marks.contains("100"));
        assert!(marks.trim_end().ends_with("16000"));
    }
}
