use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::app::Tab;
use crate::ui::Theme;

/// Bottom line with key hints on the left and a notice on the right
pub struct StatusBar<'a> {
    hints: Vec<(&'a str, &'a str)>,
    right_text: Option<(String, Style)>,
}

impl<'a> StatusBar<'a> {
    pub fn new() -> Self {
        Self {
            hints: Vec::new(),
            right_text: None,
        }
    }

    /// Add keyboard hints as (key, description) pairs
    pub fn hints<I>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.hints = hints.into_iter().collect();
        self
    }

    /// Set text to display on the right side
    pub fn right<S: Into<String>>(mut self, text: S) -> Self {
        self.right_text = Some((text.into(), Theme::status_bar()));
        self
    }

    /// Right-side text in the error style
    pub fn error<S: Into<String>>(mut self, text: S) -> Self {
        self.right_text = Some((text.into(), Theme::error().bg(ratatui::style::Color::DarkGray)));
        self
    }
}

impl Default for StatusBar<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Theme::status_bar());

        let mut spans = Vec::new();
        for (i, (key, desc)) in self.hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" ", Theme::status_bar()));
            }
            spans.push(Span::styled(format!("[{}]", key), Theme::status_bar_key()));
            spans.push(Span::styled(format!(" {}", desc), Theme::status_bar()));
        }

        let line = Line::from(spans);
        let line_width = line.width() as u16;
        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));

        // Right text only when it does not overlap the hints
        if let Some((text, style)) = self.right_text {
            let width = text.width() as u16;
            let right_x = area.x + area.width.saturating_sub(width + 1);
            if right_x > area.x + line_width + 2 {
                buf.set_span(right_x, area.y, &Span::styled(text, style), width);
            }
        }
    }
}

/// Key hints for the given tab
pub fn tab_hints(tab: Tab) -> Vec<(&'static str, &'static str)> {
    let mut hints = vec![("Tab", "Switch"), ("↑↓", "Move"), ("Enter", "Details")];
    match tab {
        Tab::Processes => hints.extend([
            ("c/m", "Sort"),
            ("r", "Reverse"),
            ("s", "Suspicious"),
        ]),
        Tab::Logs => hints.extend([
            ("f", "Filter"),
            ("r", "Rescan"),
            ("F", "Full"),
            ("d", "Forget"),
        ]),
    }
    hints.extend([("?", "Help"), ("q", "Quit")]);
    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, width: u16) -> String {
        (0..width)
            .map(|x| buf[(x, 0)].symbol().to_string())
            .collect::<String>()
    }

    #[test]
    fn test_renders_hints_and_right_text() {
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new()
            .hints([("q", "Quit")])
            .right("3 suspicious")
            .render(area, &mut buf);

        let text = row(&buf, 60);
        assert!(text.contains("[q] Quit"));
        assert!(text.trim_end().ends_with("3 suspicious"));
    }

    #[test]
    fn test_right_text_dropped_when_too_narrow() {
        let area = Rect::new(0, 0, 16, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new()
            .hints([("q", "Quit")])
            .right("a long notice here")
            .render(area, &mut buf);

        assert!(!row(&buf, 16).contains("notice"));
    }

    #[test]
    fn test_tab_hints_differ() {
        let procs = tab_hints(Tab::Processes);
        let logs = tab_hints(Tab::Logs);
        assert!(procs.iter().any(|(_, d)| *d == "Suspicious"));
        assert!(logs.iter().any(|(k, _)| *k == "F"));
    }
}
