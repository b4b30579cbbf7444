use ratatui::{
    Frame,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::{Layout, Theme};

/// Help overlay showing keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let popup_area = Layout::centered(frame.area(), 54, 30);
        frame.render_widget(Clear, popup_area);

        let help_widget = Paragraph::new(Self::lines()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border_focused())
                .title(Span::styled(" Help ", Theme::title())),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn lines() -> Vec<Line<'static>> {
        vec![
            Self::section("General"),
            Self::key_line("Tab", "Switch tab"),
            Self::key_line("1 / 2", "Processes / Logs"),
            Self::key_line("↑↓ j/k", "Move selection"),
            Self::key_line("PgUp/PgDn", "Page up / down"),
            Self::key_line("g / G", "First / last row"),
            Self::key_line("Enter", "Toggle details panel"),
            Self::key_line("Esc", "Close overlay"),
            Self::key_line("h / ?", "Toggle this help"),
            Self::key_line("q", "Quit"),
            Line::from(""),
            Self::section("Processes"),
            Self::key_line("c", "Sort by CPU"),
            Self::key_line("m", "Sort by memory"),
            Self::key_line("r", "Reverse sort order"),
            Self::key_line("s", "Suspicious only"),
            Self::key_line("p", "Toggle details panel"),
            Self::key_line("F5", "Refresh now"),
            Line::from(""),
            Self::section("Logs"),
            Self::key_line("f", "Cycle category filter"),
            Self::key_line("s", "Toggle stats panel"),
            Self::key_line("r", "Rescan new lines"),
            Self::key_line("F", "Full rescan"),
            Self::key_line("d", "Forget seen lines"),
            Line::from(""),
            Line::from(Span::styled("  Press any key to close", Theme::text_dim())),
        ]
    }

    fn section(title: &str) -> Line<'_> {
        Line::from(Span::styled(title, Theme::text_highlight()))
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {:>10}", key), Style::default().fg(Theme::SUCCESS)),
            Span::styled(format!("  {}", desc), Theme::text()),
        ])
    }
}
