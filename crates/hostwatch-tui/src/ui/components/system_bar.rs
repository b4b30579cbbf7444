use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
};

use hostwatch_types::HostStats;

use crate::app::{AppState, Tab};
use crate::ui::Theme;
use crate::ui::components::format_memory;

const BAR_WIDTH: usize = 10;

/// Tab strip plus scan/refresh indicators
pub struct Header;

impl Header {
    pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
        let titles: Vec<Line> = Tab::ALL
            .iter()
            .map(|t| {
                let title = match t {
                    Tab::Processes => format!(
                        " {} ({}/{}) ",
                        t.title(),
                        state.suspicious_total(),
                        state.process_total()
                    ),
                    Tab::Logs => format!(" {} ({}) ", t.title(), state.scan.entries.len()),
                };
                Line::from(title)
            })
            .collect();

        let mut block_title = vec![Span::styled(" hostwatch ", Theme::title())];
        if state.scanning {
            block_title.push(Span::styled("⟳ scanning ", Theme::text_highlight()));
        }

        let tabs = Tabs::new(titles)
            .select(state.tab.index())
            .style(Theme::tab())
            .highlight_style(Theme::tab_active())
            .divider(Span::styled("│", Theme::text_dim()))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border())
                    .title(Line::from(block_title)),
            );

        frame.render_widget(tabs, area);
    }
}

/// Host-wide CPU, memory, disk, network and load
pub struct SystemBar;

impl SystemBar {
    pub fn render(frame: &mut Frame, area: Rect, stats: &HostStats) {
        let sep = Span::styled(" │ ", Theme::text_dim());
        let mut spans = Vec::new();
        spans.extend(Self::gauge("CPU", stats.cpu_percent));
        spans.push(sep.clone());
        spans.extend(Self::gauge("MEM", stats.memory_percent));
        spans.push(Span::styled(
            format!(
                " {}/{}",
                format_memory(stats.memory_used),
                format_memory(stats.memory_total)
            ),
            Theme::text_dim(),
        ));
        spans.push(sep.clone());
        spans.extend(Self::gauge("DISK", stats.disk_percent));
        spans.push(sep.clone());
        spans.extend(Self::gauge("NET", stats.network_percent));
        spans.push(sep);
        let [one, five, fifteen] = stats.load_average;
        spans.push(Span::styled("LOAD ", Theme::label()));
        spans.push(Span::styled(
            format!("{:.2} {:.2} {:.2}", one, five, fifteen),
            Theme::text(),
        ));

        let widget = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" System ", Theme::text_dim())),
        );
        frame.render_widget(widget, area);
    }

    fn gauge(label: &'static str, percent: f64) -> Vec<Span<'static>> {
        let style = Theme::usage(percent);
        vec![
            Span::styled(format!("{} ", label), Theme::label()),
            Span::styled(usage_bar(percent, BAR_WIDTH), style),
            Span::styled(format!(" {:5.1}%", percent), style),
        ]
    }
}

/// `[████░░░░]` style bar for a 0-100 value
pub fn usage_bar(percent: f64, width: usize) -> String {
    let ratio = (percent / 100.0).clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_bar() {
        assert_eq!(usage_bar(0.0, 4), "[░░░░]");
        assert_eq!(usage_bar(50.0, 4), "[██░░]");
        assert_eq!(usage_bar(100.0, 4), "[████]");
    }

    #[test]
    fn test_usage_bar_clamps_out_of_range() {
        assert_eq!(usage_bar(250.0, 4), "[████]");
        assert_eq!(usage_bar(-5.0, 4), "[░░░░]");
        assert_eq!(usage_bar(f64::NAN, 4), "[░░░░]");
    }
}
