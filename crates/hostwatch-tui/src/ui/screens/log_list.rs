use ratatui::{
    Frame,
    layout::{Constraint, Margin, Rect},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, TableState, Wrap,
    },
};

use hostwatch_types::{Category, LogEntry};

use crate::app::AppState;
use crate::ui::components::truncate_to_width;
use crate::ui::{Layout, Theme};

const STATS_WIDTH: u16 = 28;
const DETAILS_HEIGHT: u16 = 8;

/// Suspicious log entries in priority order
pub struct LogListScreen;

impl LogListScreen {
    pub fn render(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let (main, stats_area) = Layout::with_sidebar(area, STATS_WIDTH, state.log_view.show_stats);
        let (list_area, details_area) =
            Layout::with_bottom_panel(main, DETAILS_HEIGHT, state.log_view.show_details);

        state.ui_state.page_size = list_area.height.saturating_sub(3).max(1) as usize;

        let visible = state.visible_logs();
        Self::render_list(frame, list_area, state, &visible);
        if let Some(stats_area) = stats_area {
            Self::render_stats(frame, stats_area, state, visible.len());
        }
        if let Some(details_area) = details_area {
            let selected = visible.get(state.log_view.selected).copied();
            Self::render_details(frame, details_area, selected);
        }
    }

    fn render_list(frame: &mut Frame, area: Rect, state: &AppState, entries: &[&LogEntry]) {
        let header = Row::new(vec![
            Cell::from("TIME"),
            Cell::from("CATEGORY"),
            Cell::from("SOURCE"),
            Cell::from("MESSAGE"),
        ])
        .style(Theme::table_header());

        let message_width = (area.width as usize).saturating_sub(44).max(10);
        let rows = entries.iter().map(|entry| {
            let category = entry
                .primary_category()
                .map(|c| Span::styled(c.label(), Theme::category(c)))
                .unwrap_or_else(|| Span::raw("-"));
            Row::new(vec![
                Cell::from(entry.captured_at.format("%H:%M:%S").to_string()),
                Cell::from(category),
                Cell::from(truncate_to_width(&entry.source, 14)),
                Cell::from(truncate_to_width(&entry.content, message_width)),
            ])
            .style(Theme::text())
        });

        let widths = [
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(14),
            Constraint::Min(10),
        ];

        let filter = state
            .log_view
            .filter
            .map(|c| c.label())
            .unwrap_or("ALL");
        let title = Line::from(vec![
            Span::styled(" Suspicious Logs ", Theme::title()),
            Span::styled(format!("[{}] ", filter), Theme::text_highlight()),
        ]);

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(Theme::row_selected())
            .highlight_symbol("▶")
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border_focused())
                    .title(title),
            );

        if entries.is_empty() {
            let message = if state.scanning {
                "Scanning logs..."
            } else if state.scan.scanned_at.is_none() {
                "No scan yet"
            } else {
                "No suspicious entries"
            };
            let empty = Paragraph::new(Span::styled(message, Theme::text_dim())).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border_focused())
                    .title(Span::styled(" Suspicious Logs ", Theme::title())),
            );
            frame.render_widget(empty, area);
            return;
        }

        let mut table_state = TableState::default();
        table_state.select(Some(state.log_view.selected));
        frame.render_stateful_widget(table, area, &mut table_state);

        if entries.len() > state.ui_state.page_size {
            let mut scrollbar_state =
                ScrollbarState::new(entries.len()).position(state.log_view.selected);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    fn render_stats(frame: &mut Frame, area: Rect, state: &AppState, shown: usize) {
        let scan = &state.scan;
        let stat = |name: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("{:<12}", name), Theme::label()),
                Span::styled(value, Theme::text()),
            ])
        };

        let mut lines = vec![
            stat("Total", scan.entries.len().to_string()),
            stat("Shown", shown.to_string()),
            stat("Seen lines", scan.seen_lines.to_string()),
            stat(
                "Sources",
                scan.stats
                    .count("total_log_files")
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            stat(
                "Last scan",
                scan.scanned_at
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "never".to_string()),
            ),
            Line::from(""),
            Line::from(Span::styled("Last pass", Theme::text_highlight())),
        ];

        for category in Category::ALL {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<12}", category.label()), Theme::category(category)),
                Span::styled(scan.counts.get(category).to_string(), Theme::text()),
            ]));
        }

        let errors: Vec<(&str, &str)> = scan.stats.errors().collect();
        if !errors.is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Errors ({})", errors.len()),
                Theme::error(),
            )));
            let width = area.width.saturating_sub(2) as usize;
            for (key, message) in errors {
                let text = format!("{}: {}", key, message);
                lines.push(Line::from(Span::styled(
                    truncate_to_width(&text, width),
                    Theme::text_dim(),
                )));
            }
        }

        let widget = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" Stats ", Theme::title())),
        );
        frame.render_widget(widget, area);
    }

    fn render_details(frame: &mut Frame, area: Rect, entry: Option<&LogEntry>) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(" Entry ", Theme::title()));

        let Some(entry) = entry else {
            frame.render_widget(
                Paragraph::new(Span::styled("No entry selected", Theme::text_dim())).block(block),
                area,
            );
            return;
        };

        let mut categories = vec![Span::styled("Categories: ", Theme::label())];
        for (i, c) in entry.categories.iter().enumerate() {
            if i > 0 {
                categories.push(Span::raw(", "));
            }
            categories.push(Span::styled(c.label(), Theme::category(c)));
        }

        let mut header = vec![
            Span::styled("Source: ", Theme::label()),
            Span::styled(entry.source.clone(), Theme::text_highlight()),
            Span::styled("  Captured: ", Theme::label()),
            Span::styled(
                entry.captured_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                Theme::text(),
            ),
        ];
        if entry.is_truncated() {
            header.push(Span::styled("  (display truncated)", Theme::text_dim()));
        }

        let lines = vec![
            Line::from(header),
            Line::from(categories),
            Line::from(Span::styled(entry.raw.clone(), Theme::text())),
        ];

        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
            area,
        );
    }
}
