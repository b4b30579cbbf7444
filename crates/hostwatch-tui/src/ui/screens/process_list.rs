use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Margin, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, TableState, Wrap,
    },
};

use hostwatch_types::ProcessInfo;

use crate::app::{AppState, SortKey};
use crate::ui::components::{format_memory, format_runtime, truncate_to_width};
use crate::ui::{Layout, Theme};

const DETAILS_HEIGHT: u16 = 9;
const COMMAND_MIN_WIDTH: usize = 20;

/// Live process table with an optional details panel
pub struct ProcessListScreen;

impl ProcessListScreen {
    pub fn render(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let (table_area, details_area) =
            Layout::with_bottom_panel(area, DETAILS_HEIGHT, state.process_view.show_details);

        // Borders and header row
        state.ui_state.page_size = table_area.height.saturating_sub(3).max(1) as usize;

        Self::render_table(frame, table_area, state);
        if let Some(details_area) = details_area {
            Self::render_details(frame, details_area, state.selected_process());
        }
    }

    fn render_table(frame: &mut Frame, area: Rect, state: &AppState) {
        let view = &state.process_view;
        let now = Local::now().timestamp().max(0) as u64;

        let arrow = if view.descending { "▼" } else { "▲" };
        let cpu_title = match view.sort_key {
            SortKey::Cpu => format!("CPU%{}", arrow),
            SortKey::Memory => "CPU%".to_string(),
        };
        let mem_title = match view.sort_key {
            SortKey::Memory => format!("MEM%{}", arrow),
            SortKey::Cpu => "MEM%".to_string(),
        };

        let header = Row::new(vec![
            Cell::from("PID"),
            Cell::from("USER"),
            Cell::from("S"),
            Cell::from("NAME"),
            Cell::from(cpu_title),
            Cell::from(mem_title),
            Cell::from("VIRT"),
            Cell::from("TIME"),
            Cell::from("COMMAND"),
        ])
        .style(Theme::table_header());

        // Width left after the fixed columns and the table chrome
        let command_width = (area.width as usize).saturating_sub(71).max(COMMAND_MIN_WIDTH);

        let rows = state.process_rows().iter().map(|p| {
            let style = if p.suspicious {
                Theme::row_suspicious()
            } else {
                Theme::text()
            };
            Row::new(vec![
                Cell::from(p.pid.to_string()),
                Cell::from(truncate_to_width(p.user.as_deref().unwrap_or("?"), 10)),
                Cell::from(p.status.symbol()),
                Cell::from(truncate_to_width(&p.name, 16)),
                Cell::from(format!("{:5.1}", p.cpu_percent)),
                Cell::from(format!("{:5.1}", p.memory_percent)),
                Cell::from(format_memory(p.virtual_memory)),
                Cell::from(format_runtime(p.start_time, now)),
                Cell::from(truncate_to_width(&p.display_cmdline(), command_width)),
            ])
            .style(style)
        });

        let widths = [
            Constraint::Length(7),
            Constraint::Length(10),
            Constraint::Length(1),
            Constraint::Length(16),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Min(10),
        ];

        let mut title = vec![
            Span::styled(" Processes ", Theme::title()),
            Span::styled(format!("by {}{} ", view.sort_key.label(), arrow), Theme::text_dim()),
        ];
        if view.suspicious_only {
            title.push(Span::styled("[suspicious only] ", Theme::error()));
        }
        if let Some(at) = state.last_process_refresh {
            title.push(Span::styled(
                format!("updated {} ", at.format("%H:%M:%S")),
                Theme::text_dim(),
            ));
        }

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(Theme::row_selected())
            .highlight_symbol("▶")
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border_focused())
                    .title(Line::from(title)),
            );

        let len = state.process_rows().len();
        let mut table_state = TableState::default();
        if len > 0 {
            table_state.select(Some(view.selected));
        }
        frame.render_stateful_widget(table, area, &mut table_state);

        if len > state.ui_state.page_size {
            let mut scrollbar_state = ScrollbarState::new(len).position(view.selected);
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

    fn render_details(frame: &mut Frame, area: Rect, process: Option<&ProcessInfo>) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border())
            .title(Span::styled(" Details ", Theme::title()));

        let Some(p) = process else {
            let empty = Paragraph::new(Span::styled("No process selected", Theme::text_dim()))
                .block(block);
            frame.render_widget(empty, area);
            return;
        };

        let verdict = if p.suspicious {
            Span::styled("SUSPICIOUS", Theme::error())
        } else {
            Span::styled("ok", Style::default().fg(Theme::SUCCESS))
        };
        let exe = p
            .exe
            .as_ref()
            .map(|e| e.display().to_string())
            .unwrap_or_else(|| "-".to_string());

        let lines = vec![
            Line::from(vec![
                Self::label("PID"),
                Span::styled(p.pid.to_string(), Theme::text_highlight()),
                Self::label("  Name"),
                Span::styled(p.name.clone(), Theme::text()),
                Self::label("  User"),
                Span::styled(p.user.clone().unwrap_or_else(|| "?".to_string()), Theme::text()),
                Self::label("  Verdict"),
                verdict,
            ]),
            Line::from(vec![
                Self::label("CPU"),
                Span::styled(format!("{:.1}%", p.cpu_percent), Theme::text()),
                Self::label("  Memory"),
                Span::styled(format!("{:.1}%", p.memory_percent), Theme::text()),
                Self::label("  Virtual"),
                Span::styled(format_memory(p.virtual_memory), Theme::text()),
                Self::label("  Status"),
                Span::styled(format!("{} {:?}", p.status.symbol(), p.status), Theme::text()),
            ]),
            Line::from(vec![Self::label("Executable"), Span::styled(exe, Theme::text())]),
            Line::from(vec![
                Self::label("Command"),
                Span::styled(p.display_cmdline(), Theme::text()),
            ]),
        ];

        let details = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block);
        frame.render_widget(details, area);
    }

    fn label(name: &'static str) -> Span<'static> {
        Span::styled(format!("{}: ", name), Theme::label())
    }
}
