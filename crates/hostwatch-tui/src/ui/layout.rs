use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Split the screen into tabs, system bar, content and status bar
    pub fn main(area: Rect) -> (Rect, Rect, Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Tabs
                Constraint::Length(3), // System bar
                Constraint::Min(1),    // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2], chunks[3])
    }

    /// Content area with an optional panel below it
    pub fn with_bottom_panel(area: Rect, height: u16, show: bool) -> (Rect, Option<Rect>) {
        if !show {
            return (area, None);
        }
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(height)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    }

    /// Content area with an optional sidebar on the right
    pub fn with_sidebar(area: Rect, width: u16, show: bool) -> (Rect, Option<Rect>) {
        if !show {
            return (area, None);
        }
        let chunks = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(width)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    }

    /// A rectangle centered in `area`, clamped to fit
    pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(2));
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width, height)
    }
}
