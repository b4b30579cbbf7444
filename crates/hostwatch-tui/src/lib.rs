//! TUI components for hostwatch
//!
//! This crate provides the terminal user interface for hostwatch,
//! including state management, keybindings, event handling, and UI components.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

use ratatui::Frame;

pub use app::{Action, AppState, SortKey, Tab};
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{Header, HelpOverlay, StatusBar, SystemBar, tab_hints};
pub use ui::screens::{LogListScreen, ProcessListScreen};
pub use ui::{Layout, Theme};

/// Draw one full frame of the dashboard
pub fn draw(frame: &mut Frame, state: &mut AppState) {
    let (tabs_area, system_area, content_area, status_area) = Layout::main(frame.area());

    Header::render(frame, tabs_area, state);
    SystemBar::render(frame, system_area, &state.host);

    match state.tab {
        Tab::Processes => ProcessListScreen::render(frame, content_area, state),
        Tab::Logs => LogListScreen::render(frame, content_area, state),
    }

    let mut status = StatusBar::new().hints(tab_hints(state.tab));
    if let Some(err) = &state.ui_state.error_message {
        status = status.error(err.clone());
    } else if let Some(msg) = &state.ui_state.status_message {
        status = status.right(msg.clone());
    }
    frame.render_widget(status, status_area);

    if state.ui_state.help_visible {
        HelpOverlay::render(frame);
    }
}
