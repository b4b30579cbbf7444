use crate::app::Tab;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    // Navigation
    NextTab,
    ShowTab(Tab),
    Quit,

    // UI toggles
    ToggleHelp,
    ToggleDetails,
    ToggleStats,
    CloseOverlay,

    // List navigation
    ScrollUp(usize),
    ScrollDown(usize),
    ScrollToTop,
    ScrollToBottom,
    PageUp,
    PageDown,

    // Process tab
    SortByCpu,
    SortByMemory,
    ToggleSortOrder,
    ToggleSuspiciousOnly,
    RefreshProcesses,

    // Log tab
    RescanLogs,
    FullRescanLogs,
    ClearSeenLogs,
    CycleLogFilter,
}
