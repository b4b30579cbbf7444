use chrono::{DateTime, Local};

use hostwatch_detect::ScanSnapshot;
use hostwatch_types::{Category, HostStats, LogEntry, ProcessInfo};

/// Dashboard tabs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    Processes,
    Logs,
}

impl Tab {
    pub const ALL: [Tab; 2] = [Tab::Processes, Tab::Logs];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Processes => "Processes",
            Self::Logs => "Suspicious Logs",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Processes => 0,
            Self::Logs => 1,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Processes => Self::Logs,
            Self::Logs => Self::Processes,
        }
    }
}

/// Column the process table is ordered by
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    Cpu,
    Memory,
}

impl SortKey {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cpu => "CPU",
            Self::Memory => "MEM",
        }
    }
}

const DEFAULT_PAGE_SIZE: usize = 20;

/// UI-specific transient state
pub struct UiState {
    /// Is help overlay visible?
    pub help_visible: bool,

    /// Error message to display (if any)
    pub error_message: Option<String>,

    /// Short notice shown in the status bar
    pub status_message: Option<String>,

    /// Rows that fit in the list area, updated on render
    pub page_size: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            help_visible: false,
            error_message: None,
            status_message: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Process tab view settings
pub struct ProcessView {
    pub sort_key: SortKey,
    pub descending: bool,
    pub suspicious_only: bool,
    pub show_details: bool,
    /// Index into the visible rows
    pub selected: usize,
    /// PID the selection follows across refreshes
    pub selected_pid: Option<u32>,
}

impl Default for ProcessView {
    fn default() -> Self {
        Self {
            sort_key: SortKey::Cpu,
            descending: true,
            suspicious_only: false,
            show_details: false,
            selected: 0,
            selected_pid: None,
        }
    }
}

/// Log tab view settings
pub struct LogView {
    /// Only show entries carrying this category (None = all)
    pub filter: Option<Category>,
    pub selected: usize,
    pub show_details: bool,
    pub show_stats: bool,
}

impl Default for LogView {
    fn default() -> Self {
        Self {
            filter: None,
            selected: 0,
            show_details: false,
            show_stats: true,
        }
    }
}

/// Global application state
pub struct AppState {
    /// Tab being displayed
    pub tab: Tab,

    /// Latest host-wide sample
    pub host: HostStats,

    /// Every process from the last refresh
    all_processes: Vec<ProcessInfo>,

    /// Filtered and sorted rows shown in the table
    rows: Vec<ProcessInfo>,

    pub process_view: ProcessView,

    /// When the process list was last refreshed
    pub last_process_refresh: Option<DateTime<Local>>,

    /// Result of the latest log pass
    pub scan: ScanSnapshot,

    pub log_view: LogView,

    /// A log pass is running in the background
    pub scanning: bool,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            tab: Tab::Processes,
            host: HostStats::default(),
            all_processes: Vec::new(),
            rows: Vec::new(),
            process_view: ProcessView::default(),
            last_process_refresh: None,
            scan: ScanSnapshot::default(),
            log_view: LogView::default(),
            scanning: false,
            ui_state: UiState::default(),
            should_quit: false,
        }
    }

    pub fn with_suspicious_only(mut self, suspicious_only: bool) -> Self {
        self.process_view.suspicious_only = suspicious_only;
        self
    }

    // ------------------------------------------------------------------
    // Processes
    // ------------------------------------------------------------------

    /// Replace the process list, keeping the selection on the same PID
    pub fn set_processes(&mut self, processes: Vec<ProcessInfo>) {
        self.all_processes = processes;
        self.last_process_refresh = Some(Local::now());
        self.rebuild_rows();
    }

    pub fn process_rows(&self) -> &[ProcessInfo] {
        &self.rows
    }

    pub fn process_total(&self) -> usize {
        self.all_processes.len()
    }

    pub fn suspicious_total(&self) -> usize {
        self.all_processes.iter().filter(|p| p.suspicious).count()
    }

    pub fn selected_process(&self) -> Option<&ProcessInfo> {
        self.rows.get(self.process_view.selected)
    }

    pub fn sort_by(&mut self, key: SortKey) {
        self.process_view.sort_key = key;
        self.rebuild_rows();
    }

    pub fn toggle_sort_order(&mut self) {
        self.process_view.descending = !self.process_view.descending;
        self.rebuild_rows();
    }

    pub fn toggle_suspicious_only(&mut self) {
        self.process_view.suspicious_only = !self.process_view.suspicious_only;
        self.process_view.selected = 0;
        self.process_view.selected_pid = None;
        self.rebuild_rows();
    }

    fn rebuild_rows(&mut self) {
        let view = &self.process_view;
        let mut rows: Vec<ProcessInfo> = self
            .all_processes
            .iter()
            .filter(|p| !view.suspicious_only || p.suspicious)
            .cloned()
            .collect();

        let (key, descending) = (view.sort_key, view.descending);
        rows.sort_by(|a, b| {
            let ord = match key {
                SortKey::Cpu => a.cpu_percent.total_cmp(&b.cpu_percent),
                SortKey::Memory => a.memory_percent.total_cmp(&b.memory_percent),
            };
            let ord = if descending { ord.reverse() } else { ord };
            ord.then(a.pid.cmp(&b.pid))
        });

        self.rows = rows;
        self.restore_process_selection();
    }

    fn restore_process_selection(&mut self) {
        let view = &mut self.process_view;
        if let Some(pid) = view.selected_pid {
            if let Some(idx) = self.rows.iter().position(|p| p.pid == pid) {
                view.selected = idx;
                return;
            }
        }
        view.selected = view.selected.min(self.rows.len().saturating_sub(1));
        view.selected_pid = self.rows.get(view.selected).map(|p| p.pid);
    }

    // ------------------------------------------------------------------
    // Logs
    // ------------------------------------------------------------------

    /// Cached entries that pass the category filter, in priority order
    pub fn visible_logs(&self) -> Vec<&LogEntry> {
        let filter = self.log_view.filter;
        self.scan
            .entries
            .iter()
            .filter(|e| filter.is_none_or(|c| e.categories.contains(c)))
            .collect()
    }

    pub fn selected_log(&self) -> Option<&LogEntry> {
        self.visible_logs().get(self.log_view.selected).copied()
    }

    /// ALL -> CRITICAL -> SECURITY -> NETWORK -> SYSTEM -> WARNING -> ALL
    pub fn cycle_log_filter(&mut self) {
        self.log_view.filter = match self.log_view.filter {
            None => Some(Category::ALL[0]),
            Some(current) => Category::ALL
                .iter()
                .position(|c| *c == current)
                .and_then(|i| Category::ALL.get(i + 1).copied()),
        };
        self.log_view.selected = 0;
    }

    /// Mark a pass as started; false if one is already running
    pub fn begin_scan(&mut self) -> bool {
        if self.scanning {
            self.ui_state.status_message = Some("Log scan already in progress".to_string());
            return false;
        }
        self.scanning = true;
        self.ui_state.status_message = Some("Scanning logs...".to_string());
        true
    }

    pub fn finish_scan(&mut self, snapshot: ScanSnapshot) {
        self.scanning = false;
        self.ui_state.status_message = Some(format!(
            "Scan complete: {} entries",
            snapshot.entries.len()
        ));
        self.scan = snapshot;
        let len = self.visible_logs().len();
        self.log_view.selected = self.log_view.selected.min(len.saturating_sub(1));
    }

    /// A pass ended without a result
    pub fn abort_scan(&mut self, msg: String) {
        self.scanning = false;
        self.ui_state.status_message = None;
        self.show_error(msg);
    }

    /// Reflect a cleared dedup set without waiting for the next pass
    pub fn mark_seen_cleared(&mut self) {
        self.scan.seen_lines = 0;
        self.ui_state.status_message = Some("Dedup cache cleared".to_string());
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
    }

    /// Length of the list on the current tab
    pub fn current_len(&self) -> usize {
        match self.tab {
            Tab::Processes => self.rows.len(),
            Tab::Logs => self.visible_logs().len(),
        }
    }

    pub fn selected_index(&self) -> usize {
        match self.tab {
            Tab::Processes => self.process_view.selected,
            Tab::Logs => self.log_view.selected,
        }
    }

    fn select(&mut self, index: usize) {
        let index = index.min(self.current_len().saturating_sub(1));
        match self.tab {
            Tab::Processes => {
                self.process_view.selected = index;
                self.process_view.selected_pid = self.rows.get(index).map(|p| p.pid);
            }
            Tab::Logs => self.log_view.selected = index,
        }
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.select(self.selected_index().saturating_sub(n));
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.select(self.selected_index().saturating_add(n));
    }

    pub fn scroll_to_top(&mut self) {
        self.select(0);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.select(usize::MAX);
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.ui_state.page_size.max(1));
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.ui_state.page_size.max(1));
    }

    // ------------------------------------------------------------------
    // Overlays
    // ------------------------------------------------------------------

    pub fn toggle_details(&mut self) {
        match self.tab {
            Tab::Processes => self.process_view.show_details = !self.process_view.show_details,
            Tab::Logs => self.log_view.show_details = !self.log_view.show_details,
        }
    }

    pub fn toggle_help(&mut self) {
        self.ui_state.help_visible = !self.ui_state.help_visible;
    }

    /// Close the topmost overlay: help, then error, then details
    pub fn close_overlay(&mut self) {
        if self.ui_state.help_visible {
            self.ui_state.help_visible = false;
        } else if self.ui_state.error_message.is_some() {
            self.dismiss_error();
        } else {
            self.process_view.show_details = false;
            self.log_view.show_details = false;
        }
    }

    /// Show an error message
    pub fn show_error(&mut self, msg: String) {
        self.ui_state.error_message = Some(msg);
    }

    /// Dismiss the error message
    pub fn dismiss_error(&mut self) {
        self.ui_state.error_message = None;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostwatch_types::CategorySet;

    fn process(pid: u32, cpu: f32, mem: f32, suspicious: bool) -> ProcessInfo {
        let mut p = ProcessInfo::new(pid, format!("proc{}", pid));
        p.cpu_percent = cpu;
        p.memory_percent = mem;
        p.suspicious = suspicious;
        p
    }

    fn entry(text: &str, categories: &[Category]) -> LogEntry {
        LogEntry::new(
            "syslog".to_string(),
            text.to_string(),
            categories.iter().copied().collect::<CategorySet>(),
            500,
        )
    }

    fn pids(state: &AppState) -> Vec<u32> {
        state.process_rows().iter().map(|p| p.pid).collect()
    }

    #[test]
    fn test_sort_by_cpu_descending_by_default() {
        let mut state = AppState::new();
        state.set_processes(vec![
            process(1, 5.0, 1.0, false),
            process(2, 50.0, 2.0, false),
            process(3, 20.0, 9.0, false),
        ]);
        assert_eq!(pids(&state), vec![2, 3, 1]);

        state.toggle_sort_order();
        assert_eq!(pids(&state), vec![1, 3, 2]);

        state.toggle_sort_order();
        state.sort_by(SortKey::Memory);
        assert_eq!(pids(&state), vec![3, 2, 1]);
    }

    #[test]
    fn test_ties_are_ordered_by_pid() {
        let mut state = AppState::new();
        state.set_processes(vec![
            process(9, 1.0, 0.0, false),
            process(4, 1.0, 0.0, false),
        ]);
        assert_eq!(pids(&state), vec![4, 9]);
    }

    #[test]
    fn test_selection_follows_pid_across_refresh() {
        let mut state = AppState::new();
        state.set_processes(vec![
            process(1, 30.0, 0.0, false),
            process(2, 20.0, 0.0, false),
            process(3, 10.0, 0.0, false),
        ]);
        state.scroll_down(1);
        assert_eq!(state.selected_process().map(|p| p.pid), Some(2));

        // pid 2 is now the busiest process
        state.set_processes(vec![
            process(1, 30.0, 0.0, false),
            process(2, 90.0, 0.0, false),
            process(3, 10.0, 0.0, false),
        ]);
        assert_eq!(state.process_view.selected, 0);
        assert_eq!(state.selected_process().map(|p| p.pid), Some(2));
    }

    #[test]
    fn test_selection_clamps_when_pid_exits() {
        let mut state = AppState::new();
        state.set_processes(vec![
            process(1, 30.0, 0.0, false),
            process(2, 20.0, 0.0, false),
        ]);
        state.scroll_to_bottom();
        assert_eq!(state.selected_process().map(|p| p.pid), Some(2));

        state.set_processes(vec![process(1, 30.0, 0.0, false)]);
        assert_eq!(state.process_view.selected, 0);
        assert_eq!(state.process_view.selected_pid, Some(1));
    }

    #[test]
    fn test_suspicious_only_filter() {
        let mut state = AppState::new();
        state.set_processes(vec![
            process(1, 30.0, 0.0, false),
            process(2, 20.0, 0.0, true),
        ]);
        assert_eq!(state.suspicious_total(), 1);

        state.toggle_suspicious_only();
        assert_eq!(pids(&state), vec![2]);
        assert_eq!(state.process_total(), 2);

        let state = AppState::new().with_suspicious_only(true);
        assert!(state.process_view.suspicious_only);
    }

    #[test]
    fn test_scrolling_is_clamped() {
        let mut state = AppState::new();
        state.set_processes((1..=5).map(|i| process(i, i as f32, 0.0, false)).collect());

        state.scroll_up(3);
        assert_eq!(state.selected_index(), 0);
        state.scroll_down(100);
        assert_eq!(state.selected_index(), 4);

        state.ui_state.page_size = 2;
        state.page_up();
        assert_eq!(state.selected_index(), 2);
        state.scroll_to_top();
        assert_eq!(state.selected_index(), 0);
    }

    #[test]
    fn test_empty_lists_do_not_panic() {
        let mut state = AppState::new();
        state.scroll_down(1);
        state.page_down();
        state.scroll_to_bottom();
        assert!(state.selected_process().is_none());

        state.next_tab();
        state.scroll_down(1);
        assert!(state.selected_log().is_none());
    }

    #[test]
    fn test_log_filter_cycle() {
        let mut state = AppState::new();
        let mut seen = vec![state.log_view.filter];
        for _ in 0..6 {
            state.cycle_log_filter();
            seen.push(state.log_view.filter);
        }
        assert_eq!(
            seen,
            vec![
                None,
                Some(Category::Critical),
                Some(Category::Security),
                Some(Category::Network),
                Some(Category::System),
                Some(Category::Warning),
                None,
            ]
        );
    }

    #[test]
    fn test_visible_logs_respect_filter() {
        let mut state = AppState::new();
        state.tab = Tab::Logs;
        let snapshot = ScanSnapshot {
            entries: vec![
                entry("kernel panic detected", &[Category::Critical]),
                entry("permission denied on socket", &[Category::Network, Category::Security]),
                entry("disk warning threshold", &[Category::Warning]),
            ],
            ..Default::default()
        };
        assert!(state.begin_scan());
        state.finish_scan(snapshot);
        assert_eq!(state.visible_logs().len(), 3);

        state.cycle_log_filter();
        state.cycle_log_filter();
        assert_eq!(state.log_view.filter, Some(Category::Security));
        let visible = state.visible_logs();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].content, "permission denied on socket");
    }

    #[test]
    fn test_scan_cannot_start_twice() {
        let mut state = AppState::new();
        assert!(state.begin_scan());
        assert!(!state.begin_scan());
        assert!(state.scanning);

        state.finish_scan(ScanSnapshot::default());
        assert!(!state.scanning);
        assert!(state.begin_scan());
    }

    #[test]
    fn test_finish_scan_clamps_log_selection() {
        let mut state = AppState::new();
        state.tab = Tab::Logs;
        state.log_view.selected = 10;
        state.finish_scan(ScanSnapshot {
            entries: vec![entry("kernel panic detected", &[Category::Critical])],
            ..Default::default()
        });
        assert_eq!(state.log_view.selected, 0);
    }

    #[test]
    fn test_close_overlay_order() {
        let mut state = AppState::new();
        state.toggle_help();
        state.show_error("boom".to_string());
        state.toggle_details();

        state.close_overlay();
        assert!(!state.ui_state.help_visible);
        assert!(state.ui_state.error_message.is_some());

        state.close_overlay();
        assert!(state.ui_state.error_message.is_none());
        assert!(state.process_view.show_details);

        state.close_overlay();
        assert!(!state.process_view.show_details);
    }
}
