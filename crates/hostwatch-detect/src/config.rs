use std::path::PathBuf;
use std::time::Duration;

use crate::journal::JournalQuery;

/// Size and time bounds applied during a scan pass
#[derive(Clone, Debug)]
pub struct ScanLimits {
    /// Files larger than this are never opened
    pub max_file_bytes: u64,
    /// Only the trailing window of a file is read
    pub tail_window_bytes: u64,
    /// Lines kept from the tail window, and entries asked of the journal
    pub max_lines: usize,
    /// Lines shorter than this are ignored
    pub min_line_chars: usize,
    /// Display cap for entry content
    pub max_content_chars: usize,
    /// Result cache capacity
    pub cache_capacity: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: 100 * 1024 * 1024,
            tail_window_bytes: 100 * 1024,
            max_lines: 500,
            min_line_chars: 10,
            max_content_chars: 500,
            cache_capacity: 500,
        }
    }
}

/// Well-known log files, relative to the log root
pub const STANDARD_LOG_FILES: &[&str] = &[
    "syslog",
    "auth.log",
    "kern.log",
    "dmesg",
    "messages",
    "secure",
    "daemon.log",
    "mail.log",
    "cron.log",
];

/// Where and how the scan coordinator looks for log lines
#[derive(Clone, Debug)]
pub struct ScanConfig {
    /// Directory holding system logs
    pub log_root: PathBuf,
    /// Additional files to consider besides the standard ones
    pub extra_paths: Vec<PathBuf>,
    /// Journal access, `None` disables it
    pub journal: Option<JournalQuery>,
    pub limits: ScanLimits,
}

impl ScanConfig {
    /// Scan files under `log_root` only, no journal
    pub fn files_only(log_root: impl Into<PathBuf>) -> Self {
        Self {
            log_root: log_root.into(),
            extra_paths: Vec::new(),
            journal: None,
            limits: ScanLimits::default(),
        }
    }

    pub fn with_journal(mut self, journal: JournalQuery) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn with_extra_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.extra_paths = paths;
        self
    }

    pub fn with_limits(mut self, limits: ScanLimits) -> Self {
        self.limits = limits;
        self
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::files_only("/var/log").with_journal(JournalQuery::default())
    }
}

/// Probe timeout used when checking whether the journal is reachable
pub const JOURNAL_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for fetching recent journal entries
pub const JOURNAL_QUERY_TIMEOUT: Duration = Duration::from_secs(10);
