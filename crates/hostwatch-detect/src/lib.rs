//! Suspicious activity detection for hostwatch
//!
//! This crate flags suspicious processes and incrementally scans system logs,
//! classifying new lines into severity categories and keeping a bounded,
//! priority-ordered result cache across polling cycles.

mod classifier;
mod config;
mod coordinator;
mod error;
mod journal;
mod process;
mod scanner;
mod sources;
mod stats;

pub use classifier::CategoryClassifier;
pub use config::{
    JOURNAL_PROBE_TIMEOUT, JOURNAL_QUERY_TIMEOUT, STANDARD_LOG_FILES, ScanConfig, ScanLimits,
};
pub use coordinator::{ScanCoordinator, ScanHandle, ScanSnapshot};
pub use error::ScanError;
pub use journal::JournalQuery;
pub use process::{CPU_THRESHOLD, ProcessEvaluator};
pub use scanner::LogScanner;
pub use sources::{JOURNAL_MARKER, SourceEnumerator, SourceRef, check_file};
pub use stats::{ScanStats, StatValue};

// Re-export types used in our public API
pub use hostwatch_types::{Category, CategoryCounts, CategorySet, LogEntry, ProcessSnapshot};
