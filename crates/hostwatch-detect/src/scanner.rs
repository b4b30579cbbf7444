use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::{debug, warn};

use hostwatch_types::LogEntry;

use crate::classifier::CategoryClassifier;
use crate::config::ScanLimits;
use crate::error::ScanError;
use crate::journal::JournalQuery;
use crate::sources::{JOURNAL_MARKER, SourceRef};
use crate::stats::ScanStats;

/// Reads the recent tail of one source and turns new lines into entries
#[derive(Clone, Debug)]
pub struct LogScanner {
    classifier: CategoryClassifier,
    journal: Option<JournalQuery>,
    limits: ScanLimits,
}

impl LogScanner {
    pub fn new(
        classifier: CategoryClassifier,
        journal: Option<JournalQuery>,
        limits: ScanLimits,
    ) -> Self {
        Self {
            classifier,
            journal,
            limits,
        }
    }

    pub fn classifier(&self) -> &CategoryClassifier {
        &self.classifier
    }

    /// Scan one source; failures are recorded in `stats` and yield no entries
    pub fn scan(
        &self,
        source: &SourceRef,
        seen: &mut HashSet<String>,
        stats: &mut ScanStats,
    ) -> Vec<LogEntry> {
        match source {
            SourceRef::File(path) => self.scan_file(path, seen, stats),
            SourceRef::Journal => self.scan_journal(seen, stats),
        }
    }

    fn scan_file(
        &self,
        path: &Path,
        seen: &mut HashSet<String>,
        stats: &mut ScanStats,
    ) -> Vec<LogEntry> {
        let label = SourceRef::File(path.to_path_buf()).label();

        let lines = match self.read_tail(path) {
            Ok(lines) => lines,
            Err(e) => {
                warn!(source = %label, error = %e, "failed to read log file");
                stats.record_error(&label, e.to_string());
                return Vec::new();
            }
        };
        stats.set_count(format!("lines_read_{}", label), lines.len());

        let (processed, entries) = self.classify_lines(&label, lines.iter().map(String::as_str), seen);
        stats.set_count(format!("processed_{}", label), processed);
        stats.set_count(format!("found_{}", label), entries.len());
        debug!(source = %label, processed, found = entries.len(), "scanned log file");

        entries
    }

    fn scan_journal(&self, seen: &mut HashSet<String>, stats: &mut ScanStats) -> Vec<LogEntry> {
        let Some(journal) = &self.journal else {
            return Vec::new();
        };

        let output = match journal.recent(self.limits.max_lines) {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "journal query failed");
                stats.set_text(format!("{}_error", JOURNAL_MARKER), e.to_string());
                return Vec::new();
            }
        };

        let lines: Vec<&str> = output.split('\n').collect();
        stats.set_count(format!("{}_lines", JOURNAL_MARKER), lines.len());

        let (processed, entries) = self.classify_lines(JOURNAL_MARKER, lines.into_iter(), seen);
        debug!(processed, found = entries.len(), "scanned journal");
        entries
    }

    /// The last `max_lines` lines within the trailing byte window of a file
    fn read_tail(&self, path: &Path) -> Result<Vec<String>, ScanError> {
        let io_err = |source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(io_err)?;
        let size = file.metadata().map_err(io_err)?.len();

        // Byte-accurate; a partial first line is dropped by the length filter or
        // simply treated as one more line
        let start = size.saturating_sub(self.limits.tail_window_bytes);
        file.seek(SeekFrom::Start(start)).map_err(io_err)?;

        let mut buf = Vec::with_capacity((size - start) as usize);
        file.read_to_end(&mut buf).map_err(io_err)?;

        let text = String::from_utf8_lossy(&buf);
        let all: Vec<&str> = text.lines().collect();
        let skip = all.len().saturating_sub(self.limits.max_lines);

        Ok(all[skip..].iter().map(|l| l.to_string()).collect())
    }

    /// Trim, filter, dedup and classify; returns (newly processed, kept entries)
    fn classify_lines<'a, I>(
        &self,
        label: &str,
        lines: I,
        seen: &mut HashSet<String>,
    ) -> (usize, Vec<LogEntry>)
    where
        I: Iterator<Item = &'a str>,
    {
        let mut processed = 0;
        let mut entries = Vec::new();

        for line in lines {
            let line = line.trim();
            if line.is_empty() || line.chars().count() < self.limits.min_line_chars {
                continue;
            }
            if seen.contains(line) {
                continue;
            }
            seen.insert(line.to_string());
            processed += 1;

            let categories = self.classifier.categorize(line);
            if categories.is_empty() {
                continue;
            }
            entries.push(LogEntry::new(
                label.to_string(),
                line.to_string(),
                categories,
                self.limits.max_content_chars,
            ));
        }

        (processed, entries)
    }
}
