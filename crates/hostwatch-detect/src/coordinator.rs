use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use tracing::info;

use hostwatch_types::{Category, CategoryCounts, LogEntry};

use crate::classifier::CategoryClassifier;
use crate::config::{ScanConfig, ScanLimits};
use crate::scanner::LogScanner;
use crate::sources::SourceEnumerator;
use crate::stats::ScanStats;

/// Owns the dedup set, the bounded result cache and scan statistics
pub struct ScanCoordinator {
    enumerator: SourceEnumerator,
    scanner: LogScanner,
    limits: ScanLimits,

    /// Raw lines already processed in this session
    seen_lines: HashSet<String>,

    /// Priority-ordered results, at most `cache_capacity` long
    result_cache: Vec<LogEntry>,

    stats: ScanStats,

    /// Per-category counts of entries found by the latest pass
    last_counts: CategoryCounts,

    last_scan: Option<DateTime<Local>>,
}

impl ScanCoordinator {
    pub fn new(config: ScanConfig) -> Self {
        Self::with_classifier(config, CategoryClassifier::new())
    }

    pub fn with_classifier(config: ScanConfig, classifier: CategoryClassifier) -> Self {
        Self {
            enumerator: SourceEnumerator::new(&config),
            scanner: LogScanner::new(classifier, config.journal.clone(), config.limits.clone()),
            limits: config.limits,
            seen_lines: HashSet::new(),
            result_cache: Vec::new(),
            stats: ScanStats::new(),
            last_counts: CategoryCounts::default(),
            last_scan: None,
        }
    }

    /// Run one pass over every source and return the updated cache
    ///
    /// A full rescan forgets seen lines, stats and cached entries first; a
    /// partial one only adds lines not seen before.
    pub fn run_scan(&mut self, full_rescan: bool) -> &[LogEntry] {
        if full_rescan {
            self.seen_lines.clear();
            self.stats.clear();
            self.result_cache.clear();
        }

        let sources = self.enumerator.discover(&mut self.stats);

        let mut batch = Vec::new();
        let mut counts = CategoryCounts::default();
        for source in &sources {
            let entries = self
                .scanner
                .scan(source, &mut self.seen_lines, &mut self.stats);
            for entry in &entries {
                counts.add(&entry.categories);
            }
            batch.extend(entries);
        }

        let new_entries = batch.len();
        let mut candidate = std::mem::take(&mut self.result_cache);
        candidate.extend(batch);

        // Stable: equal priorities keep insertion order
        candidate.sort_by_key(|e| e.categories.sort_key());
        let total = candidate.len();
        candidate.truncate(self.limits.cache_capacity);
        self.result_cache = candidate;

        self.stats.set_count("total_entries", total);
        self.stats.set_count("returned_entries", self.result_cache.len());
        self.stats.set_count("cache_size", self.seen_lines.len());
        self.last_counts = counts;
        self.last_scan = Some(Local::now());

        info!(
            full_rescan,
            sources = sources.len(),
            new_entries,
            cached = self.result_cache.len(),
            "log scan finished"
        );

        &self.result_cache
    }

    /// Current cached entries, highest priority first
    pub fn entries(&self) -> &[LogEntry] {
        &self.result_cache
    }

    /// Cached entries carrying a given category
    pub fn filtered(&self, category: Category) -> impl Iterator<Item = &LogEntry> {
        self.result_cache
            .iter()
            .filter(move |e| e.categories.contains(category))
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    pub fn category_counts(&self) -> &CategoryCounts {
        &self.last_counts
    }

    pub fn seen_len(&self) -> usize {
        self.seen_lines.len()
    }

    pub fn last_scan(&self) -> Option<DateTime<Local>> {
        self.last_scan
    }

    /// Forget which lines were seen, keeping cached entries and stats
    pub fn clear_seen(&mut self) {
        self.seen_lines.clear();
    }

    /// Owned copy of everything a renderer needs
    pub fn snapshot(&self) -> ScanSnapshot {
        ScanSnapshot {
            entries: self.result_cache.clone(),
            stats: self.stats.clone(),
            counts: self.last_counts.clone(),
            seen_lines: self.seen_lines.len(),
            scanned_at: self.last_scan,
        }
    }
}

/// Read-only view of the coordinator state after a pass
#[derive(Clone, Debug, Default)]
pub struct ScanSnapshot {
    pub entries: Vec<LogEntry>,
    pub stats: ScanStats,
    pub counts: CategoryCounts,
    pub seen_lines: usize,
    pub scanned_at: Option<DateTime<Local>>,
}

/// Cloneable handle for running passes off the UI thread
#[derive(Clone)]
pub struct ScanHandle {
    inner: Arc<Mutex<ScanCoordinator>>,
}

impl ScanHandle {
    pub fn new(coordinator: ScanCoordinator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(coordinator)),
        }
    }

    /// Run a pass and copy the result out; blocks while another pass holds the lock
    pub fn scan(&self, full_rescan: bool) -> ScanSnapshot {
        let mut coordinator = self.inner.lock();
        coordinator.run_scan(full_rescan);
        coordinator.snapshot()
    }

    pub fn clear_seen(&self) {
        self.inner.lock().clear_seen();
    }

    /// Snapshot without scanning, `None` while a pass is running
    pub fn try_snapshot(&self) -> Option<ScanSnapshot> {
        self.inner.try_lock().map(|c| c.snapshot())
    }
}
