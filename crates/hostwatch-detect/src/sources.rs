use std::collections::BTreeSet;
use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::{STANDARD_LOG_FILES, ScanConfig};
use crate::error::ScanError;
use crate::journal::JournalQuery;
use crate::stats::ScanStats;

/// Source label used for journal entries
pub const JOURNAL_MARKER: &str = "journalctl";

/// One place log lines come from
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceRef {
    File(PathBuf),
    Journal,
}

impl SourceRef {
    /// Short name used in entries and stats keys
    pub fn label(&self) -> String {
        match self {
            Self::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            Self::Journal => JOURNAL_MARKER.to_string(),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Journal => f.write_str(JOURNAL_MARKER),
        }
    }
}

/// Finds the log sources that can currently be read
#[derive(Clone, Debug)]
pub struct SourceEnumerator {
    log_root: PathBuf,
    extra_paths: Vec<PathBuf>,
    journal: Option<JournalQuery>,
    max_file_bytes: u64,
}

impl SourceEnumerator {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            log_root: config.log_root.clone(),
            extra_paths: config.extra_paths.clone(),
            journal: config.journal.clone(),
            max_file_bytes: config.limits.max_file_bytes,
        }
    }

    /// Accessible files in path order, then the journal if it answers
    pub fn discover(&self, stats: &mut ScanStats) -> Vec<SourceRef> {
        let mut sources: Vec<SourceRef> = self
            .candidates()
            .into_iter()
            .filter(|path| match check_file(path, self.max_file_bytes) {
                Ok(()) => true,
                Err(e) => {
                    debug!(error = %e, "skipping log candidate");
                    false
                }
            })
            .map(SourceRef::File)
            .collect();

        if let Some(journal) = &self.journal {
            match journal.probe() {
                Ok(()) => sources.push(SourceRef::Journal),
                Err(e) => debug!(error = %e, "journal not available"),
            }
        }

        stats.set_count("total_log_files", sources.len());
        sources
    }

    /// Standard files, configured extras and `*.log` files up to two levels deep
    fn candidates(&self) -> BTreeSet<PathBuf> {
        let mut paths: BTreeSet<PathBuf> = STANDARD_LOG_FILES
            .iter()
            .map(|name| self.log_root.join(name))
            .collect();
        paths.extend(self.extra_paths.iter().cloned());

        let walked = WalkDir::new(&self.log_root)
            .min_depth(1)
            .max_depth(2)
            .into_iter()
            .filter_map(Result::ok)
            .map(|entry| entry.into_path())
            .filter(|path| has_log_extension(path));
        paths.extend(walked);

        paths
    }
}

fn has_log_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "log")
}

/// Accept only regular files within the size limit that we can open
pub fn check_file(path: &Path, max_bytes: u64) -> Result<(), ScanError> {
    let io_err = |source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    };

    let meta = fs::metadata(path).map_err(io_err)?;
    if !meta.is_file() {
        return Err(ScanError::NotRegularFile {
            path: path.to_path_buf(),
        });
    }
    if meta.len() > max_bytes {
        return Err(ScanError::Oversized {
            path: path.to_path_buf(),
            size: meta.len(),
            limit: max_bytes,
        });
    }
    File::open(path).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanLimits;
    use std::os::unix::fs::PermissionsExt;

    fn enumerator(root: &Path, max_file_bytes: u64) -> SourceEnumerator {
        let limits = ScanLimits {
            max_file_bytes,
            ..ScanLimits::default()
        };
        SourceEnumerator::new(&ScanConfig::files_only(root).with_limits(limits))
    }

    fn file_sources(sources: &[SourceRef]) -> Vec<String> {
        sources
            .iter()
            .filter(|s| matches!(s, SourceRef::File(_)))
            .map(|s| s.label())
            .collect()
    }

    #[test]
    fn test_finds_standard_and_nested_logs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("syslog"), "line\n").unwrap();
        fs::write(dir.path().join("app.log"), "line\n").unwrap();
        fs::create_dir_all(dir.path().join("nginx/old")).unwrap();
        fs::write(dir.path().join("nginx/error.log"), "line\n").unwrap();
        fs::write(dir.path().join("nginx/old/ancient.log"), "line\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "line\n").unwrap();

        let mut stats = ScanStats::new();
        let sources = enumerator(dir.path(), 1024).discover(&mut stats);
        let labels = file_sources(&sources);

        assert!(labels.contains(&"syslog".to_string()));
        assert!(labels.contains(&"app.log".to_string()));
        assert!(labels.contains(&"error.log".to_string()));
        assert!(!labels.contains(&"ancient.log".to_string()));
        assert!(!labels.contains(&"notes.txt".to_string()));
        assert_eq!(stats.count("total_log_files"), Some(sources.len()));
    }

    #[test]
    fn test_excludes_oversized_and_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("big.log"), vec![b'x'; 4096]).unwrap();
        fs::write(dir.path().join("good.log"), "fine\n").unwrap();

        let locked = dir.path().join("locked.log");
        fs::write(&locked, "secret\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // root can read anything, so only assert exclusion when the OS enforces it
        let enforced = File::open(&locked).is_err();

        let mut stats = ScanStats::new();
        let sources = enumerator(dir.path(), 1024).discover(&mut stats);
        let labels = file_sources(&sources);

        assert!(labels.contains(&"good.log".to_string()));
        assert!(!labels.contains(&"big.log".to_string()));
        if enforced {
            assert!(!labels.contains(&"locked.log".to_string()));
        }
    }

    #[test]
    fn test_directories_named_like_logs_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("journal.log")).unwrap();

        let mut stats = ScanStats::new();
        let sources = enumerator(dir.path(), 1024).discover(&mut stats);
        assert!(sources.is_empty());
        assert_eq!(stats.count("total_log_files"), Some(0));
    }

    #[test]
    fn test_extra_paths_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let extra = dir.path().join("custom.log");
        fs::write(&extra, "hello\n").unwrap();

        let config = ScanConfig::files_only(dir.path()).with_extra_paths(vec![extra.clone()]);
        let mut stats = ScanStats::new();
        let sources = SourceEnumerator::new(&config).discover(&mut stats);

        assert_eq!(sources, vec![SourceRef::File(extra)]);
    }

    #[test]
    fn test_journal_marker_added_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScanConfig::files_only(dir.path()).with_journal(JournalQuery::new("true"));

        let mut stats = ScanStats::new();
        let sources = SourceEnumerator::new(&config).discover(&mut stats);
        assert_eq!(sources, vec![SourceRef::Journal]);

        let failing = ScanConfig::files_only(dir.path()).with_journal(JournalQuery::new("false"));
        assert!(SourceEnumerator::new(&failing).discover(&mut stats).is_empty());
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(SourceRef::File("/var/log/auth.log".into()).label(), "auth.log");
        assert_eq!(SourceRef::Journal.label(), JOURNAL_MARKER);
    }
}
