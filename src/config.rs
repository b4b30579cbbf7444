use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use hostwatch_detect::{JournalQuery, ProcessEvaluator, ScanConfig};
use hostwatch_host::ProcessCollector;

use crate::Args;

/// Settings loaded from `config.toml`, then overridden from the command line
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scan: ScanSection,
    pub process: ProcessSection,
    pub ui: UiSection,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScanSection {
    /// Directory holding system logs
    pub log_root: PathBuf,
    /// Extra files to scan besides the standard ones
    pub extra_paths: Vec<PathBuf>,
    /// Include the systemd journal
    pub journal: bool,
    /// Program used to query the journal
    pub journal_command: String,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            log_root: PathBuf::from("/var/log"),
            extra_paths: Vec::new(),
            journal: true,
            journal_command: "journalctl".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessSection {
    pub refresh_interval_ms: u64,
    /// Names added to the high-CPU allow-list
    pub cpu_allow_list: Vec<String>,
}

impl Default for ProcessSection {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 1500,
            cpu_allow_list: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct UiSection {
    /// Seconds between automatic log passes while the log tab is open
    pub log_refresh_secs: u64,
    /// Link speed the network gauge is scaled against
    pub network_max_mbps: f64,
    pub tick_rate_ms: u64,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            log_refresh_secs: 30,
            network_max_mbps: 100.0,
            tick_rate_ms: 250,
        }
    }
}

impl Config {
    /// `<config_dir>/hostwatch/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hostwatch").join("config.toml"))
    }

    /// Load from an explicit path, or from the default path if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Command-line flags win over the file
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(root) = &args.log_root {
            self.scan.log_root = root.clone();
        }
        if let Some(ms) = args.process_interval_ms {
            self.process.refresh_interval_ms = ms;
        }
        if let Some(secs) = args.log_interval_secs {
            self.ui.log_refresh_secs = secs;
        }
        if args.no_journal {
            self.scan.journal = false;
        }
    }

    /// Process refresh interval, never shorter than CPU sampling allows
    pub fn process_interval(&self) -> Duration {
        Duration::from_millis(self.process.refresh_interval_ms).max(ProcessCollector::min_interval())
    }

    pub fn log_interval(&self) -> Duration {
        Duration::from_secs(self.ui.log_refresh_secs.max(1))
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.ui.tick_rate_ms.max(16))
    }

    pub fn scan_config(&self) -> ScanConfig {
        let config = ScanConfig::files_only(&self.scan.log_root)
            .with_extra_paths(self.scan.extra_paths.clone());
        if self.scan.journal {
            config.with_journal(JournalQuery::new(&self.scan.journal_command))
        } else {
            config
        }
    }

    pub fn evaluator(&self) -> ProcessEvaluator {
        ProcessEvaluator::new().with_allowed(&self.process.cpu_allow_list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use hostwatch_types::ProcessSnapshot;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.scan.log_root, PathBuf::from("/var/log"));
        assert!(config.scan.journal);
        assert_eq!(config.ui.log_refresh_secs, 30);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::parse(
            r#"
            [scan]
            log_root = "/srv/logs"
            extra_paths = ["/opt/app/app.log"]
            journal = false

            [ui]
            network_max_mbps = 1000.0
            "#,
        )
        .unwrap();

        assert_eq!(config.scan.log_root, PathBuf::from("/srv/logs"));
        assert_eq!(config.scan.extra_paths, vec![PathBuf::from("/opt/app/app.log")]);
        assert!(!config.scan.journal);
        assert_eq!(config.scan.journal_command, "journalctl");
        assert_eq!(config.ui.network_max_mbps, 1000.0);
        assert_eq!(config.ui.tick_rate_ms, 250);
        assert_eq!(config.process.refresh_interval_ms, 1500);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(Config::parse("[scan]\nlog_rot = \"/x\"\n").is_err());
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[process]\nrefresh_interval_ms = 3000\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.process.refresh_interval_ms, 3000);
        assert_eq!(config.process_interval(), Duration::from_millis(3000));
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read config file"));
    }

    #[test]
    fn test_args_override_file() {
        let mut config = Config::parse("[scan]\nlog_root = \"/srv/logs\"\n").unwrap();
        let args = Args::parse_from([
            "hostwatch",
            "--log-root",
            "/tmp/logs",
            "--log-interval-secs",
            "5",
            "--no-journal",
        ]);
        config.apply_args(&args);

        assert_eq!(config.scan.log_root, PathBuf::from("/tmp/logs"));
        assert_eq!(config.log_interval(), Duration::from_secs(5));
        assert!(config.scan_config().journal.is_none());
    }

    #[test]
    fn test_process_interval_has_floor() {
        let mut config = Config::default();
        config.process.refresh_interval_ms = 1;
        assert!(config.process_interval() >= ProcessCollector::min_interval());
    }

    #[test]
    fn test_scan_config_uses_journal_command() {
        let mut config = Config::default();
        config.scan.journal_command = "/usr/local/bin/journalctl".to_string();
        let scan = config.scan_config();
        assert_eq!(
            scan.journal.as_ref().map(|j| j.program()),
            Some("/usr/local/bin/journalctl")
        );
    }

    #[test]
    fn test_extra_allow_list_names() {
        let config = Config::parse("[process]\ncpu_allow_list = [\"ffmpeg\"]\n").unwrap();
        let busy = ProcessSnapshot::new("ffmpeg").with_cpu(99.0);
        assert!(!config.evaluator().is_suspicious(&busy));
        assert!(ProcessEvaluator::new().is_suspicious(&busy));
    }
}
