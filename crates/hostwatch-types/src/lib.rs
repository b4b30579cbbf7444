//! Shared types for hostwatch
//!
//! This crate contains data structures used across multiple hostwatch crates.

use chrono::{DateTime, Local};
use ratatui::style::Color;
use std::fmt;
use std::path::PathBuf;

// ============================================================================
// Log Types
// ============================================================================

/// Severity bucket a log line can fall into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Critical,
    Security,
    Network,
    System,
    Warning,
}

impl Category {
    /// All categories, highest priority first
    pub const ALL: [Category; 5] = [
        Self::Critical,
        Self::Security,
        Self::Network,
        Self::System,
        Self::Warning,
    ];

    /// Priority rank, 0 is the most urgent
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Security => 1,
            Self::Network => 2,
            Self::System => 3,
            Self::Warning => 4,
        }
    }

    /// Upper-case display label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Security => "SECURITY",
            Self::Network => "NETWORK",
            Self::System => "SYSTEM",
            Self::Warning => "WARNING",
        }
    }

    /// Parse a label, case-insensitive
    pub fn from_label(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
    }

    /// Get display color for this category
    pub fn color(&self) -> Color {
        match self {
            Self::Critical => Color::Magenta,
            Self::Security => Color::Red,
            Self::Network => Color::Yellow,
            Self::System => Color::Green,
            Self::Warning => Color::DarkGray,
        }
    }

    fn bit(&self) -> u8 {
        1 << self.rank()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unordered set of categories a line matched
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CategorySet(u8);

impl CategorySet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, category: Category) {
        self.0 |= category.bit();
    }

    pub fn contains(&self, category: Category) -> bool {
        self.0 & category.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in priority order
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|c| self.contains(*c))
    }

    /// Highest-priority member, used as the representative category
    pub fn primary(&self) -> Option<Category> {
        self.iter().next()
    }

    /// Sort key: rank of the primary category, empty sets sort last
    pub fn sort_key(&self) -> u8 {
        self.primary().map(|c| c.rank()).unwrap_or(u8::MAX)
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut set = Self::new();
        for category in iter {
            set.insert(category);
        }
        set
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.iter().map(|c| c.label()).collect();
        f.write_str(&labels.join(", "))
    }
}

/// Counts per category
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryCounts {
    pub critical: usize,
    pub security: usize,
    pub network: usize,
    pub system: usize,
    pub warning: usize,
}

impl CategoryCounts {
    /// Count every category carried by an entry
    pub fn add(&mut self, set: &CategorySet) {
        for category in set.iter() {
            *self.slot(category) += 1;
        }
    }

    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::Critical => self.critical,
            Category::Security => self.security,
            Category::Network => self.network,
            Category::System => self.system,
            Category::Warning => self.warning,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.security + self.network + self.system + self.warning
    }

    fn slot(&mut self, category: Category) -> &mut usize {
        match category {
            Category::Critical => &mut self.critical,
            Category::Security => &mut self.security,
            Category::Network => &mut self.network,
            Category::System => &mut self.system,
            Category::Warning => &mut self.warning,
        }
    }
}

/// A single classified log line
#[derive(Clone, Debug)]
pub struct LogEntry {
    /// File basename or the journal marker
    pub source: String,

    /// Line text capped for display
    pub content: String,

    /// Untruncated line
    pub raw: String,

    /// When the line was first observed
    pub captured_at: DateTime<Local>,

    /// Categories the line matched
    pub categories: CategorySet,
}

impl LogEntry {
    /// Create an entry, capping `content` at `max_chars` characters
    pub fn new(source: String, raw: String, categories: CategorySet, max_chars: usize) -> Self {
        let content = match raw.char_indices().nth(max_chars) {
            Some((cut, _)) => raw[..cut].to_string(),
            None => raw.clone(),
        };

        Self {
            source,
            content,
            raw,
            captured_at: Local::now(),
            categories,
        }
    }

    /// Representative category for display
    pub fn primary_category(&self) -> Option<Category> {
        self.categories.primary()
    }

    pub fn is_truncated(&self) -> bool {
        self.content.len() < self.raw.len()
    }
}

// ============================================================================
// Process Types
// ============================================================================

/// The subset of a live process the suspicion rules look at
#[derive(Clone, Debug, Default)]
pub struct ProcessSnapshot {
    /// Command line tokens (empty when unreadable)
    pub cmdline: Vec<String>,

    /// Executable name
    pub name: String,

    /// Executable path, if the OS let us read it
    pub exe: Option<PathBuf>,

    /// CPU utilization over the last sampling interval
    pub cpu_percent: f32,
}

impl ProcessSnapshot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_cmdline<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cmdline = tokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exe(mut self, exe: impl Into<PathBuf>) -> Self {
        self.exe = Some(exe.into());
        self
    }

    pub fn with_cpu(mut self, cpu_percent: f32) -> Self {
        self.cpu_percent = cpu_percent;
        self
    }

    /// Command line joined with spaces
    pub fn joined_cmdline(&self) -> String {
        self.cmdline.join(" ")
    }
}

/// A process row as shown by the dashboard
#[derive(Clone, Debug)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub user: Option<String>,
    pub cmdline: Vec<String>,
    pub exe: Option<PathBuf>,
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub virtual_memory: u64,
    /// Start time in seconds since the epoch
    pub start_time: u64,
    pub status: ProcessState,
    /// Set by the suspicion rules after collection
    pub suspicious: bool,
}

impl ProcessInfo {
    pub fn new(pid: u32, name: String) -> Self {
        Self {
            pid,
            name,
            user: None,
            cmdline: Vec::new(),
            exe: None,
            cpu_percent: 0.0,
            memory_percent: 0.0,
            virtual_memory: 0,
            start_time: 0,
            status: ProcessState::Unknown,
            suspicious: false,
        }
    }

    /// The fields the suspicion rules need
    pub fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            cmdline: self.cmdline.clone(),
            name: self.name.clone(),
            exe: self.exe.clone(),
            cpu_percent: self.cpu_percent,
        }
    }

    /// Command line for display, falling back to `[name]` for kernel threads
    pub fn display_cmdline(&self) -> String {
        if self.cmdline.is_empty() {
            format!("[{}]", self.name)
        } else {
            self.cmdline.join(" ")
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Sleeping,
    DiskSleep,
    Stopped,
    Zombie,
    Idle,
    Unknown,
}

impl ProcessState {
    /// Single-glyph status marker
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Running => "●",
            Self::Sleeping => "○",
            Self::DiskSleep => "◐",
            Self::Stopped => "◻",
            Self::Zombie => "☠",
            Self::Idle => "◯",
            Self::Unknown => "?",
        }
    }
}

// ============================================================================
// Host Types
// ============================================================================

/// System-wide utilization sample
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostStats {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_used: u64,
    pub memory_total: u64,
    pub disk_percent: f64,
    pub network_percent: f64,
    pub load_average: [f64; 3],
}
