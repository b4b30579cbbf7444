use regex::Regex;

use hostwatch_types::{Category, CategorySet};

/// Built-in pattern table, evaluated in order within each category
const DEFAULT_PATTERNS: &[(Category, &[&str])] = &[
    (
        Category::Critical,
        &[
            r"panic",
            r"kernel panic",
            r"segfault",
            r"core dumped",
            r"fatal",
            r"bug:.*kernel",
            r"block crash",
            r"oops",
            r"unrecoverable error",
            r"critical",
            r"emergency",
            r"emerg",
            r"crit:",
        ],
    ),
    (
        Category::Security,
        &[
            r"unauthorized",
            r"permission denied",
            r"failed password",
            r"sudo:.*authentication failure",
            r"possible break-in attempt",
            r"root login attempt",
            r"security breach",
            r"authentication failure",
            r"invalid user",
            r"illegal user",
            r"failed login",
            r"brute force",
            r"ssh.*break",
            r"pam_unix.*authentication failure",
        ],
    ),
    (
        Category::Network,
        &[
            r"network unreachable",
            r"disconnected",
            r"no route to host",
            r"timeout",
            r"dns lookup failed",
            r"connection refused",
            r"dropped connection",
            r"firewall",
            r"iptables",
            r"connection reset",
            r"network.*down",
            r"interface.*down",
        ],
    ),
    (
        Category::System,
        &[
            r"\[error\]",
            r"error:",
            r"failed to",
            r"daemon.*fail",
            r"service.*fail",
            r"disk full",
            r"mount error",
            r"out of memory",
            r"systemd.*fail",
            r"oom-killer",
            r"failed",
            r"exception",
            r"traceback",
            r"errno",
            r"cannot",
        ],
    ),
    (
        Category::Warning,
        &[
            r"\bwarn\b",
            r"warning:",
            r"deprecated",
            r"obsolete",
            r"denied",
            r"low memory",
            r"warn:",
            r"caution",
            r"alert",
            r"notice",
        ],
    ),
];

/// Maps log lines to severity categories using ordered pattern lists
#[derive(Clone, Debug)]
pub struct CategoryClassifier {
    rules: Vec<(Category, Vec<Regex>)>,
}

impl CategoryClassifier {
    /// Classifier with the built-in pattern table
    pub fn new() -> Self {
        Self::with_patterns(DEFAULT_PATTERNS).expect("built-in category patterns compile")
    }

    /// Compile a custom pattern table; patterns match case-insensitively
    pub fn with_patterns(table: &[(Category, &[&str])]) -> Result<Self, regex::Error> {
        let mut rules = Vec::with_capacity(table.len());
        for (category, patterns) in table {
            let compiled = patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){}", p)))
                .collect::<Result<Vec<_>, _>>()?;
            rules.push((*category, compiled));
        }
        Ok(Self { rules })
    }

    /// All categories the line matches; empty means the line is not interesting
    pub fn categorize(&self, line: &str) -> CategorySet {
        let lower = line.to_lowercase();
        let mut matched = CategorySet::new();

        for (category, patterns) in &self.rules {
            // First hit settles the category
            if patterns.iter().any(|re| re.is_match(&lower)) {
                matched.insert(*category);
            }
        }

        matched
    }

    /// Number of patterns configured for a category
    pub fn pattern_count(&self, category: Category) -> usize {
        self.rules
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, p)| p.len())
            .unwrap_or(0)
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new()
    }
}
