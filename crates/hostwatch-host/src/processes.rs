use std::time::Duration;

use sysinfo::{Process, ProcessStatus, System, Users};
use tracing::debug;

use hostwatch_types::{ProcessInfo, ProcessState};

/// Collects live processes with delta-based CPU usage
///
/// CPU usage is the change in a process's CPU time between two `collect`
/// calls divided by the elapsed wall time, so the first call reports 0 and
/// callers should poll no faster than `min_interval`.
pub struct ProcessCollector {
    system: System,
    users: Users,
}

impl ProcessCollector {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            users: Users::new_with_refreshed_list(),
        }
    }

    /// Shortest interval that yields meaningful CPU deltas
    pub fn min_interval() -> Duration {
        sysinfo::MINIMUM_CPU_UPDATE_INTERVAL
    }

    /// Refresh and return every process still alive
    pub fn collect(&mut self) -> Vec<ProcessInfo> {
        self.system.refresh_memory();
        self.system.refresh_processes();

        let total_memory = self.system.total_memory();
        let processes: Vec<ProcessInfo> = self
            .system
            .processes()
            .values()
            .map(|p| self.describe(p, total_memory))
            .collect();

        debug!(count = processes.len(), "collected processes");
        processes
    }

    fn describe(&self, process: &Process, total_memory: u64) -> ProcessInfo {
        let mut info = ProcessInfo::new(process.pid().as_u32(), process.name().to_string());
        info.cmdline = process.cmd().to_vec();
        info.exe = process.exe().map(|p| p.to_path_buf());
        info.cpu_percent = process.cpu_usage().min(100.0);
        info.memory_percent = if total_memory == 0 {
            0.0
        } else {
            (process.memory() as f64 / total_memory as f64 * 100.0) as f32
        };
        info.virtual_memory = process.virtual_memory();
        info.start_time = process.start_time();
        info.status = map_status(process.status());
        info.user = process
            .user_id()
            .and_then(|uid| self.users.get_user_by_id(uid))
            .map(|u| u.name().to_string());
        info
    }
}

impl Default for ProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn map_status(status: ProcessStatus) -> ProcessState {
    match status {
        ProcessStatus::Run => ProcessState::Running,
        ProcessStatus::Sleep => ProcessState::Sleeping,
        ProcessStatus::UninterruptibleDiskSleep => ProcessState::DiskSleep,
        ProcessStatus::Stop | ProcessStatus::Tracing => ProcessState::Stopped,
        ProcessStatus::Zombie | ProcessStatus::Dead => ProcessState::Zombie,
        ProcessStatus::Idle => ProcessState::Idle,
        _ => ProcessState::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_sees_current_process() {
        let mut collector = ProcessCollector::new();
        let processes = collector.collect();
        let me = std::process::id();

        let own = processes.iter().find(|p| p.pid == me);
        assert!(own.is_some());
        assert!(own.unwrap().cpu_percent <= 100.0);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_status(ProcessStatus::Run), ProcessState::Running);
        assert_eq!(map_status(ProcessStatus::Zombie), ProcessState::Zombie);
        assert_eq!(map_status(ProcessStatus::Unknown(42)), ProcessState::Unknown);
    }
}
