//! Host inspection for hostwatch
//!
//! This crate provides process enumeration and system-wide utilization
//! sampling on top of sysinfo.

mod processes;
mod sampler;

pub use processes::ProcessCollector;
pub use sampler::{HostSampler, NetSample, network_usage_percent};

// Re-export types that are used in our public API
pub use hostwatch_types::{HostStats, ProcessInfo, ProcessSnapshot, ProcessState};
