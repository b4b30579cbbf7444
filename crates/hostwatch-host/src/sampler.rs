use std::path::Path;
use std::time::Instant;

use sysinfo::{Disks, Networks, System};

use hostwatch_types::HostStats;

const ROOT_MOUNT: &str = "/";

/// Cumulative network counters at a point in time
#[derive(Clone, Copy, Debug)]
pub struct NetSample {
    pub sent: u64,
    pub received: u64,
    pub at: Instant,
}

/// Host-wide utilization sampler
///
/// CPU and network figures are deltas against the previous call, so the
/// first `sample` after construction or `reset` reports 0 for both.
pub struct HostSampler {
    system: System,
    networks: Networks,
    disks: Disks,
    prev_net: Option<NetSample>,
    network_max_mbps: f64,
}

impl HostSampler {
    pub fn new(network_max_mbps: f64) -> Self {
        Self {
            system: System::new(),
            networks: Networks::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
            prev_net: None,
            network_max_mbps,
        }
    }

    pub fn sample(&mut self) -> HostStats {
        self.system.refresh_cpu();
        self.system.refresh_memory();

        let memory_total = self.system.total_memory();
        let memory_used = self.system.used_memory();
        let load = System::load_average();

        HostStats {
            cpu_percent: f64::from(self.system.global_cpu_info().cpu_usage()).min(100.0),
            memory_percent: percent(memory_used, memory_total),
            memory_used,
            memory_total,
            disk_percent: self.disk_percent(),
            network_percent: self.network_percent(),
            load_average: [load.one, load.five, load.fifteen],
        }
    }

    /// Drop previous samples so the next call starts a fresh delta
    pub fn reset(&mut self) {
        self.system = System::new();
        self.prev_net = None;
    }

    fn network_percent(&mut self) -> f64 {
        self.networks.refresh();
        let (sent, received) = self
            .networks
            .iter()
            .fold((0u64, 0u64), |(s, r), (_, data)| {
                (s + data.total_transmitted(), r + data.total_received())
            });
        let current = NetSample {
            sent,
            received,
            at: Instant::now(),
        };

        let pct = match self.prev_net {
            Some(prev) => network_usage_percent(&prev, &current, self.network_max_mbps),
            None => 0.0,
        };
        self.prev_net = Some(current);
        pct
    }

    fn disk_percent(&mut self) -> f64 {
        self.disks.refresh();
        self.disks
            .list()
            .iter()
            .filter(|d| d.mount_point() == Path::new(ROOT_MOUNT))
            .map(|d| {
                let total = d.total_space();
                percent(total.saturating_sub(d.available_space()), total)
            })
            .next()
            .unwrap_or(0.0)
    }
}

/// Throughput between two samples as a share of the expected link speed
pub fn network_usage_percent(prev: &NetSample, current: &NetSample, max_mbps: f64) -> f64 {
    let secs = current.at.saturating_duration_since(prev.at).as_secs_f64();
    if secs <= 0.0 || max_mbps <= 0.0 {
        return 0.0;
    }

    // Counters can go backwards when an interface disappears
    let bytes = current.sent.saturating_sub(prev.sent) + current.received.saturating_sub(prev.received);
    let mbps = (bytes as f64 / secs) * 8.0 / 1_000_000.0;
    (mbps / max_mbps * 100.0).min(100.0)
}

fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample(sent: u64, received: u64, at: Instant) -> NetSample {
        NetSample { sent, received, at }
    }

    #[test]
    fn test_network_percent_from_delta() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);
        // 6.25 MB/s = 50 Mbps, half of a 100 Mbps link
        let pct = network_usage_percent(&sample(0, 0, t0), &sample(3_125_000, 3_125_000, t1), 100.0);
        assert!((pct - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_network_percent_is_clamped() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(1);
        let pct = network_usage_percent(&sample(0, 0, t0), &sample(u32::MAX as u64, 0, t1), 10.0);
        assert_eq!(pct, 100.0);
    }

    #[test]
    fn test_network_counter_reset_is_not_negative() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_secs(2);
        let pct = network_usage_percent(&sample(5_000, 5_000, t0), &sample(10, 10, t1), 100.0);
        assert_eq!(pct, 0.0);
    }

    #[test]
    fn test_zero_interval() {
        let t0 = Instant::now();
        assert_eq!(network_usage_percent(&sample(0, 0, t0), &sample(100, 100, t0), 100.0), 0.0);
    }

    #[test]
    fn test_first_sample_and_reset_report_zero_network() {
        let mut sampler = HostSampler::new(100.0);
        let first = sampler.sample();
        assert_eq!(first.network_percent, 0.0);
        assert!(first.memory_total > 0);

        sampler.reset();
        assert_eq!(sampler.sample().network_percent, 0.0);
    }
}
