use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const KIB: f64 = 1024.0;

/// Human-readable byte count: `512B`, `1.5K`, `20.0M`, `3.2G`, `1.0T`
pub fn format_memory(bytes: u64) -> String {
    let value = bytes as f64;
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if value < KIB * KIB {
        format!("{:.1}K", value / KIB)
    } else if value < KIB * KIB * KIB {
        format!("{:.1}M", value / (KIB * KIB))
    } else if value < KIB * KIB * KIB * KIB {
        format!("{:.1}G", value / (KIB * KIB * KIB))
    } else {
        format!("{:.1}T", value / (KIB * KIB * KIB * KIB))
    }
}

/// Compact duration: `1d 2h`, `3h 4m`, `5m 6s`, `7s`
pub fn format_duration(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;

    if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Time a process has been running, given its start and the current epoch seconds
pub fn format_runtime(start_time: u64, now: u64) -> String {
    if start_time == 0 {
        return "???".to_string();
    }
    format_duration(now.saturating_sub(start_time))
}

/// Cut `s` to at most `max_width` terminal columns, marking the cut with `…`
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_memory_units() {
        assert_eq!(format_memory(512), "512B");
        assert_eq!(format_memory(1536), "1.5K");
        assert_eq!(format_memory(20 * 1024 * 1024), "20.0M");
        assert_eq!(format_memory(3 * 1024 * 1024 * 1024), "3.0G");
        assert_eq!(format_memory(1024u64.pow(4)), "1.0T");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(7), "7s");
        assert_eq!(format_duration(5 * 60 + 6), "5m 6s");
        assert_eq!(format_duration(3 * 3600 + 4 * 60 + 9), "3h 4m");
        assert_eq!(format_duration(86_400 + 2 * 3600 + 59), "1d 2h");
    }

    #[test]
    fn test_format_runtime() {
        assert_eq!(format_runtime(0, 100), "???");
        assert_eq!(format_runtime(100, 160), "1m 0s");
        // Clock skew should not underflow
        assert_eq!(format_runtime(200, 100), "0s");
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_to_width("abc", 0), "");
        // Wide characters count as two columns
        assert_eq!(truncate_to_width("日本語テキスト", 5), "日本…");
    }
}
