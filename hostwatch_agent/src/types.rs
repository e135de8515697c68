//! Snapshot types sent to clients over `/metrics` and the WebSocket stream.
//! Keep this module minimal and stable: it defines the wire format.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuStats {
    pub usage_percent: f64,
    pub cores: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskStats {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

/// Host identity. Every field may be empty when the lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub os: String,
    pub platform: String,
    pub platform_version: String,
    pub hostname: String,
}

/// One immutable sample of the monitored host. Shared behind an `Arc`
/// between the dispatcher and every connected client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub disk: DiskStats,
    #[serde(rename = "system")]
    pub host: HostInfo,
    #[serde(rename = "uptime")]
    pub uptime_secs: u64,
    pub uptime_human: String,
}

/// Render an uptime with the coarsest unit that applies and at most two
/// finer units beneath it, e.g. `1d 1h 1m`, `1h 1m 5s`, `1m 5s`, `5s`.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Clamp a percentage into 0..=100; NaN and infinities read as 0.
pub fn clamp_percent(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

pub fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    clamp_percent(part as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_picks_coarsest_unit() {
        assert_eq!(format_uptime(0), "0s");
        assert_eq!(format_uptime(59), "59s");
        assert_eq!(format_uptime(65), "1m 5s");
        assert_eq!(format_uptime(3_665), "1h 1m 5s");
        assert_eq!(format_uptime(90_065), "1d 1h 1m");
    }

    #[test]
    fn uptime_drops_seconds_once_days_apply() {
        // 2 days, 0 hours, 0 minutes, 59 seconds
        assert_eq!(format_uptime(2 * 86_400 + 59), "2d 0h 0m");
        assert_eq!(format_uptime(3_600), "1h 0m 0s");
    }

    #[test]
    fn percentages_are_clamped() {
        assert_eq!(clamp_percent(-3.0), 0.0);
        assert_eq!(clamp_percent(140.0), 100.0);
        assert_eq!(clamp_percent(f64::NAN), 0.0);
        assert_eq!(percent_of(5, 0), 0.0);
        assert_eq!(percent_of(1, 4), 25.0);
    }

    #[test]
    fn snapshot_uses_dashboard_field_names() {
        let snap = Snapshot {
            timestamp: time::macros::datetime!(2024-05-01 12:00:00 UTC),
            cpu: CpuStats {
                usage_percent: 12.5,
                cores: 8,
            },
            memory: MemoryStats {
                total: 100,
                used: 40,
                available: 60,
                used_percent: 40.0,
            },
            disk: DiskStats {
                total: 10,
                used: 5,
                free: 5,
                used_percent: 50.0,
            },
            host: HostInfo {
                os: "linux".into(),
                platform: "debian".into(),
                platform_version: "12".into(),
                hostname: "box".into(),
            },
            uptime_secs: 65,
            uptime_human: format_uptime(65),
        };
        let v = serde_json::to_value(&snap).unwrap();
        assert_eq!(v["timestamp"], "2024-05-01T12:00:00Z");
        assert_eq!(v["cpu"]["usagePercent"], 12.5);
        assert_eq!(v["memory"]["usedPercent"], 40.0);
        assert_eq!(v["disk"]["free"], 5);
        assert_eq!(v["system"]["platformVersion"], "12");
        assert_eq!(v["uptime"], 65);
        assert_eq!(v["uptimeHuman"], "1m 5s");
    }
}
