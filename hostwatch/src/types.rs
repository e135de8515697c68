//! Types that mirror the agent's JSON schema.

use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cpu {
    pub usage_percent: f64,
    pub cores: u32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub used_percent: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Disk {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemInfo {
    pub os: String,
    pub platform: String,
    pub platform_version: String,
    pub hostname: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub cpu: Cpu,
    pub memory: Memory,
    pub disk: Disk,
    #[serde(default)]
    pub system: SystemInfo,
    #[serde(default)]
    pub uptime: u64,
    #[serde(default)]
    pub uptime_human: String,
}
