use std::time::Duration;

pub const SUMMARY_POLL_KEY: &str = "aw_summary_poll_ms";
pub const READINGS_POLL_KEY: &str = "aw_readings_poll_ms";
pub const LOG_TAIL_KEY: &str = "aw_log_tail_ms";

pub const SUMMARY_POLL_ENV: &str = "AW_SUMMARY_POLL_MS";
pub const READINGS_POLL_ENV: &str = "AW_READINGS_POLL_MS";
pub const LOG_TAIL_ENV: &str = "AW_LOG_TAIL_MS";

pub const SENSOR_REGISTRY_KEY: &str = "aw_sensor_registry";
pub const ACTIVE_SENSOR_COUNT_KEY: &str = "aw_active_sensor_count";

const MIN_INTERVAL_MS: u64 = 500;
const MAX_INTERVAL_MS: u64 = 600_000;

/// Timer cadences for the three polling loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub summary: Duration,
    pub readings: Duration,
    pub log_tail: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            summary: Duration::from_millis(10_000),
            readings: Duration::from_millis(3_000),
            log_tail: Duration::from_millis(2_000),
        }
    }
}

fn parse_interval(raw: Option<String>) -> Option<Duration> {
    let ms = raw?.trim().parse::<u64>().ok()?;
    Some(Duration::from_millis(ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS)))
}

impl PollSchedule {
    /// Builds a schedule from persisted keys (`aw_*_poll_ms`). Unset or
    /// unparsable values keep the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            summary: parse_interval(lookup(SUMMARY_POLL_KEY)).unwrap_or(d.summary),
            readings: parse_interval(lookup(READINGS_POLL_KEY)).unwrap_or(d.readings),
            log_tail: parse_interval(lookup(LOG_TAIL_KEY)).unwrap_or(d.log_tail),
        }
    }

    /// Environment overrides (desktop), applied on top of `self`.
    pub fn with_env(self, env: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            summary: parse_interval(env(SUMMARY_POLL_ENV)).unwrap_or(self.summary),
            readings: parse_interval(env(READINGS_POLL_ENV)).unwrap_or(self.readings),
            log_tail: parse_interval(env(LOG_TAIL_ENV)).unwrap_or(self.log_tail),
        }
    }

    pub fn summary_ms(&self) -> u32 {
        self.summary.as_millis() as u32
    }

    pub fn readings_ms(&self) -> u32 {
        self.readings.as_millis() as u32
    }

    pub fn log_tail_ms(&self) -> u32 {
        self.log_tail.as_millis() as u32
    }
}
