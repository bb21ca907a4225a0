/// AQI above which a reading raises a danger alert.
pub const DANGER_AQI: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEntry {
    pub message: String,
    pub severity: Severity,
    pub timestamp_ms: i64,
}

/// Danger alerts, newest first, de-duplicated by exact message text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationLog {
    entries: Vec<NotificationEntry>,
    unread: bool,
}

pub fn site_danger_message(aqi: f64) -> String {
    format!("Critical Warning: High AQI ({aqi}) detected!")
}

pub fn sensor_danger_message(aqi: f64, sensor_id: &str) -> String {
    format!("Critical Warning: High AQI ({aqi}) detected at {sensor_id}!")
}

impl NotificationLog {
    /// Appends a danger alert for `aqi` when it exceeds the threshold and no
    /// entry with the same message exists. Returns whether an entry was added.
    pub fn check_danger_level(&mut self, aqi: f64, message: String, now_ms: i64) -> bool {
        if aqi <= DANGER_AQI || aqi.is_nan() {
            return false;
        }
        if self.entries.iter().any(|n| n.message == message) {
            return false;
        }
        self.push(message, Severity::Danger, now_ms);
        true
    }

    fn push(&mut self, message: String, severity: Severity, timestamp_ms: i64) {
        self.entries.insert(
            0,
            NotificationEntry {
                message,
                severity,
                timestamp_ms,
            },
        );
        self.unread = true;
    }

    /// User-initiated reset of the whole list.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.unread = false;
    }

    pub fn entries(&self) -> &[NotificationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the tray badge should be shown.
    pub fn has_unread(&self) -> bool {
        self.unread
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_is_ignored() {
        let mut log = NotificationLog::default();
        assert!(!log.check_danger_level(100.0, site_danger_message(100.0), 0));
        assert!(!log.check_danger_level(42.0, site_danger_message(42.0), 0));
        assert!(log.is_empty());
        assert!(!log.has_unread());
    }

    #[test]
    fn repeated_identical_alert_is_kept_once() {
        let mut log = NotificationLog::default();
        for t in 0..5 {
            log.check_danger_level(130.0, site_danger_message(130.0), t);
        }
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].message, "Critical Warning: High AQI (130) detected!");
        assert_eq!(log.entries()[0].timestamp_ms, 0);
        assert_eq!(log.entries()[0].severity.as_str(), "danger");
    }

    #[test]
    fn newest_first() {
        let mut log = NotificationLog::default();
        log.check_danger_level(101.0, site_danger_message(101.0), 1);
        log.check_danger_level(202.0, site_danger_message(202.0), 2);
        let stamps: Vec<_> = log.entries().iter().map(|n| n.timestamp_ms).collect();
        assert_eq!(stamps, vec![2, 1]);
    }

    #[test]
    fn returning_to_same_value_is_not_raised_again() {
        let mut log = NotificationLog::default();
        assert!(log.check_danger_level(120.0, sensor_danger_message(120.0, "S2"), 1));
        assert!(!log.check_danger_level(40.0, sensor_danger_message(40.0, "S2"), 2));
        assert!(!log.check_danger_level(120.0, sensor_danger_message(120.0, "S2"), 3));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn clear_resets_list_and_badge() {
        let mut log = NotificationLog::default();
        log.check_danger_level(180.0, site_danger_message(180.0), 0);
        assert!(log.has_unread());
        log.clear();
        assert!(log.is_empty());
        assert!(!log.has_unread());
        assert!(log.check_danger_level(180.0, site_danger_message(180.0), 1));
    }
}
