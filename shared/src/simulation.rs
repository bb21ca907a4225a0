// Terminal side panel: button enablement, terminal contents and the log-tail
// handle. Network calls live in `Dashboard`; this type only folds results in.

use crate::{CommandResponse, LogEntry};
use crate::api::ApiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLine {
    pub level: String,
    pub message: String,
    pub timestamp: Option<String>,
}

impl TerminalLine {
    pub fn new(level: &str, message: impl Into<String>, timestamp: Option<String>) -> Self {
        Self {
            level: level.to_string(),
            message: message.into(),
            timestamp,
        }
    }

    pub fn css_class(&self) -> String {
        format!("terminal-line log-{}", self.level.to_lowercase())
    }
}

pub fn ready_banner() -> Vec<TerminalLine> {
    vec![
        TerminalLine::new("SYSTEM", "Environment Simulator Ready", None),
        TerminalLine::new("INFO", "Awaiting command...", None),
    ]
}

/// Handle of the log-tail timer. Each start hands out a new generation; a
/// loop keeps running only while its generation is current.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogTail {
    polling: bool,
    generation: u64,
}

impl LogTail {
    /// Arms the tail. Returns `None` when it is already running.
    pub fn start(&mut self) -> Option<u64> {
        if self.polling {
            return None;
        }
        self.polling = true;
        self.generation += 1;
        Some(self.generation)
    }

    pub fn stop(&mut self) {
        self.polling = false;
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.polling && self.generation == generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationPanel {
    pub open: bool,
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub lines: Vec<TerminalLine>,
    pub tail: LogTail,
}

impl Default for SimulationPanel {
    fn default() -> Self {
        Self {
            open: false,
            start_enabled: true,
            stop_enabled: false,
            lines: ready_banner(),
            tail: LogTail::default(),
        }
    }
}

impl SimulationPanel {
    fn log(&mut self, level: &str, message: impl Into<String>, now: &str) {
        self.lines
            .push(TerminalLine::new(level, message, Some(now.to_string())));
    }

    /// Returns whether the panel is now open.
    pub fn toggle_open(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Closing does not touch the log tail.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Folds a status check in. Returns a fresh tail generation when the
    /// tail was (re)armed.
    pub fn apply_status(&mut self, running: bool) -> Option<u64> {
        self.start_enabled = !running;
        self.stop_enabled = running;
        if running {
            self.tail.start()
        } else {
            self.tail.stop();
            None
        }
    }

    pub fn begin_start(&mut self, now: &str) {
        self.start_enabled = false;
        self.log("SYSTEM", "Initializing simulation...", now);
    }

    pub fn finish_start(&mut self, result: Result<CommandResponse, ApiError>, now: &str) -> Option<u64> {
        match result {
            Ok(resp) if resp.success => {
                self.log("SUCCESS", resp.message, now);
                self.stop_enabled = true;
                self.tail.start()
            }
            Ok(resp) => {
                self.log("ERROR", resp.message, now);
                self.start_enabled = true;
                None
            }
            Err(_) => {
                self.log("ERROR", "Failed to start simulation", now);
                self.start_enabled = true;
                None
            }
        }
    }

    pub fn begin_stop(&mut self, now: &str) {
        self.stop_enabled = false;
        self.log("SYSTEM", "Stopping simulation...", now);
    }

    pub fn finish_stop(&mut self, result: Result<CommandResponse, ApiError>, now: &str) {
        match result {
            Ok(resp) if resp.success => {
                self.log("SUCCESS", resp.message, now);
                self.start_enabled = true;
                self.tail.stop();
            }
            Ok(resp) => {
                self.log("ERROR", resp.message, now);
                self.stop_enabled = true;
            }
            Err(_) => {
                self.log("ERROR", "Failed to stop simulation", now);
                self.stop_enabled = true;
            }
        }
    }

    pub fn begin_reset(&mut self, now: &str) {
        self.tail.stop();
        self.log("SYSTEM", "Resetting simulation...", now);
    }

    pub fn finish_reset(&mut self, result: Result<CommandResponse, ApiError>, now: &str) {
        match result {
            Ok(resp) if resp.success => {
                self.lines = ready_banner();
                self.log("SUCCESS", "Simulation reset complete", now);
                self.start_enabled = true;
                self.stop_enabled = false;
            }
            Ok(resp) => self.log("ERROR", resp.message, now),
            Err(_) => self.log("ERROR", "Failed to reset simulation", now),
        }
    }

    /// Replaces the terminal with the backend's log, or the ready banner when
    /// the log is empty. A failed fetch appends an error line instead.
    pub fn apply_logs(&mut self, result: Result<Vec<LogEntry>, ApiError>, now: &str) {
        match result {
            Ok(logs) if logs.is_empty() => self.lines = ready_banner(),
            Ok(logs) => {
                self.lines = logs
                    .into_iter()
                    .map(|l| {
                        let ts = l.timestamp.unwrap_or_else(|| now.to_string());
                        TerminalLine::new(&l.level, l.message, Some(ts))
                    })
                    .collect();
            }
            Err(_) => self.log("ERROR", "Failed to fetch logs from server", now),
        }
    }
}

/// `HH:MM:SS` of a wall-clock millisecond timestamp.
pub fn clock_label(now_ms: i64) -> String {
    let secs = now_ms.div_euclid(1000).rem_euclid(86_400);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(success: bool, message: &str) -> Result<CommandResponse, ApiError> {
        Ok(CommandResponse {
            success,
            message: message.to_string(),
        })
    }

    fn last(panel: &SimulationPanel) -> (&str, &str) {
        let l = panel.lines.last().expect("a line");
        (l.level.as_str(), l.message.as_str())
    }

    #[test]
    fn tail_start_is_idempotent_and_restartable() {
        let mut tail = LogTail::default();
        let g1 = tail.start().expect("first start");
        assert_eq!(tail.start(), None);
        assert!(tail.is_current(g1));
        tail.stop();
        assert!(!tail.is_current(g1));
        let g2 = tail.start().expect("re-armed");
        assert_ne!(g1, g2);
        assert!(!tail.is_current(g1));
        assert!(tail.is_current(g2));
    }

    #[test]
    fn status_drives_buttons_and_tail() {
        let mut p = SimulationPanel::default();
        assert!(p.apply_status(true).is_some());
        assert!(!p.start_enabled && p.stop_enabled);
        assert!(p.apply_status(true).is_none());
        assert!(p.apply_status(false).is_none());
        assert!(p.start_enabled && !p.stop_enabled);
        assert!(!p.tail.is_polling());
    }

    #[test]
    fn successful_start_arms_tail() {
        let mut p = SimulationPanel::default();
        p.begin_start("10:00:00");
        assert!(!p.start_enabled);
        assert_eq!(last(&p), ("SYSTEM", "Initializing simulation..."));

        let g = p.finish_start(ok(true, "Simulation started with 3 sensors"), "10:00:01");
        assert!(g.is_some());
        assert!(p.stop_enabled);
        assert_eq!(last(&p), ("SUCCESS", "Simulation started with 3 sensors"));
    }

    #[test]
    fn failed_start_reenables_button() {
        let mut p = SimulationPanel::default();
        p.begin_start("t");
        assert_eq!(p.finish_start(ok(false, "Already running"), "t"), None);
        assert!(p.start_enabled);
        assert_eq!(last(&p), ("ERROR", "Already running"));

        p.begin_start("t");
        p.finish_start(Err(ApiError::Transport("offline".into())), "t");
        assert_eq!(last(&p), ("ERROR", "Failed to start simulation"));
        assert!(!p.tail.is_polling());
    }

    #[test]
    fn stop_mirrors_start() {
        let mut p = SimulationPanel::default();
        p.apply_status(true);
        p.begin_stop("t");
        assert!(!p.stop_enabled);
        p.finish_stop(Err(ApiError::Status(500)), "t");
        assert_eq!(last(&p), ("ERROR", "Failed to stop simulation"));
        assert!(p.stop_enabled);
        assert!(p.tail.is_polling());

        p.finish_stop(ok(true, "Simulation stopped"), "t");
        assert!(p.start_enabled);
        assert!(!p.tail.is_polling());
    }

    #[test]
    fn reset_stops_tail_and_restores_banner() {
        let mut p = SimulationPanel::default();
        p.apply_status(true);
        p.begin_reset("t");
        assert!(!p.tail.is_polling());
        assert_eq!(last(&p), ("SYSTEM", "Resetting simulation..."));

        p.finish_reset(ok(true, "ignored"), "t");
        assert_eq!(p.lines.len(), 3);
        assert_eq!(p.lines[0].message, "Environment Simulator Ready");
        assert_eq!(last(&p), ("SUCCESS", "Simulation reset complete"));
        assert!(p.start_enabled && !p.stop_enabled);

        p.finish_reset(Err(ApiError::Malformed("eof".into())), "t");
        assert_eq!(last(&p), ("ERROR", "Failed to reset simulation"));
    }

    #[test]
    fn logs_replace_terminal_or_show_banner() {
        let mut p = SimulationPanel::default();
        p.apply_logs(
            Ok(vec![LogEntry {
                level: "WARNING".into(),
                message: "Sensor 2 spiking".into(),
                timestamp: Some("12:00:00".into()),
            }]),
            "t",
        );
        assert_eq!(p.lines.len(), 1);
        assert_eq!(p.lines[0].css_class(), "terminal-line log-warning");

        p.apply_logs(Ok(Vec::new()), "t");
        assert_eq!(p.lines, ready_banner());

        p.apply_logs(Err(ApiError::Status(502)), "t");
        assert_eq!(last(&p), ("ERROR", "Failed to fetch logs from server"));
        assert_eq!(p.lines.len(), 3);
    }

    #[test]
    fn close_keeps_tail_running() {
        let mut p = SimulationPanel::default();
        assert!(p.toggle_open());
        p.apply_status(true);
        p.close();
        assert!(!p.open);
        assert!(p.tail.is_polling());
    }

    #[test]
    fn clock_label_formats_time_of_day() {
        assert_eq!(clock_label(0), "00:00:00");
        assert_eq!(clock_label((13 * 3600 + 5 * 60 + 9) * 1000 + 999), "13:05:09");
    }
}
