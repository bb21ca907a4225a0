pub const MIN_SENSORS: u8 = 1;
pub const MAX_SENSORS: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountChange {
    pub previous: u8,
    pub current: u8,
}

/// Bounded active-sensor counter over `[MIN_SENSORS, MAX_SENSORS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorCounter {
    count: u8,
}

impl Default for SensorCounter {
    fn default() -> Self {
        Self { count: MIN_SENSORS }
    }
}

impl SensorCounter {
    pub fn new(initial: u8) -> Self {
        Self {
            count: initial.clamp(MIN_SENSORS, MAX_SENSORS),
        }
    }

    /// Parses a page/storage supplied value, falling back to the minimum.
    pub fn from_stored(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<i64>().ok())
            .map(|n| Self::new(n.clamp(MIN_SENSORS as i64, MAX_SENSORS as i64) as u8))
            .unwrap_or_default()
    }

    pub fn get(&self) -> u8 {
        self.count
    }

    pub fn at_max(&self) -> bool {
        self.count >= MAX_SENSORS
    }

    pub fn at_min(&self) -> bool {
        self.count <= MIN_SENSORS
    }

    pub fn increment(&mut self) -> Option<CountChange> {
        if self.at_max() {
            return None;
        }
        let previous = self.count;
        self.count += 1;
        Some(CountChange {
            previous,
            current: self.count,
        })
    }

    pub fn decrement(&mut self) -> Option<CountChange> {
        if self.at_min() {
            return None;
        }
        let previous = self.count;
        self.count -= 1;
        Some(CountChange {
            previous,
            current: self.count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_stops_at_max() {
        let mut c = SensorCounter::new(MAX_SENSORS);
        assert_eq!(c.increment(), None);
        assert_eq!(c.get(), MAX_SENSORS);
    }

    #[test]
    fn decrement_stops_at_min() {
        let mut c = SensorCounter::default();
        assert_eq!(c.decrement(), None);
        assert_eq!(c.get(), MIN_SENSORS);
    }

    #[test]
    fn walk_up_and_down_stays_in_bounds() {
        let mut c = SensorCounter::default();
        let ups = (0..20).filter_map(|_| c.increment()).count();
        assert_eq!(ups, (MAX_SENSORS - MIN_SENSORS) as usize);
        let downs = (0..20).filter_map(|_| c.decrement()).count();
        assert_eq!(downs, ups);
        assert_eq!(c.get(), MIN_SENSORS);
    }

    #[test]
    fn transitions_report_previous_and_current() {
        let mut c = SensorCounter::new(3);
        assert_eq!(c.increment(), Some(CountChange { previous: 3, current: 4 }));
        assert_eq!(c.decrement(), Some(CountChange { previous: 4, current: 3 }));
    }

    #[test]
    fn stored_values_are_clamped() {
        assert_eq!(SensorCounter::from_stored(Some("7")).get(), 7);
        assert_eq!(SensorCounter::from_stored(Some("99")).get(), MAX_SENSORS);
        assert_eq!(SensorCounter::from_stored(Some("-3")).get(), MIN_SENSORS);
        assert_eq!(SensorCounter::from_stored(Some("abc")).get(), MIN_SENSORS);
        assert_eq!(SensorCounter::from_stored(None).get(), MIN_SENSORS);
    }
}
