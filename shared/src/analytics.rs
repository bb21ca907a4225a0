use std::collections::{BTreeMap, VecDeque};

use crate::aqi::aqi_color;
use crate::notifications::DANGER_AQI;
use crate::registry::{SensorDefinition, SensorRegistry};
use crate::store::LiveStateStore;
use crate::widgets::jitter;

/// Applied polls kept per sensor.
pub const HISTORY_LEN: usize = 24;

const FIVE_MINUTES_MS: i64 = 5 * 60 * 1000;

pub struct RingBuffer<T> {
    max: usize,
    buf: VecDeque<T>,
}

impl<T> RingBuffer<T> {
    pub fn new(max: usize) -> Self {
        Self {
            max,
            buf: VecDeque::with_capacity(max),
        }
    }

    pub fn push(&mut self, item: T) {
        if self.buf.len() == self.max {
            self.buf.pop_front();
        }
        self.buf.push_back(item);
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buf.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.buf.back()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl<T: Clone> Clone for RingBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            max: self.max,
            buf: self.buf.clone(),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.buf.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for RingBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.max == other.max && self.buf == other.buf
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPoint {
    pub timestamp_ms: i64,
    pub aqi: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorSeries {
    pub index: u32,
    pub sensor_id: String,
    pub name: String,
    pub points: RingBuffer<HistoryPoint>,
}

/// Rolling AQI history for every sensor that has produced a reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyticsHistory {
    series: BTreeMap<u32, SensorSeries>,
}

impl AnalyticsHistory {
    /// Appends one point per active sensor present in `store`.
    pub fn record(
        &mut self,
        registry: &SensorRegistry,
        store: &LiveStateStore,
        count: u32,
        now_ms: i64,
    ) {
        for def in registry.active(count) {
            let Some(reading) = store.for_sensor(def) else {
                continue;
            };
            let series = self.series.entry(def.index).or_insert_with(|| SensorSeries {
                index: def.index,
                sensor_id: def.id.clone(),
                name: def.name.clone(),
                points: RingBuffer::new(HISTORY_LEN),
            });
            series.points.push(HistoryPoint {
                timestamp_ms: now_ms,
                aqi: reading.aqi,
            });
        }
    }

    pub fn series(&self) -> impl Iterator<Item = &SensorSeries> {
        self.series.values()
    }

    pub fn get(&self, index: u32) -> Option<&SensorSeries> {
        self.series.get(&index)
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
}

impl ChartKind {
    pub fn toggle(self) -> Self {
        match self {
            ChartKind::Line => ChartKind::Bar,
            ChartKind::Bar => ChartKind::Line,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SensorFilter {
    #[default]
    All,
    Index(u32),
}

impl SensorFilter {
    /// Parses a `<select>` value: `"all"` or a sensor index.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<u32>() {
            Ok(i) if i > 0 => SensorFilter::Index(i),
            _ => SensorFilter::All,
        }
    }

    pub fn value(&self) -> String {
        match self {
            SensorFilter::All => "all".to_string(),
            SensorFilter::Index(i) => i.to_string(),
        }
    }

    pub fn matches(&self, index: u32) -> bool {
        match self {
            SensorFilter::All => true,
            SensorFilter::Index(i) => *i == index,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartView {
    pub kind: ChartKind,
    pub filter: SensorFilter,
}

impl ChartView {
    /// Series for active sensors only, narrowed by the filter.
    pub fn visible<'a>(
        &self,
        history: &'a AnalyticsHistory,
        count: u32,
    ) -> Vec<&'a SensorSeries> {
        history
            .series()
            .filter(|s| s.index <= count && self.filter.matches(s.index))
            .collect()
    }

    /// Drops a single-sensor filter that points past the active count.
    pub fn clamp_to(&mut self, count: u32) {
        if let SensorFilter::Index(i) = self.filter {
            if i > count {
                self.filter = SensorFilter::All;
            }
        }
    }
}

/// SVG geometry for one plotted series.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesShape {
    /// `"x,y x,y ..."` for a `<polyline>`.
    Polyline(String),
    /// `(x, y, width, height)` per bar.
    Bars(Vec<(f64, f64, f64, f64)>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Upper bound of the y axis: the largest visible value rounded up to 50,
/// never below 50.
pub fn y_axis_max(series: &[&SensorSeries]) -> f64 {
    let max = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.aqi))
        .fold(0.0_f64, f64::max);
    ((max / 50.0).ceil() * 50.0).max(50.0)
}

/// Lays `series` out over `HISTORY_LEN` slots, newest at the right edge.
/// Bars of the `slot`-th visible series are offset so groups sit side by side.
pub fn series_shape(
    series: &SensorSeries,
    kind: ChartKind,
    area: PlotArea,
    y_max: f64,
    slot: usize,
    slots: usize,
) -> SeriesShape {
    let step = area.width / HISTORY_LEN as f64;
    let offset = HISTORY_LEN - series.points.len();
    let map_y = |v: f64| area.top + area.height - (v.clamp(0.0, y_max) / y_max) * area.height;

    match kind {
        ChartKind::Line => {
            let mut out = String::new();
            for (i, p) in series.points.iter().enumerate() {
                if !out.is_empty() {
                    out.push(' ');
                }
                let x = area.left + step * ((offset + i) as f64 + 0.5);
                out.push_str(&format!("{x:.2},{:.2}", map_y(p.aqi)));
            }
            SeriesShape::Polyline(out)
        }
        ChartKind::Bar => {
            let slots = slots.max(1);
            let bar_w = step * 0.8 / slots as f64;
            let bars = series
                .points
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let x = area.left + step * (offset + i) as f64 + step * 0.1 + bar_w * slot as f64;
                    let y = map_y(p.aqi);
                    (x, y, bar_w, area.top + area.height - y)
                })
                .collect();
            SeriesShape::Bars(bars)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEntry {
    pub message: String,
    pub timestamp_ms: i64,
}

/// Contents of the per-sensor analytics modal.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorInsight {
    pub index: u32,
    pub sensor_id: String,
    pub name: String,
    /// AQI, NO2, CO, smoke; `--` when the store has no reading.
    pub current: [String; 4],
    /// Badge color; a missing reading is colored as AQI 50.
    pub aqi_color: &'static str,
    /// `(label, aqi)` per hour, ending at the current hour.
    pub trend: Vec<(String, f64)>,
    pub activity: Vec<ActivityEntry>,
}

fn modal_value(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "--".to_string())
}

impl SensorInsight {
    /// `now_ms` is local wall-clock time; the trend ends at its hour.
    pub fn build(def: &SensorDefinition, store: &LiveStateStore, now_ms: i64) -> Self {
        let reading = store.for_sensor(def);
        let current = [
            modal_value(reading.map(|r| r.aqi)),
            modal_value(reading.map(|r| r.no2)),
            modal_value(reading.map(|r| r.co)),
            modal_value(reading.map(|r| r.smoke)),
        ];

        let base = reading.map(|r| r.aqi).unwrap_or(50.0);
        let now_hour = now_ms.div_euclid(3_600_000).rem_euclid(24);
        let trend = (0..24i64)
            .map(|i| {
                let hour = (now_hour - 23 + i).rem_euclid(24);
                let seed = u64::from(def.index) * 1_000 + i as u64;
                let value = (base + (jitter(seed) - 0.5) * 20.0).max(10.0);
                (format!("{hour}:00"), value.round())
            })
            .collect();

        let status = if base > DANGER_AQI {
            "Moderate"
        } else {
            "Good"
        };
        let activity = vec![
            ActivityEntry {
                message: "Sensor reading updated".to_string(),
                timestamp_ms: now_ms,
            },
            ActivityEntry {
                message: format!("AQI status: {status}"),
                timestamp_ms: now_ms - FIVE_MINUTES_MS,
            },
        ];

        Self {
            index: def.index,
            sensor_id: def.id.clone(),
            name: def.name.clone(),
            current,
            aqi_color: aqi_color(base),
            trend,
            activity,
        }
    }
}
