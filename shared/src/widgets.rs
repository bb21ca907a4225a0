// Widgets derived from the live store. Everything here is recomputed after a
// successful readings poll; an empty store leaves the previous output in place.

use crate::aqi::aqi_color;
use crate::registry::SensorRegistry;
use crate::store::LiveStateStore;

const PEAK_HOURS: [(&str, f64); 5] = [
    ("06:00", 0.9),
    ("09:00", 1.3),
    ("12:00", 1.0),
    ("18:00", 1.5),
    ("22:00", 0.7),
];

const MONTHS: [&str; 5] = ["SEP", "OCT", "NOV", "DEC", "JAN"];

pub const HEATMAP_DAYS: u8 = 7;
pub const HEATMAP_HOURS: u8 = 24;

/// Stable pseudo-random value in `[0, 1)` for a given seed (splitmix64).
pub(crate) fn jitter(seed: u64) -> f64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarLevel {
    Success,
    Warning,
    Danger,
}

impl BarLevel {
    fn for_percent(percent: u32) -> Self {
        if percent > 85 {
            BarLevel::Danger
        } else if percent > 70 {
            BarLevel::Warning
        } else {
            BarLevel::Success
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            BarLevel::Success => "success",
            BarLevel::Warning => "warning",
            BarLevel::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeakBar {
    pub time: &'static str,
    pub percent: u32,
    pub level: BarLevel,
}

pub fn peak_pollution_hours(avg_aqi: f64) -> Vec<PeakBar> {
    PEAK_HOURS
        .iter()
        .map(|&(time, factor)| {
            let percent = (avg_aqi * factor).round().clamp(0.0, 100.0) as u32;
            PeakBar {
                time,
                percent,
                level: BarLevel::for_percent(percent),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthBar {
    pub label: &'static str,
    pub value: f64,
    pub height_px: f64,
    pub active: bool,
}

pub fn monthly_trend(avg_aqi: f64) -> Vec<MonthBar> {
    let last = MONTHS.len() - 1;
    MONTHS
        .iter()
        .enumerate()
        .map(|(i, &label)| {
            let value = if i == last {
                avg_aqi
            } else {
                avg_aqi * (0.7 + jitter(0x4D4F_4E54 + i as u64) * 0.3)
            };
            MonthBar {
                label,
                value,
                height_px: value.min(100.0),
                active: i == last,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatCell {
    pub day: u8,
    pub hour: u8,
    pub intensity: f64,
    pub color: String,
    pub title: String,
}

pub fn heatmap(avg_aqi: f64) -> Vec<HeatCell> {
    let mut cells = Vec::with_capacity(HEATMAP_DAYS as usize * HEATMAP_HOURS as usize);
    for day in 0..HEATMAP_DAYS {
        for hour in 0..HEATMAP_HOURS {
            let mut intensity = avg_aqi / 150.0;
            if (7..=9).contains(&hour) {
                intensity += 0.3;
            }
            if (17..=19).contains(&hour) {
                intensity += 0.4;
            }
            let seed = day as u64 * HEATMAP_HOURS as u64 + hour as u64;
            intensity = (intensity + (jitter(seed) - 0.5) * 0.2).clamp(0.2, 1.0);

            let color = if intensity < 0.4 {
                format!("rgba(0,227,150,{intensity:.2})")
            } else if intensity < 0.7 {
                format!("rgba(254,176,25,{intensity:.2})")
            } else {
                format!("rgba(206,28,28,{intensity:.2})")
            };
            let title = format!(
                "Day {}, {hour}:00 | AQI {}",
                day + 1,
                (intensity * 150.0).round()
            );

            cells.push(HeatCell {
                day,
                hour,
                intensity,
                color,
                title,
            });
        }
    }
    cells
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub index: u32,
    pub sensor_id: String,
    pub name: String,
    pub aqi: f64,
    pub live: bool,
    pub color: &'static str,
    pub position: Option<(f64, f64)>,
}

impl MarkerStyle {
    pub fn popup_html(&self) -> String {
        format!(
            "<b>{}</b><br>{}<br>AQI: {}",
            escape_html(&self.sensor_id),
            escape_html(&self.name),
            self.aqi
        )
    }
}

/// One marker per active index with a registry entry. Sensors without a live
/// reading get a placeholder AQI of `25 + index * 15`.
pub fn marker_styles(registry: &SensorRegistry, store: &LiveStateStore, count: u32) -> Vec<MarkerStyle> {
    registry
        .active(count)
        .map(|def| {
            let reading = store.for_sensor(def);
            let aqi = reading
                .map(|r| r.aqi)
                .unwrap_or(25.0 + def.index as f64 * 15.0);
            let live_pos = reading.and_then(|r| r.lat.zip(r.lng));
            MarkerStyle {
                index: def.index,
                sensor_id: def.id.clone(),
                name: def.name.clone(),
                aqi,
                live: reading.is_some(),
                color: aqi_color(aqi),
                position: live_pos.or(def.lat.zip(def.lng)),
            }
        })
        .collect()
}

/// Output of the store-derived panels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedWidgets {
    pub peak_hours: Vec<PeakBar>,
    pub monthly: Vec<MonthBar>,
    pub heatmap: Vec<HeatCell>,
}

impl DerivedWidgets {
    /// Recomputes every panel from `store`. Returns `false` (keeping the
    /// previous output) when the store is empty.
    pub fn recompute(&mut self, store: &LiveStateStore) -> bool {
        let Some(avg) = store.average_aqi() else {
            return false;
        };
        self.peak_hours = peak_pollution_hours(avg);
        self.monthly = monthly_trend(avg);
        self.heatmap = heatmap(avg);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.peak_hours.is_empty()
    }
}
