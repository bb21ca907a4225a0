use std::fmt;

pub const NEUTRAL_COLOR: &str = "#999";

/// Severity band for an AQI value. Upper bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AqiCategory {
    Good,
    Moderate,
    Unhealthy,
    Hazardous,
}

impl AqiCategory {
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi <= 50.0 {
            AqiCategory::Good
        } else if aqi <= 100.0 {
            AqiCategory::Moderate
        } else if aqi <= 150.0 {
            AqiCategory::Unhealthy
        } else {
            AqiCategory::Hazardous
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Good",
            AqiCategory::Moderate => "Moderate",
            AqiCategory::Unhealthy => "Unhealthy",
            AqiCategory::Hazardous => "Hazardous",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AqiCategory::Good => "#00E396",
            AqiCategory::Moderate => "#FEB019",
            AqiCategory::Unhealthy => "#f05233",
            AqiCategory::Hazardous => "#ce1c1c",
        }
    }
}

impl fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn aqi_color(aqi: f64) -> &'static str {
    AqiCategory::from_aqi(aqi).color()
}

/// Label for an optional value; `None` is the placeholder state.
pub fn category_label(aqi: Option<f64>) -> &'static str {
    aqi.map(|v| AqiCategory::from_aqi(v).as_str())
        .unwrap_or("Waiting for data")
}

pub fn category_color(aqi: Option<f64>) -> &'static str {
    aqi.map(aqi_color).unwrap_or(NEUTRAL_COLOR)
}

/// Formats a measured value the way the cards print it: `40`, `40.5`, `—` when absent.
pub fn format_measure(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v}"),
        None => "—".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive_upper_bounds() {
        assert_eq!(AqiCategory::from_aqi(0.0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50.0), AqiCategory::Good);
        assert_eq!(AqiCategory::from_aqi(50.5), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(100.0), AqiCategory::Moderate);
        assert_eq!(AqiCategory::from_aqi(100.1), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::from_aqi(150.0), AqiCategory::Unhealthy);
        assert_eq!(AqiCategory::from_aqi(151.0), AqiCategory::Hazardous);
        assert_eq!(AqiCategory::from_aqi(500.0), AqiCategory::Hazardous);
    }

    #[test]
    fn sweep_matches_band_definition() {
        for tenth in 0..=3000 {
            let v = tenth as f64 / 10.0;
            let expected = if v <= 50.0 {
                "Good"
            } else if v <= 100.0 {
                "Moderate"
            } else if v <= 150.0 {
                "Unhealthy"
            } else {
                "Hazardous"
            };
            assert_eq!(AqiCategory::from_aqi(v).as_str(), expected, "aqi {v}");
        }
    }

    #[test]
    fn placeholder_is_neutral() {
        assert_eq!(category_label(None), "Waiting for data");
        assert_eq!(category_color(None), NEUTRAL_COLOR);
        assert_eq!(category_color(Some(120.0)), "#f05233");
    }

    #[test]
    fn measures_print_without_trailing_zero() {
        assert_eq!(format_measure(Some(40.0)), "40");
        assert_eq!(format_measure(Some(12.5)), "12.5");
        assert_eq!(format_measure(None), "—");
    }
}
