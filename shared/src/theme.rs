/// Persisted under this key as `"light"` / `"dark"`.
pub const THEME_STORAGE_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn from_stored(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn is_light(&self) -> bool {
        matches!(self, Theme::Light)
    }

    /// Class toggled on the document root.
    pub fn root_class(&self) -> Option<&'static str> {
        self.is_light().then_some("light-mode")
    }

    pub fn chart_colors(&self) -> ChartColors {
        match self {
            Theme::Light => ChartColors {
                text: "#333",
                grid: "rgba(0,0,0,0.1)",
            },
            Theme::Dark => ChartColors {
                text: "#fff",
                grid: "rgba(255,255,255,0.1)",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartColors {
    pub text: &'static str,
    pub grid: &'static str,
}

/// Series palette for the analytics chart.
pub fn series_color(i: usize) -> &'static str {
    match i % 8 {
        0 => "#00E396",
        1 => "#008FFB",
        2 => "#FEB019",
        3 => "#FF4560",
        4 => "#775DD0",
        5 => "#3F51B5",
        6 => "#26a69a",
        _ => "#D10CE8",
    }
}
