use serde::{Deserialize, Serialize};

pub mod analytics;
pub mod api;
pub mod aqi;
pub mod blog;
pub mod cards;
pub mod config;
pub mod counter;
pub mod dashboard;
pub mod notifications;
pub mod registry;
pub mod simulation;
pub mod store;
pub mod theme;
pub mod widgets;

pub use api::{ApiClient, ApiError, ApiRequest, HttpResponse, Method, RequestBody, Transport};
pub use aqi::AqiCategory;
pub use dashboard::{Dashboard, DashboardEvent, DashboardState};
pub use registry::{SensorDefinition, SensorRegistry};
pub use store::{LiveStateStore, Reading};

// ---------------------------------------------------------------------------
// Wire types. Field names follow the backend's JSON exactly.
// ---------------------------------------------------------------------------

/// One element of `/api/sensor-data/`, index-aligned with the sensor registry.
/// Measurements may be null for a sensor that has not reported yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDatum {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub aqi: Option<f64>,
    #[serde(default)]
    pub no2: Option<f64>,
    #[serde(default)]
    pub co: Option<f64>,
    #[serde(default)]
    pub smoke: Option<f64>,
}

impl SensorDatum {
    /// `(aqi, no2, co, smoke)` when every measurement is present.
    pub fn measures(&self) -> Option<(f64, f64, f64, f64)> {
        Some((self.aqi?, self.no2?, self.co?, self.smoke?))
    }
}

/// `/api/sensor-data/`. A body without `data` is treated as malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorDataResponse {
    #[serde(default)]
    pub data: Option<Vec<SensorDatum>>,
}

/// Site-wide summary row from `/api/readings/?limit=1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReading {
    pub aqi: f64,
    #[serde(default)]
    pub aqi_category: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

/// The readings endpoint answers either with a bare array or a paginated envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingsPage {
    List(Vec<SummaryReading>),
    Paged {
        #[serde(default)]
        results: Vec<SummaryReading>,
    },
}

impl ReadingsPage {
    pub fn into_rows(self) -> Vec<SummaryReading> {
        match self {
            ReadingsPage::List(rows) => rows,
            ReadingsPage::Paged { results } => results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetSensorCountRequest {
    pub count: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetSensorCountResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub sensor_count: Option<u8>,
}

/// Simulation log line as stored by the backend ("INFO", "WARNING", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: String,
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationStatus {
    #[serde(default)]
    pub running: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartSimulationRequest {
    pub sensor_count: u8,
}

/// Reply shape shared by the simulation start/stop/reset commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
}
