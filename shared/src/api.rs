use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{
    CommandResponse, LogEntry, LogsResponse, PostSummary, ReadingsPage, SensorDataResponse,
    SensorDatum, SetSensorCountRequest, SetSensorCountResponse, SimulationStatus,
    StartSimulationRequest, SummaryReading,
};

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";

pub const SENSOR_DATA_PATH: &str = "/api/sensor-data/";
pub const SUMMARY_PATH: &str = "/api/readings/?limit=1";
pub const SET_SENSOR_COUNT_PATH: &str = "/api/set_sensor_count/";
pub const LOGS_PATH: &str = "/api/logs/";
pub const SIMULATION_STATUS_PATH: &str = "/api/simulation_status/";
pub const SIMULATION_START_PATH: &str = "/api/simulation/start/";
pub const SIMULATION_STOP_PATH: &str = "/api/simulation/stop/";
pub const SIMULATION_RESET_PATH: &str = "/api/simulation/reset/";
pub const POSTS_PATH: &str = "/api/posts/";

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("rejected by backend: {0}")]
    Rejected(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Malformed(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: String,
        bytes: Vec<u8>,
    },
}

impl FormField {
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        FormField::Text {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(String),
    Multipart(Vec<FormField>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the backend base URL, including any query string.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::Get,
            path: path.to_string(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP seam. The browser build uses `gloo-net`, desktop uses `reqwest`,
/// tests use a scripted in-memory double.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<HttpResponse, ApiError>;

    /// Anti-forgery token, when one is available.
    fn csrf_token(&self) -> Option<String>;
}

/// Extracts `csrftoken` from a `document.cookie` style string.
pub fn csrf_token_from_cookie(cookies: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CSRF_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Typed access to every backend endpoint the dashboard uses.
pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn post(&self, path: &str, body: RequestBody) -> ApiRequest {
        let mut headers = Vec::new();
        if matches!(body, RequestBody::Json(_)) {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = self.transport.csrf_token() {
            headers.push((CSRF_HEADER.to_string(), token));
        }
        ApiRequest {
            method: Method::Post,
            path: path.to_string(),
            headers,
            body,
        }
    }

    fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<ApiRequest, ApiError> {
        let json = serde_json::to_string(body).map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(self.post(path, RequestBody::Json(json)))
    }

    async fn fetch_json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        let resp = self.transport.send(request).await?;
        if !resp.is_success() {
            return Err(ApiError::Status(resp.status));
        }
        Ok(serde_json::from_str(&resp.body)?)
    }

    /// Simulation commands answer `{success, message}` even on error statuses,
    /// so the body is parsed regardless of status.
    async fn command(&self, request: ApiRequest) -> Result<CommandResponse, ApiError> {
        let resp = self.transport.send(request).await?;
        match serde_json::from_str::<CommandResponse>(&resp.body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !resp.is_success() => Err(ApiError::Status(resp.status)),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn sensor_data(&self) -> Result<Vec<SensorDatum>, ApiError> {
        let resp: SensorDataResponse = self.fetch_json(ApiRequest::get(SENSOR_DATA_PATH)).await?;
        resp.data
            .ok_or_else(|| ApiError::Malformed("sensor payload has no `data`".to_string()))
    }

    /// First row of the summary endpoint; `None` when it is empty.
    pub async fn latest_summary(&self) -> Result<Option<SummaryReading>, ApiError> {
        let page: ReadingsPage = self.fetch_json(ApiRequest::get(SUMMARY_PATH)).await?;
        Ok(page.into_rows().into_iter().next())
    }

    pub async fn set_sensor_count(&self, count: u8) -> Result<SetSensorCountResponse, ApiError> {
        let req = self.post_json(SET_SENSOR_COUNT_PATH, &SetSensorCountRequest { count })?;
        let resp: SetSensorCountResponse = self.fetch_json(req).await?;
        if !resp.success {
            return Err(ApiError::Rejected(format!("sensor count {count} not accepted")));
        }
        Ok(resp)
    }

    pub async fn logs(&self) -> Result<Vec<LogEntry>, ApiError> {
        let resp: LogsResponse = self.fetch_json(ApiRequest::get(LOGS_PATH)).await?;
        Ok(resp.logs)
    }

    pub async fn simulation_status(&self) -> Result<SimulationStatus, ApiError> {
        self.fetch_json(ApiRequest::get(SIMULATION_STATUS_PATH)).await
    }

    pub async fn start_simulation(&self, sensor_count: u8) -> Result<CommandResponse, ApiError> {
        let req = self.post_json(SIMULATION_START_PATH, &StartSimulationRequest { sensor_count })?;
        self.command(req).await
    }

    pub async fn stop_simulation(&self) -> Result<CommandResponse, ApiError> {
        self.command(self.post(SIMULATION_STOP_PATH, RequestBody::Empty))
            .await
    }

    pub async fn reset_simulation(&self) -> Result<CommandResponse, ApiError> {
        self.command(self.post(SIMULATION_RESET_PATH, RequestBody::Empty))
            .await
    }

    pub async fn posts(&self) -> Result<Vec<PostSummary>, ApiError> {
        self.fetch_json(ApiRequest::get(POSTS_PATH)).await
    }

    /// Creates a post. A non-2xx answer becomes `Rejected` carrying the
    /// message to show the user.
    pub async fn create_post(&self, fields: Vec<FormField>) -> Result<(), ApiError> {
        let resp = self
            .transport
            .send(self.post(POSTS_PATH, RequestBody::Multipart(fields)))
            .await?;
        if !resp.is_success() {
            return Err(ApiError::Rejected(crate::blog::rejection_detail(&resp.body)));
        }
        Ok(())
    }
}
