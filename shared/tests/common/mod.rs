#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use airwatch_shared::counter::SensorCounter;
use airwatch_shared::theme::Theme;
use airwatch_shared::{
    ApiError, ApiRequest, Dashboard, DashboardEvent, DashboardState, HttpResponse, Method,
    SensorDefinition, SensorRegistry, Transport,
};

struct Scripted {
    delay: Duration,
    result: Result<HttpResponse, ApiError>,
}

/// In-memory backend. Responses are queued per path; the last one queued for
/// a path keeps answering once the others are used up.
pub struct ScriptedTransport {
    routes: RefCell<HashMap<String, VecDeque<Scripted>>>,
    requests: RefCell<Vec<ApiRequest>>,
    token: Option<String>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            routes: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
            token: Some("test-csrf".to_string()),
        }
    }

    fn push(&self, path: &str, delay_ms: u64, result: Result<HttpResponse, ApiError>) {
        self.routes
            .borrow_mut()
            .entry(path.to_string())
            .or_default()
            .push_back(Scripted {
                delay: Duration::from_millis(delay_ms),
                result,
            });
    }

    pub fn respond(&self, path: &str, status: u16, body: &str) {
        self.push(
            path,
            0,
            Ok(HttpResponse {
                status,
                body: body.to_string(),
            }),
        );
    }

    pub fn ok(&self, path: &str, body: &str) {
        self.respond(path, 200, body);
    }

    pub fn delayed(&self, path: &str, delay_ms: u64, body: &str) {
        self.push(
            path,
            delay_ms,
            Ok(HttpResponse {
                status: 200,
                body: body.to_string(),
            }),
        );
    }

    pub fn fail(&self, path: &str) {
        self.push(path, 0, Err(ApiError::Transport("connection refused".to_string())));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn posts_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == Method::Post && r.path == path)
            .collect()
    }

    fn next(&self, path: &str) -> Option<Scripted> {
        let mut routes = self.routes.borrow_mut();
        let queue = routes.get_mut(path)?;
        if queue.len() > 1 {
            return queue.pop_front();
        }
        queue.front().map(|s| Scripted {
            delay: s.delay,
            result: s.result.clone(),
        })
    }
}

impl Transport for &ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        let path = request.path.clone();
        self.requests.borrow_mut().push(request);
        let Some(scripted) = self.next(&path) else {
            return Err(ApiError::Transport(format!("no route for {path}")));
        };
        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }
        scripted.result
    }

    fn csrf_token(&self) -> Option<String> {
        self.token.clone()
    }
}

pub fn registry(n: u32) -> SensorRegistry {
    SensorRegistry::new((1..=n).map(|i| SensorDefinition {
        index: i,
        id: format!("AQ-{i:03}"),
        name: format!("Station {i}"),
        lat: Some(42.9 + f64::from(i) / 100.0),
        lng: Some(-78.8),
    }))
}

pub fn sensor_payload(aqis: &[f64]) -> String {
    let rows: Vec<String> = aqis
        .iter()
        .map(|aqi| {
            format!(r#"{{"latitude":42.9,"longitude":-78.8,"aqi":{aqi},"no2":12.5,"co":0.4,"smoke":8}}"#)
        })
        .collect();
    format!(r#"{{"data":[{}]}}"#, rows.join(","))
}

pub const NOON_MS: i64 = 12 * 3_600_000;

pub fn dashboard(
    transport: &ScriptedTransport,
    sensors: u32,
    count: u8,
) -> Dashboard<&ScriptedTransport> {
    let state = DashboardState::new(registry(sensors), SensorCounter::new(count), Theme::Dark);
    Dashboard::new(transport, state, || NOON_MS)
}

/// Records every event the dashboard emits.
pub fn record_events<T: Transport>(dashboard: &Dashboard<T>) -> Rc<RefCell<Vec<DashboardEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    dashboard.subscribe(move |event, _| sink.borrow_mut().push(event.clone()));
    events
}
