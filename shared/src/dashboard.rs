use std::cell::RefCell;

use crate::analytics::{AnalyticsHistory, ChartKind, ChartView, SensorFilter, SensorInsight};
use crate::api::{ApiClient, ApiError, Transport};
use crate::blog::{BlogError, PostDraft};
use crate::cards::{CardDiff, CardKey, CardSet};
use crate::counter::{CountChange, SensorCounter};
use crate::notifications::{NotificationLog, sensor_danger_message, site_danger_message};
use crate::registry::SensorRegistry;
use crate::simulation::{SimulationPanel, clock_label};
use crate::store::{LiveStateStore, PollSequencer, PollTicket};
use crate::theme::Theme;
use crate::widgets::{DerivedWidgets, MarkerStyle, marker_styles};
use crate::{PostSummary, SensorDatum, SummaryReading};

/// Header stats from the summary endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub aqi: f64,
    pub category: String,
    pub category_class: Option<&'static str>,
    pub temperature: String,
    pub humidity: String,
}

fn optional_number(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "--".to_string())
}

impl SummaryStats {
    pub fn from_reading(r: &SummaryReading) -> Self {
        let category = r.aqi_category.to_uppercase();
        let category_class = match category.as_str() {
            "EXCELLENT" => Some("excellent"),
            "MODERATE" => Some("moderate"),
            "POOR" => Some("poor"),
            _ => None,
        };
        Self {
            aqi: r.aqi,
            category,
            category_class,
            temperature: format!("{}°C", optional_number(r.temperature)),
            humidity: format!("{}%", optional_number(r.humidity)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PostFeed {
    #[default]
    Loading,
    Loaded(Vec<PostSummary>),
    Failed,
}

impl PostFeed {
    /// Placeholder text when there is nothing to list.
    pub fn empty_message(&self) -> Option<&'static str> {
        match self {
            PostFeed::Loaded(posts) if posts.is_empty() => Some("No posts yet"),
            PostFeed::Failed => Some("Failed to load posts"),
            _ => None,
        }
    }

    pub fn posts(&self) -> &[PostSummary] {
        match self {
            PostFeed::Loaded(posts) => posts,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Applied; carries the number of new danger alerts.
    Applied { alerts: usize },
    Stale,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    ReadingsApplied,
    SummaryApplied,
    CardsRendered(CardDiff),
    CardFlipped(CardKey),
    /// Broadcast after a count change; independent widgets resize on it.
    SensorCountChanged { count: u8 },
    NotificationsChanged,
    SimulationChanged,
    PostsChanged,
    ThemeChanged(Theme),
    ChartChanged,
    InsightChanged,
}

/// Everything the page renders, updated only through these methods.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub registry: SensorRegistry,
    pub counter: SensorCounter,
    pub store: LiveStateStore,
    pub cards: CardSet,
    pub markers: Vec<MarkerStyle>,
    pub widgets: DerivedWidgets,
    pub history: AnalyticsHistory,
    pub chart: ChartView,
    pub summary: Option<SummaryStats>,
    pub notifications: NotificationLog,
    pub simulation: SimulationPanel,
    pub posts: PostFeed,
    pub insight: Option<SensorInsight>,
    pub theme: Theme,
    readings_seq: PollSequencer,
    summary_seq: PollSequencer,
}

impl DashboardState {
    pub fn new(registry: SensorRegistry, counter: SensorCounter, theme: Theme) -> Self {
        let mut state = Self {
            registry,
            counter,
            store: LiveStateStore::default(),
            cards: CardSet::default(),
            markers: Vec::new(),
            widgets: DerivedWidgets::default(),
            history: AnalyticsHistory::default(),
            chart: ChartView::default(),
            summary: None,
            notifications: NotificationLog::default(),
            simulation: SimulationPanel::default(),
            posts: PostFeed::default(),
            insight: None,
            theme,
            readings_seq: PollSequencer::default(),
            summary_seq: PollSequencer::default(),
        };
        state.cards.render(&state.registry, &state.store, state.count());
        state.resize_markers();
        state
    }

    pub fn count(&self) -> u32 {
        u32::from(self.counter.get())
    }

    pub fn begin_readings_poll(&mut self) -> PollTicket {
        self.readings_seq.dispatch()
    }

    pub fn begin_summary_poll(&mut self) -> PollTicket {
        self.summary_seq.dispatch()
    }

    /// Replaces the store from a sensor-data result and recomputes every
    /// dependent view. Failures and stale completions leave state untouched.
    pub fn apply_readings(
        &mut self,
        ticket: PollTicket,
        result: Result<Vec<SensorDatum>, ApiError>,
        now_ms: i64,
    ) -> PollOutcome {
        let data = match result {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("sensor data poll failed: {e}");
                return PollOutcome::Failed;
            }
        };
        if !self.readings_seq.try_apply(ticket) {
            tracing::debug!("dropping stale sensor data poll #{}", ticket.seq());
            return PollOutcome::Stale;
        }

        let count = self.count();
        self.store = LiveStateStore::from_payload(&self.registry, &data, count);
        self.cards.update(&self.registry, &self.store);
        self.markers = marker_styles(&self.registry, &self.store, count);
        self.widgets.recompute(&self.store);
        self.history.record(&self.registry, &self.store, count, now_ms);

        let mut alerts = 0;
        for def in self.registry.active(count) {
            if let Some(reading) = self.store.for_sensor(def) {
                let message = sensor_danger_message(reading.aqi, &reading.sensor_id);
                if self.notifications.check_danger_level(reading.aqi, message, now_ms) {
                    alerts += 1;
                }
            }
        }

        if let Some(insight) = &self.insight
            && let Some(def) = self.registry.get(insight.index)
        {
            self.insight = Some(SensorInsight::build(def, &self.store, now_ms));
        }

        tracing::debug!(
            "applied sensor data poll #{} ({} readings)",
            ticket.seq(),
            self.store.len()
        );
        PollOutcome::Applied { alerts }
    }

    /// Updates the header stats. An empty result keeps the previous stats.
    pub fn apply_summary(
        &mut self,
        ticket: PollTicket,
        result: Result<Option<SummaryReading>, ApiError>,
        now_ms: i64,
    ) -> PollOutcome {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("summary poll failed: {e}");
                return PollOutcome::Failed;
            }
        };
        if !self.summary_seq.try_apply(ticket) {
            tracing::debug!("dropping stale summary poll #{}", ticket.seq());
            return PollOutcome::Stale;
        }
        let Some(row) = row else {
            return PollOutcome::Applied { alerts: 0 };
        };

        self.summary = Some(SummaryStats::from_reading(&row));
        let added = self
            .notifications
            .check_danger_level(row.aqi, site_danger_message(row.aqi), now_ms);
        PollOutcome::Applied {
            alerts: usize::from(added),
        }
    }

    /// Steps the counter and re-renders the card set on a real transition.
    pub fn change_count(&mut self, up: bool) -> Option<(CountChange, CardDiff)> {
        let change = if up {
            self.counter.increment()
        } else {
            self.counter.decrement()
        }?;
        let diff = self
            .cards
            .render(&self.registry, &self.store, u32::from(change.current));
        self.chart.clamp_to(u32::from(change.current));
        Some((change, diff))
    }

    /// Rebuilds the marker set for the current count.
    pub fn resize_markers(&mut self) {
        self.markers = marker_styles(&self.registry, &self.store, self.count());
    }

    pub fn open_insight(&mut self, index: u32, now_ms: i64) -> bool {
        let Some(def) = self.registry.get(index) else {
            tracing::warn!("no sensor definition for index {index}");
            return false;
        };
        self.insight = Some(SensorInsight::build(def, &self.store, now_ms));
        true
    }
}

type Observer = Box<dyn Fn(&DashboardEvent, &DashboardState)>;

/// Owns the state, the API client and the clock, and tells subscribers what
/// changed. State is never borrowed across an `.await`.
pub struct Dashboard<T> {
    api: ApiClient<T>,
    state: RefCell<DashboardState>,
    observers: RefCell<Vec<Observer>>,
    clock: Box<dyn Fn() -> i64>,
}

impl<T: Transport> Dashboard<T> {
    /// `clock` returns local wall-clock time in milliseconds.
    pub fn new(transport: T, state: DashboardState, clock: impl Fn() -> i64 + 'static) -> Self {
        Self {
            api: ApiClient::new(transport),
            state: RefCell::new(state),
            observers: RefCell::new(Vec::new()),
            clock: Box::new(clock),
        }
    }

    /// Observers must not call back into the dashboard.
    pub fn subscribe(&self, observer: impl Fn(&DashboardEvent, &DashboardState) + 'static) {
        self.observers.borrow_mut().push(Box::new(observer));
    }

    pub fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    /// Read access to the current state.
    pub fn with_state<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.state.borrow())
    }

    fn update<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }

    fn emit(&self, event: DashboardEvent) {
        let state = self.state.borrow();
        for observer in self.observers.borrow().iter() {
            observer(&event, &state);
        }
    }

    fn now(&self) -> i64 {
        (self.clock)()
    }

    fn now_label(&self) -> String {
        clock_label(self.now())
    }

    pub async fn refresh_readings(&self) -> PollOutcome {
        let ticket = self.update(DashboardState::begin_readings_poll);
        let result = self.api.sensor_data().await;
        let now = self.now();
        let outcome = self.update(|s| s.apply_readings(ticket, result, now));
        if let PollOutcome::Applied { alerts } = outcome {
            self.emit(DashboardEvent::ReadingsApplied);
            if alerts > 0 {
                self.emit(DashboardEvent::NotificationsChanged);
            }
        }
        outcome
    }

    pub async fn refresh_summary(&self) -> PollOutcome {
        let ticket = self.update(DashboardState::begin_summary_poll);
        let result = self.api.latest_summary().await;
        let now = self.now();
        let outcome = self.update(|s| s.apply_summary(ticket, result, now));
        if let PollOutcome::Applied { alerts } = outcome {
            self.emit(DashboardEvent::SummaryApplied);
            if alerts > 0 {
                self.emit(DashboardEvent::NotificationsChanged);
            }
        }
        outcome
    }

    pub async fn increment(&self) -> Option<u8> {
        self.change_count(true).await
    }

    pub async fn decrement(&self) -> Option<u8> {
        self.change_count(false).await
    }

    /// Re-render, best-effort backend update, then broadcast. The local count
    /// is kept whatever the backend answers.
    async fn change_count(&self, up: bool) -> Option<u8> {
        let (change, diff) = self.update(|s| s.change_count(up))?;
        self.emit(DashboardEvent::CardsRendered(diff));

        match self.api.set_sensor_count(change.current).await {
            Ok(resp) => tracing::info!(
                "backend sensor count updated: {}",
                resp.sensor_count.unwrap_or(change.current)
            ),
            Err(e) => tracing::warn!("failed to update backend sensor count: {e}"),
        }

        let count = self.update(|s| {
            s.resize_markers();
            s.counter.get()
        });
        self.emit(DashboardEvent::SensorCountChanged { count });
        tracing::info!("sensor count synced: {}", count);
        Some(count)
    }

    pub fn toggle_flip(&self, key: &CardKey) -> Option<bool> {
        let flipped = self.update(|s| s.cards.toggle_flip(key))?;
        self.emit(DashboardEvent::CardFlipped(key.clone()));
        Some(flipped)
    }

    pub fn clear_notifications(&self) {
        self.update(|s| s.notifications.clear());
        self.emit(DashboardEvent::NotificationsChanged);
    }

    pub fn open_insight(&self, index: u32) {
        let now = self.now();
        if self.update(|s| s.open_insight(index, now)) {
            self.emit(DashboardEvent::InsightChanged);
        }
    }

    pub fn close_insight(&self) {
        self.update(|s| s.insight = None);
        self.emit(DashboardEvent::InsightChanged);
    }

    pub fn toggle_theme(&self) -> Theme {
        let theme = self.update(|s| {
            s.theme = s.theme.toggle();
            s.theme
        });
        self.emit(DashboardEvent::ThemeChanged(theme));
        theme
    }

    pub fn toggle_chart_kind(&self) -> ChartKind {
        let kind = self.update(|s| {
            s.chart.kind = s.chart.kind.toggle();
            s.chart.kind
        });
        self.emit(DashboardEvent::ChartChanged);
        kind
    }

    pub fn set_chart_filter(&self, filter: SensorFilter) {
        self.update(|s| s.chart.filter = filter);
        self.emit(DashboardEvent::ChartChanged);
    }

    // ----- simulation panel -----------------------------------------------
    //
    // Operations that may arm the log tail return the tail generation; the
    // caller runs a loop calling `fetch_logs` while `tail_is_current` holds.

    pub fn tail_is_current(&self, generation: u64) -> bool {
        self.with_state(|s| s.simulation.tail.is_current(generation))
    }

    pub async fn toggle_panel(&self) -> Option<u64> {
        let open = self.update(|s| s.simulation.toggle_open());
        self.emit(DashboardEvent::SimulationChanged);
        if open {
            self.check_simulation_status().await
        } else {
            None
        }
    }

    pub fn close_panel(&self) {
        self.update(|s| s.simulation.close());
        self.emit(DashboardEvent::SimulationChanged);
    }

    pub async fn check_simulation_status(&self) -> Option<u64> {
        match self.api.simulation_status().await {
            Ok(status) => {
                let generation = self.update(|s| s.simulation.apply_status(status.running));
                self.emit(DashboardEvent::SimulationChanged);
                generation
            }
            Err(e) => {
                tracing::warn!("simulation status check failed: {e}");
                None
            }
        }
    }

    pub async fn start_simulation(&self) -> Option<u64> {
        let now = self.now_label();
        let count = self.update(|s| {
            s.simulation.begin_start(&now);
            s.counter.get()
        });
        self.emit(DashboardEvent::SimulationChanged);

        let result = self.api.start_simulation(count).await;
        if let Err(e) = &result {
            tracing::warn!("start simulation failed: {e}");
        }
        let now = self.now_label();
        let generation = self.update(|s| s.simulation.finish_start(result, &now));
        self.emit(DashboardEvent::SimulationChanged);
        generation
    }

    pub async fn stop_simulation(&self) {
        let now = self.now_label();
        self.update(|s| s.simulation.begin_stop(&now));
        self.emit(DashboardEvent::SimulationChanged);

        let result = self.api.stop_simulation().await;
        if let Err(e) = &result {
            tracing::warn!("stop simulation failed: {e}");
        }
        let now = self.now_label();
        self.update(|s| s.simulation.finish_stop(result, &now));
        self.emit(DashboardEvent::SimulationChanged);
    }

    pub async fn reset_simulation(&self) {
        let now = self.now_label();
        self.update(|s| s.simulation.begin_reset(&now));
        self.emit(DashboardEvent::SimulationChanged);

        let result = self.api.reset_simulation().await;
        if let Err(e) = &result {
            tracing::warn!("reset simulation failed: {e}");
        }
        let now = self.now_label();
        self.update(|s| s.simulation.finish_reset(result, &now));
        self.emit(DashboardEvent::SimulationChanged);
    }

    pub async fn fetch_logs(&self) {
        let result = self.api.logs().await;
        if let Err(e) = &result {
            tracing::warn!("log fetch failed: {e}");
        }
        let now = self.now_label();
        self.update(|s| s.simulation.apply_logs(result, &now));
        self.emit(DashboardEvent::SimulationChanged);
    }

    // ----- blog -------------------------------------------------------------

    pub async fn load_posts(&self) {
        let feed = match self.api.posts().await {
            Ok(posts) => PostFeed::Loaded(posts),
            Err(e) => {
                tracing::warn!("error loading posts: {e}");
                PostFeed::Failed
            }
        };
        self.update(|s| s.posts = feed);
        self.emit(DashboardEvent::PostsChanged);
    }

    /// Validates and submits `draft`; on success the feed is reloaded. The
    /// error's `Display` is the text of the blocking alert.
    pub async fn submit_post(&self, draft: &PostDraft) -> Result<(), BlogError> {
        let fields = draft.form_fields(self.now())?;
        match self.api.create_post(fields).await {
            Ok(()) => {
                self.load_posts().await;
                Ok(())
            }
            Err(ApiError::Rejected(detail)) => {
                tracing::warn!("error creating post: {detail}");
                Err(BlogError::Rejected(detail))
            }
            Err(e) => {
                tracing::warn!("submit error: {e}");
                Err(BlogError::Network(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SensorDefinition;

    fn registry(n: u32) -> SensorRegistry {
        SensorRegistry::new((1..=n).map(|i| SensorDefinition {
            index: i,
            id: format!("S{i}"),
            name: format!("Site {i}"),
            lat: Some(40.0 + i as f64),
            lng: Some(-78.0),
        }))
    }

    fn datum(aqi: f64) -> SensorDatum {
        SensorDatum {
            latitude: None,
            longitude: None,
            aqi: Some(aqi),
            no2: Some(1.0),
            co: Some(1.0),
            smoke: Some(1.0),
        }
    }

    fn state(n: u32, count: u8) -> DashboardState {
        DashboardState::new(registry(n), SensorCounter::new(count), Theme::Dark)
    }

    #[test]
    fn new_state_renders_placeholder_cards_and_markers() {
        let s = state(5, 3);
        assert_eq!(s.cards.len(), 3);
        assert!(s.cards.cards().iter().all(|c| c.is_loading()));
        assert_eq!(s.markers.len(), 3);
        assert_eq!(s.markers[2].aqi, 70.0);
    }

    #[test]
    fn applied_poll_updates_every_view() {
        let mut s = state(3, 3);
        let t = s.begin_readings_poll();
        let out = s.apply_readings(t, Ok(vec![datum(40.0), datum(120.0), datum(200.0)]), 1_000);

        assert_eq!(out, PollOutcome::Applied { alerts: 2 });
        let cats: Vec<_> = s.cards.cards().iter().map(|c| c.category_label()).collect();
        assert_eq!(cats, vec!["Good", "Unhealthy", "Hazardous"]);
        assert_eq!(s.markers[1].aqi, 120.0);
        assert!(!s.widgets.is_empty());
        assert_eq!(s.history.get(3).map(|h| h.points.len()), Some(1));
        assert_eq!(s.notifications.len(), 2);
    }

    #[test]
    fn failed_poll_keeps_previous_store() {
        let mut s = state(2, 2);
        let t = s.begin_readings_poll();
        s.apply_readings(t, Ok(vec![datum(10.0), datum(20.0)]), 0);
        let before = s.store.clone();

        let t = s.begin_readings_poll();
        let out = s.apply_readings(t, Err(ApiError::Status(503)), 1);
        assert_eq!(out, PollOutcome::Failed);
        assert_eq!(s.store, before);
        assert_eq!(s.cards.get(2).and_then(|c| c.aqi()), Some(20.0));
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut s = state(1, 1);
        let older = s.begin_readings_poll();
        let newer = s.begin_readings_poll();
        assert!(matches!(
            s.apply_readings(newer, Ok(vec![datum(30.0)]), 0),
            PollOutcome::Applied { .. }
        ));
        assert_eq!(s.apply_readings(older, Ok(vec![datum(99.0)]), 0), PollOutcome::Stale);
        assert_eq!(s.cards.get(1).and_then(|c| c.aqi()), Some(30.0));
    }

    #[test]
    fn apply_uses_count_at_apply_time() {
        let mut s = state(4, 4);
        let t = s.begin_readings_poll();
        s.change_count(false);
        s.apply_readings(t, Ok(vec![datum(1.0), datum(2.0), datum(3.0), datum(4.0)]), 0);
        assert_eq!(s.store.len(), 3);
        assert!(!s.store.contains_id("S4"));
    }

    #[test]
    fn decrement_hides_inactive_chart_series() {
        let mut s = state(3, 3);
        let t = s.begin_readings_poll();
        s.apply_readings(t, Ok(vec![datum(40.0), datum(120.0), datum(200.0)]), 0);
        s.chart.filter = SensorFilter::Index(3);

        s.change_count(false);
        assert_eq!(s.chart.filter, SensorFilter::All);
        s.change_count(false);
        let t = s.begin_readings_poll();
        s.apply_readings(t, Ok(vec![datum(40.0), datum(120.0), datum(200.0)]), 1);

        let ids: Vec<_> = s
            .chart
            .visible(&s.history, s.count())
            .iter()
            .map(|h| h.sensor_id.clone())
            .collect();
        assert_eq!(s.count(), 1);
        assert_eq!(ids, vec!["S1"]);
    }

    #[test]
    fn summary_sets_stats_and_site_alert() {
        let mut s = state(1, 1);
        let t = s.begin_summary_poll();
        let row = SummaryReading {
            aqi: 130.0,
            aqi_category: "Poor".into(),
            temperature: Some(21.5),
            humidity: None,
        };
        assert_eq!(
            s.apply_summary(t, Ok(Some(row)), 5),
            PollOutcome::Applied { alerts: 1 }
        );
        let stats = s.summary.clone().expect("stats");
        assert_eq!(stats.category, "POOR");
        assert_eq!(stats.category_class, Some("poor"));
        assert_eq!(stats.temperature, "21.5°C");
        assert_eq!(stats.humidity, "--%");
        assert_eq!(
            s.notifications.entries()[0].message,
            "Critical Warning: High AQI (130) detected!"
        );

        let t = s.begin_summary_poll();
        s.apply_summary(t, Ok(None), 6);
        assert_eq!(s.summary, Some(stats));
    }

    #[test]
    fn open_insight_tracks_later_polls() {
        let mut s = state(2, 2);
        assert!(!s.open_insight(7, 0));
        assert!(s.open_insight(2, 0));
        assert_eq!(s.insight.as_ref().map(|i| i.current[0].as_str()), Some("--"));

        let t = s.begin_readings_poll();
        s.apply_readings(t, Ok(vec![datum(5.0), datum(60.0)]), 0);
        assert_eq!(s.insight.as_ref().map(|i| i.current[0].as_str()), Some("60"));
    }

    #[test]
    fn feed_messages() {
        assert_eq!(PostFeed::Loaded(Vec::new()).empty_message(), Some("No posts yet"));
        assert_eq!(PostFeed::Failed.empty_message(), Some("Failed to load posts"));
        assert_eq!(PostFeed::Loading.empty_message(), None);
    }
}
