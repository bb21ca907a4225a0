mod common;

use airwatch_shared::api::{
    CSRF_HEADER, SENSOR_DATA_PATH, SET_SENSOR_COUNT_PATH, SIMULATION_RESET_PATH,
    SIMULATION_START_PATH, SIMULATION_STATUS_PATH, SIMULATION_STOP_PATH, SUMMARY_PATH,
};
use airwatch_shared::dashboard::PollOutcome;
use airwatch_shared::{DashboardEvent, RequestBody};

use common::{ScriptedTransport, dashboard, record_events, sensor_payload};

#[tokio::test]
async fn three_sensor_scenario() {
    let t = ScriptedTransport::new();
    t.ok(SENSOR_DATA_PATH, &sensor_payload(&[40.0, 120.0, 200.0]));
    let d = dashboard(&t, 3, 3);
    let events = record_events(&d);

    assert_eq!(d.refresh_readings().await, PollOutcome::Applied { alerts: 2 });

    d.with_state(|s| {
        let cats: Vec<_> = s.cards.cards().iter().map(|c| c.category_label()).collect();
        assert_eq!(cats, vec!["Good", "Unhealthy", "Hazardous"]);
        let colors: Vec<_> = s.cards.cards().iter().map(|c| c.color()).collect();
        assert_eq!(colors, vec!["#00E396", "#f05233", "#ce1c1c"]);

        let messages: Vec<_> = s
            .notifications
            .entries()
            .iter()
            .map(|n| n.message.as_str())
            .collect();
        assert_eq!(
            messages,
            vec![
                "Critical Warning: High AQI (200) detected at AQ-003!",
                "Critical Warning: High AQI (120) detected at AQ-002!",
            ]
        );
    });
    assert_eq!(
        *events.borrow(),
        vec![DashboardEvent::ReadingsApplied, DashboardEvent::NotificationsChanged]
    );

    // Same readings again: no duplicate alerts.
    assert_eq!(d.refresh_readings().await, PollOutcome::Applied { alerts: 0 });
    d.with_state(|s| assert_eq!(s.notifications.len(), 2));
}

#[tokio::test]
async fn store_never_exceeds_active_count() {
    let t = ScriptedTransport::new();
    t.ok(SENSOR_DATA_PATH, &sensor_payload(&[10.0, 20.0, 30.0, 40.0, 50.0]));
    let d = dashboard(&t, 5, 2);

    d.refresh_readings().await;
    d.with_state(|s| {
        assert_eq!(s.store.len(), 2);
        assert!(!s.store.contains_id("AQ-003"));
        assert_eq!(s.cards.len(), 2);
        assert_eq!(s.markers.len(), 2);
    });
}

#[tokio::test]
async fn increment_at_max_is_silent() {
    let t = ScriptedTransport::new();
    t.ok(SET_SENSOR_COUNT_PATH, r#"{"success":true,"sensor_count":10}"#);
    let d = dashboard(&t, 10, 10);
    let events = record_events(&d);

    assert_eq!(d.increment().await, None);
    d.with_state(|s| assert_eq!(s.counter.get(), 10));
    assert!(t.posts_to(SET_SENSOR_COUNT_PATH).is_empty());
    assert!(events.borrow().is_empty());
}

#[tokio::test]
async fn decrement_at_min_is_silent() {
    let t = ScriptedTransport::new();
    let d = dashboard(&t, 3, 1);
    assert_eq!(d.decrement().await, None);
    assert!(t.requests().is_empty());
}

#[tokio::test]
async fn count_change_renders_posts_then_broadcasts() {
    let t = ScriptedTransport::new();
    t.ok(SET_SENSOR_COUNT_PATH, r#"{"success":true,"sensor_count":4}"#);
    let d = dashboard(&t, 6, 3);
    let events = record_events(&d);

    assert_eq!(d.increment().await, Some(4));

    let posts = t.posts_to(SET_SENSOR_COUNT_PATH);
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].header(CSRF_HEADER), Some("test-csrf"));
    assert_eq!(posts[0].body, RequestBody::Json(r#"{"count":4}"#.to_string()));

    let events = events.borrow();
    assert_eq!(events.len(), 2);
    assert!(matches!(&events[0], DashboardEvent::CardsRendered(diff) if diff.added.len() == 1));
    assert_eq!(events[1], DashboardEvent::SensorCountChanged { count: 4 });
    d.with_state(|s| {
        assert_eq!(s.cards.len(), 4);
        assert_eq!(s.markers.len(), 4);
    });
}

#[tokio::test]
async fn backend_refusal_keeps_local_count() {
    let t = ScriptedTransport::new();
    t.respond(SET_SENSOR_COUNT_PATH, 500, "oops");
    let d = dashboard(&t, 6, 3);
    let events = record_events(&d);

    assert_eq!(d.decrement().await, Some(2));
    d.with_state(|s| assert_eq!(s.counter.get(), 2));
    assert!(events
        .borrow()
        .contains(&DashboardEvent::SensorCountChanged { count: 2 }));
}

#[tokio::test]
async fn rejected_poll_leaves_store_and_cards() {
    let t = ScriptedTransport::new();
    t.ok(SENSOR_DATA_PATH, &sensor_payload(&[33.0, 66.0]));
    t.fail(SENSOR_DATA_PATH);
    let d = dashboard(&t, 2, 2);

    d.refresh_readings().await;
    let (store, cards) = d.with_state(|s| (s.store.clone(), s.cards.clone()));

    let events = record_events(&d);
    assert_eq!(d.refresh_readings().await, PollOutcome::Failed);
    d.with_state(|s| {
        assert_eq!(s.store, store);
        assert_eq!(s.cards, cards);
    });
    assert!(events.borrow().is_empty());
}

#[tokio::test]
async fn payload_without_data_is_ignored() {
    let t = ScriptedTransport::new();
    t.ok(SENSOR_DATA_PATH, &sensor_payload(&[70.0]));
    t.ok(SENSOR_DATA_PATH, r#"{"error":"warming up"}"#);
    let d = dashboard(&t, 1, 1);

    d.refresh_readings().await;
    assert_eq!(d.refresh_readings().await, PollOutcome::Failed);
    d.with_state(|s| assert_eq!(s.cards.get(1).and_then(|c| c.aqi()), Some(70.0)));
}

#[tokio::test]
async fn slower_older_poll_does_not_overwrite_newer() {
    let t = ScriptedTransport::new();
    t.delayed(SENSOR_DATA_PATH, 40, &sensor_payload(&[180.0]));
    t.delayed(SENSOR_DATA_PATH, 0, &sensor_payload(&[20.0]));
    let d = dashboard(&t, 1, 1);

    let (older, newer) = tokio::join!(d.refresh_readings(), d.refresh_readings());
    assert_eq!(newer, PollOutcome::Applied { alerts: 0 });
    assert_eq!(older, PollOutcome::Stale);
    d.with_state(|s| {
        assert_eq!(s.cards.get(1).and_then(|c| c.aqi()), Some(20.0));
        assert!(s.notifications.is_empty());
    });
}

#[tokio::test]
async fn summary_poll_raises_site_alert_once() {
    let t = ScriptedTransport::new();
    t.ok(
        SUMMARY_PATH,
        r#"{"results":[{"aqi":142,"aqi_category":"poor","temperature":18,"humidity":55}]}"#,
    );
    let d = dashboard(&t, 1, 1);

    d.refresh_summary().await;
    d.refresh_summary().await;
    d.with_state(|s| {
        let stats = s.summary.as_ref().expect("stats");
        assert_eq!(stats.category, "POOR");
        assert_eq!(stats.temperature, "18°C");
        assert_eq!(stats.humidity, "55%");
        assert_eq!(s.notifications.len(), 1);
        assert!(s.notifications.has_unread());
    });

    d.clear_notifications();
    d.with_state(|s| assert!(s.notifications.is_empty() && !s.notifications.has_unread()));
}

#[tokio::test]
async fn opening_panel_on_running_simulation_arms_tail() {
    let t = ScriptedTransport::new();
    t.ok(SIMULATION_STATUS_PATH, r#"{"running":true}"#);
    let d = dashboard(&t, 3, 3);

    let generation = d.toggle_panel().await.expect("tail armed");
    assert!(d.tail_is_current(generation));
    d.with_state(|s| {
        assert!(s.simulation.open);
        assert!(!s.simulation.start_enabled);
        assert!(s.simulation.stop_enabled);
    });

    // Closing leaves the tail alone.
    assert_eq!(d.toggle_panel().await, None);
    assert!(d.tail_is_current(generation));
}

#[tokio::test]
async fn start_stop_reset_cycle() {
    let t = ScriptedTransport::new();
    t.ok(SIMULATION_START_PATH, r#"{"success":true,"message":"Simulation started"}"#);
    t.ok(SIMULATION_STOP_PATH, r#"{"success":true,"message":"Simulation stopped"}"#);
    t.ok(SIMULATION_RESET_PATH, r#"{"success":true,"message":"reset"}"#);
    let d = dashboard(&t, 4, 4);

    let generation = d.start_simulation().await.expect("tail armed");
    let start = &t.posts_to(SIMULATION_START_PATH)[0];
    assert_eq!(start.body, RequestBody::Json(r#"{"sensor_count":4}"#.to_string()));
    d.with_state(|s| {
        let last = s.simulation.lines.last().expect("line");
        assert_eq!(last.level, "SUCCESS");
        assert_eq!(last.message, "Simulation started");
        assert_eq!(last.timestamp.as_deref(), Some("12:00:00"));
    });

    d.stop_simulation().await;
    assert!(!d.tail_is_current(generation));

    d.reset_simulation().await;
    d.with_state(|s| {
        let messages: Vec<_> = s.simulation.lines.iter().map(|l| l.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Environment Simulator Ready",
                "Awaiting command...",
                "Simulation reset complete",
            ]
        );
    });

    for path in [SIMULATION_START_PATH, SIMULATION_STOP_PATH, SIMULATION_RESET_PATH] {
        let posts = t.posts_to(path);
        assert_eq!(posts.len(), 1, "{path}");
        assert_eq!(posts[0].header(CSRF_HEADER), Some("test-csrf"), "{path}");
    }
}

#[tokio::test]
async fn unreachable_backend_on_start() {
    let t = ScriptedTransport::new();
    t.fail(SIMULATION_START_PATH);
    let d = dashboard(&t, 1, 1);

    assert_eq!(d.start_simulation().await, None);
    d.with_state(|s| {
        let last = s.simulation.lines.last().expect("line");
        assert_eq!(last.message, "Failed to start simulation");
        assert!(s.simulation.start_enabled);
    });
}
