// frontend/src/air_dashboard/sensor_cards.rs

use airwatch_shared::DashboardState;
use airwatch_shared::cards::Card;
use airwatch_shared::counter::{MAX_SENSORS, MIN_SENSORS};
use dioxus::prelude::*;
use dioxus_signals::Signal;

use super::DashboardCtx;

const STATUS_DOT_ONLINE: &str = "#22c55e";
const STATUS_DOT_LOADING: &str = "#64748b";

#[component]
pub fn StatsBar(view: Signal<DashboardState>) -> Element {
    let summary = view.read().summary.clone();

    let (aqi, category, class, temperature, humidity) = match &summary {
        Some(s) => (
            format!("{}", s.aqi),
            s.category.clone(),
            s.category_class.unwrap_or(""),
            s.temperature.clone(),
            s.humidity.clone(),
        ),
        None => (
            "--".to_string(),
            "--".to_string(),
            "",
            "--°C".to_string(),
            "--%".to_string(),
        ),
    };

    let tile = "flex:1 1 160px; display:flex; flex-direction:column; gap:4px;";

    rsx! {
        div { style: "display:flex; gap:12px; flex-wrap:wrap;",
            div { class: "aw-panel", style: "{tile}",
                span { style: "color:#94a3b8; font-size:12px;", "Current AQI" }
                span { id: "currentAQI", class: "stat-value {class}", style: "font-size:28px; font-weight:800;", "{aqi}" }
            }
            div { class: "aw-panel", style: "{tile}",
                span { style: "color:#94a3b8; font-size:12px;", "Air Quality" }
                span { id: "aqiCategory", class: "stat-value {class}", style: "font-size:20px; font-weight:700;", "{category}" }
            }
            div { class: "aw-panel", style: "{tile}",
                span { style: "color:#94a3b8; font-size:12px;", "Temperature" }
                span { id: "temperature", style: "font-size:20px; font-weight:700;", "{temperature}" }
            }
            div { class: "aw-panel", style: "{tile}",
                span { style: "color:#94a3b8; font-size:12px;", "Humidity" }
                span { id: "humidity", style: "font-size:20px; font-weight:700;", "{humidity}" }
            }
        }
    }
}

#[component]
pub fn SensorCounterControls(view: Signal<DashboardState>) -> Element {
    let ctx = use_context::<DashboardCtx>();
    let counter = view.read().counter;

    let on_decrement = {
        let dashboard = ctx.dashboard.clone();
        move |_| {
            let dashboard = dashboard.clone();
            spawn(async move {
                if let Some(count) = dashboard.decrement().await {
                    log!("[AW] active sensors -> {count}");
                }
            });
        }
    };
    let on_increment = {
        let dashboard = ctx.dashboard.clone();
        move |_| {
            let dashboard = dashboard.clone();
            spawn(async move {
                if let Some(count) = dashboard.increment().await {
                    log!("[AW] active sensors -> {count}");
                }
            });
        }
    };

    let button = "width:34px; height:34px; border-radius:999px; border:1px solid #334155; \
                  background:#111827; color:#e5e7eb; font-size:18px; font-weight:800; cursor:pointer;";

    rsx! {
        div { style: "display:flex; align-items:center; justify-content:space-between; gap:12px; flex-wrap:wrap;",
            h2 { style: "margin:0; font-size:18px;", "Sensor Network" }
            div { style: "display:flex; align-items:center; gap:10px;",
                span { style: "color:#94a3b8; font-size:13px;", "Active sensors" }
                button {
                    id: "decrementSensors",
                    style: "{button}",
                    disabled: counter.at_min(),
                    title: "Minimum {MIN_SENSORS}",
                    onclick: on_decrement,
                    "−"
                }
                span { id: "sensorCount", style: "min-width:24px; text-align:center; font-weight:800;", "{counter.get()}" }
                button {
                    id: "incrementSensors",
                    style: "{button}",
                    disabled: counter.at_max(),
                    title: "Maximum {MAX_SENSORS}",
                    onclick: on_increment,
                    "+"
                }
            }
        }
    }
}

#[component]
pub fn SensorCards(view: Signal<DashboardState>) -> Element {
    let cards: Vec<Card> = view.read().cards.cards().to_vec();

    rsx! {
        div {
            id: "sensorGrid",
            style: "display:grid; grid-template-columns:repeat(auto-fill, minmax(240px, 1fr)); gap:14px;",
            for card in cards {
                SensorCard { key: "{card.key.dom_key()}", card: card.clone() }
            }
            if view.read().cards.is_empty() {
                div { style: "color:#94a3b8;", "No sensors registered." }
            }
        }
    }
}

#[component]
fn SensorCard(card: Card) -> Element {
    let ctx = use_context::<DashboardCtx>();
    let [aqi, no2, co, smoke] = card.display_values();
    let color = card.color();
    let category = card.category_label();
    let dot = if card.is_loading() {
        STATUS_DOT_LOADING
    } else {
        STATUS_DOT_ONLINE
    };
    let index = card.key.index;

    let on_open = {
        let dashboard = ctx.dashboard.clone();
        move |_| dashboard.open_insight(index)
    };
    let on_flip = {
        let dashboard = ctx.dashboard.clone();
        let key = card.key.clone();
        move |e: MouseEvent| {
            e.stop_propagation();
            dashboard.toggle_flip(&key);
        }
    };
    let on_flip_back = on_flip.clone();

    let flip_button = "margin-top:12px; padding:6px 10px; border-radius:999px; border:1px solid #334155; \
                       background:transparent; color:inherit; font-size:12px; cursor:pointer;";

    rsx! {
        div {
            class: if card.flipped { "sensor-card flipped" } else { "sensor-card" },
            "data-sensor-id": "{card.key.sensor_id}",
            "data-sensor-index": "{index}",
            onclick: on_open,

            div { class: "sensor-card-inner",
                // Front
                div { class: "sensor-card-face sensor-card-front",
                    div { style: "display:flex; align-items:center; justify-content:space-between; gap:8px;",
                        div {
                            h4 { style: "margin:0; font-size:15px;", "{card.key.sensor_id}" }
                            p { style: "margin:2px 0 0 0; color:#94a3b8; font-size:12px;", "{card.name}" }
                        }
                        span {
                            class: "sensor-status-badge {card.status()}",
                            style: "width:10px; height:10px; border-radius:999px; background:{dot};",
                        }
                    }
                    div { style: "margin-top:14px; color:#94a3b8; font-size:12px;", "Air Quality Index" }
                    div { style: "display:flex; align-items:baseline; gap:10px;",
                        span { style: "font-size:34px; font-weight:800; color:{color};", "{aqi}" }
                        span { style: "font-weight:700; color:{color};", "{category}" }
                    }
                    button { style: "{flip_button}", onclick: on_flip, "View Details" }
                }

                // Back
                div { class: "sensor-card-face sensor-card-back",
                    h4 { style: "margin:0 0 10px 0; font-size:15px;", "Pollutant Levels" }
                    div { style: "display:flex; flex-direction:column; gap:8px; font-size:13px;",
                        div { style: "display:flex; justify-content:space-between;",
                            span { "Nitrogen Dioxide" }
                            span { "{no2} ppb" }
                        }
                        div { style: "display:flex; justify-content:space-between;",
                            span { "Carbon Monoxide" }
                            span { "{co} ppm" }
                        }
                        div { style: "display:flex; justify-content:space-between;",
                            span { "Smoke Particles" }
                            span { "{smoke} µg/m³" }
                        }
                    }
                    button { style: "{flip_button}", onclick: on_flip_back, "Back to Overview" }
                }
            }
        }
    }
}
