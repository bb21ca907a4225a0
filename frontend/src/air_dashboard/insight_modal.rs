use airwatch_shared::DashboardState;
use airwatch_shared::analytics::SensorInsight;
use airwatch_shared::simulation::clock_label;
use dioxus::prelude::*;
use dioxus_signals::Signal;

use super::DashboardCtx;

const TREND_W: f64 = 640.0;
const TREND_H: f64 = 180.0;
const TREND_PAD: f64 = 24.0;

fn trend_points(trend: &[(String, f64)]) -> (String, f64) {
    let y_max = trend
        .iter()
        .map(|(_, v)| *v)
        .fold(50.0_f64, f64::max)
        .max(1.0);
    let step = (TREND_W - TREND_PAD * 2.0) / (trend.len().max(2) - 1) as f64;
    let inner_h = TREND_H - TREND_PAD * 2.0;

    let points = trend
        .iter()
        .enumerate()
        .map(|(i, (_, v))| {
            let x = TREND_PAD + step * i as f64;
            let y = TREND_PAD + inner_h - (v / y_max) * inner_h;
            format!("{x:.1},{y:.1}")
        })
        .collect::<Vec<_>>()
        .join(" ");
    (points, y_max)
}

#[component]
pub fn InsightModal(view: Signal<DashboardState>) -> Element {
    let ctx = use_context::<DashboardCtx>();
    let Some(insight) = view.read().insight.clone() else {
        return rsx! {};
    };
    let colors = view.read().theme.chart_colors();

    let SensorInsight {
        sensor_id,
        name,
        current,
        aqi_color: aqi_fill,
        trend,
        activity,
        ..
    } = insight;
    let [aqi, no2, co, smoke] = current;
    let (points, y_max) = trend_points(&trend);
    let first_label = trend.first().map(|(l, _)| l.clone()).unwrap_or_default();
    let last_label = trend.last().map(|(l, _)| l.clone()).unwrap_or_default();

    let on_close = {
        let dashboard = ctx.dashboard.clone();
        move |_| dashboard.close_insight()
    };
    let on_backdrop = on_close.clone();

    rsx! {
        div {
            style: "position:fixed; inset:0; z-index:9000; background:rgba(2,6,23,0.75); display:flex; align-items:center; justify-content:center; padding:16px;",
            onclick: on_backdrop,
            div {
                class: "aw-panel",
                style: "width:min(760px, 96vw); max-height:92vh; overflow:auto; display:flex; flex-direction:column; gap:14px;",
                onclick: move |e| e.stop_propagation(),

                div { style: "display:flex; align-items:center; justify-content:space-between; gap:12px;",
                    div {
                        h2 { style: "margin:0; font-size:18px;", "{sensor_id} Analytics" }
                        p { style: "margin:2px 0 0 0; color:#94a3b8; font-size:13px;", "{name}" }
                    }
                    button {
                        style: "padding:6px 12px; border-radius:999px; border:1px solid #334155; background:transparent; color:inherit; cursor:pointer;",
                        onclick: on_close,
                        "✕"
                    }
                }

                div { style: "display:grid; grid-template-columns:repeat(4, 1fr); gap:10px;",
                    for (label, value, unit) in [("AQI", aqi.clone(), ""), ("NO₂", no2, " ppb"), ("CO", co, " ppm"), ("Smoke", smoke, " µg/m³")] {
                        div { style: "padding:10px; border:1px solid #334155; border-radius:10px;",
                            div { style: "color:#94a3b8; font-size:12px;", "{label}" }
                            div {
                                style: if label == "AQI" { format!("font-size:20px; font-weight:800; color:{aqi_fill};") } else { "font-size:20px; font-weight:800;".to_string() },
                                "{value}{unit}"
                            }
                        }
                    }
                }

                div {
                    div { style: "color:#94a3b8; font-size:12px; margin-bottom:4px;", "24-hour AQI trend" }
                    svg {
                        style: "width:100%; height:auto; display:block;",
                        view_box: "0 0 {TREND_W} {TREND_H}",
                        line { x1:"{TREND_PAD}", y1:"{TREND_H - TREND_PAD}", x2:"{TREND_W - TREND_PAD}", y2:"{TREND_H - TREND_PAD}", stroke:"{colors.grid}", stroke_width:"1" }
                        line { x1:"{TREND_PAD}", y1:"{TREND_PAD}", x2:"{TREND_PAD}", y2:"{TREND_H - TREND_PAD}", stroke:"{colors.grid}", stroke_width:"1" }
                        text { x:"2", y:"{TREND_PAD}", fill:"{colors.text}", "font-size":"10", {format!("{y_max:.0}")} }
                        text { x:"{TREND_PAD}", y:"{TREND_H - 6.0}", fill:"{colors.text}", "font-size":"10", "{first_label}" }
                        text { x:"{TREND_W - TREND_PAD - 30.0}", y:"{TREND_H - 6.0}", fill:"{colors.text}", "font-size":"10", "{last_label}" }
                        polyline {
                            points: "{points}",
                            fill: "none",
                            stroke: "{aqi_fill}",
                            stroke_width: "2",
                            stroke_linejoin: "round",
                        }
                    }
                }

                div {
                    div { style: "color:#94a3b8; font-size:12px; margin-bottom:6px;", "Recent activity" }
                    for entry in activity.iter() {
                        div { style: "display:flex; gap:10px; font-size:13px; padding:4px 0;",
                            span { style: "color:#94a3b8; font-family:ui-monospace, monospace;", "{clock_label(entry.timestamp_ms)}" }
                            span { "{entry.message}" }
                        }
                    }
                }
            }
        }
    }
}
