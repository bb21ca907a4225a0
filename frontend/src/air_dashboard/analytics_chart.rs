use airwatch_shared::DashboardState;
use airwatch_shared::analytics::{
    ChartKind, HISTORY_LEN, PlotArea, SensorFilter, SeriesShape, series_shape, y_axis_max,
};
use airwatch_shared::theme::series_color;
use dioxus::prelude::*;
use dioxus_signals::Signal;

use super::DashboardCtx;

struct PlottedSeries {
    label: String,
    color: &'static str,
    shape: SeriesShape,
}

#[component]
pub fn AnalyticsChart(view: Signal<DashboardState>) -> Element {
    let ctx = use_context::<DashboardCtx>();

    let view_w = 1200.0_f64;
    let view_h = 320.0_f64;
    let left = 60.0_f64;
    let right = view_w - 20.0_f64;
    let pad_top = 20.0_f64;
    let pad_bottom = 28.0_f64;
    let inner_w = right - left;
    let inner_h = view_h - pad_top - pad_bottom;
    let grid_x_step = inner_w / 6.0_f64;
    let grid_y_step = inner_h / 5.0_f64;
    let area = PlotArea {
        left,
        top: pad_top,
        width: inner_w,
        height: inner_h,
    };

    let (kind, filter_value, colors, options, plotted, y_max) = {
        let v = view.read();
        let visible = v.chart.visible(&v.history, v.count());
        let y_max = y_axis_max(&visible);
        let slots = visible.len();
        let plotted: Vec<PlottedSeries> = visible
            .iter()
            .enumerate()
            .map(|(slot, s)| PlottedSeries {
                label: format!("{} ({})", s.sensor_id, s.name),
                color: series_color(s.index.saturating_sub(1) as usize),
                shape: series_shape(s, v.chart.kind, area, y_max, slot, slots),
            })
            .collect();
        let options: Vec<(String, String)> = v
            .registry
            .active(v.count())
            .map(|d| (d.index.to_string(), format!("{} - {}", d.id, d.name)))
            .collect();
        (
            v.chart.kind,
            v.chart.filter.value(),
            v.theme.chart_colors(),
            options,
            plotted,
            y_max,
        )
    };
    let y_mid = y_max * 0.5;
    let toggle_label = match kind {
        ChartKind::Line => "Bar view",
        ChartKind::Bar => "Line view",
    };

    let on_toggle_kind = {
        let dashboard = ctx.dashboard.clone();
        move |_| {
            dashboard.toggle_chart_kind();
        }
    };
    let on_filter = {
        let dashboard = ctx.dashboard.clone();
        move |e: FormEvent| dashboard.set_chart_filter(SensorFilter::parse(&e.value()))
    };

    let control = "padding:6px 12px; border-radius:999px; border:1px solid #334155; \
                   background:#111827; color:#e5e7eb; font-size:0.85rem; cursor:pointer;";

    rsx! {
        div { class: "aw-panel", style: "display:flex; flex-direction:column; gap:8px;",
            div { style: "display:flex; align-items:center; justify-content:space-between; gap:12px; flex-wrap:wrap;",
                h3 { style: "margin:0; font-size:15px;", "AQI History" }
                div { style: "display:flex; gap:8px; flex-wrap:wrap;",
                    select {
                        id: "sensorFilter",
                        style: "{control}",
                        value: "{filter_value}",
                        onchange: on_filter,
                        option { value: "all", "All sensors" }
                        for (value, label) in options.iter() {
                            option { value: "{value}", "{label}" }
                        }
                    }
                    button { style: "{control}", onclick: on_toggle_kind, "{toggle_label}" }
                }
            }

            svg {
                style: "width:100%; height:auto; display:block;",
                view_box: "0 0 {view_w} {view_h}",

                // gridlines
                for i in 1..=4 {
                    line {
                        x1:"{left}", y1:"{pad_top + grid_y_step * (i as f64)}",
                        x2:"{right}", y2:"{pad_top + grid_y_step * (i as f64)}",
                        stroke:"{colors.grid}", "stroke-width":"1"
                    }
                }
                for i in 1..=5 {
                    line {
                        x1:"{left + grid_x_step * (i as f64)}", y1:"{pad_top}",
                        x2:"{left + grid_x_step * (i as f64)}", y2:"{view_h - pad_bottom}",
                        stroke:"{colors.grid}", "stroke-width":"1"
                    }
                }

                // axes
                line { x1:"{left}", y1:"{pad_top}", x2:"{left}", y2:"{view_h - pad_bottom}", stroke:"{colors.grid}", stroke_width:"1" }
                line { x1:"{left}", y1:"{view_h - pad_bottom}", x2:"{right}", y2:"{view_h - pad_bottom}", stroke:"{colors.grid}", stroke_width:"1" }

                // y labels
                text { x:"10", y:"{pad_top + 6.0}", fill:"{colors.text}", "font-size":"11", {format!("{y_max:.0}")} }
                text { x:"10", y:"{pad_top + inner_h / 2.0 + 4.0}", fill:"{colors.text}", "font-size":"11", {format!("{y_mid:.0}")} }
                text { x:"10", y:"{view_h - pad_bottom + 4.0}", fill:"{colors.text}", "font-size":"11", "0" }

                // x labels (poll slots, newest right)
                text { x:"{left + 4.0}", y:"{view_h - 8.0}", fill:"{colors.text}", "font-size":"11", {format!("-{HISTORY_LEN} polls")} }
                text { x:"{right - 30.0}", y:"{view_h - 8.0}", fill:"{colors.text}", "font-size":"11", "now" }

                for series in plotted.iter() {
                    match &series.shape {
                        SeriesShape::Polyline(points) => rsx! {
                            if !points.is_empty() {
                                polyline {
                                    points: "{points}",
                                    fill: "none",
                                    stroke: "{series.color}",
                                    stroke_width: "2",
                                    stroke_linejoin: "round",
                                    stroke_linecap: "round",
                                }
                            }
                        },
                        SeriesShape::Bars(bars) => rsx! {
                            for (x, y, w, h) in bars.iter() {
                                rect { x: "{x}", y: "{y}", width: "{w}", height: "{h}", fill: "{series.color}", opacity: "0.85" }
                            }
                        },
                    }
                }
            }

            if plotted.is_empty() {
                div { style: "color:#94a3b8; font-size:12px;", "Waiting for readings..." }
            } else {
                div { style: "display:flex; flex-wrap:wrap; gap:8px; padding:6px 10px; border:1px solid #1f2937; border-radius:10px;",
                    for series in plotted.iter() {
                        div { style: "display:flex; align-items:center; gap:6px; font-size:12px; color:{colors.text};",
                            svg { width:"26", height:"8", view_box:"0 0 26 8",
                                line { x1:"1", y1:"4", x2:"25", y2:"4", stroke:"{series.color}", stroke_width:"2", stroke_linecap:"round" }
                            }
                            "{series.label}"
                        }
                    }
                }
            }
        }
    }
}
