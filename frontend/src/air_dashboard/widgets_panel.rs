use airwatch_shared::DashboardState;
use airwatch_shared::widgets::{HEATMAP_HOURS, HeatCell, MonthBar, PeakBar};
use dioxus::prelude::*;
use dioxus_signals::Signal;

#[component]
pub fn WidgetsPanel(view: Signal<DashboardState>) -> Element {
    let (peak, monthly, heat) = {
        let v = view.read();
        (
            v.widgets.peak_hours.clone(),
            v.widgets.monthly.clone(),
            v.widgets.heatmap.clone(),
        )
    };

    rsx! {
        div { style: "display:grid; grid-template-columns:repeat(auto-fit, minmax(300px, 1fr)); gap:14px;",
            PeakHours { bars: peak }
            MonthlyTrend { bars: monthly }
        }
        Heatmap { cells: heat }
    }
}

#[component]
fn PeakHours(bars: Vec<PeakBar>) -> Element {
    rsx! {
        div { class: "aw-panel",
            h3 { style: "margin:0 0 12px 0; font-size:15px;", "Peak Pollution Hours" }
            div { id: "peakHours", style: "display:flex; flex-direction:column; gap:8px;",
                for bar in bars.iter() {
                    div { style: "display:flex; align-items:center; gap:10px; font-size:12px;",
                        span { style: "width:44px; color:#94a3b8;", "{bar.time}" }
                        div { style: "flex:1; height:10px; border-radius:999px; background:rgba(148,163,184,0.2); overflow:hidden;",
                            div {
                                class: "peak-bar {bar.level.class()}",
                                style: "height:100%; width:{bar.percent}%; border-radius:999px;",
                            }
                        }
                        span { style: "width:36px; text-align:right;", "{bar.percent}%" }
                    }
                }
                if bars.is_empty() {
                    div { style: "color:#94a3b8; font-size:12px;", "Waiting for data" }
                }
            }
        }
    }
}

#[component]
fn MonthlyTrend(bars: Vec<MonthBar>) -> Element {
    rsx! {
        div { class: "aw-panel",
            h3 { style: "margin:0 0 12px 0; font-size:15px;", "Monthly Trend" }
            div { id: "monthlyChart", style: "display:flex; align-items:flex-end; justify-content:space-around; height:130px; gap:8px;",
                for bar in bars.iter() {
                    div { style: "display:flex; flex-direction:column; align-items:center; gap:4px;",
                        span { style: "font-size:11px; color:#94a3b8;", {format!("{:.0}", bar.value)} }
                        div {
                            style: {
                                let fill = if bar.active { "#22c55e" } else { "#38bdf8" };
                                format!("width:26px; height:{}px; border-radius:6px 6px 0 0; background:{fill};", bar.height_px)
                            },
                        }
                        span {
                            style: if bar.active { "font-size:11px; font-weight:800;" } else { "font-size:11px; color:#94a3b8;" },
                            "{bar.label}"
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn Heatmap(cells: Vec<HeatCell>) -> Element {
    rsx! {
        div { class: "aw-panel",
            h3 { style: "margin:0 0 12px 0; font-size:15px;", "Weekly Pollution Heatmap" }
            div {
                id: "heatmapGrid",
                style: "display:grid; grid-template-columns:repeat({HEATMAP_HOURS}, 1fr); gap:2px;",
                for cell in cells.iter() {
                    div {
                        key: "{cell.day}-{cell.hour}",
                        title: "{cell.title}",
                        style: "aspect-ratio:1; border-radius:2px; background:{cell.color}; opacity:{cell.intensity};",
                    }
                }
            }
        }
    }
}
