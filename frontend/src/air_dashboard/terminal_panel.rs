use airwatch_shared::DashboardState;
use dioxus::prelude::*;

use super::{DashboardCtx, js_eval, spawn_log_tail};

#[component]
pub fn TerminalPanel(view: Signal<DashboardState>) -> Element {
    let ctx = use_context::<DashboardCtx>();
    let panel = view.read().simulation.clone();

    // Keep the newest line in view
    use_effect(move || {
        let _lines = view.read().simulation.lines.len();
        js_eval(
            r#"
            (function() {
              const el = document.getElementById("terminalOutput");
              if (el) { el.scrollTop = el.scrollHeight; }
            })();
            "#,
        );
    });

    if !panel.open {
        return rsx! {};
    }

    let on_start = {
        let ctx = ctx.clone();
        move |_| {
            let ctx = ctx.clone();
            spawn(async move {
                let generation = ctx.dashboard.start_simulation().await;
                spawn_log_tail(&ctx, generation);
            });
        }
    };
    let on_stop = {
        let dashboard = ctx.dashboard.clone();
        move |_| {
            let dashboard = dashboard.clone();
            spawn(async move { dashboard.stop_simulation().await });
        }
    };
    let on_reset = {
        let dashboard = ctx.dashboard.clone();
        move |_| {
            let dashboard = dashboard.clone();
            spawn(async move { dashboard.reset_simulation().await });
        }
    };
    let on_close = {
        let dashboard = ctx.dashboard.clone();
        move |_| dashboard.close_panel()
    };

    let button = |border: &str, bg: &str, fg: &str| {
        format!(
            "padding:0.45rem 0.85rem; border-radius:0.75rem; border:1px solid {border}; \
             background:{bg}; color:{fg}; font-weight:800; cursor:pointer;"
        )
    };
    let close_style = button("#334155", "transparent", "#e5e7eb");
    let start_style = button("#22c55e", "#022c22", "#bbf7d0");
    let stop_style = button("#ef4444", "#450a0a", "#fecaca");
    let reset_style = button("#a78bfa", "#1e1b4b", "#ddd6fe");

    rsx! {
        aside {
            id: "simulationPanel",
            style: "position:fixed; top:0; right:0; bottom:0; width:min(460px, 100vw); z-index:8000; \
                    background:#020617; border-left:1px solid #334155; padding:16px; \
                    display:flex; flex-direction:column; gap:12px; box-shadow:-10px 0 25px rgba(0,0,0,0.45);",
            div { style: "display:flex; align-items:center; justify-content:space-between;",
                h2 { style: "margin:0; font-size:18px; color:#38bdf8;", "Environment Simulator" }
                button { style: "{close_style}", onclick: on_close, "✕" }
            }

            div { style: "display:flex; gap:8px; flex-wrap:wrap;",
                button {
                    id: "startSimulation",
                    style: "{start_style}",
                    disabled: !panel.start_enabled,
                    onclick: on_start,
                    "START"
                }
                button {
                    id: "stopSimulation",
                    style: "{stop_style}",
                    disabled: !panel.stop_enabled,
                    onclick: on_stop,
                    "STOP"
                }
                button {
                    id: "resetSimulation",
                    style: "{reset_style}",
                    onclick: on_reset,
                    "RESET"
                }
                if panel.tail.is_polling() {
                    span { style: "margin-left:auto; align-self:center; color:#22c55e; font-size:12px;", "● live" }
                }
            }

            div {
                id: "terminalOutput",
                style: "flex:1; min-height:0; overflow-y:auto; padding:12px; border-radius:12px; \
                        border:1px solid #1f2937; background:#000; display:flex; flex-direction:column; gap:2px;",
                for line in panel.lines.iter() {
                    div { class: "{line.css_class()}",
                        if let Some(ts) = &line.timestamp {
                            span { style: "color:#64748b;", "[{ts}] " }
                        }
                        span { "[{line.level}] {line.message}" }
                    }
                }
            }
        }
    }
}
