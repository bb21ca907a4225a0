// frontend/src/app.rs
//
// Routes, global stylesheet and the desktop-only Connect screen. The web build
// is served by the backend itself, so it always talks to its own origin.

use dioxus::prelude::*;
use dioxus_router::{Routable, Router};

#[cfg(not(target_arch = "wasm32"))]
use crate::air_dashboard::UrlConfig;
#[cfg(not(target_arch = "wasm32"))]
use dioxus_router::use_navigator;

// --- global css ---
const GLOBAL_CSS: &str = r#"
html, body {
    margin: 0;
    padding: 0;
    width: 100%;
    height: 100%;
    background: #020617;
    color: #e5e7eb;
    font-family: system-ui, -apple-system, BlinkMacSystemFont;
}

:root, html {
    color-scheme: dark;
}

html.light-mode {
    color-scheme: light;
}

html.light-mode body,
html.light-mode #main {
    background: #f1f5f9;
    color: #0f172a;
}

html.light-mode .aw-panel {
    background: #ffffff;
    border-color: #cbd5e1;
    color: #0f172a;
}

#main {
    width: 100%;
    min-height: 100%;
    background: #020617;
}

* { box-sizing: border-box; }

.aw-panel {
    background: #0b1220;
    border: 1px solid #334155;
    border-radius: 14px;
    padding: 16px;
}

.sensor-card { perspective: 900px; cursor: pointer; min-height: 190px; }
.sensor-card-inner {
    position: relative;
    width: 100%;
    height: 100%;
    min-height: 190px;
    transition: transform 0.5s;
    transform-style: preserve-3d;
}
.sensor-card.flipped .sensor-card-inner { transform: rotateY(180deg); }
.sensor-card-face {
    position: absolute;
    inset: 0;
    backface-visibility: hidden;
    border-radius: 14px;
    padding: 14px;
    border: 1px solid #334155;
    background: #0b1220;
}
.sensor-card-back { transform: rotateY(180deg); }
html.light-mode .sensor-card-face { background: #ffffff; border-color: #cbd5e1; }

.stat-value.excellent { color: #00E396; }
.stat-value.moderate { color: #FEB019; }
.stat-value.poor { color: #f05233; }

.peak-bar.success { background: #22c55e; }
.peak-bar.warning { background: #f59e0b; }
.peak-bar.danger { background: #ef4444; }

.terminal-line { font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; font-size: 12px; white-space: pre-wrap; }
.terminal-line.log-system { color: #38bdf8; }
.terminal-line.log-info { color: #cbd5e1; }
.terminal-line.log-success { color: #22c55e; }
.terminal-line.log-warning { color: #facc15; }
.terminal-line.log-error { color: #f87171; }

.aw-sidebar-overlay {
    position: fixed;
    inset: 0;
    background: rgba(0,0,0,0.5);
    z-index: 900;
}

@media (max-width: 900px) {
    .aw-sidebar { transform: translateX(-100%); transition: transform 0.25s; }
    .aw-sidebar.open { transform: translateX(0); }
    .aw-menu-button { display: inline-flex !important; }
}
"#;

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[route("/")]
    Root {},

    #[route("/dashboard")]
    Dashboard {},

    #[cfg(not(target_arch = "wasm32"))]
    #[route("/connect")]
    Connect {},
}

// -------------------------
// App
// -------------------------
#[component]
pub fn App() -> Element {
    rsx! {
        document::Style { "{GLOBAL_CSS}" }
        document::Meta { name: "viewport", content: "width=device-width, initial-scale=1" }

        document::Link {
            rel: "stylesheet",
            href: asset!("static/vendor/leaflet/leaflet.css"),
        }
        document::Script { src: asset!("static/vendor/leaflet/leaflet.js") }

        div {
            style: "min-height: 100vh; width: 100%;",
            Router::<Route> {}
        }
    }
}

#[component]
pub fn Root() -> Element {
    #[cfg(target_arch = "wasm32")]
    {
        return rsx! { Dashboard {} };
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let nav = use_navigator();

        use_effect(move || {
            if UrlConfig::stored_base_url().is_some() {
                let _ = nav.replace(Route::Dashboard {});
            } else {
                let _ = nav.replace(Route::Connect {});
            }
        });

        rsx! { div {} }
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn probe_backend(base: &str) -> String {
    let url = format!(
        "{base}{}",
        airwatch_shared::api::SIMULATION_STATUS_PATH
    );
    let client = match reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
    {
        Ok(c) => c,
        Err(e) => return format!("Could not build HTTP client: {e}"),
    };

    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => format!("OK  {url} ({})", resp.status()),
        Ok(resp) => format!("FAIL {url} ({})", resp.status()),
        Err(e) if e.is_timeout() => format!("FAIL {url} (timed out)"),
        Err(e) if e.is_connect() => format!("FAIL {url} (connection refused or host unreachable)"),
        Err(e) => format!("FAIL {url} ({e})"),
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[component]
pub fn Connect() -> Element {
    let nav = use_navigator();

    let initial = UrlConfig::stored_base_url().unwrap_or_else(UrlConfig::base_http);
    let mut url_edit = use_signal(|| initial);
    let mut test_status = use_signal(String::new);
    let mut testing = use_signal(|| false);

    rsx! {
        div {
            style: "height:100vh; display:flex; align-items:center; justify-content:center; background:#020617; color:#e5e7eb;",
            div {
                style: "width:min(720px, 94vw); padding:24px; border:1px solid #334155; border-radius:16px; background:#0b1220; box-shadow:0 12px 30px rgba(0,0,0,0.5);",

                h1 { style: "margin:0 0 12px 0; font-size:20px;", "AirWatch" }

                p { style: "margin:0 0 16px 0; color:#94a3b8;",
                    "Enter the backend URL (including http:// or https://). Example: ",
                    code { "http://localhost:8000" }
                }

                input {
                    style: "width:100%; padding:12px; border-radius:12px; border:1px solid #334155; background:#020617; color:#e5e7eb; outline:none;",
                    value: "{url_edit()}",
                    oninput: move |evt| {
                        url_edit.set(evt.value());
                        test_status.set(String::new());
                    },
                }

                if !test_status().is_empty() {
                    pre {
                        style: "margin:14px 0 0 0; padding:12px; border-radius:12px; border:1px solid #334155; background:#020617; color:#cbd5e1; font-size:12px; white-space:pre-wrap;",
                        "{test_status()}"
                    }
                }

                div { style: "display:flex; gap:12px; margin-top:16px; justify-content:flex-end; flex-wrap:wrap;",
                    button {
                        style: "padding:10px 14px; border-radius:12px; border:1px solid #334155; background:#0f172a; color:#e5e7eb; cursor:pointer;",
                        disabled: testing(),
                        onclick: move |_| {
                            let base = crate::air_dashboard::normalize_base_url(url_edit().trim().to_string());
                            if base.is_empty() {
                                test_status.set("Enter a URL first.".to_string());
                                return;
                            }
                            testing.set(true);
                            test_status.set("Testing connection...".to_string());
                            spawn(async move {
                                let report = probe_backend(&base).await;
                                testing.set(false);
                                test_status.set(report);
                            });
                        },
                        if testing() { "Testing..." } else { "Test Connection" }
                    }

                    button {
                        style: "padding:10px 14px; border-radius:12px; border:1px solid #334155; background:#111827; color:#e5e7eb; cursor:pointer;",
                        onclick: move |_| {
                            let base = crate::air_dashboard::normalize_base_url(url_edit().trim().to_string());
                            if !(base.starts_with("http://") || base.starts_with("https://")) {
                                test_status.set("URL must start with http:// or https://".to_string());
                                return;
                            }
                            UrlConfig::set_base_url_and_persist(base);
                            let _ = nav.replace(Route::Dashboard {});
                        },
                        "Connect"
                    }
                }
            }
        }
    }
}

#[component]
pub fn Dashboard() -> Element {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if UrlConfig::stored_base_url().is_none() {
            return rsx! {
                div {
                    style: "height:100vh; display:flex; align-items:center; justify-content:center; background:#020617; color:#e5e7eb;",
                    div {
                        style: "width:min(560px, 92vw); padding:24px; border:1px solid #334155; border-radius:16px; background:#0b1220;",
                        h1 { style: "margin:0 0 12px 0; font-size:18px;", "Not connected" }
                        p { style: "margin:0; color:#94a3b8;", "Please configure the backend URL on the Connect screen." }
                    }
                }
            };
        }
    }

    rsx! { crate::air_dashboard::AirDashboard {} }
}
