// frontend/src/air_dashboard/mod.rs

macro_rules! log {
    ($($t:tt)*) => {{
        let s = format!($($t)*);
        crate::air_dashboard::log(&s);
    }}
}

mod analytics_chart;
mod blog_panel;
mod insight_modal;
mod map_overlay;
mod notifications_tray;
mod sensor_cards;
mod terminal_panel;
mod transport;
mod widgets_panel;

use std::rc::Rc;

use airwatch_shared::config::{ACTIVE_SENSOR_COUNT_KEY, PollSchedule, SENSOR_REGISTRY_KEY};
use airwatch_shared::counter::SensorCounter;
use airwatch_shared::theme::{THEME_STORAGE_KEY, Theme};
use airwatch_shared::{Dashboard, DashboardEvent, DashboardState, SensorRegistry};
use dioxus::prelude::*;
use dioxus_signals::Signal;

use analytics_chart::AnalyticsChart;
use blog_panel::BlogPanel;
use insight_modal::InsightModal;
use map_overlay::MapOverlay;
use notifications_tray::NotificationsTray;
use sensor_cards::{SensorCards, SensorCounterControls, StatsBar};
use terminal_panel::TerminalPanel;
use transport::HttpTransport;
use widgets_panel::WidgetsPanel;

// ----------------------------
// Cross-platform persistence
//  - wasm32: localStorage
//  - native: JSON file in app data dir
// ----------------------------
mod persist {
    pub fn get_string(key: &str) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            use web_sys::window;
            let w = window()?;
            let ls = w.local_storage().ok()??;
            return ls.get_item(key).ok().flatten();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            native::get_string(key).ok().flatten()
        }
    }

    pub fn set_string(key: &str, value: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            use web_sys::window;
            if let Some(w) = window() {
                if let Ok(Some(ls)) = w.local_storage() {
                    let _ = ls.set_item(key, value);
                }
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Err(e) = native::set_string(key, value) {
                log!("[persist] failed to write {key}: {e}");
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    mod native {
        use std::collections::HashMap;
        use std::io;

        fn storage_path() -> std::path::PathBuf {
            let mut base = dirs::data_local_dir()
                .or_else(dirs::data_dir)
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| ".".into()));
            base.push("airwatch");
            base.push("storage.json");
            base
        }

        fn load_map() -> Result<HashMap<String, String>, io::Error> {
            let bytes = match std::fs::read(storage_path()) {
                Ok(b) => b,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
                Err(e) => return Err(e),
            };
            Ok(serde_json::from_slice(&bytes).unwrap_or_default())
        }

        fn save_map(map: &HashMap<String, String>) -> Result<(), io::Error> {
            let path = storage_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let bytes = serde_json::to_vec_pretty(map).map_err(io::Error::other)?;
            std::fs::write(path, bytes)
        }

        pub fn get_string(key: &str) -> Result<Option<String>, io::Error> {
            Ok(load_map()?.get(key).cloned())
        }

        pub fn set_string(key: &str, value: &str) -> Result<(), io::Error> {
            let mut map = load_map()?;
            map.insert(key.to_string(), value.to_string());
            save_map(&map)
        }
    }
}

const BASE_URL_STORAGE_KEY: &str = "aw_base_url";

pub fn normalize_base_url(mut url: String) -> String {
    if let Some(idx) = url.find('#') {
        url.truncate(idx);
    }
    if let Some(scheme_end) = url.find("://") {
        let rest = &url[scheme_end + 3..];
        if let Some(slash) = rest.find('/') {
            url.truncate(scheme_end + 3 + slash);
        }
    }
    url.trim_end_matches('/').to_string()
}

/// Absolute URL for a backend path (links rendered into the page).
pub fn abs_http(path: &str) -> String {
    let base = UrlConfig::base_http();
    if base.is_empty() {
        path.to_string()
    } else {
        format!("{base}{path}")
    }
}

// ---------- Base URL config ----------
pub struct UrlConfig;

impl UrlConfig {
    #[cfg(not(target_arch = "wasm32"))]
    pub const DESKTOP_DEFAULT: &'static str = "http://localhost:8000";

    pub fn set_base_url_and_persist(url: String) {
        let clean = normalize_base_url(url);
        *BASE_URL.write() = clean.clone();
        persist::set_string(BASE_URL_STORAGE_KEY, &clean);
    }

    pub fn stored_base_url() -> Option<String> {
        persist::get_string(BASE_URL_STORAGE_KEY)
            .map(normalize_base_url)
            .filter(|s| !s.trim().is_empty())
    }

    /// Empty on the web when no override is stored: requests go same-origin.
    pub fn base_http() -> String {
        let base = Self::stored_base_url().unwrap_or_else(|| BASE_URL.read().clone());

        #[cfg(not(target_arch = "wasm32"))]
        if base.is_empty() {
            return Self::DESKTOP_DEFAULT.to_string();
        }

        base
    }
}

static BASE_URL: GlobalSignal<String> = Signal::global(String::new);

/// Count broadcast after every sensor-count change; the map overlay listens.
static SENSOR_COUNT_BROADCAST: GlobalSignal<Option<u8>> = Signal::global(|| None);

pub type Controller = Rc<Dashboard<HttpTransport>>;

/// Shared with every panel through context.
#[derive(Clone)]
pub struct DashboardCtx {
    pub dashboard: Controller,
    pub schedule: PollSchedule,
}

// ---------- startup configuration ----------

fn load_registry() -> SensorRegistry {
    #[cfg(target_arch = "wasm32")]
    let raw = js_read_window_json("sensors");
    #[cfg(not(target_arch = "wasm32"))]
    let raw = persist::get_string(SENSOR_REGISTRY_KEY);

    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        log!("[AW] no sensor registry supplied (window.sensors / {SENSOR_REGISTRY_KEY})");
        return SensorRegistry::default();
    };

    match SensorRegistry::from_json(&raw) {
        Ok(reg) => reg,
        Err(e) => {
            log!("[AW] sensor registry rejected: {e}");
            SensorRegistry::default()
        }
    }
}

fn initial_counter() -> SensorCounter {
    #[cfg(target_arch = "wasm32")]
    let raw = js_read_window_json("activeSensorCount");
    #[cfg(not(target_arch = "wasm32"))]
    let raw = persist::get_string(ACTIVE_SENSOR_COUNT_KEY);

    SensorCounter::from_stored(raw.as_deref())
}

fn poll_schedule() -> PollSchedule {
    let schedule = PollSchedule::from_lookup(persist::get_string);

    #[cfg(not(target_arch = "wasm32"))]
    let schedule = schedule.with_env(|k| std::env::var(k).ok());

    schedule
}

/// Local wall-clock milliseconds (UTC shifted by the local offset).
fn local_wall_ms() -> i64 {
    #[cfg(target_arch = "wasm32")]
    {
        let d = js_sys::Date::new_0();
        (d.get_time() - d.get_timezone_offset() * 60_000.0) as i64
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        chrono::Local::now().naive_local().and_utc().timestamp_millis()
    }
}

async fn sleep_ms(ms: u32) {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::TimeoutFuture::new(ms).await;

    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(std::time::Duration::from_millis(ms as u64)).await;
}

/// Runs the log tail for `generation` until it is superseded or stopped.
pub fn spawn_log_tail(ctx: &DashboardCtx, generation: Option<u64>) {
    let Some(generation) = generation else {
        return;
    };
    let dashboard = ctx.dashboard.clone();
    let every = ctx.schedule.log_tail_ms();
    log!("[AW] log tail armed (gen={generation}, every {every} ms)");

    spawn(async move {
        while dashboard.tail_is_current(generation) {
            dashboard.fetch_logs().await;
            sleep_ms(every).await;
        }
        log!("[AW] log tail gen={generation} ended");
    });
}

/// Blocking alert (blog form results).
pub fn show_alert(message: &str) {
    log!("[AW] alert: {message}");
    let quoted = serde_json::to_string(message).unwrap_or_else(|_| "\"\"".to_string());
    js_eval(&format!("window.alert({quoted});"));
}

fn apply_theme_class(theme: Theme) {
    let on = theme.root_class().is_some();
    js_eval(&format!(
        r#"
        (function() {{
          try {{ document.documentElement.classList.toggle("light-mode", {on}); }} catch (e) {{}}
        }})();
        "#
    ));
}

// ---------- Dashboard ----------
#[component]
pub fn AirDashboard() -> Element {
    let ctx = use_hook(|| {
        let registry = load_registry();
        let counter = initial_counter();
        let theme = Theme::from_stored(persist::get_string(THEME_STORAGE_KEY).as_deref());
        log!(
            "[AW] dashboard mounted: {} sensors registered, {} active",
            registry.len(),
            counter.get()
        );

        let state = DashboardState::new(registry, counter, theme);
        DashboardCtx {
            dashboard: Rc::new(Dashboard::new(HttpTransport::new(), state, local_wall_ms)),
            schedule: poll_schedule(),
        }
    });

    let view = use_signal(|| ctx.dashboard.with_state(Clone::clone));

    // Mirror every state change into the view signal
    {
        let dashboard = ctx.dashboard.clone();
        use_hook(move || {
            dashboard.subscribe(move |event, state| {
                let mut view = view;
                view.set(state.clone());

                match event {
                    DashboardEvent::SensorCountChanged { count } => {
                        *SENSOR_COUNT_BROADCAST.write() = Some(*count);
                        persist::set_string(ACTIVE_SENSOR_COUNT_KEY, &count.to_string());
                    }
                    DashboardEvent::ThemeChanged(theme) => {
                        persist::set_string(THEME_STORAGE_KEY, theme.as_str());
                    }
                    _ => {}
                }
            });
        });
    }
    use_context_provider(|| ctx.clone());

    // Theme class on the document root
    use_effect(move || apply_theme_class(view.read().theme));

    // Summary stats: immediately, then on the fixed cadence
    {
        let dashboard = ctx.dashboard.clone();
        let every = ctx.schedule.summary_ms();
        use_future(move || {
            let dashboard = dashboard.clone();
            async move {
                loop {
                    let d = dashboard.clone();
                    spawn(async move {
                        d.refresh_summary().await;
                    });
                    sleep_ms(every).await;
                }
            }
        });
    }

    // Sensor readings. Overlapping polls are allowed; stale completions are dropped.
    {
        let dashboard = ctx.dashboard.clone();
        let every = ctx.schedule.readings_ms();
        use_future(move || {
            let dashboard = dashboard.clone();
            async move {
                loop {
                    let d = dashboard.clone();
                    spawn(async move {
                        d.refresh_readings().await;
                    });
                    sleep_ms(every).await;
                }
            }
        });
    }

    // Blog feed and the simulation status, once
    {
        let ctx = ctx.clone();
        use_future(move || {
            let ctx = ctx.clone();
            async move {
                ctx.dashboard.load_posts().await;
                let generation = ctx.dashboard.check_simulation_status().await;
                spawn_log_tail(&ctx, generation);
            }
        });
    }

    let mut sidebar_open = use_signal(|| false);
    let theme = view.read().theme;
    let theme_label = if theme.is_light() { "☾ Dark" } else { "☀ Light" };

    let on_toggle_theme = {
        let dashboard = ctx.dashboard.clone();
        move |_| {
            let theme = dashboard.toggle_theme();
            log!("[AW] theme -> {}", theme.as_str());
        }
    };
    let on_toggle_panel = {
        let ctx = ctx.clone();
        move |_| {
            let ctx = ctx.clone();
            spawn(async move {
                let generation = ctx.dashboard.toggle_panel().await;
                spawn_log_tail(&ctx, generation);
            });
        }
    };

    let header_button = "padding:0.45rem 0.85rem; border-radius:0.75rem; border:1px solid #334155; \
                         background:#111827; color:#e5e7eb; font-weight:700; cursor:pointer;";

    rsx! {
        div { style: "display:flex; min-height:100vh;",

            if sidebar_open() {
                div { class: "aw-sidebar-overlay", onclick: move |_| sidebar_open.set(false) }
            }

            // Sidebar
            nav {
                class: if sidebar_open() { "aw-sidebar open" } else { "aw-sidebar" },
                style: "position:sticky; top:0; align-self:flex-start; width:220px; height:100vh; \
                        padding:20px 14px; background:#0b1220; border-right:1px solid #1f2937; \
                        display:flex; flex-direction:column; gap:10px; z-index:1000;",
                h2 { style: "margin:0 0 12px 0; color:#22c55e; font-size:20px;", "AirWatch" }
                a { href: "#overview", style: "color:inherit; text-decoration:none;", onclick: move |_| sidebar_open.set(false), "Overview" }
                a { href: "#sensors", style: "color:inherit; text-decoration:none;", onclick: move |_| sidebar_open.set(false), "Sensors" }
                a { href: "#map", style: "color:inherit; text-decoration:none;", onclick: move |_| sidebar_open.set(false), "Map" }
                a { href: "#analytics", style: "color:inherit; text-decoration:none;", onclick: move |_| sidebar_open.set(false), "Analytics" }
                a { href: "#blog", style: "color:inherit; text-decoration:none;", onclick: move |_| sidebar_open.set(false), "Blog" }

                div { style: "margin-top:auto; display:flex; align-items:center; gap:8px; color:#94a3b8; font-size:13px;",
                    label { r#for: "aw-theme-switch", "Light mode" }
                    input {
                        id: "aw-theme-switch",
                        r#type: "checkbox",
                        checked: theme.is_light(),
                        onchange: {
                            let dashboard = ctx.dashboard.clone();
                            move |_| {
                                dashboard.toggle_theme();
                            }
                        },
                    }
                }
            }

            // Main column
            div { style: "flex:1; min-width:0; padding:24px; display:flex; flex-direction:column; gap:18px;",

                header {
                    id: "overview",
                    style: "display:flex; align-items:center; justify-content:space-between; gap:16px; flex-wrap:wrap;",
                    div { style: "display:flex; align-items:center; gap:12px;",
                        button {
                            class: "aw-menu-button",
                            style: "{header_button} display:none;",
                            onclick: move |_| {
                                let next = !sidebar_open();
                                sidebar_open.set(next);
                            },
                            "☰"
                        }
                        h1 { style: "margin:0; font-size:22px; font-weight:800;", "Air Quality Dashboard" }
                    }
                    div { style: "display:flex; align-items:center; gap:10px; flex-wrap:wrap;",
                        NotificationsTray { view: view }
                        button { style: "{header_button}", onclick: on_toggle_theme, "{theme_label}" }
                        button { style: "{header_button}", onclick: on_toggle_panel, "Simulator" }
                    }
                }

                StatsBar { view: view }

                section { id: "sensors", style: "display:flex; flex-direction:column; gap:12px;",
                    SensorCounterControls { view: view }
                    SensorCards { view: view }
                }

                section { id: "map",
                    MapOverlay { view: view }
                }

                section { id: "analytics", style: "display:flex; flex-direction:column; gap:12px;",
                    AnalyticsChart { view: view }
                    WidgetsPanel { view: view }
                }

                section { id: "blog",
                    BlogPanel { view: view }
                }
            }

            TerminalPanel { view: view }
            InsightModal { view: view }
        }
    }
}

// ---------- Web vs Native logging ----------
pub(crate) fn log(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&msg.into());

    #[cfg(not(target_arch = "wasm32"))]
    println!("{msg}");
}

// --------------------------------------------------------------------------------------------
// JS helpers
// --------------------------------------------------------------------------------------------

/// `JSON.stringify(window[key])`, or `None` when undefined.
#[cfg(target_arch = "wasm32")]
fn js_read_window_json(key: &str) -> Option<String> {
    js_eval(&format!(
        r#"
        (function() {{
          try {{
            const v = window[{key:?}];
            window.__aw_tmp_str = (v === undefined || v === null) ? "" : JSON.stringify(v);
          }} catch (e) {{
            window.__aw_tmp_str = "";
          }}
        }})();
        "#
    ));

    js_get_tmp_str().filter(|s| !s.is_empty())
}

#[cfg(target_arch = "wasm32")]
fn js_eval(js: &str) {
    let _ = js_sys::eval(js);
}

#[cfg(not(target_arch = "wasm32"))]
fn js_eval(js: &str) {
    dioxus::document::eval(js);
}

#[cfg(target_arch = "wasm32")]
fn js_get_tmp_str() -> Option<String> {
    let win = web_sys::window()?;
    let v = js_sys::Reflect::get(&win, &wasm_bindgen::JsValue::from_str("__aw_tmp_str")).ok()?;
    v.as_string()
}
