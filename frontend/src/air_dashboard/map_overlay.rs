// frontend/src/air_dashboard/map_overlay.rs

use airwatch_shared::DashboardState;
use airwatch_shared::widgets::MarkerStyle;
use dioxus::prelude::*;
use dioxus_signals::{ReadableExt, Signal, WritableExt};
use serde::Serialize;

use super::{SENSOR_COUNT_BROADCAST, js_eval, persist};

const RESIZE_DEBOUNCE_MS: u64 = 250;
const FULLSCREEN_REINIT_DELAY_MS: u64 = 80;

const TILES_STORAGE_KEY: &str = "aw_map_tiles_url";
const DEFAULT_TILES: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

fn tiles_url() -> String {
    persist::get_string(TILES_STORAGE_KEY)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TILES.to_string())
}

/// Marker payload handed to the Leaflet bridge.
#[derive(Serialize)]
struct MarkerJs<'a> {
    index: u32,
    lat: Option<f64>,
    lng: Option<f64>,
    color: &'a str,
    popup: String,
}

fn markers_json(markers: &[MarkerStyle]) -> String {
    let list: Vec<MarkerJs<'_>> = markers
        .iter()
        .map(|m| MarkerJs {
            index: m.index,
            lat: m.position.map(|p| p.0),
            lng: m.position.map(|p| p.1),
            color: m.color,
            popup: m.popup_html(),
        })
        .collect();
    serde_json::to_string(&list).unwrap_or_else(|_| "[]".to_string())
}

#[component]
pub fn MapOverlay(view: Signal<DashboardState>) -> Element {
    let mut is_fullscreen = use_signal(|| false);

    // --- 0) One-time JS bridge setup ---
    use_effect(move || {
        js_setup_map_bridge(&tiles_url(), RESIZE_DEBOUNCE_MS);
    });

    // --- 1) Recolor / reposition whenever the marker set changes ---
    use_effect(move || {
        let json = markers_json(&view.read().markers);
        js_update_markers(&json);
    });

    // --- 2) Count broadcast: the marker set was resized ---
    use_effect(move || {
        if let Some(count) = *SENSOR_COUNT_BROADCAST.read() {
            log!("[MAP] sensor count changed -> {count}; resizing markers");
            js_force_map_reinit_now(0);
        }
    });

    // --- 3) Fullscreen enter/exit moves the container; rebuild the map there ---
    use_effect(move || {
        let _fs = *is_fullscreen.read();
        js_force_map_reinit_now(FULLSCREEN_REINIT_DELAY_MS);
    });

    let on_toggle_fullscreen = move |_| {
        let next = !*is_fullscreen.read();
        is_fullscreen.set(next);
    };

    let live = view.read().markers.iter().filter(|m| m.live).count();
    let total = view.read().markers.len();
    let unplaced = view
        .read()
        .markers
        .iter()
        .filter(|m| m.position.is_none())
        .count();

    let button = "padding:6px 12px; border-radius:999px; border:1px solid #60a5fa; background:#0b1a33; \
                  color:#bfdbfe; font-size:0.85rem; cursor:pointer;";
    let map_div = "width:100%; height:100%; border-radius:12px; overflow:hidden; background:#000; \
                   border:1px solid #4b5563;";

    rsx! {
        if *is_fullscreen.read() {
            div { style: "position:fixed; inset:0; z-index:9500; padding:16px; background:#020617; display:flex; flex-direction:column; gap:12px;",
                div { style: "display:flex; align-items:center; justify-content:space-between; gap:12px;",
                    h2 { style: "margin:0; color:#22c55e;", "Sensor Map" }
                    button { style: "{button}", onclick: on_toggle_fullscreen, "Exit Fullscreen" }
                }
                div { style: "flex:1; min-height:0; width:100%;",
                    div { id: "sensor-map", style: "{map_div}" }
                }
            }
        } else {
            div { class: "aw-panel", style: "display:flex; flex-direction:column; gap:12px; height:420px;",
                div { style: "display:flex; align-items:center; gap:12px; flex-wrap:wrap;",
                    h2 { style: "margin:0; font-size:18px; color:#22c55e;", "Sensor Map" }
                    span { style: "color:#94a3b8; font-size:12px;", "{live}/{total} reporting" }
                    if unplaced > 0 {
                        span { style: "color:#facc15; font-size:12px;", "{unplaced} without coordinates" }
                    }
                    button { style: "{button} margin-left:auto;", onclick: on_toggle_fullscreen, "Fullscreen" }
                }
                div { style: "flex:1; min-height:0; width:100%;",
                    div { id: "sensor-map", style: "{map_div}" }
                }
            }
        }
    }
}

// --------------------------------------------------------------------------------------------
// JS bridge
// --------------------------------------------------------------------------------------------

fn js_setup_map_bridge(tiles: &str, debounce_ms: u64) {
    let tiles_json = serde_json::to_string(tiles).unwrap_or_else(|_| "\"\"".to_string());
    let js = r#"
    (function() {
      if (window.__aw_map_installed) return;
      window.__aw_map_installed = true;

      const early = window.__aw_map_state && window.__aw_map_state.pending;
      const st = window.__aw_map_state = {
        map: null, layer: null, markers: {}, pending: early || null, fitted: false, resizeTimer: null
      };

      function ensureMap() {
        const el = document.getElementById("sensor-map");
        if (!el || typeof L === "undefined") return false;
        if (st.map && st.map.getContainer() === el) return true;
        if (st.map) { try { st.map.remove(); } catch (e) {} }
        st.map = L.map(el).setView([20, 0], 2);
        L.tileLayer(__TILES__, {
          maxZoom: 19,
          attribution: "&copy; OpenStreetMap contributors"
        }).addTo(st.map);
        st.layer = L.layerGroup().addTo(st.map);
        st.markers = {};
        st.fitted = false;
        return true;
      }

      window.__aw_map_set_markers = function(list) {
        st.pending = list;
        if (!ensureMap()) return;

        const seen = {};
        const bounds = [];
        list.forEach(function(m) {
          if (m.lat === null || m.lng === null) return;
          seen[m.index] = true;
          const style = { radius: 10, color: m.color, fillColor: m.color, fillOpacity: 0.8, weight: 2 };
          let mk = st.markers[m.index];
          if (!mk) {
            mk = L.circleMarker([m.lat, m.lng], style).addTo(st.layer);
            st.markers[m.index] = mk;
          } else {
            mk.setLatLng([m.lat, m.lng]);
            mk.setStyle(style);
          }
          if (mk.getPopup()) { mk.setPopupContent(m.popup); } else { mk.bindPopup(m.popup); }
          bounds.push([m.lat, m.lng]);
        });

        Object.keys(st.markers).forEach(function(k) {
          if (!seen[k]) {
            st.layer.removeLayer(st.markers[k]);
            delete st.markers[k];
          }
        });

        if (!st.fitted && bounds.length) {
          st.map.fitBounds(bounds, { padding: [30, 30], maxZoom: 14 });
          st.fitted = true;
        }
      };

      window.__aw_map_invalidate = function() {
        if (st.map) { try { st.map.invalidateSize(); } catch (e) {} }
      };

      // Leaflet may finish loading after the first render.
      let tries = 0;
      const timer = setInterval(function() {
        tries += 1;
        if (ensureMap()) {
          clearInterval(timer);
          if (st.pending) window.__aw_map_set_markers(st.pending);
          window.__aw_map_invalidate();
        } else if (tries > 50) {
          clearInterval(timer);
        }
      }, 200);

      window.addEventListener("resize", function() {
        clearTimeout(st.resizeTimer);
        st.resizeTimer = setTimeout(window.__aw_map_invalidate, __DEBOUNCE__);
      });
    })();
    "#
    .replace("__TILES__", &tiles_json)
    .replace("__DEBOUNCE__", &debounce_ms.to_string());

    js_eval(&js);
}

fn js_update_markers(markers_json: &str) {
    js_eval(&format!(
        r#"
        (function() {{
          try {{
            const list = {markers_json};
            if (typeof window.__aw_map_set_markers === "function") {{
              window.__aw_map_set_markers(list);
            }} else {{
              window.__aw_map_state = window.__aw_map_state || {{}};
              window.__aw_map_state.pending = list;
            }}
          }} catch (e) {{
            console.warn("marker update failed", e);
          }}
        }})();
        "#
    ));
}

fn js_force_map_reinit_now(delay_ms: u64) {
    js_eval(&format!(
        r#"
        (function() {{
          setTimeout(function() {{
            try {{
              const st = window.__aw_map_state;
              if (st && st.pending && typeof window.__aw_map_set_markers === "function") {{
                window.__aw_map_set_markers(st.pending);
              }}
              if (typeof window.__aw_map_invalidate === "function") {{
                window.__aw_map_invalidate();
              }}
            }} catch (e) {{}}
          }}, {delay_ms});
        }})();
        "#
    ));
}
