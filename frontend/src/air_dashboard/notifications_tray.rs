use airwatch_shared::DashboardState;
use airwatch_shared::simulation::clock_label;
use dioxus::prelude::*;

use super::DashboardCtx;

#[component]
pub fn NotificationsTray(view: Signal<DashboardState>) -> Element {
    let ctx = use_context::<DashboardCtx>();
    let mut open = use_signal(|| false);

    let (entries, unread) = {
        let v = view.read();
        (v.notifications.entries().to_vec(), v.notifications.has_unread())
    };

    let on_clear = {
        let dashboard = ctx.dashboard.clone();
        move |_| dashboard.clear_notifications()
    };

    rsx! {
        div { style: "position:relative;",
            button {
                style: "position:relative; padding:0.45rem 0.85rem; border-radius:0.75rem; border:1px solid #334155; background:#111827; color:#e5e7eb; cursor:pointer;",
                onclick: move |_| {
                    let next = !open();
                    open.set(next);
                },
                "🔔"
                if unread {
                    span {
                        id: "notificationBadge",
                        style: "position:absolute; top:-4px; right:-4px; min-width:16px; height:16px; padding:0 4px; border-radius:999px; background:#ef4444; color:#fff; font-size:10px; line-height:16px; text-align:center;",
                        "{entries.len()}"
                    }
                }
            }

            if open() {
                div {
                    class: "aw-panel",
                    style: "position:absolute; right:0; top:calc(100% + 8px); width:340px; max-height:420px; overflow-y:auto; z-index:1200; box-shadow:0 10px 25px rgba(0,0,0,0.45);",
                    div { style: "display:flex; align-items:center; justify-content:space-between; margin-bottom:10px;",
                        h3 { style: "margin:0; font-size:15px;", "Notifications" }
                        button {
                            style: "padding:0.25rem 0.7rem; border-radius:999px; border:1px solid #4b5563; background:transparent; color:inherit; font-size:0.75rem; cursor:pointer;",
                            disabled: entries.is_empty(),
                            onclick: on_clear,
                            "Clear all"
                        }
                    }

                    div { style: "display:flex; flex-direction:column; gap:10px;",
                        for n in entries.iter() {
                            div {
                                class: "notification-item {n.severity.as_str()}",
                                style: "border:1px solid #ef4444; background:#450a0a; color:#fecaca; padding:10px; border-radius:12px;",
                                div { style: "font-size:12px; opacity:0.85;", "{clock_label(n.timestamp_ms)}" }
                                div { style: "font-size:14px;", "{n.message}" }
                            }
                        }
                        if entries.is_empty() {
                            div { style: "color:#94a3b8;", "No notifications yet." }
                        }
                    }
                }
            }
        }
    }
}
