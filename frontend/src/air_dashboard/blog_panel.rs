use airwatch_shared::DashboardState;
use airwatch_shared::blog::{CONTENT_MAX, ImageUpload, PostDraft, SUBMIT_OK_MESSAGE, TITLE_MAX};
use dioxus::html::FileData;
use dioxus::prelude::*;

use super::{DashboardCtx, abs_http, show_alert};

async fn read_upload(file: FileData) -> Option<ImageUpload> {
    let file_name = file.name();
    let mime = file
        .content_type()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    match file.read_bytes().await {
        Ok(bytes) => Some(ImageUpload {
            file_name,
            mime,
            bytes: bytes.to_vec(),
        }),
        Err(e) => {
            log!("[BLOG] could not read {file_name}: {e}");
            None
        }
    }
}

#[component]
pub fn BlogPanel(view: Signal<DashboardState>) -> Element {
    let ctx = use_context::<DashboardCtx>();

    let mut draft = use_signal(PostDraft::default);
    let mut form_open = use_signal(|| false);
    let mut submitting = use_signal(|| false);
    let mut drag_over = use_signal(|| false);

    let feed = view.read().posts.clone();

    let on_submit = {
        let dashboard = ctx.dashboard.clone();
        move |e: FormEvent| {
            e.prevent_default();
            if submitting() {
                return;
            }
            let dashboard = dashboard.clone();
            let current = draft.read().clone();
            submitting.set(true);
            spawn(async move {
                match dashboard.submit_post(&current).await {
                    Ok(()) => {
                        draft.write().clear();
                        show_alert(SUBMIT_OK_MESSAGE);
                    }
                    Err(err) => show_alert(&err.to_string()),
                }
                submitting.set(false);
            });
        }
    };

    let on_clear = move |_| {
        draft.write().clear();
        form_open.set(false);
    };

    let on_pick = move |e: FormEvent| async move {
        if let Some(file) = e.files().into_iter().next() {
            if let Some(upload) = read_upload(file).await {
                draft.write().image = Some(upload);
            }
        }
    };

    let on_drop = move |e: DragEvent| async move {
        e.prevent_default();
        drag_over.set(false);
        if let Some(file) = e.files().into_iter().next() {
            if let Some(upload) = read_upload(file).await {
                draft.write().image = Some(upload);
            }
        }
    };

    let field = "width:100%; padding:10px; border-radius:10px; border:1px solid #334155; \
                 background:#020617; color:inherit; outline:none;";
    let button = "padding:8px 14px; border-radius:10px; border:1px solid #334155; \
                  background:#111827; color:#e5e7eb; cursor:pointer;";
    let drop_border = if drag_over() { "#22c55e" } else { "#334155" };

    let d = draft.read().clone();
    let image_label = d
        .image
        .as_ref()
        .map(|i| format!("{} ({} KB)", i.file_name, i.bytes.len().div_ceil(1024)))
        .unwrap_or_else(|| "Drop an image here or click to choose".to_string());

    rsx! {
        div { class: "aw-panel", style: "display:flex; flex-direction:column; gap:12px;",
            div { style: "display:flex; align-items:center; justify-content:space-between; gap:12px;",
                h2 { style: "margin:0; font-size:18px;", "Community Blog" }
                if !form_open() {
                    button { style: "{button}", onclick: move |_| form_open.set(true), "New Post" }
                }
            }

            div { id: "blogPosts", style: "display:flex; flex-direction:column; gap:10px;",
                for post in feed.posts().iter() {
                    a {
                        href: abs_http(&format!("/blog/{}/", post.slug)),
                        style: "display:block; padding:12px; border:1px solid #334155; border-radius:12px; color:inherit; text-decoration:none;",
                        h4 { style: "margin:0 0 4px 0;", "{post.title}" }
                        if let Some(excerpt) = &post.excerpt {
                            p { style: "margin:0; color:#94a3b8; font-size:13px;", "{excerpt}" }
                        }
                    }
                }
                if let Some(msg) = feed.empty_message() {
                    div { style: "color:#94a3b8;", "{msg}" }
                }
            }

            if form_open() {
                form {
                    id: "blogForm",
                    style: "display:flex; flex-direction:column; gap:10px;",
                    onsubmit: on_submit,

                    div {
                        input {
                            style: "{field}",
                            placeholder: "Title",
                            maxlength: "{TITLE_MAX}",
                            value: "{d.title}",
                            oninput: move |e| draft.write().title = e.value(),
                        }
                        div { style: "text-align:right; color:#94a3b8; font-size:11px;", "{d.title_counter()}" }
                    }
                    input {
                        style: "{field}",
                        placeholder: "Author",
                        value: "{d.author}",
                        oninput: move |e| draft.write().author = e.value(),
                    }
                    div {
                        textarea {
                            style: "{field} min-height:140px; resize:vertical;",
                            placeholder: "Share what you are seeing...",
                            maxlength: "{CONTENT_MAX}",
                            value: "{d.content}",
                            oninput: move |e| draft.write().content = e.value(),
                        }
                        div { style: "text-align:right; color:#94a3b8; font-size:11px;", "{d.content_counter()}" }
                    }

                    label {
                        style: "display:block; padding:18px; border:2px dashed {drop_border}; border-radius:12px; text-align:center; color:#94a3b8; cursor:pointer;",
                        ondragover: move |e| {
                            e.prevent_default();
                            drag_over.set(true);
                        },
                        ondragleave: move |_| drag_over.set(false),
                        ondrop: on_drop,
                        "{image_label}"
                        input {
                            r#type: "file",
                            accept: "image/*",
                            style: "display:none;",
                            onchange: on_pick,
                        }
                    }

                    div { style: "display:flex; gap:10px; justify-content:flex-end;",
                        button { r#type: "button", style: "{button}", onclick: on_clear, "Clear" }
                        button {
                            r#type: "submit",
                            style: "{button} border-color:#22c55e; color:#bbf7d0;",
                            disabled: submitting(),
                            if submitting() { "Submitting..." } else { "Submit Post" }
                        }
                    }
                }
            }
        }
    }
}
