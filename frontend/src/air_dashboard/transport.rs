// frontend/src/air_dashboard/transport.rs
//
// HTTP glue behind the core `Transport` seam: gloo-net in the browser,
// reqwest (with a cookie jar for the anti-forgery cookie) on desktop.

use airwatch_shared::api::{
    ApiError, ApiRequest, FormField, HttpResponse, Method, RequestBody, Transport,
    csrf_token_from_cookie,
};

use super::UrlConfig;

fn request_url(path: &str) -> Result<String, ApiError> {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    let base = UrlConfig::base_http();
    if !base.is_empty() {
        return Ok(format!("{base}{path}"));
    }

    #[cfg(target_arch = "wasm32")]
    {
        let w = web_sys::window().ok_or_else(|| ApiError::Transport("no window".into()))?;
        let origin = w
            .location()
            .origin()
            .map_err(|_| ApiError::Transport("failed to read window.location.origin".into()))?;
        Ok(format!("{origin}{path}"))
    }

    #[cfg(not(target_arch = "wasm32"))]
    Ok(format!("{}{path}", UrlConfig::DESKTOP_DEFAULT))
}

pub struct HttpTransport {
    #[cfg(not(target_arch = "wasm32"))]
    client: reqwest::Client,
    #[cfg(not(target_arch = "wasm32"))]
    cookies: std::sync::Arc<reqwest::cookie::Jar>,
}

impl HttpTransport {
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        Self {}
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        let cookies = std::sync::Arc::new(reqwest::cookie::Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(cookies.clone())
            .build()
            .unwrap_or_else(|e| {
                log!("[HTTP] client builder failed ({e}); using defaults");
                reqwest::Client::new()
            });
        Self { client, cookies }
    }
}

// ---------- wasm32 ----------
#[cfg(target_arch = "wasm32")]
fn form_data(fields: &[FormField]) -> Result<web_sys::FormData, ApiError> {
    let js_err = |what: &str| ApiError::Transport(format!("building form data: {what}"));
    let fd = web_sys::FormData::new().map_err(|_| js_err("FormData"))?;

    for field in fields {
        match field {
            FormField::Text { name, value } => {
                fd.append_with_str(name, value).map_err(|_| js_err(name))?;
            }
            FormField::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let parts = js_sys::Array::new();
                parts.push(&js_sys::Uint8Array::from(bytes.as_slice()));
                let opts = web_sys::BlobPropertyBag::new();
                opts.set_type(mime);
                let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
                    .map_err(|_| js_err(file_name))?;
                fd.append_with_blob_and_filename(name, &blob, file_name)
                    .map_err(|_| js_err(file_name))?;
            }
        }
    }
    Ok(fd)
}

#[cfg(target_arch = "wasm32")]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        use gloo_net::http::Request;

        let url = request_url(&request.path)?;
        let mut builder = match request.method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let req = match request.body {
            RequestBody::Empty => builder.build(),
            RequestBody::Json(body) => builder.body(body),
            RequestBody::Multipart(fields) => builder.body(form_data(&fields)?),
        }
        .map_err(|e| ApiError::Transport(e.to_string()))?;

        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }

    fn csrf_token(&self) -> Option<String> {
        use wasm_bindgen::JsCast;

        let doc = web_sys::window()?.document()?;
        let html: web_sys::HtmlDocument = doc.dyn_into().ok()?;
        csrf_token_from_cookie(&html.cookie().ok()?)
    }
}

// ---------- native ----------
#[cfg(not(target_arch = "wasm32"))]
fn multipart_form(fields: Vec<FormField>) -> Result<reqwest::multipart::Form, ApiError> {
    use reqwest::multipart::{Form, Part};

    let mut form = Form::new();
    for field in fields {
        form = match field {
            FormField::Text { name, value } => form.text(name, value),
            FormField::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime)
                    .map_err(|e| ApiError::Transport(e.to_string()))?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

#[cfg(not(target_arch = "wasm32"))]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<HttpResponse, ApiError> {
        let url = request_url(&request.path)?;
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.body(body),
            RequestBody::Multipart(fields) => builder.multipart(multipart_form(fields)?),
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }

    fn csrf_token(&self) -> Option<String> {
        use reqwest::cookie::CookieStore;

        let base = UrlConfig::base_http();
        let url = reqwest::Url::parse(&base).ok()?;
        let header = self.cookies.cookies(&url)?;
        csrf_token_from_cookie(header.to_str().ok()?)
    }
}
