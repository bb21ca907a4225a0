use serde_json::Value;

use crate::api::FormField;

pub const TITLE_MAX: usize = 90;
pub const CONTENT_MAX: usize = 2000;
pub const EXCERPT_LEN: usize = 250;

pub const SUBMIT_OK_MESSAGE: &str = "✓ Post submitted successfully!";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BlogError {
    #[error("Please provide a title and content.")]
    MissingFields,
    #[error("Error creating post: {0}")]
    Rejected(String),
    #[error("Network error submitting post: {0}")]
    Network(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Contents of the new-post form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub author: String,
    pub content: String,
    pub image: Option<ImageUpload>,
}

impl PostDraft {
    pub fn title_counter(&self) -> String {
        format!("{}/{TITLE_MAX}", self.title.chars().count())
    }

    pub fn content_counter(&self) -> String {
        format!("{}/{CONTENT_MAX}", self.content.chars().count())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Multipart fields for `POST /api/posts/`.
    pub fn form_fields(&self, now_ms: i64) -> Result<Vec<FormField>, BlogError> {
        let title = self.title.trim();
        let content = self.content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(BlogError::MissingFields);
        }

        let mut fields = vec![
            FormField::text("title", title),
            FormField::text("slug", slugify(title, now_ms)),
            FormField::text("content", content),
            FormField::text("excerpt", excerpt(content)),
            FormField::text("status", "published"),
        ];
        if let Some(img) = &self.image {
            fields.push(FormField::File {
                name: "image".to_string(),
                file_name: img.file_name.clone(),
                mime: img.mime.clone(),
                bytes: img.bytes.clone(),
            });
        }
        Ok(fields)
    }
}

/// Lowercases, keeps ASCII word characters, whitespace and hyphens, turns
/// whitespace runs into `-`, collapses hyphen runs, then appends `-<now_ms>`.
pub fn slugify(title: &str, now_ms: i64) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace() || *c == '-')
        .collect();

    let mut slug = String::with_capacity(kept.len());
    for c in kept.chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }
    format!("{slug}-{now_ms}")
}

pub fn excerpt(content: &str) -> String {
    content.chars().take(EXCERPT_LEN).collect()
}

/// Message shown for a rejected submission: first slug error, else `detail`,
/// else the JSON body as text. Non-JSON bodies read as "Server error".
pub fn rejection_detail(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return "Server error".to_string();
    };
    if let Some(first) = json
        .get("slug")
        .and_then(Value::as_array)
        .and_then(|a| a.first())
    {
        return first
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| first.to_string());
    }
    if let Some(detail) = json.get("detail").and_then(Value::as_str) {
        return detail.to_string();
    }
    json.to_string()
}
