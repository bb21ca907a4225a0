mod common;

use airwatch_shared::api::{CSRF_HEADER, FormField, POSTS_PATH};
use airwatch_shared::blog::{BlogError, PostDraft};
use airwatch_shared::dashboard::PostFeed;
use airwatch_shared::{Method, RequestBody};

use common::{NOON_MS, ScriptedTransport, dashboard};

fn draft() -> PostDraft {
    PostDraft {
        title: "Wildfire smoke update".into(),
        author: "Field team".into(),
        content: "Readings at the harbour station climbed overnight.".into(),
        image: None,
    }
}

#[tokio::test]
async fn feed_lists_posts_or_placeholder() {
    let t = ScriptedTransport::new();
    t.ok(POSTS_PATH, r#"[{"title":"First","slug":"first-1","excerpt":"hello"}]"#);
    let d = dashboard(&t, 1, 1);

    d.load_posts().await;
    d.with_state(|s| {
        assert_eq!(s.posts.posts().len(), 1);
        assert_eq!(s.posts.posts()[0].slug, "first-1");
        assert_eq!(s.posts.empty_message(), None);
    });

    let t = ScriptedTransport::new();
    t.fail(POSTS_PATH);
    let d = dashboard(&t, 1, 1);
    d.load_posts().await;
    d.with_state(|s| assert_eq!(s.posts, PostFeed::Failed));
}

#[tokio::test]
async fn incomplete_draft_sends_nothing() {
    let t = ScriptedTransport::new();
    let d = dashboard(&t, 1, 1);
    let empty = PostDraft {
        content: String::new(),
        ..draft()
    };

    assert_eq!(d.submit_post(&empty).await, Err(BlogError::MissingFields));
    assert!(t.requests().is_empty());
}

#[tokio::test]
async fn successful_submit_reloads_feed() {
    let t = ScriptedTransport::new();
    t.respond(POSTS_PATH, 201, r#"{"id":9}"#);
    let d = dashboard(&t, 1, 1);

    // The reload after the POST reads the same route; queue the listing next.
    t.ok(POSTS_PATH, r#"[{"title":"Wildfire smoke update","slug":"s"}]"#);
    assert_eq!(d.submit_post(&draft()).await, Ok(()));

    let requests = t.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].header(CSRF_HEADER), Some("test-csrf"));
    let RequestBody::Multipart(fields) = &requests[0].body else {
        panic!("expected multipart body");
    };
    let slug = fields.iter().find_map(|f| match f {
        FormField::Text { name, value } if name == "slug" => Some(value.as_str()),
        _ => None,
    });
    assert_eq!(slug, Some(format!("wildfire-smoke-update-{NOON_MS}").as_str()));

    assert_eq!(requests[1].method, Method::Get);
    d.with_state(|s| assert_eq!(s.posts.posts().len(), 1));
}

#[tokio::test]
async fn rejected_submit_reports_slug_error() {
    let t = ScriptedTransport::new();
    t.respond(POSTS_PATH, 400, r#"{"slug":["post with this slug already exists."]}"#);
    let d = dashboard(&t, 1, 1);

    let err = d.submit_post(&draft()).await.expect_err("rejected");
    assert_eq!(
        err.to_string(),
        "Error creating post: post with this slug already exists."
    );
}

#[tokio::test]
async fn network_failure_is_reported() {
    let t = ScriptedTransport::new();
    t.fail(POSTS_PATH);
    let d = dashboard(&t, 1, 1);

    let err = d.submit_post(&draft()).await.expect_err("offline");
    assert!(matches!(err, BlogError::Network(_)));
    assert!(err.to_string().starts_with("Network error submitting post: "));
}
