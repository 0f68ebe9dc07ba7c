use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use campus_db::Database;

use crate::auth::{AppState, AppStateInner};

fn app() -> Router {
    let db = Database::open_in_memory().unwrap();
    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: "test-secret".into(),
    });
    crate::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(v) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let res = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Returns (user_id, token).
async fn register(app: &Router, username: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": username,
            "password": "password123",
            "first_name": "Test",
            "last_name": "User",
            "college": "Engineering",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    (
        body["user_id"].as_str().unwrap().to_string(),
        body["token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_token() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/messaging/conversations", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, "GET", "/api/social/groups", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_and_login() {
    let app = app();
    let (user_id, _) = register(&app, "alice").await;

    // duplicate username
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": "alice",
            "password": "password123",
            "first_name": "A",
            "last_name": "B",
            "college": "Engineering",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], user_id.as_str());
}

#[tokio::test]
async fn send_rejects_self_and_missing_fields() {
    let app = app();
    let (alice_id, alice_token) = register(&app, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/messaging/send",
        Some(&alice_token),
        Some(json!({ "recipient_id": alice_id, "content": "hi me" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot message yourself");

    let (status, _) = send(
        &app,
        "POST",
        "/api/messaging/send",
        Some(&alice_token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // unknown recipient
    let (status, _) = send(
        &app,
        "POST",
        "/api/messaging/send",
        Some(&alice_token),
        Some(json!({ "recipient_id": Uuid::new_v4(), "content": "hello?" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn send_read_scenario() {
    let app = app();
    let (alice_id, alice_token) = register(&app, "alice").await;
    let (bob_id, bob_token) = register(&app, "bob").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/messaging/send",
        Some(&alice_token),
        Some(json!({ "recipient_id": bob_id, "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let message_id = body["message_id"].as_str().unwrap().to_string();

    // bob sees the message, unread, as the last element
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/messaging/messages/{alice_id}"),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let history = body.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["content"], "hi");
    assert_eq!(history[0]["is_read"], false);

    // the sender cannot mark it read
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/messaging/read/{message_id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // unknown message id
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/messaging/read/{}", Uuid::new_v4()),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // marking read is idempotent
    for _ in 0..2 {
        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/api/messaging/read/{message_id}"),
            Some(&bob_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // both sides now observe is_read = true
    for (token, other) in [(&alice_token, &bob_id), (&bob_token, &alice_id)] {
        let (_, body) = send(
            &app,
            "GET",
            &format!("/api/messaging/messages/{other}"),
            Some(token),
            None,
        )
        .await;
        assert_eq!(body.as_array().unwrap()[0]["is_read"], true);
    }
}

#[tokio::test]
async fn conversations_report_unread_counts() {
    let app = app();
    let (alice_id, alice_token) = register(&app, "alice").await;
    let (bob_id, bob_token) = register(&app, "bob").await;

    let mut first_id = None;
    for content in ["one", "two", "three"] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/messaging/send",
            Some(&bob_token),
            Some(json!({ "recipient_id": alice_id, "content": content })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        first_id.get_or_insert_with(|| body["message_id"].as_str().unwrap().to_string());
    }

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/messaging/read/{}", first_id.unwrap()),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "GET",
        "/api/messaging/conversations",
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let conversations = body.as_array().unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0]["user_id"], bob_id.as_str());
    assert_eq!(conversations[0]["unread_count"], 2);

    // bob has nothing unread
    let (_, body) = send(
        &app,
        "GET",
        "/api/messaging/conversations",
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap()[0]["unread_count"], 0);
}

#[tokio::test]
async fn connection_flow() {
    let app = app();
    let (alice_id, alice_token) = register(&app, "alice").await;
    let (bob_id, bob_token) = register(&app, "bob").await;

    // self-connect
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/social/connect/{alice_id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // unknown target
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/social/connect/{}", Uuid::new_v4()),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/social/connect/{bob_id}"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let connection_id = body["connection_id"].as_str().unwrap().to_string();

    // reversed direction is the same pair
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/social/connect/{alice_id}"),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Connection already exists");

    // pending connections are not listed
    let (_, body) = send(
        &app,
        "GET",
        "/api/social/my-connections",
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    // the requester cannot accept their own request
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/social/connections/{connection_id}/accept"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // accepting is idempotent
    for _ in 0..2 {
        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/api/social/connections/{connection_id}/accept"),
            Some(&bob_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(
        &app,
        "GET",
        "/api/social/my-connections",
        Some(&alice_token),
        None,
    )
    .await;
    let connections = body.as_array().unwrap();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0]["connected_user_id"], bob_id.as_str());
    assert_eq!(connections[0]["status"], "accepted");
}

#[tokio::test]
async fn group_flow() {
    let app = app();
    let (alice_id, alice_token) = register(&app, "alice").await;
    let (_, bob_token) = register(&app, "bob").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/social/groups/create",
        Some(&alice_token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/social/groups/create",
        Some(&alice_token),
        Some(json!({ "group_name": "Chess Club", "description": "weekly games" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let group_id = body["group_id"].as_str().unwrap().to_string();

    // creator is auto-enrolled
    let (_, body) = send(&app, "GET", "/api/social/groups", Some(&bob_token), None).await;
    let groups = body.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["group_name"], "Chess Club");
    assert_eq!(groups[0]["member_count"], 1);
    assert_eq!(groups[0]["created_by"], alice_id.as_str());

    // unknown group
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/social/groups/{}/join", Uuid::new_v4()),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/social/groups/{group_id}/join"),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/social/groups/{group_id}/join"),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Already a member of this group");

    let (_, body) = send(&app, "GET", "/api/social/my-groups", Some(&bob_token), None).await;
    let groups = body.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["member_count"], 2);
}

#[tokio::test]
async fn event_flow() {
    let app = app();
    let (_, alice_token) = register(&app, "alice").await;
    let (_, bob_token) = register(&app, "bob").await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/social/groups/create",
        Some(&alice_token),
        Some(json!({ "group_name": "Chess Club" })),
    )
    .await;
    let group_id = body["group_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/api/social/events/create",
        Some(&alice_token),
        Some(json!({ "group_id": group_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/social/events/create",
        Some(&alice_token),
        Some(json!({
            "group_id": Uuid::new_v4(),
            "event_name": "Tournament",
            "event_date": "2026-10-01T18:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "POST",
        "/api/social/events/create",
        Some(&alice_token),
        Some(json!({
            "group_id": group_id,
            "event_name": "Tournament",
            "event_date": "2026-10-01T18:00:00Z",
            "location": "Hall B",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let event_id = body["event_id"].as_str().unwrap().to_string();

    // missing status
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/social/events/{event_id}/attend"),
        Some(&bob_token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // unrecognized status gets the same 400 with the JSON error shape
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/social/events/{event_id}/attend"),
        Some(&bob_token),
        Some(json!({ "status": "maybe" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "status required (attending/interested/not_attending)"
    );

    // unknown event
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/social/events/{}/attend", Uuid::new_v4()),
        Some(&bob_token),
        Some(json!({ "status": "attending" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/social/events/{event_id}/attend"),
        Some(&bob_token),
        Some(json!({ "status": "attending" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // no RSVP update path: a second registration conflicts
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/social/events/{event_id}/attend"),
        Some(&bob_token),
        Some(json!({ "status": "not_attending" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Already registered for this event");

    // the creator was not auto-registered
    let (_, body) = send(&app, "GET", "/api/social/events", Some(&alice_token), None).await;
    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["attendee_count"], 1);
    assert_eq!(events[0]["group_name"], "Chess Club");
}

#[tokio::test]
async fn notification_flow() {
    let app = app();
    let (_, alice_token) = register(&app, "alice").await;
    let (bob_id, bob_token) = register(&app, "bob").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/messaging/send",
        Some(&alice_token),
        Some(json!({ "recipient_id": bob_id, "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "GET",
        "/api/messaging/notifications",
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let notifications = body.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "message");
    assert_eq!(notifications[0]["is_read"], false);
    let notification_id = notifications[0]["id"].as_str().unwrap().to_string();

    // only the owner may ack
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/messaging/notifications/{notification_id}/read"),
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/messaging/notifications/{notification_id}/read"),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        "GET",
        "/api/messaging/notifications",
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap()[0]["is_read"], true);
}

#[tokio::test]
async fn announcement_flow() {
    let app = app();
    let (_, alice_token) = register(&app, "alice").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/messaging/announcements/create",
        Some(&alice_token),
        Some(json!({ "title": "Orientation" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/messaging/announcements/create",
        Some(&alice_token),
        Some(json!({ "title": "Orientation", "content": "Monday 9am" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "GET",
        "/api/messaging/announcements",
        Some(&alice_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let announcements = body.as_array().unwrap();
    assert_eq!(announcements.len(), 1);
    assert_eq!(announcements[0]["title"], "Orientation");
    assert_eq!(announcements[0]["target_audience"], "all");
    assert_eq!(announcements[0]["first_name"], "Test");
}
