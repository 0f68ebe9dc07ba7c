pub mod announcements;
pub mod auth;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod notifications;
pub mod social;
mod util;

#[cfg(test)]
mod tests;

use axum::{
    Json, Router,
    routing::{get, patch, post},
};

use crate::auth::AppState;

/// Assembles the full API surface. Everything under /api/messaging and
/// /api/social requires a bearer token; the auth routes and the health
/// probe are public.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .with_state(state.clone());

    let messaging = Router::new()
        .route("/send", post(messages::send_message))
        .route("/conversations", get(messages::list_conversations))
        .route("/messages/{user_id}", get(messages::message_history))
        .route("/read/{message_id}", patch(messages::mark_read))
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/{notification_id}/read",
            patch(notifications::mark_read),
        )
        .route(
            "/announcements/create",
            post(announcements::create_announcement),
        )
        .route("/announcements", get(announcements::list_announcements));

    let social = Router::new()
        .route("/groups/create", post(social::create_group))
        .route("/groups", get(social::list_groups))
        .route("/my-groups", get(social::my_groups))
        .route("/groups/{group_id}/join", post(social::join_group))
        .route("/events/create", post(social::create_event))
        .route("/events", get(social::list_events))
        .route("/events/{event_id}/attend", post(social::attend_event))
        .route("/connect/{user_id}", post(social::request_connection))
        .route(
            "/connections/{connection_id}/accept",
            patch(social::accept_connection),
        )
        .route("/my-connections", get(social::my_connections));

    let protected = Router::new()
        .nest("/api/messaging", messaging)
        .nest("/api/social", social)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .with_state(state);

    Router::new().merge(public).merge(protected)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
