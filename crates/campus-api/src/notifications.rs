use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use campus_types::api::{Claims, NotificationResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::util::{parse_db_time, parse_db_uuid};

/// Read side of the notification sink. Writes happen as side effects of
/// message sends and connection requests; this surface only lists and acks.
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_notifications(&claims.sub.to_string())?;

    let notifications: Vec<NotificationResponse> = rows
        .into_iter()
        .map(|row| NotificationResponse {
            id: parse_db_uuid(&row.id),
            kind: row.kind,
            message: row.message,
            related_id: row.related_id.as_deref().map(parse_db_uuid),
            is_read: row.is_read,
            created_at: parse_db_time(&row.created_at),
        })
        .collect();

    Ok(Json(notifications))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let nid = notification_id.to_string();

    let owner = state
        .db
        .get_notification_owner(&nid)?
        .ok_or(ApiError::NotFound("Notification not found"))?;

    if owner != claims.sub.to_string() {
        return Err(ApiError::Forbidden(
            "Only the recipient may mark a notification read",
        ));
    }

    state.db.mark_notification_read(&nid)?;

    Ok(Json(serde_json::json!({
        "message": "Notification marked as read",
        "notification_id": notification_id,
    })))
}
