use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::warn;
use uuid::Uuid;

use campus_db::models::MessageRow;
use campus_types::api::{
    Claims, ConversationResponse, MessageResponse, SendMessageRequest, SendMessageResponse,
};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::util::{parse_db_time, parse_db_uuid};

/// Append a message to the ledger. Messages are immutable once written;
/// there is no edit or retraction path.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(recipient_id), Some(content)) = (req.recipient_id, req.content) else {
        return Err(ApiError::Validation(
            "recipient_id and content required".into(),
        ));
    };
    if content.trim().is_empty() {
        return Err(ApiError::Validation(
            "recipient_id and content required".into(),
        ));
    }
    if recipient_id == claims.sub {
        return Err(ApiError::Validation("Cannot message yourself".into()));
    }

    let message_id = Uuid::new_v4();

    // Run blocking DB work off the async runtime
    let db = state.clone();
    let mid = message_id.to_string();
    let sender = claims.sub.to_string();
    let sender_name = claims.username.clone();
    let recipient = recipient_id.to_string();
    tokio::task::spawn_blocking(move || {
        if !db.db.user_exists(&recipient)? {
            return Err(ApiError::NotFound("Recipient not found"));
        }

        db.db.insert_message(&mid, &sender, &recipient, &content)?;

        // Notification sink is a side channel; a failed write must not
        // fail the send.
        if let Err(e) = db.db.insert_notification(
            &Uuid::new_v4().to_string(),
            &recipient,
            "message",
            &format!("New message from {}", sender_name),
            Some(&mid),
        ) {
            warn!("notification write failed for message {}: {}", mid, e);
        }

        Ok(())
    })
    .await??;

    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse {
            message_id,
            recipient_id,
        }),
    ))
}

/// Derived inbox view: recomputed from the ledger on every call, so it
/// always reflects the latest read state.
pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user = claims.sub.to_string();
    let rows = tokio::task::spawn_blocking(move || db.db.list_conversations(&user)).await??;

    let conversations: Vec<ConversationResponse> = rows
        .into_iter()
        .map(|row| ConversationResponse {
            user_id: parse_db_uuid(&row.user_id),
            first_name: row.first_name,
            last_name: row.last_name,
            college: row.college,
            last_message_at: parse_db_time(&row.last_message_at),
            unread_count: row.unread_count,
        })
        .collect();

    Ok(Json(conversations))
}

pub async fn message_history(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let me = claims.sub.to_string();
    let other = user_id.to_string();
    let rows = tokio::task::spawn_blocking(move || db.db.message_history(&me, &other)).await??;

    let messages: Vec<MessageResponse> = rows.into_iter().map(message_response).collect();

    Ok(Json(messages))
}

/// Only the recipient may mark a message read; re-marking an already-read
/// message is a no-op success.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let mid = message_id.to_string();

    let message = state
        .db
        .get_message(&mid)?
        .ok_or(ApiError::NotFound("Message not found"))?;

    if message.recipient_id != claims.sub.to_string() {
        return Err(ApiError::Forbidden("Only the recipient may mark a message read"));
    }

    if !message.is_read {
        state.db.mark_message_read(&mid)?;
    }

    Ok(Json(serde_json::json!({
        "message": "Message marked as read",
        "message_id": message_id,
    })))
}

fn message_response(row: MessageRow) -> MessageResponse {
    MessageResponse {
        id: parse_db_uuid(&row.id),
        sender_id: parse_db_uuid(&row.sender_id),
        recipient_id: parse_db_uuid(&row.recipient_id),
        content: row.content,
        is_read: row.is_read,
        created_at: parse_db_time(&row.created_at),
    }
}
