use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ConnectionStatus;

// -- JWT Claims --

/// JWT claims shared between the auth handlers (token issuance) and the
/// REST middleware (token validation). Canonical definition lives here in
/// campus-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub college: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Messages --

/// Required fields arrive as Options so the handler can reject missing
/// input with the 400 taxonomy instead of a serde-level rejection.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub recipient_id: Option<Uuid>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub message_id: Uuid,
    pub recipient_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// -- Conversations --

/// Derived inbox entry: one per counterparty, never persisted.
#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub college: String,
    pub last_message_at: chrono::DateTime<chrono::Utc>,
    pub unread_count: u32,
}

// -- Groups --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateGroupRequest {
    pub group_name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateGroupResponse {
    pub group_id: Uuid,
    pub group_name: String,
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub id: Uuid,
    pub group_name: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub member_count: u32,
}

// -- Events --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEventRequest {
    pub group_id: Option<Uuid>,
    pub event_name: Option<String>,
    pub event_date: Option<chrono::DateTime<chrono::Utc>>,
    pub description: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateEventResponse {
    pub event_id: Uuid,
    pub event_name: String,
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: Uuid,
    pub event_name: String,
    pub description: Option<String>,
    pub event_date: chrono::DateTime<chrono::Utc>,
    pub location: Option<String>,
    pub group_name: String,
    pub attendee_count: u32,
}

/// `status` stays a raw string so a missing or unrecognized value gets the
/// 400 taxonomy instead of a serde-level rejection; the handler parses it
/// with `AttendanceStatus::parse`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttendEventRequest {
    pub status: Option<String>,
}

// -- Connections --

#[derive(Debug, Serialize)]
pub struct ConnectionRequestResponse {
    pub connection_id: Uuid,
    pub connected_with: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub id: Uuid,
    pub connected_user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub college: String,
    pub status: ConnectionStatus,
    pub connection_date: chrono::DateTime<chrono::Utc>,
}

// -- Notifications --

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub related_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// -- Announcements --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAnnouncementRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub target_audience: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateAnnouncementResponse {
    pub announcement_id: Uuid,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct AnnouncementResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub target_audience: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
