use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use campus_types::api::{
    AnnouncementResponse, Claims, CreateAnnouncementRequest, CreateAnnouncementResponse,
};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::util::{parse_db_time, parse_db_uuid};

pub async fn create_announcement(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateAnnouncementRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(title), Some(content)) = (req.title, req.content) else {
        return Err(ApiError::Validation("title and content required".into()));
    };
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(ApiError::Validation("title and content required".into()));
    }

    let announcement_id = Uuid::new_v4();

    state.db.insert_announcement(
        &announcement_id.to_string(),
        &claims.sub.to_string(),
        &title,
        &content,
        req.target_audience.as_deref().unwrap_or("all"),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(CreateAnnouncementResponse {
            announcement_id,
            title,
        }),
    ))
}

pub async fn list_announcements(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_announcements()?;

    let announcements: Vec<AnnouncementResponse> = rows
        .into_iter()
        .map(|row| AnnouncementResponse {
            id: parse_db_uuid(&row.id),
            title: row.title,
            content: row.content,
            target_audience: row.target_audience,
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: parse_db_time(&row.created_at),
        })
        .collect();

    Ok(Json(announcements))
}
