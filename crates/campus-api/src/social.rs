use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::warn;
use uuid::Uuid;

use campus_db::models::GroupRow;
use campus_types::api::{
    AttendEventRequest, Claims, ConnectionRequestResponse, ConnectionResponse, CreateEventRequest,
    CreateEventResponse, CreateGroupRequest, CreateGroupResponse, EventResponse, GroupResponse,
};
use campus_types::models::{AttendanceStatus, ConnectionStatus};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::util::{parse_db_time, parse_db_uuid};

// -- Groups --

/// Group insert plus creator self-membership, atomically: the store layer
/// runs both in one transaction.
pub async fn create_group(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(group_name) = req.group_name.filter(|n| !n.trim().is_empty()) else {
        return Err(ApiError::Validation("group_name required".into()));
    };

    let group_id = Uuid::new_v4();

    state.db.create_group(
        &group_id.to_string(),
        &group_name,
        req.description.as_deref(),
        &claims.sub.to_string(),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(CreateGroupResponse {
            group_id,
            group_name,
        }),
    ))
}

pub async fn list_groups(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_groups()?;
    let groups: Vec<GroupResponse> = rows.into_iter().map(group_response).collect();
    Ok(Json(groups))
}

pub async fn my_groups(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.groups_for_member(&claims.sub.to_string())?;
    let groups: Vec<GroupResponse> = rows.into_iter().map(group_response).collect();
    Ok(Json(groups))
}

pub async fn join_group(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let gid = group_id.to_string();
    let user = claims.sub.to_string();

    if !state.db.group_exists(&gid)? {
        return Err(ApiError::NotFound("Group not found"));
    }

    // advisory pre-check; the (group_id, student_id) unique constraint is
    // the guarantee under concurrent joins
    if state.db.is_group_member(&gid, &user)? {
        return Err(ApiError::Conflict("Already a member of this group"));
    }

    match state.db.insert_group_member(&gid, &user) {
        Err(campus_db::StoreError::UniqueViolation) => {
            return Err(ApiError::Conflict("Already a member of this group"));
        }
        other => other?,
    }

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Joined group successfully",
            "group_id": group_id,
        })),
    ))
}

// -- Events --

/// The creator is deliberately not registered as an attendee, mirroring
/// how group creation auto-enrolls but event creation does not.
pub async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(group_id), Some(event_name), Some(event_date)) =
        (req.group_id, req.event_name, req.event_date)
    else {
        return Err(ApiError::Validation(
            "group_id, event_name, event_date required".into(),
        ));
    };
    if event_name.trim().is_empty() {
        return Err(ApiError::Validation(
            "group_id, event_name, event_date required".into(),
        ));
    }

    if !state.db.group_exists(&group_id.to_string())? {
        return Err(ApiError::NotFound("Group not found"));
    }

    let event_id = Uuid::new_v4();

    state.db.insert_event(
        &event_id.to_string(),
        &group_id.to_string(),
        &event_name,
        req.description.as_deref(),
        &event_date.to_rfc3339(),
        req.location.as_deref(),
        &claims.sub.to_string(),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(CreateEventResponse {
            event_id,
            event_name,
        }),
    ))
}

pub async fn list_events(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_events()?;

    let events: Vec<EventResponse> = rows
        .into_iter()
        .map(|row| EventResponse {
            id: parse_db_uuid(&row.id),
            event_name: row.event_name,
            description: row.description,
            event_date: parse_db_time(&row.event_date),
            location: row.location,
            group_name: row.group_name,
            attendee_count: row.attendee_count,
        })
        .collect();

    Ok(Json(events))
}

pub async fn attend_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AttendEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // missing and unrecognized values both fall under the 400 taxonomy
    let Some(status) = req.status.as_deref().and_then(AttendanceStatus::parse) else {
        return Err(ApiError::Validation(
            "status required (attending/interested/not_attending)".into(),
        ));
    };

    let eid = event_id.to_string();
    let user = claims.sub.to_string();

    if !state.db.event_exists(&eid)? {
        return Err(ApiError::NotFound("Event not found"));
    }

    if state.db.attendance_exists(&eid, &user)? {
        return Err(ApiError::Conflict("Already registered for this event"));
    }

    match state.db.insert_attendance(&eid, &user, status.as_str()) {
        Err(campus_db::StoreError::UniqueViolation) => {
            return Err(ApiError::Conflict("Already registered for this event"));
        }
        other => other?,
    }

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Registered for event",
            "event_id": event_id,
            "status": status,
        })),
    ))
}

// -- Connections --

pub async fn request_connection(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    if user_id == claims.sub {
        return Err(ApiError::Validation("Cannot connect with yourself".into()));
    }

    let me = claims.sub.to_string();
    let target = user_id.to_string();

    if !state.db.user_exists(&target)? {
        return Err(ApiError::NotFound("User not found"));
    }

    // either direction counts as the same pair
    if state.db.find_connection_between(&me, &target)?.is_some() {
        return Err(ApiError::Conflict("Connection already exists"));
    }

    let connection_id = Uuid::new_v4();

    match state.db.insert_connection(&connection_id.to_string(), &me, &target) {
        Err(campus_db::StoreError::UniqueViolation) => {
            return Err(ApiError::Conflict("Connection already exists"));
        }
        other => other?,
    }

    if let Err(e) = state.db.insert_notification(
        &Uuid::new_v4().to_string(),
        &target,
        "connection_request",
        &format!("Connection request from {}", claims.username),
        Some(&connection_id.to_string()),
    ) {
        warn!(
            "notification write failed for connection {}: {}",
            connection_id, e
        );
    }

    Ok((
        StatusCode::CREATED,
        Json(ConnectionRequestResponse {
            connection_id,
            connected_with: user_id,
        }),
    ))
}

/// Only the party who received the request may accept it; accepting an
/// already-accepted connection is a no-op success.
pub async fn accept_connection(
    State(state): State<AppState>,
    Path(connection_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let cid = connection_id.to_string();

    let connection = state
        .db
        .get_connection(&cid)?
        .ok_or(ApiError::NotFound("Connection not found"))?;

    // the requester is always user1
    if connection.user2_id != claims.sub.to_string() {
        return Err(ApiError::Forbidden(
            "Only the requested party may accept a connection",
        ));
    }

    if ConnectionStatus::parse(&connection.status) != Some(ConnectionStatus::Accepted) {
        state.db.accept_connection(&cid)?;
    }

    Ok(Json(serde_json::json!({
        "message": "Connection accepted",
        "connection_id": connection_id,
    })))
}

pub async fn my_connections(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.accepted_connections(&claims.sub.to_string())?;

    let connections: Vec<ConnectionResponse> = rows
        .into_iter()
        .map(|row| ConnectionResponse {
            id: parse_db_uuid(&row.id),
            connected_user_id: parse_db_uuid(&row.connected_user_id),
            first_name: row.first_name,
            last_name: row.last_name,
            college: row.college,
            status: ConnectionStatus::parse(&row.status).unwrap_or(ConnectionStatus::Accepted),
            connection_date: parse_db_time(&row.connection_date),
        })
        .collect();

    Ok(Json(connections))
}

fn group_response(row: GroupRow) -> GroupResponse {
    GroupResponse {
        id: parse_db_uuid(&row.id),
        group_name: row.group_name,
        description: row.description,
        created_by: parse_db_uuid(&row.created_by),
        created_at: parse_db_time(&row.created_at),
        member_count: row.member_count,
    }
}
