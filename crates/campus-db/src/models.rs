/// Database row types — these map directly to SQLite rows.
/// Distinct from campus-types API models to keep the DB layer independent.
/// Ids and timestamps stay TEXT here; parsing happens at the API boundary.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub college: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
}

/// Derived per-counterparty inbox entry. Never stored; produced by a
/// grouped scan over messages.
pub struct ConversationRow {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub college: String,
    pub last_message_at: String,
    pub unread_count: u32,
}

pub struct ConnectionRow {
    pub id: String,
    pub user1_id: String,
    pub user2_id: String,
    pub status: String,
    pub connection_date: String,
}

/// Accepted connection normalized to "the other side" relative to the
/// querying user, joined with their profile summary.
pub struct ConnectionEntryRow {
    pub id: String,
    pub connected_user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub college: String,
    pub status: String,
    pub connection_date: String,
}

pub struct GroupRow {
    pub id: String,
    pub group_name: String,
    pub description: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub member_count: u32,
}

pub struct EventRow {
    pub id: String,
    pub event_name: String,
    pub description: Option<String>,
    pub event_date: String,
    pub location: Option<String>,
    pub group_name: String,
    pub attendee_count: u32,
}

pub struct NotificationRow {
    pub id: String,
    pub kind: String,
    pub message: String,
    pub related_id: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

pub struct AnnouncementRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub target_audience: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: String,
}
