use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            first_name  TEXT NOT NULL,
            last_name   TEXT NOT NULL,
            college     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS messages (
            id              TEXT PRIMARY KEY,
            sender_id       TEXT NOT NULL REFERENCES users(id),
            recipient_id    TEXT NOT NULL REFERENCES users(id),
            content         TEXT NOT NULL,
            is_read         INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_sender
            ON messages(sender_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_messages_recipient
            ON messages(recipient_id, created_at);

        CREATE TABLE IF NOT EXISTS connections (
            id              TEXT PRIMARY KEY,
            user1_id        TEXT NOT NULL REFERENCES users(id),
            user2_id        TEXT NOT NULL REFERENCES users(id),
            status          TEXT NOT NULL DEFAULT 'pending',
            connection_date TEXT NOT NULL DEFAULT (datetime('now')),
            CHECK (user1_id <> user2_id)
        );

        -- One row per unordered pair regardless of who initiated. The
        -- handler-level existence check is advisory; this index is the
        -- actual guarantee under concurrent requests.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_connections_pair
            ON connections(min(user1_id, user2_id), max(user1_id, user2_id));

        CREATE TABLE IF NOT EXISTS student_groups (
            id          TEXT PRIMARY KEY,
            group_name  TEXT NOT NULL,
            description TEXT,
            created_by  TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS group_members (
            group_id    TEXT NOT NULL REFERENCES student_groups(id),
            student_id  TEXT NOT NULL REFERENCES users(id),
            joined_date TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(group_id, student_id)
        );

        CREATE TABLE IF NOT EXISTS events (
            id          TEXT PRIMARY KEY,
            group_id    TEXT NOT NULL REFERENCES student_groups(id),
            event_name  TEXT NOT NULL,
            description TEXT,
            event_date  TEXT NOT NULL,
            location    TEXT,
            created_by  TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_events_date
            ON events(event_date);

        CREATE TABLE IF NOT EXISTS event_attendees (
            event_id    TEXT NOT NULL REFERENCES events(id),
            student_id  TEXT NOT NULL REFERENCES users(id),
            status      TEXT NOT NULL,
            UNIQUE(event_id, student_id)
        );

        CREATE TABLE IF NOT EXISTS notifications (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            type        TEXT NOT NULL,
            message     TEXT NOT NULL,
            related_id  TEXT,
            is_read     INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_user
            ON notifications(user_id, created_at);

        CREATE TABLE IF NOT EXISTS announcements (
            id              TEXT PRIMARY KEY,
            sender_id       TEXT NOT NULL REFERENCES users(id),
            title           TEXT NOT NULL,
            content         TEXT NOT NULL,
            target_audience TEXT NOT NULL DEFAULT 'all',
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
