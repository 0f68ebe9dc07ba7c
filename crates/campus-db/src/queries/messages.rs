use crate::Database;
use crate::Result;
use crate::models::{AnnouncementRow, ConversationRow, MessageRow, NotificationRow};
use crate::queries::OptionalExt;

impl Database {
    // -- Message ledger --

    pub fn insert_message(
        &self,
        id: &str,
        sender_id: &str,
        recipient_id: &str,
        content: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, sender_id, recipient_id, content, is_read)
                 VALUES (?1, ?2, ?3, ?4, 0)",
                (id, sender_id, recipient_id, content),
            )?;
            Ok(())
        })
    }

    pub fn get_message(&self, id: &str) -> Result<Option<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender_id, recipient_id, content, is_read, created_at
                 FROM messages WHERE id = ?1",
            )?;
            let row = stmt.query_row([id], map_message_row).optional()?;
            Ok(row)
        })
    }

    /// Full history between two users, both directions, oldest first.
    /// created_at has second resolution, so rowid breaks ties in
    /// insertion order.
    pub fn message_history(&self, user_a: &str, user_b: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, sender_id, recipient_id, content, is_read, created_at
                 FROM messages
                 WHERE (sender_id = ?1 AND recipient_id = ?2)
                    OR (sender_id = ?2 AND recipient_id = ?1)
                 ORDER BY created_at ASC, rowid ASC",
            )?;

            let rows = stmt
                .query_map([user_a, user_b], map_message_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn mark_message_read(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE messages SET is_read = 1 WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Conversation projection --

    /// Derives the inbox view for one user: one entry per counterparty,
    /// most recently active first, capped at 50. Unread counts only
    /// messages addressed to the user. Recomputed on every call so it
    /// always reflects the latest read state.
    pub fn list_conversations(&self, user_id: &str) -> Result<Vec<ConversationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT other.id, other.first_name, other.last_name, other.college,
                        MAX(m.created_at) AS last_message_at,
                        SUM(CASE WHEN m.recipient_id = ?1 AND m.is_read = 0
                                 THEN 1 ELSE 0 END) AS unread_count
                 FROM messages m
                 JOIN users other
                   ON other.id = CASE WHEN m.sender_id = ?1
                                      THEN m.recipient_id
                                      ELSE m.sender_id END
                 WHERE m.sender_id = ?1 OR m.recipient_id = ?1
                 GROUP BY other.id
                 ORDER BY last_message_at DESC, other.id ASC
                 LIMIT 50",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(ConversationRow {
                        user_id: row.get(0)?,
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                        college: row.get(3)?,
                        last_message_at: row.get(4)?,
                        unread_count: row.get::<_, i64>(5)? as u32,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Notifications --

    pub fn insert_notification(
        &self,
        id: &str,
        user_id: &str,
        kind: &str,
        message: &str,
        related_id: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notifications (id, user_id, type, message, related_id, is_read)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)",
                (id, user_id, kind, message, related_id),
            )?;
            Ok(())
        })
    }

    pub fn list_notifications(&self, user_id: &str) -> Result<Vec<NotificationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, type, message, related_id, is_read, created_at
                 FROM notifications
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT 50",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(NotificationRow {
                        id: row.get(0)?,
                        kind: row.get(1)?,
                        message: row.get(2)?,
                        related_id: row.get(3)?,
                        is_read: row.get(4)?,
                        created_at: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn get_notification_owner(&self, id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let owner = conn
                .query_row(
                    "SELECT user_id FROM notifications WHERE id = ?1",
                    [id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(owner)
        })
    }

    pub fn mark_notification_read(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE notifications SET is_read = 1 WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Announcements --

    pub fn insert_announcement(
        &self,
        id: &str,
        sender_id: &str,
        title: &str,
        content: &str,
        target_audience: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO announcements (id, sender_id, title, content, target_audience)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, sender_id, title, content, target_audience),
            )?;
            Ok(())
        })
    }

    pub fn list_announcements(&self) -> Result<Vec<AnnouncementRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT a.id, a.title, a.content, a.target_audience,
                        u.first_name, u.last_name, a.created_at
                 FROM announcements a
                 JOIN users u ON a.sender_id = u.id
                 ORDER BY a.created_at DESC, a.rowid DESC
                 LIMIT 50",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(AnnouncementRow {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        content: row.get(2)?,
                        target_audience: row.get(3)?,
                        first_name: row.get(4)?,
                        last_name: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn map_message_row(row: &rusqlite::Row<'_>) -> std::result::Result<MessageRow, rusqlite::Error> {
    Ok(MessageRow {
        id: row.get(0)?,
        sender_id: row.get(1)?,
        recipient_id: row.get(2)?,
        content: row.get(3)?,
        is_read: row.get(4)?,
        created_at: row.get(5)?,
    })
}
