use crate::Database;
use crate::Result;
use crate::models::{ConnectionEntryRow, ConnectionRow, EventRow, GroupRow};
use crate::queries::OptionalExt;

impl Database {
    // -- Groups --

    /// Group insert and creator self-membership commit together; a failure
    /// in either leaves no trace of the group.
    pub fn create_group(
        &self,
        id: &str,
        group_name: &str,
        description: Option<&str>,
        created_by: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO student_groups (id, group_name, description, created_by)
                 VALUES (?1, ?2, ?3, ?4)",
                (id, group_name, description, created_by),
            )?;
            tx.execute(
                "INSERT INTO group_members (group_id, student_id) VALUES (?1, ?2)",
                (id, created_by),
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn list_groups(&self) -> Result<Vec<GroupRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT g.id, g.group_name, g.description, g.created_by, g.created_at,
                        COUNT(gm.student_id) AS member_count
                 FROM student_groups g
                 LEFT JOIN group_members gm ON g.id = gm.group_id
                 GROUP BY g.id
                 ORDER BY g.created_at DESC, g.rowid DESC",
            )?;

            let rows = stmt
                .query_map([], map_group_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn groups_for_member(&self, user_id: &str) -> Result<Vec<GroupRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT g.id, g.group_name, g.description, g.created_by, g.created_at,
                        (SELECT COUNT(*) FROM group_members c
                          WHERE c.group_id = g.id) AS member_count
                 FROM student_groups g
                 JOIN group_members gm ON g.id = gm.group_id
                 WHERE gm.student_id = ?1
                 ORDER BY g.created_at DESC, g.rowid DESC",
            )?;

            let rows = stmt
                .query_map([user_id], map_group_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn group_exists(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row("SELECT 1 FROM student_groups WHERE id = ?1", [id], |_| {
                    Ok(())
                })
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn is_group_member(&self, group_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM group_members WHERE group_id = ?1 AND student_id = ?2",
                    [group_id, user_id],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn insert_group_member(&self, group_id: &str, user_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO group_members (group_id, student_id) VALUES (?1, ?2)",
                (group_id, user_id),
            )?;
            Ok(())
        })
    }

    // -- Events --

    pub fn insert_event(
        &self,
        id: &str,
        group_id: &str,
        event_name: &str,
        description: Option<&str>,
        event_date: &str,
        location: Option<&str>,
        created_by: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (id, group_id, event_name, description, event_date, location, created_by)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                (id, group_id, event_name, description, event_date, location, created_by),
            )?;
            Ok(())
        })
    }

    pub fn list_events(&self) -> Result<Vec<EventRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT e.id, e.event_name, e.description, e.event_date, e.location,
                        g.group_name,
                        COUNT(ea.student_id) AS attendee_count
                 FROM events e
                 JOIN student_groups g ON e.group_id = g.id
                 LEFT JOIN event_attendees ea ON e.id = ea.event_id
                 GROUP BY e.id
                 ORDER BY e.event_date ASC",
            )?;

            let rows = stmt
                .query_map([], |row| {
                    Ok(EventRow {
                        id: row.get(0)?,
                        event_name: row.get(1)?,
                        description: row.get(2)?,
                        event_date: row.get(3)?,
                        location: row.get(4)?,
                        group_name: row.get(5)?,
                        attendee_count: row.get::<_, i64>(6)? as u32,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn event_exists(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row("SELECT 1 FROM events WHERE id = ?1", [id], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn attendance_exists(&self, event_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM event_attendees WHERE event_id = ?1 AND student_id = ?2",
                    [event_id, user_id],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn insert_attendance(&self, event_id: &str, user_id: &str, status: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO event_attendees (event_id, student_id, status) VALUES (?1, ?2, ?3)",
                (event_id, user_id, status),
            )?;
            Ok(())
        })
    }

    // -- Connections --

    /// Looks the pair up in either direction; callers use this as the
    /// advisory duplicate check before inserting.
    pub fn find_connection_between(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> Result<Option<ConnectionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user1_id, user2_id, status, connection_date
                 FROM connections
                 WHERE (user1_id = ?1 AND user2_id = ?2)
                    OR (user1_id = ?2 AND user2_id = ?1)",
            )?;
            let row = stmt.query_row([user_a, user_b], map_connection_row).optional()?;
            Ok(row)
        })
    }

    pub fn get_connection(&self, id: &str) -> Result<Option<ConnectionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user1_id, user2_id, status, connection_date
                 FROM connections WHERE id = ?1",
            )?;
            let row = stmt.query_row([id], map_connection_row).optional()?;
            Ok(row)
        })
    }

    /// Requester is always stored as user1_id.
    pub fn insert_connection(&self, id: &str, requester: &str, target: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO connections (id, user1_id, user2_id, status)
                 VALUES (?1, ?2, ?3, 'pending')",
                (id, requester, target),
            )?;
            Ok(())
        })
    }

    pub fn accept_connection(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE connections SET status = 'accepted' WHERE id = ?1",
                [id],
            )?;
            Ok(())
        })
    }

    pub fn accepted_connections(&self, user_id: &str) -> Result<Vec<ConnectionEntryRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id,
                        CASE WHEN c.user1_id = ?1 THEN c.user2_id ELSE c.user1_id END
                            AS connected_user_id,
                        u.first_name, u.last_name, u.college,
                        c.status, c.connection_date
                 FROM connections c
                 JOIN users u
                   ON u.id = CASE WHEN c.user1_id = ?1 THEN c.user2_id ELSE c.user1_id END
                 WHERE (c.user1_id = ?1 OR c.user2_id = ?1)
                   AND c.status = 'accepted'
                 ORDER BY c.connection_date DESC, c.rowid DESC",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(ConnectionEntryRow {
                        id: row.get(0)?,
                        connected_user_id: row.get(1)?,
                        first_name: row.get(2)?,
                        last_name: row.get(3)?,
                        college: row.get(4)?,
                        status: row.get(5)?,
                        connection_date: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn map_group_row(row: &rusqlite::Row<'_>) -> std::result::Result<GroupRow, rusqlite::Error> {
    Ok(GroupRow {
        id: row.get(0)?,
        group_name: row.get(1)?,
        description: row.get(2)?,
        created_by: row.get(3)?,
        created_at: row.get(4)?,
        member_count: row.get::<_, i64>(5)? as u32,
    })
}

fn map_connection_row(
    row: &rusqlite::Row<'_>,
) -> std::result::Result<ConnectionRow, rusqlite::Error> {
    Ok(ConnectionRow {
        id: row.get(0)?,
        user1_id: row.get(1)?,
        user2_id: row.get(2)?,
        status: row.get(3)?,
        connection_date: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::{Database, StoreError};

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn seed_user(db: &Database, id: &str, name: &str) {
        db.create_user(id, name, "hash", name, "Tester", "Engineering")
            .unwrap();
    }

    #[test]
    fn create_group_enrolls_creator() {
        let db = db();
        seed_user(&db, "u1", "creator");

        db.create_group("g1", "Chess Club", Some("weekly games"), "u1")
            .unwrap();

        let groups = db.list_groups().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].group_name, "Chess Club");
        assert_eq!(groups[0].member_count, 1);
        assert!(db.is_group_member("g1", "u1").unwrap());

        let mine = db.groups_for_member("u1").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "g1");
    }

    #[test]
    fn create_group_is_atomic() {
        let db = db();
        // creator does not exist, so the membership FK fails; the group
        // insert must roll back with it
        let err = db.create_group("g1", "Ghost Group", None, "nobody");
        assert!(err.is_err());
        assert_eq!(db.list_groups().unwrap().len(), 0);
        assert!(!db.group_exists("g1").unwrap());
    }

    #[test]
    fn duplicate_membership_is_unique_violation() {
        let db = db();
        seed_user(&db, "u1", "creator");
        seed_user(&db, "u2", "member");
        db.create_group("g1", "Chess Club", None, "u1").unwrap();

        db.insert_group_member("g1", "u2").unwrap();
        let err = db.insert_group_member("g1", "u2").unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation));
    }

    #[test]
    fn duplicate_attendance_is_unique_violation() {
        let db = db();
        seed_user(&db, "u1", "creator");
        db.create_group("g1", "Chess Club", None, "u1").unwrap();
        db.insert_event(
            "e1",
            "g1",
            "Tournament",
            None,
            "2026-10-01T18:00:00+00:00",
            Some("Hall B"),
            "u1",
        )
        .unwrap();

        db.insert_attendance("e1", "u1", "attending").unwrap();
        let err = db.insert_attendance("e1", "u1", "interested").unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation));

        let events = db.list_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].attendee_count, 1);
        assert_eq!(events[0].group_name, "Chess Club");
    }

    #[test]
    fn event_creator_is_not_auto_registered() {
        let db = db();
        seed_user(&db, "u1", "creator");
        db.create_group("g1", "Chess Club", None, "u1").unwrap();
        db.insert_event(
            "e1",
            "g1",
            "Tournament",
            None,
            "2026-10-01T18:00:00+00:00",
            None,
            "u1",
        )
        .unwrap();

        assert!(!db.attendance_exists("e1", "u1").unwrap());
        assert_eq!(db.list_events().unwrap()[0].attendee_count, 0);
    }

    #[test]
    fn connection_pair_unique_regardless_of_direction() {
        let db = db();
        seed_user(&db, "a", "alice");
        seed_user(&db, "b", "bob");

        db.insert_connection("c1", "a", "b").unwrap();

        // store-level guarantee: even without the advisory pre-check the
        // reversed insert is rejected
        let err = db.insert_connection("c2", "b", "a").unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation));

        assert!(db.find_connection_between("b", "a").unwrap().is_some());
    }

    #[test]
    fn accepted_connections_normalize_to_other_side() {
        let db = db();
        seed_user(&db, "a", "alice");
        seed_user(&db, "b", "bob");
        seed_user(&db, "c", "carol");

        db.insert_connection("c1", "a", "b").unwrap();
        db.insert_connection("c2", "c", "a").unwrap();
        db.accept_connection("c1").unwrap();

        // pending rows stay hidden
        let accepted = db.accepted_connections("a").unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].connected_user_id, "b");
        assert_eq!(accepted[0].status, "accepted");

        // the other party sees the same row from their side
        let accepted = db.accepted_connections("b").unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].connected_user_id, "a");

        // accepting twice is a no-op
        db.accept_connection("c1").unwrap();
        assert_eq!(db.accepted_connections("a").unwrap().len(), 1);
    }
}
