use rusqlite::Connection;

use crate::Database;
use crate::Result;
use crate::models::UserRow;
use crate::queries::OptionalExt;

impl Database {
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        college: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password, first_name, last_name, college)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, username, password_hash, first_name, last_name, college),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn user_exists(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row("SELECT 1 FROM users WHERE id = ?1", [id], |_| Ok(()))
                .optional()?;
            Ok(found.is_some())
        })
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password, first_name, last_name, college, created_at
         FROM users WHERE username = ?1",
    )?;

    let row = stmt.query_row([username], map_user_row).optional()?;

    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password, first_name, last_name, college, created_at
         FROM users WHERE id = ?1",
    )?;

    let row = stmt.query_row([id], map_user_row).optional()?;

    Ok(row)
}

fn map_user_row(row: &rusqlite::Row<'_>) -> std::result::Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        college: row.get(5)?,
        created_at: row.get(6)?,
    })
}
