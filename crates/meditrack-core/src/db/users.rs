//! Staff account database operations.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{parse_timestamp, Database, DbError, DbResult, KIND_USERS};
use crate::models::{NewUser, Role, User};

impl Database {
    /// Insert a new account, assigning the next user id.
    pub fn insert_user(&self, user: &NewUser) -> DbResult<User> {
        let id = self.next_id(KIND_USERS)?;

        self.conn.execute(
            r#"
            INSERT INTO users (
                id, username, password_hash, full_name, role, profile_picture
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                id,
                user.username,
                user.password_hash,
                user.full_name,
                user.role.as_str(),
                user.profile_picture,
            ],
        )?;
        self.advance_id(KIND_USERS)?;

        Ok(User {
            id,
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            profile_picture: user.profile_picture.clone(),
            last_login: None,
        })
    }

    /// Get an account by id.
    pub fn get_user(&self, id: i64) -> DbResult<Option<User>> {
        self.conn
            .query_row(
                r#"
                SELECT id, username, password_hash, full_name, role, profile_picture, last_login
                FROM users
                WHERE id = ?
                "#,
                [id],
                map_user_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Get an account by username, matched case-insensitively.
    pub fn get_user_by_username(&self, username: &str) -> DbResult<Option<User>> {
        self.conn
            .query_row(
                r#"
                SELECT id, username, password_hash, full_name, role, profile_picture, last_login
                FROM users
                WHERE username = ?1 COLLATE NOCASE
                "#,
                [username],
                map_user_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Stamp the last-login time of an account, returning the updated
    /// record or `None` if the id is absent.
    pub fn update_last_login(&self, id: i64) -> DbResult<Option<User>> {
        let now = Utc::now().to_rfc3339();
        let rows_affected = self.conn.execute(
            "UPDATE users SET last_login = ?2 WHERE id = ?1",
            params![id, now],
        )?;
        if rows_affected == 0 {
            return Ok(None);
        }
        self.get_user(id)
    }
}

/// Intermediate row struct for database mapping.
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    full_name: String,
    role: String,
    profile_picture: Option<String>,
    last_login: Option<String>,
}

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        full_name: row.get(3)?,
        role: row.get(4)?,
        profile_picture: row.get(5)?,
        last_login: row.get(6)?,
    })
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role)
            .ok_or_else(|| DbError::Constraint(format!("Unknown role: {}", row.role)))?;
        let last_login = row
            .last_login
            .map(|s| parse_timestamp(&s))
            .transpose()?;

        Ok(User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            full_name: row.full_name,
            role,
            profile_picture: row.profile_picture,
            last_login,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn make_user(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            password_hash: "salt$digest".into(),
            full_name: "Test User".into(),
            role: Role::Staff,
            profile_picture: None,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let user = db.insert_user(&make_user("nurse1")).unwrap();
        assert_eq!(user.id, 1);
        assert!(user.last_login.is_none());

        let retrieved = db.get_user(user.id).unwrap().unwrap();
        assert_eq!(retrieved, user);
    }

    #[test]
    fn test_ids_are_sequential() {
        let db = setup_db();

        let first = db.insert_user(&make_user("one")).unwrap();
        let second = db.insert_user(&make_user("two")).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let db = setup_db();
        db.insert_user(&make_user("Admin")).unwrap();

        let found = db.get_user_by_username("admin").unwrap();
        assert!(found.is_some());
        let found = db.get_user_by_username("ADMIN").unwrap();
        assert_eq!(found.unwrap().username, "Admin");

        assert!(db.get_user_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn test_update_last_login() {
        let db = setup_db();
        let user = db.insert_user(&make_user("nurse1")).unwrap();

        let updated = db.update_last_login(user.id).unwrap().unwrap();
        assert!(updated.last_login.is_some());

        assert!(db.update_last_login(999).unwrap().is_none());
    }
}
