//! Activity log database operations.
//!
//! Entries are append-only: there is deliberately no update or delete here.

use chrono::Utc;
use rusqlite::params;

use super::{parse_timestamp, Database, DbError, DbResult, KIND_ACTIVITY};
use crate::models::{ActivityLog, NewActivity};

impl Database {
    /// Append a new activity log entry, assigning the next id and stamping
    /// the timestamp.
    pub fn insert_activity(&self, entry: &NewActivity) -> DbResult<ActivityLog> {
        let id = self.next_id(KIND_ACTIVITY)?;
        let timestamp = Utc::now();

        self.conn.execute(
            r#"
            INSERT INTO activity_logs (
                id, user_id, action, details, ip_address, timestamp
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                id,
                entry.user_id,
                entry.action,
                entry.details,
                entry.ip_address,
                timestamp.to_rfc3339(),
            ],
        )?;
        self.advance_id(KIND_ACTIVITY)?;

        Ok(ActivityLog {
            id,
            user_id: entry.user_id,
            action: entry.action.clone(),
            details: entry.details.clone(),
            ip_address: entry.ip_address.clone(),
            timestamp,
        })
    }

    /// List every entry, in insertion order. Callers impose presentation
    /// ordering.
    pub fn list_activity(&self) -> DbResult<Vec<ActivityLog>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, action, details, ip_address, timestamp
            FROM activity_logs
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([], map_log_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.try_into()?);
        }
        Ok(entries)
    }

    /// List entries attributed to one account, in insertion order.
    pub fn list_activity_for_user(&self, user_id: i64) -> DbResult<Vec<ActivityLog>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, action, details, ip_address, timestamp
            FROM activity_logs
            WHERE user_id = ?
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([user_id], map_log_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.try_into()?);
        }
        Ok(entries)
    }
}

/// Intermediate row struct for database mapping.
struct LogRow {
    id: i64,
    user_id: i64,
    action: String,
    details: String,
    ip_address: String,
    timestamp: String,
}

fn map_log_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LogRow> {
    Ok(LogRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        action: row.get(2)?,
        details: row.get(3)?,
        ip_address: row.get(4)?,
        timestamp: row.get(5)?,
    })
}

impl TryFrom<LogRow> for ActivityLog {
    type Error = DbError;

    fn try_from(row: LogRow) -> Result<Self, Self::Error> {
        Ok(ActivityLog {
            id: row.id,
            user_id: row.user_id,
            action: row.action,
            details: row.details,
            ip_address: row.ip_address,
            timestamp: parse_timestamp(&row.timestamp)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Role};

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_user(&NewUser {
            username: "staff1".into(),
            password_hash: "salt$digest".into(),
            full_name: "Staff One".into(),
            role: Role::Staff,
            profile_picture: None,
        })
        .unwrap();
        db
    }

    fn make_entry(user_id: i64, action: &str) -> NewActivity {
        NewActivity {
            user_id,
            action: action.into(),
            details: format!("{} happened", action),
            ip_address: "127.0.0.1".into(),
        }
    }

    #[test]
    fn test_append_assigns_sequential_ids() {
        let db = setup_db();

        let first = db.insert_activity(&make_entry(1, "Login")).unwrap();
        let second = db.insert_activity(&make_entry(1, "Logout")).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.action, "Login");
    }

    #[test]
    fn test_list_returns_all_entries() {
        let db = setup_db();
        db.insert_user(&NewUser {
            username: "staff2".into(),
            password_hash: "salt$digest".into(),
            full_name: "Staff Two".into(),
            role: Role::Staff,
            profile_picture: None,
        })
        .unwrap();

        db.insert_activity(&make_entry(1, "Login")).unwrap();
        db.insert_activity(&make_entry(2, "Login")).unwrap();
        db.insert_activity(&make_entry(1, "Logout")).unwrap();

        assert_eq!(db.list_activity().unwrap().len(), 3);

        let for_one = db.list_activity_for_user(1).unwrap();
        assert_eq!(for_one.len(), 2);
        assert!(for_one.iter().all(|e| e.user_id == 1));

        assert!(db.list_activity_for_user(99).unwrap().is_empty());
    }
}
