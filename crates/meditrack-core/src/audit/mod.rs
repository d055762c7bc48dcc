//! Append-only activity audit log.
//!
//! Records who did what, from where, and when. Listings are always newest
//! first; entries sharing a timestamp fall back to id order.

use std::cmp::Reverse;

use tracing::debug;

use crate::db::Database;
use crate::models::{ActivityLog, NewActivity};
use crate::ClinicResult;

/// Recorder and reader for the activity log.
pub struct AuditTrail<'a> {
    db: &'a Database,
}

impl<'a> AuditTrail<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Append an entry describing a completed action.
    ///
    /// Callers treat this as best-effort: a failure here must not abort
    /// the operation the entry describes.
    pub fn record(
        &self,
        user_id: i64,
        action: &str,
        details: &str,
        ip_address: &str,
    ) -> ClinicResult<ActivityLog> {
        let entry = self.db.insert_activity(&NewActivity {
            user_id,
            action: action.into(),
            details: details.into(),
            ip_address: ip_address.into(),
        })?;
        debug!(action, user_id, "recorded activity");
        Ok(entry)
    }

    /// Every entry, most recent first.
    pub fn list_all(&self) -> ClinicResult<Vec<ActivityLog>> {
        let mut entries = self.db.list_activity()?;
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    /// Entries attributed to one account, most recent first.
    pub fn list_for_user(&self, user_id: i64) -> ClinicResult<Vec<ActivityLog>> {
        let mut entries = self.db.list_activity_for_user(user_id)?;
        sort_newest_first(&mut entries);
        Ok(entries)
    }
}

/// Timestamp descending, ties broken by id descending.
fn sort_newest_first(entries: &mut [ActivityLog]) {
    entries.sort_by_key(|entry| Reverse((entry.timestamp, entry.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewUser, Role};
    use chrono::{TimeZone, Utc};

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

    fn entry_at(id: i64, secs: i64) -> ActivityLog {
        ActivityLog {
            id,
            user_id: 1,
            action: "Login".into(),
            details: "User logged in successfully".into(),
            ip_address: "127.0.0.1".into(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[test]
    fn test_record_and_list() {
        let db = setup_db();
        let trail = AuditTrail::new(&db);

        trail.record(1, "Login", "User logged in successfully", "127.0.0.1")
            .unwrap();
        trail.record(1, "Logout", "User logged out", "127.0.0.1")
            .unwrap();

        let entries = trail.list_all().unwrap();
        assert_eq!(entries.len(), 2);
        // Most recent first.
        assert_eq!(entries[0].action, "Logout");
        assert_eq!(entries[1].action, "Login");
    }

    #[test]
    fn test_list_is_non_increasing_by_timestamp() {
        let db = setup_db();
        let trail = AuditTrail::new(&db);

        for i in 0..10 {
            trail
                .record(1, "Update Patient", &format!("edit {}", i), "127.0.0.1")
                .unwrap();
        }

        let entries = trail.list_all().unwrap();
        for pair in entries.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }

    #[test]
    fn test_equal_timestamps_break_ties_by_id() {
        let mut entries = vec![entry_at(3, 100), entry_at(5, 100), entry_at(4, 100)];
        sort_newest_first(&mut entries);

        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[test]
    fn test_mixed_timestamps_and_ids() {
        let mut entries = vec![
            entry_at(1, 200),
            entry_at(2, 100),
            entry_at(3, 100),
            entry_at(4, 300),
        ];
        sort_newest_first(&mut entries);

        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 1, 3, 2]);
    }

    #[test]
    fn test_list_for_user_filters() {
        let db = setup_db();
        db.insert_user(&NewUser {
            username: "staff2".into(),
            password_hash: "salt$digest".into(),
            full_name: "Staff Two".into(),
            role: Role::Staff,
            profile_picture: None,
        })
        .unwrap();
        let trail = AuditTrail::new(&db);

        trail.record(1, "Login", "User logged in successfully", "127.0.0.1")
            .unwrap();
        trail.record(2, "Login", "User logged in successfully", "127.0.0.1")
            .unwrap();
        trail.record(1, "Logout", "User logged out", "127.0.0.1")
            .unwrap();

        let entries = trail.list_for_user(1).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.user_id == 1));
    }
}
