//! Activity log models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single append-only activity log entry.
///
/// Entries are created on every authentication and every patient mutation
/// and are never updated or deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityLog {
    /// Store-assigned id
    pub id: i64,
    /// Account the action is attributed to
    pub user_id: i64,
    /// Short action label, e.g. "Login" or "Create Patient"
    pub action: String,
    /// Free-text description of what happened
    pub details: String,
    /// Address the request arrived from, as reported by the boundary
    pub ip_address: String,
    /// Set at creation, immutable thereafter
    pub timestamp: DateTime<Utc>,
}

/// Insert payload for a new activity log entry.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub user_id: i64,
    pub action: String,
    pub details: String,
    pub ip_address: String,
}
