//! Staff account models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Staff role attached to an account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Regular clinic staff
    Staff,
}

impl Role {
    /// Storage label for the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }

    /// Parse a storage label back into a role.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }
}

/// A staff account as held by the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Store-assigned id
    pub id: i64,
    /// Login name, unique case-insensitively
    pub username: String,
    /// Salted password digest, never exposed through the boundary
    pub password_hash: String,
    /// Display name
    pub full_name: String,
    /// Account role
    pub role: Role,
    /// Optional avatar reference
    pub profile_picture: Option<String>,
    /// Set on each successful authentication
    pub last_login: Option<DateTime<Utc>>,
}

impl User {
    /// Public projection of this account, safe to hand to the boundary.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            role: self.role,
            profile_picture: self.profile_picture.clone(),
        }
    }
}

/// Insert payload for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
    pub profile_picture: Option<String>,
}

/// The resolved identity of an authenticated session.
///
/// Excludes the password hash; this is the value threaded through every
/// patient and activity-log operation for authorization and audit
/// attribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub full_name: String,
    pub role: Role,
    pub profile_picture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels_round_trip() {
        for role in [Role::Admin, Role::Staff] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn test_principal_excludes_hash() {
        let user = User {
            id: 7,
            username: "nurse1".into(),
            password_hash: "salt$digest".into(),
            full_name: "Nina Reyes".into(),
            role: Role::Staff,
            profile_picture: None,
            last_login: None,
        };

        let principal = user.principal();
        assert_eq!(principal.id, 7);
        assert_eq!(principal.username, "nurse1");
        let json = serde_json::to_string(&principal).unwrap();
        assert!(!json.contains("digest"));
    }
}
