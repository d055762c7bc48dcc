//! Authentication gate.
//!
//! Verifies credentials against the record store, drives the session state
//! machine and exposes the authorization predicate every patient and
//! activity-log operation must pass first.

pub mod password;

use tracing::{info, warn};

use crate::audit::AuditTrail;
use crate::db::Database;
use crate::models::{NewUser, Principal, Role};
use crate::{ClinicError, ClinicResult};

/// Session state machine.
///
/// `Anonymous -> Authenticating -> Authenticated`, and back to `Anonymous`
/// on logout or on a failed attempt. The boundary layer owns one value per
/// session and passes it into the gate by mutable reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(Principal),
}

impl Session {
    /// The resolved principal, when authenticated.
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Session::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal().is_some()
    }
}

/// Require a currently-authenticated principal.
///
/// Evaluated per request; never mutates the session. Operations call this
/// before touching the record store.
pub fn authorize(session: &Session) -> ClinicResult<&Principal> {
    session.principal().ok_or(ClinicError::Unauthorized)
}

/// Registration payload. No session is established by registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub full_name: String,
}

impl Registration {
    fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.username.trim().is_empty() {
            problems.push("username is required".into());
        }
        if self.password.is_empty() {
            problems.push("password is required".into());
        }
        if self.full_name.trim().is_empty() {
            problems.push("full_name is required".into());
        }
        problems
    }
}

/// Credential verification and session transitions over the record store.
pub struct AuthGate<'a> {
    db: &'a Database,
}

impl<'a> AuthGate<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Verify credentials and establish the session.
    ///
    /// Lookup is case-insensitive on the username; the password check runs
    /// in constant time against the stored hash. Failures leave the session
    /// anonymous, never touch `last_login` and produce no audit entry. On
    /// success the gate stamps `last_login`, appends a `Login` entry and
    /// returns the public projection of the account.
    pub fn authenticate(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
        remote_ip: &str,
    ) -> ClinicResult<Principal> {
        *session = Session::Authenticating;

        let user = match self.db.get_user_by_username(username)? {
            Some(user) => user,
            None => {
                *session = Session::Anonymous;
                return Err(ClinicError::InvalidCredentials);
            }
        };

        if !password::verify_password(password, &user.password_hash) {
            *session = Session::Anonymous;
            return Err(ClinicError::InvalidCredentials);
        }

        self.db.update_last_login(user.id)?;

        let trail = AuditTrail::new(self.db);
        if let Err(err) = trail.record(user.id, "Login", "User logged in successfully", remote_ip)
        {
            warn!(error = %err, "failed to append login activity");
        }

        info!(username = %user.username, "user authenticated");
        let principal = user.principal();
        *session = Session::Authenticated(principal.clone());
        Ok(principal)
    }

    /// End the session. Idempotent: an already-anonymous caller is a no-op
    /// and produces no audit entry.
    pub fn logout(&self, session: &mut Session, remote_ip: &str) -> ClinicResult<()> {
        let principal = match session.principal() {
            Some(principal) => principal.clone(),
            None => return Ok(()),
        };

        let trail = AuditTrail::new(self.db);
        if let Err(err) = trail.record(principal.id, "Logout", "User logged out", remote_ip) {
            warn!(error = %err, "failed to append logout activity");
        }

        info!(username = %principal.username, "user logged out");
        *session = Session::Anonymous;
        Ok(())
    }

    /// Create a new staff account.
    ///
    /// Fails with `DuplicateKey` when the username is already taken,
    /// case-insensitively. The new account always gets the `staff` role.
    pub fn register(&self, registration: &Registration) -> ClinicResult<Principal> {
        let problems = registration.validate();
        if !problems.is_empty() {
            return Err(ClinicError::Validation(problems));
        }

        if self
            .db
            .get_user_by_username(&registration.username)?
            .is_some()
        {
            return Err(ClinicError::DuplicateKey(format!(
                "username {}",
                registration.username
            )));
        }

        let user = self.db.insert_user(&NewUser {
            username: registration.username.clone(),
            password_hash: password::hash_password(&registration.password),
            full_name: registration.full_name.clone(),
            role: Role::Staff,
            profile_picture: None,
        })?;

        info!(username = %user.username, "registered new staff account");
        Ok(user.principal())
    }
}

/// Create the bootstrap admin account unless one already exists.
pub fn seed_default_admin(db: &Database) -> ClinicResult<()> {
    if db.get_user_by_username("admin")?.is_none() {
        db.insert_user(&NewUser {
            username: "admin".into(),
            password_hash: password::hash_password("admin123"),
            full_name: "System Administrator".into(),
            role: Role::Admin,
            profile_picture: None,
        })?;
        info!("seeded default admin account");
    }
    Ok(())
}
