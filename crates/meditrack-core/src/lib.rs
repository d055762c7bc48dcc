//! MediTrack Core Library
//!
//! Storage, query, audit and authentication core of a small clinic
//! patient-records manager.
//!
//! # Architecture
//!
//! ```text
//! Boundary (HTTP / session transport, out of scope)
//!                        │
//!                 [ClinicCore facade]
//!                        │
//!        ┌───────────────┼──────────────────┐
//!        │               │                  │
//!   AuthGate       PatientRecords      AuditTrail
//!  (sessions,      (create/update/    (append-only,
//!   authorize)      delete, search,    newest first)
//!        │           filter)               │
//!        └───────────────┼──────────────────┘
//!                        │
//!                    Database
//!        (in-memory SQLite record store,
//!         per-kind id counters, never reused)
//! ```
//!
//! Every patient and activity-log operation requires a resolved
//! [`Principal`]; the facade evaluates [`auth::authorize`] per call and
//! short-circuits with [`ClinicError::Unauthorized`] before touching the
//! store. Successful mutations append an activity log entry attributed to
//! the acting principal.
//!
//! # Modules
//!
//! - [`db`]: SQLite record store (in-memory by default)
//! - [`models`]: Domain types (User, Patient, ActivityLog, Barangay, ...)
//! - [`auth`]: Session state machine, credential checks, registration
//! - [`records`]: Patient query engine (search and filters included)
//! - [`audit`]: Append-only activity log

pub mod audit;
pub mod auth;
pub mod db;
pub mod models;
pub mod records;

// Re-export commonly used types
pub use audit::AuditTrail;
pub use auth::{authorize, AuthGate, Registration, Session};
pub use db::Database;
pub use models::{
    ActivityLog, Barangay, Patient, PatientDraft, PatientUpdate, Principal, Role, User,
};
pub use records::{DateFilter, PatientRecords};

use std::path::Path;
use std::sync::{Arc, Mutex};

// =========================================================================
// Error Type
// =========================================================================

/// Failure taxonomy surfaced to the boundary layer.
///
/// Every variant is a local, recoverable-by-caller condition; none is
/// fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("store error: {0}")]
    Db(#[from] db::DbError),

    #[error("store unavailable: {0}")]
    Store(String),
}

impl<T> From<std::sync::PoisonError<T>> for ClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicError::Store(format!("Lock poisoned: {}", e))
    }
}

pub type ClinicResult<T> = Result<T, ClinicError>;

// =========================================================================
// Main API Object
// =========================================================================

/// Address recorded on entries emitted through the facade. Real client
/// address capture belongs to the transport layer; component APIs accept
/// it explicitly.
const LOCAL_IP: &str = "127.0.0.1";

/// Thread-safe core handle for the request/response boundary.
///
/// One lock spans each call, so every operation is atomic with respect to
/// the others. Session state is owned by the caller (one [`Session`] per
/// connected client) and passed in explicitly.
pub struct ClinicCore {
    db: Arc<Mutex<Database>>,
}

impl ClinicCore {
    /// Open or create a store at the given path and bootstrap the seed
    /// admin account.
    pub fn open<P: AsRef<Path>>(path: P) -> ClinicResult<Self> {
        let db = Database::open(path)?;
        auth::seed_default_admin(&db)?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// Create an in-memory store (the default deployment shape; nothing
    /// survives a restart) and bootstrap the seed admin account.
    pub fn open_in_memory() -> ClinicResult<Self> {
        let db = Database::open_in_memory()?;
        auth::seed_default_admin(&db)?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    // =====================================================================
    // Authentication Operations
    // =====================================================================

    /// Verify credentials and establish the session.
    pub fn login(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> ClinicResult<Principal> {
        let db = self.db.lock()?;
        AuthGate::new(&db).authenticate(session, username, password, LOCAL_IP)
    }

    /// End the session. Idempotent on an anonymous caller.
    pub fn logout(&self, session: &mut Session) -> ClinicResult<()> {
        let db = self.db.lock()?;
        AuthGate::new(&db).logout(session, LOCAL_IP)
    }

    /// Create a new staff account. Establishes no session.
    pub fn register(&self, registration: &Registration) -> ClinicResult<Principal> {
        let db = self.db.lock()?;
        AuthGate::new(&db).register(registration)
    }

    /// The authenticated caller's own public projection.
    pub fn current_user(&self, session: &Session) -> ClinicResult<Principal> {
        Ok(authorize(session)?.clone())
    }

    // =====================================================================
    // Patient Operations
    // =====================================================================

    /// Browse patients. Free-text search takes precedence; the barangay
    /// and date filters only apply when no search text is present.
    pub fn list_patients(
        &self,
        session: &Session,
        query: &PatientQuery,
    ) -> ClinicResult<Vec<Patient>> {
        authorize(session)?;
        let db = self.db.lock()?;
        let records = PatientRecords::new(&db);
        match &query.search {
            Some(text) => records.search(text),
            None => records.filter(query.barangay, query.date_filter),
        }
    }

    /// Get one patient by store id.
    pub fn get_patient(&self, session: &Session, id: i64) -> ClinicResult<Patient> {
        authorize(session)?;
        let db = self.db.lock()?;
        PatientRecords::new(&db).get(id)
    }

    /// Create a patient record attributed to the caller.
    pub fn create_patient(
        &self,
        session: &Session,
        draft: &PatientDraft,
    ) -> ClinicResult<Patient> {
        let principal = authorize(session)?.clone();
        let db = self.db.lock()?;
        PatientRecords::new(&db).create(&principal, LOCAL_IP, draft)
    }

    /// Apply a partial update to a patient record.
    pub fn update_patient(
        &self,
        session: &Session,
        id: i64,
        changes: &PatientUpdate,
    ) -> ClinicResult<Patient> {
        let principal = authorize(session)?.clone();
        let db = self.db.lock()?;
        PatientRecords::new(&db).update(&principal, LOCAL_IP, id, changes)
    }

    /// Remove a patient record.
    pub fn delete_patient(&self, session: &Session, id: i64) -> ClinicResult<()> {
        let principal = authorize(session)?.clone();
        let db = self.db.lock()?;
        PatientRecords::new(&db).delete(&principal, LOCAL_IP, id)
    }

    // =====================================================================
    // Activity Log Operations
    // =====================================================================

    /// Every activity log entry, most recent first.
    pub fn activity_logs(&self, session: &Session) -> ClinicResult<Vec<ActivityLog>> {
        authorize(session)?;
        let db = self.db.lock()?;
        AuditTrail::new(&db).list_all()
    }

    /// Activity log entries for one account, most recent first.
    pub fn user_activity_logs(
        &self,
        session: &Session,
        user_id: i64,
    ) -> ClinicResult<Vec<ActivityLog>> {
        authorize(session)?;
        let db = self.db.lock()?;
        AuditTrail::new(&db).list_for_user(user_id)
    }
}

/// Patient list query as received from the boundary.
///
/// `search` and the filter pair are mutually exclusive at the call site;
/// when both arrive, search wins and the filters are ignored.
#[derive(Debug, Clone, Default)]
pub struct PatientQuery {
    pub search: Option<String>,
    pub barangay: Option<Barangay>,
    pub date_filter: Option<DateFilter>,
}
