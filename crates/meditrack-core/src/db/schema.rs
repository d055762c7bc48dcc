//! SQLite schema definition.

/// Complete database schema for the MediTrack core.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Staff accounts
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash TEXT NOT NULL,
    full_name TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'staff' CHECK (role IN ('admin', 'staff')),
    profile_picture TEXT,
    last_login TEXT
);

-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY,
    patient_id TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    middle_name TEXT,
    age INTEGER NOT NULL CHECK (age >= 0),
    gender TEXT NOT NULL,
    contact_number TEXT,
    address TEXT NOT NULL,
    barangay TEXT NOT NULL CHECK (barangay IN
        ('191', '192', '193', '194', '195', '196', '197', '198', '199', '200')),
    medical_history TEXT,
    last_visit TEXT,
    profile_picture TEXT,
    created_at TEXT NOT NULL,
    created_by INTEGER NOT NULL REFERENCES users(id)
);

CREATE INDEX IF NOT EXISTS idx_patients_barangay ON patients(barangay);
CREATE INDEX IF NOT EXISTS idx_patients_last_visit ON patients(last_visit);

-- ============================================================================
-- Activity Log (Append-Only - Immutable after creation)
-- ============================================================================

CREATE TABLE IF NOT EXISTS activity_logs (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id),
    action TEXT NOT NULL,
    details TEXT NOT NULL,
    ip_address TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_activity_user ON activity_logs(user_id);
CREATE INDEX IF NOT EXISTS idx_activity_timestamp ON activity_logs(timestamp);

-- ============================================================================
-- Id sequences (one counter per entity kind, never reused)
-- ============================================================================

CREATE TABLE IF NOT EXISTS id_seq (
    kind TEXT PRIMARY KEY,
    next INTEGER NOT NULL
);

-- Initialize counters
INSERT OR IGNORE INTO id_seq (kind, next) VALUES ('users', 1);
INSERT OR IGNORE INTO id_seq (kind, next) VALUES ('patients', 1);
INSERT OR IGNORE INTO id_seq (kind, next) VALUES ('activity_logs', 1);
"#;
