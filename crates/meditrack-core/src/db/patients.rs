//! Patient database operations.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::{parse_timestamp, Database, DbError, DbResult, KIND_PATIENTS};
use crate::models::{Barangay, Patient, PatientDraft};

const PATIENT_COLUMNS: &str = r#"
    id, patient_id, first_name, last_name, middle_name, age, gender,
    contact_number, address, barangay, medical_history, last_visit,
    profile_picture, created_at, created_by
"#;

impl Database {
    /// Insert a new patient, assigning the next patient id.
    ///
    /// When the draft carries no human-facing `patient_id`, one is derived
    /// from the assigned id as `PT-` plus a zero-padded 4-digit sequence.
    /// `created_at` is stamped here; the barangay must already be present
    /// (validation happens in the query engine).
    pub fn insert_patient(&self, draft: &PatientDraft, created_by: i64) -> DbResult<Patient> {
        let barangay = draft
            .barangay
            .ok_or_else(|| DbError::Constraint("Missing barangay".into()))?;

        let id = self.next_id(KIND_PATIENTS)?;
        let patient_id = match &draft.patient_id {
            Some(pid) => pid.clone(),
            None => format!("PT-{:04}", id),
        };
        let created_at = Utc::now();

        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, patient_id, first_name, last_name, middle_name, age, gender,
                contact_number, address, barangay, medical_history, last_visit,
                profile_picture, created_at, created_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                id,
                patient_id,
                draft.first_name,
                draft.last_name,
                draft.middle_name,
                draft.age,
                draft.gender,
                draft.contact_number,
                draft.address,
                barangay.as_code(),
                draft.medical_history,
                draft.last_visit.map(|t| t.to_rfc3339()),
                draft.profile_picture,
                created_at.to_rfc3339(),
                created_by,
            ],
        )?;
        self.advance_id(KIND_PATIENTS)?;

        Ok(Patient {
            id,
            patient_id,
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            middle_name: draft.middle_name.clone(),
            age: draft.age,
            gender: draft.gender.clone(),
            contact_number: draft.contact_number.clone(),
            address: draft.address.clone(),
            barangay,
            medical_history: draft.medical_history.clone(),
            last_visit: draft.last_visit,
            profile_picture: draft.profile_picture.clone(),
            created_at,
            created_by,
        })
    }

    /// Write back a merged patient record.
    ///
    /// `created_at` and `created_by` are not in the SET list; no update
    /// can touch them.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                patient_id = ?2,
                first_name = ?3,
                last_name = ?4,
                middle_name = ?5,
                age = ?6,
                gender = ?7,
                contact_number = ?8,
                address = ?9,
                barangay = ?10,
                medical_history = ?11,
                last_visit = ?12,
                profile_picture = ?13
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.patient_id,
                patient.first_name,
                patient.last_name,
                patient.middle_name,
                patient.age,
                patient.gender,
                patient.contact_number,
                patient.address,
                patient.barangay.as_code(),
                patient.medical_history,
                patient.last_visit.map(|t| t.to_rfc3339()),
                patient.profile_picture,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by store id.
    pub fn get_patient(&self, id: i64) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
                [id],
                map_patient_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Get a patient by human-facing patient id.
    pub fn get_patient_by_patient_id(&self, patient_id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM patients WHERE patient_id = ?",
                    PATIENT_COLUMNS
                ),
                [patient_id],
                map_patient_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// List all patients in insertion order.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients ORDER BY id",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map([], map_patient_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// Delete a patient. Returns true iff a record existed and was removed.
    /// The id is never handed out again.
    pub fn delete_patient(&self, id: i64) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: i64,
    patient_id: String,
    first_name: String,
    last_name: String,
    middle_name: Option<String>,
    age: i64,
    gender: String,
    contact_number: Option<String>,
    address: String,
    barangay: String,
    medical_history: Option<String>,
    last_visit: Option<String>,
    profile_picture: Option<String>,
    created_at: String,
    created_by: i64,
}

fn map_patient_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        middle_name: row.get(4)?,
        age: row.get(5)?,
        gender: row.get(6)?,
        contact_number: row.get(7)?,
        address: row.get(8)?,
        barangay: row.get(9)?,
        medical_history: row.get(10)?,
        last_visit: row.get(11)?,
        profile_picture: row.get(12)?,
        created_at: row.get(13)?,
        created_by: row.get(14)?,
    })
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let barangay = Barangay::from_code(&row.barangay)
            .ok_or_else(|| DbError::Constraint(format!("Unknown barangay: {}", row.barangay)))?;
        let last_visit = row.last_visit.map(|s| parse_timestamp(&s)).transpose()?;
        let created_at = parse_timestamp(&row.created_at)?;

        Ok(Patient {
            id: row.id,
            patient_id: row.patient_id,
            first_name: row.first_name,
            last_name: row.last_name,
            middle_name: row.middle_name,
            age: row.age,
            gender: row.gender,
            contact_number: row.contact_number,
            address: row.address,
            barangay,
            medical_history: row.medical_history,
            last_visit,
            profile_picture: row.profile_picture,
            created_at,
            created_by: row.created_by,
        })
    }
}
