//! Patient query engine.
//!
//! Validated create / partial update / delete over the patient collection,
//! plus the text search and (barangay, recency-window) filters the patient
//! list is browsed with. Every successful mutation appends an activity log
//! entry attributed to the acting principal.

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::audit::AuditTrail;
use crate::db::Database;
use crate::models::{Barangay, Patient, PatientDraft, PatientUpdate, Principal};
use crate::{ClinicError, ClinicResult};

/// Named recency window over a patient's last visit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DateFilter {
    #[serde(rename = "7days")]
    Last7Days,
    #[serde(rename = "30days")]
    Last30Days,
    #[serde(rename = "90days")]
    Last90Days,
    #[serde(rename = "thisYear")]
    ThisYear,
}

impl DateFilter {
    /// Parse the boundary's query-parameter spelling.
    pub fn from_param(s: &str) -> Option<DateFilter> {
        match s {
            "7days" => Some(DateFilter::Last7Days),
            "30days" => Some(DateFilter::Last30Days),
            "90days" => Some(DateFilter::Last90Days),
            "thisYear" => Some(DateFilter::ThisYear),
            _ => None,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            DateFilter::Last7Days => "7days",
            DateFilter::Last30Days => "30days",
            DateFilter::Last90Days => "90days",
            DateFilter::ThisYear => "thisYear",
        }
    }

    /// Start of the window: a visit at or after this instant (and not
    /// after `now`) passes the filter.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            DateFilter::Last7Days => now - Duration::days(7),
            DateFilter::Last30Days => now - Duration::days(30),
            DateFilter::Last90Days => now - Duration::days(90),
            DateFilter::ThisYear => Utc
                .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
                .single()
                .unwrap_or(now),
        }
    }
}

/// Query operations over the patient collection.
pub struct PatientRecords<'a> {
    db: &'a Database,
}

impl<'a> PatientRecords<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a patient record.
    ///
    /// Validation reports every offending field at once. An explicit
    /// `patient_id` colliding with any stored patient fails with
    /// `DuplicateKey` before anything is written.
    pub fn create(
        &self,
        principal: &Principal,
        remote_ip: &str,
        draft: &PatientDraft,
    ) -> ClinicResult<Patient> {
        let problems = validate_draft(draft);
        if !problems.is_empty() {
            return Err(ClinicError::Validation(problems));
        }

        if let Some(pid) = &draft.patient_id {
            if self.db.get_patient_by_patient_id(pid)?.is_some() {
                return Err(ClinicError::DuplicateKey(format!("patient_id {}", pid)));
            }
        }

        let patient = self.db.insert_patient(draft, principal.id)?;
        debug!(patient_id = %patient.patient_id, "created patient record");
        self.audit(
            principal,
            remote_ip,
            "Create Patient",
            &format!(
                "Created patient record for {} {}",
                patient.first_name, patient.last_name
            ),
        );
        Ok(patient)
    }

    /// Apply a partial update to a patient record.
    ///
    /// `created_at` and `created_by` survive every update; a `patient_id`
    /// change colliding with a different patient fails with `DuplicateKey`.
    pub fn update(
        &self,
        principal: &Principal,
        remote_ip: &str,
        id: i64,
        changes: &PatientUpdate,
    ) -> ClinicResult<Patient> {
        let mut patient = match self.db.get_patient(id)? {
            Some(patient) => patient,
            None => return Err(ClinicError::NotFound(format!("patient {}", id))),
        };

        let problems = validate_update(changes);
        if !problems.is_empty() {
            return Err(ClinicError::Validation(problems));
        }

        if let Some(pid) = &changes.patient_id {
            if *pid != patient.patient_id {
                if let Some(other) = self.db.get_patient_by_patient_id(pid)? {
                    if other.id != id {
                        return Err(ClinicError::DuplicateKey(format!("patient_id {}", pid)));
                    }
                }
            }
        }

        changes.apply(&mut patient);
        self.db.update_patient(&patient)?;
        debug!(patient_id = %patient.patient_id, "updated patient record");
        self.audit(
            principal,
            remote_ip,
            "Update Patient",
            &format!(
                "Updated patient record for {} {}",
                patient.first_name, patient.last_name
            ),
        );
        Ok(patient)
    }

    /// Remove a patient record. Hard delete; the store id is never reused.
    pub fn delete(&self, principal: &Principal, remote_ip: &str, id: i64) -> ClinicResult<()> {
        let patient = match self.db.get_patient(id)? {
            Some(patient) => patient,
            None => return Err(ClinicError::NotFound(format!("patient {}", id))),
        };

        self.db.delete_patient(id)?;
        debug!(patient_id = %patient.patient_id, "deleted patient record");
        self.audit(
            principal,
            remote_ip,
            "Delete Patient",
            &format!(
                "Deleted patient record for {} {}",
                patient.first_name, patient.last_name
            ),
        );
        Ok(())
    }

    /// Get one patient by store id.
    pub fn get(&self, id: i64) -> ClinicResult<Patient> {
        self.db
            .get_patient(id)?
            .ok_or_else(|| ClinicError::NotFound(format!("patient {}", id)))
    }

    /// All patients, insertion order.
    pub fn list(&self) -> ClinicResult<Vec<Patient>> {
        Ok(self.db.list_patients()?)
    }

    /// Free-text search.
    ///
    /// Case-insensitive substring match over first name, last name and
    /// patient id; the contact number is matched as a plain substring. An
    /// empty query returns all patients.
    pub fn search(&self, query: &str) -> ClinicResult<Vec<Patient>> {
        let patients = self.db.list_patients()?;
        if query.is_empty() {
            return Ok(patients);
        }

        let needle = query.to_lowercase();
        Ok(patients
            .into_iter()
            .filter(|patient| {
                patient.first_name.to_lowercase().contains(&needle)
                    || patient.last_name.to_lowercase().contains(&needle)
                    || patient.patient_id.to_lowercase().contains(&needle)
                    || patient
                        .contact_number
                        .as_deref()
                        .map_or(false, |contact| contact.contains(query))
            })
            .collect())
    }

    /// Filter by barangay and/or recency of the last visit.
    ///
    /// Both filters compose by logical AND; an absent filter passes all
    /// records through that stage. Patients without a recorded last visit
    /// never pass a date filter.
    pub fn filter(
        &self,
        barangay: Option<Barangay>,
        date_filter: Option<DateFilter>,
    ) -> ClinicResult<Vec<Patient>> {
        let mut patients = self.db.list_patients()?;

        if let Some(code) = barangay {
            patients.retain(|patient| patient.barangay == code);
        }

        if let Some(window) = date_filter {
            let now = Utc::now();
            let cutoff = window.cutoff(now);
            patients.retain(|patient| {
                matches!(patient.last_visit, Some(visit) if visit >= cutoff && visit <= now)
            });
        }

        Ok(patients)
    }

    /// Best-effort audit append; a failure must not abort the mutation it
    /// describes.
    fn audit(&self, principal: &Principal, remote_ip: &str, action: &str, details: &str) {
        let trail = AuditTrail::new(self.db);
        if let Err(err) = trail.record(principal.id, action, details, remote_ip) {
            warn!(action, error = %err, "failed to append activity log entry");
        }
    }
}

fn validate_draft(draft: &PatientDraft) -> Vec<String> {
    let mut problems = Vec::new();
    if draft.first_name.trim().is_empty() {
        problems.push("first_name is required".into());
    }
    if draft.last_name.trim().is_empty() {
        problems.push("last_name is required".into());
    }
    if draft.age < 0 {
        problems.push("age must be >= 0".into());
    }
    if draft.gender.trim().is_empty() {
        problems.push("gender is required".into());
    }
    if draft.address.trim().is_empty() {
        problems.push("address is required".into());
    }
    if draft.barangay.is_none() {
        problems.push("barangay is required".into());
    }
    problems
}

fn validate_update(changes: &PatientUpdate) -> Vec<String> {
    let mut problems = Vec::new();
    if matches!(&changes.patient_id, Some(pid) if pid.trim().is_empty()) {
        problems.push("patient_id must not be empty".into());
    }
    if matches!(&changes.first_name, Some(v) if v.trim().is_empty()) {
        problems.push("first_name must not be empty".into());
    }
    if matches!(&changes.last_name, Some(v) if v.trim().is_empty()) {
        problems.push("last_name must not be empty".into());
    }
    if matches!(changes.age, Some(age) if age < 0) {
        problems.push("age must be >= 0".into());
    }
    if matches!(&changes.gender, Some(v) if v.trim().is_empty()) {
        problems.push("gender must not be empty".into());
    }
    if matches!(&changes.address, Some(v) if v.trim().is_empty()) {
        problems.push("address must not be empty".into());
    }
    problems
}
