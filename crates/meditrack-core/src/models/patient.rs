//! Patient record models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Locality code classifying a patient's residence area.
///
/// The clinic serves a fixed set of ten barangays; the codes are stored and
/// exchanged as their literal three-digit strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Barangay {
    #[serde(rename = "191")]
    B191,
    #[serde(rename = "192")]
    B192,
    #[serde(rename = "193")]
    B193,
    #[serde(rename = "194")]
    B194,
    #[serde(rename = "195")]
    B195,
    #[serde(rename = "196")]
    B196,
    #[serde(rename = "197")]
    B197,
    #[serde(rename = "198")]
    B198,
    #[serde(rename = "199")]
    B199,
    #[serde(rename = "200")]
    B200,
}

impl Barangay {
    /// Every recognized barangay code.
    pub const ALL: [Barangay; 10] = [
        Barangay::B191,
        Barangay::B192,
        Barangay::B193,
        Barangay::B194,
        Barangay::B195,
        Barangay::B196,
        Barangay::B197,
        Barangay::B198,
        Barangay::B199,
        Barangay::B200,
    ];

    /// The literal code, as stored and displayed.
    pub fn as_code(&self) -> &'static str {
        match self {
            Barangay::B191 => "191",
            Barangay::B192 => "192",
            Barangay::B193 => "193",
            Barangay::B194 => "194",
            Barangay::B195 => "195",
            Barangay::B196 => "196",
            Barangay::B197 => "197",
            Barangay::B198 => "198",
            Barangay::B199 => "199",
            Barangay::B200 => "200",
        }
    }

    /// Parse a literal code back into a barangay.
    pub fn from_code(code: &str) -> Option<Barangay> {
        Barangay::ALL.iter().copied().find(|b| b.as_code() == code)
    }
}

/// A patient record as held by the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Store-assigned id
    pub id: i64,
    /// Human-facing identifier, unique across all stored patients
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    /// Age in years, never negative
    pub age: i64,
    pub gender: String,
    pub contact_number: Option<String>,
    pub address: String,
    pub barangay: Barangay,
    pub medical_history: Option<String>,
    /// Most recent visit, if any; drives the recency-window filters
    pub last_visit: Option<DateTime<Utc>>,
    pub profile_picture: Option<String>,
    /// Set at creation, immutable thereafter
    pub created_at: DateTime<Utc>,
    /// Id of the account that created the record, immutable thereafter
    pub created_by: i64,
}

/// Create payload for a new patient record.
///
/// When `patient_id` is absent the store derives one from the id sequence
/// (`PT-0001`, `PT-0002`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientDraft {
    pub patient_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub age: i64,
    pub gender: String,
    pub contact_number: Option<String>,
    pub address: String,
    pub barangay: Option<Barangay>,
    pub medical_history: Option<String>,
    pub last_visit: Option<DateTime<Utc>>,
    pub profile_picture: Option<String>,
}

/// Partial update for an existing patient record.
///
/// `None` means "leave the field alone". Nullable fields use a second
/// `Option` level so `Some(None)` clears the stored value while `None`
/// keeps it. `created_at` and `created_by` have no counterpart here; they
/// cannot be changed through any update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientUpdate {
    pub patient_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<Option<String>>,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub contact_number: Option<Option<String>>,
    pub address: Option<String>,
    pub barangay: Option<Barangay>,
    pub medical_history: Option<Option<String>>,
    pub last_visit: Option<Option<DateTime<Utc>>>,
    pub profile_picture: Option<Option<String>>,
}

impl PatientUpdate {
    /// Merge the provided fields into an existing record.
    pub fn apply(&self, patient: &mut Patient) {
        if let Some(v) = &self.patient_id {
            patient.patient_id = v.clone();
        }
        if let Some(v) = &self.first_name {
            patient.first_name = v.clone();
        }
        if let Some(v) = &self.last_name {
            patient.last_name = v.clone();
        }
        if let Some(v) = &self.middle_name {
            patient.middle_name = v.clone();
        }
        if let Some(v) = self.age {
            patient.age = v;
        }
        if let Some(v) = &self.gender {
            patient.gender = v.clone();
        }
        if let Some(v) = &self.contact_number {
            patient.contact_number = v.clone();
        }
        if let Some(v) = &self.address {
            patient.address = v.clone();
        }
        if let Some(v) = self.barangay {
            patient.barangay = v;
        }
        if let Some(v) = &self.medical_history {
            patient.medical_history = v.clone();
        }
        if let Some(v) = self.last_visit {
            patient.last_visit = v;
        }
        if let Some(v) = &self.profile_picture {
            patient.profile_picture = v.clone();
        }
    }

    /// True when no field is provided at all.
    pub fn is_empty(&self) -> bool {
        self.patient_id.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.middle_name.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.contact_number.is_none()
            && self.address.is_none()
            && self.barangay.is_none()
            && self.medical_history.is_none()
            && self.last_visit.is_none()
            && self.profile_picture.is_none()
    }
}
