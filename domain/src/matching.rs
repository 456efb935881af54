//! Request and response bodies for starting a matching session.

use crate::error::Error;
use events::HospitalId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// KTAS (Korean Triage and Acuity Scale) level, 1 (resuscitation) to 5 (non-urgent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct KtasGrade(u8);

impl KtasGrade {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn level(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for KtasGrade {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(KtasGrade(level))
        } else {
            Err(Error::validation(format!(
                "grade must be between {} and {}, got {level}",
                Self::MIN,
                Self::MAX
            )))
        }
    }
}

impl From<KtasGrade> for u8 {
    fn from(grade: KtasGrade) -> Self {
        grade.0
    }
}

impl fmt::Display for KtasGrade {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "KTAS {}", self.0)
    }
}

/// `POST /matching/start` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartMatchingRequest {
    pub age: String,
    pub sex: String,
    pub category: String,
    pub symptom: String,
    pub remarks: String,
    pub grade: KtasGrade,
    pub lat: f64,
    pub lng: f64,
}

impl StartMatchingRequest {
    /// Checks what the backend cannot recover from: coordinates must be on the globe.
    /// The grade is already range-checked by `KtasGrade`.
    pub fn validate(&self) -> Result<(), Error> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::validation(format!(
                "lat must be between -90 and 90, got {}",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::validation(format!(
                "lng must be between -180 and 180, got {}",
                self.lng
            )));
        }
        Ok(())
    }
}

/// A hospital the backend is about to call.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateHospital {
    pub hospital_id: HospitalId,
    pub hospital_name: String,
    pub hospital_number: String,
}

/// `POST /matching/start` response body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMatchingResponse {
    pub success: bool,
    pub message: String,
    pub patient_id: i64,
    /// Identifier of the status stream for this session.
    pub channel: String,
    #[serde(default)]
    pub hospitals: Vec<CandidateHospital>,
}
