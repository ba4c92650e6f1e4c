//! Wire DTOs for the MedLink REST API.
//!
//! DESIGN
//! ======
//! Response types are validated at deserialization time: patient identifiers
//! and names are required, everything the server may omit is an `Option`. A
//! body that does not fit becomes a typed parse failure instead of a
//! half-filled record.
//!
//! Optional display fields are read leniently. An unusable `age` or
//! `record_type` on one item becomes `None` for that field only, so a single
//! odd row never rejects a whole list.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Patient identifier as issued by the server.
///
/// The API emits numeric ids, but string ids are accepted too so the client
/// never has to care which one a deployment uses.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PatientId(String);

impl PatientId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PatientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => Ok(Self(n.to_string())),
            serde_json::Value::String(s) if !s.trim().is_empty() => Ok(Self(s)),
            _ => Err(D::Error::custom("expected numeric or non-empty string id")),
        }
    }
}

/// A patient as returned by `/api/patients/`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_optional_age")]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
}

/// Body for `POST /api/patients/`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub gender: String,
}

/// Report category accepted by the records endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Diagnoses,
    Medications,
    LabResult,
}

impl RecordType {
    pub const ALL: [Self; 3] = [Self::Diagnoses, Self::Medications, Self::LabResult];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diagnoses => "diagnoses",
            Self::Medications => "medications",
            Self::LabResult => "labresult",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown record type '{s}' (expected diagnoses, medications or labresult)"))
    }
}

/// A patient report as returned by `/api/records/<patient_id>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub id: Option<PatientId>,
    /// Owning patient, when the server echoes it.
    #[serde(default, alias = "patient_id")]
    pub patient: Option<PatientId>,
    /// Report name; the UI labels this "Report type".
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub name: String,
    /// `None` for blank or unrecognised values (older forms could post `""`).
    #[serde(default, deserialize_with = "deserialize_optional_record_type")]
    pub record_type: Option<RecordType>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Body for `POST /api/records/`. `id` is the owning patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewRecord {
    pub id: PatientId,
    pub name: String,
    pub url: String,
    pub record_type: RecordType,
}

/// Body for `POST /api/auth/login/`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub key: Option<String>,
}

/// Error body shape shared by rejected requests.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.detail).filter(|m| !m.trim().is_empty())
    }
}

fn deserialize_optional_age<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(number)) => number
            .as_u64()
            .or_else(|| number.as_f64().and_then(whole_number))
            .and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u32>().ok(),
        _ => None,
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::float_cmp)]
fn whole_number(n: f64) -> Option<u64> {
    (n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX)).then_some(n as u64)
}

fn deserialize_optional_record_type<'de, D>(deserializer: D) -> Result<Option<RecordType>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s.parse::<RecordType>().ok(),
        _ => None,
    })
}

fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
