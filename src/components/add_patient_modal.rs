//! Add-patient form.

#[cfg(test)]
#[path = "add_patient_modal_test.rs"]
mod add_patient_modal_test;

use std::sync::Arc;

use tracing::{info, warn};

use super::ModalStatus;
use crate::net::api::PatientsApi;
use crate::net::types::{NewPatient, Patient};
use crate::state::session::Session;
use crate::state::ui::{MISSING_TOKEN_NOTICE, Notices};

pub const ADD_PATIENT_FAILED: &str = "Failed to add patient. Try again later.";
pub const PATIENT_ADDED: &str = "Patient added.";

pub struct AddPatientModal {
    api: Arc<dyn PatientsApi>,
    session: Session,
    notices: Notices,
    pub name: String,
    pub age: String,
    pub gender: String,
    status: ModalStatus,
}

impl AddPatientModal {
    #[must_use]
    pub fn new(api: Arc<dyn PatientsApi>, session: Session, notices: Notices) -> Self {
        Self {
            api,
            session,
            notices,
            name: String::new(),
            age: String::new(),
            gender: String::new(),
            status: ModalStatus::Editing,
        }
    }

    #[must_use]
    pub fn status(&self) -> ModalStatus {
        self.status
    }

    /// Validate and send the form. Returns the created patient on success.
    ///
    /// Validation, auth and request failures are posted as notices and leave
    /// the form editable.
    pub async fn submit(&mut self) -> Option<Patient> {
        if self.status == ModalStatus::Succeeded {
            return None;
        }
        let patient = match validate_new_patient(&self.name, &self.age, &self.gender) {
            Ok(patient) => patient,
            Err(message) => {
                self.notices.error(message);
                return None;
            }
        };
        let Ok(token) = self.session.require_token() else {
            self.notices.error(MISSING_TOKEN_NOTICE);
            return None;
        };

        match self.api.create_patient(&token, &patient).await {
            Ok(created) => {
                info!(patient_id = %created.id, "patient created");
                self.status = ModalStatus::Succeeded;
                self.notices.info(PATIENT_ADDED);
                Some(created)
            }
            Err(e) => {
                warn!(error = %e, "create patient failed");
                self.notices.error(ADD_PATIENT_FAILED);
                None
            }
        }
    }
}

/// Check the raw field values and build the request body.
///
/// # Errors
///
/// Returns the message to show when a field is blank or the age is not a
/// whole number.
pub fn validate_new_patient(name: &str, age: &str, gender: &str) -> Result<NewPatient, &'static str> {
    let name = name.trim();
    let gender = gender.trim();
    if name.is_empty() {
        return Err("Enter the patient's name.");
    }
    let Ok(age) = age.trim().parse::<u32>() else {
        return Err("Age must be a whole number.");
    };
    if gender.is_empty() {
        return Err("Enter the patient's sex.");
    }
    Ok(NewPatient { name: name.to_owned(), age, gender: gender.to_owned() })
}
