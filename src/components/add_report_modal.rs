//! Add-report form for the selected patient.
//!
//! The form is bound to the patient that was selected when it opened. A
//! form opened with no selection can be filled in but never sends.

#[cfg(test)]
#[path = "add_report_modal_test.rs"]
mod add_report_modal_test;

use std::sync::Arc;

use tracing::{info, warn};

use super::ModalStatus;
use crate::net::api::PatientsApi;
use crate::net::types::{NewRecord, PatientId, Record, RecordType};
use crate::state::session::Session;
use crate::state::ui::{MISSING_TOKEN_NOTICE, Notices};

pub const ID_NOT_FOUND: &str = "Id not found...";
pub const ADD_REPORT_FAILED: &str = "Failed to add report. Try again later.";
pub const REPORT_ADDED: &str = "Report added.";

pub struct AddReportModal {
    api: Arc<dyn PatientsApi>,
    session: Session,
    notices: Notices,
    patient_id: Option<PatientId>,
    pub name: String,
    pub url: String,
    pub record_type: Option<RecordType>,
    status: ModalStatus,
}

impl AddReportModal {
    #[must_use]
    pub fn new(api: Arc<dyn PatientsApi>, session: Session, notices: Notices, patient_id: Option<PatientId>) -> Self {
        Self {
            api,
            session,
            notices,
            patient_id,
            name: String::new(),
            url: String::new(),
            record_type: None,
            status: ModalStatus::Editing,
        }
    }

    #[must_use]
    pub fn patient_id(&self) -> Option<&PatientId> {
        self.patient_id.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> ModalStatus {
        self.status
    }

    /// Send the report. Returns the stored record on success.
    pub async fn submit(&mut self) -> Option<Record> {
        if self.status == ModalStatus::Succeeded {
            return None;
        }
        let Some(patient_id) = self.patient_id.clone() else {
            self.notices.error(ID_NOT_FOUND);
            return None;
        };
        let Some(record_type) = self.record_type else {
            self.notices.error("Select a report type.");
            return None;
        };
        let Ok(token) = self.session.require_token() else {
            self.notices.error(MISSING_TOKEN_NOTICE);
            return None;
        };

        let record = NewRecord {
            id: patient_id,
            name: self.name.trim().to_owned(),
            url: self.url.trim().to_owned(),
            record_type,
        };
        match self.api.create_record(&token, &record).await {
            Ok(stored) => {
                info!(patient_id = %record.id, kind = %record_type, "report created");
                self.status = ModalStatus::Succeeded;
                self.notices.info(REPORT_ADDED);
                Some(stored)
            }
            Err(e) => {
                warn!(error = %e, "create report failed");
                self.notices.error(ADD_REPORT_FAILED);
                None
            }
        }
    }
}
