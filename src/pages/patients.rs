//! Patients page: searchable list on one side, selected patient on the other.
//!
//! SYSTEM CONTEXT
//! ==============
//! The page owns the list and detail state and shares them with the tasks it
//! spawns. List fetches go through the `SearchCoordinator`; record fetches
//! for the selected patient are issued here and guarded by their own
//! `RequestSequence`, so a slow answer for an earlier selection never
//! overwrites a later one.
//!
//! TRADE-OFFS
//! ==========
//! In-flight requests are never aborted. `teardown` only invalidates their
//! tokens, so late responses land on the floor instead of on a dead page.

#[cfg(test)]
#[path = "patients_test.rs"]
mod patients_test;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::components::add_patient_modal::AddPatientModal;
use crate::components::add_report_modal::AddReportModal;
use crate::net::api::PatientsApi;
use crate::net::types::{Patient, PatientId, Record};
use crate::search::{SearchCoordinator, SearchPhase};
use crate::state::detail::{DetailState, DetailView, SUMMARY_FAILED};
use crate::state::lock;
use crate::state::patients::{ListView, PatientListState};
use crate::state::session::Session;
use crate::state::ui::{MISSING_TOKEN_NOTICE, Notices};
use crate::util::highlight::{Segment, highlight_match};
use crate::util::sequence::RequestSequence;

/// Posted when a new patient cannot be shown yet because a search is running.
pub const LIST_REFRESH_SKIPPED: &str = "Patient list is busy; it will show the new patient on the next search.";

pub struct PatientsPage {
    api: Arc<dyn PatientsApi>,
    session: Session,
    notices: Notices,
    list: Arc<Mutex<PatientListState>>,
    detail: Arc<Mutex<DetailState>>,
    records: Arc<RequestSequence>,
    search: SearchCoordinator,
    query: String,
    torn_down: bool,
}

impl PatientsPage {
    #[must_use]
    pub fn new(api: Arc<dyn PatientsApi>, session: Session, notices: Notices, search_delay: Duration) -> Self {
        let list = Arc::new(Mutex::new(PatientListState::default()));
        let search = SearchCoordinator::new(
            Arc::clone(&api),
            session.clone(),
            notices.clone(),
            Arc::clone(&list),
            search_delay,
        );
        Self {
            api,
            session,
            notices,
            list,
            detail: Arc::new(Mutex::new(DetailState::default())),
            records: Arc::new(RequestSequence::new()),
            search,
            query: String::new(),
            torn_down: false,
        }
    }

    // =========================================================================
    // LIST
    // =========================================================================

    /// Initial "list all" fetch when the page opens.
    pub fn mount(&self) -> Option<JoinHandle<()>> {
        info!("patients page mounted");
        self.search.fetch_now("")
    }

    /// Feed the search box's new value.
    pub fn set_query(&mut self, value: &str) {
        value.clone_into(&mut self.query);
        self.search.on_query_changed(value);
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Re-run the current query now, skipping the debounce.
    pub fn refresh(&self) -> Option<JoinHandle<()>> {
        self.search.fetch_now(&self.query)
    }

    #[must_use]
    pub fn search_phase(&self) -> SearchPhase {
        self.search.phase()
    }

    #[must_use]
    pub fn list_view(&self) -> ListView {
        lock(&self.list).view()
    }

    #[must_use]
    pub fn list_revision(&self) -> u64 {
        lock(&self.list).revision
    }

    /// Patient names split around the current query for emphasis.
    #[must_use]
    pub fn highlighted_names(&self) -> Vec<Vec<Segment>> {
        lock(&self.list)
            .items
            .iter()
            .map(|p| highlight_match(&p.name, &self.query))
            .collect()
    }

    // =========================================================================
    // DETAIL
    // =========================================================================

    /// Select the `index`th listed patient and load their records.
    ///
    /// Returns the records task, or `None` when the index is out of range or
    /// nothing was sent.
    pub fn select(&self, index: usize) -> Option<JoinHandle<()>> {
        if self.torn_down {
            return None;
        }
        let Some(patient) = lock(&self.list).get(index).cloned() else {
            debug!(index, "selection out of range");
            return None;
        };
        self.open(patient)
    }

    /// Reload records for the current selection.
    pub fn reload_records(&self) -> Option<JoinHandle<()>> {
        if self.torn_down {
            return None;
        }
        let patient = lock(&self.detail).selected.clone()?;
        self.open(patient)
    }

    fn open(&self, patient: Patient) -> Option<JoinHandle<()>> {
        let patient_id = patient.id.clone();
        // Selection and ticket change together under the detail lock; the
        // response side checks its ticket under the same lock.
        let ticket = {
            let mut detail = lock(&self.detail);
            detail.select(patient);
            self.records.issue()
        };

        let token = match self.session.require_token() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, %patient_id, "records requested while signed out");
                lock(&self.detail).apply_failure();
                self.notices.error(MISSING_TOKEN_NOTICE);
                return None;
            }
        };

        info!(%patient_id, "fetching records");
        let api = Arc::clone(&self.api);
        let detail = Arc::clone(&self.detail);
        let sequence = Arc::clone(&self.records);
        let notices = self.notices.clone();
        Some(tokio::spawn(async move {
            let result = api.fetch_records(&token, &patient_id).await;
            let failed = {
                let mut detail = lock(&detail);
                if !sequence.is_latest(ticket) {
                    debug!(%patient_id, "superseded records response dropped");
                    return;
                }
                match result {
                    Ok(records) => {
                        debug!(%patient_id, count = records.len(), "records loaded");
                        detail.apply_records(records);
                        None
                    }
                    Err(e) => {
                        detail.apply_failure();
                        Some(e)
                    }
                }
            };
            if let Some(e) = failed {
                warn!(error = %e, %patient_id, "records fetch failed");
                notices.error(SUMMARY_FAILED);
            }
        }))
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<PatientId> {
        lock(&self.detail).selected.as_ref().map(|p| p.id.clone())
    }

    #[must_use]
    pub fn detail_view(&self) -> Option<DetailView> {
        lock(&self.detail).view()
    }

    #[must_use]
    pub fn detail_revision(&self) -> u64 {
        lock(&self.detail).revision
    }

    // =========================================================================
    // FORMS
    // =========================================================================

    #[must_use]
    pub fn add_patient_modal(&self) -> AddPatientModal {
        AddPatientModal::new(Arc::clone(&self.api), self.session.clone(), self.notices.clone())
    }

    /// Report form bound to the current selection (if any).
    #[must_use]
    pub fn add_report_modal(&self) -> AddReportModal {
        AddReportModal::new(Arc::clone(&self.api), self.session.clone(), self.notices.clone(), self.selected_id())
    }

    /// Submit `modal` and refresh the list once the patient exists.
    pub async fn add_patient(&self, modal: &mut AddPatientModal) -> Option<Patient> {
        let created = modal.submit().await?;
        match self.refresh() {
            Some(refresh) => {
                let _ = refresh.await;
            }
            None => {
                debug!(patient_id = %created.id, "list refresh skipped; a search is in flight");
                self.notices.info(LIST_REFRESH_SKIPPED);
            }
        }
        Some(created)
    }

    /// Submit `modal` and reload the detail panel if it still shows the
    /// report's patient.
    pub async fn add_report(&self, modal: &mut AddReportModal) -> Option<Record> {
        let stored = modal.submit().await?;
        if modal.patient_id().is_some()
            && modal.patient_id() == self.selected_id().as_ref()
            && let Some(reload) = self.reload_records()
        {
            let _ = reload.await;
        }
        Some(stored)
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Stop the debounce and drop every response still in flight.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.search.teardown();
        let _detail = lock(&self.detail);
        self.records.invalidate();
        info!("patients page torn down");
    }
}

impl Drop for PatientsPage {
    fn drop(&mut self) {
        self.teardown();
    }
}
