//! Patient-list state for the patients page.
//!
//! DESIGN
//! ======
//! Results replace the list wholesale; there is no merge. `revision` bumps on
//! every applied response so front ends can cheaply detect a redraw.

#[cfg(test)]
#[path = "patients_test.rs"]
mod patients_test;

use crate::net::types::Patient;

pub const NO_PATIENT_DATA: &str = "No Patient Data";
pub const FETCHING_DATA: &str = "Fetching Data...";

#[derive(Clone, Debug, Default)]
pub struct PatientListState {
    pub items: Vec<Patient>,
    pub loading: bool,
    /// Query the current `items` were fetched for.
    pub query: String,
    pub revision: u64,
}

/// What the list area should show.
#[derive(Clone, Debug, PartialEq)]
pub enum ListView {
    Fetching,
    NoData,
    Rows(Vec<Patient>),
}

impl PatientListState {
    pub fn begin_fetch(&mut self) {
        self.loading = true;
    }

    pub fn apply_results(&mut self, query: String, items: Vec<Patient>) {
        self.items = items;
        self.query = query;
        self.loading = false;
        self.revision += 1;
    }

    pub fn apply_failure(&mut self, query: String) {
        self.items.clear();
        self.query = query;
        self.loading = false;
        self.revision += 1;
    }

    /// Drop the loading flag without touching items (superseded response).
    pub fn settle(&mut self) {
        self.loading = false;
    }

    #[must_use]
    pub fn view(&self) -> ListView {
        if !self.items.is_empty() {
            ListView::Rows(self.items.clone())
        } else if self.loading {
            ListView::Fetching
        } else {
            ListView::NoData
        }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Patient> {
        self.items.get(index)
    }
}
