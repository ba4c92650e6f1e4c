//! Selected-patient state for the detail panel.

#[cfg(test)]
#[path = "detail_test.rs"]
mod detail_test;

use crate::net::types::{Patient, Record};

pub const SUMMARY_NOT_AVAILABLE: &str = "Summary not available";
pub const SUMMARY_FAILED: &str = "Failed to fetch summary";
pub const NO_RECORDS: &str = "No Records...";
pub const NO_TAGS: &str = "No Tags...";

#[derive(Clone, Debug, Default, PartialEq)]
pub enum RecordsState {
    #[default]
    Idle,
    Loading,
    Loaded(Vec<Record>),
    Failed,
}

#[derive(Clone, Debug, Default)]
pub struct DetailState {
    pub selected: Option<Patient>,
    pub records: RecordsState,
    /// Bumps on every change so front ends can detect a redraw.
    pub revision: u64,
}

impl DetailState {
    pub fn select(&mut self, patient: Patient) {
        self.selected = Some(patient);
        self.records = RecordsState::Loading;
        self.revision += 1;
    }

    pub fn apply_records(&mut self, records: Vec<Record>) {
        self.records = RecordsState::Loaded(records);
        self.revision += 1;
    }

    pub fn apply_failure(&mut self) {
        self.records = RecordsState::Failed;
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.records = RecordsState::Idle;
        self.revision += 1;
    }

    /// Headline summary: the first record's, or a placeholder.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        match &self.records {
            RecordsState::Idle | RecordsState::Loading => None,
            RecordsState::Failed => Some(SUMMARY_FAILED),
            RecordsState::Loaded(records) => Some(
                records
                    .first()
                    .and_then(|r| r.summary.as_deref())
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(SUMMARY_NOT_AVAILABLE),
            ),
        }
    }

    /// Headline tags: the first record's.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        match &self.records {
            RecordsState::Loaded(records) => records
                .first()
                .and_then(|r| r.tags.as_deref())
                .unwrap_or_default(),
            _ => &[],
        }
    }

    #[must_use]
    pub fn view(&self) -> Option<DetailView> {
        let patient = self.selected.clone()?;
        let records = match &self.records {
            RecordsState::Idle | RecordsState::Loading => RecordsView::Loading,
            RecordsState::Failed => RecordsView::NoRecords,
            RecordsState::Loaded(records) if records.is_empty() => RecordsView::NoRecords,
            RecordsState::Loaded(records) => RecordsView::Records(records.iter().map(RecordView::from).collect()),
        };
        Some(DetailView {
            patient,
            summary: self.summary().map(ToOwned::to_owned),
            tags: self.tags().to_vec(),
            records,
        })
    }
}

/// Render-ready snapshot of the detail panel.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailView {
    pub patient: Patient,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub records: RecordsView,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RecordsView {
    Loading,
    NoRecords,
    Records(Vec<RecordView>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordView {
    pub report_type: String,
    pub date: Option<String>,
    pub summary: Option<String>,
    pub tags: TagsView,
    pub url: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TagsView {
    Tags(Vec<String>),
    NoTags,
}

impl From<&Record> for RecordView {
    fn from(record: &Record) -> Self {
        let tags = match &record.tags {
            Some(tags) => TagsView::Tags(tags.clone()),
            None => TagsView::NoTags,
        };
        Self {
            report_type: record.name.clone(),
            date: record.date.clone(),
            summary: record.summary.clone(),
            tags,
            url: record.url.clone(),
        }
    }
}
