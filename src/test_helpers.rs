//! Shared fixtures for unit tests: a scriptable in-memory `PatientsApi`.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::net::api::{ApiError, PatientsApi};
use crate::net::types::{LoginRequest, NewPatient, NewRecord, Patient, PatientId, Record};
use crate::state::lock;
use crate::state::session::{Session, SessionToken};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Login(String),
    Search(String),
    CreatePatient(String),
    FetchRecords(String),
    CreateRecord(String),
}

pub struct MockApi {
    calls: Mutex<Vec<Call>>,
    roster: Mutex<Vec<Patient>>,
    records: HashMap<String, Vec<Record>>,
    search_delay: Duration,
    records_delay: HashMap<String, Duration>,
    login_result: Mutex<Option<Result<String, ApiError>>>,
    pub fail_search: AtomicBool,
    pub fail_records: AtomicBool,
    pub fail_create: AtomicBool,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            roster: Mutex::new(Vec::new()),
            records: HashMap::new(),
            search_delay: Duration::ZERO,
            records_delay: HashMap::new(),
            login_result: Mutex::new(None),
            fail_search: AtomicBool::new(false),
            fail_records: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
        }
    }

    pub fn with_patients(self, patients: Vec<Patient>) -> Self {
        *lock(&self.roster) = patients;
        self
    }

    pub fn with_records(mut self, patient_id: &str, records: Vec<Record>) -> Self {
        self.records.insert(patient_id.to_owned(), records);
        self
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    pub fn with_records_delay(mut self, patient_id: &str, delay: Duration) -> Self {
        self.records_delay.insert(patient_id.to_owned(), delay);
        self
    }

    pub fn with_login_result(self, result: Result<String, ApiError>) -> Self {
        *lock(&self.login_result) = Some(result);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Search(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        lock(&self.calls).push(call);
    }

    fn transport() -> ApiError {
        ApiError::Transport("connection refused".to_owned())
    }
}

#[async_trait::async_trait]
impl PatientsApi for MockApi {
    async fn login(&self, credentials: &LoginRequest) -> Result<String, ApiError> {
        self.record(Call::Login(credentials.username.clone()));
        lock(&self.login_result)
            .take()
            .unwrap_or_else(|| Ok("tok-live".to_owned()))
    }

    async fn search_patients(&self, _token: &SessionToken, query: &str) -> Result<Vec<Patient>, ApiError> {
        self.record(Call::Search(query.to_owned()));
        if !self.search_delay.is_zero() {
            tokio::time::sleep(self.search_delay).await;
        }
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(Self::transport());
        }
        let needle = query.to_lowercase();
        Ok(lock(&self.roster)
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn create_patient(&self, _token: &SessionToken, patient: &NewPatient) -> Result<Patient, ApiError> {
        self.record(Call::CreatePatient(patient.name.clone()));
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ApiError::Status { status: 500, message: None });
        }
        let mut roster = lock(&self.roster);
        let created = Patient {
            id: PatientId::new((roster.len() + 100).to_string()),
            name: patient.name.clone(),
            age: Some(patient.age),
            gender: Some(patient.gender.clone()),
        };
        roster.push(created.clone());
        Ok(created)
    }

    async fn fetch_records(&self, _token: &SessionToken, patient_id: &PatientId) -> Result<Vec<Record>, ApiError> {
        self.record(Call::FetchRecords(patient_id.to_string()));
        if let Some(delay) = self.records_delay.get(patient_id.as_str()) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail_records.load(Ordering::SeqCst) {
            return Err(Self::transport());
        }
        Ok(self.records.get(patient_id.as_str()).cloned().unwrap_or_default())
    }

    async fn create_record(&self, _token: &SessionToken, record: &NewRecord) -> Result<Record, ApiError> {
        self.record(Call::CreateRecord(record.name.clone()));
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Self::transport());
        }
        Ok(Record {
            id: Some(PatientId::new("900")),
            patient: Some(record.id.clone()),
            name: record.name.clone(),
            record_type: Some(record.record_type),
            date: None,
            summary: None,
            tags: None,
            url: Some(record.url.clone()),
        })
    }
}

pub fn patient(id: &str, name: &str) -> Patient {
    Patient { id: PatientId::new(id), name: name.to_owned(), age: Some(30), gender: Some("female".to_owned()) }
}

pub fn record(name: &str, summary: Option<&str>, tags: Option<&[&str]>) -> Record {
    Record {
        id: None,
        patient: None,
        name: name.to_owned(),
        record_type: None,
        date: Some("2024-02-10".to_owned()),
        summary: summary.map(ToOwned::to_owned),
        tags: tags.map(|t| t.iter().map(|s| (*s).to_owned()).collect()),
        url: Some("https://docs.example.test/report.pdf".to_owned()),
    }
}

pub fn signed_in_session() -> Session {
    let session = Session::in_memory();
    let _ = session.begin(SessionToken::new("tok-test"));
    session
}

/// Let spawned tasks run; with paused time this also advances the clock.
pub async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
