//! REST API client for the MedLink records service.
//!
//! `PatientsApi` is the seam pages and the search coordinator talk to;
//! `HttpApi` is the `reqwest` implementation. Tests substitute their own.
//!
//! ERROR HANDLING
//! ==============
//! Every call returns a typed `ApiError` instead of panicking: transport
//! failures, rejected statuses and malformed bodies are distinguished so the
//! UI layer can pick the right notice. Authenticated calls take a
//! `SessionToken` by reference, so a missing token is caught by the session
//! before any request is built.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::{ErrorBody, LoginRequest, LoginResponse, NewPatient, NewRecord, Patient, PatientId, Record};
use crate::config::ClientConfig;
use crate::state::session::SessionToken;

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No session token is available; nothing was sent.
    #[error("not signed in: no session token")]
    MissingToken,

    /// The request never produced a response (connect, timeout, DNS).
    #[error("no response from server: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server rejected request: status {status}")]
    Status { status: u16, message: Option<String> },

    /// The response body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Malformed(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl ApiError {
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }

    /// Server-provided message for rejected requests, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

// =============================================================================
// API TRAIT
// =============================================================================

/// Remote operations the client depends on. Enables mocking in tests.
#[async_trait::async_trait]
pub trait PatientsApi: Send + Sync {
    /// Exchange credentials for a session token.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the body lacks `key`.
    async fn login(&self, credentials: &LoginRequest) -> Result<String, ApiError>;

    /// List patients whose name matches `query`; an empty query lists all.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the body is not a patient list.
    async fn search_patients(&self, token: &SessionToken, query: &str) -> Result<Vec<Patient>, ApiError>;

    /// Create a patient.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the body is not a patient.
    async fn create_patient(&self, token: &SessionToken, patient: &NewPatient) -> Result<Patient, ApiError>;

    /// Fetch all records attached to a patient.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the body is not a record list.
    async fn fetch_records(&self, token: &SessionToken, patient_id: &PatientId) -> Result<Vec<Record>, ApiError>;

    /// Attach a new record to a patient.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or the body is not a record.
    async fn create_record(&self, token: &SessionToken, record: &NewRecord) -> Result<Record, ApiError>;
}

// =============================================================================
// ENDPOINTS
// =============================================================================

fn login_endpoint(auth_base: &str) -> String {
    format!("{auth_base}/api/auth/login/")
}

fn patients_endpoint(api_base: &str) -> String {
    format!("{api_base}/api/patients/")
}

fn records_endpoint(api_base: &str) -> String {
    format!("{api_base}/api/records/")
}

fn patient_records_endpoint(api_base: &str, patient_id: &PatientId) -> String {
    format!("{api_base}/api/records/{patient_id}")
}

fn token_header(token: &SessionToken) -> String {
    format!("Token {}", token.as_str())
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpApi {
    http: reqwest::Client,
    api_base: String,
    auth_base: String,
}

impl HttpApi {
    /// Build a client for the hosts and timeouts in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] if the `reqwest` client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| ApiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, api_base: config.api_base_url.clone(), auth_base: config.auth_base_url.clone() })
    }

    async fn send<T>(&self, request: reqwest::RequestBuilder) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(classify_send_error)?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            warn!(status, "request rejected");
            return Err(rejection(status, &text));
        }
        parse_body(&text)
    }

    async fn get_authed<T>(&self, url: &str, token: &SessionToken, query: &[(&str, &str)]) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        debug!(%url, "GET");
        let request = self
            .http
            .get(url)
            .header(AUTHORIZATION, token_header(token))
            .query(query);
        self.send(request).await
    }

    async fn post_authed<B, T>(&self, url: &str, token: &SessionToken, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        debug!(%url, "POST");
        let request = self
            .http
            .post(url)
            .header(AUTHORIZATION, token_header(token))
            .json(body);
        self.send(request).await
    }
}

#[async_trait::async_trait]
impl PatientsApi for HttpApi {
    async fn login(&self, credentials: &LoginRequest) -> Result<String, ApiError> {
        let url = login_endpoint(&self.auth_base);
        debug!(%url, username = %credentials.username, "POST login");
        let body: LoginResponse = self.send(self.http.post(&url).json(credentials)).await?;
        body.key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ApiError::Malformed("login response has no key".to_owned()))
    }

    async fn search_patients(&self, token: &SessionToken, query: &str) -> Result<Vec<Patient>, ApiError> {
        let url = patients_endpoint(&self.api_base);
        self.get_authed(&url, token, &[("search", query)]).await
    }

    async fn create_patient(&self, token: &SessionToken, patient: &NewPatient) -> Result<Patient, ApiError> {
        let url = patients_endpoint(&self.api_base);
        self.post_authed(&url, token, patient).await
    }

    async fn fetch_records(&self, token: &SessionToken, patient_id: &PatientId) -> Result<Vec<Record>, ApiError> {
        let url = patient_records_endpoint(&self.api_base, patient_id);
        self.get_authed(&url, token, &[]).await
    }

    async fn create_record(&self, token: &SessionToken, record: &NewRecord) -> Result<Record, ApiError> {
        let url = records_endpoint(&self.api_base);
        self.post_authed(&url, token, record).await
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn classify_send_error(err: reqwest::Error) -> ApiError {
    if let Some(status) = err.status() {
        return ApiError::Status { status: status.as_u16(), message: None };
    }
    ApiError::Transport(err.to_string())
}

fn rejection(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message);
    ApiError::Status { status, message }
}

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::Malformed(e.to_string()))
}
