//! Login page: credentials in, session out.
//!
//! DESIGN
//! ======
//! The page keeps the two field values, the current error line and an
//! attempt counter. `submit` exchanges the credentials for a token and
//! starts the session; every failure is turned into a single user-facing
//! message and nothing is stored.
//!
//! The demo account never touches the network. It signs in with a locally
//! minted `demo_token_<millis>` so the client can be explored offline.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, warn};

use crate::net::api::{ApiError, PatientsApi};
use crate::net::types::LoginRequest;
use crate::state::session::{Session, SessionToken};

pub const DEMO_USERNAME: &str = "demouser";
pub const DEMO_PASSWORD: &str = "demo123";

pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";
pub const NO_RESPONSE: &str = "No response from server. Please check your internet connection.";
pub const INVALID_RESPONSE: &str = "Invalid response from server";
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoginOutcome {
    SignedIn { demo: bool },
    Failed(String),
}

pub struct LoginPage {
    api: Arc<dyn PatientsApi>,
    session: Session,
    demo_login: bool,
    username: String,
    password: String,
    error: Option<String>,
    attempts: u32,
}

impl LoginPage {
    #[must_use]
    pub fn new(api: Arc<dyn PatientsApi>, session: Session, demo_login: bool) -> Self {
        Self {
            api,
            session,
            demo_login,
            username: String::new(),
            password: String::new(),
            error: None,
            attempts: 0,
        }
    }

    pub fn set_username(&mut self, value: &str) {
        value.clone_into(&mut self.username);
        self.error = None;
    }

    pub fn set_password(&mut self, value: &str) {
        value.clone_into(&mut self.password);
        self.error = None;
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Message from the last failed attempt, cleared by any field edit.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Failed attempts since the page was opened.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub async fn submit(&mut self) -> LoginOutcome {
        self.error = None;

        if self.demo_login && is_demo_credentials(&self.username, &self.password) {
            info!("demo login");
            self.start_session(demo_token());
            return LoginOutcome::SignedIn { demo: true };
        }

        let credentials = LoginRequest { username: self.username.clone(), password: self.password.clone() };
        match self.api.login(&credentials).await {
            Ok(key) => {
                info!(username = %self.username, "login succeeded");
                self.start_session(SessionToken::new(key));
                LoginOutcome::SignedIn { demo: false }
            }
            Err(e) => {
                self.attempts += 1;
                warn!(error = %e, attempts = self.attempts, "login failed");
                let message = login_error_message(&e);
                self.error = Some(message.clone());
                LoginOutcome::Failed(message)
            }
        }
    }

    fn start_session(&self, token: SessionToken) {
        if let Err(e) = self.session.begin(token) {
            warn!(error = %e, "session token not persisted; signed in for this run only");
        }
    }
}

/// Map a failed login to the line shown under the form.
#[must_use]
pub fn login_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Status { status: 401, .. } => INVALID_CREDENTIALS.to_owned(),
        ApiError::Status { status, message } => match message {
            Some(message) => message.clone(),
            None => format!("Server error ({status}). Please try again later."),
        },
        ApiError::Transport(_) => NO_RESPONSE.to_owned(),
        ApiError::Malformed(_) => INVALID_RESPONSE.to_owned(),
        ApiError::MissingToken | ApiError::ClientBuild(_) => UNEXPECTED_ERROR.to_owned(),
    }
}

fn is_demo_credentials(username: &str, password: &str) -> bool {
    username == DEMO_USERNAME && password == DEMO_PASSWORD
}

fn demo_token() -> SessionToken {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    SessionToken::new(format!("demo_token_{millis}"))
}
