//! Debounced patient search.
//!
//! DESIGN
//! ======
//! Query edits arrive one value per change. An empty value fetches the full
//! list immediately; anything else is debounced so a burst of keystrokes
//! collapses into one fetch for the last value.
//!
//! At most one fetch is in flight. A trigger that arrives while busy is
//! dropped rather than queued, and nothing re-fires on its own once the
//! fetch lands. Each fetch carries a `RequestToken`; its response is applied
//! only if the token is still the latest, and `teardown` invalidates all
//! outstanding tokens so nothing lands on a page that is gone.
//!
//! ERROR HANDLING
//! ==============
//! Failures never escape: the list is emptied and a notice is posted. There
//! is no retry; the next query change is the retry.

#[cfg(test)]
#[path = "search_test.rs"]
mod search_test;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::net::api::{ApiError, PatientsApi};
use crate::net::types::Patient;
use crate::state::lock;
use crate::state::patients::PatientListState;
use crate::state::session::Session;
use crate::state::ui::{MISSING_TOKEN_NOTICE, Notices};
use crate::util::debounce::Debouncer;
use crate::util::sequence::{RequestSequence, RequestToken};

pub const SEARCH_FAILED_NOTICE: &str = "No Patient data found...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Scheduled,
    Fetching,
}

pub struct SearchCoordinator {
    shared: Arc<Shared>,
    debouncer: Debouncer,
}

struct Shared {
    api: Arc<dyn PatientsApi>,
    session: Session,
    notices: Notices,
    list: Arc<Mutex<PatientListState>>,
    sequence: RequestSequence,
    in_flight: AtomicBool,
    torn_down: AtomicBool,
    /// Most recent value seen, including ones that arrived mid-fetch.
    latest_query: Mutex<String>,
}

impl SearchCoordinator {
    #[must_use]
    pub fn new(
        api: Arc<dyn PatientsApi>,
        session: Session,
        notices: Notices,
        list: Arc<Mutex<PatientListState>>,
        delay: Duration,
    ) -> Self {
        let shared = Shared {
            api,
            session,
            notices,
            list,
            sequence: RequestSequence::new(),
            in_flight: AtomicBool::new(false),
            torn_down: AtomicBool::new(false),
            latest_query: Mutex::new(String::new()),
        };
        Self { shared: Arc::new(shared), debouncer: Debouncer::new(delay) }
    }

    /// Feed one query change from the input control.
    pub fn on_query_changed(&self, value: &str) {
        if self.shared.torn_down.load(Ordering::Acquire) {
            debug!("query change after teardown ignored");
            return;
        }
        value.clone_into(&mut lock(&self.shared.latest_query));

        if value.is_empty() {
            self.debouncer.cancel();
            let _ = Shared::trigger(&self.shared, String::new());
            return;
        }

        let shared = Arc::clone(&self.shared);
        let query = value.to_owned();
        self.debouncer.schedule(move || {
            let _ = Shared::trigger(&shared, query);
        });
    }

    /// Fetch `query` right away, bypassing the debounce.
    ///
    /// Returns the fetch task, or `None` if the trigger was dropped (busy,
    /// signed out, or torn down).
    pub fn fetch_now(&self, query: &str) -> Option<JoinHandle<()>> {
        Shared::trigger(&self.shared, query.to_owned())
    }

    /// Cancel any scheduled fetch and discard any response still in flight.
    pub fn teardown(&self) {
        if self.shared.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }
        let cancelled = self.debouncer.cancel();
        self.shared.sequence.invalidate();
        debug!(cancelled, "search coordinator torn down");
    }

    #[must_use]
    pub fn phase(&self) -> SearchPhase {
        if self.shared.in_flight.load(Ordering::Acquire) {
            SearchPhase::Fetching
        } else if self.debouncer.is_pending() {
            SearchPhase::Scheduled
        } else {
            SearchPhase::Idle
        }
    }

    #[must_use]
    pub fn latest_query(&self) -> String {
        lock(&self.shared.latest_query).clone()
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl Shared {
    fn trigger(this: &Arc<Self>, query: String) -> Option<JoinHandle<()>> {
        if this.torn_down.load(Ordering::Acquire) {
            return None;
        }
        if this.in_flight.swap(true, Ordering::AcqRel) {
            debug!(%query, "search already in flight; trigger dropped");
            return None;
        }
        let token = match this.session.require_token() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "patient search attempted while signed out");
                this.in_flight.store(false, Ordering::Release);
                this.notices.error(MISSING_TOKEN_NOTICE);
                return None;
            }
        };

        let ticket = this.sequence.issue();
        lock(&this.list).begin_fetch();
        info!(%query, "fetching patients");

        let shared = Arc::clone(this);
        Some(tokio::spawn(async move {
            let result = shared.api.search_patients(&token, &query).await;
            shared.complete(ticket, query, result);
        }))
    }

    fn complete(&self, ticket: RequestToken, query: String, result: Result<Vec<Patient>, ApiError>) {
        let current = self.sequence.is_latest(ticket) && !self.torn_down.load(Ordering::Acquire);
        let failed = {
            let mut list = lock(&self.list);
            if !current {
                debug!(%query, "superseded search response dropped");
                list.settle();
                None
            } else {
                match result {
                    Ok(patients) => {
                        info!(%query, count = patients.len(), "patients loaded");
                        list.apply_results(query, patients);
                        None
                    }
                    Err(e) => {
                        list.apply_failure(query);
                        Some(e)
                    }
                }
            }
        };
        self.in_flight.store(false, Ordering::Release);

        if let Some(e) = failed {
            warn!(error = %e, "patient search failed");
            self.notices.error(SEARCH_FAILED_NOTICE);
        }
    }
}
