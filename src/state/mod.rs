//! Client-side state containers.
//!
//! ARCHITECTURE
//! ============
//! `session` owns the credential lifecycle, `patients` and `detail` hold the
//! list/detail data the pages render, and `ui` collects user-visible notices.
//! Containers are plain data guarded by `Mutex` at their owners; none of
//! them perform I/O except the session's token store.

pub mod detail;
pub mod patients;
pub mod session;
pub mod ui;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a state mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
