//! User-visible notices.
//!
//! Request failures never propagate past the page that issued them; they are
//! posted here instead and the front end drains and shows them.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

use std::sync::{Arc, Mutex};

use super::lock;

/// Shown when an authenticated action is attempted while signed out.
pub const MISSING_TOKEN_NOTICE: &str = "Key not found...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Shared queue of notices. Clones post to the same board.
#[derive(Clone, Debug, Default)]
pub struct Notices {
    queue: Arc<Mutex<Vec<Notice>>>,
}

impl Notices {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, notice: Notice) {
        lock(&self.queue).push(notice);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.post(Notice::error(message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.post(Notice::info(message));
    }

    /// Take every pending notice, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *lock(&self.queue))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.queue).is_empty()
    }
}
