//! Networking modules for the MedLink REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles authenticated REST calls and error classification, and
//! `types` defines the validated wire schema shared by pages and state.

pub mod api;
pub mod types;
