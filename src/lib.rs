//! MedLink patient-records client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Headless client for the MedLink records API. `net` owns the REST wire
//! contract, `state` holds session/list/detail state, `pages` and
//! `components` drive the user-facing flows, and `search` coalesces query
//! edits into debounced fetches. The `medlink` binary is a thin terminal
//! front end over these modules.

pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod search;
pub mod state;
pub mod util;

#[cfg(test)]
pub(crate) mod test_helpers;
