//! Small self-contained helpers used by pages and the search coordinator.

pub mod debounce;
pub mod highlight;
pub mod sequence;
