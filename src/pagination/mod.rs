//! Pagination controller module
//!
//! Drives one key from its first request to a terminal state:
//! - Count-only keys make a single count request
//! - Single-page keys make one capped search request
//! - Scroll keys open a cursor and follow it until a page comes back empty
//!
//! Any transport or decode failure ends the current key only.

mod controller;
mod state;

pub use controller::{retrieve_key, KeyOutcome};
pub use state::{KeyPagination, PaginationState, Step, Termination};
