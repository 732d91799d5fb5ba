//! Append-only spreadsheet log of accepted submissions.
//!
//! The client here is synchronous: every call blocks on network I/O and may
//! block on the shared token cache. Callers must run it on a blocking pool.

pub mod auth;
pub mod google;

pub use google::GoogleSheets;

use std::time::{Duration, Instant};

/// A tabular log target supporting a single append operation.
///
/// `append_row` must return by `deadline`.
pub trait TabularLog: Send + Sync {
    fn append_row(&self, cells: &[String], deadline: Instant) -> Result<(), String>;
}

/// Time left before `deadline`, or an error once it has passed.
pub fn time_left(deadline: Instant) -> Result<Duration, String> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|left| !left.is_zero())
        .ok_or_else(|| "Deadline passed before the request was sent".to_string())
}
