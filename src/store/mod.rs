//! Storage contract consumed by the pipeline and the HTTP layer.
//!
//! Accepted submissions are append-only from the pipeline's point of view:
//! nothing here updates or deletes a stored record.

pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::db::submissions::ListParams;
use crate::models::{ContactSubmission, DeliveryAttempt, StatusCheck};

pub use postgres::PgStore;

#[derive(Debug)]
pub enum StoreError {
    Database(sqlx::Error),
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Database(err) => write!(f, "Database error: {err}"),
            StoreError::Unavailable(msg) => write!(f, "Store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

/// Durable storage shared by every request. Implementations must tolerate
/// concurrent use.
#[async_trait]
pub trait Store: Send + Sync {
    /// Durable write. Returns the record exactly as stored; once this returns
    /// `Ok` it is visible to `list_submissions`.
    async fn insert_submission(&self, submission: &ContactSubmission) -> Result<ContactSubmission, StoreError>;
    async fn list_submissions(&self, params: &ListParams) -> Result<Vec<ContactSubmission>, StoreError>;
    async fn record_attempt(&self, attempt: &DeliveryAttempt) -> Result<(), StoreError>;
    async fn list_attempts(&self, submission_id: Uuid) -> Result<Vec<DeliveryAttempt>, StoreError>;
    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), StoreError>;
    async fn list_status_checks(&self, limit: i64) -> Result<Vec<StatusCheck>, StoreError>;
}
