use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::db;
use crate::db::submissions::ListParams;
use crate::models::{ContactSubmission, DeliveryAttempt, StatusCheck};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_submission(&self, submission: &ContactSubmission) -> Result<ContactSubmission, StoreError> {
        Ok(db::submissions::create(&self.pool, submission).await?)
    }

    async fn list_submissions(&self, params: &ListParams) -> Result<Vec<ContactSubmission>, StoreError> {
        Ok(db::submissions::list(&self.pool, params).await?)
    }

    async fn record_attempt(&self, attempt: &DeliveryAttempt) -> Result<(), StoreError> {
        db::delivery_attempts::create(&self.pool, attempt).await?;
        Ok(())
    }

    async fn list_attempts(&self, submission_id: Uuid) -> Result<Vec<DeliveryAttempt>, StoreError> {
        Ok(db::delivery_attempts::list_by_submission(&self.pool, submission_id).await?)
    }

    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), StoreError> {
        db::status_checks::create(&self.pool, check).await?;
        Ok(())
    }

    async fn list_status_checks(&self, limit: i64) -> Result<Vec<StatusCheck>, StoreError> {
        Ok(db::status_checks::list(&self.pool, limit).await?)
    }
}
