use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const STATUS_SUCCEEDED: &str = "succeeded";
pub const STATUS_FAILED: &str = "failed";

/// Outcome of one channel trying to deliver one submission.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub channel: String,
    pub status: String,
    pub error: Option<String>,
    pub attempted_at: DateTime<Utc>,
}

impl DeliveryAttempt {
    pub fn succeeded(submission_id: Uuid, channel: &str) -> Self {
        Self {
            id: Uuid::now_v7(),
            submission_id,
            channel: channel.to_string(),
            status: STATUS_SUCCEEDED.to_string(),
            error: None,
            attempted_at: Utc::now().trunc_subsecs(6),
        }
    }

    pub fn failed(submission_id: Uuid, channel: &str, reason: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            submission_id,
            channel: channel.to_string(),
            status: STATUS_FAILED.to_string(),
            error: Some(reason),
            attempted_at: Utc::now().trunc_subsecs(6),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCEEDED
    }
}
