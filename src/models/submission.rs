use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An accepted contact form submission. Content fields never change after
/// construction.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
    #[serde(rename = "submission_date")]
    pub created_at: DateTime<Utc>,
}

impl ContactSubmission {
    /// Timestamp format used in notifications and spreadsheet rows.
    pub fn display_date(&self) -> String {
        self.created_at.format("%d.%m.%Y %H:%M").to_string()
    }
}
