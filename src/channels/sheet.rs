use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{ChannelError, ChannelKind, NotificationChannel};
use crate::models::ContactSubmission;
use crate::sheets::TabularLog;
use crate::worker::BlockingPool;

/// Appends one spreadsheet row per submission. The synchronous client call
/// runs on a dedicated blocking pool and is awaited from the caller's task.
///
/// Each append gets four fifths of the notification timeout, so the job on
/// the pool has finished and its outcome is known before the pipeline stops
/// waiting for it.
pub struct SheetChannel {
    log: Arc<dyn TabularLog>,
    pool: Arc<BlockingPool>,
    budget: Duration,
}

impl SheetChannel {
    pub fn new(log: Arc<dyn TabularLog>, pool: Arc<BlockingPool>, notify_timeout: Duration) -> Self {
        Self {
            log,
            pool,
            budget: notify_timeout * 4 / 5,
        }
    }
}

/// Cells in column order: name, email, phone, service, message, date.
pub fn row_for(submission: &ContactSubmission) -> Vec<String> {
    vec![
        submission.name.clone(),
        submission.email.clone(),
        submission.phone.clone(),
        submission.service.clone(),
        submission.message.clone(),
        submission.display_date(),
    ]
}

#[async_trait]
impl NotificationChannel for SheetChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::TabularLog
    }

    async fn deliver(&self, submission: &ContactSubmission) -> Result<(), ChannelError> {
        let row = row_for(submission);
        let log = Arc::clone(&self.log);
        let deadline = Instant::now() + self.budget;

        self.pool
            .run(move || {
                // Queued past its deadline: skip rather than append late.
                if Instant::now() >= deadline {
                    return Err("Deadline passed while queued".to_string());
                }
                log.append_row(&row, deadline)
            })
            .await
            .map_err(ChannelError::from)?
            .map_err(|e| ChannelError::from(format!("Failed to append row: {e}")))
    }
}
