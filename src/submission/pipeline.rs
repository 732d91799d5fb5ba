//! Fan-out of accepted contact submissions.
//!
//! `submit` performs the durable write on the caller's task and returns as
//! soon as it succeeds. Each configured notification channel then gets its
//! own spawned task holding a copy of the stored record:
//!
//! ```text
//!   submit(validated)
//!       │ insert_submission (awaited, errors returned)
//!       ├──► task: email       ─► deliver ─► DeliveryAttempt ─► log + record
//!       └──► task: tabular_log ─► deliver ─► DeliveryAttempt ─► log + record
//! ```
//!
//! Channel failures, timeouts and panics end at the task boundary. Tasks are
//! never awaited by the caller and never retried.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::{SubsecRound, Utc};
use futures_util::FutureExt;
use tokio::sync::{Semaphore, TryAcquireError};
use uuid::Uuid;

use super::fields::ValidatedSubmission;
use crate::channels::{ChannelKind, NotificationChannel};
use crate::config::Config;
use crate::models::{ContactSubmission, DeliveryAttempt};
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Upper bound for one channel's delivery attempt.
    pub timeout: Duration,
    /// Notification tasks allowed to run at once across all submissions.
    pub max_in_flight: usize,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.notify_timeout,
            max_in_flight: config.max_in_flight_notifications,
        }
    }
}

pub struct Pipeline {
    store: Arc<dyn Store>,
    channels: Vec<Arc<dyn NotificationChannel>>,
    slots: Arc<Semaphore>,
    capacity: u32,
    timeout: Duration,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn Store>,
        channels: Vec<Arc<dyn NotificationChannel>>,
        options: PipelineOptions,
    ) -> Self {
        let capacity = u32::try_from(options.max_in_flight.max(1)).unwrap_or(u32::MAX);
        Self {
            store,
            channels,
            slots: Arc::new(Semaphore::new(capacity as usize)),
            capacity,
            timeout: options.timeout,
        }
    }

    pub fn channel_kinds(&self) -> Vec<ChannelKind> {
        self.channels.iter().map(|c| c.kind()).collect()
    }

    /// Notification tasks currently holding a slot.
    pub fn in_flight(&self) -> usize {
        (self.capacity as usize).saturating_sub(self.slots.available_permits())
    }

    /// Persist the submission and schedule its notifications.
    ///
    /// Only a failed durable write is returned; in that case nothing has been
    /// scheduled.
    pub async fn submit(&self, input: ValidatedSubmission) -> Result<ContactSubmission, StoreError> {
        let form = input.into_form();
        let draft = ContactSubmission {
            id: Uuid::now_v7(),
            name: form.name,
            email: form.email,
            phone: form.phone,
            service: form.service,
            message: form.message,
            // Postgres keeps microseconds
            created_at: Utc::now().trunc_subsecs(6),
        };

        let submission = match self.store.insert_submission(&draft).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!("Failed to store contact submission {}: {e}", draft.id);
                return Err(e);
            }
        };

        tracing::info!("Contact submission saved: {}", submission.id);

        self.dispatch(&submission);

        Ok(submission)
    }

    fn dispatch(&self, submission: &ContactSubmission) {
        for channel in &self.channels {
            let kind = channel.kind();

            let permit = match Arc::clone(&self.slots).try_acquire_owned() {
                Ok(permit) => permit,
                Err(TryAcquireError::NoPermits) => {
                    tracing::error!(
                        "Dropped {kind} notification for submission {}: {} notifications already in flight",
                        submission.id,
                        self.capacity
                    );
                    continue;
                }
                Err(TryAcquireError::Closed) => {
                    tracing::error!(
                        "Dropped {kind} notification for submission {}: shutting down",
                        submission.id
                    );
                    continue;
                }
            };

            let channel = Arc::clone(channel);
            let store = Arc::clone(&self.store);
            let submission = submission.clone();
            let timeout = self.timeout;

            tokio::spawn(async move {
                let attempt = attempt_delivery(channel.as_ref(), &submission, timeout).await;
                report(store.as_ref(), &attempt).await;
                drop(permit);
            });
        }
    }

    /// Wait up to `grace` for in-flight notifications, then stop accepting
    /// new ones. Tasks still running afterwards are abandoned.
    pub async fn shutdown(&self, grace: Duration) {
        let drained = tokio::time::timeout(grace, self.slots.acquire_many(self.capacity)).await;
        match drained {
            Ok(Ok(_drained)) => {
                self.slots.close();
                tracing::info!("Notification pipeline drained");
            }
            Ok(Err(_)) => {
                tracing::debug!("Notification pipeline already closed");
            }
            Err(_) => {
                self.slots.close();
                tracing::warn!(
                    "Abandoning {} in-flight notifications after {}s grace period",
                    self.in_flight(),
                    grace.as_secs()
                );
            }
        }
    }
}

async fn attempt_delivery(
    channel: &dyn NotificationChannel,
    submission: &ContactSubmission,
    timeout: Duration,
) -> DeliveryAttempt {
    let kind = channel.kind();

    let outcome = AssertUnwindSafe(tokio::time::timeout(timeout, channel.deliver(submission)))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(Ok(()))) => DeliveryAttempt::succeeded(submission.id, kind.as_str()),
        Ok(Ok(Err(e))) => DeliveryAttempt::failed(submission.id, kind.as_str(), e.message),
        Ok(Err(_)) => DeliveryAttempt::failed(
            submission.id,
            kind.as_str(),
            format!("Timed out after {}ms", timeout.as_millis()),
        ),
        Err(panic) => DeliveryAttempt::failed(
            submission.id,
            kind.as_str(),
            format!("Channel panicked: {}", panic_message(panic.as_ref())),
        ),
    }
}

async fn report(store: &dyn Store, attempt: &DeliveryAttempt) {
    match &attempt.error {
        None => tracing::info!(
            "{} notification delivered for submission {}",
            attempt.channel,
            attempt.submission_id
        ),
        Some(reason) => tracing::error!(
            "{} notification failed for submission {}: {reason}",
            attempt.channel,
            attempt.submission_id
        ),
    }

    if let Err(e) = store.record_attempt(attempt).await {
        tracing::warn!(
            "Failed to record {} delivery attempt for submission {}: {e}",
            attempt.channel,
            attempt.submission_id
        );
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
