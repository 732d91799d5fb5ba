use std::sync::Arc;

use async_trait::async_trait;

use super::{ChannelError, ChannelKind, NotificationChannel};
use crate::email::templates;
use crate::email::{Mailer, OutgoingEmail};
use crate::models::ContactSubmission;

/// Sends one HTML alert per submission to the configured recipients.
pub struct EmailChannel {
    mailer: Arc<dyn Mailer>,
    recipients: Vec<String>,
    site_name: String,
}

impl EmailChannel {
    pub fn new(mailer: Arc<dyn Mailer>, recipients: Vec<String>, site_name: String) -> Self {
        Self {
            mailer,
            recipients,
            site_name,
        }
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    async fn deliver(&self, submission: &ContactSubmission) -> Result<(), ChannelError> {
        if self.recipients.is_empty() {
            return Err(ChannelError::from("No notification recipients configured"));
        }

        let html_body = templates::render_contact_notification(submission, &self.site_name)
            .map_err(|e| ChannelError::from(format!("Failed to render email template: {e}")))?;

        let email = OutgoingEmail {
            to: self.recipients.clone(),
            subject: templates::contact_notification_subject(submission),
            html_body,
        };

        self.mailer.send(email).await.map_err(ChannelError::from)
    }
}
