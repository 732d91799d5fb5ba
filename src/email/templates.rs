use askama::Template;

use crate::models::ContactSubmission;

#[derive(Template)]
#[template(path = "email/contact_notification.html")]
struct ContactNotificationTemplate<'a> {
    site_name: &'a str,
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    service: &'a str,
    message: &'a str,
    submitted_at: String,
}

/// Render the operator alert for a new contact submission. Field values are
/// HTML-escaped.
pub fn render_contact_notification(
    submission: &ContactSubmission,
    site_name: &str,
) -> Result<String, askama::Error> {
    ContactNotificationTemplate {
        site_name,
        name: &submission.name,
        email: &submission.email,
        phone: &submission.phone,
        service: &submission.service,
        message: &submission.message,
        submitted_at: submission.display_date(),
    }
    .render()
}

pub fn contact_notification_subject(submission: &ContactSubmission) -> String {
    format!("🍸 Nový kontakt: {} - {}", submission.name, submission.service)
}
