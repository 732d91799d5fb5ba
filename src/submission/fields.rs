use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Contact form payload as posted by the website.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub message: String,
}

/// A contact form that passed field validation. Only [`validate`] builds one,
/// so the pipeline never sees an unchecked payload.
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    form: ContactForm,
}

impl ValidatedSubmission {
    pub fn form(&self) -> &ContactForm {
        &self.form
    }

    pub fn into_form(self) -> ContactForm {
        self.form
    }
}

/// Check required fields and the contact email. Values are kept as posted;
/// only the checks look at trimmed text. Phone may be empty.
pub fn validate(form: ContactForm) -> Result<ValidatedSubmission, Vec<String>> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("name", &form.name),
        ("email", &form.email),
        ("service", &form.service),
        ("message", &form.message),
    ] {
        if value.trim().is_empty() {
            errors.push(format!("Required field is empty: {field}"));
        }
    }

    let email = form.email.trim();
    if !email.is_empty() && !EMAIL_RE.is_match(email) {
        errors.push("Invalid email format: email".to_string());
    }

    if errors.is_empty() {
        Ok(ValidatedSubmission { form })
    } else {
        Err(errors)
    }
}
