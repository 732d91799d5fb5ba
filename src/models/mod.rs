pub mod delivery_attempt;
pub mod status_check;
pub mod submission;

pub use delivery_attempt::DeliveryAttempt;
pub use status_check::StatusCheck;
pub use submission::ContactSubmission;
