pub mod delivery_attempts;
pub mod status_checks;
pub mod submissions;
