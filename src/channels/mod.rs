pub mod email;
pub mod sheet;

use async_trait::async_trait;

use crate::models::ContactSubmission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Email,
    TabularLog,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Email => "email",
            ChannelKind::TabularLog => "tabular_log",
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct ChannelError {
    pub message: String,
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<String> for ChannelError {
    fn from(s: String) -> Self {
        ChannelError { message: s }
    }
}

impl From<&str> for ChannelError {
    fn from(s: &str) -> Self {
        ChannelError {
            message: s.to_string(),
        }
    }
}

/// One notification backend with its own failure domain.
///
/// Implementations are shared across concurrent deliveries, so any client or
/// credential they hold must be safe to reuse from several tasks at once.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn kind(&self) -> ChannelKind;
    async fn deliver(&self, submission: &ContactSubmission) -> Result<(), ChannelError>;
}
