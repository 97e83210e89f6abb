use crate::config::ConfigError;
use crate::models::TemplateStatus;
use thiserror::Error;

/// Error taxonomy for the messaging subsystem.
///
/// The split between `Network` and `Provider` is load-bearing: the send
/// pipeline trusts the last known local status when the provider is merely
/// unreachable, but never when the provider actively rejected a request.
#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Template '{0}' already exists")]
    DuplicateName(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Template '{name}' is not sendable: {status}")]
    Status { name: String, status: TemplateStatus },

    #[error("Network error talking to provider: {0}")]
    Network(String),

    #[error("Provider rejected the request ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type MessagingResult<T> = Result<T, MessagingError>;

impl MessagingError {
    /// True when the failure came from transport, not from the provider's
    /// decision. Only these may fall back to trusted local state.
    pub fn is_network(&self) -> bool {
        matches!(self, MessagingError::Network(_))
    }
}
