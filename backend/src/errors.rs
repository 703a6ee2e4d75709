//! # Errors
//!
//! Typed failures surfaced by repositories and services. None of them are
//! fatal: callers are expected to degrade (empty state, toggle left as it was).

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum MeadowError {
    /// The store was unreachable or rejected the write
    #[error("Storage failure: {0}")]
    StorageFailure(#[from] sqlx::Error),

    /// A persisted row could not be decoded into an entity
    #[error("Corrupt {entity} record: {reason}")]
    CorruptRecord { entity: &'static str, reason: String },

    /// A service needed an existing record that is not there
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// Onboarding has not created the user profile yet
    #[error("No user profile exists")]
    ProfileMissing,

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entitlement or transaction verification failed
    #[error("Verification failed: {0}")]
    VerificationFailure(String),

    /// Notification authorization was declined
    #[error("Notification permission denied")]
    PermissionDenied,

    /// The notification scheduler rejected a request
    #[error("Notification scheduling failed: {0}")]
    Notification(String),
}

impl MeadowError {
    pub fn corrupt(entity: &'static str, reason: impl ToString) -> Self {
        MeadowError::CorruptRecord {
            entity,
            reason: reason.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        MeadowError::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, MeadowError>;
