// Authentication error types

use thiserror::Error;
use tracing::{error, warn};

use crate::auth::provider::ProviderError;

/// Authentication error types
///
/// Every fault raised while talking to the identity provider or the document store is
/// mapped onto one of these before it leaves the repository.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Role string did not name one of the known roles
    #[error("Invalid role: {0}")]
    InvalidRole(String),

    /// Identity provider rejected the request
    /// Carries the provider's own message when it supplied one
    #[error("Identity provider error: {0}")]
    Provider(ProviderError),

    /// Signed in, but no profile document exists for the session's user id
    #[error("User profile not found")]
    ProfileNotFound,

    /// Profile document exists but could not be decoded into a User
    #[error("User profile is corrupted: {0}")]
    ProfileCorrupted(String),

    /// Identity was created but the profile document write failed
    #[error("Profile could not be saved: {0}")]
    ProfileNotSaved(String),

    /// Local input validation failure
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AuthError {
    /// Message safe to show to the user
    ///
    /// `fallback` is used for provider errors that came without a message.
    pub fn error_message(&self, fallback: &str) -> String {
        match self {
            AuthError::InvalidRole(role) => format!("Invalid role: {}", role),
            AuthError::Provider(err) => err
                .message
                .clone()
                .filter(|msg| !msg.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()),
            AuthError::ProfileNotFound => "User profile not found".to_string(),
            AuthError::ProfileCorrupted(_) => "User profile is corrupted".to_string(),
            AuthError::ProfileNotSaved(_) => {
                "Account created but profile could not be saved. Please try again.".to_string()
            }
            AuthError::Validation(msg) => msg.clone(),
        }
    }

    /// Log this error at a level matching who caused it
    pub fn log(&self, operation: &str) {
        match self {
            AuthError::InvalidRole(_) | AuthError::Validation(_) | AuthError::Provider(_) => {
                warn!(operation, "Auth request rejected: {}", self);
            }
            AuthError::ProfileNotFound => {
                warn!(operation, "Session has no matching profile document");
            }
            AuthError::ProfileCorrupted(_) | AuthError::ProfileNotSaved(_) => {
                error!(operation, "Profile storage failure: {}", self);
            }
        }
    }
}

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        AuthError::Provider(err)
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuthError::Validation(errors.to_string())
    }
}
