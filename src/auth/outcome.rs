// Result type returned across the repository boundary

use crate::auth::error::AuthError;

/// Outcome of an authentication operation
///
/// Exactly one shape is active: a success payload, a user-facing error message,
/// or an in-flight marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome<T> {
    Success(T),
    Error(String),
    Loading,
}

impl<T> AuthOutcome<T> {
    pub fn error(message: impl Into<String>) -> Self {
        AuthOutcome::Error(message.into())
    }

    /// Convert a fallible result, falling back to `fallback` when the error carries no message
    pub fn from_result(result: Result<T, AuthError>, fallback: &str) -> Self {
        match result {
            Ok(data) => AuthOutcome::Success(data),
            Err(err) => AuthOutcome::Error(err.error_message(fallback)),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AuthOutcome::Error(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AuthOutcome::Loading)
    }

    /// Payload, present only on success
    pub fn data(&self) -> Option<&T> {
        match self {
            AuthOutcome::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Message, present only on error
    pub fn message(&self) -> Option<&str> {
        match self {
            AuthOutcome::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U, F>(self, f: F) -> AuthOutcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            AuthOutcome::Success(data) => AuthOutcome::Success(f(data)),
            AuthOutcome::Error(message) => AuthOutcome::Error(message),
            AuthOutcome::Loading => AuthOutcome::Loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_payload_only() {
        let outcome = AuthOutcome::Success(7);
        assert!(outcome.is_success());
        assert_eq!(outcome.data(), Some(&7));
        assert_eq!(outcome.message(), None);
    }

    #[test]
    fn test_error_has_message_only() {
        let outcome: AuthOutcome<i32> = AuthOutcome::error("Login failed");
        assert!(outcome.is_error());
        assert_eq!(outcome.data(), None);
        assert_eq!(outcome.message(), Some("Login failed"));
    }

    #[test]
    fn test_loading_has_neither() {
        let outcome: AuthOutcome<i32> = AuthOutcome::Loading;
        assert!(outcome.is_loading());
        assert_eq!(outcome.data(), None);
        assert_eq!(outcome.message(), None);
    }

    #[test]
    fn test_from_result_uses_error_message() {
        let outcome: AuthOutcome<()> =
            AuthOutcome::from_result(Err(AuthError::ProfileNotFound), "Login failed");
        assert_eq!(outcome, AuthOutcome::Error("User profile not found".to_string()));

        let outcome = AuthOutcome::from_result(Ok(1), "Login failed");
        assert_eq!(outcome, AuthOutcome::Success(1));
    }

    #[test]
    fn test_map_keeps_tag() {
        assert_eq!(AuthOutcome::Success(2).map(|n| n * 10), AuthOutcome::Success(20));
        assert_eq!(
            AuthOutcome::<i32>::error("nope").map(|n| n * 10),
            AuthOutcome::Error("nope".to_string())
        );
        assert_eq!(AuthOutcome::<i32>::Loading.map(|n| n * 10), AuthOutcome::Loading);
    }
}
