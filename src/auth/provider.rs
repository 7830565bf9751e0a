// Ports for the external identity provider and profile document store

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;
use tokio::sync::watch;

/// Schema-flexible document as stored remotely
pub type Document = Map<String, Value>;

/// The identity provider's notion of "currently signed in"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
}

/// Broad classification of provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    InvalidCredentials,
    EmailAlreadyInUse,
    InvalidArgument,
    NotSignedIn,
    Unavailable,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderErrorKind::InvalidCredentials => "invalid credentials",
            ProviderErrorKind::EmailAlreadyInUse => "email already in use",
            ProviderErrorKind::InvalidArgument => "invalid argument",
            ProviderErrorKind::NotSignedIn => "not signed in",
            ProviderErrorKind::Unavailable => "service unavailable",
        };
        write!(f, "{}", name)
    }
}

/// Error raised by a provider or store adapter
///
/// `message` is the human-readable text the service returned, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: Option<String>,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.kind, message),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    /// Error with no service-supplied message
    pub fn bare(kind: ProviderErrorKind) -> Self {
        Self { kind, message: None }
    }
}

/// Credential-based session creation and destruction
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and sign it in
    async fn create_user(&self, email: &str, password: &str) -> Result<Session, ProviderError>;

    /// Sign in to an existing account
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ProviderError>;

    /// End the current session; succeeds when nobody is signed in
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Delete the signed-in account and end its session
    async fn delete_current_user(&self) -> Result<(), ProviderError>;

    /// Make a session this provider issued earlier current again
    ///
    /// Fails with `NotSignedIn` when the session's account no longer exists.
    async fn restore_session(&self, session: Session) -> Result<(), ProviderError>;

    fn current_session(&self) -> Option<Session>;

    /// Receiver observing every session change, starting from the current one
    fn session_changes(&self) -> watch::Receiver<Option<Session>>;
}

/// Keyed document read/write under a collection namespace
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Full-document upsert
    async fn set(&self, collection: &str, id: &str, document: Document) -> Result<(), ProviderError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, ProviderError>;
}
