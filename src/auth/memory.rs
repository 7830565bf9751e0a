// In-memory identity provider and document store
// Backends for tests and the demo binary; both follow the remote services' contracts

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    password::PasswordService,
    provider::{Document, DocumentStore, IdentityProvider, ProviderError, ProviderErrorKind, Session},
};

const MSG_BAD_EMAIL: &str = "The email address is badly formatted.";
const MSG_WEAK_PASSWORD: &str = "The given password is invalid. [ Password should be at least 6 characters ]";
const MSG_EMAIL_IN_USE: &str = "The email address is already in use by another account.";
const MSG_BAD_CREDENTIALS: &str = "The supplied auth credential is incorrect, malformed or has expired.";

/// Provider acceptance rules for new accounts
#[derive(Debug, Validate)]
struct NewAccount {
    #[validate(email)]
    email: String,
    #[validate(length(min = 6))]
    password: String,
}

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    email: String,
    password_hash: String,
    email_verified: bool,
}

impl Account {
    fn session(&self) -> Session {
        Session {
            uid: self.uid.clone(),
            email: self.email.clone(),
            email_verified: self.email_verified,
        }
    }
}

/// Run password hashing off the async worker threads
async fn run_blocking<T, F>(work: F) -> Result<T, ProviderError>
where
    F: FnOnce() -> Result<T, ProviderError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ProviderError::new(ProviderErrorKind::Unavailable, format!("Password task failed: {}", e)))?
}

/// Identity provider holding accounts in memory
pub struct InMemoryIdentityProvider {
    // Keyed by lower-cased email
    accounts: Mutex<HashMap<String, Account>>,
    session: watch::Sender<Option<Session>>,
    fail_sign_out: AtomicBool,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        let (session, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            session,
            fail_sign_out: AtomicBool::new(false),
        }
    }

    /// Terminate the current session as if it expired remotely
    pub fn expire_session(&self) {
        let expired = self.session.send_if_modified(|current| current.take().is_some());
        if expired {
            debug!("Session expired remotely");
        }
    }

    /// Make subsequent sign-out calls fail
    pub fn set_fail_sign_out(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().len()
    }

    fn start_session(&self, session: Session) {
        self.session.send_replace(Some(session));
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_user(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        let request = NewAccount {
            email: email.to_string(),
            password: password.to_string(),
        };
        if let Err(errors) = request.validate() {
            let message = if errors.field_errors().contains_key("email") {
                MSG_BAD_EMAIL
            } else {
                MSG_WEAK_PASSWORD
            };
            return Err(ProviderError::new(ProviderErrorKind::InvalidArgument, message));
        }

        let key = email.to_lowercase();
        if self.accounts.lock().contains_key(&key) {
            return Err(ProviderError::new(ProviderErrorKind::EmailAlreadyInUse, MSG_EMAIL_IN_USE));
        }

        let plain = password.to_string();
        let password_hash = run_blocking(move || PasswordService::hash_password(&plain)).await?;

        let account = Account {
            uid: Uuid::new_v4().simple().to_string(),
            email: email.to_string(),
            password_hash,
            email_verified: false,
        };
        let session = account.session();

        {
            let mut accounts = self.accounts.lock();
            // Re-check under the lock; hashing ran without it
            if accounts.contains_key(&key) {
                return Err(ProviderError::new(ProviderErrorKind::EmailAlreadyInUse, MSG_EMAIL_IN_USE));
            }
            accounts.insert(key, account);
        }

        debug!(uid = %session.uid, "Account created");
        self.start_session(session.clone());
        Ok(session)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        let account = self.accounts.lock().get(&email.to_lowercase()).cloned();

        let Some(account) = account else {
            return Err(ProviderError::new(ProviderErrorKind::InvalidCredentials, MSG_BAD_CREDENTIALS));
        };
        let (password, hash) = (password.to_string(), account.password_hash.clone());
        if !run_blocking(move || PasswordService::verify_password(&password, &hash)).await? {
            return Err(ProviderError::new(ProviderErrorKind::InvalidCredentials, MSG_BAD_CREDENTIALS));
        }

        let session = account.session();
        self.start_session(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(ProviderError::bare(ProviderErrorKind::Unavailable));
        }
        self.session.send_if_modified(|current| current.take().is_some());
        Ok(())
    }

    async fn delete_current_user(&self) -> Result<(), ProviderError> {
        let Some(session) = self.current_session() else {
            return Err(ProviderError::bare(ProviderErrorKind::NotSignedIn));
        };

        self.accounts.lock().retain(|_, account| account.uid != session.uid);
        self.session.send_replace(None);
        debug!(uid = %session.uid, "Account deleted");
        Ok(())
    }

    async fn restore_session(&self, session: Session) -> Result<(), ProviderError> {
        let known = self
            .accounts
            .lock()
            .values()
            .any(|account| account.uid == session.uid);
        if !known {
            return Err(ProviderError::bare(ProviderErrorKind::NotSignedIn));
        }

        debug!(uid = %session.uid, "Session restored");
        self.start_session(session);
        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn session_changes(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}

/// Document store holding collections in memory
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: Mutex<HashMap<(String, String), Document>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Drop a document, leaving any identity that owns it orphaned
    pub fn remove(&self, collection: &str, id: &str) -> Option<Document> {
        self.documents
            .lock()
            .remove(&(collection.to_string(), id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn set(&self, collection: &str, id: &str, document: Document) -> Result<(), ProviderError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ProviderError::new(ProviderErrorKind::Unavailable, "Document write rejected"));
        }
        self.documents
            .lock()
            .insert((collection.to_string(), id.to_string()), document);
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, ProviderError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ProviderError::new(ProviderErrorKind::Unavailable, "Document read failed"));
        }
        Ok(self
            .documents
            .lock()
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }
}
