// Authentication repository: the only layer that talks to the identity provider
// and the profile document store

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::auth::{
    error::AuthError,
    models::{User, UserRole},
    outcome::AuthOutcome,
    provider::{DocumentStore, IdentityProvider, Session},
};

const FALLBACK_REGISTER: &str = "Unknown error occurred";
const FALLBACK_LOGIN: &str = "Login failed";
const FALLBACK_LOGOUT: &str = "Logout failed";

/// Capability boundary over the remote identity and document services
///
/// No operation returns an error type or panics; every failure is an
/// [`AuthOutcome::Error`] carrying a user-facing message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthRepository: Send + Sync {
    /// Create an identity, persist its profile, and sign it in
    async fn register(&self, email: &str, password: &str, name: &str, role: &str) -> AuthOutcome<User>;

    /// Sign in and load the matching profile
    async fn login(&self, email: &str, password: &str) -> AuthOutcome<User>;

    /// End the current session; succeeds when nobody is signed in
    async fn logout(&self) -> AuthOutcome<()>;

    /// Profile of the signed-in user, re-evaluated on every session change
    ///
    /// A fresh stream yields the current value first.
    fn current_user(&self) -> BoxStream<'static, Option<User>>;

    /// Whether a session exists, regardless of profile availability
    fn is_user_authenticated(&self) -> BoxStream<'static, bool>;

    /// Role tag of the signed-in user
    fn user_role(&self) -> BoxStream<'static, Option<String>>;
}

/// Repository over an [`IdentityProvider`] and a [`DocumentStore`]
///
/// Login and register hold `sign_in_gate` for writing while the session and the
/// profile can disagree. Current-user loads hold it for reading, so the stream
/// only reports settled sessions.
pub struct RemoteAuthRepository {
    identity: Arc<dyn IdentityProvider>,
    store: Arc<dyn DocumentStore>,
    collection: Arc<str>,
    sign_in_gate: Arc<RwLock<()>>,
}

impl RemoteAuthRepository {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            identity,
            store,
            collection: Arc::from(collection.into()),
            sign_in_gate: Arc::new(RwLock::new(())),
        }
    }

    async fn try_register(&self, email: &str, password: &str, name: &str, role: &str) -> Result<User, AuthError> {
        // Validate before any remote side effect
        let role = UserRole::parse(role)?;
        let _gate = self.sign_in_gate.write().await;

        let session = self.identity.create_user(email, password).await?;
        let mut user = User::new(session.uid.clone(), name, email, role);
        user.is_email_verified = session.email_verified;

        if let Err(err) = self.save_profile(&user).await {
            self.roll_back_identity(&session).await;
            return Err(err);
        }

        info!(uid = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    async fn save_profile(&self, user: &User) -> Result<(), AuthError> {
        let document = user.to_document()?;
        self.store
            .set(&self.collection, &user.id, document)
            .await
            .map_err(|e| AuthError::ProfileNotSaved(e.to_string()))
    }

    /// Delete an identity whose profile write failed, so no account remains without a profile
    async fn roll_back_identity(&self, session: &Session) {
        match self.identity.delete_current_user().await {
            Ok(()) => debug!(uid = %session.uid, "Rolled back identity after failed profile write"),
            Err(e) => {
                warn!(uid = %session.uid, "Identity rollback failed, signing out instead: {}", e);
                if let Err(e) = self.identity.sign_out().await {
                    warn!(uid = %session.uid, "Sign-out after failed rollback also failed: {}", e);
                }
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let _gate = self.sign_in_gate.write().await;
        let previous = self.identity.current_session();
        let session = self.identity.sign_in(email, password).await?;

        match load_profile(self.store.as_ref(), &self.collection, &session.uid).await {
            Ok(Some(user)) => {
                info!(uid = %user.id, "User logged in");
                Ok(user)
            }
            Ok(None) => {
                self.abandon_session(&session, previous).await;
                Err(AuthError::ProfileNotFound)
            }
            Err(err) => {
                self.abandon_session(&session, previous).await;
                Err(err)
            }
        }
    }

    /// Drop a session that has no usable profile and return to whoever was signed in before
    async fn abandon_session(&self, session: &Session, previous: Option<Session>) {
        let result = match previous {
            Some(previous) => self.identity.restore_session(previous).await,
            None => self.identity.sign_out().await,
        };
        if let Err(e) = result {
            warn!(uid = %session.uid, "Could not end session without profile: {}", e);
            if let Err(e) = self.identity.sign_out().await {
                warn!(uid = %session.uid, "Sign-out after failed restore also failed: {}", e);
            }
        }
    }
}

/// Read and decode a profile document
async fn load_profile(store: &dyn DocumentStore, collection: &str, uid: &str) -> Result<Option<User>, AuthError> {
    let document = store
        .get(collection, uid)
        .await
        .map_err(AuthError::Provider)?;

    document.map(User::from_document).transpose()
}

#[async_trait]
impl AuthRepository for RemoteAuthRepository {
    async fn register(&self, email: &str, password: &str, name: &str, role: &str) -> AuthOutcome<User> {
        let result = self.try_register(email, password, name, role).await;
        if let Err(err) = &result {
            err.log("register");
        }
        AuthOutcome::from_result(result, FALLBACK_REGISTER)
    }

    async fn login(&self, email: &str, password: &str) -> AuthOutcome<User> {
        let result = self.try_login(email, password).await;
        if let Err(err) = &result {
            err.log("login");
        }
        AuthOutcome::from_result(result, FALLBACK_LOGIN)
    }

    async fn logout(&self) -> AuthOutcome<()> {
        let result = self.identity.sign_out().await.map_err(AuthError::Provider);
        match &result {
            Ok(()) => info!("User logged out"),
            Err(err) => err.log("logout"),
        }
        AuthOutcome::from_result(result, FALLBACK_LOGOUT)
    }

    fn current_user(&self) -> BoxStream<'static, Option<User>> {
        let identity = Arc::clone(&self.identity);
        let store = Arc::clone(&self.store);
        let collection = Arc::clone(&self.collection);
        let gate = Arc::clone(&self.sign_in_gate);

        // A change only triggers a reload; the session is re-read once no sign-in is in flight
        WatchStream::new(self.identity.session_changes())
            .then(move |_| {
                let identity = Arc::clone(&identity);
                let store = Arc::clone(&store);
                let collection = Arc::clone(&collection);
                let gate = Arc::clone(&gate);
                async move {
                    let _gate = gate.read().await;
                    let session = identity.current_session()?;
                    match load_profile(store.as_ref(), &collection, &session.uid).await {
                        Ok(user) => user,
                        Err(err) => {
                            warn!(uid = %session.uid, "Could not load current user: {}", err);
                            None
                        }
                    }
                }
            })
            .boxed()
    }

    fn is_user_authenticated(&self) -> BoxStream<'static, bool> {
        WatchStream::new(self.identity.session_changes())
            .map(|session| session.is_some())
            .boxed()
    }

    fn user_role(&self) -> BoxStream<'static, Option<String>> {
        self.current_user()
            .map(|user| user.map(|u| u.role.as_str().to_string()))
            .boxed()
    }
}
