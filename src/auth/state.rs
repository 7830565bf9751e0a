// Observable authentication state and the container that owns it

use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::auth::{
    models::User,
    outcome::AuthOutcome,
    repository::AuthRepository,
    tasks::TaskQueue,
    usecases::{GetCurrentUserUseCase, LoginUseCase, LogoutUseCase, RegisterUseCase},
};

/// State observed by screens
///
/// `is_authenticated` is true exactly when `user` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub is_loading: bool,
    pub user: Option<User>,
    pub error: Option<String>,
    pub is_authenticated: bool,
    pub registration_success: bool,
}

/// Behavioral state derived from the [`AuthState`] fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Idle,
    Loading,
    Authenticated,
    Errored,
}

impl fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthPhase::Idle => "idle",
            AuthPhase::Loading => "loading",
            AuthPhase::Authenticated => "authenticated",
            AuthPhase::Errored => "errored",
        };
        write!(f, "{}", name)
    }
}

impl AuthState {
    pub fn phase(&self) -> AuthPhase {
        if self.is_loading {
            AuthPhase::Loading
        } else if self.error.is_some() {
            AuthPhase::Errored
        } else if self.is_authenticated {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Idle
        }
    }

    fn set_user(&mut self, user: Option<User>) {
        self.is_authenticated = user.is_some();
        self.user = user;
    }

    /// Login and register start: error is cleared before the call resolves
    fn begin_request(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    fn fail(&mut self, message: String) {
        self.is_loading = false;
        self.error = Some(message);
    }

    fn apply_login(&mut self, outcome: AuthOutcome<User>) {
        match outcome {
            AuthOutcome::Success(user) => {
                self.is_loading = false;
                self.set_user(Some(user));
            }
            AuthOutcome::Error(message) => self.fail(message),
            AuthOutcome::Loading => self.is_loading = true,
        }
    }

    fn apply_register(&mut self, outcome: AuthOutcome<User>) {
        let succeeded = outcome.is_success();
        self.apply_login(outcome);
        if succeeded {
            self.registration_success = true;
        }
    }

    fn apply_logout(&mut self, outcome: AuthOutcome<()>) {
        match outcome {
            AuthOutcome::Success(()) => *self = AuthState::default(),
            AuthOutcome::Error(message) => self.fail(message),
            AuthOutcome::Loading => self.is_loading = true,
        }
    }
}

/// State container screens observe and send actions to
///
/// Action methods return immediately; results arrive through [`AuthViewModel::state`].
/// Must be created inside a tokio runtime. Dropping it aborts in-flight actions and
/// the current-user subscription, without rolling anything back remotely.
pub struct AuthViewModel {
    state: Arc<watch::Sender<AuthState>>,
    login_use_case: LoginUseCase,
    register_use_case: RegisterUseCase,
    logout_use_case: LogoutUseCase,
    tasks: TaskQueue,
    subscription: JoinHandle<()>,
}

impl AuthViewModel {
    pub fn new(
        login_use_case: LoginUseCase,
        register_use_case: RegisterUseCase,
        logout_use_case: LogoutUseCase,
        get_current_user_use_case: GetCurrentUserUseCase,
    ) -> Self {
        let (tx, _) = watch::channel(AuthState::default());
        let state = Arc::new(tx);

        let subscription = {
            let state = Arc::clone(&state);
            let mut users = get_current_user_use_case.execute();
            tokio::spawn(async move {
                while let Some(user) = users.next().await {
                    state.send_if_modified(|s| {
                        if s.user == user {
                            return false;
                        }
                        debug!(signed_in = user.is_some(), "Current user changed");
                        s.set_user(user);
                        true
                    });
                }
            })
        };

        Self {
            state,
            login_use_case,
            register_use_case,
            logout_use_case,
            tasks: TaskQueue::new(),
            subscription,
        }
    }

    /// Wire all use-cases to one repository
    pub fn from_repository(repository: Arc<dyn AuthRepository>) -> Self {
        Self::new(
            LoginUseCase::new(Arc::clone(&repository)),
            RegisterUseCase::new(Arc::clone(&repository)),
            LogoutUseCase::new(Arc::clone(&repository)),
            GetCurrentUserUseCase::new(repository),
        )
    }

    /// Read-only observer of the published state
    pub fn state(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Snapshot of the published state
    pub fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn login(&self, email: impl Into<String>, password: impl Into<String>) {
        let (email, password) = (email.into(), password.into());
        debug!(%email, "Login requested");

        self.state.send_modify(AuthState::begin_request);
        let state = Arc::clone(&self.state);
        let use_case = self.login_use_case.clone();
        self.tasks.spawn(async move {
            let outcome = use_case.execute(&email, &password).await;
            state.send_modify(|s| s.apply_login(outcome));
        });
    }

    pub fn register(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<String>,
    ) {
        let (email, password, name, role) = (email.into(), password.into(), name.into(), role.into());
        debug!(%email, %role, "Registration requested");

        self.state.send_modify(AuthState::begin_request);
        let state = Arc::clone(&self.state);
        let use_case = self.register_use_case.clone();
        self.tasks.spawn(async move {
            let outcome = use_case.execute(&email, &password, &name, &role).await;
            state.send_modify(|s| s.apply_register(outcome));
        });
    }

    pub fn logout(&self) {
        debug!("Logout requested");

        self.state.send_modify(|s| s.is_loading = true);
        let state = Arc::clone(&self.state);
        let use_case = self.logout_use_case.clone();
        self.tasks.spawn(async move {
            let outcome = use_case.execute().await;
            state.send_modify(|s| s.apply_logout(outcome));
        });
    }

    /// Clear only the error; valid in any state
    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error = None);
    }

    /// Wait for every queued action to finish
    pub async fn settle(&self) {
        self.tasks.settle().await;
    }

    /// Abort queued actions and stop observing the current user
    pub fn shutdown(&self) {
        self.subscription.abort();
        self.tasks.shutdown();
    }
}

impl Drop for AuthViewModel {
    fn drop(&mut self) {
        self.shutdown();
    }
}
