use std::sync::Arc;

use safetysec_auth::auth::{
    AuthPhase, AuthViewModel, InMemoryDocumentStore, InMemoryIdentityProvider, RemoteAuthRepository,
};
use safetysec_auth::AppConfig;
use tracing_subscriber::EnvFilter;

/// Drive one session through the auth core against the in-memory backend
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    // Initialize tracing subscriber for logging; RUST_LOG wins over SAFETYSEC_LOG
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("SafetySec auth demo - Starting...");

    let identity = Arc::new(InMemoryIdentityProvider::new());
    let store = Arc::new(InMemoryDocumentStore::new());
    let repository = Arc::new(RemoteAuthRepository::new(
        identity.clone(),
        store.clone(),
        config.users_collection.clone(),
    ));
    let view_model = AuthViewModel::from_repository(repository);

    // Screen stand-in: report every published state
    let mut state_rx = view_model.state();
    let observer = tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = state_rx.borrow_and_update().clone();
            match state.phase() {
                AuthPhase::Errored => {
                    tracing::warn!("State: {} ({})", state.phase(), state.error.unwrap_or_default())
                }
                phase => tracing::info!(
                    "State: {} user={} role={}",
                    phase,
                    state.user.as_ref().map(|u| u.name.as_str()).unwrap_or("-"),
                    state.user.as_ref().map(|u| u.role.display_name()).unwrap_or("-"),
                ),
            }
        }
    });

    let demo = &config.demo;

    view_model.register(&demo.email, &demo.password, &demo.name, &demo.role);
    view_model.settle().await;

    view_model.logout();
    view_model.settle().await;

    view_model.login(&demo.email, "not-the-password");
    view_model.settle().await;
    view_model.clear_error();

    view_model.login(&demo.email, &demo.password);
    view_model.settle().await;

    if let Some(user) = view_model.current().user {
        tracing::info!("Signed in as {} [{}]", user.name, user.initials());
    }

    identity.expire_session();
    let mut rx = view_model.state();
    rx.wait_for(|s| !s.is_authenticated).await?;
    tracing::info!("Session expired remotely; {} profile(s) stored", store.len());

    view_model.shutdown();
    observer.abort();
    Ok(())
}
