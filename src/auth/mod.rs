// Authentication module
// Provides registration, login and logout against a remote identity provider and
// profile document store, plus the reactive state container screens observe

pub mod error;
pub mod memory;
pub mod models;
pub mod outcome;
pub mod password;
pub mod provider;
pub mod repository;
pub mod state;
pub mod tasks;
pub mod usecases;

// Re-export commonly used types
pub use error::AuthError;
pub use memory::{InMemoryDocumentStore, InMemoryIdentityProvider};
pub use models::{User, UserRole};
pub use outcome::AuthOutcome;
pub use provider::{Document, DocumentStore, IdentityProvider, ProviderError, ProviderErrorKind, Session};
pub use repository::{AuthRepository, RemoteAuthRepository};
pub use state::{AuthPhase, AuthState, AuthViewModel};
pub use usecases::{GetCurrentUserUseCase, LoginUseCase, LogoutUseCase, RegisterUseCase};
