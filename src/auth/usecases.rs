// Single-operation use-cases between the state container and the repository
// Each forwards its arguments unchanged and returns exactly what the repository returns

use futures::stream::BoxStream;
use std::sync::Arc;

use crate::auth::{models::User, outcome::AuthOutcome, repository::AuthRepository};

#[derive(Clone)]
pub struct LoginUseCase {
    repository: Arc<dyn AuthRepository>,
}

impl LoginUseCase {
    pub fn new(repository: Arc<dyn AuthRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, email: &str, password: &str) -> AuthOutcome<User> {
        self.repository.login(email, password).await
    }
}

#[derive(Clone)]
pub struct RegisterUseCase {
    repository: Arc<dyn AuthRepository>,
}

impl RegisterUseCase {
    pub fn new(repository: Arc<dyn AuthRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self, email: &str, password: &str, name: &str, role: &str) -> AuthOutcome<User> {
        self.repository.register(email, password, name, role).await
    }
}

#[derive(Clone)]
pub struct LogoutUseCase {
    repository: Arc<dyn AuthRepository>,
}

impl LogoutUseCase {
    pub fn new(repository: Arc<dyn AuthRepository>) -> Self {
        Self { repository }
    }

    pub async fn execute(&self) -> AuthOutcome<()> {
        self.repository.logout().await
    }
}

#[derive(Clone)]
pub struct GetCurrentUserUseCase {
    repository: Arc<dyn AuthRepository>,
}

impl GetCurrentUserUseCase {
    pub fn new(repository: Arc<dyn AuthRepository>) -> Self {
        Self { repository }
    }

    pub fn execute(&self) -> BoxStream<'static, Option<User>> {
        self.repository.current_user()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::UserRole;
    use crate::auth::repository::MockAuthRepository;
    use futures::StreamExt;

    fn ann() -> User {
        User::new("uid-1", "Ann", "a@b.com", UserRole::Monitor)
    }

    #[tokio::test]
    async fn test_login_forwards_arguments_and_result() {
        let user = ann();
        let expected = user.clone();

        let mut repo = MockAuthRepository::new();
        repo.expect_login()
            .withf(|email, password| email == "a@b.com" && password == "Passw0rd!")
            .times(1)
            .returning(move |_, _| AuthOutcome::Success(user.clone()));

        let use_case = LoginUseCase::new(Arc::new(repo));
        assert_eq!(use_case.execute("a@b.com", "Passw0rd!").await, AuthOutcome::Success(expected));
    }

    #[tokio::test]
    async fn test_login_does_not_translate_errors() {
        let mut repo = MockAuthRepository::new();
        repo.expect_login()
            .returning(|_, _| AuthOutcome::Error("raw provider text".to_string()));

        let use_case = LoginUseCase::new(Arc::new(repo));
        assert_eq!(
            use_case.execute("a@b.com", "wrong").await,
            AuthOutcome::Error("raw provider text".to_string())
        );
    }

    #[tokio::test]
    async fn test_register_forwards_role_string_untouched() {
        let mut repo = MockAuthRepository::new();
        repo.expect_register()
            .withf(|email, password, name, role| {
                email == "a@b.com" && password == "Passw0rd!" && name == "Ann" && role == "mOnItOr"
            })
            .times(1)
            .returning(|_, _, _, _| AuthOutcome::Loading);

        let use_case = RegisterUseCase::new(Arc::new(repo));
        assert!(use_case
            .execute("a@b.com", "Passw0rd!", "Ann", "mOnItOr")
            .await
            .is_loading());
    }

    #[tokio::test]
    async fn test_logout_forwards_result() {
        let mut repo = MockAuthRepository::new();
        repo.expect_logout()
            .times(1)
            .returning(|| AuthOutcome::Error("Logout failed".to_string()));

        let use_case = LogoutUseCase::new(Arc::new(repo));
        assert_eq!(use_case.execute().await.message(), Some("Logout failed"));
    }

    #[tokio::test]
    async fn test_get_current_user_returns_repository_stream() {
        let user = ann();
        let expected = user.clone();
        let mut repo = MockAuthRepository::new();
        repo.expect_current_user()
            .times(1)
            .returning(move || futures::stream::iter(vec![None, Some(user.clone())]).boxed());

        let use_case = GetCurrentUserUseCase::new(Arc::new(repo));
        let emitted: Vec<Option<User>> = use_case.execute().collect().await;
        assert_eq!(emitted, vec![None, Some(expected)]);
    }
}
