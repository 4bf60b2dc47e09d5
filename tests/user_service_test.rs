//! Accounts: authentication against a mocked repository, then profile
//! and role management on a real schema.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mockall::predicate::eq;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use common::{registration, test_config, TestApp, PASSWORD};
use realty_api::domain::{Actor, Password, ProfileUpdate, Role, RoleSet, User};
use realty_api::errors::{AppError, AppResult};
use realty_api::infra::{
    Context, MockUserRepository, ReadContext, TransactionContext, TxFuture, UnitOfWork,
    UserRepository,
};
use realty_api::services::{AuthService, Authenticator, ServiceContainer};
use realty_api::types::PaginationParams;

fn stored_user(id: Uuid, email: &str, is_active: bool) -> User {
    User {
        id,
        email: email.to_string(),
        password_hash: Password::new(PASSWORD).expect("hashes").into_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        phone_number: None,
        profile_picture: None,
        is_active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Unit of work whose account lookups come from a mock; it has no database.
struct TestUnitOfWork {
    user_repo: Arc<MockUserRepository>,
    db: DatabaseConnection,
}

impl TestUnitOfWork {
    fn new(user_repo: MockUserRepository) -> Self {
        Self {
            user_repo: Arc::new(user_repo),
            db: DatabaseConnection::Disconnected,
        }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn reader(&self) -> ReadContext<'_> {
        Context::new(&self.db)
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        Err(AppError::internal("Transactions not supported in test mock"))
    }

    async fn transaction_serializable<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}

fn authenticator(repo: MockUserRepository) -> Authenticator<TestUnitOfWork> {
    Authenticator::new(Arc::new(TestUnitOfWork::new(repo)), test_config())
}

// =============================================================================
// Authentication (mocked repository)
// =============================================================================

#[tokio::test]
async fn test_login_then_authenticate_loads_roles_and_agent() {
    let user_id = Uuid::new_v4();
    let agent_id = Uuid::new_v4();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .with(eq("agent@example.com"))
        .returning(move |email| Ok(Some(stored_user(user_id, email, true))));
    repo.expect_find_by_id()
        .with(eq(user_id))
        .returning(|id| Ok(Some(stored_user(id, "agent@example.com", true))));
    repo.expect_roles()
        .returning(|_| Ok([Role::User, Role::Agent].into_iter().collect::<RoleSet>()));
    repo.expect_agent_id().returning(move |_| Ok(Some(agent_id)));

    let auth = authenticator(repo);
    // Domain part of the email is case-insensitive
    let token = auth
        .login("agent@EXAMPLE.com".to_string(), PASSWORD.to_string())
        .await
        .expect("login succeeds");
    assert_eq!(token.token_type, "Bearer");

    let principal = auth.authenticate(&token.access_token).await.expect("resolves");
    assert_eq!(principal.user_id, user_id);
    assert_eq!(principal.agent_id, Some(agent_id));
    assert!(principal.roles.contains(Role::Agent));
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_email_look_the_same() {
    let user_id = Uuid::new_v4();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .with(eq("known@example.com"))
        .returning(move |email| Ok(Some(stored_user(user_id, email, true))));
    repo.expect_find_by_email()
        .with(eq("ghost@example.com"))
        .returning(|_| Ok(None));

    let auth = authenticator(repo);
    let wrong = auth
        .login("known@example.com".to_string(), "not-the-password".to_string())
        .await;
    let unknown = auth
        .login("ghost@example.com".to_string(), PASSWORD.to_string())
        .await;

    assert!(matches!(wrong, Err(AppError::InvalidCredentials)));
    assert!(matches!(unknown, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_inactive_account_cannot_sign_in() {
    let user_id = Uuid::new_v4();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .returning(move |email| Ok(Some(stored_user(user_id, email, false))));

    let result = authenticator(repo)
        .login("idle@example.com".to_string(), PASSWORD.to_string())
        .await;
    assert!(matches!(result, Err(AppError::InvalidCredentials)));
}

#[tokio::test]
async fn test_token_for_removed_account_is_unauthorized() {
    let user_id = Uuid::new_v4();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .returning(move |email| Ok(Some(stored_user(user_id, email, true))));
    repo.expect_find_by_id().returning(|_| Ok(None));

    let auth = authenticator(repo);
    let token = auth
        .login("gone@example.com".to_string(), PASSWORD.to_string())
        .await
        .unwrap();

    let result = auth.authenticate(&token.access_token).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let auth = authenticator(MockUserRepository::new());
    let result = auth.authenticate("not.a.jwt").await;
    assert!(matches!(result, Err(AppError::Jwt(_))));
}

// =============================================================================
// Accounts (SQLite)
// =============================================================================

#[tokio::test]
async fn test_register_grants_user_role_and_rejects_duplicates() {
    let app = TestApp::new().await;
    let auth = app.services.auth();

    let created = auth.register(registration("new@example.com")).await.expect("registered");
    assert_eq!(created.roles, vec![Role::User]);

    let duplicate = auth.register(registration("new@EXAMPLE.COM")).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_register_requires_matching_passwords() {
    let app = TestApp::new().await;
    let mut request = registration("typo@example.com");
    request.password2 = "Different123!".to_string();

    let err = app.services.auth().register(request).await.expect_err("rejected");
    assert!(err.field_details().unwrap().contains_key("password"));
}

#[tokio::test]
async fn test_profiles_are_scoped_to_self_unless_staff() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let alice = app.user("alice@example.com", &[]).await;
    let bob = app.user("bob@example.com", &[]).await;
    let users = app.services.users();
    let bob_id = bob.user_id().unwrap();

    let own = users.list_profiles(&alice, PaginationParams::default()).await.unwrap();
    assert_eq!(own.meta.total, 1);
    let all = users.list_profiles(&admin, PaginationParams::default()).await.unwrap();
    assert_eq!(all.meta.total, 3);

    assert!(matches!(
        users.get_profile(&alice, bob_id).await,
        Err(AppError::Forbidden)
    ));
    assert!(users.get_profile(&admin, bob_id).await.is_ok());

    let anonymous = users.list_profiles(&Actor::Anonymous, PaginationParams::default()).await;
    assert!(matches!(anonymous, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_update_own_profile() {
    let app = TestApp::new().await;
    let alice = app.user("alice@example.com", &[]).await;
    let id = alice.user_id().unwrap();

    let updated = app
        .services
        .users()
        .update_profile(
            &alice,
            id,
            ProfileUpdate {
                first_name: Some("Alice".to_string()),
                last_name: None,
                phone_number: Some("+971501234567".to_string()),
            },
        )
        .await
        .expect("updated");
    assert_eq!(updated.first_name, "Alice");
    assert_eq!(updated.last_name, "User");
    assert_eq!(updated.phone_number.as_deref(), Some("+971501234567"));
}

#[tokio::test]
async fn test_role_grants_are_idempotent_and_staff_only() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let alice = app.user("alice@example.com", &[]).await;
    let id = alice.user_id().unwrap();
    let users = app.services.users();

    assert!(matches!(
        users.grant_role(&alice, id, Role::Admin).await,
        Err(AppError::Forbidden)
    ));

    users.grant_role(&admin, id, Role::Agent).await.unwrap();
    let again = users.grant_role(&admin, id, Role::Agent).await.unwrap();
    assert_eq!(again.roles, vec![Role::User, Role::Agent]);

    let roles = users.current_roles(&app.sign_in("alice@example.com").await).await.unwrap();
    assert_eq!(roles, vec![Role::User, Role::Agent]);

    let missing = users.grant_role(&admin, Uuid::new_v4(), Role::Agent).await;
    assert!(matches!(missing, Err(AppError::NotFound)));
}
