//! Account lookups needed to authenticate a request.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use super::entities::{agent, user, user_role};
use crate::domain::{Role, RoleSet, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Roles and the agent profile are looked up on every call so a role
/// change takes effect on the next request.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by (normalized) email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Roles currently granted to the user
    async fn roles(&self, user_id: Uuid) -> AppResult<RoleSet>;

    /// Agent profile id, when the user has one
    async fn agent_id(&self, user_id: Uuid) -> AppResult<Option<Uuid>>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn roles(&self, user_id: Uuid) -> AppResult<RoleSet> {
        let rows = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(parse_roles(rows))
    }

    async fn agent_id(&self, user_id: Uuid) -> AppResult<Option<Uuid>> {
        agent::Entity::find()
            .select_only()
            .column(agent::Column::Id)
            .filter(agent::Column::UserId.eq(user_id))
            .into_tuple::<Uuid>()
            .one(&self.db)
            .await
            .map_err(AppError::from)
    }
}

/// Unknown role strings are skipped with a warning rather than failing the request.
pub(crate) fn parse_roles(rows: Vec<user_role::Model>) -> RoleSet {
    rows.into_iter()
        .filter_map(|row| match row.role.parse::<Role>() {
            Ok(role) => Some(role),
            Err(_) => {
                tracing::warn!(user_id = %row.user_id, role = %row.role, "Ignoring unknown role");
                None
            }
        })
        .collect()
}
