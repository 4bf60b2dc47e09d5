//! User service - Profiles and role assignments.
//!
//! Staff see and edit every profile; everyone else only their own.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::views::user_responses;
use crate::domain::policy::{authorize, profile_scope};
use crate::domain::{Action, Actor, ProfileScope, ProfileUpdate, Role, Target, UserResponse};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Roles currently held by the actor
    async fn current_roles(&self, actor: &Actor) -> AppResult<Vec<Role>>;

    /// Profiles visible to the actor
    async fn list_profiles(
        &self,
        actor: &Actor,
        params: PaginationParams,
    ) -> AppResult<Paginated<UserResponse>>;

    async fn get_profile(&self, actor: &Actor, id: Uuid) -> AppResult<UserResponse>;

    /// Update names and phone number
    async fn update_profile(
        &self,
        actor: &Actor,
        id: Uuid,
        update: ProfileUpdate,
    ) -> AppResult<UserResponse>;

    /// Idempotent role grant
    async fn grant_role(&self, actor: &Actor, user_id: Uuid, role: Role) -> AppResult<UserResponse>;

    async fn revoke_role(&self, actor: &Actor, user_id: Uuid, role: Role) -> AppResult<UserResponse>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn load(&self, id: Uuid) -> AppResult<UserResponse> {
        let ctx = self.uow.reader();
        let user = ctx.accounts().find_user(id).await?.ok_or_not_found()?;
        user_responses(&ctx, vec![user])
            .await?
            .pop()
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn current_roles(&self, actor: &Actor) -> AppResult<Vec<Role>> {
        let principal = actor.require_user()?;
        let roles = self.uow.users().roles(principal.user_id).await?;
        Ok(roles.to_vec())
    }

    async fn list_profiles(
        &self,
        actor: &Actor,
        params: PaginationParams,
    ) -> AppResult<Paginated<UserResponse>> {
        let only = match profile_scope(actor)? {
            ProfileScope::All => None,
            ProfileScope::Only(user_id) => Some(user_id),
        };

        let ctx = self.uow.reader();
        let (users, total) = ctx.accounts().list_users(only, &params).await?;
        let data = user_responses(&ctx, users).await?;
        Ok(Paginated::new(data, &params, total))
    }

    async fn get_profile(&self, actor: &Actor, id: Uuid) -> AppResult<UserResponse> {
        authorize(actor, Action::Read, &Target::Profile { user_id: id })?;
        self.load(id).await
    }

    async fn update_profile(
        &self,
        actor: &Actor,
        id: Uuid,
        update: ProfileUpdate,
    ) -> AppResult<UserResponse> {
        authorize(actor, Action::Write, &Target::Profile { user_id: id })?;
        validator::Validate::validate(&update)?;

        let (user, roles) = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let accounts = tx.accounts();
                    let user = accounts.update_profile(id, update).await?;
                    let roles = accounts.roles(id).await?;
                    Ok((user, roles))
                })
            })
            .await?;

        tracing::info!(user_id = %id, "Profile updated");
        Ok(UserResponse::new(user, &roles))
    }

    async fn grant_role(&self, actor: &Actor, user_id: Uuid, role: Role) -> AppResult<UserResponse> {
        authorize(actor, Action::Write, &Target::RoleAssignments)?;

        let granted = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let accounts = tx.accounts();
                    accounts.find_user(user_id).await?.ok_or_not_found()?;
                    accounts.grant_role(user_id, role).await
                })
            })
            .await?;

        if granted {
            tracing::info!(%user_id, role = %role, "Role granted");
        } else {
            tracing::warn!(%user_id, role = %role, "Role already held");
        }
        self.load(user_id).await
    }

    async fn revoke_role(&self, actor: &Actor, user_id: Uuid, role: Role) -> AppResult<UserResponse> {
        authorize(actor, Action::Write, &Target::RoleAssignments)?;

        let revoked = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let accounts = tx.accounts();
                    accounts.find_user(user_id).await?.ok_or_not_found()?;
                    accounts.revoke_role(user_id, role).await
                })
            })
            .await?;

        if revoked {
            tracing::info!(%user_id, role = %role, "Role revoked");
        }
        self.load(user_id).await
    }
}
