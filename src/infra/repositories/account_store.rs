//! Users, role grants and agent profiles.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::base::fetch_page;
use super::entities::{agent, user, user_role};
use super::user_repository::parse_roles;
use crate::domain::{Agent, AgentDraft, AgentPatch, AgentStats, ProfileUpdate, Role, RoleSet, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::PaginationParams;

/// Columns of a new user row
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

pub struct AccountStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AccountStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(self.conn).await?;
        Ok(model.map(User::from))
    }

    pub async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.conn)
            .await?;
        Ok(model.map(User::from))
    }

    pub async fn users_by_ids(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, User>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = user::Entity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(self.conn)
            .await?;
        Ok(models.into_iter().map(|m| (m.id, User::from(m))).collect())
    }

    pub async fn create_user(&self, account: NewAccount) -> AppResult<User> {
        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(account.email),
            password_hash: Set(account.password_hash),
            first_name: Set(account.first_name),
            last_name: Set(account.last_name),
            phone_number: Set(account.phone_number),
            profile_picture: Set(None),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await?;

        Ok(User::from(model))
    }

    /// Users ordered by email; `only` restricts the page to one user.
    pub async fn list_users(
        &self,
        only: Option<Uuid>,
        params: &PaginationParams,
    ) -> AppResult<(Vec<User>, u64)> {
        let mut query = user::Entity::find().order_by_asc(user::Column::Email);
        if let Some(id) = only {
            query = query.filter(user::Column::Id.eq(id));
        }
        let (models, total) = fetch_page(query, self.conn, params).await?;
        Ok((models.into_iter().map(User::from).collect(), total))
    }

    pub async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User> {
        let existing = user::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_not_found()?;

        let mut active: user::ActiveModel = existing.into();
        if let Some(first_name) = update.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = update.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(phone_number) = update.phone_number {
            active.phone_number = Set(Some(phone_number).filter(|p| !p.is_empty()));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await?;
        Ok(User::from(model))
    }

    // =========================================================================
    // Roles
    // =========================================================================

    pub async fn roles(&self, user_id: Uuid) -> AppResult<RoleSet> {
        let rows = user_role::Entity::find()
            .filter(user_role::Column::UserId.eq(user_id))
            .all(self.conn)
            .await?;
        Ok(parse_roles(rows))
    }

    pub async fn roles_for(&self, user_ids: &[Uuid]) -> AppResult<HashMap<Uuid, RoleSet>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut grouped: HashMap<Uuid, Vec<user_role::Model>> = HashMap::new();
        let rows = user_role::Entity::find()
            .filter(user_role::Column::UserId.is_in(user_ids.iter().copied()))
            .all(self.conn)
            .await?;
        for row in rows {
            grouped.entry(row.user_id).or_default().push(row);
        }
        Ok(grouped
            .into_iter()
            .map(|(user_id, rows)| (user_id, parse_roles(rows)))
            .collect())
    }

    /// Idempotent; returns whether a new grant was written.
    pub async fn grant_role(&self, user_id: Uuid, role: Role) -> AppResult<bool> {
        let inserted = user_role::Entity::insert(user_role::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            role: Set(role.as_str().to_string()),
        })
        .on_conflict(
            OnConflict::columns([user_role::Column::UserId, user_role::Column::Role])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.conn)
        .await?;

        Ok(inserted > 0)
    }

    pub async fn revoke_role(&self, user_id: Uuid, role: Role) -> AppResult<bool> {
        let result = user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::Role.eq(role.as_str()))
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    // =========================================================================
    // Agents
    // =========================================================================

    pub async fn find_agent(&self, id: Uuid) -> AppResult<Option<Agent>> {
        let model = agent::Entity::find_by_id(id).one(self.conn).await?;
        Ok(model.map(Agent::from))
    }

    pub async fn agent_exists(&self, id: Uuid) -> AppResult<bool> {
        let found = agent::Entity::find_by_id(id)
            .select_only()
            .column(agent::Column::Id)
            .into_tuple::<Uuid>()
            .one(self.conn)
            .await?;
        Ok(found.is_some())
    }

    pub async fn agent_for_user(&self, user_id: Uuid) -> AppResult<Option<Agent>> {
        let model = agent::Entity::find()
            .filter(agent::Column::UserId.eq(user_id))
            .one(self.conn)
            .await?;
        Ok(model.map(Agent::from))
    }

    pub async fn agents_by_ids(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Agent>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = agent::Entity::find()
            .filter(agent::Column::Id.is_in(ids.iter().copied()))
            .all(self.conn)
            .await?;
        Ok(models.into_iter().map(|m| (m.id, Agent::from(m))).collect())
    }

    /// Agents with the most sales first.
    pub async fn list_agents(&self, params: &PaginationParams) -> AppResult<(Vec<Agent>, u64)> {
        let query = agent::Entity::find()
            .order_by_desc(agent::Column::SalesVolume)
            .order_by_asc(agent::Column::Id);
        let (models, total) = fetch_page(query, self.conn, params).await?;
        Ok((models.into_iter().map(Agent::from).collect(), total))
    }

    pub async fn all_agent_ids(&self) -> AppResult<Vec<Uuid>> {
        agent::Entity::find()
            .select_only()
            .column(agent::Column::Id)
            .into_tuple::<Uuid>()
            .all(self.conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn create_agent(&self, draft: AgentDraft) -> AppResult<Agent> {
        let model = agent::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(draft.user_id),
            bio: Set(draft.bio),
            specialties: Set(draft.specialties),
            years_of_experience: Set(draft.years_of_experience),
            listings_count: Set(0),
            sales_volume: Set(Decimal::ZERO),
        }
        .insert(self.conn)
        .await?;

        Ok(Agent::from(model))
    }

    pub async fn update_agent(&self, id: Uuid, patch: AgentPatch) -> AppResult<Agent> {
        let existing = agent::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_not_found()?;

        let mut active: agent::ActiveModel = existing.into();
        if let Some(bio) = patch.bio {
            active.bio = Set(bio);
        }
        if let Some(specialties) = patch.specialties {
            active.specialties = Set(specialties);
        }
        if let Some(years) = patch.years_of_experience {
            active.years_of_experience = Set(years);
        }

        let model = active.update(self.conn).await?;
        Ok(Agent::from(model))
    }

    pub async fn delete_agent(&self, id: Uuid) -> AppResult<bool> {
        let result = agent::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Persist both derived agent fields in one write.
    pub async fn save_agent_stats(&self, id: Uuid, stats: AgentStats) -> AppResult<()> {
        let result = agent::Entity::update_many()
            .col_expr(
                agent::Column::ListingsCount,
                Expr::value(stats.listings_count),
            )
            .col_expr(
                agent::Column::SalesVolume,
                Expr::value(stats.sales_volume),
            )
            .filter(agent::Column::Id.eq(id))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
