//! Favorites and inquiries.

use chrono::Utc;
use sea_orm::sea_query::{Condition, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::base::fetch_page;
use super::entities::{favorite, property_inquiry};
use super::property_store::PropertyStore;
use crate::domain::{Favorite, FavoriteToggle, Inquiry, InquiryScope, NewInquiry};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::PaginationParams;

pub struct EngagementStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> EngagementStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    pub async fn find_favorite(&self, id: Uuid) -> AppResult<Option<Favorite>> {
        let model = favorite::Entity::find_by_id(id).one(self.conn).await?;
        Ok(model.map(Favorite::from))
    }

    pub async fn favorite_of(&self, property_id: Uuid, user_id: Uuid) -> AppResult<Option<Favorite>> {
        let model = favorite::Entity::find()
            .filter(favorite::Column::PropertyId.eq(property_id))
            .filter(favorite::Column::UserId.eq(user_id))
            .one(self.conn)
            .await?;
        Ok(model.map(Favorite::from))
    }

    /// Insert-if-absent on (property, user), then read the row back.
    ///
    /// Losing a race against an identical insert is not an error: the
    /// winner's row is returned.
    pub async fn add_favorite(&self, property_id: Uuid, user_id: Uuid) -> AppResult<Favorite> {
        let inserted = favorite::Entity::insert(favorite::ActiveModel {
            id: Set(Uuid::new_v4()),
            property_id: Set(property_id),
            user_id: Set(user_id),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([favorite::Column::PropertyId, favorite::Column::UserId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.conn)
        .await?;

        if inserted == 0 {
            tracing::warn!(%property_id, %user_id, "Favorite already present, keeping existing row");
        }

        self.favorite_of(property_id, user_id)
            .await?
            .ok_or_else(|| AppError::internal("Favorite vanished after upsert"))
    }

    /// Remove the favorite if present, add it otherwise.
    pub async fn toggle_favorite(&self, property_id: Uuid, user_id: Uuid) -> AppResult<FavoriteToggle> {
        let removed = favorite::Entity::delete_many()
            .filter(favorite::Column::PropertyId.eq(property_id))
            .filter(favorite::Column::UserId.eq(user_id))
            .exec(self.conn)
            .await?;

        if removed.rows_affected > 0 {
            return Ok(FavoriteToggle::Removed);
        }
        self.add_favorite(property_id, user_id).await?;
        Ok(FavoriteToggle::Added)
    }

    pub async fn delete_favorite(&self, id: Uuid) -> AppResult<bool> {
        let result = favorite::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// The user's favorites, newest first.
    pub async fn favorites_of(
        &self,
        user_id: Uuid,
        params: &PaginationParams,
    ) -> AppResult<(Vec<Favorite>, u64)> {
        let query = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .order_by_asc(favorite::Column::Id);
        let (models, total) = fetch_page(query, self.conn, params).await?;
        Ok((models.into_iter().map(Favorite::from).collect(), total))
    }

    // =========================================================================
    // Inquiries
    // =========================================================================

    pub async fn insert_inquiry(&self, inquiry: &NewInquiry, user_id: Option<Uuid>) -> AppResult<Inquiry> {
        let model = property_inquiry::ActiveModel {
            id: Set(Uuid::new_v4()),
            property_id: Set(inquiry.property_id),
            name: Set(inquiry.name.trim().to_string()),
            email: Set(inquiry.email.trim().to_string()),
            phone: Set(inquiry.phone.trim().to_string()),
            message: Set(inquiry.message.clone()),
            user_id: Set(user_id),
            created_at: Set(Utc::now()),
            is_processed: Set(false),
        }
        .insert(self.conn)
        .await?;

        Ok(Inquiry::from(model))
    }

    pub async fn find_inquiry(&self, id: Uuid) -> AppResult<Option<Inquiry>> {
        let model = property_inquiry::Entity::find_by_id(id).one(self.conn).await?;
        Ok(model.map(Inquiry::from))
    }

    /// Inquiries visible under `scope`, newest first.
    pub async fn list_inquiries(
        &self,
        scope: InquiryScope,
        params: &PaginationParams,
    ) -> AppResult<(Vec<Inquiry>, u64)> {
        let mut query = property_inquiry::Entity::find();

        match scope {
            InquiryScope::All => {}
            InquiryScope::Own(user_id) => {
                query = query.filter(property_inquiry::Column::UserId.eq(user_id));
            }
            InquiryScope::Agent { agent_id, user_id } => {
                let assigned = PropertyStore::new(self.conn).ids_for_agent(agent_id).await?;
                let mut visible = Condition::any().add(property_inquiry::Column::UserId.eq(user_id));
                if !assigned.is_empty() {
                    visible = visible.add(property_inquiry::Column::PropertyId.is_in(assigned));
                }
                query = query.filter(visible);
            }
        }

        let query = query
            .order_by_desc(property_inquiry::Column::CreatedAt)
            .order_by_asc(property_inquiry::Column::Id);
        let (models, total) = fetch_page(query, self.conn, params).await?;
        Ok((models.into_iter().map(Inquiry::from).collect(), total))
    }

    pub async fn set_processed(&self, id: Uuid, is_processed: bool) -> AppResult<Inquiry> {
        let existing = property_inquiry::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_not_found()?;

        let mut active: property_inquiry::ActiveModel = existing.into();
        active.is_processed = Set(is_processed);
        let model = active.update(self.conn).await?;
        Ok(Inquiry::from(model))
    }

    pub async fn delete_inquiry(&self, id: Uuid) -> AppResult<bool> {
        let result = property_inquiry::Entity::delete_by_id(id)
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
