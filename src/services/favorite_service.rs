//! Favorites - per-user bookmarks on properties.
//!
//! Creation is an insert-if-absent keyed on (property, user): two
//! concurrent requests for the same pair both succeed and leave a
//! single row.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::views::property_summaries;
use crate::domain::policy::authorize;
use crate::domain::{Action, Actor, FavoriteResponse, FavoriteToggle, NewFavorite, Target};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait FavoriteService: Send + Sync {
    /// Remove the favorite when present, add it otherwise
    async fn toggle(&self, actor: &Actor, property_id: Uuid) -> AppResult<FavoriteToggle>;

    /// The actor's favorites, newest first
    async fn list(&self, actor: &Actor, params: PaginationParams) -> AppResult<Paginated<FavoriteResponse>>;

    /// Idempotent explicit creation
    async fn add(&self, actor: &Actor, request: NewFavorite) -> AppResult<FavoriteResponse>;

    async fn remove(&self, actor: &Actor, id: Uuid) -> AppResult<()>;
}

pub struct FavoriteManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> FavoriteManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> FavoriteService for FavoriteManager<U> {
    async fn toggle(&self, actor: &Actor, property_id: Uuid) -> AppResult<FavoriteToggle> {
        authorize(actor, Action::Write, &Target::Favorites)?;
        let user_id = actor.require_user()?.user_id;

        let outcome = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    if !tx.properties().exists(property_id).await? {
                        return Err(AppError::NotFound);
                    }
                    tx.engagement().toggle_favorite(property_id, user_id).await
                })
            })
            .await?;

        tracing::info!(%property_id, %user_id, outcome = ?outcome, "Favorite toggled");
        Ok(outcome)
    }

    async fn list(&self, actor: &Actor, params: PaginationParams) -> AppResult<Paginated<FavoriteResponse>> {
        authorize(actor, Action::Read, &Target::Favorites)?;
        let user_id = actor.require_user()?.user_id;

        let ctx = self.uow.reader();
        let (favorites, total) = ctx.engagement().favorites_of(user_id, &params).await?;

        let property_ids: Vec<Uuid> = favorites.iter().map(|f| f.property_id).collect();
        let properties = ctx.properties().find_many(&property_ids).await?;
        let mut summaries = property_summaries(&ctx, properties.into_values().collect())
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect::<HashMap<_, _>>();

        let data = favorites
            .into_iter()
            .filter_map(|favorite| {
                let summary = summaries.remove(&favorite.property_id)?;
                Some(FavoriteResponse::new(favorite, summary))
            })
            .collect();
        Ok(Paginated::new(data, &params, total))
    }

    async fn add(&self, actor: &Actor, request: NewFavorite) -> AppResult<FavoriteResponse> {
        authorize(actor, Action::Write, &Target::Favorites)?;
        let user_id = actor.require_user()?.user_id;
        let property_id = request.property_id;

        let response = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let property = tx
                        .properties()
                        .find(property_id)
                        .await?
                        .ok_or_else(|| AppError::invalid_field("property_id", "Property does not exist"))?;
                    let favorite = tx.engagement().add_favorite(property_id, user_id).await?;
                    let summary = property_summaries(&tx, vec![property])
                        .await?
                        .pop()
                        .ok_or(AppError::NotFound)?;
                    Ok(FavoriteResponse::new(favorite, summary))
                })
            })
            .await?;

        tracing::info!(%property_id, %user_id, "Favorite added");
        Ok(response)
    }

    async fn remove(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        actor.require_user()?;
        let favorite = self
            .uow
            .reader()
            .engagement()
            .find_favorite(id)
            .await?
            .ok_or_not_found()?;
        // Other users' favorites are outside the actor's scope entirely.
        authorize(
            actor,
            Action::Write,
            &Target::Favorite {
                owner_id: favorite.user_id,
            },
        )
        .map_err(|_| AppError::NotFound)?;

        self.uow
            .transaction(move |tx| Box::pin(async move { tx.engagement().delete_favorite(id).await }))
            .await?;

        tracing::info!(favorite_id = %id, "Favorite removed");
        Ok(())
    }
}
