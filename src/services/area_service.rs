//! Area service - Composite writes and reads of the area aggregate.
//!
//! A create or update stores uploads first, then writes the area, its
//! images, perks and guide in one transaction. Any failure rolls the
//! whole aggregate back.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::stats_service::recompute_area;
use super::views::{area_detail, area_summaries};
use crate::config::UPLOAD_AREA_IMAGES;
use crate::domain::policy::authorize;
use crate::domain::{
    Action, Actor, AreaDetail, AreaDraft, AreaFilter, AreaPatch, AreaSortField, AreaStats,
    AreaSummary, PrimaryPolicy, Target,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{store_all, BlobStore, UnitOfWork, Upload};
use crate::types::{Paginated, PaginationParams, SortOrder};
use crate::with_transaction;

#[async_trait]
pub trait AreaService: Send + Sync {
    async fn list(&self, filter: AreaFilter, params: PaginationParams) -> AppResult<Paginated<AreaSummary>>;

    /// Featured areas by name, unpaginated
    async fn featured(&self) -> AppResult<Vec<AreaSummary>>;

    async fn get(&self, id: Uuid) -> AppResult<AreaDetail>;

    /// Create the area with its images, perks and optional guide.
    ///
    /// The first uploaded image becomes the primary one; `cover` is
    /// stored as the area's cover image.
    async fn create(
        &self,
        actor: &Actor,
        draft: AreaDraft,
        images: Vec<Upload>,
        cover: Option<Upload>,
    ) -> AppResult<AreaDetail>;

    /// Apply a partial update. New images are appended without touching
    /// the primary flag; a non-empty perk list replaces all perks.
    async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: AreaPatch,
        images: Vec<Upload>,
        cover: Option<Upload>,
    ) -> AppResult<AreaDetail>;

    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()>;

    async fn update_stats(&self, actor: &Actor, id: Uuid) -> AppResult<AreaStats>;
}

pub struct AreaManager<U: UnitOfWork> {
    uow: Arc<U>,
    blobs: Arc<dyn BlobStore>,
}

impl<U: UnitOfWork> AreaManager<U> {
    pub fn new(uow: Arc<U>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { uow, blobs }
    }

    async fn store_uploads(
        &self,
        images: &[Upload],
        cover: Option<&Upload>,
    ) -> AppResult<(Vec<String>, Option<String>)> {
        let urls = store_all(self.blobs.as_ref(), images, UPLOAD_AREA_IMAGES).await?;
        let cover_url = match cover {
            Some(upload) => Some(self.blobs.store(upload, UPLOAD_AREA_IMAGES).await?),
            None => None,
        };
        Ok((urls, cover_url))
    }
}

#[async_trait]
impl<U: UnitOfWork> AreaService for AreaManager<U> {
    async fn list(&self, filter: AreaFilter, params: PaginationParams) -> AppResult<Paginated<AreaSummary>> {
        let sort = SortOrder::parse_or(filter.ordering.as_deref(), SortOrder::asc(AreaSortField::Name))?;
        let ctx = self.uow.reader();
        let (areas, total) = ctx.areas().list(&filter, sort, &params).await?;
        let data = area_summaries(&ctx, areas).await?;
        Ok(Paginated::new(data, &params, total))
    }

    async fn featured(&self) -> AppResult<Vec<AreaSummary>> {
        let ctx = self.uow.reader();
        let areas = ctx.areas().featured().await?;
        area_summaries(&ctx, areas).await
    }

    async fn get(&self, id: Uuid) -> AppResult<AreaDetail> {
        let ctx = self.uow.reader();
        let area = ctx.areas().find(id).await?.ok_or_not_found()?;
        area_detail(&ctx, area).await
    }

    async fn create(
        &self,
        actor: &Actor,
        draft: AreaDraft,
        images: Vec<Upload>,
        cover: Option<Upload>,
    ) -> AppResult<AreaDetail> {
        authorize(actor, Action::Write, &Target::Area)?;
        draft.check()?;

        let (image_urls, cover_url) = self.store_uploads(&images, cover.as_ref()).await?;

        let detail = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let areas = tx.areas();
                    let area = areas.insert(&draft, cover_url).await?;
                    areas.add_images(area.id, &image_urls, PrimaryPolicy::FirstUpload).await?;
                    areas.add_perks(area.id, &draft.perks).await?;
                    if let Some(guide) = &draft.guide_data {
                        areas.upsert_guide(area.id, guide).await?;
                    }
                    area_detail(&tx, area).await
                })
            })
            .await?;

        tracing::info!(
            area_id = %detail.id,
            images = detail.images.len(),
            perks = detail.perks.len(),
            "Area created"
        );
        Ok(detail)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: AreaPatch,
        images: Vec<Upload>,
        cover: Option<Upload>,
    ) -> AppResult<AreaDetail> {
        authorize(actor, Action::Write, &Target::Area)?;
        patch.check()?;
        if !self.uow.reader().areas().exists(id).await? {
            return Err(AppError::NotFound);
        }

        let (image_urls, cover_url) = self.store_uploads(&images, cover.as_ref()).await?;

        let detail = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let areas = tx.areas();
                    let area = areas.update(id, &patch, cover_url).await?;
                    areas.add_images(id, &image_urls, PrimaryPolicy::Append).await?;
                    if let Some(perks) = patch.replacement_perks() {
                        areas.replace_perks(id, perks).await?;
                    }
                    if let Some(guide) = &patch.guide_data {
                        areas.upsert_guide(id, guide).await?;
                    }
                    area_detail(&tx, area).await
                })
            })
            .await?;

        tracing::info!(area_id = %id, "Area updated");
        Ok(detail)
    }

    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        authorize(actor, Action::Write, &Target::Area)?;

        let deleted = with_transaction!(self.uow, |tx| tx.areas().delete(id).await)?;

        if !deleted {
            return Err(AppError::NotFound);
        }
        tracing::info!(area_id = %id, "Area deleted");
        Ok(())
    }

    async fn update_stats(&self, actor: &Actor, id: Uuid) -> AppResult<AreaStats> {
        authorize(actor, Action::Write, &Target::Area)?;
        recompute_area(self.uow.as_ref(), id).await
    }
}
