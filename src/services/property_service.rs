//! Property service - Composite writes of the property aggregate, its
//! image sub-actions, the feature catalogue and listing reads.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::views::{property_detail, property_summaries};
use crate::config::UPLOAD_PROPERTY_IMAGES;
use crate::domain::policy::authorize;
use crate::domain::{
    Action, Actor, Feature, Image, PrimaryPolicy, PropertyDetail, PropertyDraft, PropertyFilter,
    PropertyPatch, PropertySortField, PropertySummary, Target,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{store_all, BlobStore, UnitOfWork, Upload};
use crate::types::{Paginated, PaginationParams, SortOrder};
use crate::with_transaction;

#[async_trait]
pub trait PropertyService: Send + Sync {
    /// Filtered, ordered page of listings; newest first by default
    async fn list(
        &self,
        filter: PropertyFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<PropertySummary>>;

    /// Full detail; `is_favorited` reflects the actor's favorites
    async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<PropertyDetail>;

    /// Create the property with its images and features.
    ///
    /// Without an explicit agent the property goes to the acting agent.
    async fn create(
        &self,
        actor: &Actor,
        draft: PropertyDraft,
        images: Vec<Upload>,
    ) -> AppResult<PropertyDetail>;

    /// Apply a partial update; a non-empty feature list replaces all features.
    async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: PropertyPatch,
        images: Vec<Upload>,
    ) -> AppResult<PropertyDetail>;

    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()>;

    /// Upload more images; `is_primary` promotes the first of them.
    async fn add_images(
        &self,
        actor: &Actor,
        property_id: Uuid,
        images: Vec<Upload>,
        is_primary: bool,
    ) -> AppResult<Vec<Image>>;

    /// Set the primary flag of one image; promoting demotes its siblings.
    async fn update_image(&self, actor: &Actor, image_id: Uuid, is_primary: bool) -> AppResult<Image>;

    async fn delete_image(&self, actor: &Actor, image_id: Uuid) -> AppResult<()>;

    /// Every known feature, by name
    async fn features(&self) -> AppResult<Vec<Feature>>;
}

pub struct PropertyManager<U: UnitOfWork> {
    uow: Arc<U>,
    blobs: Arc<dyn BlobStore>,
}

impl<U: UnitOfWork> PropertyManager<U> {
    pub fn new(uow: Arc<U>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { uow, blobs }
    }

    /// Referenced area and agent must exist; reported per field.
    async fn check_references(&self, area_id: Option<Uuid>, agent_id: Option<Uuid>) -> AppResult<()> {
        let ctx = self.uow.reader();
        if let Some(area_id) = area_id {
            if !ctx.areas().exists(area_id).await? {
                return Err(AppError::invalid_field("area_id", "Area does not exist"));
            }
        }
        if let Some(agent_id) = agent_id {
            if !ctx.accounts().agent_exists(agent_id).await? {
                return Err(AppError::invalid_field("agent_id", "Agent does not exist"));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> PropertyService for PropertyManager<U> {
    async fn list(
        &self,
        filter: PropertyFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<PropertySummary>> {
        let sort = SortOrder::parse_or(
            filter.ordering.as_deref(),
            SortOrder::desc(PropertySortField::CreatedAt),
        )?;
        let ctx = self.uow.reader();
        let (properties, total) = ctx.properties().list(&filter, sort, &params).await?;
        let data = property_summaries(&ctx, properties).await?;
        Ok(Paginated::new(data, &params, total))
    }

    async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<PropertyDetail> {
        let ctx = self.uow.reader();
        let property = ctx.properties().find(id).await?.ok_or_not_found()?;
        property_detail(&ctx, property, actor.user_id()).await
    }

    async fn create(
        &self,
        actor: &Actor,
        draft: PropertyDraft,
        images: Vec<Upload>,
    ) -> AppResult<PropertyDetail> {
        authorize(actor, Action::Write, &Target::Property)?;
        draft.check()?;

        let agent_id = draft.agent_id.or_else(|| actor.agent_id());
        self.check_references(draft.area_id, draft.agent_id).await?;

        let image_urls = store_all(self.blobs.as_ref(), &images, UPLOAD_PROPERTY_IMAGES).await?;
        let feature_names = draft.feature_names();
        let viewer = actor.user_id();

        let detail = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let store = tx.properties();
                    let property = store.insert(&draft, agent_id).await?;
                    store
                        .add_images(property.id, &image_urls, PrimaryPolicy::FirstUpload)
                        .await?;
                    store.attach_features(property.id, &feature_names).await?;
                    property_detail(&tx, property, viewer).await
                })
            })
            .await?;

        tracing::info!(
            property_id = %detail.id,
            images = detail.images.len(),
            features = detail.features.len(),
            "Property created"
        );
        Ok(detail)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: PropertyPatch,
        images: Vec<Upload>,
    ) -> AppResult<PropertyDetail> {
        authorize(actor, Action::Write, &Target::Property)?;
        patch.check()?;
        if !self.uow.reader().properties().exists(id).await? {
            return Err(AppError::NotFound);
        }
        self.check_references(patch.area_id.flatten(), patch.agent_id.flatten())
            .await?;

        let image_urls = store_all(self.blobs.as_ref(), &images, UPLOAD_PROPERTY_IMAGES).await?;
        let viewer = actor.user_id();

        let detail = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let store = tx.properties();
                    let property = store.update(id, &patch).await?;
                    store.add_images(id, &image_urls, PrimaryPolicy::Append).await?;
                    if let Some(features) = patch.replacement_features() {
                        store.replace_features(id, &features).await?;
                    }
                    property_detail(&tx, property, viewer).await
                })
            })
            .await?;

        tracing::info!(property_id = %id, "Property updated");
        Ok(detail)
    }

    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        authorize(actor, Action::Write, &Target::Property)?;

        let deleted = with_transaction!(self.uow, |tx| tx.properties().delete(id).await)?;

        if !deleted {
            return Err(AppError::NotFound);
        }
        tracing::info!(property_id = %id, "Property deleted");
        Ok(())
    }

    async fn add_images(
        &self,
        actor: &Actor,
        property_id: Uuid,
        images: Vec<Upload>,
        is_primary: bool,
    ) -> AppResult<Vec<Image>> {
        let property = self
            .uow
            .reader()
            .properties()
            .find(property_id)
            .await?
            .ok_or_not_found()?;
        authorize(
            actor,
            Action::Write,
            &Target::PropertyImages {
                assigned_agent: property.agent_id,
            },
        )?;
        if images.is_empty() {
            return Err(AppError::invalid_field("images", "No images were provided"));
        }

        let image_urls = store_all(self.blobs.as_ref(), &images, UPLOAD_PROPERTY_IMAGES).await?;
        let policy = if is_primary {
            PrimaryPolicy::Promote
        } else {
            PrimaryPolicy::Append
        };

        let added = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let store = tx.properties();
                    if !store.exists(property_id).await? {
                        return Err(AppError::NotFound);
                    }
                    store.add_images(property_id, &image_urls, policy).await
                })
            })
            .await?;

        tracing::info!(%property_id, count = added.len(), is_primary, "Property images added");
        Ok(added)
    }

    async fn update_image(&self, actor: &Actor, image_id: Uuid, is_primary: bool) -> AppResult<Image> {
        authorize(actor, Action::Write, &Target::Property)?;

        let image = with_transaction!(self.uow, |tx| {
            tx.properties().set_image_primary(image_id, is_primary).await
        })?;

        tracing::info!(%image_id, is_primary, "Property image updated");
        Ok(image)
    }

    async fn delete_image(&self, actor: &Actor, image_id: Uuid) -> AppResult<()> {
        authorize(actor, Action::Write, &Target::Property)?;

        let deleted = with_transaction!(self.uow, |tx| tx.properties().delete_image(image_id).await)?;

        if !deleted {
            return Err(AppError::NotFound);
        }
        tracing::info!(%image_id, "Property image deleted");
        Ok(())
    }

    async fn features(&self) -> AppResult<Vec<Feature>> {
        self.uow.reader().properties().all_features().await
    }
}
