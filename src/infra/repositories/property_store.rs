//! Properties, their images and feature relations.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Condition, Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::area_store::AreaStore;
use super::base::{direction, fetch_page, icontains};
use super::entities::{property, property_feature, property_feature_relation, property_image};
use crate::domain::validation::round_money;
use crate::domain::{
    Feature, Image, PrimaryPolicy, Property, PropertyDraft, PropertyFilter, PropertyPatch,
    PropertySortField, PropertyStatus,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::{PaginationParams, SortOrder};

pub struct PropertyStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> PropertyStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find(&self, id: Uuid) -> AppResult<Option<Property>> {
        property::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(Property::try_from)
            .transpose()
    }

    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let found = property::Entity::find_by_id(id)
            .select_only()
            .column(property::Column::Id)
            .into_tuple::<Uuid>()
            .one(self.conn)
            .await?;
        Ok(found.is_some())
    }

    pub async fn find_many(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Property>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = property::Entity::find()
            .filter(property::Column::Id.is_in(ids.iter().copied()))
            .all(self.conn)
            .await?;
        models
            .into_iter()
            .map(|m| Property::try_from(m).map(|p| (p.id, p)))
            .collect()
    }

    /// Agent assigned to each of the given properties.
    pub async fn agents_of(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, Option<Uuid>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = property::Entity::find()
            .select_only()
            .column(property::Column::Id)
            .column(property::Column::AgentId)
            .filter(property::Column::Id.is_in(ids.iter().copied()))
            .into_tuple::<(Uuid, Option<Uuid>)>()
            .all(self.conn)
            .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn ids_for_agent(&self, agent_id: Uuid) -> AppResult<Vec<Uuid>> {
        property::Entity::find()
            .select_only()
            .column(property::Column::Id)
            .filter(property::Column::AgentId.eq(agent_id))
            .into_tuple::<Uuid>()
            .all(self.conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn list(
        &self,
        filter: &PropertyFilter,
        sort: SortOrder<PropertySortField>,
        params: &PaginationParams,
    ) -> AppResult<(Vec<Property>, u64)> {
        let mut query = property::Entity::find();

        if let Some(property_type) = filter.property_type {
            query = query.filter(property::Column::PropertyType.eq(property_type.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(property::Column::Status.eq(status.as_str()));
        }
        if let Some(bedrooms) = filter.bedrooms {
            query = query.filter(property::Column::Bedrooms.eq(bedrooms));
        }
        if let Some(bathrooms) = filter.bathrooms {
            query = query.filter(property::Column::Bathrooms.eq(bathrooms));
        }
        if let Some(area_id) = filter.area_id {
            query = query.filter(property::Column::AreaId.eq(area_id));
        }
        if let Some(is_featured) = filter.is_featured {
            query = query.filter(property::Column::IsFeatured.eq(is_featured));
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let mut any = Condition::any()
                .add(icontains(property::Column::Title, term))
                .add(icontains(property::Column::Description, term))
                .add(icontains(property::Column::Address, term));
            let area_ids = AreaStore::new(self.conn).ids_matching(term).await?;
            if !area_ids.is_empty() {
                any = any.add(property::Column::AreaId.is_in(area_ids));
            }
            query = query.filter(any);
        }

        let column = match sort.field {
            PropertySortField::Price => property::Column::Price,
            PropertySortField::CreatedAt => property::Column::CreatedAt,
            PropertySortField::Bedrooms => property::Column::Bedrooms,
            PropertySortField::Bathrooms => property::Column::Bathrooms,
            PropertySortField::AreaSqm => property::Column::AreaSqm,
        };
        query = query
            .order_by(column, direction(&sort))
            .order_by_asc(property::Column::Id);

        let (models, total) = fetch_page(query, self.conn, params).await?;
        let properties = models
            .into_iter()
            .map(Property::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((properties, total))
    }

    pub async fn insert(&self, draft: &PropertyDraft, agent_id: Option<Uuid>) -> AppResult<Property> {
        let now = Utc::now();
        let model = property::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(draft.title.trim().to_string()),
            description: Set(draft.description.clone()),
            property_type: Set(draft.property_type.as_str().to_string()),
            status: Set(draft.status.as_str().to_string()),
            price: Set(round_money(draft.price)),
            bedrooms: Set(draft.bedrooms),
            bathrooms: Set(draft.bathrooms),
            area_sqm: Set(draft.area_sqm),
            agent_id: Set(agent_id),
            area_id: Set(draft.area_id),
            address: Set(draft.address.trim().to_string()),
            latitude: Set(draft.latitude),
            longitude: Set(draft.longitude),
            is_featured: Set(draft.is_featured),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await?;

        Property::try_from(model)
    }

    /// Apply the fields present in `patch`; `NotFound` when the property is gone.
    pub async fn update(&self, id: Uuid, patch: &PropertyPatch) -> AppResult<Property> {
        let existing = property::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_not_found()?;

        let mut active: property::ActiveModel = existing.into();
        if let Some(title) = &patch.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(description) = &patch.description {
            active.description = Set(description.clone());
        }
        if let Some(property_type) = patch.property_type {
            active.property_type = Set(property_type.as_str().to_string());
        }
        if let Some(status) = patch.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(price) = patch.price {
            active.price = Set(round_money(price));
        }
        if let Some(bedrooms) = patch.bedrooms {
            active.bedrooms = Set(bedrooms);
        }
        if let Some(bathrooms) = patch.bathrooms {
            active.bathrooms = Set(bathrooms);
        }
        if let Some(area_sqm) = patch.area_sqm {
            active.area_sqm = Set(area_sqm);
        }
        if let Some(agent_id) = patch.agent_id {
            active.agent_id = Set(agent_id);
        }
        if let Some(area_id) = patch.area_id {
            active.area_id = Set(area_id);
        }
        if let Some(address) = &patch.address {
            active.address = Set(address.trim().to_string());
        }
        if let Some(latitude) = patch.latitude {
            active.latitude = Set(latitude);
        }
        if let Some(longitude) = patch.longitude {
            active.longitude = Set(longitude);
        }
        if let Some(is_featured) = patch.is_featured {
            active.is_featured = Set(is_featured);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await?;
        Property::try_from(model)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = property::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    // =========================================================================
    // Aggregate inputs
    // =========================================================================

    pub async fn prices_in_area(&self, area_id: Uuid) -> AppResult<Vec<Decimal>> {
        let prices = property::Entity::find()
            .select_only()
            .column(property::Column::Price)
            .filter(property::Column::AreaId.eq(area_id))
            .into_tuple::<Decimal>()
            .all(self.conn)
            .await?;
        Ok(prices.into_iter().map(round_money).collect())
    }

    pub async fn listings_for_agent(&self, agent_id: Uuid) -> AppResult<Vec<(PropertyStatus, Decimal)>> {
        let rows = property::Entity::find()
            .select_only()
            .column(property::Column::Status)
            .column(property::Column::Price)
            .filter(property::Column::AgentId.eq(agent_id))
            .into_tuple::<(String, Decimal)>()
            .all(self.conn)
            .await?;

        rows.into_iter()
            .map(|(status, price)| Ok((status.parse()?, round_money(price))))
            .collect()
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// Primary image first, then upload order.
    pub async fn images(&self, property_id: Uuid) -> AppResult<Vec<Image>> {
        let models = property_image::Entity::find()
            .filter(property_image::Column::PropertyId.eq(property_id))
            .order_by_desc(property_image::Column::IsPrimary)
            .order_by_asc(property_image::Column::CreatedAt)
            .all(self.conn)
            .await?;
        Ok(models.into_iter().map(Image::from).collect())
    }

    pub async fn images_for(&self, property_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<Image>>> {
        let mut grouped: HashMap<Uuid, Vec<Image>> = HashMap::new();
        if property_ids.is_empty() {
            return Ok(grouped);
        }
        let models = property_image::Entity::find()
            .filter(property_image::Column::PropertyId.is_in(property_ids.iter().copied()))
            .order_by_desc(property_image::Column::IsPrimary)
            .order_by_asc(property_image::Column::CreatedAt)
            .all(self.conn)
            .await?;
        for model in models {
            grouped.entry(model.property_id).or_default().push(Image::from(model));
        }
        Ok(grouped)
    }

    /// Insert images in input order with primary flags from `policy`.
    pub async fn add_images(
        &self,
        property_id: Uuid,
        urls: &[String],
        policy: PrimaryPolicy,
    ) -> AppResult<Vec<Image>> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }
        if policy.demotes_existing() {
            self.demote_images(property_id, None).await?;
        }

        let now = Utc::now();
        let mut images = Vec::with_capacity(urls.len());
        for (i, (url, is_primary)) in urls.iter().zip(policy.flags(urls.len())).enumerate() {
            let model = property_image::ActiveModel {
                id: Set(Uuid::new_v4()),
                property_id: Set(property_id),
                image: Set(url.clone()),
                is_primary: Set(is_primary),
                created_at: Set(now + Duration::microseconds(i as i64)),
            }
            .insert(self.conn)
            .await?;
            images.push(Image::from(model));
        }
        Ok(images)
    }

    /// Set the flag; promoting an image demotes every sibling.
    pub async fn set_image_primary(&self, image_id: Uuid, is_primary: bool) -> AppResult<Image> {
        let existing = property_image::Entity::find_by_id(image_id)
            .one(self.conn)
            .await?
            .ok_or_not_found()?;

        if is_primary {
            self.demote_images(existing.property_id, Some(image_id)).await?;
        }

        let mut active: property_image::ActiveModel = existing.into();
        active.is_primary = Set(is_primary);
        let model = active.update(self.conn).await?;
        Ok(Image::from(model))
    }

    pub async fn delete_image(&self, image_id: Uuid) -> AppResult<bool> {
        let result = property_image::Entity::delete_by_id(image_id)
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn demote_images(&self, property_id: Uuid, except: Option<Uuid>) -> AppResult<()> {
        let mut update = property_image::Entity::update_many()
            .col_expr(property_image::Column::IsPrimary, Expr::value(false))
            .filter(property_image::Column::PropertyId.eq(property_id));
        if let Some(keep) = except {
            update = update.filter(property_image::Column::Id.ne(keep));
        }
        update.exec(self.conn).await?;
        Ok(())
    }

    // =========================================================================
    // Features
    // =========================================================================

    pub async fn all_features(&self) -> AppResult<Vec<Feature>> {
        let models = property_feature::Entity::find()
            .order_by_asc(property_feature::Column::Name)
            .all(self.conn)
            .await?;
        Ok(models.into_iter().map(Feature::from).collect())
    }

    /// Insert-if-absent keyed on the unique name, then read the row back.
    ///
    /// A concurrent creator of the same name makes our insert a no-op
    /// instead of aborting the surrounding transaction.
    pub async fn get_or_create_feature(&self, name: &str) -> AppResult<Feature> {
        let inserted = property_feature::Entity::insert(property_feature::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
        })
        .on_conflict(
            OnConflict::column(property_feature::Column::Name)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.conn)
        .await?;

        if inserted == 0 {
            tracing::debug!(feature = name, "Feature already exists, reusing it");
        }

        let model = property_feature::Entity::find()
            .filter(property_feature::Column::Name.eq(name))
            .one(self.conn)
            .await?
            .ok_or_else(|| AppError::internal(format!("Feature '{}' vanished after upsert", name)))?;
        Ok(Feature::from(model))
    }

    /// Link each named feature to the property, creating features as needed.
    pub async fn attach_features(&self, property_id: Uuid, names: &[String]) -> AppResult<()> {
        for name in names {
            let feature = self.get_or_create_feature(name).await?;
            property_feature_relation::Entity::insert(property_feature_relation::ActiveModel {
                id: Set(Uuid::new_v4()),
                property_id: Set(property_id),
                feature_id: Set(feature.id),
            })
            .on_conflict(
                OnConflict::columns([
                    property_feature_relation::Column::PropertyId,
                    property_feature_relation::Column::FeatureId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await?;
        }
        Ok(())
    }

    /// Drop every relation of the property and link `names` instead.
    pub async fn replace_features(&self, property_id: Uuid, names: &[String]) -> AppResult<()> {
        property_feature_relation::Entity::delete_many()
            .filter(property_feature_relation::Column::PropertyId.eq(property_id))
            .exec(self.conn)
            .await?;
        self.attach_features(property_id, names).await
    }

    pub async fn feature_names(&self, property_id: Uuid) -> AppResult<Vec<String>> {
        let mut grouped = self.feature_names_for(&[property_id]).await?;
        Ok(grouped.remove(&property_id).unwrap_or_default())
    }

    /// Feature names per property, alphabetical.
    pub async fn feature_names_for(&self, property_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<String>>> {
        let mut grouped: HashMap<Uuid, Vec<String>> = HashMap::new();
        if property_ids.is_empty() {
            return Ok(grouped);
        }

        let links = property_feature_relation::Entity::find()
            .filter(property_feature_relation::Column::PropertyId.is_in(property_ids.iter().copied()))
            .all(self.conn)
            .await?;
        if links.is_empty() {
            return Ok(grouped);
        }

        let feature_ids: Vec<Uuid> = links.iter().map(|link| link.feature_id).collect();
        let names: HashMap<Uuid, String> = property_feature::Entity::find()
            .filter(property_feature::Column::Id.is_in(feature_ids))
            .all(self.conn)
            .await?
            .into_iter()
            .map(|f| (f.id, f.name))
            .collect();

        for link in links {
            if let Some(name) = names.get(&link.feature_id) {
                grouped.entry(link.property_id).or_default().push(name.clone());
            }
        }
        for names in grouped.values_mut() {
            names.sort();
        }
        Ok(grouped)
    }
}
