//! Areas with their images, perks and guide.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use super::base::{direction, fetch_page, icontains};
use super::entities::{area, area_guide, area_image, area_perk};
use crate::domain::{
    Area, AreaDraft, AreaFilter, AreaGuide, AreaPatch, AreaPerk, AreaSortField, AreaStats,
    GuideData, Image, PerkSpec, PrimaryPolicy,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::{PaginationParams, SortOrder};

pub struct AreaStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> AreaStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn find(&self, id: Uuid) -> AppResult<Option<Area>> {
        let model = area::Entity::find_by_id(id).one(self.conn).await?;
        Ok(model.map(Area::from))
    }

    /// First area carrying exactly this name
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Area>> {
        let model = area::Entity::find()
            .filter(area::Column::Name.eq(name))
            .order_by_asc(area::Column::CreatedAt)
            .one(self.conn)
            .await?;
        Ok(model.map(Area::from))
    }

    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let found = area::Entity::find_by_id(id)
            .select_only()
            .column(area::Column::Id)
            .into_tuple::<Uuid>()
            .one(self.conn)
            .await?;
        Ok(found.is_some())
    }

    pub async fn names_by_ids(&self, ids: &[Uuid]) -> AppResult<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = area::Entity::find()
            .select_only()
            .column(area::Column::Id)
            .column(area::Column::Name)
            .filter(area::Column::Id.is_in(ids.iter().copied()))
            .into_tuple::<(Uuid, String)>()
            .all(self.conn)
            .await?;
        Ok(rows.into_iter().collect())
    }

    /// Ids of areas whose name matches the search term.
    pub async fn ids_matching(&self, term: &str) -> AppResult<Vec<Uuid>> {
        area::Entity::find()
            .select_only()
            .column(area::Column::Id)
            .filter(icontains(area::Column::Name, term))
            .into_tuple::<Uuid>()
            .all(self.conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn all_ids(&self) -> AppResult<Vec<Uuid>> {
        area::Entity::find()
            .select_only()
            .column(area::Column::Id)
            .into_tuple::<Uuid>()
            .all(self.conn)
            .await
            .map_err(AppError::from)
    }

    pub async fn list(
        &self,
        filter: &AreaFilter,
        sort: SortOrder<AreaSortField>,
        params: &PaginationParams,
    ) -> AppResult<(Vec<Area>, u64)> {
        let mut query = area::Entity::find();

        if let Some(featured) = filter.featured {
            query = query.filter(area::Column::Featured.eq(featured));
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(icontains(area::Column::Name, term))
                    .add(icontains(area::Column::Description, term)),
            );
        }

        let column = match sort.field {
            AreaSortField::Name => area::Column::Name,
            AreaSortField::PropertiesCount => area::Column::PropertiesCount,
            AreaSortField::AveragePrice => area::Column::AveragePrice,
        };
        query = query
            .order_by(column, direction(&sort))
            .order_by_asc(area::Column::Id);

        let (models, total) = fetch_page(query, self.conn, params).await?;
        Ok((models.into_iter().map(Area::from).collect(), total))
    }

    pub async fn featured(&self) -> AppResult<Vec<Area>> {
        let models = area::Entity::find()
            .filter(area::Column::Featured.eq(true))
            .order_by_asc(area::Column::Name)
            .all(self.conn)
            .await?;
        Ok(models.into_iter().map(Area::from).collect())
    }

    pub async fn insert(&self, draft: &AreaDraft, cover_image: Option<String>) -> AppResult<Area> {
        let now = Utc::now();
        let model = area::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name.trim().to_string()),
            description: Set(draft.description.clone()),
            cover_image: Set(cover_image),
            properties_count: Set(0),
            average_price: Set(Decimal::ZERO),
            featured: Set(draft.featured),
            latitude: Set(draft.latitude),
            longitude: Set(draft.longitude),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await?;

        Ok(Area::from(model))
    }

    /// Apply the fields present in `patch`; `NotFound` when the area is gone.
    pub async fn update(
        &self,
        id: Uuid,
        patch: &AreaPatch,
        cover_image: Option<String>,
    ) -> AppResult<Area> {
        let existing = area::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_not_found()?;

        let mut active: area::ActiveModel = existing.into();
        if let Some(name) = &patch.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = &patch.description {
            active.description = Set(description.clone());
        }
        if let Some(featured) = patch.featured {
            active.featured = Set(featured);
        }
        if let Some(latitude) = patch.latitude {
            active.latitude = Set(latitude);
        }
        if let Some(longitude) = patch.longitude {
            active.longitude = Set(longitude);
        }
        if cover_image.is_some() {
            active.cover_image = Set(cover_image);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await?;
        Ok(Area::from(model))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = area::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    /// Persist both derived fields in one write.
    pub async fn save_stats(&self, id: Uuid, stats: AreaStats) -> AppResult<()> {
        let result = area::Entity::update_many()
            .col_expr(area::Column::PropertiesCount, Expr::value(stats.properties_count))
            .col_expr(area::Column::AveragePrice, Expr::value(stats.average_price))
            .col_expr(area::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(area::Column::Id.eq(id))
            .exec(self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// Primary image first, then upload order.
    pub async fn images(&self, area_id: Uuid) -> AppResult<Vec<Image>> {
        let models = area_image::Entity::find()
            .filter(area_image::Column::AreaId.eq(area_id))
            .order_by_desc(area_image::Column::IsPrimary)
            .order_by_asc(area_image::Column::CreatedAt)
            .all(self.conn)
            .await?;
        Ok(models.into_iter().map(Image::from).collect())
    }

    pub async fn images_for(&self, area_ids: &[Uuid]) -> AppResult<HashMap<Uuid, Vec<Image>>> {
        let mut grouped: HashMap<Uuid, Vec<Image>> = HashMap::new();
        if area_ids.is_empty() {
            return Ok(grouped);
        }
        let models = area_image::Entity::find()
            .filter(area_image::Column::AreaId.is_in(area_ids.iter().copied()))
            .order_by_desc(area_image::Column::IsPrimary)
            .order_by_asc(area_image::Column::CreatedAt)
            .all(self.conn)
            .await?;
        for model in models {
            grouped.entry(model.area_id).or_default().push(Image::from(model));
        }
        Ok(grouped)
    }

    /// Insert images in input order with primary flags from `policy`.
    pub async fn add_images(
        &self,
        area_id: Uuid,
        urls: &[String],
        policy: PrimaryPolicy,
    ) -> AppResult<Vec<Image>> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }
        if policy.demotes_existing() {
            area_image::Entity::update_many()
                .col_expr(area_image::Column::IsPrimary, Expr::value(false))
                .filter(area_image::Column::AreaId.eq(area_id))
                .exec(self.conn)
                .await?;
        }

        let now = Utc::now();
        let mut images = Vec::with_capacity(urls.len());
        for (i, (url, is_primary)) in urls.iter().zip(policy.flags(urls.len())).enumerate() {
            let model = area_image::ActiveModel {
                id: Set(Uuid::new_v4()),
                area_id: Set(area_id),
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

    // =========================================================================
    // Perks
    // =========================================================================

    pub async fn perks(&self, area_id: Uuid) -> AppResult<Vec<AreaPerk>> {
        let models = area_perk::Entity::find()
            .filter(area_perk::Column::AreaId.eq(area_id))
            .order_by_asc(area_perk::Column::Name)
            .all(self.conn)
            .await?;
        Ok(models.into_iter().map(AreaPerk::from).collect())
    }

    pub async fn add_perks(&self, area_id: Uuid, perks: &[PerkSpec]) -> AppResult<()> {
        for perk in perks {
            area_perk::ActiveModel {
                id: Set(Uuid::new_v4()),
                area_id: Set(area_id),
                name: Set(perk.name.trim().to_string()),
                description: Set(perk.description.clone()),
            }
            .insert(self.conn)
            .await?;
        }
        Ok(())
    }

    /// Drop every perk of the area and insert `perks` instead.
    pub async fn replace_perks(&self, area_id: Uuid, perks: &[PerkSpec]) -> AppResult<()> {
        area_perk::Entity::delete_many()
            .filter(area_perk::Column::AreaId.eq(area_id))
            .exec(self.conn)
            .await?;
        self.add_perks(area_id, perks).await
    }

    // =========================================================================
    // Guide
    // =========================================================================

    pub async fn guide(&self, area_id: Uuid) -> AppResult<Option<AreaGuide>> {
        let model = area_guide::Entity::find()
            .filter(area_guide::Column::AreaId.eq(area_id))
            .one(self.conn)
            .await?;
        Ok(model.map(AreaGuide::from))
    }

    /// Fetch-or-create the guide, then overwrite only the fields present.
    pub async fn upsert_guide(&self, area_id: Uuid, data: &GuideData) -> AppResult<AreaGuide> {
        let now = Utc::now();
        let existing = area_guide::Entity::find()
            .filter(area_guide::Column::AreaId.eq(area_id))
            .one(self.conn)
            .await?;

        let model = match existing {
            Some(model) => {
                let mut active: area_guide::ActiveModel = model.into();
                if let Some(content) = &data.content {
                    active.content = Set(content.clone());
                }
                if let Some(attractions) = &data.attractions {
                    active.attractions = Set(attractions.clone());
                }
                if let Some(lifestyle) = &data.lifestyle {
                    active.lifestyle = Set(lifestyle.clone());
                }
                if let Some(schools) = &data.schools {
                    active.schools = Set(schools.clone());
                }
                if let Some(transportation) = &data.transportation {
                    active.transportation = Set(transportation.clone());
                }
                active.updated_at = Set(now);
                active.update(self.conn).await?
            }
            None => {
                area_guide::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    area_id: Set(area_id),
                    content: Set(data.content.clone().unwrap_or_default()),
                    attractions: Set(data.attractions.clone().unwrap_or_default()),
                    lifestyle: Set(data.lifestyle.clone().unwrap_or_default()),
                    schools: Set(data.schools.clone().unwrap_or_default()),
                    transportation: Set(data.transportation.clone().unwrap_or_default()),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(self.conn)
                .await?
            }
        };

        Ok(AreaGuide::from(model))
    }
}
