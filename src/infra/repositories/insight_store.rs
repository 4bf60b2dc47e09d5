//! Market reports, trends, blog posts and statistics.

use chrono::Utc;
use sea_orm::sea_query::{Alias, Condition, Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::base::{escape_like, fetch_page, icontains};
use super::entities::{blog_post, market_report, market_statistic, market_trend};
use crate::domain::validation::round_money;
use crate::domain::{
    BlogFilter, BlogPost, BlogPostDraft, BlogPostPatch, BlogScope, MarketReport,
    MarketReportDraft, MarketReportPatch, MarketStatistic, MarketStatisticDraft,
    MarketStatisticPatch, MarketTrend, MarketTrendDraft, MarketTrendPatch, ReportFilter,
    StatisticFilter, TrendFilter,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::PaginationParams;

pub struct InsightStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> InsightStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    // =========================================================================
    // Reports
    // =========================================================================

    pub async fn report_by_slug(&self, slug: &str) -> AppResult<Option<MarketReport>> {
        let model = market_report::Entity::find()
            .filter(market_report::Column::Slug.eq(slug))
            .one(self.conn)
            .await?;
        Ok(model.map(MarketReport::from))
    }

    /// Most recently published first.
    pub async fn list_reports(
        &self,
        filter: &ReportFilter,
        params: &PaginationParams,
    ) -> AppResult<(Vec<MarketReport>, u64)> {
        let mut query = market_report::Entity::find();
        if let Some(is_featured) = filter.is_featured {
            query = query.filter(market_report::Column::IsFeatured.eq(is_featured));
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(icontains(market_report::Column::Title, term))
                    .add(icontains(market_report::Column::Summary, term)),
            );
        }
        let query = query
            .order_by_desc(market_report::Column::PublishedDate)
            .order_by_desc(market_report::Column::CreatedAt)
            .order_by_asc(market_report::Column::Id);

        let (models, total) = fetch_page(query, self.conn, params).await?;
        Ok((models.into_iter().map(MarketReport::from).collect(), total))
    }

    pub async fn insert_report(
        &self,
        draft: &MarketReportDraft,
        slug: String,
        author_id: Uuid,
        cover_image: Option<String>,
    ) -> AppResult<MarketReport> {
        let now = Utc::now();
        let model = market_report::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(draft.title.trim().to_string()),
            slug: Set(slug),
            summary: Set(draft.summary.clone()),
            content: Set(draft.content.clone()),
            author_id: Set(author_id),
            cover_image: Set(cover_image),
            published_date: Set(draft.published_date),
            is_featured: Set(draft.is_featured),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await?;

        Ok(MarketReport::from(model))
    }

    pub async fn update_report(
        &self,
        id: Uuid,
        patch: &MarketReportPatch,
        cover_image: Option<String>,
    ) -> AppResult<MarketReport> {
        let existing = market_report::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_not_found()?;

        let mut active: market_report::ActiveModel = existing.into();
        if let Some(title) = &patch.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(slug) = &patch.slug {
            active.slug = Set(slug.trim().to_string());
        }
        if let Some(summary) = &patch.summary {
            active.summary = Set(summary.clone());
        }
        if let Some(content) = &patch.content {
            active.content = Set(content.clone());
        }
        if let Some(published_date) = patch.published_date {
            active.published_date = Set(published_date);
        }
        if let Some(is_featured) = patch.is_featured {
            active.is_featured = Set(is_featured);
        }
        if cover_image.is_some() {
            active.cover_image = Set(cover_image);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await?;
        Ok(MarketReport::from(model))
    }

    pub async fn delete_report(&self, id: Uuid) -> AppResult<bool> {
        let result = market_report::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    // =========================================================================
    // Trends
    // =========================================================================

    pub async fn find_trend(&self, id: Uuid) -> AppResult<Option<MarketTrend>> {
        market_trend::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .map(MarketTrend::try_from)
            .transpose()
    }

    /// Latest period first.
    pub async fn list_trends(
        &self,
        filter: &TrendFilter,
        params: &PaginationParams,
    ) -> AppResult<(Vec<MarketTrend>, u64)> {
        let mut query = market_trend::Entity::find();
        if let Some(area_id) = filter.area_id {
            query = query.filter(market_trend::Column::AreaId.eq(area_id));
        }
        if let Some(property_type) = filter.property_type {
            query = query.filter(market_trend::Column::PropertyType.eq(property_type.as_str()));
        }
        if let Some(period) = filter.period {
            query = query.filter(market_trend::Column::Period.eq(period.as_str()));
        }
        if let Some(direction) = filter.trend_direction {
            query = query.filter(market_trend::Column::TrendDirection.eq(direction.as_str()));
        }
        let query = query
            .order_by_desc(market_trend::Column::PeriodStartDate)
            .order_by_asc(market_trend::Column::Id);

        let (models, total) = fetch_page(query, self.conn, params).await?;
        let trends = models
            .into_iter()
            .map(MarketTrend::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((trends, total))
    }

    /// A second row for the same (area, type, period, start) is a `Conflict`.
    pub async fn insert_trend(&self, draft: &MarketTrendDraft) -> AppResult<MarketTrend> {
        let now = Utc::now();
        let model = market_trend::ActiveModel {
            id: Set(Uuid::new_v4()),
            area_id: Set(draft.area_id),
            property_type: Set(draft.property_type.as_str().to_string()),
            period: Set(draft.period.as_str().to_string()),
            period_start_date: Set(draft.period_start_date),
            period_end_date: Set(draft.period_end_date),
            average_price: Set(round_money(draft.average_price)),
            price_change: Set(round_money(draft.price_change)),
            trend_direction: Set(draft.trend_direction.as_str().to_string()),
            sales_volume: Set(draft.sales_volume),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await
        .map_err(trend_conflict)?;

        MarketTrend::try_from(model)
    }

    pub async fn update_trend(&self, id: Uuid, patch: &MarketTrendPatch) -> AppResult<MarketTrend> {
        let existing = market_trend::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_not_found()?;

        let mut active: market_trend::ActiveModel = existing.into();
        if let Some(area_id) = patch.area_id {
            active.area_id = Set(area_id);
        }
        if let Some(property_type) = patch.property_type {
            active.property_type = Set(property_type.as_str().to_string());
        }
        if let Some(period) = patch.period {
            active.period = Set(period.as_str().to_string());
        }
        if let Some(start) = patch.period_start_date {
            active.period_start_date = Set(start);
        }
        if let Some(end) = patch.period_end_date {
            active.period_end_date = Set(end);
        }
        if let Some(price) = patch.average_price {
            active.average_price = Set(round_money(price));
        }
        if let Some(change) = patch.price_change {
            active.price_change = Set(round_money(change));
        }
        if let Some(direction) = patch.trend_direction {
            active.trend_direction = Set(direction.as_str().to_string());
        }
        if let Some(volume) = patch.sales_volume {
            active.sales_volume = Set(volume);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await.map_err(trend_conflict)?;
        MarketTrend::try_from(model)
    }

    pub async fn delete_trend(&self, id: Uuid) -> AppResult<bool> {
        let result = market_trend::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    // =========================================================================
    // Blog
    // =========================================================================

    pub async fn post_by_slug(&self, slug: &str) -> AppResult<Option<BlogPost>> {
        let model = blog_post::Entity::find()
            .filter(blog_post::Column::Slug.eq(slug))
            .one(self.conn)
            .await?;
        Ok(model.map(BlogPost::from))
    }

    /// Posts visible under `scope`, newest first.
    pub async fn list_posts(
        &self,
        scope: BlogScope,
        filter: &BlogFilter,
        params: &PaginationParams,
    ) -> AppResult<(Vec<BlogPost>, u64)> {
        let mut query = blog_post::Entity::find();
        if scope == BlogScope::Published {
            query = query.filter(blog_post::Column::IsPublished.eq(true));
        }
        if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(icontains(blog_post::Column::Title, term))
                    .add(icontains(blog_post::Column::Excerpt, term)),
            );
        }
        if let Some(tag) = filter.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            // Tags are a JSON array; match the quoted element in its text form.
            let quoted = serde_json::to_string(tag).map_err(|e| AppError::internal(e.to_string()))?;
            let pattern = format!("%{}%", escape_like(&quoted));
            query = query.filter(
                Expr::col(blog_post::Column::Tags)
                    .cast_as(Alias::new("TEXT"))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }
        let query = query
            .order_by_desc(blog_post::Column::PublishedDate)
            .order_by_desc(blog_post::Column::CreatedAt)
            .order_by_asc(blog_post::Column::Id);

        let (models, total) = fetch_page(query, self.conn, params).await?;
        Ok((models.into_iter().map(BlogPost::from).collect(), total))
    }

    pub async fn insert_post(
        &self,
        draft: &BlogPostDraft,
        slug: String,
        author_id: Uuid,
        cover_image: Option<String>,
    ) -> AppResult<BlogPost> {
        let now = Utc::now();
        let model = blog_post::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(draft.title.trim().to_string()),
            slug: Set(slug),
            excerpt: Set(draft.excerpt.clone()),
            content: Set(draft.content.clone()),
            author_id: Set(author_id),
            cover_image: Set(cover_image),
            published_date: Set(draft.published_date),
            tags: Set(serde_json::json!(draft.tags)),
            is_published: Set(draft.is_published),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.conn)
        .await?;

        Ok(BlogPost::from(model))
    }

    pub async fn update_post(
        &self,
        id: Uuid,
        patch: &BlogPostPatch,
        cover_image: Option<String>,
    ) -> AppResult<BlogPost> {
        let existing = blog_post::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_not_found()?;

        let mut active: blog_post::ActiveModel = existing.into();
        if let Some(title) = &patch.title {
            active.title = Set(title.trim().to_string());
        }
        if let Some(slug) = &patch.slug {
            active.slug = Set(slug.trim().to_string());
        }
        if let Some(excerpt) = &patch.excerpt {
            active.excerpt = Set(excerpt.clone());
        }
        if let Some(content) = &patch.content {
            active.content = Set(content.clone());
        }
        if let Some(published_date) = patch.published_date {
            active.published_date = Set(published_date);
        }
        if let Some(tags) = &patch.tags {
            active.tags = Set(serde_json::json!(tags));
        }
        if let Some(is_published) = patch.is_published {
            active.is_published = Set(is_published);
        }
        if cover_image.is_some() {
            active.cover_image = Set(cover_image);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.conn).await?;
        Ok(BlogPost::from(model))
    }

    pub async fn delete_post(&self, id: Uuid) -> AppResult<bool> {
        let result = blog_post::Entity::delete_by_id(id).exec(self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    pub async fn find_statistic(&self, id: Uuid) -> AppResult<Option<MarketStatistic>> {
        let model = market_statistic::Entity::find_by_id(id).one(self.conn).await?;
        Ok(model.map(MarketStatistic::from))
    }

    /// Statistics in display order.
    pub async fn list_statistics(&self, filter: &StatisticFilter) -> AppResult<Vec<MarketStatistic>> {
        let mut query = market_statistic::Entity::find();
        if let Some(is_featured) = filter.is_featured {
            query = query.filter(market_statistic::Column::IsFeatured.eq(is_featured));
        }
        let models = query
            .order_by_asc(market_statistic::Column::DisplayOrder)
            .order_by_asc(market_statistic::Column::Name)
            .all(self.conn)
            .await?;
        Ok(models.into_iter().map(MarketStatistic::from).collect())
    }

    pub async fn insert_statistic(&self, draft: &MarketStatisticDraft) -> AppResult<MarketStatistic> {
        let model = market_statistic::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(draft.name.trim().to_string()),
            value: Set(draft.value.trim().to_string()),
            description: Set(draft.description.clone()),
            icon: Set(draft.icon.clone()),
            is_featured: Set(draft.is_featured),
            display_order: Set(draft.display_order),
        }
        .insert(self.conn)
        .await?;

        Ok(MarketStatistic::from(model))
    }

    pub async fn update_statistic(
        &self,
        id: Uuid,
        patch: &MarketStatisticPatch,
    ) -> AppResult<MarketStatistic> {
        let existing = market_statistic::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or_not_found()?;

        let mut active: market_statistic::ActiveModel = existing.into();
        if let Some(name) = &patch.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(value) = &patch.value {
            active.value = Set(value.trim().to_string());
        }
        if let Some(description) = &patch.description {
            active.description = Set(description.clone());
        }
        if let Some(icon) = &patch.icon {
            active.icon = Set(icon.clone());
        }
        if let Some(is_featured) = patch.is_featured {
            active.is_featured = Set(is_featured);
        }
        if let Some(display_order) = patch.display_order {
            active.display_order = Set(display_order);
        }

        let model = active.update(self.conn).await?;
        Ok(MarketStatistic::from(model))
    }

    pub async fn delete_statistic(&self, id: Uuid) -> AppResult<bool> {
        let result = market_statistic::Entity::delete_by_id(id)
            .exec(self.conn)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

fn trend_conflict(err: sea_orm::DbErr) -> AppError {
    match AppError::from(err) {
        AppError::Conflict(_) => AppError::conflict("Market trend for this area, type and period"),
        other => other,
    }
}
