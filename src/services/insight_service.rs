//! Market insights - reports, price trends, blog posts and headline statistics.
//!
//! Reports and blog posts are addressed by slug. Covers are stored before
//! the row is written; a slug clash surfaces as a conflict.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::views::{author_of, authors};
use crate::config::{UPLOAD_BLOG_COVERS, UPLOAD_REPORT_COVERS};
use crate::domain::policy::{authorize, blog_scope};
use crate::domain::{
    resolve_slug, Action, Actor, BlogFilter, BlogPost, BlogPostDraft, BlogPostPatch,
    BlogPostResponse, MarketReport, MarketReportDraft, MarketReportPatch, MarketReportResponse,
    MarketStatistic, MarketStatisticDraft, MarketStatisticPatch, MarketTrend, MarketTrendDraft,
    MarketTrendPatch, MarketTrendResponse, ReportFilter, StatisticFilter, Target, TrendFilter,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{BlobStore, UnitOfWork, Upload};
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait InsightService: Send + Sync {
    async fn list_reports(
        &self,
        filter: ReportFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<MarketReportResponse>>;

    async fn get_report(&self, slug: &str) -> AppResult<MarketReportResponse>;

    /// Publish a report authored by the actor
    async fn create_report(
        &self,
        actor: &Actor,
        draft: MarketReportDraft,
        cover: Option<Upload>,
    ) -> AppResult<MarketReportResponse>;

    async fn update_report(
        &self,
        actor: &Actor,
        slug: &str,
        patch: MarketReportPatch,
        cover: Option<Upload>,
    ) -> AppResult<MarketReportResponse>;

    async fn delete_report(&self, actor: &Actor, slug: &str) -> AppResult<()>;

    async fn list_trends(
        &self,
        filter: TrendFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<MarketTrendResponse>>;

    async fn get_trend(&self, id: Uuid) -> AppResult<MarketTrendResponse>;

    /// One row per (area, property type, period, start date)
    async fn create_trend(&self, actor: &Actor, draft: MarketTrendDraft) -> AppResult<MarketTrendResponse>;

    async fn update_trend(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: MarketTrendPatch,
    ) -> AppResult<MarketTrendResponse>;

    async fn delete_trend(&self, actor: &Actor, id: Uuid) -> AppResult<()>;

    /// Published posts; staff also see drafts
    async fn list_posts(
        &self,
        actor: &Actor,
        filter: BlogFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<BlogPostResponse>>;

    /// A draft is only visible to its author and staff
    async fn get_post(&self, actor: &Actor, slug: &str) -> AppResult<BlogPostResponse>;

    async fn create_post(
        &self,
        actor: &Actor,
        draft: BlogPostDraft,
        cover: Option<Upload>,
    ) -> AppResult<BlogPostResponse>;

    async fn update_post(
        &self,
        actor: &Actor,
        slug: &str,
        patch: BlogPostPatch,
        cover: Option<Upload>,
    ) -> AppResult<BlogPostResponse>;

    async fn delete_post(&self, actor: &Actor, slug: &str) -> AppResult<()>;

    /// Statistics in display order
    async fn list_statistics(&self, filter: StatisticFilter) -> AppResult<Vec<MarketStatistic>>;

    async fn get_statistic(&self, id: Uuid) -> AppResult<MarketStatistic>;

    async fn create_statistic(&self, actor: &Actor, draft: MarketStatisticDraft) -> AppResult<MarketStatistic>;

    async fn update_statistic(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: MarketStatisticPatch,
    ) -> AppResult<MarketStatistic>;

    async fn delete_statistic(&self, actor: &Actor, id: Uuid) -> AppResult<()>;
}

pub struct InsightManager<U: UnitOfWork> {
    uow: Arc<U>,
    blobs: Arc<dyn BlobStore>,
}

impl<U: UnitOfWork> InsightManager<U> {
    pub fn new(uow: Arc<U>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { uow, blobs }
    }

    async fn store_cover(&self, cover: Option<&Upload>, destination: &str) -> AppResult<Option<String>> {
        match cover {
            Some(upload) => Ok(Some(self.blobs.store(upload, destination).await?)),
            None => Ok(None),
        }
    }

    async fn report_responses(&self, reports: Vec<MarketReport>) -> AppResult<Vec<MarketReportResponse>> {
        let ctx = self.uow.reader();
        let ids: Vec<Uuid> = reports.iter().map(|r| r.author_id).collect();
        let authors = authors(&ctx, &ids).await?;
        reports
            .into_iter()
            .map(|report| {
                let author = author_of(&authors, report.author_id)?;
                Ok(MarketReportResponse::new(report, author))
            })
            .collect()
    }

    async fn report_response(&self, report: MarketReport) -> AppResult<MarketReportResponse> {
        self.report_responses(vec![report])
            .await?
            .pop()
            .ok_or(AppError::NotFound)
    }

    async fn trend_response(&self, trend: MarketTrend) -> AppResult<MarketTrendResponse> {
        let names = self.uow.reader().areas().names_by_ids(&[trend.area_id]).await?;
        let area_name = names.get(&trend.area_id).cloned().unwrap_or_default();
        Ok(MarketTrendResponse::new(trend, area_name))
    }

    async fn post_responses(&self, posts: Vec<BlogPost>) -> AppResult<Vec<BlogPostResponse>> {
        let ctx = self.uow.reader();
        let ids: Vec<Uuid> = posts.iter().map(|p| p.author_id).collect();
        let authors = authors(&ctx, &ids).await?;
        posts
            .into_iter()
            .map(|post| {
                let author = author_of(&authors, post.author_id)?;
                Ok(BlogPostResponse::new(post, author))
            })
            .collect()
    }

    async fn post_response(&self, post: BlogPost) -> AppResult<BlogPostResponse> {
        self.post_responses(vec![post])
            .await?
            .pop()
            .ok_or(AppError::NotFound)
    }

    async fn find_report(&self, slug: &str) -> AppResult<MarketReport> {
        self.uow
            .reader()
            .insights()
            .report_by_slug(slug)
            .await?
            .ok_or_not_found()
    }

    async fn find_post(&self, slug: &str) -> AppResult<BlogPost> {
        self.uow
            .reader()
            .insights()
            .post_by_slug(slug)
            .await?
            .ok_or_not_found()
    }

    async fn check_area(&self, area_id: Uuid) -> AppResult<()> {
        if self.uow.reader().areas().exists(area_id).await? {
            Ok(())
        } else {
            Err(AppError::invalid_field("area_id", "Area does not exist"))
        }
    }
}

fn slug_conflict(what: &'static str) -> impl Fn(AppError) -> AppError {
    move |err| match err {
        AppError::Conflict(_) => AppError::conflict(what),
        other => other,
    }
}

#[async_trait]
impl<U: UnitOfWork> InsightService for InsightManager<U> {
    // =========================================================================
    // Reports
    // =========================================================================

    async fn list_reports(
        &self,
        filter: ReportFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<MarketReportResponse>> {
        let (reports, total) = self
            .uow
            .reader()
            .insights()
            .list_reports(&filter, &params)
            .await?;
        let data = self.report_responses(reports).await?;
        Ok(Paginated::new(data, &params, total))
    }

    async fn get_report(&self, slug: &str) -> AppResult<MarketReportResponse> {
        let report = self.find_report(slug).await?;
        self.report_response(report).await
    }

    async fn create_report(
        &self,
        actor: &Actor,
        draft: MarketReportDraft,
        cover: Option<Upload>,
    ) -> AppResult<MarketReportResponse> {
        authorize(actor, Action::Write, &Target::MarketReport)?;
        let author_id = actor.require_user()?.user_id;
        draft.check()?;

        let slug = resolve_slug(draft.slug.as_deref(), &draft.title);
        let cover_url = self.store_cover(cover.as_ref(), UPLOAD_REPORT_COVERS).await?;

        let report = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    tx.insights()
                        .insert_report(&draft, slug, author_id, cover_url)
                        .await
                })
            })
            .await
            .map_err(slug_conflict("Market report with this slug"))?;

        tracing::info!(report_id = %report.id, slug = %report.slug, "Market report created");
        self.report_response(report).await
    }

    async fn update_report(
        &self,
        actor: &Actor,
        slug: &str,
        patch: MarketReportPatch,
        cover: Option<Upload>,
    ) -> AppResult<MarketReportResponse> {
        authorize(actor, Action::Write, &Target::MarketReport)?;
        patch.check()?;
        let id = self.find_report(slug).await?.id;

        let cover_url = self.store_cover(cover.as_ref(), UPLOAD_REPORT_COVERS).await?;

        let report = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move { tx.insights().update_report(id, &patch, cover_url).await })
            })
            .await
            .map_err(slug_conflict("Market report with this slug"))?;

        tracing::info!(report_id = %id, "Market report updated");
        self.report_response(report).await
    }

    async fn delete_report(&self, actor: &Actor, slug: &str) -> AppResult<()> {
        authorize(actor, Action::Write, &Target::MarketReport)?;
        let id = self.find_report(slug).await?.id;

        let deleted = self
            .uow
            .transaction(move |tx| Box::pin(async move { tx.insights().delete_report(id).await }))
            .await?;

        if !deleted {
            return Err(AppError::NotFound);
        }
        tracing::info!(report_id = %id, "Market report deleted");
        Ok(())
    }

    // =========================================================================
    // Trends
    // =========================================================================

    async fn list_trends(
        &self,
        filter: TrendFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<MarketTrendResponse>> {
        let ctx = self.uow.reader();
        let (trends, total) = ctx.insights().list_trends(&filter, &params).await?;

        let area_ids: Vec<Uuid> = trends.iter().map(|t| t.area_id).collect();
        let names = ctx.areas().names_by_ids(&area_ids).await?;
        let data = trends
            .into_iter()
            .map(|trend| {
                let area_name = names.get(&trend.area_id).cloned().unwrap_or_default();
                MarketTrendResponse::new(trend, area_name)
            })
            .collect();
        Ok(Paginated::new(data, &params, total))
    }

    async fn get_trend(&self, id: Uuid) -> AppResult<MarketTrendResponse> {
        let trend = self
            .uow
            .reader()
            .insights()
            .find_trend(id)
            .await?
            .ok_or_not_found()?;
        self.trend_response(trend).await
    }

    async fn create_trend(&self, actor: &Actor, draft: MarketTrendDraft) -> AppResult<MarketTrendResponse> {
        authorize(actor, Action::Write, &Target::MarketTrend)?;
        draft.check()?;
        self.check_area(draft.area_id).await?;

        let trend = self
            .uow
            .transaction(move |tx| Box::pin(async move { tx.insights().insert_trend(&draft).await }))
            .await?;

        tracing::info!(
            trend_id = %trend.id,
            area_id = %trend.area_id,
            period = %trend.period,
            "Market trend created"
        );
        self.trend_response(trend).await
    }

    async fn update_trend(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: MarketTrendPatch,
    ) -> AppResult<MarketTrendResponse> {
        authorize(actor, Action::Write, &Target::MarketTrend)?;
        patch.check()?;
        if let Some(area_id) = patch.area_id {
            self.check_area(area_id).await?;
        }

        let trend = self
            .uow
            .transaction(move |tx| Box::pin(async move { tx.insights().update_trend(id, &patch).await }))
            .await?;

        tracing::info!(trend_id = %id, "Market trend updated");
        self.trend_response(trend).await
    }

    async fn delete_trend(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        authorize(actor, Action::Write, &Target::MarketTrend)?;

        let deleted = self
            .uow
            .transaction(move |tx| Box::pin(async move { tx.insights().delete_trend(id).await }))
            .await?;

        if !deleted {
            return Err(AppError::NotFound);
        }
        tracing::info!(trend_id = %id, "Market trend deleted");
        Ok(())
    }

    // =========================================================================
    // Blog
    // =========================================================================

    async fn list_posts(
        &self,
        actor: &Actor,
        filter: BlogFilter,
        params: PaginationParams,
    ) -> AppResult<Paginated<BlogPostResponse>> {
        let scope = blog_scope(actor);
        let (posts, total) = self
            .uow
            .reader()
            .insights()
            .list_posts(scope, &filter, &params)
            .await?;
        let data = self.post_responses(posts).await?;
        Ok(Paginated::new(data, &params, total))
    }

    async fn get_post(&self, actor: &Actor, slug: &str) -> AppResult<BlogPostResponse> {
        let post = self.find_post(slug).await?;
        let target = Target::BlogPost {
            author_id: post.author_id,
            published: post.is_published,
        };
        // Hidden drafts look absent.
        authorize(actor, Action::Read, &target).map_err(|_| AppError::NotFound)?;
        self.post_response(post).await
    }

    async fn create_post(
        &self,
        actor: &Actor,
        draft: BlogPostDraft,
        cover: Option<Upload>,
    ) -> AppResult<BlogPostResponse> {
        authorize(actor, Action::Write, &Target::NewBlogPost)?;
        let author_id = actor.require_user()?.user_id;
        draft.check()?;

        let slug = resolve_slug(draft.slug.as_deref(), &draft.title);
        let cover_url = self.store_cover(cover.as_ref(), UPLOAD_BLOG_COVERS).await?;

        let post = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    tx.insights()
                        .insert_post(&draft, slug, author_id, cover_url)
                        .await
                })
            })
            .await
            .map_err(slug_conflict("Blog post with this slug"))?;

        tracing::info!(post_id = %post.id, slug = %post.slug, published = post.is_published, "Blog post created");
        self.post_response(post).await
    }

    async fn update_post(
        &self,
        actor: &Actor,
        slug: &str,
        patch: BlogPostPatch,
        cover: Option<Upload>,
    ) -> AppResult<BlogPostResponse> {
        let existing = self.find_post(slug).await?;
        authorize(
            actor,
            Action::Write,
            &Target::BlogPost {
                author_id: existing.author_id,
                published: existing.is_published,
            },
        )?;
        patch.check()?;
        let id = existing.id;

        let cover_url = self.store_cover(cover.as_ref(), UPLOAD_BLOG_COVERS).await?;

        let post = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move { tx.insights().update_post(id, &patch, cover_url).await })
            })
            .await
            .map_err(slug_conflict("Blog post with this slug"))?;

        tracing::info!(post_id = %id, "Blog post updated");
        self.post_response(post).await
    }

    async fn delete_post(&self, actor: &Actor, slug: &str) -> AppResult<()> {
        let existing = self.find_post(slug).await?;
        authorize(
            actor,
            Action::Write,
            &Target::BlogPost {
                author_id: existing.author_id,
                published: existing.is_published,
            },
        )?;
        let id = existing.id;

        let deleted = self
            .uow
            .transaction(move |tx| Box::pin(async move { tx.insights().delete_post(id).await }))
            .await?;

        if !deleted {
            return Err(AppError::NotFound);
        }
        tracing::info!(post_id = %id, "Blog post deleted");
        Ok(())
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    async fn list_statistics(&self, filter: StatisticFilter) -> AppResult<Vec<MarketStatistic>> {
        self.uow.reader().insights().list_statistics(&filter).await
    }

    async fn get_statistic(&self, id: Uuid) -> AppResult<MarketStatistic> {
        self.uow
            .reader()
            .insights()
            .find_statistic(id)
            .await?
            .ok_or_not_found()
    }

    async fn create_statistic(&self, actor: &Actor, draft: MarketStatisticDraft) -> AppResult<MarketStatistic> {
        authorize(actor, Action::Write, &Target::MarketStatistic)?;
        draft.validate()?;

        let statistic = self
            .uow
            .transaction(move |tx| Box::pin(async move { tx.insights().insert_statistic(&draft).await }))
            .await?;

        tracing::info!(statistic_id = %statistic.id, name = %statistic.name, "Market statistic created");
        Ok(statistic)
    }

    async fn update_statistic(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: MarketStatisticPatch,
    ) -> AppResult<MarketStatistic> {
        authorize(actor, Action::Write, &Target::MarketStatistic)?;
        patch.validate()?;

        let statistic = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move { tx.insights().update_statistic(id, &patch).await })
            })
            .await?;

        tracing::info!(statistic_id = %id, "Market statistic updated");
        Ok(statistic)
    }

    async fn delete_statistic(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        authorize(actor, Action::Write, &Target::MarketStatistic)?;

        let deleted = self
            .uow
            .transaction(move |tx| Box::pin(async move { tx.insights().delete_statistic(id).await }))
            .await?;

        if !deleted {
            return Err(AppError::NotFound);
        }
        tracing::info!(statistic_id = %id, "Market statistic deleted");
        Ok(())
    }
}
