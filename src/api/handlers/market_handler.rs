//! Market insight handlers: reports, trends, blog posts and statistics.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::api::extractors::{CompositeForm, ValidatedJson};
use crate::api::middleware::CurrentActor;
use crate::api::AppState;
use crate::domain::{
    BlogFilter, BlogPostDraft, BlogPostPatch, BlogPostResponse, MarketReportDraft,
    MarketReportPatch, MarketReportResponse, MarketStatistic, MarketStatisticDraft,
    MarketStatisticPatch, MarketTrendDraft, MarketTrendPatch, MarketTrendResponse, ReportFilter,
    StatisticFilter, TrendFilter,
};
use crate::errors::AppResult;
use crate::types::{Created, NoContent, Paginated, PaginationParams};

pub fn market_routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports).post(create_report))
        .route(
            "/reports/:slug",
            get(get_report).put(update_report).patch(update_report).delete(delete_report),
        )
        .route("/trends", get(list_trends).post(create_trend))
        .route(
            "/trends/:id",
            get(get_trend).put(update_trend).patch(update_trend).delete(delete_trend),
        )
        .route("/blog", get(list_posts).post(create_post))
        .route(
            "/blog/:slug",
            get(get_post).put(update_post).patch(update_post).delete(delete_post),
        )
        .route("/statistics", get(list_statistics).post(create_statistic))
        .route(
            "/statistics/:id",
            get(get_statistic)
                .put(update_statistic)
                .patch(update_statistic)
                .delete(delete_statistic),
        )
}

// =============================================================================
// Reports
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/market/reports",
    tag = "Market",
    params(ReportFilter, PaginationParams),
    responses((status = 200, description = "Reports, most recently published first", body = ReportPage))
)]
pub async fn list_reports(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<MarketReportResponse>>> {
    let page = state.services.insights().list_reports(filter, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/market/reports/{slug}",
    tag = "Market",
    params(("slug" = String, Path, description = "Report slug")),
    responses(
        (status = 200, description = "Report", body = MarketReportResponse),
        (status = 404, description = "Report not found")
    )
)]
pub async fn get_report(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<MarketReportResponse>> {
    let report = state.services.insights().get_report(&slug).await?;
    Ok(Json(report))
}

/// Publish a report; accepts an optional `cover` upload
#[utoipa::path(
    post,
    path = "/api/market/reports",
    tag = "Market",
    security(("bearer_auth" = [])),
    request_body = MarketReportDraft,
    responses(
        (status = 201, description = "Report created", body = MarketReportResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn create_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    form: CompositeForm<MarketReportDraft>,
) -> AppResult<Created<MarketReportResponse>> {
    let report = state
        .services
        .insights()
        .create_report(&actor, form.data, form.cover)
        .await?;
    Ok(Created(report))
}

#[utoipa::path(
    put,
    path = "/api/market/reports/{slug}",
    tag = "Market",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Report slug")),
    request_body = MarketReportPatch,
    responses(
        (status = 200, description = "Report updated", body = MarketReportResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn update_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(slug): Path<String>,
    form: CompositeForm<MarketReportPatch>,
) -> AppResult<Json<MarketReportResponse>> {
    let report = state
        .services
        .insights()
        .update_report(&actor, &slug, form.data, form.cover)
        .await?;
    Ok(Json(report))
}

#[utoipa::path(
    delete,
    path = "/api/market/reports/{slug}",
    tag = "Market",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Report slug")),
    responses(
        (status = 204, description = "Report deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Report not found")
    )
)]
pub async fn delete_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(slug): Path<String>,
) -> AppResult<NoContent> {
    state.services.insights().delete_report(&actor, &slug).await?;
    Ok(NoContent)
}

// =============================================================================
// Trends
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/market/trends",
    tag = "Market",
    params(TrendFilter, PaginationParams),
    responses((status = 200, description = "Trends, latest period first", body = TrendPage))
)]
pub async fn list_trends(
    State(state): State<AppState>,
    Query(filter): Query<TrendFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<MarketTrendResponse>>> {
    let page = state.services.insights().list_trends(filter, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/market/trends/{id}",
    tag = "Market",
    params(("id" = Uuid, Path, description = "Trend ID")),
    responses(
        (status = 200, description = "Trend", body = MarketTrendResponse),
        (status = 404, description = "Trend not found")
    )
)]
pub async fn get_trend(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<MarketTrendResponse>> {
    let trend = state.services.insights().get_trend(id).await?;
    Ok(Json(trend))
}

#[utoipa::path(
    post,
    path = "/api/market/trends",
    tag = "Market",
    security(("bearer_auth" = [])),
    request_body = MarketTrendDraft,
    responses(
        (status = 201, description = "Trend created", body = MarketTrendResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Trend for this area, type and period exists")
    )
)]
pub async fn create_trend(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidatedJson(payload): ValidatedJson<MarketTrendDraft>,
) -> AppResult<Created<MarketTrendResponse>> {
    let trend = state.services.insights().create_trend(&actor, payload).await?;
    Ok(Created(trend))
}

#[utoipa::path(
    put,
    path = "/api/market/trends/{id}",
    tag = "Market",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Trend ID")),
    request_body = MarketTrendPatch,
    responses(
        (status = 200, description = "Trend updated", body = MarketTrendResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Trend not found"),
        (status = 409, description = "Trend for this area, type and period exists")
    )
)]
pub async fn update_trend(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<MarketTrendPatch>,
) -> AppResult<Json<MarketTrendResponse>> {
    let trend = state.services.insights().update_trend(&actor, id, payload).await?;
    Ok(Json(trend))
}

#[utoipa::path(
    delete,
    path = "/api/market/trends/{id}",
    tag = "Market",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Trend ID")),
    responses(
        (status = 204, description = "Trend deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Trend not found")
    )
)]
pub async fn delete_trend(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.services.insights().delete_trend(&actor, id).await?;
    Ok(NoContent)
}

// =============================================================================
// Blog
// =============================================================================

/// Published posts; admins also see drafts
#[utoipa::path(
    get,
    path = "/api/market/blog",
    tag = "Blog",
    params(BlogFilter, PaginationParams),
    responses((status = 200, description = "Posts, newest first", body = BlogPage))
)]
pub async fn list_posts(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(filter): Query<BlogFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<BlogPostResponse>>> {
    let page = state.services.insights().list_posts(&actor, filter, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/market/blog/{slug}",
    tag = "Blog",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post", body = BlogPostResponse),
        (status = 404, description = "Post not found or not visible")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(slug): Path<String>,
) -> AppResult<Json<BlogPostResponse>> {
    let post = state.services.insights().get_post(&actor, &slug).await?;
    Ok(Json(post))
}

/// Write a post as the current user; accepts an optional `cover` upload
#[utoipa::path(
    post,
    path = "/api/market/blog",
    tag = "Blog",
    security(("bearer_auth" = [])),
    request_body = BlogPostDraft,
    responses(
        (status = 201, description = "Post created", body = BlogPostResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Sign in to write posts"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    form: CompositeForm<BlogPostDraft>,
) -> AppResult<Created<BlogPostResponse>> {
    let post = state
        .services
        .insights()
        .create_post(&actor, form.data, form.cover)
        .await?;
    Ok(Created(post))
}

#[utoipa::path(
    put,
    path = "/api/market/blog/{slug}",
    tag = "Blog",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Post slug")),
    request_body = BlogPostPatch,
    responses(
        (status = 200, description = "Post updated", body = BlogPostResponse),
        (status = 403, description = "Author or admin only"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(slug): Path<String>,
    form: CompositeForm<BlogPostPatch>,
) -> AppResult<Json<BlogPostResponse>> {
    let post = state
        .services
        .insights()
        .update_post(&actor, &slug, form.data, form.cover)
        .await?;
    Ok(Json(post))
}

#[utoipa::path(
    delete,
    path = "/api/market/blog/{slug}",
    tag = "Blog",
    security(("bearer_auth" = [])),
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 403, description = "Author or admin only"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(slug): Path<String>,
) -> AppResult<NoContent> {
    state.services.insights().delete_post(&actor, &slug).await?;
    Ok(NoContent)
}

// =============================================================================
// Statistics
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/market/statistics",
    tag = "Market",
    params(StatisticFilter),
    responses((status = 200, description = "Statistics in display order", body = Vec<MarketStatistic>))
)]
pub async fn list_statistics(
    State(state): State<AppState>,
    Query(filter): Query<StatisticFilter>,
) -> AppResult<Json<Vec<MarketStatistic>>> {
    let statistics = state.services.insights().list_statistics(filter).await?;
    Ok(Json(statistics))
}

#[utoipa::path(
    get,
    path = "/api/market/statistics/{id}",
    tag = "Market",
    params(("id" = Uuid, Path, description = "Statistic ID")),
    responses(
        (status = 200, description = "Statistic", body = MarketStatistic),
        (status = 404, description = "Statistic not found")
    )
)]
pub async fn get_statistic(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<MarketStatistic>> {
    let statistic = state.services.insights().get_statistic(id).await?;
    Ok(Json(statistic))
}

#[utoipa::path(
    post,
    path = "/api/market/statistics",
    tag = "Market",
    security(("bearer_auth" = [])),
    request_body = MarketStatisticDraft,
    responses(
        (status = 201, description = "Statistic created", body = MarketStatistic),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn create_statistic(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidatedJson(payload): ValidatedJson<MarketStatisticDraft>,
) -> AppResult<Created<MarketStatistic>> {
    let statistic = state.services.insights().create_statistic(&actor, payload).await?;
    Ok(Created(statistic))
}

#[utoipa::path(
    put,
    path = "/api/market/statistics/{id}",
    tag = "Market",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Statistic ID")),
    request_body = MarketStatisticPatch,
    responses(
        (status = 200, description = "Statistic updated", body = MarketStatistic),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Statistic not found")
    )
)]
pub async fn update_statistic(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<MarketStatisticPatch>,
) -> AppResult<Json<MarketStatistic>> {
    let statistic = state
        .services
        .insights()
        .update_statistic(&actor, id, payload)
        .await?;
    Ok(Json(statistic))
}

#[utoipa::path(
    delete,
    path = "/api/market/statistics/{id}",
    tag = "Market",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Statistic ID")),
    responses(
        (status = 204, description = "Statistic deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Statistic not found")
    )
)]
pub async fn delete_statistic(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.services.insights().delete_statistic(&actor, id).await?;
    Ok(NoContent)
}
