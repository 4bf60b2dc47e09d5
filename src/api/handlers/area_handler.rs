//! Area handlers.
//!
//! Writes accept JSON, or multipart with the fields in a `data` part,
//! `images` parts and an optional `cover` part.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::api::extractors::CompositeForm;
use crate::api::middleware::CurrentActor;
use crate::api::AppState;
use crate::domain::{AreaDetail, AreaDraft, AreaFilter, AreaPatch, AreaStats, AreaSummary};
use crate::errors::AppResult;
use crate::types::{Created, NoContent, Paginated, PaginationParams};

pub fn area_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_areas).post(create_area))
        .route("/featured", get(featured_areas))
        .route(
            "/:id",
            get(get_area).put(update_area).patch(update_area).delete(delete_area),
        )
        .route("/:id/update_stats", post(update_area_stats))
}

#[utoipa::path(
    get,
    path = "/api/areas",
    tag = "Areas",
    params(AreaFilter, PaginationParams),
    responses(
        (status = 200, description = "Areas", body = AreaPage),
        (status = 400, description = "Unknown ordering field")
    )
)]
pub async fn list_areas(
    State(state): State<AppState>,
    Query(filter): Query<AreaFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<AreaSummary>>> {
    let page = state.services.areas().list(filter, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/areas/featured",
    tag = "Areas",
    responses((status = 200, description = "Featured areas", body = Vec<AreaSummary>))
)]
pub async fn featured_areas(State(state): State<AppState>) -> AppResult<Json<Vec<AreaSummary>>> {
    let areas = state.services.areas().featured().await?;
    Ok(Json(areas))
}

#[utoipa::path(
    get,
    path = "/api/areas/{id}",
    tag = "Areas",
    params(("id" = Uuid, Path, description = "Area ID")),
    responses(
        (status = 200, description = "Area with images, perks and guide", body = AreaDetail),
        (status = 404, description = "Area not found")
    )
)]
pub async fn get_area(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<AreaDetail>> {
    let area = state.services.areas().get(id).await?;
    Ok(Json(area))
}

/// Create an area together with its images, perks and guide
#[utoipa::path(
    post,
    path = "/api/areas",
    tag = "Areas",
    security(("bearer_auth" = [])),
    request_body = AreaDraft,
    responses(
        (status = 201, description = "Area created", body = AreaDetail),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only")
    )
)]
pub async fn create_area(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    form: CompositeForm<AreaDraft>,
) -> AppResult<Created<AreaDetail>> {
    let area = state
        .services
        .areas()
        .create(&actor, form.data, form.images, form.cover)
        .await?;
    Ok(Created(area))
}

#[utoipa::path(
    put,
    path = "/api/areas/{id}",
    tag = "Areas",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Area ID")),
    request_body = AreaPatch,
    responses(
        (status = 200, description = "Area updated", body = AreaDetail),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Area not found")
    )
)]
pub async fn update_area(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    form: CompositeForm<AreaPatch>,
) -> AppResult<Json<AreaDetail>> {
    let area = state
        .services
        .areas()
        .update(&actor, id, form.data, form.images, form.cover)
        .await?;
    Ok(Json(area))
}

#[utoipa::path(
    delete,
    path = "/api/areas/{id}",
    tag = "Areas",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Area ID")),
    responses(
        (status = 204, description = "Area deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Area not found")
    )
)]
pub async fn delete_area(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.services.areas().delete(&actor, id).await?;
    Ok(NoContent)
}

/// Recompute property count and average price
#[utoipa::path(
    post,
    path = "/api/areas/{id}/update_stats",
    tag = "Areas",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Area ID")),
    responses(
        (status = 200, description = "Fresh stats", body = AreaStats),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Area not found")
    )
)]
pub async fn update_area_stats(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AreaStats>> {
    let stats = state.services.areas().update_stats(&actor, id).await?;
    Ok(Json(stats))
}
