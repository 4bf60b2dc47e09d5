//! Property handlers, including images, features, favorites and inquiries.

use axum::{
    extract::{Path, Query, State},
    middleware,
    response::Json,
    routing::{delete, get, patch, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::extractors::{CompositeForm, ValidatedJson};
use crate::api::middleware::{require_auth, CurrentActor, SignedIn};
use crate::api::AppState;
use crate::domain::{
    Feature, FavoriteResponse, FavoriteToggle, Image, InquiryResponse, InquiryUpdate, NewFavorite,
    NewInquiry, PropertyDetail, PropertyDraft, PropertyFilter, PropertyPatch, PropertySummary,
};
use crate::errors::AppResult;
use crate::types::{Created, NoContent, Paginated, PaginationParams};

/// Options sent along with an image upload
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ImageBatch {
    /// Make the first uploaded image the primary one
    #[serde(default)]
    pub is_primary: bool,
}

/// Primary flag change for one image
#[derive(Debug, Deserialize, ToSchema)]
pub struct ImageUpdate {
    pub is_primary: bool,
}

pub fn property_routes() -> Router<AppState> {
    let signed_in = Router::new()
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/:id", delete(remove_favorite))
        .route("/:id/toggle_favorite", post(toggle_favorite))
        .route_layer(middleware::from_fn(require_auth));

    let open = Router::new()
        .route("/", get(list_properties).post(create_property))
        .route("/features", get(list_features))
        .route("/inquiries", get(list_inquiries).post(create_inquiry))
        .route("/inquiries/:id", patch(update_inquiry).delete(delete_inquiry))
        .route("/images/:id", patch(update_image).delete(delete_image))
        .route(
            "/:id",
            get(get_property)
                .put(update_property)
                .patch(update_property)
                .delete(delete_property),
        )
        .route("/:id/add_images", post(add_images));

    signed_in.merge(open)
}

// =============================================================================
// Properties
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/properties",
    tag = "Properties",
    params(PropertyFilter, PaginationParams),
    responses(
        (status = 200, description = "Properties, newest first unless ordered", body = PropertyPage),
        (status = 400, description = "Unknown ordering field")
    )
)]
pub async fn list_properties(
    State(state): State<AppState>,
    Query(filter): Query<PropertyFilter>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<PropertySummary>>> {
    let page = state.services.properties().list(filter, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    tag = "Properties",
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Property with images, features and agent", body = PropertyDetail),
        (status = 404, description = "Property not found")
    )
)]
pub async fn get_property(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PropertyDetail>> {
    let property = state.services.properties().get(&actor, id).await?;
    Ok(Json(property))
}

/// Create a property together with its images and features
#[utoipa::path(
    post,
    path = "/api/properties",
    tag = "Properties",
    security(("bearer_auth" = [])),
    request_body = PropertyDraft,
    responses(
        (status = 201, description = "Property created", body = PropertyDetail),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Agents and admins only")
    )
)]
pub async fn create_property(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    form: CompositeForm<PropertyDraft>,
) -> AppResult<Created<PropertyDetail>> {
    let property = state
        .services
        .properties()
        .create(&actor, form.data, form.images)
        .await?;
    Ok(Created(property))
}

#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    tag = "Properties",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Property ID")),
    request_body = PropertyPatch,
    responses(
        (status = 200, description = "Property updated", body = PropertyDetail),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Agents and admins only"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn update_property(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    form: CompositeForm<PropertyPatch>,
) -> AppResult<Json<PropertyDetail>> {
    let property = state
        .services
        .properties()
        .update(&actor, id, form.data, form.images)
        .await?;
    Ok(Json(property))
}

#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    tag = "Properties",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 204, description = "Property deleted"),
        (status = 403, description = "Agents and admins only"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn delete_property(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.services.properties().delete(&actor, id).await?;
    Ok(NoContent)
}

// =============================================================================
// Images and features
// =============================================================================

/// Upload images to a property; admins or the assigned agent only
#[utoipa::path(
    post,
    path = "/api/properties/{id}/add_images",
    tag = "Properties",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Property ID")),
    request_body(content = ImageBatch, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Images added", body = Vec<Image>),
        (status = 400, description = "No images provided"),
        (status = 403, description = "Not the assigned agent"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn add_images(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    form: CompositeForm<ImageBatch>,
) -> AppResult<Created<Vec<Image>>> {
    let is_primary = form.data.is_primary || form.flag("is_primary");
    let images = state
        .services
        .properties()
        .add_images(&actor, id, form.images, is_primary)
        .await?;
    Ok(Created(images))
}

#[utoipa::path(
    patch,
    path = "/api/properties/images/{id}",
    tag = "Properties",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Image ID")),
    request_body = ImageUpdate,
    responses(
        (status = 200, description = "Image updated", body = Image),
        (status = 403, description = "Agents and admins only"),
        (status = 404, description = "Image not found")
    )
)]
pub async fn update_image(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<ImageUpdate>,
) -> AppResult<Json<Image>> {
    let image = state
        .services
        .properties()
        .update_image(&actor, id, payload.is_primary)
        .await?;
    Ok(Json(image))
}

#[utoipa::path(
    delete,
    path = "/api/properties/images/{id}",
    tag = "Properties",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 403, description = "Agents and admins only"),
        (status = 404, description = "Image not found")
    )
)]
pub async fn delete_image(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.services.properties().delete_image(&actor, id).await?;
    Ok(NoContent)
}

#[utoipa::path(
    get,
    path = "/api/properties/features",
    tag = "Properties",
    responses((status = 200, description = "All features by name", body = Vec<Feature>))
)]
pub async fn list_features(State(state): State<AppState>) -> AppResult<Json<Vec<Feature>>> {
    let features = state.services.properties().features().await?;
    Ok(Json(features))
}

// =============================================================================
// Favorites
// =============================================================================

/// Add the property to the caller's favorites, or remove it when present
#[utoipa::path(
    post,
    path = "/api/properties/{id}/toggle_favorite",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Property ID")),
    responses(
        (status = 200, description = "Outcome of the toggle", body = FavoriteToggle),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<FavoriteToggle>> {
    let outcome = state.services.favorites().toggle(&actor, id).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/api/properties/favorites",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "The caller's favorites", body = FavoritePage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<FavoriteResponse>>> {
    let page = state.services.favorites().list(&actor, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/properties/favorites",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    request_body = NewFavorite,
    responses(
        (status = 201, description = "Favorite stored", body = FavoriteResponse),
        (status = 400, description = "Unknown property"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn add_favorite(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<NewFavorite>,
) -> AppResult<Created<FavoriteResponse>> {
    let favorite = state.services.favorites().add(&actor, payload).await?;
    Ok(Created(favorite))
}

#[utoipa::path(
    delete,
    path = "/api/properties/favorites/{id}",
    tag = "Favorites",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Favorite ID")),
    responses(
        (status = 204, description = "Favorite removed"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Favorite not found")
    )
)]
pub async fn remove_favorite(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.services.favorites().remove(&actor, id).await?;
    Ok(NoContent)
}

// =============================================================================
// Inquiries
// =============================================================================

/// Inquiries visible to the caller
#[utoipa::path(
    get,
    path = "/api/properties/inquiries",
    tag = "Inquiries",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Inquiries, newest first", body = InquiryPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_inquiries(
    State(state): State<AppState>,
    SignedIn(actor): SignedIn,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<InquiryResponse>>> {
    let page = state.services.inquiries().list(&actor, params).await?;
    Ok(Json(page))
}

/// Send an inquiry; authentication is optional
#[utoipa::path(
    post,
    path = "/api/properties/inquiries",
    tag = "Inquiries",
    request_body = NewInquiry,
    responses(
        (status = 201, description = "Inquiry received", body = InquiryResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_inquiry(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidatedJson(payload): ValidatedJson<NewInquiry>,
) -> AppResult<Created<InquiryResponse>> {
    let inquiry = state.services.inquiries().create(&actor, payload).await?;
    Ok(Created(inquiry))
}

#[utoipa::path(
    patch,
    path = "/api/properties/inquiries/{id}",
    tag = "Inquiries",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Inquiry ID")),
    request_body = InquiryUpdate,
    responses(
        (status = 200, description = "Inquiry updated", body = InquiryResponse),
        (status = 403, description = "Admins or the property's agent only"),
        (status = 404, description = "Inquiry not found")
    )
)]
pub async fn update_inquiry(
    State(state): State<AppState>,
    SignedIn(actor): SignedIn,
    Path(id): Path<Uuid>,
    Json(payload): Json<InquiryUpdate>,
) -> AppResult<Json<InquiryResponse>> {
    let inquiry = state.services.inquiries().update(&actor, id, payload).await?;
    Ok(Json(inquiry))
}

#[utoipa::path(
    delete,
    path = "/api/properties/inquiries/{id}",
    tag = "Inquiries",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Inquiry ID")),
    responses(
        (status = 204, description = "Inquiry deleted"),
        (status = 403, description = "Admins or the property's agent only"),
        (status = 404, description = "Inquiry not found")
    )
)]
pub async fn delete_inquiry(
    State(state): State<AppState>,
    SignedIn(actor): SignedIn,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.services.inquiries().delete(&actor, id).await?;
    Ok(NoContent)
}
