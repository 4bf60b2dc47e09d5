//! Account handlers: roles, profiles and agent profiles.

use axum::{
    extract::{Path, Query, State},
    middleware,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_auth, CurrentActor};
use crate::api::AppState;
use crate::domain::{AgentDraft, AgentPatch, AgentResponse, AgentStats, ProfileUpdate, Role, UserResponse};
use crate::errors::AppResult;
use crate::types::{Created, NoContent, Paginated, PaginationParams};

/// Role to grant to an account
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleGrant {
    pub role: Role,
}

/// Create account routes
pub fn user_routes() -> Router<AppState> {
    let signed_in = Router::new()
        .route("/roles", get(current_roles))
        .route("/profiles", get(list_profiles))
        .route("/profiles/:id", get(get_profile).put(update_profile).patch(update_profile))
        .route("/profiles/:id/roles", post(grant_role))
        .route("/profiles/:id/roles/:role", delete(revoke_role))
        .route_layer(middleware::from_fn(require_auth));

    let agents = Router::new()
        .route("/agents", get(list_agents).post(create_agent))
        .route(
            "/agents/:id",
            get(get_agent).put(update_agent).patch(update_agent).delete(delete_agent),
        )
        .route("/agents/:id/update_stats", post(update_agent_stats));

    signed_in.merge(agents)
}

/// Roles held by the current account
#[utoipa::path(
    get,
    path = "/api/users/roles",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current roles", body = Vec<Role>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn current_roles(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> AppResult<Json<Vec<Role>>> {
    let roles = state.services.users().current_roles(&actor).await?;
    Ok(Json(roles))
}

/// List profiles; staff see every account, others only their own
#[utoipa::path(
    get,
    path = "/api/users/profiles",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "Profiles", body = UserPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_profiles(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    let page = state.services.users().list_profiles(&actor, params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/users/profiles/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users().get_profile(&actor, id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/api/users/profiles/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ProfileUpdate>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users().update_profile(&actor, id, payload).await?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/users/profiles/{id}/roles",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = RoleGrant,
    responses(
        (status = 200, description = "Role granted", body = UserResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn grant_role(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoleGrant>,
) -> AppResult<Json<UserResponse>> {
    let user = state.services.users().grant_role(&actor, id, payload.role).await?;
    Ok(Json(user))
}

#[utoipa::path(
    delete,
    path = "/api/users/profiles/{id}/roles/{role}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("role" = String, Path, description = "Role name")
    ),
    responses(
        (status = 200, description = "Role revoked", body = UserResponse),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn revoke_role(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path((id, role)): Path<(Uuid, String)>,
) -> AppResult<Json<UserResponse>> {
    let role: Role = role.parse()?;
    let user = state.services.users().revoke_role(&actor, id, role).await?;
    Ok(Json(user))
}

/// Agents ordered by sales volume
#[utoipa::path(
    get,
    path = "/api/users/agents",
    tag = "Agents",
    params(PaginationParams),
    responses((status = 200, description = "Agents", body = AgentPage))
)]
pub async fn list_agents(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<AgentResponse>>> {
    let page = state.services.agents().list(params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/users/agents/{id}",
    tag = "Agents",
    params(("id" = Uuid, Path, description = "Agent ID")),
    responses(
        (status = 200, description = "Agent", body = AgentResponse),
        (status = 404, description = "Agent not found")
    )
)]
pub async fn get_agent(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<AgentResponse>> {
    let agent = state.services.agents().get(id).await?;
    Ok(Json(agent))
}

#[utoipa::path(
    post,
    path = "/api/users/agents",
    tag = "Agents",
    security(("bearer_auth" = [])),
    request_body = AgentDraft,
    responses(
        (status = 201, description = "Agent profile created", body = AgentResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "User already has an agent profile")
    )
)]
pub async fn create_agent(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    ValidatedJson(payload): ValidatedJson<AgentDraft>,
) -> AppResult<Created<AgentResponse>> {
    let agent = state.services.agents().create(&actor, payload).await?;
    Ok(Created(agent))
}

#[utoipa::path(
    put,
    path = "/api/users/agents/{id}",
    tag = "Agents",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Agent ID")),
    request_body = AgentPatch,
    responses(
        (status = 200, description = "Agent profile updated", body = AgentResponse),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Agent not found")
    )
)]
pub async fn update_agent(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AgentPatch>,
) -> AppResult<Json<AgentResponse>> {
    let agent = state.services.agents().update(&actor, id, payload).await?;
    Ok(Json(agent))
}

#[utoipa::path(
    delete,
    path = "/api/users/agents/{id}",
    tag = "Agents",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Agent ID")),
    responses(
        (status = 204, description = "Agent profile deleted"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Agent not found")
    )
)]
pub async fn delete_agent(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.services.agents().delete(&actor, id).await?;
    Ok(NoContent)
}

/// Recompute listings count and sales volume
#[utoipa::path(
    post,
    path = "/api/users/agents/{id}/update_stats",
    tag = "Agents",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Agent ID")),
    responses(
        (status = 200, description = "Fresh stats", body = AgentStats),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Agent not found")
    )
)]
pub async fn update_agent_stats(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AgentStats>> {
    let stats = state.services.agents().update_stats(&actor, id).await?;
    Ok(Json(stats))
}
