//! Read-shape assembly.
//!
//! Each entity maps to a summary shape for lists and a detail shape for
//! single reads. These helpers load the children a shape needs in
//! batches, through whichever context the caller holds: the pool for
//! plain reads, the open transaction right after a composite write.
//! Independent child loads are issued together with `try_join!`.

use std::collections::HashMap;

use futures::try_join;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::domain::{
    Agent, AgentResponse, Area, AreaDetail, AreaSummary, AuthorSummary, Property,
    PropertyDetail, PropertySummary, User, UserResponse,
};
use crate::errors::{AppError, AppResult};
use crate::infra::Context;

pub(crate) async fn area_summaries<C: ConnectionTrait>(
    ctx: &Context<'_, C>,
    areas: Vec<Area>,
) -> AppResult<Vec<AreaSummary>> {
    let ids: Vec<Uuid> = areas.iter().map(|a| a.id).collect();
    let mut images = ctx.areas().images_for(&ids).await?;

    Ok(areas
        .into_iter()
        .map(|area| {
            let area_images = images.remove(&area.id).unwrap_or_default();
            AreaSummary::new(area, &area_images)
        })
        .collect())
}

pub(crate) async fn area_detail<C: ConnectionTrait>(
    ctx: &Context<'_, C>,
    area: Area,
) -> AppResult<AreaDetail> {
    let store = ctx.areas();
    let (images, perks, guide) =
        try_join!(store.images(area.id), store.perks(area.id), store.guide(area.id))?;
    Ok(AreaDetail::new(area, images, perks, guide))
}

pub(crate) async fn property_summaries<C: ConnectionTrait>(
    ctx: &Context<'_, C>,
    properties: Vec<Property>,
) -> AppResult<Vec<PropertySummary>> {
    let ids: Vec<Uuid> = properties.iter().map(|p| p.id).collect();
    let agent_ids: Vec<Uuid> = properties.iter().filter_map(|p| p.agent_id).collect();
    let area_ids: Vec<Uuid> = properties.iter().filter_map(|p| p.area_id).collect();

    let store = ctx.properties();
    let areas = ctx.areas();
    let (mut images, mut features, agent_names, area_names) = try_join!(
        store.images_for(&ids),
        store.feature_names_for(&ids),
        agent_names(ctx, &agent_ids),
        areas.names_by_ids(&area_ids),
    )?;

    Ok(properties
        .into_iter()
        .map(|property| {
            let property_images = images.remove(&property.id).unwrap_or_default();
            let property_features = features.remove(&property.id).unwrap_or_default();
            let agent_name = property.agent_id.and_then(|id| agent_names.get(&id).cloned());
            let area_name = property.area_id.and_then(|id| area_names.get(&id).cloned());
            PropertySummary::new(property, &property_images, agent_name, area_name, property_features)
        })
        .collect())
}

/// Detail of one property; `viewer` decides `is_favorited`.
pub(crate) async fn property_detail<C: ConnectionTrait>(
    ctx: &Context<'_, C>,
    property: Property,
    viewer: Option<Uuid>,
) -> AppResult<PropertyDetail> {
    let store = ctx.properties();
    let (images, features) = try_join!(store.images(property.id), store.feature_names(property.id))?;

    let agent = match property.agent_id {
        Some(agent_id) => match ctx.accounts().find_agent(agent_id).await? {
            Some(agent) => agent_responses(ctx, vec![agent]).await?.pop(),
            None => None,
        },
        None => None,
    };

    let area_name = match property.area_id {
        Some(area_id) => ctx.areas().names_by_ids(&[area_id]).await?.remove(&area_id),
        None => None,
    };

    let is_favorited = match viewer {
        Some(user_id) => ctx
            .engagement()
            .favorite_of(property.id, user_id)
            .await?
            .is_some(),
        None => false,
    };

    Ok(PropertyDetail::new(property, images, features, agent, area_name, is_favorited))
}

pub(crate) async fn agent_responses<C: ConnectionTrait>(
    ctx: &Context<'_, C>,
    agents: Vec<Agent>,
) -> AppResult<Vec<AgentResponse>> {
    let user_ids: Vec<Uuid> = agents.iter().map(|a| a.user_id).collect();
    let mut users = ctx.accounts().users_by_ids(&user_ids).await?;

    agents
        .into_iter()
        .map(|agent| {
            let user = users
                .remove(&agent.user_id)
                .ok_or_else(|| AppError::internal(format!("Agent {} has no user", agent.id)))?;
            Ok(AgentResponse::new(agent, user))
        })
        .collect()
}

pub(crate) async fn user_responses<C: ConnectionTrait>(
    ctx: &Context<'_, C>,
    users: Vec<User>,
) -> AppResult<Vec<UserResponse>> {
    let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
    let roles = ctx.accounts().roles_for(&ids).await?;

    Ok(users
        .into_iter()
        .map(|user| {
            let user_roles = roles.get(&user.id).cloned().unwrap_or_default();
            UserResponse::new(user, &user_roles)
        })
        .collect())
}

pub(crate) async fn authors<C: ConnectionTrait>(
    ctx: &Context<'_, C>,
    ids: &[Uuid],
) -> AppResult<HashMap<Uuid, AuthorSummary>> {
    let users = ctx.accounts().users_by_ids(ids).await?;
    Ok(users
        .into_iter()
        .map(|(id, user)| (id, AuthorSummary::from(user)))
        .collect())
}

/// Author block for `id`; authors are removed together with their content.
pub(crate) fn author_of(authors: &HashMap<Uuid, AuthorSummary>, id: Uuid) -> AppResult<AuthorSummary> {
    authors
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::internal(format!("Author {} is missing", id)))
}

async fn agent_names<C: ConnectionTrait>(
    ctx: &Context<'_, C>,
    agent_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, String>> {
    let accounts = ctx.accounts();
    let agents = accounts.agents_by_ids(agent_ids).await?;
    let user_ids: Vec<Uuid> = agents.values().map(|a| a.user_id).collect();
    let users = accounts.users_by_ids(&user_ids).await?;

    Ok(agents
        .into_iter()
        .filter_map(|(agent_id, agent)| {
            users.get(&agent.user_id).map(|user| (agent_id, user.full_name()))
        })
        .collect())
}
