//! Agent profiles.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::stats_service::recompute_agent;
use super::views::agent_responses;
use crate::domain::policy::authorize;
use crate::domain::{Action, Actor, Agent, AgentDraft, AgentPatch, AgentResponse, AgentStats, Role, Target};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[async_trait]
pub trait AgentService: Send + Sync {
    /// Agents with the highest sales volume first
    async fn list(&self, params: PaginationParams) -> AppResult<Paginated<AgentResponse>>;

    async fn get(&self, id: Uuid) -> AppResult<AgentResponse>;

    /// Attach an agent profile to an existing user and grant the `agent` role
    async fn create(&self, actor: &Actor, draft: AgentDraft) -> AppResult<AgentResponse>;

    async fn update(&self, actor: &Actor, id: Uuid, patch: AgentPatch) -> AppResult<AgentResponse>;

    /// Remove the profile; the user keeps their account
    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()>;

    /// Recompute listings count and sales volume
    async fn update_stats(&self, actor: &Actor, id: Uuid) -> AppResult<AgentStats>;
}

pub struct AgentManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> AgentManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn respond(&self, agent: Agent) -> AppResult<AgentResponse> {
        agent_responses(&self.uow.reader(), vec![agent])
            .await?
            .pop()
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl<U: UnitOfWork> AgentService for AgentManager<U> {
    async fn list(&self, params: PaginationParams) -> AppResult<Paginated<AgentResponse>> {
        let ctx = self.uow.reader();
        let (agents, total) = ctx.accounts().list_agents(&params).await?;
        let data = agent_responses(&ctx, agents).await?;
        Ok(Paginated::new(data, &params, total))
    }

    async fn get(&self, id: Uuid) -> AppResult<AgentResponse> {
        let agent = self
            .uow
            .reader()
            .accounts()
            .find_agent(id)
            .await?
            .ok_or_not_found()?;
        self.respond(agent).await
    }

    async fn create(&self, actor: &Actor, draft: AgentDraft) -> AppResult<AgentResponse> {
        authorize(actor, Action::Write, &Target::Agent)?;
        draft.validate()?;

        let agent = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let accounts = tx.accounts();
                    if accounts.find_user(draft.user_id).await?.is_none() {
                        return Err(AppError::invalid_field("user_id", "User does not exist"));
                    }
                    if accounts.agent_for_user(draft.user_id).await?.is_some() {
                        return Err(AppError::conflict("Agent profile for this user"));
                    }
                    let user_id = draft.user_id;
                    let agent = accounts.create_agent(draft).await?;
                    accounts.grant_role(user_id, Role::Agent).await?;
                    Ok(agent)
                })
            })
            .await?;

        tracing::info!(agent_id = %agent.id, user_id = %agent.user_id, "Agent profile created");
        self.respond(agent).await
    }

    async fn update(&self, actor: &Actor, id: Uuid, patch: AgentPatch) -> AppResult<AgentResponse> {
        authorize(actor, Action::Write, &Target::Agent)?;
        patch.validate()?;

        let agent = self
            .uow
            .transaction(move |tx| Box::pin(async move { tx.accounts().update_agent(id, patch).await }))
            .await?;

        tracing::info!(agent_id = %id, "Agent profile updated");
        self.respond(agent).await
    }

    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        authorize(actor, Action::Write, &Target::Agent)?;

        let deleted = self
            .uow
            .transaction(move |tx| Box::pin(async move { tx.accounts().delete_agent(id).await }))
            .await?;

        if !deleted {
            return Err(AppError::NotFound);
        }
        tracing::info!(agent_id = %id, "Agent profile deleted");
        Ok(())
    }

    async fn update_stats(&self, actor: &Actor, id: Uuid) -> AppResult<AgentStats> {
        authorize(actor, Action::Write, &Target::Agent)?;
        recompute_agent(self.uow.as_ref(), id).await
    }
}
