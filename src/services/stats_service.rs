//! Aggregate maintenance for the derived counters on areas and agents.
//!
//! Recomputation is an explicit action (HTTP or CLI), never a side
//! effect of property writes. Each run reads the current listings and
//! writes both derived fields together inside one serializable
//! transaction, so repeating it is harmless.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{AgentStats, AreaStats};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait StatsService: Send + Sync {
    /// Recount an area's properties and re-average their prices
    async fn recompute_area(&self, area_id: Uuid) -> AppResult<AreaStats>;

    /// Recount an agent's listings and re-sum their sold volume
    async fn recompute_agent(&self, agent_id: Uuid) -> AppResult<AgentStats>;

    /// Recompute every area, returning how many were updated
    async fn recompute_all_areas(&self) -> AppResult<usize>;

    /// Recompute every agent, returning how many were updated
    async fn recompute_all_agents(&self) -> AppResult<usize>;
}

pub struct StatsMaintainer<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> StatsMaintainer<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

pub(crate) async fn recompute_area<U: UnitOfWork>(uow: &U, area_id: Uuid) -> AppResult<AreaStats> {
    let stats = uow
        .transaction_serializable(move |tx| {
            Box::pin(async move {
                let areas = tx.areas();
                areas.find(area_id).await?.ok_or_not_found()?;
                let prices = tx.properties().prices_in_area(area_id).await?;
                let stats = AreaStats::from_prices(&prices);
                areas.save_stats(area_id, stats).await?;
                Ok(stats)
            })
        })
        .await?;

    tracing::info!(
        %area_id,
        properties_count = stats.properties_count,
        average_price = %stats.average_price,
        "Area stats recomputed"
    );
    Ok(stats)
}

pub(crate) async fn recompute_agent<U: UnitOfWork>(uow: &U, agent_id: Uuid) -> AppResult<AgentStats> {
    let stats = uow
        .transaction_serializable(move |tx| {
            Box::pin(async move {
                let accounts = tx.accounts();
                accounts.find_agent(agent_id).await?.ok_or_not_found()?;
                let listings = tx.properties().listings_for_agent(agent_id).await?;
                let stats = AgentStats::from_listings(&listings);
                accounts.save_agent_stats(agent_id, stats).await?;
                Ok(stats)
            })
        })
        .await?;

    tracing::info!(
        %agent_id,
        listings_count = stats.listings_count,
        sales_volume = %stats.sales_volume,
        "Agent stats recomputed"
    );
    Ok(stats)
}

#[async_trait]
impl<U: UnitOfWork> StatsService for StatsMaintainer<U> {
    async fn recompute_area(&self, area_id: Uuid) -> AppResult<AreaStats> {
        recompute_area(self.uow.as_ref(), area_id).await
    }

    async fn recompute_agent(&self, agent_id: Uuid) -> AppResult<AgentStats> {
        recompute_agent(self.uow.as_ref(), agent_id).await
    }

    async fn recompute_all_areas(&self) -> AppResult<usize> {
        let ids = self.uow.reader().areas().all_ids().await?;
        for id in &ids {
            recompute_area(self.uow.as_ref(), *id).await?;
        }
        Ok(ids.len())
    }

    async fn recompute_all_agents(&self) -> AppResult<usize> {
        let ids = self.uow.reader().accounts().all_agent_ids().await?;
        for id in &ids {
            recompute_agent(self.uow.as_ref(), *id).await?;
        }
        Ok(ids.len())
    }
}
