//! Service Container - Centralized service access.
//!
//! Handlers depend on the service traits only; the container wires the
//! concrete managers onto one shared unit of work and blob store.

use std::sync::Arc;

use super::{
    AgentManager, AgentService, AreaManager, AreaService, AuthService, Authenticator,
    FavoriteManager, FavoriteService, InquiryManager, InquiryService, InsightManager,
    InsightService, PropertyManager, PropertyService, StatsMaintainer, StatsService, UserManager,
    UserService,
};
use crate::config::Config;
use crate::infra::{BlobStore, LocalBlobStore, Persistence};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn agents(&self) -> Arc<dyn AgentService>;

    fn areas(&self) -> Arc<dyn AreaService>;

    fn properties(&self) -> Arc<dyn PropertyService>;

    fn favorites(&self) -> Arc<dyn FavoriteService>;

    fn inquiries(&self) -> Arc<dyn InquiryService>;

    /// Reports, trends, blog and statistics
    fn insights(&self) -> Arc<dyn InsightService>;

    /// Derived area and agent aggregates
    fn stats(&self) -> Arc<dyn StatsService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    agent_service: Arc<dyn AgentService>,
    area_service: Arc<dyn AreaService>,
    property_service: Arc<dyn PropertyService>,
    favorite_service: Arc<dyn FavoriteService>,
    inquiry_service: Arc<dyn InquiryService>,
    insight_service: Arc<dyn InsightService>,
    stats_service: Arc<dyn StatsService>,
}

impl Services {
    /// Services over `db`, storing uploads below the configured media root
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::from_config(&config));
        Self::with_blob_store(db, config, blobs)
    }

    /// Services over `db` with an explicit blob store
    pub fn with_blob_store(
        db: sea_orm::DatabaseConnection,
        config: Config,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            agent_service: Arc::new(AgentManager::new(uow.clone())),
            area_service: Arc::new(AreaManager::new(uow.clone(), blobs.clone())),
            property_service: Arc::new(PropertyManager::new(uow.clone(), blobs.clone())),
            favorite_service: Arc::new(FavoriteManager::new(uow.clone())),
            inquiry_service: Arc::new(InquiryManager::new(uow.clone())),
            insight_service: Arc::new(InsightManager::new(uow.clone(), blobs)),
            stats_service: Arc::new(StatsMaintainer::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn agents(&self) -> Arc<dyn AgentService> {
        self.agent_service.clone()
    }

    fn areas(&self) -> Arc<dyn AreaService> {
        self.area_service.clone()
    }

    fn properties(&self) -> Arc<dyn PropertyService> {
        self.property_service.clone()
    }

    fn favorites(&self) -> Arc<dyn FavoriteService> {
        self.favorite_service.clone()
    }

    fn inquiries(&self) -> Arc<dyn InquiryService> {
        self.inquiry_service.clone()
    }

    fn insights(&self) -> Arc<dyn InsightService> {
        self.insight_service.clone()
    }

    fn stats(&self) -> Arc<dyn StatsService> {
        self.stats_service.clone()
    }
}
