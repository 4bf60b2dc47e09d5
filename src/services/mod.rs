//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. Each one authorizes the actor through the
//! access policy before touching storage.
//!
//! All services use the Unit of Work pattern for store access and
//! transaction management.

mod agent_service;
mod area_service;
mod auth_service;
pub mod container;
mod favorite_service;
mod inquiry_service;
mod insight_service;
mod property_service;
mod stats_service;
mod user_service;
mod views;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use agent_service::{AgentManager, AgentService};
pub use area_service::{AreaManager, AreaService};
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use favorite_service::{FavoriteManager, FavoriteService};
pub use inquiry_service::{InquiryManager, InquiryService};
pub use insight_service::{InsightManager, InsightService};
pub use property_service::{PropertyManager, PropertyService};
pub use stats_service::{StatsMaintainer, StatsService};
pub use user_service::{UserManager, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
