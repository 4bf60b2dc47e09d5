//! Repository layer - Data access abstraction
//!
//! Stores are borrowing views over a connection or an open transaction,
//! one per aggregate family. `UserRepository` is the object-safe slice
//! the authentication path needs, so it can be mocked.

mod account_store;
mod area_store;
mod base;
mod engagement_store;
pub(crate) mod entities;
mod insight_store;
mod property_store;
mod user_repository;

pub use account_store::{AccountStore, NewAccount};
pub use area_store::AreaStore;
pub use engagement_store::EngagementStore;
pub use insight_store::InsightStore;
pub use property_store::PropertyStore;
pub use user_repository::{UserRepository, UserStore};

// Export mock for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
