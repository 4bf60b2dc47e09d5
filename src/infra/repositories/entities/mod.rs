//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! Enumerations are stored as their text spelling and parsed on load.

pub mod agent;
pub mod area;
pub mod area_guide;
pub mod area_image;
pub mod area_perk;
pub mod blog_post;
pub mod favorite;
pub mod market_report;
pub mod market_statistic;
pub mod market_trend;
pub mod property;
pub mod property_feature;
pub mod property_feature_relation;
pub mod property_image;
pub mod property_inquiry;
pub mod user;
pub mod user_role;
