//! HTTP request handlers.

pub mod area_handler;
pub mod auth_handler;
pub mod market_handler;
pub mod property_handler;
pub mod user_handler;

pub use area_handler::area_routes;
pub use auth_handler::auth_routes;
pub use market_handler::market_routes;
pub use property_handler::property_routes;
pub use user_handler::user_routes;
