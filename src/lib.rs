//! Realty API - backend for a real-estate marketplace
//!
//! Areas and properties are written as composite aggregates (parent
//! row, images, perks or features, guide) inside one transaction.
//! Around them sit favorites and inquiries, agent profiles and the
//! market-insight content (reports, trends, blog, statistics).
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities, validation rules and the access policy
//! - **services**: Use cases, one trait per resource
//! - **infra**: Database, stores, unit of work and blob storage
//! - **api**: HTTP handlers, extractors, middleware and routes
//! - **types**: Shared types (pagination, ordering, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Create the superadmin and reference data
//! SEED_ADMIN_PASSWORD=... cargo run -- seed
//!
//! # Recompute every area's property count and average price
//! cargo run -- stats areas
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Actor, Password, Principal, Role, User};
pub use errors::{AppError, AppResult};
