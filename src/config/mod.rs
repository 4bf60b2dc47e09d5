//! Application configuration module
//!
//! Environment-driven settings (database, JWT, media storage) and
//! application-wide constants.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
