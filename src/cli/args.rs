//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Realty API - real-estate marketplace backend
#[derive(Parser, Debug)]
#[command(name = "realty-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Recompute derived area and agent stats
    Stats(StatsArgs),

    /// Create the initial superadmin, a demo agent, common features and areas
    Seed(SeedArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the stats command
#[derive(Parser, Debug)]
pub struct StatsArgs {
    #[command(subcommand)]
    pub target: StatsTarget,
}

#[derive(Subcommand, Debug)]
pub enum StatsTarget {
    /// Property count and average price per area
    Areas {
        /// Only this area
        #[arg(long)]
        id: Option<Uuid>,
    },
    /// Listings count and sales volume per agent
    Agents {
        /// Only this agent
        #[arg(long)]
        id: Option<Uuid>,
    },
}

/// Arguments for the seed command
#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// Superadmin email
    #[arg(long, env = "SEED_ADMIN_EMAIL", default_value = "admin@example.com")]
    pub admin_email: String,

    /// Superadmin password
    #[arg(long, env = "SEED_ADMIN_PASSWORD")]
    pub admin_password: String,

    /// Skip the demo agent and areas
    #[arg(long)]
    pub no_demo: bool,
}
