//! Stats command - Recompute derived area and agent fields.

use crate::cli::args::{StatsArgs, StatsTarget};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Database;
use crate::services::{ServiceContainer, Services};

/// Execute the stats command
pub async fn execute(args: StatsArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let stats = Services::from_connection(db.get_connection(), config).stats();

    match args.target {
        StatsTarget::Areas { id: Some(id) } => {
            let result = stats.recompute_area(id).await?;
            println!(
                "{}: {} properties, average price {}",
                id, result.properties_count, result.average_price
            );
        }
        StatsTarget::Areas { id: None } => {
            let count = stats.recompute_all_areas().await?;
            println!("Recomputed {} areas", count);
        }
        StatsTarget::Agents { id: Some(id) } => {
            let result = stats.recompute_agent(id).await?;
            println!(
                "{}: {} listings, sales volume {}",
                id, result.listings_count, result.sales_volume
            );
        }
        StatsTarget::Agents { id: None } => {
            let count = stats.recompute_all_agents().await?;
            println!("Recomputed {} agents", count);
        }
    }

    Ok(())
}
