use anyhow::Result;
use clap::Args;

use super::format_duration;
use crate::api::ApiClient;
use crate::catalog::{CatalogLoad, WorkoutCatalog};
use crate::config::Config;
use crate::error::TrackerError;

#[derive(Args)]
pub struct ListCommand {
    /// Number of workouts to show
    #[arg(short, long, default_value = "10")]
    limit: usize,
}

impl ListCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let client = ApiClient::new(config)?;
        let catalog = WorkoutCatalog::new();

        match catalog.load_remote(&client, &config.credentials()).await {
            CatalogLoad::Failed(message) => return Err(TrackerError::Load(message).into()),
            CatalogLoad::Empty => {
                if !config.is_authenticated() {
                    println!("Not signed in: set [auth] user_id and token in the config file");
                } else {
                    println!("No workouts found.");
                }
                return Ok(());
            }
            CatalogLoad::Loaded(count) => {
                println!("Workouts ({} stored)", count);
                println!();
            }
        }

        println!(
            "{:<8} {:<20} {:>10} {:>10} {:>8}",
            "ID", "Date", "Distance", "Duration", "kcal"
        );
        for workout in catalog.list().await.iter().take(self.limit) {
            println!(
                "{:<8} {:<20} {:>7.2} km {:>10} {:>8}",
                workout.id,
                workout.start_time.format("%Y-%m-%d %H:%M"),
                workout.distance_km(),
                format_duration(workout.duration_seconds()),
                workout.calories.unwrap_or(0)
            );
        }

        Ok(())
    }
}
