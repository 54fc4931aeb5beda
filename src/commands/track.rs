use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use super::{format_duration, parse_samples};
use crate::api::ApiClient;
use crate::catalog::WorkoutCatalog;
use crate::config::Config;
use crate::location::ReplayProvider;
use crate::models::WorkoutType;
use crate::session::{EndOptions, SyncOutcome, WorkoutSession};

#[derive(Args)]
pub struct TrackCommand {
    /// Workout type (running, walking, cycling, swimming, other)
    #[arg(short = 't', long = "type", default_value = "running")]
    workout_type: WorkoutType,

    /// JSON-lines file with one location sample per line
    #[arg(short, long)]
    input: PathBuf,

    /// Distance in meters, replaces the distance measured along the track
    #[arg(long)]
    distance: Option<f64>,

    /// Calories burned, replaces the estimate
    #[arg(long)]
    calories: Option<i32>,

    /// Average heart rate in bpm, replaces the estimate
    #[arg(long)]
    heart_rate: Option<i32>,

    /// Free-form notes
    #[arg(long)]
    notes: Option<String>,
}

impl TrackCommand {
    pub async fn execute(self, config: &Config) -> Result<()> {
        let contents = fs::read_to_string(&self.input)
            .with_context(|| format!("Failed to read track file {}", self.input.display()))?;
        let samples = parse_samples(&contents)?;
        let sample_count = samples.len();

        // Replayed tracks keep their own clock
        let start_time = samples.first().map(|s| s.timestamp).unwrap_or_else(Utc::now);
        let end_time = samples.last().map(|s| s.timestamp).unwrap_or(start_time);

        if !config.is_authenticated() {
            tracing::warn!("No auth token configured, the store will likely refuse this workout");
        }

        let store = Arc::new(ApiClient::new(config)?);
        let provider = Arc::new(ReplayProvider::new(samples));
        let session = WorkoutSession::with_options(
            store,
            provider,
            WorkoutCatalog::new(),
            config.intensity.clone(),
            config.tracking.reject_out_of_order,
        );
        session.set_credentials(config.credentials()).await;

        session.start_at(self.workout_type, start_time).await?;

        let mut status = session.subscribe();
        status
            .wait_for(|s| !s.tracking)
            .await
            .context("Session closed while replaying track")?;

        let finished = session
            .end_at(
                EndOptions {
                    distance_m: self.distance,
                    calories: self.calories,
                    heart_rate: self.heart_rate,
                    notes: self.notes,
                },
                end_time,
            )
            .await?;
        session.shutdown();

        let workout = &finished.workout;
        let skipped = sample_count - workout.route.len();

        println!("✓ Workout recorded: {}", workout.id);
        println!();
        println!("  Type:       {}", workout.workout_type);
        println!(
            "  Duration:   {}",
            format_duration(workout.duration_seconds())
        );
        println!("  Distance:   {:.2} km", workout.distance_km());
        println!("  Avg speed:  {:.2} km/h", workout.average_speed_kmh());
        println!("  Calories:   {}", workout.calories.unwrap_or(0));
        println!("  Heart rate: {} bpm", workout.heart_rate.unwrap_or(0));
        println!("  Points:     {}", workout.route.len());
        if skipped > 0 {
            println!("  Skipped:    {} out-of-order samples", skipped);
        }
        println!();

        match finished.sync.wait().await {
            SyncOutcome::Synced {
                remote_id: Some(id),
            } => println!("✓ Synced to workout store (id {})", id),
            SyncOutcome::Synced { remote_id: None } => println!("✓ Synced to workout store"),
            SyncOutcome::Failed(message) => {
                println!("⚠ Kept locally, sync failed: {}", message)
            }
        }

        Ok(())
    }
}
