use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use std::time::Duration;

use crate::config::Config;
use crate::models::Credentials;

mod error;
mod payload;
mod retry;

pub use error::ApiError;
pub use payload::{
    SaveReceipt, SaveWorkoutResponse, WorkoutListing, WorkoutRecord, WorkoutSubmission,
    WorkoutsResponse, CREATED_AT_FORMAT, NO_WORKOUTS_MESSAGE,
};
pub use retry::RetryConfig;

/// Remote store that finished workouts are synced to
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkoutStore: Send + Sync {
    /// Submit a finished workout
    async fn save_workout(
        &self,
        credentials: &Credentials,
        submission: &WorkoutSubmission,
    ) -> Result<SaveReceipt, ApiError>;

    /// Fetch the user's stored workouts
    async fn get_workouts(&self, credentials: &Credentials) -> Result<WorkoutListing, ApiError>;
}

/// HTTP client for the workout store backend
pub struct ApiClient {
    client: Client,
    base_url: String,
    save_path: String,
    list_path: String,
    retry_config: RetryConfig,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.api.timeout_seconds);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
            save_path: config.api.save_path.clone(),
            list_path: config.api.list_path.clone(),
            retry_config: config.retry.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", credentials.token))
            .header("Accept", "application/json")
    }
}

#[async_trait]
impl WorkoutStore for ApiClient {
    async fn save_workout(
        &self,
        credentials: &Credentials,
        submission: &WorkoutSubmission,
    ) -> Result<SaveReceipt, ApiError> {
        let url = format!("{}{}", self.base_url, self.save_path);

        tracing::debug!(
            "Submitting workout: {:.3} km in {}s",
            submission.distance,
            submission.duration
        );

        // Submissions are not retried: the store has no idempotency key and a
        // repeated POST would record the workout twice.
        let response = self
            .authorized(self.client.post(&url), credentials)
            .json(submission)
            .send()
            .await?;

        let status = response.status();

        if status.is_success() {
            let body: SaveWorkoutResponse = response.json().await?;
            let receipt = body.into_receipt()?;
            tracing::info!("Workout saved: {}", receipt.message);
            Ok(receipt)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, error_text))
        }
    }

    async fn get_workouts(&self, credentials: &Credentials) -> Result<WorkoutListing, ApiError> {
        let url = format!("{}{}", self.base_url, self.list_path);

        tracing::debug!("Fetching stored workouts");

        self.retry_config
            .execute(|| {
                let request = self.authorized(self.client.get(&url), credentials);
                async move {
                    let response = request.send().await?;
                    let status = response.status();
                    let text = response.text().await?;

                    if status.is_success() {
                        let body: WorkoutsResponse = serde_json::from_str(&text)?;
                        return Ok(body.into_listing());
                    }

                    // An empty listing may come back as 404 with the sentinel message
                    if status == StatusCode::NOT_FOUND {
                        if let Ok(body) = serde_json::from_str::<WorkoutsResponse>(&text) {
                            if body.is_empty_sentinel() {
                                return Ok(WorkoutListing::NoWorkouts);
                            }
                        }
                    }

                    Err(ApiError::from_status(status, text))
                }
            })
            .await
    }
}
