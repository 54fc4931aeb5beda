use chrono::{Duration, TimeZone, Utc};
use mockito::{Matcher, Server};
use std::sync::Arc;

use run_tracker::api::ApiClient;
use run_tracker::config::Config;
use run_tracker::location::ReplayProvider;
use run_tracker::models::{Credentials, LocationSample, WorkoutType};
use run_tracker::{
    CatalogLoad, EndOptions, SessionPhase, SyncOutcome, SyncStatus, WorkoutCatalog, WorkoutSession,
};

fn track() -> Vec<LocationSample> {
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();
    vec![
        LocationSample::new(16.8409, 96.1735, t0),
        LocationSample::new(16.8419, 96.1735, t0 + Duration::seconds(1)),
        LocationSample::new(16.8419, 96.1745, t0 + Duration::seconds(2)),
    ]
}

fn config_for(base_url: String) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url;
    config.api.timeout_seconds = 5;
    config.retry.initial_delay_ms = 1;
    config.retry.max_delay_ms = 5;
    config
}

async fn replay(session: &WorkoutSession, samples: &[LocationSample]) {
    session
        .start_at(WorkoutType::Running, samples[0].timestamp)
        .await
        .unwrap();
    let mut status = session.subscribe();
    tokio::time::timeout(
        std::time::Duration::from_secs(5),
        status.wait_for(|s| !s.tracking),
    )
    .await
    .expect("replay did not finish")
    .expect("status channel closed");
}

#[tokio::test]
async fn test_replayed_workout_is_saved_remotely() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/save_workout.php")
        .match_header("authorization", "Bearer abc")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "duration": 2,
            "calories_burned": 13,
            "start_location": "16.8409,96.1735",
            "end_location": "16.8419,96.1745"
        })))
        .with_status(200)
        .with_body(r#"{"message": "Workout saved successfully.", "id": "88"}"#)
        .create_async()
        .await;

    let samples = track();
    let session = WorkoutSession::new(
        Arc::new(ApiClient::new(&config_for(server.url())).unwrap()),
        Arc::new(ReplayProvider::new(samples.clone())),
        WorkoutCatalog::new(),
    );
    session.set_credentials(Credentials::new("7", "abc")).await;

    replay(&session, &samples).await;
    assert_eq!(session.snapshot().route_points, 3);

    let finished = session
        .end_at(EndOptions::default(), samples[2].timestamp)
        .await
        .unwrap();

    assert!((finished.workout.distance_m.unwrap() - 217.62).abs() < 0.01);
    assert_eq!(finished.workout.heart_rate, Some(150));

    let outcome = finished.sync.wait().await;
    assert_eq!(
        outcome,
        SyncOutcome::Synced {
            remote_id: Some("88".to_string())
        }
    );
    assert!(matches!(
        session.snapshot().sync,
        SyncStatus::Synced { .. }
    ));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_store_keeps_workout_locally() {
    let samples = track();
    let session = WorkoutSession::new(
        Arc::new(ApiClient::new(&config_for("http://127.0.0.1:1".to_string())).unwrap()),
        Arc::new(ReplayProvider::new(samples.clone())),
        WorkoutCatalog::new(),
    );
    session.set_credentials(Credentials::new("7", "abc")).await;

    replay(&session, &samples).await;
    let finished = session.end(EndOptions::default()).await.unwrap();
    let id = finished.workout.id.clone();

    assert!(matches!(finished.sync.wait().await, SyncOutcome::Failed(_)));

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Idle);
    assert!(matches!(snapshot.sync, SyncStatus::Failed { .. }));
    assert_eq!(session.catalog().len().await, 1);
    assert!(session.catalog().get(&id).await.is_some());
}

#[tokio::test]
async fn test_catalog_loads_from_store() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/get_workouts.php")
        .with_status(200)
        .with_body(
            r#"{"message": "ok", "records": [
                {"id": 1, "user_id": 7, "distance": 2.5, "duration": 900,
                 "average_speed": 10.0, "calories_burned": 150,
                 "start_location": "0,0", "end_location": "0,0",
                 "created_at": "2024-04-30 07:00:00"}
            ]}"#,
        )
        .create_async()
        .await;

    let client = ApiClient::new(&config_for(server.url())).unwrap();
    let catalog = WorkoutCatalog::new();
    let outcome = catalog
        .load_remote(&client, &Credentials::new("7", "abc"))
        .await;

    assert_eq!(outcome, CatalogLoad::Loaded(1));
    let workouts = catalog.list().await;
    assert_eq!(workouts[0].id, "1");
    assert_eq!(workouts[0].duration_seconds(), 900);
    assert_eq!(workouts[0].calories, Some(150));
}
