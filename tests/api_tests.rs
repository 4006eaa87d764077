use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use mockall::mock;
use serde_json::{json, Value};
use tempfile::TempDir;

use valorant_recommender::api::{create_router, AppState};
use valorant_recommender::ml::ForestParams;
use valorant_recommender::models::{PlayerProfile, Prediction};
use valorant_recommender::services::{
    train_and_save, ArtifactStore, DatasetGenerator, PredictionError, Predictor, Recommender,
    TrainingOptions,
};

mock! {
    pub Recommender {}
    impl Recommender for Recommender {
        fn recommend(&self, profile: &PlayerProfile) -> Result<Prediction, PredictionError>;
    }
}

fn example_profile() -> Value {
    json!({
        "playstyle": "aggressive",
        "preferred_role": "duelist",
        "favorite_map": "Ascent",
        "aim_type": "precise",
        "edpi": 320,
        "ability_usage": 5,
        "aggressiveness": 7,
        "hours_played": 200
    })
}

/// Trains small forests into a temp dir; the dir must outlive the server
fn trained_store() -> (TempDir, ArtifactStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path().join("models"));
    let records = DatasetGenerator::seeded(42).generate(300).unwrap();
    let options = TrainingOptions {
        forest: ForestParams {
            n_estimators: 15,
            ..ForestParams::default()
        },
        ..TrainingOptions::default()
    };
    train_and_save(&records, &options, &store).unwrap();
    (dir, store)
}

fn server_for(store: &ArtifactStore) -> TestServer {
    let state = AppState::from_predictor(Predictor::load(store));
    TestServer::new(create_router(state)).unwrap()
}

fn mock_server(recommender: MockRecommender) -> TestServer {
    let state = AppState::new(Arc::new(recommender));
    TestServer::new(create_router(state)).unwrap()
}

fn unused_recommender() -> MockRecommender {
    let mut recommender = MockRecommender::new();
    recommender.expect_recommend().times(0);
    recommender
}

#[tokio::test]
async fn test_root_reports_online() {
    let server = mock_server(unused_recommender());

    let response = server.get("/").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Valorant AI Recommender API is running!");
    assert_eq!(body["status"], "online");
    assert_eq!(body["version"], "1.0.0");
}

#[tokio::test]
async fn test_predict_with_trained_models() {
    let (_dir, store) = trained_store();
    let server = server_for(&store);

    let response = server.post("/predict").json(&example_profile()).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body.as_object().unwrap().len(), 4);

    let prediction: Prediction = response.json();
    assert!(!prediction.recommended_agent.is_empty());
    assert!(prediction.recommended_sens_800 > 0.0 && prediction.recommended_sens_800 < 1.0);

    let half = (prediction.recommended_sens_800 / 2.0 * 1000.0).round() / 1000.0;
    assert!((prediction.recommended_sens_1600 - half).abs() < 1e-9);
    assert_eq!(
        prediction.edpi,
        (prediction.recommended_sens_800 * 800.0).round() as i64
    );
}

#[tokio::test]
async fn test_predict_is_deterministic() {
    let (_dir, store) = trained_store();
    let server = server_for(&store);

    let first: Prediction = server.post("/predict").json(&example_profile()).await.json();
    let second: Prediction = server.post("/predict").json(&example_profile()).await.json();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_out_of_range_fields_are_rejected() {
    let cases = [
        ("edpi", json!(100)),
        ("edpi", json!(501)),
        ("ability_usage", json!(0)),
        ("ability_usage", json!(11)),
        ("aggressiveness", json!(0)),
        ("hours_played", json!(-1)),
        ("hours_played", json!(10_001)),
    ];

    for (field, value) in cases {
        let server = mock_server(unused_recommender());
        let mut payload = example_profile();
        payload[field] = value.clone();

        let response = server.post("/predict").json(&payload).expect_failure().await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert!(
            body["detail"].as_str().unwrap().contains(field),
            "{} = {} gave {}",
            field,
            value,
            body
        );
    }
}

#[tokio::test]
async fn test_bounds_are_inclusive() {
    let mut recommender = MockRecommender::new();
    recommender
        .expect_recommend()
        .times(2)
        .returning(|_| Ok(Prediction::from_raw("Sage", 0.3)));
    let server = mock_server(recommender);

    let mut low = example_profile();
    low["edpi"] = json!(150);
    low["ability_usage"] = json!(1);
    low["hours_played"] = json!(0);
    server.post("/predict").json(&low).await.assert_status_ok();

    let mut high = example_profile();
    high["edpi"] = json!(500);
    high["aggressiveness"] = json!(10);
    high["hours_played"] = json!(10_000);
    server.post("/predict").json(&high).await.assert_status_ok();
}

#[tokio::test]
async fn test_malformed_payloads_are_rejected() {
    let server = mock_server(unused_recommender());

    let mut unknown_map = example_profile();
    unknown_map["favorite_map"] = json!("Nonexistent");
    server
        .post("/predict")
        .json(&unknown_map)
        .expect_failure()
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let mut wrong_type = example_profile();
    wrong_type["edpi"] = json!("high");
    server
        .post("/predict")
        .json(&wrong_type)
        .expect_failure()
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let mut missing = example_profile();
    missing.as_object_mut().unwrap().remove("aim_type");
    let response = server.post("/predict").json(&missing).expect_failure().await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_missing_artifacts_make_predict_unavailable() {
    let (_dir, store) = trained_store();
    std::fs::remove_file(store.encoder_path()).unwrap();
    let server = server_for(&store);

    server.get("/").await.assert_status_ok();

    for _ in 0..2 {
        let response = server
            .post("/predict")
            .json(&example_profile())
            .expect_failure()
            .await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json();
        assert!(!body["detail"].as_str().unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_inference_failure_is_internal_error() {
    let mut recommender = MockRecommender::new();
    recommender
        .expect_recommend()
        .times(1)
        .returning(|_| Err(PredictionError::Inference("regressor exploded".to_string())));
    let server = mock_server(recommender);

    let response = server
        .post("/predict")
        .json(&example_profile())
        .expect_failure()
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["detail"], "regressor exploded");
}

#[tokio::test]
async fn test_recommender_receives_the_submitted_profile() {
    let mut recommender = MockRecommender::new();
    recommender
        .expect_recommend()
        .withf(|profile| profile.edpi == 320 && profile.hours_played == 200)
        .times(1)
        .returning(|_| Ok(Prediction::from_raw("Jett", 0.4)));
    let server = mock_server(recommender);

    let prediction: Prediction = server.post("/predict").json(&example_profile()).await.json();
    assert_eq!(prediction.recommended_agent, "Jett");
    assert_eq!(prediction.recommended_sens_1600, 0.2);
    assert_eq!(prediction.edpi, 320);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = mock_server(unused_recommender());
    let id = "6f1c0e7a-3b1d-4c55-9a8e-2f4b7d9e1a20";

    let response = server
        .get("/")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(id),
        )
        .await;
    assert_eq!(response.header("x-request-id"), id);

    let generated = server.get("/").await;
    assert!(!generated.header("x-request-id").is_empty());
}
