use valorant_recommender::{
    api::{create_router, AppState},
    config::Config,
    services::{ArtifactStore, Predictor},
    telemetry,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;

    // Artifacts are loaded before the listener binds
    let predictor = Predictor::load(&ArtifactStore::new(&config.models_dir));
    if !predictor.is_ready() {
        tracing::warn!("Serving without models; /predict will answer 503");
    }
    let state = AppState::from_predictor(predictor);

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %config.bind_address(), "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
