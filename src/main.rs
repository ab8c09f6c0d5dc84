use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use delivery_dashboard::api::{router, AppState};
use delivery_dashboard::config::Config;
use delivery_dashboard::dataset::Dataset;
use delivery_dashboard::features::FeatureRecord;
use delivery_dashboard::model::ModelHandle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::from_env()?;

    // Fail-fast: nothing listens unless both startup loads succeed.
    let model = ModelHandle::load(&cfg.model_path)
        .with_context(|| format!("startup: could not load model from {}", cfg.model_path.display()))?;
    let dataset = Dataset::load(&cfg.data_path)
        .with_context(|| format!("startup: could not load dataset from {}", cfg.data_path.display()))?;
    tracing::info!(
        "loaded model from {} and {} dataset rows from {}",
        cfg.model_path.display(),
        dataset.len(),
        cfg.data_path.display()
    );

    // Warmup forward through the full feature contract.
    let warmup = FeatureRecord {
        age: 30.0,
        rating: 4.5,
        vehicle: 2,
        order: 1,
        distance_km: 10.0,
    };
    let estimate = model.predict(&warmup)?;
    tracing::info!("warmup predict ok ({estimate:.2} min)");

    let state = AppState {
        model: Arc::new(model),
        dataset: Arc::new(dataset),
    };
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
