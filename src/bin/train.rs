//! Offline training: fit the delivery-time regressor on the historical
//! table, report held-out metrics, and write the model file the server
//! loads at startup.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use delivery_dashboard::analytics::{regression_metrics, train_test_split};
use delivery_dashboard::dataset::Dataset;
use delivery_dashboard::features::FeatureRecord;
use delivery_dashboard::model::{ModelHandle, TrainParams};

#[derive(Parser, Debug)]
#[command(name = "train")]
#[command(about = "Train the delivery time regressor from historical data")]
struct Cli {
    /// Historical deliveries CSV
    #[arg(long, default_value = "data/Dataset.csv")]
    data: PathBuf,

    /// Where to write the trained model
    #[arg(long, default_value = "delivery_model.gbdt")]
    out: PathBuf,

    /// Number of boosted trees
    #[arg(long, default_value_t = 120)]
    trees: usize,

    /// Maximum tree depth
    #[arg(long, default_value_t = 10)]
    depth: u32,

    /// Seed for the train/test shuffle
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let dataset = Dataset::load(&cli.data)?;
    tracing::info!("loaded {} rows from {}", dataset.len(), cli.data.display());
    if dataset.len() < 10 {
        bail!(
            "refusing to train on {} rows; need at least 10",
            dataset.len()
        );
    }

    let labeled = dataset.labeled_records();
    let (train_idx, test_idx) = train_test_split(labeled.len(), 0.2, cli.seed);
    let training: Vec<(FeatureRecord, f32)> =
        train_idx.iter().map(|&i| labeled[i].clone()).collect();

    let params = TrainParams {
        trees: cli.trees,
        depth: cli.depth,
        ..TrainParams::default()
    };
    tracing::info!(
        "fitting {} trees, depth {}, on {} rows",
        params.trees,
        params.depth,
        training.len()
    );
    let model = ModelHandle::train(&training, &params);

    let test_features: Vec<FeatureRecord> =
        test_idx.iter().map(|&i| labeled[i].0.clone()).collect();
    let test_actual: Vec<f32> = test_idx.iter().map(|&i| labeled[i].1).collect();
    if !test_features.is_empty() {
        let predicted = model.predict_batch(&test_features)?;
        let metrics = regression_metrics(&test_actual, &predicted)?;
        tracing::info!(
            "held-out metrics: mae={:.2} rmse={:.2} r2={:.4}",
            metrics.mae,
            metrics.rmse,
            metrics.r2
        );
    }

    model.save(&cli.out)?;
    tracing::info!("model saved to {}", cli.out.display());
    Ok(())
}
