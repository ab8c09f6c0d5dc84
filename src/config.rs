use std::path::PathBuf;

use anyhow::{Context, Result};

/// Runtime configuration, resolved from the environment with defaults that
/// match the repository layout.
#[derive(Debug)]
pub struct Config {
    pub model_path: PathBuf,
    pub data_path: PathBuf,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let model_path = std::env::var("MODEL_PATH")
            .unwrap_or_else(|_| "delivery_model.gbdt".to_string())
            .into();
        let data_path = std::env::var("DATA_PATH")
            .unwrap_or_else(|_| "data/Dataset.csv".to_string())
            .into();
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid PORT value `{raw}`"))?,
            Err(_) => 8080,
        };
        Ok(Self {
            model_path,
            data_path,
            port,
        })
    }
}
