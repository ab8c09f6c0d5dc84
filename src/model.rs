//! The loaded regression model: trained offline by the `train` binary,
//! deserialized once at startup, shared read-only for the process lifetime.

use std::path::Path;

use anyhow::{anyhow, bail, Result};
use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;

use crate::features::{FeatureRecord, FEATURE_COUNT};

/// Hyperparameters for offline training. Defaults mirror the original
/// 120-tree, depth-10 forest configuration.
#[derive(Debug, Clone)]
pub struct TrainParams {
    pub trees: usize,
    pub depth: u32,
    pub shrinkage: f32,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            trees: 120,
            depth: 10,
            shrinkage: 0.1,
        }
    }
}

pub struct ModelHandle {
    model: GBDT,
}

impl ModelHandle {
    /// Deserialize a trained model. Fatal at startup: an absent or
    /// unreadable file means the service must not accept requests.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "model file not found at {}; run the `train` binary to create it",
                path.display()
            );
        }
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("model path {} is not valid UTF-8", path.display()))?;
        let model = GBDT::load_model(path_str)
            .map_err(|e| anyhow!("failed to deserialize model from {}: {e}", path.display()))?;
        Ok(Self { model })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("model path {} is not valid UTF-8", path.display()))?;
        self.model
            .save_model(path_str)
            .map_err(|e| anyhow!("failed to save model to {}: {e}", path.display()))?;
        Ok(())
    }

    /// Fit a squared-error gradient-boosted forest on labeled feature rows.
    /// Sampling ratios are pinned to 1.0 so a fixed dataset always produces
    /// the same model.
    pub fn train(labeled: &[(FeatureRecord, f32)], params: &TrainParams) -> Self {
        let mut cfg = Config::new();
        cfg.set_feature_size(FEATURE_COUNT);
        cfg.set_max_depth(params.depth);
        cfg.set_iterations(params.trees);
        cfg.set_shrinkage(params.shrinkage);
        cfg.set_loss("SquaredError");
        cfg.set_min_leaf_size(2);
        cfg.set_data_sample_ratio(1.0);
        cfg.set_feature_sample_ratio(1.0);

        let mut rows: DataVec = labeled
            .iter()
            .map(|(features, time)| Data::new_training_data(features.as_vector(), 1.0, *time, None))
            .collect();

        let mut model = GBDT::new(&cfg);
        model.fit(&mut rows);
        Self { model }
    }

    /// One-row estimate in minutes. Deterministic for a fixed loaded model.
    pub fn predict(&self, record: &FeatureRecord) -> Result<f32> {
        let estimates = self.predict_batch(std::slice::from_ref(record))?;
        Ok(estimates[0])
    }

    /// Row-wise estimates; used by the offline evaluation path.
    pub fn predict_batch(&self, records: &[FeatureRecord]) -> Result<Vec<f32>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let rows: DataVec = records
            .iter()
            .map(|r| Data::new_test_data(r.as_vector(), None))
            .collect();
        let estimates = self.model.predict(&rows);
        if estimates.len() != records.len() {
            bail!(
                "model returned {} estimates for {} rows",
                estimates.len(),
                records.len()
            );
        }
        Ok(estimates)
    }
}
