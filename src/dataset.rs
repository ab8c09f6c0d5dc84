//! The historical delivery table: loaded once from CSV at startup, immutable
//! afterward. Analytics and offline evaluation both read from it.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::features::FeatureRecord;

/// One historical delivery. Columns not listed here (row ids, courier ids)
/// are ignored on read.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryRecord {
    #[serde(rename = "Delivery_person_Age")]
    pub age: f32,
    #[serde(rename = "Delivery_person_Ratings")]
    pub rating: f32,
    #[serde(rename = "Type_of_vehicle")]
    pub vehicle: i32,
    #[serde(rename = "Type_of_order")]
    pub order: i32,
    #[serde(rename = "Distance_km")]
    pub distance_km: f32,
    /// Observed outcome, in minutes.
    #[serde(rename = "Delivery_Time")]
    pub delivery_time: f32,
}

impl DeliveryRecord {
    pub fn features(&self) -> FeatureRecord {
        FeatureRecord {
            age: self.age,
            rating: self.rating,
            vehicle: self.vehicle,
            order: self.order,
            distance_km: self.distance_km,
        }
    }
}

pub struct Dataset {
    records: Vec<DeliveryRecord>,
}

impl Dataset {
    /// Strict load: a missing file or a malformed row is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("dataset file not found at {}", path.display());
        }
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open dataset at {}", path.display()))?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: DeliveryRecord =
                row.with_context(|| format!("malformed row in {}", path.display()))?;
            records.push(record);
        }
        Ok(Self { records })
    }

    pub fn from_records(records: Vec<DeliveryRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DeliveryRecord] {
        &self.records
    }

    pub fn delivery_times(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.delivery_time).collect()
    }

    pub fn distances(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.distance_km).collect()
    }

    pub fn ratings(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.rating).collect()
    }

    pub fn ages(&self) -> Vec<f32> {
        self.records.iter().map(|r| r.age).collect()
    }

    pub fn vehicles(&self) -> Vec<i32> {
        self.records.iter().map(|r| r.vehicle).collect()
    }

    pub fn orders(&self) -> Vec<i32> {
        self.records.iter().map(|r| r.order).collect()
    }

    /// (features, observed time) pairs for training and evaluation.
    pub fn labeled_records(&self) -> Vec<(FeatureRecord, f32)> {
        self.records
            .iter()
            .map(|r| (r.features(), r.delivery_time))
            .collect()
    }
}
