//! Descriptive statistics over the dataset table. Everything here is a pure
//! function of its inputs; the handlers wire the results into chart specs.

use std::cmp::Ordering;
use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;

use crate::dataset::Dataset;
use crate::model::ModelHandle;

pub const VEHICLE_LABELS: [(i32, &str); 3] = [(1, "Motorcycle"), (2, "Scooter"), (3, "Electric")];
pub const ORDER_LABELS: [(i32, &str); 4] = [(0, "Snacks"), (1, "Meal"), (2, "Drinks"), (3, "Buffet")];

/// Age bucket edges, binned as (lo, hi].
pub const AGE_BUCKET_EDGES: [f32; 6] = [20.0, 25.0, 30.0, 35.0, 40.0, 50.0];
pub const AGE_BUCKET_LABELS: [&str; 5] = ["20-25", "26-30", "31-35", "36-40", "41-50"];

/// Two-decimal display rounding. Stays in f64 the whole way because JSON
/// numbers are f64; rounding a narrower float and widening it afterward
/// reintroduces sub-cent digits on the wire.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn mean(values: &[f32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    Some(sum / values.len() as f64)
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_deliveries: usize,
    /// Means are absent (null) for an empty table rather than NaN.
    pub avg_delivery_time: Option<f64>,
    pub avg_distance: Option<f64>,
    pub avg_rating: Option<f64>,
}

pub fn summary_statistics(dataset: &Dataset) -> SummaryStats {
    SummaryStats {
        total_deliveries: dataset.len(),
        avg_delivery_time: mean(&dataset.delivery_times()).map(round2),
        avg_distance: mean(&dataset.distances()).map(round2),
        avg_rating: mean(&dataset.ratings()).map(round2),
    }
}

pub fn label_for(code: i32, labels: &[(i32, &str)]) -> String {
    labels
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| (*name).to_string())
        .unwrap_or_else(|| format!("Type {code}"))
}

/// Row counts per categorical code, remapped to labels, ordered by
/// descending count (ties broken by ascending code). Unmapped codes get the
/// generic `Type {code}` label.
pub fn categorical_distribution(codes: &[i32], labels: &[(i32, &str)]) -> Vec<(String, usize)> {
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for &code in codes {
        *counts.entry(code).or_insert(0) += 1;
    }
    let mut entries: Vec<(i32, usize)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    entries
        .into_iter()
        .map(|(code, count)| (label_for(code, labels), count))
        .collect()
}

/// Per-group arithmetic mean of `values`, one entry per distinct key,
/// ordered by ascending key. Keys compare by exact value.
pub fn grouped_average(keys: &[f32], values: &[f32]) -> Vec<(f32, f32)> {
    let mut pairs: Vec<(f32, f32)> = keys.iter().copied().zip(values.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let mut groups = Vec::new();
    let mut i = 0;
    while i < pairs.len() {
        let key = pairs[i].0;
        let mut sum = 0.0f64;
        let mut n = 0usize;
        while i < pairs.len() && pairs[i].0 == key {
            sum += pairs[i].1 as f64;
            n += 1;
            i += 1;
        }
        groups.push((key, (sum / n as f64) as f32));
    }
    groups
}

/// Assign each age to a half-open (lo, hi] bucket over `edges`; ages outside
/// every bucket map to `None` and are dropped from the age chart.
pub fn age_buckets(ages: &[f32], edges: &[f32]) -> Vec<Option<usize>> {
    ages.iter()
        .map(|&age| {
            edges
                .windows(2)
                .position(|w| age > w[0] && age <= w[1])
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PerformanceMetrics {
    pub mae: f32,
    pub rmse: f32,
    pub r2: f32,
}

pub fn regression_metrics(actual: &[f32], predicted: &[f32]) -> anyhow::Result<PerformanceMetrics> {
    if actual.len() != predicted.len() {
        anyhow::bail!(
            "length mismatch: {} actual values, {} predictions",
            actual.len(),
            predicted.len()
        );
    }
    let n = actual.len() as f64;
    if actual.is_empty() {
        return Ok(PerformanceMetrics {
            mae: 0.0,
            rmse: 0.0,
            r2: 0.0,
        });
    }
    let mae: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(&a, &p)| (a as f64 - p as f64).abs())
        .sum::<f64>()
        / n;
    let mse: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(&a, &p)| {
            let d = a as f64 - p as f64;
            d * d
        })
        .sum::<f64>()
        / n;
    let mean_actual: f64 = actual.iter().map(|&a| a as f64).sum::<f64>() / n;
    let ss_tot: f64 = actual
        .iter()
        .map(|&a| {
            let d = a as f64 - mean_actual;
            d * d
        })
        .sum();
    let ss_res: f64 = mse * n;
    let r2 = if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot };
    Ok(PerformanceMetrics {
        mae: mae as f32,
        rmse: mse.sqrt() as f32,
        r2: r2 as f32,
    })
}

/// Seeded index shuffle into (train, test) partitions. Disjoint, covers
/// every row, and reproducible for a fixed seed.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let mut n_test = (n as f64 * test_fraction).round() as usize;
    n_test = n_test.min(n.saturating_sub(1));
    let test = indices[..n_test].to_vec();
    let train = indices[n_test..].to_vec();
    (train, test)
}

/// Held-out evaluation of a trained model against the dataset it came from.
/// Only the offline path (trainer binary, tests) calls this.
pub fn model_performance(
    model: &ModelHandle,
    dataset: &Dataset,
    seed: u64,
) -> anyhow::Result<PerformanceMetrics> {
    let labeled = dataset.labeled_records();
    let (_, test_idx) = train_test_split(labeled.len(), 0.2, seed);
    let features: Vec<_> = test_idx.iter().map(|&i| labeled[i].0.clone()).collect();
    let actual: Vec<f32> = test_idx.iter().map(|&i| labeled[i].1).collect();
    let predicted = model.predict_batch(&features)?;
    regression_metrics(&actual, &predicted)
}

/// Ordinary least squares fit of `y = slope * x + intercept` over two
/// columns. `None` when there are fewer than two points or no x-variance.
pub fn trend_line(xs: &[f32], ys: &[f32]) -> Option<(f32, f32)> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x: f64 = xs.iter().map(|&x| x as f64).sum::<f64>() / n;
    let mean_y: f64 = ys.iter().map(|&y| y as f64).sum::<f64>() / n;
    let mut sxx = 0.0f64;
    let mut sxy = 0.0f64;
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x as f64 - mean_x;
        sxx += dx * dx;
        sxy += dx * (y as f64 - mean_y);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    Some((slope as f32, intercept as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DeliveryRecord;

    fn row(age: f32, rating: f32, vehicle: i32, order: i32, d: f32, t: f32) -> DeliveryRecord {
        DeliveryRecord {
            age,
            rating,
            vehicle,
            order,
            distance_km: d,
            delivery_time: t,
        }
    }

    #[test]
    fn summary_on_empty_table_has_absent_means() {
        let ds = Dataset::from_records(Vec::new());
        let stats = summary_statistics(&ds);
        assert_eq!(stats.total_deliveries, 0);
        assert!(stats.avg_delivery_time.is_none());
        assert!(stats.avg_distance.is_none());
        assert!(stats.avg_rating.is_none());
    }

    #[test]
    fn summary_means_are_rounded() {
        let ds = Dataset::from_records(vec![
            row(25.0, 4.0, 1, 0, 3.0, 10.0),
            row(35.0, 4.5, 2, 1, 6.0, 20.005),
        ]);
        let stats = summary_statistics(&ds);
        assert_eq!(stats.total_deliveries, 2);
        assert_eq!(stats.avg_delivery_time, Some(15.0));
        assert_eq!(stats.avg_distance, Some(4.5));
        assert_eq!(stats.avg_rating, Some(4.25));
    }

    #[test]
    fn summary_means_survive_json_conversion_exactly() {
        // 27.79 is not exactly representable; a mean rounded in a narrower
        // float would regain sub-cent digits once widened into a JSON number.
        let ds = Dataset::from_records(vec![row(25.0, 4.0, 1, 0, 3.0, 27.79)]);
        let value = serde_json::to_value(summary_statistics(&ds)).expect("serializes");
        let t = value["avg_delivery_time"].as_f64().expect("numeric mean");
        assert_eq!(t, (t * 100.0).round() / 100.0, "widened mean: {t}");
    }

    #[test]
    fn distribution_counts_sum_to_row_count() {
        let codes = vec![1, 2, 2, 3, 2, 1, 7];
        let dist = categorical_distribution(&codes, &VEHICLE_LABELS);
        let total: usize = dist.iter().map(|(_, c)| c).sum();
        assert_eq!(total, codes.len());
    }

    #[test]
    fn distribution_orders_by_count_and_falls_back_on_unknown_codes() {
        let codes = vec![1, 2, 2, 3, 2, 1, 7];
        let dist = categorical_distribution(&codes, &VEHICLE_LABELS);
        assert_eq!(dist[0], ("Scooter".to_string(), 3));
        assert_eq!(dist[1], ("Motorcycle".to_string(), 2));
        assert!(dist.contains(&("Type 7".to_string(), 1)));
    }

    #[test]
    fn grouped_average_returns_group_constants() {
        let keys = vec![2.0, 1.0, 2.0, 1.0];
        let values = vec![30.0, 10.0, 30.0, 10.0];
        let groups = grouped_average(&keys, &values);
        assert_eq!(groups, vec![(1.0, 10.0), (2.0, 30.0)]);
    }

    #[test]
    fn age_buckets_are_half_open() {
        let ages = vec![20.0, 20.5, 25.0, 26.0, 50.0, 55.0, 18.0];
        let buckets = age_buckets(&ages, &AGE_BUCKET_EDGES);
        // 20.0 sits on the open lower edge and is outside every bucket.
        assert_eq!(
            buckets,
            vec![None, Some(0), Some(0), Some(1), Some(4), None, None]
        );
    }

    #[test]
    fn trend_line_recovers_a_perfect_line() {
        let xs: Vec<f32> = (0..50).map(|i| i as f32 * 0.25).collect();
        let ys: Vec<f32> = xs.iter().map(|x| 2.0 * x + 5.0).collect();
        let (slope, intercept) = trend_line(&xs, &ys).expect("fit succeeds");
        assert!((slope - 2.0).abs() < 1e-4, "slope {slope}");
        assert!((intercept - 5.0).abs() < 1e-4, "intercept {intercept}");
    }

    #[test]
    fn trend_line_degenerate_inputs() {
        assert!(trend_line(&[1.0], &[2.0]).is_none());
        assert!(trend_line(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(trend_line(&[], &[]).is_none());
    }

    #[test]
    fn perfect_predictions_score_perfectly() {
        let actual = vec![10.0, 20.0, 30.0];
        let metrics = regression_metrics(&actual, &actual).expect("matched lengths");
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.rmse, 0.0);
        assert!((metrics.r2 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn mismatched_metric_lengths_are_an_error() {
        let err = regression_metrics(&[1.0, 2.0], &[1.0])
            .err()
            .expect("mismatch must fail");
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn split_is_disjoint_exhaustive_and_reproducible() {
        let (train_a, test_a) = train_test_split(50, 0.2, 42);
        let (train_b, test_b) = train_test_split(50, 0.2, 42);
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
        assert_eq!(test_a.len(), 10);

        let mut all: Vec<usize> = train_a.iter().chain(&test_a).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn split_keeps_at_least_one_training_row() {
        let (train, test) = train_test_split(1, 0.9, 7);
        assert_eq!(train.len(), 1);
        assert!(test.is_empty());
    }
}
