//! Chart-specification builders. Each produces a plotly-shaped figure
//! (`{"data": [...traces], "layout": {...}}`) as plain JSON; rendering is the
//! frontend's job.

use serde::Serialize;
use serde_json::{json, Value};

use crate::analytics::{
    age_buckets, grouped_average, label_for, trend_line, AGE_BUCKET_EDGES, AGE_BUCKET_LABELS,
    ORDER_LABELS, VEHICLE_LABELS,
};
use crate::dataset::Dataset;

const COLOR_PRIMARY: &str = "#667eea";
const COLOR_ACCENT: &str = "#f093fb";
const TEMPLATE: &str = "plotly_white";

#[derive(Debug, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Value>,
    pub layout: Value,
}

fn layout(title: &str, x_title: &str, y_title: &str) -> Value {
    json!({
        "title": { "text": title },
        "xaxis": { "title": { "text": x_title } },
        "yaxis": { "title": { "text": y_title } },
        "template": TEMPLATE,
    })
}

/// Histogram of observed delivery times, 30 bins.
pub fn delivery_time_distribution(dataset: &Dataset) -> ChartSpec {
    ChartSpec {
        data: vec![json!({
            "type": "histogram",
            "x": dataset.delivery_times(),
            "nbinsx": 30,
            "marker": { "color": COLOR_PRIMARY },
        })],
        layout: {
            let mut l = layout(
                "Delivery Time Distribution",
                "Delivery Time (minutes)",
                "Frequency",
            );
            l["showlegend"] = json!(false);
            l
        },
    }
}

/// Scatter of distance against time with a least-squares trend overlay.
/// Degenerate tables (under two points, or zero distance variance) get the
/// scatter alone.
pub fn distance_vs_time(dataset: &Dataset) -> ChartSpec {
    let distances = dataset.distances();
    let times = dataset.delivery_times();
    let fit = trend_line(&distances, &times);

    let mut data = vec![json!({
        "type": "scatter",
        "mode": "markers",
        "name": "Deliveries",
        "x": distances,
        "y": times,
        "marker": { "color": COLOR_ACCENT },
    })];

    if let Some((slope, intercept)) = fit {
        let mut xs = dataset.distances();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let ys: Vec<f32> = xs.iter().map(|x| slope * x + intercept).collect();
        data.push(json!({
            "type": "scatter",
            "mode": "lines",
            "name": "Trend",
            "x": xs,
            "y": ys,
            "line": { "color": COLOR_PRIMARY, "width": 3 },
        }));
    }

    ChartSpec {
        data,
        layout: layout("Distance vs Delivery Time", "Distance (km)", "Time (min)"),
    }
}

/// Mean delivery time per courier rating value.
pub fn rating_impact(dataset: &Dataset) -> ChartSpec {
    let groups = grouped_average(&dataset.ratings(), &dataset.delivery_times());
    let ratings: Vec<f32> = groups.iter().map(|(r, _)| *r).collect();
    let averages: Vec<f32> = groups.iter().map(|(_, t)| *t).collect();
    ChartSpec {
        data: vec![json!({
            "type": "bar",
            "x": ratings,
            "y": averages,
            "marker": { "color": averages, "colorscale": "Viridis" },
        })],
        layout: layout("Average Delivery Time by Rating", "Rating", "Avg Time (min)"),
    }
}

/// Mean delivery time per vehicle type.
pub fn vehicle_comparison(dataset: &Dataset) -> ChartSpec {
    let keys: Vec<f32> = dataset.vehicles().iter().map(|&c| c as f32).collect();
    let groups = grouped_average(&keys, &dataset.delivery_times());
    let labels: Vec<String> = groups
        .iter()
        .map(|(code, _)| label_for(*code as i32, &VEHICLE_LABELS))
        .collect();
    let averages: Vec<f32> = groups.iter().map(|(_, t)| *t).collect();
    ChartSpec {
        data: vec![json!({
            "type": "bar",
            "name": "Avg Time",
            "x": labels,
            "y": averages,
            "marker": { "color": COLOR_PRIMARY },
        })],
        layout: layout(
            "Average Delivery Time by Vehicle Type",
            "Vehicle Type",
            "Average Time (minutes)",
        ),
    }
}

/// Share of mean delivery time per order type, as a pie.
pub fn order_type_analysis(dataset: &Dataset) -> ChartSpec {
    let keys: Vec<f32> = dataset.orders().iter().map(|&c| c as f32).collect();
    let groups = grouped_average(&keys, &dataset.delivery_times());
    let labels: Vec<String> = groups
        .iter()
        .map(|(code, _)| label_for(*code as i32, &ORDER_LABELS))
        .collect();
    let averages: Vec<f32> = groups.iter().map(|(_, t)| *t).collect();
    ChartSpec {
        data: vec![json!({
            "type": "pie",
            "labels": labels,
            "values": averages,
        })],
        layout: json!({
            "title": { "text": "Delivery Time Distribution by Order Type" },
            "template": TEMPLATE,
        }),
    }
}

/// Mean delivery time per age bucket; empty buckets and out-of-range ages
/// are dropped.
pub fn age_performance(dataset: &Dataset) -> ChartSpec {
    let buckets = age_buckets(&dataset.ages(), &AGE_BUCKET_EDGES);
    let times = dataset.delivery_times();

    let mut sums = vec![0.0f64; AGE_BUCKET_LABELS.len()];
    let mut counts = vec![0usize; AGE_BUCKET_LABELS.len()];
    for (bucket, &time) in buckets.iter().zip(&times) {
        if let Some(i) = bucket {
            sums[*i] += time as f64;
            counts[*i] += 1;
        }
    }

    let mut labels = Vec::new();
    let mut averages = Vec::new();
    for (i, label) in AGE_BUCKET_LABELS.iter().enumerate() {
        if counts[i] > 0 {
            labels.push(label.to_string());
            averages.push((sums[i] / counts[i] as f64) as f32);
        }
    }

    ChartSpec {
        data: vec![json!({
            "type": "scatter",
            "mode": "lines+markers",
            "x": labels,
            "y": averages,
            "line": { "color": COLOR_ACCENT },
        })],
        layout: layout("Delivery Time by Age Group", "Age Group", "Avg Time (min)"),
    }
}
