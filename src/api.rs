//! HTTP surface: the prediction endpoint, the six chart endpoints, and the
//! summary stats feed the dashboard frontend polls.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::analytics::{self, round2};
use crate::charts::{self, ChartSpec};
use crate::dataset::Dataset;
use crate::error::ApiError;
use crate::features::FeatureRecord;
use crate::model::ModelHandle;

// ---------- Server state ----------

/// Both members are loaded once at startup and never written again, so
/// handlers share them lock-free.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ModelHandle>,
    pub dataset: Arc<Dataset>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stats", get(stats))
        .route("/api/predict", post(predict))
        .route(
            "/api/charts/delivery-time-distribution",
            get(chart_delivery_time),
        )
        .route("/api/charts/distance-vs-time", get(chart_distance_time))
        .route("/api/charts/rating-impact", get(chart_rating_impact))
        .route("/api/charts/vehicle-comparison", get(chart_vehicle))
        .route("/api/charts/order-type-analysis", get(chart_order_type))
        .route("/api/charts/age-performance", get(chart_age))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

// ---------- Prediction ----------

/// Validate a raw payload, run the model, round for display. Kept separate
/// from the axum plumbing so tests can drive it directly.
pub fn run_prediction(model: &ModelHandle, payload: &Map<String, Value>) -> Result<Value, ApiError> {
    let record = FeatureRecord::from_payload(payload)?;
    let minutes = model
        .predict(&record)
        .map_err(|e| ApiError::Prediction(e.to_string()))?;
    Ok(json!({ "success": true, "prediction": round2(minutes as f64) }))
}

async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| ApiError::InvalidField {
        name: "body",
        reason: rejection.body_text(),
    })?;
    let object = payload.as_object().ok_or_else(|| ApiError::InvalidField {
        name: "body",
        reason: "expected a JSON object".to_string(),
    })?;

    let response = run_prediction(&state.model, object)?;
    tracing::info!(prediction = %response["prediction"], "served prediction");
    Ok(Json(response))
}

// ---------- Stats ----------

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn stats(State(state): State<AppState>) -> Json<Value> {
    let dataset = &state.dataset;
    let summary = analytics::summary_statistics(dataset);
    let vehicles = distribution_object(analytics::categorical_distribution(
        &dataset.vehicles(),
        &analytics::VEHICLE_LABELS,
    ));
    let orders = distribution_object(analytics::categorical_distribution(
        &dataset.orders(),
        &analytics::ORDER_LABELS,
    ));
    Json(json!({
        "stats": summary,
        "vehicle_distribution": vehicles,
        "order_distribution": orders,
    }))
}

fn distribution_object(entries: Vec<(String, usize)>) -> Value {
    let mut map = Map::new();
    for (label, count) in entries {
        map.insert(label, json!(count));
    }
    Value::Object(map)
}

// ---------- Charts ----------

async fn chart_delivery_time(State(state): State<AppState>) -> Json<ChartSpec> {
    Json(charts::delivery_time_distribution(&state.dataset))
}

async fn chart_distance_time(State(state): State<AppState>) -> Json<ChartSpec> {
    Json(charts::distance_vs_time(&state.dataset))
}

async fn chart_rating_impact(State(state): State<AppState>) -> Json<ChartSpec> {
    Json(charts::rating_impact(&state.dataset))
}

async fn chart_vehicle(State(state): State<AppState>) -> Json<ChartSpec> {
    Json(charts::vehicle_comparison(&state.dataset))
}

async fn chart_order_type(State(state): State<AppState>) -> Json<ChartSpec> {
    Json(charts::order_type_analysis(&state.dataset))
}

async fn chart_age(State(state): State<AppState>) -> Json<ChartSpec> {
    Json(charts::age_performance(&state.dataset))
}
