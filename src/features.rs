//! The feature contract: the five input fields the regressor was trained on,
//! in the exact column order used at training time.

use serde_json::{Map, Value};

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Real,
    Integer,
}

/// One entry of the feature contract. `range` is informational only; values
/// outside it are accepted and passed through to the model unchanged.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Key expected in the request payload.
    pub name: &'static str,
    /// Column name in the training dataset.
    pub column: &'static str,
    pub kind: FieldKind,
    pub range: Option<(f32, f32)>,
}

/// Training column order. Reordering this silently produces wrong
/// predictions; nothing downstream can detect it.
pub const FEATURE_FIELDS: [FieldSpec; 5] = [
    FieldSpec {
        name: "age",
        column: "Delivery_person_Age",
        kind: FieldKind::Real,
        range: Some((0.0, f32::MAX)),
    },
    FieldSpec {
        name: "rating",
        column: "Delivery_person_Ratings",
        kind: FieldKind::Real,
        range: Some((1.0, 5.0)),
    },
    FieldSpec {
        name: "vehicle",
        column: "Type_of_vehicle",
        kind: FieldKind::Integer,
        range: Some((1.0, 3.0)),
    },
    FieldSpec {
        name: "order",
        column: "Type_of_order",
        kind: FieldKind::Integer,
        range: Some((0.0, 3.0)),
    },
    FieldSpec {
        name: "distance",
        column: "Distance_km",
        kind: FieldKind::Real,
        range: Some((0.0, f32::MAX)),
    },
];

pub const FEATURE_COUNT: usize = FEATURE_FIELDS.len();

pub fn required_fields() -> &'static [FieldSpec] {
    &FEATURE_FIELDS
}

/// A validated prediction input. Only constructed through `from_payload` or
/// the dataset loader, so a value of this type always has all five fields.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub age: f32,
    pub rating: f32,
    pub vehicle: i32,
    pub order: i32,
    pub distance_km: f32,
}

impl FeatureRecord {
    /// Feature values in training column order.
    pub fn as_vector(&self) -> Vec<f32> {
        vec![
            self.age,
            self.rating,
            self.vehicle as f32,
            self.order as f32,
            self.distance_km,
        ]
    }

    /// Parse-and-validate a raw request payload into a typed record.
    ///
    /// Type conversion is the only check: real fields accept any JSON number
    /// or a numeric string, integer fields truncate fractional numbers toward
    /// zero and parse integral strings. No range enforcement; out-of-range
    /// codes flow through to the model.
    pub fn from_payload(payload: &Map<String, Value>) -> Result<Self, ApiError> {
        Ok(Self {
            age: real_field(payload, "age")?,
            rating: real_field(payload, "rating")?,
            vehicle: int_field(payload, "vehicle")?,
            order: int_field(payload, "order")?,
            distance_km: real_field(payload, "distance")?,
        })
    }
}

fn real_field(payload: &Map<String, Value>, name: &'static str) -> Result<f32, ApiError> {
    let value = payload.get(name).ok_or(ApiError::MissingField(name))?;
    match value {
        Value::Number(n) => n.as_f64().map(|x| x as f32).ok_or_else(|| ApiError::InvalidField {
            name,
            reason: format!("`{n}` is not representable as a real number"),
        }),
        Value::String(s) => s.trim().parse::<f32>().map_err(|_| ApiError::InvalidField {
            name,
            reason: format!("`{s}` is not a number"),
        }),
        other => Err(ApiError::InvalidField {
            name,
            reason: format!("expected a number, got {other}"),
        }),
    }
}

fn int_field(payload: &Map<String, Value>, name: &'static str) -> Result<i32, ApiError> {
    let value = payload.get(name).ok_or(ApiError::MissingField(name))?;
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(|x| x.trunc() as i32)
            .ok_or_else(|| ApiError::InvalidField {
                name,
                reason: format!("`{n}` is not representable as an integer code"),
            }),
        Value::String(s) => s.trim().parse::<i32>().map_err(|_| ApiError::InvalidField {
            name,
            reason: format!("`{s}` is not an integer code"),
        }),
        other => Err(ApiError::InvalidField {
            name,
            reason: format!("expected an integer code, got {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(v: Value) -> Map<String, Value> {
        v.as_object().expect("fixture must be an object").clone()
    }

    #[test]
    fn parses_a_full_payload() {
        let p = payload(json!({
            "age": 30, "rating": 4.5, "distance": 10.5, "vehicle": 2, "order": 1
        }));
        let rec = FeatureRecord::from_payload(&p).expect("valid payload");
        assert_eq!(
            rec,
            FeatureRecord {
                age: 30.0,
                rating: 4.5,
                vehicle: 2,
                order: 1,
                distance_km: 10.5
            }
        );
        assert_eq!(rec.as_vector(), vec![30.0, 4.5, 2.0, 1.0, 10.5]);
    }

    #[test]
    fn every_field_is_required() {
        let full = json!({
            "age": 30, "rating": 4.5, "distance": 10.5, "vehicle": 2, "order": 1
        });
        for spec in required_fields() {
            let mut p = payload(full.clone());
            p.remove(spec.name);
            let err = FeatureRecord::from_payload(&p).expect_err("missing field must fail");
            assert!(
                err.to_string().contains(spec.name),
                "error for `{}` should name the field: {err}",
                spec.name
            );
        }
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let p = payload(json!({
            "age": "30", "rating": "4.5", "distance": " 10.5 ", "vehicle": "2", "order": "1"
        }));
        let rec = FeatureRecord::from_payload(&p).expect("numeric strings convert");
        assert_eq!(rec.vehicle, 2);
        assert_eq!(rec.distance_km, 10.5);
    }

    #[test]
    fn fractional_codes_truncate_toward_zero() {
        let p = payload(json!({
            "age": 30, "rating": 4.5, "distance": 10.5, "vehicle": 2.9, "order": 1.2
        }));
        let rec = FeatureRecord::from_payload(&p).expect("fractional codes truncate");
        assert_eq!(rec.vehicle, 2);
        assert_eq!(rec.order, 1);
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        let p = payload(json!({
            "age": 30, "rating": "fast", "distance": 10.5, "vehicle": 2, "order": 1
        }));
        let err = FeatureRecord::from_payload(&p).expect_err("junk rating must fail");
        assert!(err.to_string().contains("rating"));

        let p = payload(json!({
            "age": 30, "rating": 4.5, "distance": 10.5, "vehicle": [2], "order": 1
        }));
        let err = FeatureRecord::from_payload(&p).expect_err("array vehicle must fail");
        assert!(err.to_string().contains("vehicle"));
    }

    #[test]
    fn out_of_range_codes_pass_through() {
        // Range metadata is informational; an unknown code still parses.
        let p = payload(json!({
            "age": 30, "rating": 4.5, "distance": 10.5, "vehicle": 9, "order": 7
        }));
        let rec = FeatureRecord::from_payload(&p).expect("permissive on codes");
        assert_eq!(rec.vehicle, 9);
        assert_eq!(rec.order, 7);
    }

    #[test]
    fn contract_order_matches_training_columns() {
        let columns: Vec<&str> = FEATURE_FIELDS.iter().map(|f| f.column).collect();
        assert_eq!(
            columns,
            vec![
                "Delivery_person_Age",
                "Delivery_person_Ratings",
                "Type_of_vehicle",
                "Type_of_order",
                "Distance_km"
            ]
        );
    }
}
