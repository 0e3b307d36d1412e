//! Prediction Service Wire Types
//!
//! Request and response bodies exchanged with the prediction service.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ============================================
// Requests
// ============================================

/// Tabular prediction request, also the form record edited by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    /// Free-text origin identifier
    pub origin: String,
    /// Free-text destination identifier
    pub destination: String,
    /// Trip distance in kilometres
    pub distance_km: f64,
    /// Traffic density on a 0-1 scale
    pub traffic_density: f64,
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Hour of day (0-23)
    pub hour: u8,
    /// Day of week (0 = Monday)
    pub day_of_week: u8,
    /// Month (1-12)
    pub month: u8,
    #[serde(with = "int_flag")]
    pub is_holiday: bool,
    #[serde(with = "int_flag")]
    pub is_weekend: bool,
}

impl Default for PredictionRequest {
    fn default() -> Self {
        Self {
            origin: String::new(),
            destination: String::new(),
            distance_km: 0.0,
            traffic_density: 0.5,
            temperature: 20.0,
            hour: 12,
            day_of_week: 2,
            month: 6,
            is_holiday: false,
            is_weekend: false,
        }
    }
}

/// City prediction request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityRequest {
    pub city: String,
}

/// The service models its flags as integers, so booleans travel as 0/1.
mod int_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}

// ============================================
// Responses
// ============================================

/// Feature name to importance weight, in the order the service sent them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureImportance(Vec<(String, f64)>);

impl FeatureImportance {
    pub fn new(entries: Vec<(String, f64)>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Weight for a single feature, if present
    pub fn weight(&self, feature: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(name, _)| name == feature)
            .map(|(_, weight)| *weight)
    }
}

impl Serialize for FeatureImportance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, weight) in &self.0 {
            map.serialize_entry(name, weight)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FeatureImportance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = FeatureImportance;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of feature name to numeric weight")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, weight)) = access.next_entry::<String, f64>()? {
                    entries.push((name, weight));
                }
                Ok(FeatureImportance(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// Keys checked, in order, for the scalar prediction
pub const PREDICTION_KEYS: &[&str] = &[
    "predicted_duration",
    "predicted_travel_time",
    "predicted_energy_consumption",
];

/// Scalar prediction returned by `POST /predict`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted: f64,
}

impl Prediction {
    /// Extract the prediction from a response body.
    ///
    /// Known keys win; otherwise the first numeric field of the object, in
    /// the order the service sent them, is used.
    pub fn from_body(body: &serde_json::Value) -> Option<Self> {
        let object = body.as_object()?;

        PREDICTION_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(|v| v.as_f64()))
            .or_else(|| object.values().find_map(|v| v.as_f64()))
            .map(|predicted| Self { predicted })
    }
}

/// Geolocated congestion result from `POST /api/predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub lat: f64,
    pub lon: f64,
    pub jam_factor: f64,
}

/// Body of `GET /optimize`
#[derive(Debug, Deserialize)]
pub(crate) struct StrategiesResponse {
    #[serde(default)]
    pub optimization_strategies: Vec<String>,
}

/// Body of `GET /`
#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feature_importance_keeps_key_order() {
        let body = r#"{"water_consumption": 0.1, "hour": 0.5, "air_quality_index": 0.4}"#;
        let importance: FeatureImportance = serde_json::from_str(body).unwrap();

        let names: Vec<&str> = importance.entries().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["water_consumption", "hour", "air_quality_index"]);
        assert_eq!(importance.weight("hour"), Some(0.5));
    }

    #[test]
    fn test_feature_importance_rejects_non_numeric() {
        let result: Result<FeatureImportance, _> = serde_json::from_str(r#"{"hour": "high"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_request_flags_serialize_as_ints() {
        let request = PredictionRequest {
            is_weekend: true,
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["is_weekend"], json!(1));
        assert_eq!(value["is_holiday"], json!(0));
        assert_eq!(value["hour"], json!(12));
    }

    #[test]
    fn test_prediction_prefers_known_key() {
        let body = json!({"confidence": 0.9, "predicted_duration": 42.5});
        assert_eq!(Prediction::from_body(&body).unwrap().predicted, 42.5);
    }

    #[test]
    fn test_prediction_falls_back_to_first_number() {
        let body = json!({"label": "ok", "value": 7});
        assert_eq!(Prediction::from_body(&body).unwrap().predicted, 7.0);
    }

    #[test]
    fn test_prediction_fallback_follows_response_order() {
        let body: serde_json::Value =
            serde_json::from_str(r#"{"value": 7, "confidence": 0.9}"#).unwrap();
        assert_eq!(Prediction::from_body(&body).unwrap().predicted, 7.0);
    }

    #[test]
    fn test_prediction_missing() {
        assert!(Prediction::from_body(&json!({"label": "none"})).is_none());
        assert!(Prediction::from_body(&json!([1, 2])).is_none());
    }
}
