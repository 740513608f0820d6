use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::CongestionLevel;

pub const RUN_PREDICTION_PATH: &str = "/api/run-prediction";
pub const REALTIME_PATH: &str = "/api/realtime";
pub const DATA_PATH: &str = "/api/data";

/// One prediction snapshot as produced by the predictor. Values keep whatever
/// JSON type the CSV cell carried, so numeric columns may arrive as numbers or
/// strings; absent columns deserialize to `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(default)]
    pub timestamp: Value,
    #[serde(default)]
    pub congestion_level: Value,
    #[serde(default)]
    pub flow_weighted_pred: Value,
    #[serde(default)]
    pub avg_speed: Value,
    #[serde(default)]
    pub green_time: Value,
    #[serde(default)]
    pub temp: Value,
    #[serde(default)]
    pub rain: Value,
    #[serde(default)]
    pub motorbike_count: Value,
    #[serde(default)]
    pub car_count: Value,
    #[serde(default)]
    pub event_flag: Value,
    #[serde(default)]
    pub is_holiday: Value,
    /// Feature columns the dashboard does not render (`bus_count`, `minute`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PredictionRecord {
    /// Raw congestion label, or an empty string when the column is not text.
    pub fn level_label(&self) -> &str {
        self.congestion_level.as_str().unwrap_or_default()
    }

    pub fn level(&self) -> CongestionLevel {
        CongestionLevel::from_label(self.level_label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPredictionResponse {
    pub message: String,
    #[serde(default)]
    pub stdout: String,
}
