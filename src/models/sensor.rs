use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One impact-flagged sample from the per-trip impact listing. Gyroscope
/// axes are stored but not part of this view.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactReading {
    pub id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub accelerometer_x: Option<f64>,
    pub accelerometer_y: Option<f64>,
    pub accelerometer_z: Option<f64>,
    pub speed: Option<f64>,
    #[serde(rename = "timestamp")]
    pub recorded_at: DateTime<Utc>,
}

/// Acknowledgement returned after an upload.
#[derive(Debug, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorAck {
    pub id: Uuid,
    pub impact_detected: bool,
    #[serde(rename = "timestamp")]
    pub recorded_at: DateTime<Utc>,
}
