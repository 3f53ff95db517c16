use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A trip is active while end_time is NULL. The start coordinate doubles as
/// the user's location proxy for every area-targeted alert.
/// Wire names keep the unit suffixes off: `totalDistance` is km,
/// `totalDuration` is minutes.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSession {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub end_latitude: Option<f64>,
    pub end_longitude: Option<f64>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(rename = "totalDistance")]
    pub total_distance_km: Option<f64>,
    #[serde(rename = "totalDuration")]
    pub total_duration_minutes: Option<i32>,
    pub hazards_encountered: i32,
    pub damage_score: f64,
    pub vehicle_type: Option<String>,
}

#[derive(Debug, FromRow)]
pub struct TripStats {
    pub total_trips: i64,
    pub total_distance_km: f64, // float8 after COALESCE
    pub total_duration_minutes: i64,
    pub hazards_encountered: i64,
    pub avg_damage_score: f64,
}
