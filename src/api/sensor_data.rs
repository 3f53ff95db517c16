use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::api::valid_coords;
use crate::auth::AuthUser;
use crate::db::queries;
use crate::error::ApiError;
use crate::models::sensor::{ImpactReading, SensorAck};
use crate::state::AppState;

const MAX_BATCH_SIZE: usize = 500;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(upload))
        .route("/upload/batch", post(upload_batch))
        .route("/impacts/:trip_id", get(impacts))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SensorReading {
    trip_id: Option<Uuid>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    accelerometer_x: Option<f64>,
    accelerometer_y: Option<f64>,
    accelerometer_z: Option<f64>,
    gyroscope_x: Option<f64>,
    gyroscope_y: Option<f64>,
    gyroscope_z: Option<f64>,
    speed: Option<f64>,
    impact_detected: Option<bool>,
}

async fn upload(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(req): Json<SensorReading>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(latitude), Some(longitude)) = (req.latitude, req.longitude) else {
        return Err(ApiError::bad_request("Latitude and longitude are required"));
    };
    let coords = valid_coords(latitude, longitude)?;

    let ack = sqlx::query_as::<_, SensorAck>(queries::INSERT_SENSOR_READING)
        .bind(Uuid::new_v4())
        .bind(req.trip_id)
        .bind(coords.latitude)
        .bind(coords.longitude)
        .bind(req.accelerometer_x)
        .bind(req.accelerometer_y)
        .bind(req.accelerometer_z)
        .bind(req.gyroscope_x)
        .bind(req.gyroscope_y)
        .bind(req.gyroscope_z)
        .bind(req.speed)
        .bind(req.impact_detected.unwrap_or(false))
        .fetch_one(&state.pool)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Sensor data uploaded successfully", "data": ack })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchRequest {
    trip_id: Option<Uuid>,
    sensor_data: Option<Vec<SensorReading>>,
}

async fn upload_batch(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(req): Json<BatchRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let readings = req.sensor_data.unwrap_or_default();
    if readings.is_empty() {
        return Err(ApiError::bad_request("Sensor data array is required"));
    }
    if readings.len() > MAX_BATCH_SIZE {
        return Err(ApiError::bad_request(
            "Too many readings in one batch (max 500)",
        ));
    }
    for reading in &readings {
        let (Some(latitude), Some(longitude)) = (reading.latitude, reading.longitude) else {
            return Err(ApiError::bad_request(
                "Every reading needs latitude and longitude",
            ));
        };
        valid_coords(latitude, longitude)?;
    }

    let now = Utc::now();
    let mut builder = QueryBuilder::<Postgres>::new(queries::INSERT_SENSOR_BATCH_BASE);
    builder.push_values(readings.iter(), |mut row, reading| {
        row.push_bind(Uuid::new_v4())
            .push_bind(req.trip_id)
            .push_bind(reading.latitude)
            .push_bind(reading.longitude)
            .push_bind(reading.accelerometer_x)
            .push_bind(reading.accelerometer_y)
            .push_bind(reading.accelerometer_z)
            .push_bind(reading.gyroscope_x)
            .push_bind(reading.gyroscope_y)
            .push_bind(reading.gyroscope_z)
            .push_bind(reading.speed)
            .push_bind(reading.impact_detected.unwrap_or(false))
            .push_bind(now);
    });

    builder.build().execute(&state.pool).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Batch sensor data uploaded successfully",
            "count": readings.len(),
        })),
    ))
}

async fn impacts(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let impacts = sqlx::query_as::<_, ImpactReading>(queries::SELECT_TRIP_IMPACTS)
        .bind(trip_id)
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(json!({ "impacts": impacts, "count": impacts.len() })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_parses_full_sensor_payload() {
        let reading: SensorReading = serde_json::from_str(
            r#"{
                "tripId": "7f3c8f64-2f0b-4a6e-9a3d-1c2b3d4e5f60",
                "latitude": 12.9,
                "longitude": 77.6,
                "accelerometerX": 0.12,
                "accelerometerY": -0.40,
                "accelerometerZ": 9.81,
                "gyroscopeX": 0.01,
                "gyroscopeY": 0.00,
                "gyroscopeZ": -0.02,
                "speed": 32.5,
                "impactDetected": true
            }"#,
        )
        .unwrap();
        assert!(reading.trip_id.is_some());
        assert_eq!(reading.impact_detected, Some(true));
        assert_eq!(reading.accelerometer_z, Some(9.81));
    }

    #[test]
    fn reading_defaults_are_all_optional() {
        let reading: SensorReading =
            serde_json::from_str(r#"{"latitude":12.9,"longitude":77.6}"#).unwrap();
        assert!(reading.trip_id.is_none());
        assert!(reading.impact_detected.is_none());
        assert!(reading.speed.is_none());
    }

    #[test]
    fn batch_request_shares_trip_id_across_samples() {
        let req: BatchRequest = serde_json::from_str(
            r#"{
                "tripId": "7f3c8f64-2f0b-4a6e-9a3d-1c2b3d4e5f60",
                "sensorData": [
                    {"latitude": 12.9, "longitude": 77.6},
                    {"latitude": 12.91, "longitude": 77.61, "impactDetected": true}
                ]
            }"#,
        )
        .unwrap();
        assert!(req.trip_id.is_some());
        assert_eq!(req.sensor_data.unwrap().len(), 2);
    }
}
