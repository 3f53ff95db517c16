use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::api::valid_coords;
use crate::auth::AuthUser;
use crate::db::queries;
use crate::error::ApiError;
use crate::geo::{haversine_km, Coordinates};
use crate::models::trip::{TripSession, TripStats};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: i64 = 20;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/start", post(start))
        .route("/:id/end", post(end))
        .route("/history", get(history))
        .route("/stats", get(stats))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartRequest {
    start_latitude: Option<f64>,
    start_longitude: Option<f64>,
    vehicle_type: Option<String>,
}

async fn start(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<StartRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(latitude), Some(longitude)) = (req.start_latitude, req.start_longitude) else {
        return Err(ApiError::bad_request(
            "Start latitude and longitude are required",
        ));
    };
    let coords = valid_coords(latitude, longitude)?;

    let trip = sqlx::query_as::<_, TripSession>(queries::INSERT_TRIP_SESSION)
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(coords.latitude)
        .bind(coords.longitude)
        .bind(&req.vehicle_type)
        .fetch_one(&state.pool)
        .await?;

    info!(trip_id = %trip.id, user_id = %user.user_id, "trip started");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Trip started successfully",
            "trip": {
                "id": trip.id,
                "startLatitude": trip.start_latitude,
                "startLongitude": trip.start_longitude,
                "vehicleType": trip.vehicle_type,
                "startTime": trip.start_time,
            },
        })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndRequest {
    end_latitude: Option<f64>,
    end_longitude: Option<f64>,
    total_distance: Option<f64>,
    total_duration: Option<i32>,
}

async fn end(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<EndRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(latitude), Some(longitude)) = (req.end_latitude, req.end_longitude) else {
        return Err(ApiError::bad_request(
            "End latitude and longitude are required",
        ));
    };
    let end_coords = valid_coords(latitude, longitude)?;

    let open = sqlx::query_as::<_, TripSession>(queries::SELECT_TRIP_FOR_END)
        .bind(id)
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Trip not found"))?;

    // Straight-line fallback when the client didn't track distance itself;
    // duration falls back to the elapsed wall clock inside the UPDATE.
    let distance_km = req.total_distance.unwrap_or_else(|| {
        haversine_km(
            Coordinates::new(open.start_latitude, open.start_longitude),
            end_coords,
        )
    });

    let trip = sqlx::query_as::<_, TripSession>(queries::END_TRIP_SESSION)
        .bind(id)
        .bind(user.user_id)
        .bind(end_coords.latitude)
        .bind(end_coords.longitude)
        .bind(distance_km)
        .bind(req.total_duration)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Trip not found"))?;

    info!(trip_id = %trip.id, "trip ended");

    Ok(Json(json!({
        "message": "Trip ended successfully",
        "trip": {
            "id": trip.id,
            "startLatitude": trip.start_latitude,
            "startLongitude": trip.start_longitude,
            "endLatitude": trip.end_latitude,
            "endLongitude": trip.end_longitude,
            "totalDistance": trip.total_distance_km,
            "totalDuration": trip.total_duration_minutes,
            "hazardsEncountered": trip.hazards_encountered,
            "damageScore": trip.damage_score,
            "startTime": trip.start_time,
            "endTime": trip.end_time,
        },
    })))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn history(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let trips = sqlx::query_as::<_, TripSession>(queries::SELECT_TRIP_HISTORY)
        .bind(user.user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(json!({ "trips": trips, "count": trips.len() })))
}

async fn stats(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let stats = sqlx::query_as::<_, TripStats>(queries::SELECT_TRIP_STATS)
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;

    Ok(Json(json!({
        "totalTrips": stats.total_trips,
        "totalDistance": format!("{:.2}", stats.total_distance_km),
        "totalDuration": stats.total_duration_minutes,
        "totalHazardsEncountered": stats.hazards_encountered,
        "avgDamageScore": format!("{:.2}", stats.avg_damage_score),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_request_maps_camel_case() {
        let req: StartRequest = serde_json::from_str(
            r#"{"startLatitude":12.9,"startLongitude":77.6,"vehicleType":"car"}"#,
        )
        .unwrap();
        assert_eq!(req.start_latitude, Some(12.9));
        assert_eq!(req.vehicle_type.as_deref(), Some("car"));
    }

    #[test]
    fn end_request_distance_and_duration_are_optional() {
        let req: EndRequest =
            serde_json::from_str(r#"{"endLatitude":12.91,"endLongitude":77.61}"#).unwrap();
        assert!(req.total_distance.is_none());
        assert!(req.total_duration.is_none());
    }

    #[test]
    fn trip_session_serializes_wire_names() {
        let trip = TripSession {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            start_latitude: 12.9,
            start_longitude: 77.6,
            end_latitude: None,
            end_longitude: None,
            start_time: chrono::Utc::now(),
            end_time: None,
            total_distance_km: Some(4.2),
            total_duration_minutes: Some(17),
            hazards_encountered: 0,
            damage_score: 0.0,
            vehicle_type: Some("car".to_string()),
        };
        let value = serde_json::to_value(&trip).unwrap();
        assert_eq!(value["totalDistance"], 4.2);
        assert_eq!(value["totalDuration"], 17);
        assert!(value.get("userId").is_none());
        assert!(value.get("totalDistanceKm").is_none());
    }
}
