use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::api::{parse_severity, valid_coords};
use crate::auth::AuthUser;
use crate::db::queries;
use crate::dispatch::{self, AlertPayload};
use crate::error::ApiError;
use crate::geo::{haversine_km, Coordinates};
use crate::models::alert::{AlertResponse, AlertRow, AlertSeverity, AlertStats, AlertType};
use crate::models::hazard::{Hazard, HazardSeverity};
use crate::state::AppState;

const LIST_LIMIT: i64 = 50;
const DEFAULT_BROADCAST_RADIUS_KM: f64 = 5.0;
const DEFAULT_TRAFFIC_RADIUS_KM: f64 = 2.0;
const DEFAULT_ROUTE_BUFFER_KM: f64 = 0.5;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list))
        .route("/unread/count", get(unread_count))
        .route("/read-all", patch(mark_all_read))
        .route("/:id/read", patch(mark_read))
        .route("/proximity", get(proximity))
        .route("/broadcast", post(broadcast))
        .route("/emergency", post(emergency))
        .route("/route", post(route_check))
        .route("/weather", post(weather))
        .route("/traffic", post(traffic))
        .route("/stats", get(stats))
        .route("/cleanup", delete(cleanup))
        .route("/monitor", post(monitor))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    unread_only: Option<String>,
}

async fn list(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let sql = if query.unread_only.as_deref() == Some("true") {
        queries::SELECT_UNREAD_ALERTS
    } else {
        queries::SELECT_ALERTS
    };

    let rows = sqlx::query_as::<_, AlertRow>(sql)
        .bind(user.user_id)
        .bind(LIST_LIMIT)
        .fetch_all(&state.pool)
        .await?;
    let alerts: Vec<AlertResponse> = rows.into_iter().map(AlertResponse::from).collect();

    Ok(Json(json!({ "count": alerts.len(), "alerts": alerts })))
}

async fn unread_count(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let count = sqlx::query_scalar::<_, i64>(queries::COUNT_UNREAD_ALERTS)
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(Json(json!({ "unreadCount": count })))
}

async fn mark_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    sqlx::query_scalar::<_, Uuid>(queries::MARK_ALERT_READ)
        .bind(id)
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Alert not found"))?;
    Ok(Json(json!({ "message": "Alert marked as read" })))
}

async fn mark_all_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    sqlx::query(queries::MARK_ALL_ALERTS_READ)
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;
    Ok(Json(json!({ "message": "All alerts marked as read" })))
}

#[derive(Debug, Deserialize)]
struct ProximityQuery {
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius: Option<f64>,
}

/// Read-only proximity check against the caller's reported position; the
/// monitor endpoint is the write-side counterpart. Only high and critical
/// hazards are worth interrupting a ride for.
async fn proximity(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<ProximityQuery>,
) -> Result<Json<Value>, ApiError> {
    let (Some(latitude), Some(longitude)) = (query.latitude, query.longitude) else {
        return Err(ApiError::bad_request("Latitude and longitude are required"));
    };
    let center = valid_coords(latitude, longitude)?;
    let radius_km = query.radius.unwrap_or(dispatch::PROXIMITY_RADIUS_KM);
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(ApiError::bad_request("Radius must be a positive number"));
    }

    let hazards = sqlx::query_as::<_, Hazard>(queries::SELECT_ACTIVE_HAZARDS)
        .fetch_all(&state.pool)
        .await?;

    let mut nearby: Vec<(f64, &Hazard)> = hazards
        .iter()
        .filter_map(|hazard| {
            let severity = HazardSeverity::parse(&hazard.severity)?;
            if !severity.is_high_priority() {
                return None;
            }
            let at = Coordinates::new(hazard.latitude, hazard.longitude);
            let distance = haversine_km(center, at);
            (distance <= radius_km).then_some((distance, hazard))
        })
        .collect();
    nearby.sort_by(|a, b| a.0.total_cmp(&b.0));

    let alerts: Vec<Value> = nearby
        .into_iter()
        .map(|(distance, hazard)| {
            json!({
                "hazardId": hazard.id,
                "type": hazard.hazard_type,
                "severity": hazard.severity,
                "distance": format!("{distance:.2}"),
                "latitude": hazard.latitude,
                "longitude": hazard.longitude,
                "message": format!(
                    "{} {} detected {:.2}km ahead",
                    hazard.severity, hazard.hazard_type, distance
                ),
            })
        })
        .collect();

    Ok(Json(json!({ "alerts": alerts, "count": alerts.len() })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastRequest {
    title: Option<String>,
    message: Option<String>,
    #[serde(rename = "type")]
    alert_type: Option<String>,
    severity: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius: Option<f64>,
    hazard_id: Option<Uuid>,
    metadata: Option<Value>,
}

async fn broadcast(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(req): Json<BroadcastRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(title), Some(message), Some(alert_type), Some(latitude), Some(longitude)) = (
        req.title,
        req.message,
        req.alert_type,
        req.latitude,
        req.longitude,
    ) else {
        return Err(ApiError::bad_request(
            "Title, message, type, latitude, and longitude are required",
        ));
    };
    let alert_type = AlertType::parse(&alert_type)
        .ok_or_else(|| ApiError::bad_request("Invalid alert type"))?;
    let center = valid_coords(latitude, longitude)?;
    let radius_km = req.radius.unwrap_or(DEFAULT_BROADCAST_RADIUS_KM);
    let severity = parse_severity(req.severity.as_deref(), AlertSeverity::Warning)?;

    let recipients = dispatch::eligible_in_area(&state.pool, center, radius_km, None).await?;
    let payload = AlertPayload {
        title,
        message,
        alert_type,
        severity,
        hazard_id: req.hazard_id,
        metadata: req.metadata,
    };
    let recipient_count = dispatch::dispatch(&state.pool, &recipients, &payload).await;
    info!(recipient_count, "area broadcast dispatched");

    Ok(Json(json!({
        "message": "Broadcast alert sent",
        "recipientCount": recipient_count,
        "area": {
            "latitude": center.latitude,
            "longitude": center.longitude,
            "radius": radius_km,
        },
    })))
}

#[derive(Debug, Deserialize)]
struct EmergencyRequest {
    title: Option<String>,
    message: Option<String>,
    metadata: Option<Value>,
}

async fn emergency(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(req): Json<EmergencyRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(title), Some(message)) = (req.title, req.message) else {
        return Err(ApiError::bad_request("Title and message are required"));
    };

    let recipients = dispatch::all_active_users(&state.pool).await?;
    let payload = AlertPayload {
        title,
        message,
        alert_type: AlertType::Emergency,
        severity: AlertSeverity::Emergency,
        hazard_id: None,
        metadata: req.metadata,
    };
    let recipient_count = dispatch::dispatch(&state.pool, &recipients, &payload).await;
    info!(recipient_count, "emergency alert dispatched to all active users");

    Ok(Json(json!({
        "message": "Emergency alert sent to all active users",
        "recipientCount": recipient_count,
    })))
}

#[derive(Debug, Deserialize)]
struct RouteRequest {
    waypoints: Option<Vec<Waypoint>>,
    buffer: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Waypoint {
    latitude: f64,
    longitude: f64,
}

async fn route_check(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<RouteRequest>,
) -> Result<Json<Value>, ApiError> {
    let waypoints = req.waypoints.unwrap_or_default();
    if waypoints.len() < 2 {
        return Err(ApiError::bad_request("At least 2 waypoints are required"));
    }
    let coords: Vec<Coordinates> = waypoints
        .iter()
        .map(|w| valid_coords(w.latitude, w.longitude))
        .collect::<Result<_, _>>()?;
    let buffer_km = req.buffer.unwrap_or(DEFAULT_ROUTE_BUFFER_KM);
    if !buffer_km.is_finite() || buffer_km <= 0.0 {
        return Err(ApiError::bad_request("Buffer must be a positive number"));
    }

    let found = dispatch::check_route(&state.pool, user.user_id, &coords, buffer_km).await?;

    Ok(Json(json!({
        "hazards": found,
        "count": found.len(),
        "route": { "waypoints": waypoints, "buffer": buffer_km },
    })))
}

#[derive(Debug, Deserialize)]
struct AffectedArea {
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeatherRequest {
    title: Option<String>,
    message: Option<String>,
    severity: Option<String>,
    affected_area: Option<AffectedArea>,
    metadata: Option<Value>,
}

async fn weather(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(req): Json<WeatherRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(title), Some(message), Some(area)) = (req.title, req.message, req.affected_area)
    else {
        return Err(ApiError::bad_request(
            "Title, message, and affected area are required",
        ));
    };
    let (Some(latitude), Some(longitude), Some(radius_km)) =
        (area.latitude, area.longitude, area.radius)
    else {
        return Err(ApiError::bad_request(
            "Affected area must include latitude, longitude, and radius",
        ));
    };
    let center = valid_coords(latitude, longitude)?;
    let severity = parse_severity(req.severity.as_deref(), AlertSeverity::Warning)?;

    let recipients = dispatch::eligible_in_area(&state.pool, center, radius_km, None).await?;
    let payload = AlertPayload {
        title,
        message,
        alert_type: AlertType::Weather,
        severity,
        hazard_id: None,
        metadata: req.metadata,
    };
    let recipient_count = dispatch::dispatch(&state.pool, &recipients, &payload).await;

    Ok(Json(json!({
        "message": "Weather alert sent",
        "recipientCount": recipient_count,
        "affectedArea": {
            "latitude": center.latitude,
            "longitude": center.longitude,
            "radius": radius_km,
        },
    })))
}

#[derive(Debug, Deserialize)]
struct AlertLocation {
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrafficRequest {
    title: Option<String>,
    message: Option<String>,
    location: Option<AlertLocation>,
    severity: Option<String>,
    estimated_delay: Option<Value>,
    metadata: Option<Value>,
}

async fn traffic(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Json(req): Json<TrafficRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(title), Some(message), Some(location)) = (req.title, req.message, req.location)
    else {
        return Err(ApiError::bad_request(
            "Title, message, and location are required",
        ));
    };
    let (Some(latitude), Some(longitude)) = (location.latitude, location.longitude) else {
        return Err(ApiError::bad_request(
            "Location must include latitude and longitude",
        ));
    };
    let center = valid_coords(latitude, longitude)?;
    let radius_km = location.radius.unwrap_or(DEFAULT_TRAFFIC_RADIUS_KM);
    let severity = parse_severity(req.severity.as_deref(), AlertSeverity::Info)?;

    // estimatedDelay rides along inside the metadata object.
    let mut metadata = match req.metadata {
        Some(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    if let Some(delay) = &req.estimated_delay {
        metadata.insert("estimatedDelay".to_string(), delay.clone());
    }

    let recipients = dispatch::eligible_in_area(&state.pool, center, radius_km, None).await?;
    let payload = AlertPayload {
        title,
        message,
        alert_type: AlertType::Traffic,
        severity,
        hazard_id: None,
        metadata: Some(Value::Object(metadata)),
    };
    let recipient_count = dispatch::dispatch(&state.pool, &recipients, &payload).await;

    Ok(Json(json!({
        "message": "Traffic alert sent",
        "recipientCount": recipient_count,
        "location": {
            "latitude": center.latitude,
            "longitude": center.longitude,
            "radius": radius_km,
        },
        "estimatedDelay": req.estimated_delay,
    })))
}

async fn stats(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<AlertStats>, ApiError> {
    let stats = sqlx::query_as::<_, AlertStats>(queries::SELECT_ALERT_STATS)
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;
    Ok(Json(stats))
}

async fn cleanup(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let result = sqlx::query(queries::DELETE_OLD_READ_ALERTS)
        .bind(user.user_id)
        .execute(&state.pool)
        .await?;
    Ok(Json(json!({
        "message": "Old alerts cleaned up",
        "deletedCount": result.rows_affected(),
    })))
}

async fn monitor(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let report = dispatch::monitor_active_trips(&state.pool).await?;
    info!(
        trips = report.trips_monitored,
        alerts = report.alerts_created,
        "proximity monitor pass completed"
    );
    Ok(Json(json!({
        "message": "Monitoring pass completed",
        "report": report,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_request_parses_waypoint_list() {
        let req: RouteRequest = serde_json::from_str(
            r#"{
                "waypoints": [
                    {"latitude": 12.90, "longitude": 77.60},
                    {"latitude": 12.95, "longitude": 77.65}
                ],
                "buffer": 1.5
            }"#,
        )
        .unwrap();
        let waypoints = req.waypoints.unwrap();
        assert_eq!(waypoints.len(), 2);
        assert_eq!(req.buffer, Some(1.5));
    }

    #[test]
    fn unread_only_flag_is_string_typed() {
        let query: ListQuery = serde_json::from_str(r#"{"unreadOnly":"true"}"#).unwrap();
        assert_eq!(query.unread_only.as_deref(), Some("true"));
    }

    #[test]
    fn traffic_request_accepts_nested_location_and_delay() {
        let req: TrafficRequest = serde_json::from_str(
            r#"{
                "title": "Jam on ORR",
                "message": "Expect slow traffic near Marathahalli",
                "location": {"latitude": 12.95, "longitude": 77.70},
                "estimatedDelay": "25 minutes",
                "metadata": {"source": "control-room"}
            }"#,
        )
        .unwrap();
        let location = req.location.unwrap();
        assert_eq!(location.latitude, Some(12.95));
        assert!(location.radius.is_none());
        assert_eq!(req.estimated_delay, Some(Value::from("25 minutes")));
    }

    #[test]
    fn weather_request_requires_nested_affected_area() {
        let req: WeatherRequest = serde_json::from_str(
            r#"{
                "title": "Heavy Rain Warning",
                "message": "Waterlogging expected on low-lying roads",
                "affectedArea": {"latitude": 12.9, "longitude": 77.6, "radius": 8.0}
            }"#,
        )
        .unwrap();
        let area = req.affected_area.unwrap();
        assert_eq!(area.radius, Some(8.0));
        assert!(req.severity.is_none());
    }
}
