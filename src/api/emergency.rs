use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::api::valid_coords;
use crate::auth::AuthUser;
use crate::db::queries;
use crate::dispatch::{self, AlertPayload};
use crate::error::ApiError;
use crate::geo::{haversine_km, Coordinates};
use crate::models::alert::{AlertSeverity, AlertType};
use crate::models::emergency::{EmergencyContact, NearbySos, SosAlert, SosStatus, SosWithUser};
use crate::state::AppState;

/// Users with an active trip inside this radius of an SOS get notified.
const SOS_NOTIFY_RADIUS_KM: f64 = 5.0;
const DEFAULT_SOS_NEARBY_RADIUS_KM: f64 = 10.0;
const SOS_HISTORY_LIMIT: i64 = 50;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contacts", get(list_contacts).post(add_contact))
        .route(
            "/contacts/:contact_id",
            put(update_contact).delete(delete_contact),
        )
        .route("/sos", post(trigger_sos).get(list_sos))
        .route("/sos/:sos_id", patch(update_sos_status))
        .route("/sos/active/nearby", get(active_sos_nearby))
}

// ---- emergency contacts ----

async fn list_contacts(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let contacts = sqlx::query_as::<_, EmergencyContact>(queries::SELECT_EMERGENCY_CONTACTS)
        .bind(user.user_id)
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(json!({ "contacts": contacts })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactRequest {
    contact_name: Option<String>,
    contact_phone: Option<String>,
    relationship: Option<String>,
    priority: Option<i32>,
}

async fn add_contact(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ContactRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(contact_name), Some(contact_phone)) = (req.contact_name, req.contact_phone) else {
        return Err(ApiError::bad_request("Contact name and phone are required"));
    };

    let contact = sqlx::query_as::<_, EmergencyContact>(queries::INSERT_EMERGENCY_CONTACT)
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(&contact_name)
        .bind(&contact_phone)
        .bind(req.relationship)
        .bind(req.priority.unwrap_or(1))
        .fetch_one(&state.pool)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Emergency contact added", "contact": contact })),
    ))
}

async fn update_contact(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(contact_id): Path<Uuid>,
    Json(req): Json<ContactRequest>,
) -> Result<Json<Value>, ApiError> {
    let contact = sqlx::query_as::<_, EmergencyContact>(queries::UPDATE_EMERGENCY_CONTACT)
        .bind(contact_id)
        .bind(user.user_id)
        .bind(req.contact_name)
        .bind(req.contact_phone)
        .bind(req.relationship)
        .bind(req.priority)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Emergency contact not found"))?;

    Ok(Json(json!({
        "message": "Emergency contact updated",
        "contact": contact,
    })))
}

async fn delete_contact(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(contact_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    sqlx::query_scalar::<_, Uuid>(queries::DELETE_EMERGENCY_CONTACT)
        .bind(contact_id)
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Emergency contact not found"))?;

    Ok(Json(json!({ "message": "Emergency contact deleted" })))
}

// ---- sos alerts ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SosRequest {
    latitude: Option<f64>,
    longitude: Option<f64>,
    alert_type: Option<String>,
    message: Option<String>,
}

async fn trigger_sos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<SosRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(latitude), Some(longitude)) = (req.latitude, req.longitude) else {
        return Err(ApiError::bad_request(
            "Location (latitude, longitude) is required",
        ));
    };
    let center = valid_coords(latitude, longitude)?;
    let alert_type = req.alert_type.unwrap_or_else(|| "emergency".to_string());
    let message = req
        .message
        .unwrap_or_else(|| "Emergency SOS triggered".to_string());

    // 1. SOS row plus a consistent snapshot of the contact list
    let mut tx = state.pool.begin().await?;
    let sos = sqlx::query_as::<_, SosAlert>(queries::INSERT_SOS)
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(latitude)
        .bind(longitude)
        .bind(&alert_type)
        .bind(&message)
        .fetch_one(&mut *tx)
        .await?;
    let display_name = sqlx::query_scalar::<_, String>(queries::SELECT_DISPLAY_NAME)
        .bind(user.user_id)
        .fetch_one(&mut *tx)
        .await?;
    let contacts = sqlx::query_as::<_, EmergencyContact>(queries::SELECT_EMERGENCY_CONTACTS)
        .bind(user.user_id)
        .fetch_all(&mut *tx)
        .await?;
    tx.commit().await?;

    // 2. Fan out to active riders near the SOS point, never back to the
    // trigger user. Best effort per recipient.
    let recipients =
        dispatch::eligible_in_area(&state.pool, center, SOS_NOTIFY_RADIUS_KM, Some(user.user_id))
            .await?;
    let payload = AlertPayload {
        title: "Emergency SOS Alert Nearby".to_string(),
        message: format!(
            "User {display_name} has triggered an SOS alert near your location"
        ),
        alert_type: AlertType::Emergency,
        severity: AlertSeverity::Critical,
        hazard_id: None,
        metadata: Some(json!({
            "sosAlertId": sos.id,
            "sosUserId": user.user_id,
            "sosLocation": { "latitude": latitude, "longitude": longitude },
            "distance": "nearby",
        })),
    };
    let notified = dispatch::dispatch(&state.pool, &recipients, &payload).await;

    info!(sos_id = %sos.id, notified, "SOS triggered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "SOS alert triggered successfully",
            "sosAlert": sos,
            "emergencyContacts": contacts,
            "nearbyUsersNotified": notified,
            "instructions": "Emergency contacts have been notified. Help is on the way.",
        })),
    ))
}

#[derive(Debug, Deserialize)]
struct SosListQuery {
    status: Option<String>,
}

async fn list_sos(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<SosListQuery>,
) -> Result<Json<Value>, ApiError> {
    let status = query.status.unwrap_or_else(|| "active".to_string());

    // "all" drops the filter; anything else must be a known status
    let alerts = if status == "all" {
        sqlx::query_as::<_, SosAlert>(queries::SELECT_SOS_FOR_USER)
            .bind(user.user_id)
            .bind(SOS_HISTORY_LIMIT)
            .fetch_all(&state.pool)
            .await?
    } else {
        let status = SosStatus::parse(&status)
            .ok_or_else(|| ApiError::bad_request("Invalid status filter"))?;
        sqlx::query_as::<_, SosAlert>(queries::SELECT_SOS_FOR_USER_BY_STATUS)
            .bind(user.user_id)
            .bind(status.as_str())
            .bind(SOS_HISTORY_LIMIT)
            .fetch_all(&state.pool)
            .await?
    };

    Ok(Json(json!({ "sosAlerts": alerts })))
}

#[derive(Debug, Deserialize)]
struct SosStatusRequest {
    status: Option<String>,
}

async fn update_sos_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(sos_id): Path<Uuid>,
    Json(req): Json<SosStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let status = req
        .status
        .as_deref()
        .and_then(SosStatus::parse)
        .filter(SosStatus::is_terminal)
        .ok_or_else(|| {
            ApiError::bad_request("Invalid status. Must be \"resolved\" or \"cancelled\"")
        })?;

    let sos = sqlx::query_as::<_, SosAlert>(queries::UPDATE_SOS_STATUS)
        .bind(sos_id)
        .bind(user.user_id)
        .bind(status.as_str())
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("SOS alert not found"))?;

    Ok(Json(json!({
        "message": format!("SOS alert {}", status.as_str()),
        "sosAlert": sos,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NearbySosQuery {
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius_km: Option<f64>,
}

async fn active_sos_nearby(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<NearbySosQuery>,
) -> Result<Json<Value>, ApiError> {
    let (Some(latitude), Some(longitude)) = (query.latitude, query.longitude) else {
        return Err(ApiError::bad_request("Location parameters required"));
    };
    let center = valid_coords(latitude, longitude)?;
    let radius_km = query.radius_km.unwrap_or(DEFAULT_SOS_NEARBY_RADIUS_KM);

    let rows = sqlx::query_as::<_, SosWithUser>(queries::SELECT_ACTIVE_SOS_WITH_USER)
        .fetch_all(&state.pool)
        .await?;

    let mut nearby: Vec<NearbySos> = rows
        .into_iter()
        .filter_map(|row| {
            let at = Coordinates::new(row.sos.latitude, row.sos.longitude);
            let distance_km = haversine_km(center, at);
            (distance_km <= radius_km).then_some(NearbySos {
                sos: row.sos,
                display_name: row.display_name,
                phone_number: row.phone_number,
                distance_km,
            })
        })
        .collect();
    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    Ok(Json(json!({ "activeSosAlerts": nearby })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sos_at(latitude: f64, longitude: f64) -> SosAlert {
        SosAlert {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            latitude,
            longitude,
            alert_type: "emergency".to_string(),
            message: "Emergency SOS triggered".to_string(),
            status: "active".to_string(),
            triggered_at: chrono::Utc::now(),
            resolved_at: None,
        }
    }

    #[test]
    fn nearby_sos_sorts_by_distance() {
        let center = Coordinates::new(12.90, 77.60);
        let far = sos_at(12.95, 77.65);
        let near = sos_at(12.905, 77.605);

        let mut entries: Vec<NearbySos> = [far, near]
            .into_iter()
            .map(|sos| {
                let d = haversine_km(center, Coordinates::new(sos.latitude, sos.longitude));
                NearbySos {
                    sos,
                    display_name: "rider".to_string(),
                    phone_number: None,
                    distance_km: d,
                }
            })
            .collect();
        entries.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        assert!(entries[0].distance_km < entries[1].distance_km);
        assert!(entries[0].distance_km < 1.0);
    }

    #[test]
    fn terminal_status_filter_rejects_active() {
        let parsed = SosStatus::parse("active").filter(SosStatus::is_terminal);
        assert_eq!(parsed, None);
        let parsed = SosStatus::parse("resolved").filter(SosStatus::is_terminal);
        assert_eq!(parsed, Some(SosStatus::Resolved));
    }

    #[test]
    fn sos_status_message_matches_transition() {
        let status = SosStatus::Cancelled;
        assert_eq!(format!("SOS alert {}", status.as_str()), "SOS alert cancelled");
    }
}
