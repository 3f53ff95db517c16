use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::api::{parse_severity, valid_coords};
use crate::auth::{require_authority, AuthUser};
use crate::db::queries;
use crate::dispatch::{self, AlertPayload};
use crate::error::ApiError;
use crate::models::alert::{AlertSeverity, AlertType};
use crate::models::authority::{
    AuthorityAction, AuthorityActionType, AuthorityHazard, AuthorityProfile, AuthorityType,
    AuthorityUser, DashboardCounts, HazardActionDetail, HazardTypeCount, RecentAction,
};
use crate::models::hazard::HazardSeverity;
use crate::state::AppState;

const DEFAULT_HAZARD_LIMIT: i64 = 100;
const DEFAULT_BROADCAST_RADIUS_KM: f64 = 10.0;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/profile", get(profile))
        .route("/hazards", get(list_hazards))
        .route("/hazards/:hazard_id/action", post(take_action))
        .route("/hazards/:hazard_id/actions", get(action_history))
        .route("/dashboard/stats", get(dashboard_stats))
        .route("/broadcast-alert", post(broadcast_alert))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    authority_type: Option<String>,
    jurisdiction: Option<String>,
    badge_number: Option<String>,
    department: Option<String>,
}

async fn register(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let authority_type = req
        .authority_type
        .as_deref()
        .and_then(AuthorityType::parse)
        .ok_or_else(|| ApiError::bad_request("Invalid authority type"))?;

    let existing = sqlx::query_as::<_, AuthorityUser>(queries::SELECT_AUTHORITY_BY_USER)
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("Already registered as authority"));
    }

    let authority = sqlx::query_as::<_, AuthorityUser>(queries::INSERT_AUTHORITY)
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(authority_type.as_str())
        .bind(req.jurisdiction)
        .bind(req.badge_number)
        .bind(req.department)
        .fetch_one(&state.pool)
        .await
        .map_err(|e| ApiError::conflict_on_unique(e, "Already registered as authority"))?;

    info!(user_id = %user.user_id, authority_type = authority_type.as_str(), "authority registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Authority registration submitted. Awaiting verification.",
            "authority": authority,
        })),
    ))
}

async fn profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let profile = sqlx::query_as::<_, AuthorityProfile>(queries::SELECT_AUTHORITY_PROFILE)
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Authority profile not found"))?;

    Ok(Json(json!({ "authority": profile })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HazardListQuery {
    severity: Option<String>,
    #[serde(rename = "type")]
    hazard_type: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn list_hazards(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<HazardListQuery>,
) -> Result<Json<Value>, ApiError> {
    let authority = require_authority(&state.pool, user.user_id).await?;

    let mut builder = QueryBuilder::<Postgres>::new(queries::AUTHORITY_HAZARDS_BASE);
    if let Some(severity) = &query.severity {
        let severity = HazardSeverity::parse(severity).ok_or_else(|| {
            ApiError::bad_request("Invalid severity. Must be one of: low, medium, high, critical")
        })?;
        builder.push(" AND h.severity = ").push_bind(severity.as_str());
    }
    if let Some(hazard_type) = &query.hazard_type {
        builder.push(" AND h.type = ").push_bind(hazard_type);
    }
    let limit = query.limit.unwrap_or(DEFAULT_HAZARD_LIMIT).clamp(1, 500);
    let offset = query.offset.unwrap_or(0).max(0);
    builder
        .push(" ORDER BY h.severity DESC, h.created_at DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let hazards = builder
        .build_query_as::<AuthorityHazard>()
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(json!({
        "total": hazards.len(),
        "hazards": hazards,
        "jurisdiction": authority.jurisdiction,
    })))
}

/// Follow-up text for the hazard reporter; notes are appended verbatim.
fn reporter_alert_message(
    action: AuthorityActionType,
    hazard_type: &str,
    notes: Option<&str>,
) -> String {
    let mut message = format!(
        "Authorities have {} your {} report.",
        action.describes(),
        hazard_type
    );
    if let Some(notes) = notes {
        message.push(' ');
        message.push_str(notes);
    }
    message
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionRequest {
    action_type: Option<String>,
    notes: Option<String>,
    estimated_resolution_time: Option<DateTime<Utc>>,
}

async fn take_action(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(hazard_id): Path<Uuid>,
    Json(req): Json<ActionRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let action_type = req
        .action_type
        .as_deref()
        .and_then(AuthorityActionType::parse)
        .ok_or_else(|| ApiError::bad_request("Invalid action type"))?;
    let authority = require_authority(&state.pool, user.user_id).await?;

    let mut tx = state.pool.begin().await?;

    // 1. The hazard must exist; its reporter gets the follow-up
    let (reported_by, hazard_type) =
        sqlx::query_as::<_, (Option<Uuid>, String)>(queries::SELECT_HAZARD_REPORTER)
            .bind(hazard_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::not_found("Hazard not found"))?;

    // 2. Record the action
    let action = sqlx::query_as::<_, AuthorityAction>(queries::INSERT_AUTHORITY_ACTION)
        .bind(Uuid::new_v4())
        .bind(hazard_id)
        .bind(authority.id)
        .bind(action_type.as_str())
        .bind(&req.notes)
        .bind(req.estimated_resolution_time)
        .fetch_one(&mut *tx)
        .await?;

    // 3. Resolution closes the hazard; resolved_by tracks the acting user
    if action_type.resolves_hazard() {
        sqlx::query(queries::RESOLVE_HAZARD)
            .bind(hazard_id)
            .bind(user.user_id)
            .execute(&mut *tx)
            .await?;
    }

    // 4. Tell the reporter, unless the report was anonymous
    if let Some(reporter) = reported_by {
        let message = reporter_alert_message(action_type, &hazard_type, req.notes.as_deref());
        sqlx::query(queries::INSERT_ALERT)
            .bind(Uuid::new_v4())
            .bind(reporter)
            .bind("Authority Action on Your Report")
            .bind(&message)
            .bind(AlertType::Community.as_str())
            .bind(AlertSeverity::Info.as_str())
            .bind(hazard_id)
            .bind(json!({
                "authorityAction": action_type.as_str(),
                "authorityId": authority.id,
            }))
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!(
        %hazard_id,
        action = action_type.as_str(),
        "authority action recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Action recorded successfully",
            "action": action,
        })),
    ))
}

async fn action_history(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(hazard_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    require_authority(&state.pool, user.user_id).await?;

    let actions = sqlx::query_as::<_, HazardActionDetail>(queries::SELECT_HAZARD_ACTIONS)
        .bind(hazard_id)
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(json!({ "actions": actions })))
}

async fn dashboard_stats(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let authority = require_authority(&state.pool, user.user_id).await?;

    let statistics = sqlx::query_as::<_, DashboardCounts>(queries::AUTHORITY_DASHBOARD_STATS)
        .bind(authority.id)
        .bind(user.user_id)
        .fetch_one(&state.pool)
        .await?;
    let hazards_by_type = sqlx::query_as::<_, HazardTypeCount>(queries::ACTIVE_HAZARDS_BY_TYPE)
        .fetch_all(&state.pool)
        .await?;
    let recent_actions = sqlx::query_as::<_, RecentAction>(queries::RECENT_AUTHORITY_ACTIONS)
        .bind(authority.id)
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(json!({
        "statistics": statistics,
        "hazardsByType": hazards_by_type,
        "recentActions": recent_actions,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastRequest {
    title: Option<String>,
    message: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius_km: Option<f64>,
    severity: Option<String>,
}

async fn broadcast_alert(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<BroadcastRequest>,
) -> Result<Json<Value>, ApiError> {
    let authority = require_authority(&state.pool, user.user_id).await?;

    let (Some(title), Some(message), Some(latitude), Some(longitude)) =
        (req.title, req.message, req.latitude, req.longitude)
    else {
        return Err(ApiError::bad_request(
            "Title, message, and location are required",
        ));
    };
    let center = valid_coords(latitude, longitude)?;
    let radius_km = req.radius_km.unwrap_or(DEFAULT_BROADCAST_RADIUS_KM);
    let severity = parse_severity(req.severity.as_deref(), AlertSeverity::Warning)?;

    let recipients = dispatch::eligible_in_area(&state.pool, center, radius_km, None).await?;
    let payload = AlertPayload {
        title: format!("[OFFICIAL] {title}"),
        message,
        alert_type: AlertType::System,
        severity,
        hazard_id: None,
        metadata: Some(json!({
            "authorityBroadcast": true,
            "authorityId": authority.id,
            "authorityType": authority.authority_type,
            "location": { "latitude": center.latitude, "longitude": center.longitude },
            "radiusKm": radius_km,
        })),
    };
    let notified = dispatch::dispatch(&state.pool, &recipients, &payload).await;

    info!(notified, authority_id = %authority.id, "official broadcast dispatched");

    Ok(Json(json!({
        "message": "Alert broadcast successfully",
        "usersNotified": notified,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reporter_message_includes_notes_when_present() {
        let message = reporter_alert_message(
            AuthorityActionType::Investigating,
            "pothole",
            Some("Crew dispatched for tomorrow morning."),
        );
        assert_eq!(
            message,
            "Authorities have investigating your pothole report. Crew dispatched for tomorrow morning."
        );
    }

    #[test]
    fn reporter_message_without_notes_has_no_trailing_space() {
        let message = reporter_alert_message(AuthorityActionType::Resolved, "accident", None);
        assert_eq!(message, "Authorities have resolved your accident report.");
    }

    #[test]
    fn in_progress_reads_naturally_in_the_message() {
        let message = reporter_alert_message(AuthorityActionType::InProgress, "flooding", None);
        assert!(message.contains("in progress"));
        assert!(!message.contains("in_progress"));
    }
}
