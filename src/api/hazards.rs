use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::api::valid_coords;
use crate::auth::AuthUser;
use crate::db::queries;
use crate::error::ApiError;
use crate::geo::{haversine_km, Coordinates};
use crate::models::hazard::{Hazard, HazardResponse, HazardSeverity, HazardWithReporter};
use crate::state::AppState;

const DEFAULT_NEARBY_RADIUS_KM: f64 = 5.0;
const DEFAULT_LIST_LIMIT: i64 = 100;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/report", post(report))
        .route("/", get(list))
        .route("/nearby", get(nearby))
        .route("/:id", get(get_by_id))
        .route("/:id/verify", post(verify))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportRequest {
    #[serde(rename = "type")]
    hazard_type: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    severity: Option<String>,
    confidence: Option<f64>,
    description: Option<String>,
    image_url: Option<String>,
}

async fn report(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<ReportRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(hazard_type), Some(latitude), Some(longitude), Some(severity)) =
        (req.hazard_type, req.latitude, req.longitude, req.severity)
    else {
        return Err(ApiError::bad_request(
            "Type, latitude, longitude, and severity are required",
        ));
    };
    let coords = valid_coords(latitude, longitude)?;
    let severity = HazardSeverity::parse(&severity).ok_or_else(|| {
        ApiError::bad_request("Invalid severity. Must be one of: low, medium, high, critical")
    })?;
    // Detection clients may report a model confidence; 0.5 is the no-vote
    // baseline of the community score otherwise.
    let confidence = req
        .confidence
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(0.5);

    let hazard = sqlx::query_as::<_, Hazard>(queries::INSERT_HAZARD)
        .bind(Uuid::new_v4())
        .bind(user.user_id)
        .bind(&hazard_type)
        .bind(coords.latitude)
        .bind(coords.longitude)
        .bind(severity.as_str())
        .bind(confidence)
        .bind(&req.image_url)
        .bind(&req.description)
        .fetch_one(&state.pool)
        .await?;

    info!(hazard_id = %hazard.id, severity = severity.as_str(), "hazard reported");

    let response = HazardResponse::from(HazardWithReporter {
        hazard,
        reporter_name: None,
    });
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Hazard reported successfully",
            "hazard": response,
        })),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    #[serde(rename = "type")]
    hazard_type: Option<String>,
    severity: Option<String>,
    verified: Option<String>,
    limit: Option<i64>,
}

async fn list(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let mut builder = QueryBuilder::<Postgres>::new(queries::SELECT_HAZARDS_FILTERED_BASE);
    if let Some(hazard_type) = &query.hazard_type {
        builder.push(" AND h.type = ").push_bind(hazard_type);
    }
    if let Some(severity) = &query.severity {
        let severity = HazardSeverity::parse(severity).ok_or_else(|| {
            ApiError::bad_request("Invalid severity. Must be one of: low, medium, high, critical")
        })?;
        builder.push(" AND h.severity = ").push_bind(severity.as_str());
    }
    if let Some(verified) = &query.verified {
        builder
            .push(" AND h.is_verified = ")
            .push_bind(verified == "true");
    }
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 500);
    builder.push(" ORDER BY h.created_at DESC LIMIT ").push_bind(limit);

    let rows = builder
        .build_query_as::<HazardWithReporter>()
        .fetch_all(&state.pool)
        .await?;
    let hazards: Vec<HazardResponse> = rows.into_iter().map(HazardResponse::from).collect();

    Ok(Json(json!({ "count": hazards.len(), "hazards": hazards })))
}

#[derive(Debug, Deserialize)]
struct NearbyQuery {
    latitude: Option<f64>,
    longitude: Option<f64>,
    radius: Option<f64>,
}

async fn nearby(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Value>, ApiError> {
    let (Some(latitude), Some(longitude)) = (query.latitude, query.longitude) else {
        return Err(ApiError::bad_request("Latitude and longitude are required"));
    };
    let center = valid_coords(latitude, longitude)?;
    let radius_km = query.radius.unwrap_or(DEFAULT_NEARBY_RADIUS_KM);
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(ApiError::bad_request("Radius must be a positive number"));
    }

    let rows = sqlx::query_as::<_, HazardWithReporter>(queries::SELECT_ACTIVE_HAZARDS_WITH_REPORTER)
        .fetch_all(&state.pool)
        .await?;

    let mut within: Vec<(f64, HazardWithReporter)> = rows
        .into_iter()
        .filter_map(|row| {
            let at = Coordinates::new(row.hazard.latitude, row.hazard.longitude);
            let distance = haversine_km(center, at);
            (distance <= radius_km).then_some((distance, row))
        })
        .collect();
    within.sort_by(|a, b| a.0.total_cmp(&b.0));

    let hazards: Vec<HazardResponse> = within
        .into_iter()
        .map(|(distance, row)| HazardResponse::with_distance(row, distance))
        .collect();

    Ok(Json(json!({ "count": hazards.len(), "hazards": hazards })))
}

async fn get_by_id(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<HazardResponse>, ApiError> {
    let row = sqlx::query_as::<_, HazardWithReporter>(queries::SELECT_HAZARD_BY_ID)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Hazard not found"))?;

    Ok(Json(HazardResponse::from(row)))
}

#[derive(Debug, Deserialize)]
struct VerifyRequest {
    verified: Option<bool>,
}

async fn verify(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<Value>, ApiError> {
    let verified = req.verified.unwrap_or(true);

    let mut tx = state.pool.begin().await?;

    // 1. Lock the hazard row for the counter update
    let (mut verification_count, mut is_verified) =
        sqlx::query_as::<_, (i32, bool)>(queries::SELECT_HAZARD_FOR_VERIFY)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::not_found("Hazard not found"))?;

    // 2. One verification per user per hazard
    let existing = sqlx::query_scalar::<_, Uuid>(queries::SELECT_VERIFICATION)
        .bind(id)
        .bind(user.user_id)
        .fetch_optional(&mut *tx)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("You have already verified this hazard"));
    }

    sqlx::query(queries::INSERT_VERIFICATION)
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(user.user_id)
        .bind(verified)
        .execute(&mut *tx)
        .await
        .map_err(|e| ApiError::conflict_on_unique(e, "You have already verified this hazard"))?;

    // 3. Only positive verifications move the counter
    if verified {
        let (count, flag) = sqlx::query_as::<_, (i32, bool)>(queries::INCREMENT_VERIFICATION_COUNT)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        verification_count = count;
        is_verified = flag;
    }

    tx.commit().await?;

    Ok(Json(json!({
        "message": "Hazard verified successfully",
        "hazard": {
            "id": id,
            "isVerified": is_verified,
            "verificationCount": verification_count,
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_request_requires_type_key_spelled_type() {
        let req: ReportRequest = serde_json::from_str(
            r#"{
                "type": "pothole",
                "latitude": 12.9,
                "longitude": 77.6,
                "severity": "High",
                "description": "Deep one near the flyover"
            }"#,
        )
        .unwrap();
        assert_eq!(req.hazard_type.as_deref(), Some("pothole"));
        assert_eq!(req.severity.as_deref(), Some("High"));
        assert!(req.image_url.is_none());
    }

    #[test]
    fn list_query_parses_filters() {
        let query: ListQuery =
            serde_json::from_str(r#"{"type":"accident","severity":"low","verified":"true"}"#)
                .unwrap();
        assert_eq!(query.hazard_type.as_deref(), Some("accident"));
        assert_eq!(query.verified.as_deref(), Some("true"));
        assert!(query.limit.is_none());
    }
}
