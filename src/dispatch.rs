//! Alert eligibility and fan-out.
//!
//! Recipient selection is two steps: one parameterized fetch of active trip
//! start positions, then pure filtering against the haversine predicate.
//! The fan-out writes one alert row per recipient with independent
//! concurrent inserts; a single failed insert never blocks the rest.

use std::collections::{BTreeMap, HashSet};

use futures::future::join_all;
use serde::Serialize;
use serde_json::{json, Value};
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

use crate::db::{queries, DbPool};
use crate::geo::{haversine_km, Coordinates};
use crate::models::alert::{AlertSeverity, AlertType};
use crate::models::hazard::{Hazard, HazardSeverity};

/// How close a hazard has to be before a rider gets a proximity alert.
pub const PROXIMITY_RADIUS_KM: f64 = 1.0;

/// At most this many proximity alerts per trip in one monitor pass.
const MONITOR_MAX_HAZARDS_PER_TRIP: usize = 5;

/// Everything needed to write one alert row per recipient.
#[derive(Debug, Clone)]
pub struct AlertPayload {
    pub title: String,
    pub message: String,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub hazard_id: Option<Uuid>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TripPosition {
    pub user_id: Uuid,
    pub start_latitude: f64,
    pub start_longitude: f64,
}

impl TripPosition {
    fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.start_latitude, self.start_longitude)
    }
}

/// Pure recipient selection: inclusive radius filter, one entry per user
/// even when several of their trips are active, optional exclusion of the
/// originating user.
pub fn recipients_within(
    positions: &[TripPosition],
    center: Coordinates,
    radius_km: f64,
    exclude: Option<Uuid>,
) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    let mut recipients = Vec::new();
    for position in positions {
        if exclude == Some(position.user_id) {
            continue;
        }
        if haversine_km(center, position.coordinates()) <= radius_km
            && seen.insert(position.user_id)
        {
            recipients.push(position.user_id);
        }
    }
    recipients
}

/// Users with an active trip starting within `radius_km` of `center`.
/// An empty result is a valid outcome, not an error.
pub async fn eligible_in_area(
    pool: &DbPool,
    center: Coordinates,
    radius_km: f64,
    exclude: Option<Uuid>,
) -> Result<Vec<Uuid>, sqlx::Error> {
    let positions = sqlx::query_as::<_, TripPosition>(queries::SELECT_ACTIVE_TRIP_POSITIONS)
        .fetch_all(pool)
        .await?;
    Ok(recipients_within(&positions, center, radius_km, exclude))
}

/// Every user with any active trip, location ignored. Used for system-wide
/// emergency notices.
pub async fn all_active_users(pool: &DbPool) -> Result<Vec<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(queries::SELECT_ACTIVE_TRIP_USERS)
        .fetch_all(pool)
        .await
}

/// Writes one alert row per recipient. Inserts run concurrently and are
/// independent units of work: a failure is logged at warn and skipped.
/// Returns the number of recipients targeted, not the number written.
pub async fn dispatch(pool: &DbPool, recipients: &[Uuid], payload: &AlertPayload) -> usize {
    let inserts = recipients.iter().map(|&user_id| async move {
        let result = sqlx::query(queries::INSERT_ALERT)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&payload.title)
            .bind(&payload.message)
            .bind(payload.alert_type.as_str())
            .bind(payload.severity.as_str())
            .bind(payload.hazard_id)
            .bind(payload.metadata.clone())
            .execute(pool)
            .await;
        if let Err(err) = result {
            warn!(%user_id, "alert insert failed during fan-out: {err}");
        }
    });
    join_all(inserts).await;
    recipients.len()
}

/// One hazard matched along a route, tagged with its distance from the
/// start of the first waypoint pair that matched it.
#[derive(Debug, Clone, Serialize)]
pub struct RouteHazard {
    #[serde(flatten)]
    pub hazard: Hazard,
    pub distance_from_start: f64,
}

/// Matches hazards against consecutive waypoint pairs. A hazard belongs to
/// a pair when it lies within `buffer_km` of either endpoint; per-pair
/// matches are ordered by distance from the pair's start, and the union is
/// deduplicated by hazard id with the first occurrence kept.
pub fn hazards_along_route(
    hazards: &[Hazard],
    waypoints: &[Coordinates],
    buffer_km: f64,
) -> Vec<RouteHazard> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for pair in waypoints.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let mut matches: Vec<(f64, &Hazard)> = hazards
            .iter()
            .filter_map(|hazard| {
                let at = Coordinates::new(hazard.latitude, hazard.longitude);
                let from_start = haversine_km(start, at);
                let from_end = haversine_km(end, at);
                (from_start <= buffer_km || from_end <= buffer_km).then_some((from_start, hazard))
            })
            .collect();
        matches.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (distance, hazard) in matches {
            if seen.insert(hazard.id) {
                found.push(RouteHazard {
                    hazard: hazard.clone(),
                    distance_from_start: distance,
                });
            }
        }
    }
    found
}

/// Severity histogram for the route summary metadata.
pub fn severity_breakdown(found: &[RouteHazard]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entry in found {
        *counts.entry(entry.hazard.severity.clone()).or_insert(0) += 1;
    }
    counts
}

/// Route check: fetches active hazards once, matches them against the
/// waypoints, and when anything matched writes one summary alert for the
/// querying user. The write on a nominally read endpoint is intentional.
pub async fn check_route(
    pool: &DbPool,
    user_id: Uuid,
    waypoints: &[Coordinates],
    buffer_km: f64,
) -> Result<Vec<RouteHazard>, sqlx::Error> {
    let hazards = sqlx::query_as::<_, Hazard>(queries::SELECT_ACTIVE_HAZARDS)
        .fetch_all(pool)
        .await?;
    let found = hazards_along_route(&hazards, waypoints, buffer_km);
    if !found.is_empty() {
        let breakdown = severity_breakdown(&found);
        let payload = AlertPayload {
            title: "Route Hazards Detected".to_string(),
            message: format!(
                "Found {} hazard(s) along your route: {}",
                found.len(),
                serde_json::to_string(&breakdown).unwrap_or_default()
            ),
            alert_type: AlertType::Route,
            severity: AlertSeverity::Warning,
            hazard_id: None,
            metadata: Some(json!({
                "hazardCount": found.len(),
                "severityBreakdown": breakdown,
                "waypoints": waypoints.len(),
            })),
        };
        dispatch(pool, &[user_id], &payload).await;
    }
    Ok(found)
}

/// Proximity alert for one hazard at a known distance. Hazard severity maps
/// onto the alert scale: critical stays critical, everything else warns.
pub fn proximity_payload(hazard: &Hazard, distance_km: f64) -> AlertPayload {
    let severity = match HazardSeverity::parse(&hazard.severity) {
        Some(HazardSeverity::Critical) => AlertSeverity::Critical,
        _ => AlertSeverity::Warning,
    };
    AlertPayload {
        title: format!("{} {} Ahead!", hazard.severity, hazard.hazard_type),
        message: format!(
            "{} detected {:.2}km ahead. Drive carefully!",
            hazard.hazard_type, distance_km
        ),
        alert_type: AlertType::Proximity,
        severity,
        hazard_id: Some(hazard.id),
        metadata: Some(json!({
            "distance": distance_km,
            "hazardType": hazard.hazard_type,
            "location": {
                "latitude": hazard.latitude,
                "longitude": hazard.longitude,
            },
        })),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorAlert {
    pub user_id: Uuid,
    pub hazard_id: Uuid,
    pub distance: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorReport {
    pub trips_monitored: usize,
    pub alerts_created: usize,
    pub alerts: Vec<MonitorAlert>,
}

/// Scans every active trip for high-priority hazards within the proximity
/// radius of its start position and writes one proximity alert per
/// (trip user, hazard), closest five per trip.
pub async fn monitor_active_trips(pool: &DbPool) -> Result<MonitorReport, sqlx::Error> {
    let positions = sqlx::query_as::<_, TripPosition>(queries::SELECT_ACTIVE_TRIP_POSITIONS)
        .fetch_all(pool)
        .await?;
    let hazards = sqlx::query_as::<_, Hazard>(queries::SELECT_ACTIVE_HAZARDS)
        .fetch_all(pool)
        .await?;

    let mut alerts = Vec::new();
    for position in &positions {
        let origin = position.coordinates();
        let mut nearby: Vec<(f64, &Hazard)> = hazards
            .iter()
            .filter_map(|hazard| {
                let severity = HazardSeverity::parse(&hazard.severity)?;
                if !severity.is_high_priority() {
                    return None;
                }
                let distance =
                    haversine_km(origin, Coordinates::new(hazard.latitude, hazard.longitude));
                (distance <= PROXIMITY_RADIUS_KM).then_some((distance, hazard))
            })
            .collect();
        nearby.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (distance, hazard) in nearby.into_iter().take(MONITOR_MAX_HAZARDS_PER_TRIP) {
            let payload = proximity_payload(hazard, distance);
            dispatch(pool, &[position.user_id], &payload).await;
            alerts.push(MonitorAlert {
                user_id: position.user_id,
                hazard_id: hazard.id,
                distance,
            });
        }
    }

    Ok(MonitorReport {
        trips_monitored: positions.len(),
        alerts_created: alerts.len(),
        alerts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn position(user_id: Uuid, lat: f64, lon: f64) -> TripPosition {
        TripPosition {
            user_id,
            start_latitude: lat,
            start_longitude: lon,
        }
    }

    fn hazard(lat: f64, lon: f64, severity: &str) -> Hazard {
        Hazard {
            id: Uuid::new_v4(),
            reported_by: None,
            hazard_type: "pothole".to_string(),
            latitude: lat,
            longitude: lon,
            severity: severity.to_string(),
            confidence: 0.5,
            image_url: None,
            description: None,
            is_verified: false,
            verification_count: 0,
            upvotes: 0,
            downvotes: 0,
            is_active: true,
            resolved_at: None,
            resolved_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn recipient_within_broadcast_radius_is_selected() {
        let rider = Uuid::new_v4();
        let positions = vec![position(rider, 12.905, 77.605)];
        let center = Coordinates::new(12.90, 77.60);
        let recipients = recipients_within(&positions, center, 1.0, None);
        assert_eq!(recipients, vec![rider]);
    }

    #[test]
    fn recipient_outside_radius_is_skipped() {
        let positions = vec![position(Uuid::new_v4(), 13.5, 78.2)];
        let center = Coordinates::new(12.90, 77.60);
        assert!(recipients_within(&positions, center, 1.0, None).is_empty());
    }

    #[test]
    fn recipient_exactly_on_the_radius_is_included() {
        let rider = Uuid::new_v4();
        let center = Coordinates::new(12.90, 77.60);
        let start = Coordinates::new(12.905, 77.605);
        let exact = haversine_km(center, start);
        let positions = vec![position(rider, start.latitude, start.longitude)];
        assert_eq!(recipients_within(&positions, center, exact, None), vec![rider]);
    }

    #[test]
    fn user_with_two_active_trips_appears_once() {
        let rider = Uuid::new_v4();
        let positions = vec![
            position(rider, 12.901, 77.601),
            position(rider, 12.902, 77.602),
        ];
        let center = Coordinates::new(12.90, 77.60);
        assert_eq!(recipients_within(&positions, center, 5.0, None).len(), 1);
    }

    #[test]
    fn excluded_user_never_receives_their_own_alert() {
        let trigger = Uuid::new_v4();
        let other = Uuid::new_v4();
        let positions = vec![
            position(trigger, 12.901, 77.601),
            position(other, 12.902, 77.602),
        ];
        let center = Coordinates::new(12.90, 77.60);
        let recipients = recipients_within(&positions, center, 5.0, Some(trigger));
        assert_eq!(recipients, vec![other]);
    }

    #[test]
    fn no_active_trips_means_zero_recipients() {
        let center = Coordinates::new(12.90, 77.60);
        assert!(recipients_within(&[], center, 5.0, None).is_empty());
    }

    #[test]
    fn route_match_requires_buffer_hit_on_either_endpoint() {
        let far = hazard(20.0, 70.0, "high");
        let near_start = hazard(12.9005, 77.6005, "high");
        let waypoints = [
            Coordinates::new(12.90, 77.60),
            Coordinates::new(12.95, 77.65),
        ];
        let found = hazards_along_route(&[far.clone(), near_start.clone()], &waypoints, 0.5);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].hazard.id, near_start.id);
    }

    #[test]
    fn route_hazard_in_two_pairs_is_reported_once() {
        // Shared waypoint: the hazard sits near the joint of both pairs.
        let shared = hazard(12.9501, 77.6501, "medium");
        let waypoints = [
            Coordinates::new(12.90, 77.60),
            Coordinates::new(12.95, 77.65),
            Coordinates::new(13.00, 77.70),
        ];
        let found = hazards_along_route(&[shared], &waypoints, 1.0);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn route_matches_are_ordered_by_distance_from_pair_start() {
        let close = hazard(12.9010, 77.6010, "low");
        let closer = hazard(12.9001, 77.6001, "low");
        let waypoints = [
            Coordinates::new(12.90, 77.60),
            Coordinates::new(12.91, 77.61),
        ];
        let found = hazards_along_route(&[close.clone(), closer.clone()], &waypoints, 2.0);
        assert_eq!(found[0].hazard.id, closer.id);
        assert_eq!(found[1].hazard.id, close.id);
    }

    #[test]
    fn breakdown_counts_by_severity() {
        let waypoints = [
            Coordinates::new(12.90, 77.60),
            Coordinates::new(12.91, 77.61),
        ];
        let hazards = [
            hazard(12.9001, 77.6001, "high"),
            hazard(12.9002, 77.6002, "high"),
            hazard(12.9003, 77.6003, "low"),
        ];
        let found = hazards_along_route(&hazards, &waypoints, 2.0);
        let breakdown = severity_breakdown(&found);
        assert_eq!(breakdown.get("high"), Some(&2));
        assert_eq!(breakdown.get("low"), Some(&1));
    }

    #[test]
    fn proximity_message_carries_rounded_distance() {
        let h = hazard(12.90, 77.60, "high");
        let payload = proximity_payload(&h, 0.78321);
        assert_eq!(payload.title, "high pothole Ahead!");
        assert!(payload.message.contains("0.78km"), "{}", payload.message);
        assert_eq!(payload.alert_type.as_str(), "proximity");
        assert_eq!(payload.hazard_id, Some(h.id));
    }

    #[test]
    fn proximity_severity_maps_critical_through() {
        let critical = proximity_payload(&hazard(12.9, 77.6, "critical"), 0.4);
        assert_eq!(critical.severity.as_str(), "critical");
        let high = proximity_payload(&hazard(12.9, 77.6, "high"), 0.4);
        assert_eq!(high.severity.as_str(), "warning");
    }
}
