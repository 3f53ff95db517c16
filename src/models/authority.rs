use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::hazard::Hazard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityType {
    Police,
    TrafficPolice,
    Municipality,
    RoadDept,
    EmergencyServices,
}

impl AuthorityType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "police" => Some(Self::Police),
            "traffic_police" => Some(Self::TrafficPolice),
            "municipality" => Some(Self::Municipality),
            "road_dept" => Some(Self::RoadDept),
            "emergency_services" => Some(Self::EmergencyServices),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Police => "police",
            Self::TrafficPolice => "traffic_police",
            Self::Municipality => "municipality",
            Self::RoadDept => "road_dept",
            Self::EmergencyServices => "emergency_services",
        }
    }
}

/// Action vocabulary for the hazard workflow. Any action may follow any
/// other; there is no transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityActionType {
    Acknowledged,
    Investigating,
    InProgress,
    Resolved,
    Rejected,
}

impl AuthorityActionType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "acknowledged" => Some(Self::Acknowledged),
            "investigating" => Some(Self::Investigating),
            "in_progress" => Some(Self::InProgress),
            "resolved" => Some(Self::Resolved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Acknowledged => "acknowledged",
            Self::Investigating => "investigating",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    /// Resolving is the one action with hazard side effects.
    pub fn resolves_hazard(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// Human wording for the reporter follow-up alert.
    pub fn describes(&self) -> &'static str {
        match self {
            Self::Acknowledged => "acknowledged",
            Self::Investigating => "investigating",
            Self::InProgress => "in progress",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuthorityUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub authority_type: String,
    pub jurisdiction: Option<String>,
    pub badge_number: Option<String>,
    pub department: Option<String>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct AuthorityProfile {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub authority: AuthorityUser,
    pub display_name: String,
    pub email: String,
    pub phone_number: Option<String>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct AuthorityAction {
    pub id: Uuid,
    pub hazard_id: Uuid,
    pub authority_id: Uuid,
    pub action_type: String,
    pub notes: Option<String>,
    pub estimated_resolution_time: Option<DateTime<Utc>>,
    pub action_taken_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct HazardActionDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub action: AuthorityAction,
    pub authority_type: String,
    pub department: Option<String>,
    pub authority_name: String,
}

/// Hazard enriched with reporter identity and workflow history hints for the
/// authority listing.
#[derive(Debug, FromRow, Serialize)]
pub struct AuthorityHazard {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub hazard: Hazard,
    pub reported_by_name: Option<String>,
    pub reported_by_email: Option<String>,
    pub verified_reports: i64,
    pub last_authority_action: Option<String>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct DashboardCounts {
    pub total_active_hazards: i64,
    pub critical_hazards: i64,
    pub total_actions_taken: i64,
    pub hazards_resolved: i64,
    pub active_sos_alerts: i64,
}

#[derive(Debug, FromRow, Serialize)]
pub struct HazardTypeCount {
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub hazard_type: String,
    pub count: i64,
}

#[derive(Debug, FromRow, Serialize)]
pub struct RecentAction {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub action: AuthorityAction,
    pub hazard_type: String,
    pub hazard_severity: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_type_parse_round_trips() {
        for s in [
            "acknowledged",
            "investigating",
            "in_progress",
            "resolved",
            "rejected",
        ] {
            assert_eq!(AuthorityActionType::parse(s).unwrap().as_str(), s);
        }
        assert_eq!(AuthorityActionType::parse("escalated"), None);
    }

    #[test]
    fn only_resolved_touches_the_hazard() {
        assert!(AuthorityActionType::Resolved.resolves_hazard());
        assert!(!AuthorityActionType::Acknowledged.resolves_hazard());
        assert!(!AuthorityActionType::Rejected.resolves_hazard());
    }

    #[test]
    fn authority_type_parse_accepts_known_values() {
        assert_eq!(
            AuthorityType::parse("traffic_police"),
            Some(AuthorityType::TrafficPolice)
        );
        assert_eq!(AuthorityType::parse("navy"), None);
    }
}
