use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Canonical severity scale. Stored and serialized lowercase; parsing is
/// case-insensitive so `"High"` and `"HIGH"` normalize at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl HazardSeverity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn is_high_priority(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Hazard {
    pub id: Uuid,
    pub reported_by: Option<Uuid>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub hazard_type: String, // enum in DB, map to String
    pub latitude: f64,
    pub longitude: f64,
    pub severity: String,
    pub confidence: f64,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub is_verified: bool,
    pub verification_count: i32,
    pub upvotes: i32,
    pub downvotes: i32,
    pub is_active: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct HazardWithReporter {
    #[sqlx(flatten)]
    pub hazard: Hazard,
    pub reporter_name: Option<String>,
}

/// Client-facing hazard shape; `distance` is present only on
/// proximity-ordered listings and is pre-formatted in km.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HazardResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub hazard_type: String,
    pub latitude: f64,
    pub longitude: f64,
    pub severity: String,
    pub confidence: f64,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub is_verified: bool,
    pub verification_count: i32,
    pub upvotes: i32,
    pub downvotes: i32,
    pub reporter_name: Option<String>,
    pub detected_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
}

impl From<HazardWithReporter> for HazardResponse {
    fn from(row: HazardWithReporter) -> Self {
        let HazardWithReporter {
            hazard,
            reporter_name,
        } = row;
        Self {
            id: hazard.id,
            hazard_type: hazard.hazard_type,
            latitude: hazard.latitude,
            longitude: hazard.longitude,
            severity: hazard.severity,
            confidence: hazard.confidence,
            image_url: hazard.image_url,
            description: hazard.description,
            is_verified: hazard.is_verified,
            verification_count: hazard.verification_count,
            upvotes: hazard.upvotes,
            downvotes: hazard.downvotes,
            reporter_name,
            detected_at: hazard.created_at,
            distance: None,
        }
    }
}

impl HazardResponse {
    pub fn with_distance(row: HazardWithReporter, distance_km: f64) -> Self {
        let mut resp = Self::from(row);
        resp.distance = Some(format!("{distance_km:.2}"));
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parse_is_case_insensitive() {
        assert_eq!(HazardSeverity::parse("high"), Some(HazardSeverity::High));
        assert_eq!(HazardSeverity::parse("High"), Some(HazardSeverity::High));
        assert_eq!(HazardSeverity::parse("HIGH"), Some(HazardSeverity::High));
        assert_eq!(HazardSeverity::parse("severe"), None);
        assert_eq!(HazardSeverity::parse(""), None);
    }

    #[test]
    fn severity_canonical_form_is_lowercase() {
        for s in ["Low", "MEDIUM", "hIgH", "critical"] {
            let parsed = HazardSeverity::parse(s).unwrap();
            assert_eq!(parsed.as_str(), s.to_ascii_lowercase());
        }
    }

    #[test]
    fn high_priority_covers_high_and_critical_only() {
        assert!(!HazardSeverity::Low.is_high_priority());
        assert!(!HazardSeverity::Medium.is_high_priority());
        assert!(HazardSeverity::High.is_high_priority());
        assert!(HazardSeverity::Critical.is_high_priority());
    }
}
