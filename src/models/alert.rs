use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Alert categories the dispatcher writes. Most are fixed per endpoint;
/// broadcast lets the caller pick one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertType {
    Proximity,
    RoadClosure,
    Weather,
    Traffic,
    Accident,
    Emergency,
    System,
    Community,
    Route,
}

impl AlertType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "proximity" => Some(Self::Proximity),
            "road_closure" => Some(Self::RoadClosure),
            "weather" => Some(Self::Weather),
            "traffic" => Some(Self::Traffic),
            "accident" => Some(Self::Accident),
            "emergency" => Some(Self::Emergency),
            "system" => Some(Self::System),
            "community" => Some(Self::Community),
            "route" => Some(Self::Route),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proximity => "proximity",
            Self::RoadClosure => "road_closure",
            Self::Weather => "weather",
            Self::Traffic => "traffic",
            Self::Accident => "accident",
            Self::Emergency => "emergency",
            Self::System => "system",
            Self::Community => "community",
            Self::Route => "route",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
    Emergency,
}

impl AlertSeverity {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "critical" => Some(Self::Critical),
            "emergency" => Some(Self::Emergency),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Emergency => "emergency",
        }
    }
}

#[derive(Debug, FromRow)]
pub struct AlertRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[sqlx(rename = "type")]
    pub alert_type: String, // enum in DB, map to String
    pub severity: String,
    pub hazard_id: Option<Uuid>,
    pub is_read: bool,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub hazard_type: Option<String>, // joined from hazards
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: String,
    pub is_read: bool,
    pub hazard_id: Option<Uuid>,
    pub hazard_type: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<Value>,
}

impl From<AlertRow> for AlertResponse {
    fn from(row: AlertRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            message: row.message,
            alert_type: row.alert_type,
            severity: row.severity,
            is_read: row.is_read,
            hazard_id: row.hazard_id,
            hazard_type: row.hazard_type,
            timestamp: row.created_at,
            metadata: row.metadata,
        }
    }
}

#[derive(Debug, FromRow, Serialize)]
pub struct AlertStats {
    pub total_alerts: i64,
    pub unread_alerts: i64,
    pub critical_alerts: i64,
    pub emergency_alerts: i64,
    pub proximity_alerts: i64,
    pub alerts_24h: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_type_parse_round_trips_every_wire_name() {
        for name in [
            "proximity",
            "road_closure",
            "weather",
            "traffic",
            "accident",
            "emergency",
            "system",
            "community",
            "route",
        ] {
            let parsed = AlertType::parse(name).unwrap();
            assert_eq!(parsed.as_str(), name);
        }
        assert_eq!(AlertType::parse("push_notification"), None);
    }

    #[test]
    fn alert_severity_parse_is_case_insensitive() {
        assert_eq!(AlertSeverity::parse("Warning"), Some(AlertSeverity::Warning));
        assert_eq!(AlertSeverity::parse("EMERGENCY"), Some(AlertSeverity::Emergency));
        assert_eq!(AlertSeverity::parse("severe"), None);
    }
}
