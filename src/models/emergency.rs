use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EmergencyContact {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contact_name: String,
    pub contact_phone: String,
    pub relationship: Option<String>,
    pub priority: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SosStatus {
    Active,
    Resolved,
    Cancelled,
}

impl SosStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "resolved" => Some(Self::Resolved),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Resolved => "resolved",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal states stamp resolved_at; active never does.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SosAlert {
    pub id: Uuid,
    pub user_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub alert_type: String,
    pub message: String,
    pub status: String,
    pub triggered_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
pub struct SosWithUser {
    #[sqlx(flatten)]
    pub sos: SosAlert,
    pub display_name: String,
    pub phone_number: Option<String>,
}

/// Active SOS listing entry, distance measured from the caller's position.
#[derive(Debug, Serialize)]
pub struct NearbySos {
    #[serde(flatten)]
    pub sos: SosAlert,
    pub display_name: String,
    pub phone_number: Option<String>,
    pub distance_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sos_status_parses_known_values() {
        assert_eq!(SosStatus::parse("active"), Some(SosStatus::Active));
        assert_eq!(SosStatus::parse("Resolved"), Some(SosStatus::Resolved));
        assert_eq!(SosStatus::parse("CANCELLED"), Some(SosStatus::Cancelled));
        assert_eq!(SosStatus::parse("done"), None);
    }

    #[test]
    fn only_active_is_non_terminal() {
        assert!(!SosStatus::Active.is_terminal());
        assert!(SosStatus::Resolved.is_terminal());
        assert!(SosStatus::Cancelled.is_terminal());
    }
}
