use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub phone_number: Option<String>,
    pub vehicle_type: Option<String>,
    pub photo_url: Option<String>,
    pub cumulative_damage_score: f64,
    pub last_maintenance_check: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Shape returned with register/login tokens and auth status checks.
/// Photo URL is profile-only.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub phone_number: Option<String>,
    pub vehicle_type: Option<String>,
    pub cumulative_damage_score: f64,
    pub last_maintenance_check: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            phone_number: user.phone_number.clone(),
            vehicle_type: user.vehicle_type.clone(),
            cumulative_damage_score: user.cumulative_damage_score,
            last_maintenance_check: user.last_maintenance_check,
            created_at: user.created_at,
        }
    }
}

/// Full profile, password hash excluded.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub phone_number: Option<String>,
    pub vehicle_type: Option<String>,
    pub photo_url: Option<String>,
    pub cumulative_damage_score: f64,
    pub last_maintenance_check: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            phone_number: user.phone_number,
            vehicle_type: user.vehicle_type,
            photo_url: user.photo_url,
            cumulative_damage_score: user.cumulative_damage_score,
            last_maintenance_check: user.last_maintenance_check,
            created_at: user.created_at,
        }
    }
}
