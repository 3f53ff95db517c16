use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl VoteType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upvote" => Some(Self::Upvote),
            "downvote" => Some(Self::Downvote),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upvote => "upvote",
            Self::Downvote => "downvote",
        }
    }
}

/// Per-user activity tallies the points and badge rules derive from.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct ActivityCounts {
    pub reports: i64,
    pub verifications: i64,
    pub votes: i64,
}

#[derive(Debug, FromRow)]
pub struct LeaderboardRow {
    pub id: Uuid,
    pub display_name: String,
    pub reports_count: i64,
    pub verifications_count: i64,
    pub votes_count: i64,
    pub points: i64,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub display_name: String,
    pub reports_count: i64,
    pub verifications_count: i64,
    pub votes_count: i64,
    pub points: i64,
    pub level: i64,
}

#[derive(Debug, FromRow, Serialize)]
pub struct UserBadge {
    pub user_id: Uuid,
    pub badge_type: String,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct VoteStatus {
    pub upvotes: i32,
    pub downvotes: i32,
    pub user_vote: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HazardPhoto {
    pub id: Uuid,
    pub hazard_id: Uuid,
    pub photo_url: String,
    pub uploaded_by: Uuid,
    pub is_primary: bool,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Serialize)]
pub struct HazardPhotoWithUploader {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub photo: HazardPhoto,
    pub uploaded_by_name: Option<String>,
}
