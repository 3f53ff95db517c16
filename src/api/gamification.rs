use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::queries;
use crate::error::ApiError;
use crate::models::gamification::{
    ActivityCounts, HazardPhoto, HazardPhotoWithUploader, LeaderboardEntry, LeaderboardRow,
    UserBadge, VoteStatus, VoteType,
};
use crate::state::AppState;

const DEFAULT_LEADERBOARD_LIMIT: i64 = 50;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:hazard_id/photos", post(add_photo).get(list_photos))
        .route("/:hazard_id/vote", post(vote))
        .route("/:hazard_id/vote-status", get(vote_status))
        .route("/user/:user_id/points", get(points))
        .route("/user/:user_id/badges", get(badges))
        .route("/user/:user_id/rank", get(rank))
        .route("/leaderboard", get(leaderboard))
}

// ---- scoring rules ----

/// Community confidence in a hazard: 0.5 baseline plus the upvote share of
/// the vote total, capped at 1.0. With no votes it stays at the baseline.
pub fn confidence_from_votes(upvotes: i32, downvotes: i32) -> f64 {
    let total = (upvotes + downvotes).max(1) as f64;
    (0.5 + (f64::from(upvotes.max(0)) / total) * 0.5).min(1.0)
}

pub fn points_for(counts: &ActivityCounts) -> i64 {
    counts.reports * 10 + counts.verifications * 5 + counts.votes * 2
}

pub fn level_for(points: i64) -> i64 {
    points / 100 + 1
}

/// Badge thresholds over lifetime activity counts. Evaluated on read and
/// awarded idempotently.
pub fn earned_badges(counts: &ActivityCounts) -> Vec<&'static str> {
    let mut earned = Vec::new();
    if counts.reports >= 1 {
        earned.push("first_report");
    }
    if counts.reports >= 10 {
        earned.push("road_guardian");
    }
    if counts.reports >= 50 {
        earned.push("safety_champion");
    }
    if counts.verifications >= 10 {
        earned.push("verifier");
    }
    if counts.votes >= 25 {
        earned.push("community_voice");
    }
    earned
}

// ---- vote state machine ----

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChange {
    Added(VoteType),
    Removed(VoteType),
    Switched { from: VoteType, to: VoteType },
}

/// Transition table for (existing vote, incoming vote): no vote adds,
/// the same type toggles off, the other type switches.
pub fn plan_vote(existing: Option<VoteType>, incoming: VoteType) -> VoteChange {
    match existing {
        None => VoteChange::Added(incoming),
        Some(current) if current == incoming => VoteChange::Removed(current),
        Some(current) => VoteChange::Switched {
            from: current,
            to: incoming,
        },
    }
}

/// Closed mapping from transition to counter statement. Vote input never
/// reaches SQL text; only these fixed constants do.
fn counter_sql(change: VoteChange) -> &'static str {
    match change {
        VoteChange::Added(VoteType::Upvote) => queries::ADD_UPVOTE,
        VoteChange::Added(VoteType::Downvote) => queries::ADD_DOWNVOTE,
        VoteChange::Removed(VoteType::Upvote) => queries::REMOVE_UPVOTE,
        VoteChange::Removed(VoteType::Downvote) => queries::REMOVE_DOWNVOTE,
        VoteChange::Switched {
            to: VoteType::Upvote,
            ..
        } => queries::SWITCH_TO_UPVOTE,
        VoteChange::Switched {
            to: VoteType::Downvote,
            ..
        } => queries::SWITCH_TO_DOWNVOTE,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoteRequest {
    vote_type: Option<String>,
}

async fn vote(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(hazard_id): Path<Uuid>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Value>, ApiError> {
    let incoming = req
        .vote_type
        .as_deref()
        .and_then(VoteType::parse)
        .ok_or_else(|| ApiError::bad_request("Invalid vote type"))?;

    let mut tx = state.pool.begin().await?;

    // 1. Lock the hazard counters for the whole transition
    sqlx::query_as::<_, (i32, i32)>(queries::LOCK_HAZARD_FOR_VOTE)
        .bind(hazard_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Hazard not found"))?;

    // 2. Current vote decides the transition
    let existing = sqlx::query_scalar::<_, String>(queries::SELECT_VOTE)
        .bind(hazard_id)
        .bind(user.user_id)
        .fetch_optional(&mut *tx)
        .await?
        .and_then(|s| VoteType::parse(&s));
    let change = plan_vote(existing, incoming);

    // 3. Vote row mutation
    match change {
        VoteChange::Added(added) => {
            sqlx::query(queries::INSERT_VOTE)
                .bind(Uuid::new_v4())
                .bind(hazard_id)
                .bind(user.user_id)
                .bind(added.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    ApiError::conflict_on_unique(e, "You have already voted on this hazard")
                })?;
        }
        VoteChange::Removed(_) => {
            sqlx::query(queries::DELETE_VOTE)
                .bind(hazard_id)
                .bind(user.user_id)
                .execute(&mut *tx)
                .await?;
        }
        VoteChange::Switched { to, .. } => {
            sqlx::query(queries::UPDATE_VOTE_TYPE)
                .bind(hazard_id)
                .bind(user.user_id)
                .bind(to.as_str())
                .execute(&mut *tx)
                .await?;
        }
    }

    // 4. Counter update from the closed mapping
    let (upvotes, downvotes) = sqlx::query_as::<_, (i32, i32)>(counter_sql(change))
        .bind(hazard_id)
        .fetch_one(&mut *tx)
        .await?;

    // 5. Confidence follows the counters on add and change, not removal
    if !matches!(change, VoteChange::Removed(_)) {
        sqlx::query(queries::SET_CONFIDENCE)
            .bind(hazard_id)
            .bind(confidence_from_votes(upvotes, downvotes))
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    let body = match change {
        VoteChange::Added(added) => json!({
            "message": "Vote recorded",
            "action": "added",
            "voteType": added.as_str(),
            "upvotes": upvotes,
            "downvotes": downvotes,
        }),
        VoteChange::Removed(_) => json!({
            "message": "Vote removed",
            "action": "removed",
            "upvotes": upvotes,
            "downvotes": downvotes,
        }),
        VoteChange::Switched { to, .. } => json!({
            "message": "Vote changed",
            "action": "changed",
            "voteType": to.as_str(),
            "upvotes": upvotes,
            "downvotes": downvotes,
        }),
    };
    Ok(Json(body))
}

async fn vote_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(hazard_id): Path<Uuid>,
) -> Result<Json<VoteStatus>, ApiError> {
    let status = sqlx::query_as::<_, VoteStatus>(queries::SELECT_VOTE_STATUS)
        .bind(hazard_id)
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Hazard not found"))?;
    Ok(Json(status))
}

// ---- photos ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhotoRequest {
    photo_url: Option<String>,
}

async fn add_photo(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(hazard_id): Path<Uuid>,
    Json(req): Json<PhotoRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Some(photo_url) = req.photo_url else {
        return Err(ApiError::bad_request("photoUrl is required"));
    };

    sqlx::query_as::<_, (Option<Uuid>, String)>(queries::SELECT_HAZARD_REPORTER)
        .bind(hazard_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Hazard not found"))?;

    // First photo becomes primary and backfills the hazard image
    let has_photos = sqlx::query_scalar::<_, bool>(queries::SELECT_PHOTO_EXISTS)
        .bind(hazard_id)
        .fetch_one(&state.pool)
        .await?;

    let photo = sqlx::query_as::<_, HazardPhoto>(queries::INSERT_PHOTO)
        .bind(Uuid::new_v4())
        .bind(hazard_id)
        .bind(&photo_url)
        .bind(user.user_id)
        .bind(!has_photos)
        .fetch_one(&state.pool)
        .await?;

    if !has_photos {
        sqlx::query(queries::SET_HAZARD_IMAGE_IF_MISSING)
            .bind(hazard_id)
            .bind(&photo_url)
            .execute(&state.pool)
            .await?;
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Photo added to hazard report", "photo": photo })),
    ))
}

// Publicly readable so hazard detail views can show photos pre-login.
async fn list_photos(
    State(state): State<Arc<AppState>>,
    Path(hazard_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let photos = sqlx::query_as::<_, HazardPhotoWithUploader>(queries::SELECT_PHOTOS)
        .bind(hazard_id)
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(json!({ "photos": photos })))
}

// ---- points, badges, rank ----

async fn ensure_user_exists(state: &AppState, user_id: Uuid) -> Result<(), ApiError> {
    sqlx::query_scalar::<_, Uuid>(queries::SELECT_USER_EXISTS)
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(())
}

async fn points(
    State(state): State<Arc<AppState>>,
    _caller: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    ensure_user_exists(&state, user_id).await?;

    let counts = sqlx::query_as::<_, ActivityCounts>(queries::SELECT_USER_ACTIVITY_COUNTS)
        .bind(user_id)
        .fetch_one(&state.pool)
        .await?;
    let total_points = points_for(&counts);
    let level = level_for(total_points);

    // Refresh the snapshot row as a side effect of reading
    sqlx::query(queries::UPSERT_USER_POINTS)
        .bind(user_id)
        .bind(total_points as i32)
        .bind(level as i32)
        .bind(counts.reports as i32)
        .execute(&state.pool)
        .await?;

    let next_level_points = level * 100;
    Ok(Json(json!({
        "userId": user_id,
        "totalPoints": total_points,
        "level": level,
        "nextLevelPoints": next_level_points,
        "pointsToNextLevel": next_level_points - total_points,
    })))
}

async fn badges(
    State(state): State<Arc<AppState>>,
    _caller: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    ensure_user_exists(&state, user_id).await?;

    let counts = sqlx::query_as::<_, ActivityCounts>(queries::SELECT_USER_ACTIVITY_COUNTS)
        .bind(user_id)
        .fetch_one(&state.pool)
        .await?;

    for badge_type in earned_badges(&counts) {
        sqlx::query(queries::INSERT_BADGE)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(badge_type)
            .execute(&state.pool)
            .await?;
    }

    let badges = sqlx::query_as::<_, UserBadge>(queries::SELECT_BADGES)
        .bind(user_id)
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(json!({ "badges": badges })))
}

async fn rank(
    State(state): State<Arc<AppState>>,
    _caller: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let rank = sqlx::query_scalar::<_, i64>(queries::SELECT_USER_RANK)
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({ "userId": user_id, "rank": rank })))
}

#[derive(Debug, Deserialize)]
struct LeaderboardQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

async fn leaderboard(
    State(state): State<Arc<AppState>>,
    _caller: AuthUser,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let rows = sqlx::query_as::<_, LeaderboardRow>(queries::SELECT_LEADERBOARD)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool)
        .await?;

    let entries: Vec<LeaderboardEntry> = rows
        .into_iter()
        .map(|row| LeaderboardEntry {
            id: row.id,
            display_name: row.display_name,
            reports_count: row.reports_count,
            verifications_count: row.verifications_count,
            votes_count: row.votes_count,
            level: level_for(row.points),
            points: row.points,
        })
        .collect();

    info!(entries = entries.len(), "leaderboard served");
    Ok(Json(json!({ "leaderboard": entries })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(reports: i64, verifications: i64, votes: i64) -> ActivityCounts {
        ActivityCounts {
            reports,
            verifications,
            votes,
        }
    }

    #[test]
    fn confidence_starts_at_baseline_with_no_votes() {
        assert_eq!(confidence_from_votes(0, 0), 0.5);
    }

    #[test]
    fn confidence_is_bounded() {
        assert_eq!(confidence_from_votes(100, 0), 1.0);
        assert!(confidence_from_votes(1, 0) <= 1.0);
        for (up, down) in [(1, 0), (1, 3), (7, 2), (0, 9), (50, 50)] {
            let c = confidence_from_votes(up, down);
            assert!((0.5..=1.0).contains(&c) || up == 0, "({up},{down}) -> {c}");
            assert!(c <= 1.0);
        }
    }

    #[test]
    fn confidence_with_upvotes_never_drops_below_baseline() {
        assert!(confidence_from_votes(1, 99) >= 0.5);
        assert_eq!(confidence_from_votes(1, 3), 0.625);
    }

    #[test]
    fn vote_plan_covers_all_transitions() {
        use VoteType::{Downvote, Upvote};
        assert_eq!(plan_vote(None, Upvote), VoteChange::Added(Upvote));
        assert_eq!(plan_vote(Some(Upvote), Upvote), VoteChange::Removed(Upvote));
        assert_eq!(
            plan_vote(Some(Upvote), Downvote),
            VoteChange::Switched {
                from: Upvote,
                to: Downvote
            }
        );
        assert_eq!(
            plan_vote(Some(Downvote), Upvote),
            VoteChange::Switched {
                from: Downvote,
                to: Upvote
            }
        );
    }

    #[test]
    fn toggle_maps_to_inverse_counter_statements() {
        use VoteType::Upvote;
        let add = counter_sql(plan_vote(None, Upvote));
        let remove = counter_sql(plan_vote(Some(Upvote), Upvote));
        assert!(add.contains("upvotes = upvotes + 1"));
        assert!(remove.contains("upvotes = upvotes - 1"));
    }

    #[test]
    fn switch_keeps_vote_total_constant() {
        use VoteType::{Downvote, Upvote};
        let sql = counter_sql(plan_vote(Some(Upvote), Downvote));
        assert!(sql.contains("upvotes = upvotes - 1"));
        assert!(sql.contains("downvotes = downvotes + 1"));
    }

    #[test]
    fn points_formula_weights_activity() {
        assert_eq!(points_for(&counts(0, 0, 0)), 0);
        assert_eq!(points_for(&counts(3, 2, 5)), 3 * 10 + 2 * 5 + 5 * 2);
    }

    #[test]
    fn levels_step_every_hundred_points() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(99), 1);
        assert_eq!(level_for(100), 2);
        assert_eq!(level_for(250), 3);
    }

    #[test]
    fn badge_thresholds() {
        assert!(earned_badges(&counts(0, 0, 0)).is_empty());
        assert_eq!(earned_badges(&counts(1, 0, 0)), vec!["first_report"]);
        assert_eq!(
            earned_badges(&counts(10, 0, 0)),
            vec!["first_report", "road_guardian"]
        );
        assert!(earned_badges(&counts(50, 10, 25)).contains(&"safety_champion"));
        assert!(earned_badges(&counts(0, 10, 0)).contains(&"verifier"));
        assert!(earned_badges(&counts(0, 0, 25)).contains(&"community_voice"));
    }
}
