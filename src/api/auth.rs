use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::{issue_token, AuthUser};
use crate::db::queries;
use crate::error::ApiError;
use crate::models::user::{User, UserProfile, UserSummary};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/status", get(status))
        .route("/profile", get(profile))
        .route("/damage-score", patch(update_damage_score))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    email: Option<String>,
    password: Option<String>,
    display_name: Option<String>,
    phone_number: Option<String>,
    vehicle_type: Option<String>,
}

fn valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(email), Some(password), Some(display_name)) =
        (req.email, req.password, req.display_name)
    else {
        return Err(ApiError::bad_request(
            "Email, password, and displayName are required",
        ));
    };
    if !valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email format"));
    }
    if password.len() < 6 {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }

    let existing = sqlx::query_scalar::<_, Uuid>(queries::SELECT_USER_ID_BY_EMAIL)
        .bind(&email)
        .fetch_optional(&state.pool)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("User with this email already exists"));
    }

    let password_hash = bcrypt::hash(&password, state.config.bcrypt_cost)?;

    let user = sqlx::query_as::<_, User>(queries::INSERT_USER)
        .bind(Uuid::new_v4())
        .bind(&email)
        .bind(&password_hash)
        .bind(&display_name)
        .bind(&req.phone_number)
        .bind(&req.vehicle_type)
        .fetch_one(&state.pool)
        .await
        .map_err(|e| ApiError::conflict_on_unique(e, "User with this email already exists"))?;

    let token = issue_token(&state.config.jwt_secret, user.id, &user.email)?;
    info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "token": token,
            "user": UserSummary::from(&user),
        })),
    ))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    let user = sqlx::query_as::<_, User>(queries::SELECT_USER_BY_EMAIL)
        .bind(&email)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !bcrypt::verify(&password, &user.password_hash)? {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = issue_token(&state.config.jwt_secret, user.id, &user.email)?;

    Ok(Json(json!({
        "message": "Login successful",
        "token": token,
        "user": UserSummary::from(&user),
    })))
}

// Tokens are stateless; logout exists so clients have a uniform call to
// drop credentials against.
async fn logout(_user: AuthUser) -> Json<Value> {
    Json(json!({ "message": "Logout successful" }))
}

async fn status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    let row = sqlx::query_as::<_, User>(queries::SELECT_USER_BY_ID)
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({
        "authenticated": true,
        "user": UserSummary::from(&row),
    })))
}

async fn profile(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let row = sqlx::query_as::<_, User>(queries::SELECT_USER_BY_ID)
        .bind(user.user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(UserProfile::from(row)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DamageScoreRequest {
    damage_score: Option<f64>,
}

async fn update_damage_score(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<DamageScoreRequest>,
) -> Result<Json<Value>, ApiError> {
    let Some(delta) = req.damage_score else {
        return Err(ApiError::bad_request("damageScore is required"));
    };
    if !delta.is_finite() || delta < 0.0 {
        return Err(ApiError::bad_request(
            "damageScore must be a non-negative number",
        ));
    }

    let cumulative = sqlx::query_scalar::<_, f64>(queries::ADD_DAMAGE_SCORE)
        .bind(user.user_id)
        .bind(delta)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({
        "message": "Damage score updated",
        "cumulativeDamageScore": cumulative,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_plain_addresses() {
        assert!(valid_email("rider@example.com"));
        assert!(valid_email("a.b@road.dept.gov"));
        assert!(!valid_email("rider"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("rider@nodot"));
        assert!(!valid_email("rider@dot."));
    }

    #[test]
    fn register_request_maps_camel_case_fields() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{
                "email": "rider@example.com",
                "password": "secret1",
                "displayName": "Rider One",
                "phoneNumber": "+91-9000000000",
                "vehicleType": "motorcycle"
            }"#,
        )
        .unwrap();
        assert_eq!(req.email.as_deref(), Some("rider@example.com"));
        assert_eq!(req.display_name.as_deref(), Some("Rider One"));
        assert_eq!(req.vehicle_type.as_deref(), Some("motorcycle"));
    }

    #[test]
    fn register_request_tolerates_missing_optionals() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"email":"a@b.co","password":"secret1"}"#).unwrap();
        assert!(req.display_name.is_none());
        assert!(req.phone_number.is_none());
    }
}
