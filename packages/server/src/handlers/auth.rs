use axum::{Json, extract::State};
use chrono::Utc;
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::entity::{table, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::auth::{AuthAction, AuthRequest, LoginResponse, validate_auth_request};
use crate::state::AppState;
use crate::utils::hash::{self, PasswordError};

#[utoipa::path(
    post,
    path = "/api/v1/auth",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in as an admin or a table",
    description = "Dispatches on `action`. `admin_login` checks a user account; an account still holding the bootstrap sentinel accepts any password and stores its hash. `table_login` checks the active table whose `login` equals `username`; a table whose session has ended is deactivated and the login fails with SESSION_EXPIRED.",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Login succeeded", body = LoginResponse),
        (status = 400, description = "Missing credentials or unknown action (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong credentials or expired session (INVALID_CREDENTIALS, SESSION_EXPIRED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(action = ?payload.action))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AuthRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let attempt = validate_auth_request(&payload)?;

    let response = match attempt.action {
        AuthAction::AdminLogin => {
            admin_login(&state.db, attempt.username, attempt.password).await?
        }
        AuthAction::TableLogin => {
            table_login(&state.db, attempt.username, attempt.password).await?
        }
    };

    Ok(Json(response))
}

async fn admin_login(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<LoginResponse, AppError> {
    let txn = db.begin().await?;

    let user = user::Entity::find()
        .filter(user::Column::Username.eq(username))
        .one(&txn)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if user.needs_bootstrap() {
        let hash = hash::hash_password(password)
            .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(hash);
        let user = active.update(&txn).await?;
        txn.commit().await?;

        info!(user_id = user.id, "Bootstrap password set on first login");
        return Ok(LoginResponse::admin(user));
    }

    check_password(password, &user.password_hash, "user", user.id)?;
    txn.commit().await?;

    Ok(LoginResponse::admin(user))
}

async fn table_login(
    db: &DatabaseConnection,
    login: &str,
    password: &str,
) -> Result<LoginResponse, AppError> {
    let txn = db.begin().await?;

    let table = table::Entity::find()
        .filter(table::Column::Login.eq(login))
        .filter(table::Column::IsActive.eq(true))
        .one(&txn)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if table.is_expired_at(Utc::now()) {
        let table_id = table.id;
        let mut active: table::ActiveModel = table.into();
        active.is_active = Set(false);
        active.update(&txn).await?;
        txn.commit().await?;

        info!(table_id, "Table session expired, deactivated");
        return Err(AppError::SessionExpired);
    }

    check_password(password, &table.password_hash, "table", table.id)?;
    txn.commit().await?;

    Ok(LoginResponse::table(table))
}

/// A stored hash that cannot be parsed never matches.
fn check_password(password: &str, stored: &str, kind: &str, id: i32) -> Result<(), AppError> {
    match hash::verify_password(password, stored) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AppError::InvalidCredentials),
        Err(PasswordError::MalformedHash(e)) => {
            warn!(kind, id, "Stored password hash is malformed: {}", e);
            Err(AppError::InvalidCredentials)
        }
        Err(e) => Err(AppError::Internal(format!("Password verify error: {}", e))),
    }
}
