use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{table, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::shared::SuccessResponse;
use crate::models::table::*;
use crate::state::AppState;
use crate::utils::hash;

#[utoipa::path(
    get,
    path = "/api/v1/tables",
    tag = "Tables",
    operation_id = "listTables",
    summary = "List all tables",
    description = "Returns every table, active or not, ordered by table number.",
    responses(
        (status = 200, description = "All tables", body = TableListResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn list_tables(
    State(state): State<AppState>,
) -> Result<Json<TableListResponse>, AppError> {
    let tables = table::Entity::find()
        .order_by_asc(table::Column::TableNumber)
        .order_by_asc(table::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(TableListResponse {
        tables: tables.into_iter().map(TableListItem::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/tables",
    tag = "Tables",
    operation_id = "createTable",
    summary = "Create a table session",
    description = "Creates an active table whose session lasts `hours` (1-720, default 2) from now. `login` must not be used by another active table. `admin_id`, when given, must name an existing user.",
    request_body = CreateTableRequest,
    responses(
        (status = 201, description = "Table created", body = TableMutationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Login used by an active table (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(table_number = ?payload.table_number, login = ?payload.login))]
pub async fn create_table(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTableRequest>,
) -> Result<impl IntoResponse, AppError> {
    let new = validate_create_table(&payload)?;

    if let Some(admin_id) = new.admin_id
        && user::Entity::find_by_id(admin_id)
            .one(&state.db)
            .await?
            .is_none()
    {
        return Err(AppError::Validation(
            "admin_id does not reference an existing user".into(),
        ));
    }

    let password_hash = hash::hash_password(new.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let now = Utc::now();
    let model = table::ActiveModel {
        table_number: Set(new.table_number),
        login: Set(new.login.to_string()),
        password_hash: Set(password_hash),
        expires_at: Set(expiry_from(now, new.hours)),
        is_active: Set(true),
        created_by: Set(new.admin_id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(login_conflict)?;

    info!(table_id = model.id, "Table created");

    Ok((
        StatusCode::CREATED,
        Json(TableMutationResponse::new(model)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/tables",
    tag = "Tables",
    operation_id = "updateTable",
    summary = "Update or reactivate a table",
    description = "Changes only the supplied fields. Supplying `hours` restarts the session at now + `hours` and reactivates the table.",
    request_body = UpdateTableRequest,
    responses(
        (status = 200, description = "Table updated", body = TableMutationResponse),
        (status = 400, description = "Missing id or nothing to update (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Table not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Login used by an active table (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id = ?payload.id))]
pub async fn update_table(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateTableRequest>,
) -> Result<Json<TableMutationResponse>, AppError> {
    let (id, changes) = validate_update_table(&payload)?;

    let password_hash = changes
        .password
        .map(hash::hash_password)
        .transpose()
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let txn = state.db.begin().await?;
    let existing = find_table(&txn, id).await?;

    let mut active: table::ActiveModel = existing.into();
    if let Some(table_number) = changes.table_number {
        active.table_number = Set(table_number);
    }
    if let Some(login) = changes.login {
        active.login = Set(login.to_string());
    }
    if let Some(password_hash) = password_hash {
        active.password_hash = Set(password_hash);
    }
    if let Some(hours) = changes.hours {
        active.expires_at = Set(expiry_from(Utc::now(), hours));
        active.is_active = Set(true);
    }

    let updated = active.update(&txn).await.map_err(login_conflict)?;
    txn.commit().await?;

    info!(table_id = updated.id, "Table updated");
    Ok(Json(TableMutationResponse::new(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tables",
    tag = "Tables",
    operation_id = "deactivateTable",
    summary = "Deactivate a table",
    description = "Ends the table's session. The row is kept and can be reactivated with an update that supplies `hours`.",
    params(TableIdQuery),
    responses(
        (status = 200, description = "Table deactivated", body = SuccessResponse),
        (status = 400, description = "Missing id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Table not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(id = ?query.id))]
pub async fn deactivate_table(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<TableIdQuery>,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = query
        .id
        .ok_or_else(|| AppError::Validation("Table ID required".into()))?;

    let existing = find_table(&state.db, id).await?;
    let mut active: table::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.update(&state.db).await?;

    info!(table_id = id, "Table deactivated");
    Ok(Json(SuccessResponse::ok()))
}

async fn find_table<C: ConnectionTrait>(db: &C, id: i32) -> Result<table::Model, AppError> {
    table::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Table not found".into()))
}

fn login_conflict(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Login is already used by an active table".into())
        }
        _ => AppError::from(e),
    }
}
