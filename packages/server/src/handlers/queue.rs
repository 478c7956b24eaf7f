use std::collections::HashMap;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::QueueStatus;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{queue_item, song, table};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::queue::*;
use crate::models::shared::SuccessResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/queue",
    tag = "Queue",
    operation_id = "listQueue",
    summary = "List queue entries",
    description = "Returns queue entries oldest first, each with its song and table number. Without `status` only pending entries are listed; an empty `status` lists every status.",
    params(QueueListQuery),
    responses(
        (status = 200, description = "Queue entries", body = QueueListResponse),
        (status = 400, description = "Unknown status (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(table_id = ?query.table_id, status = ?query.status))]
pub async fn list_queue(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<QueueListQuery>,
) -> Result<Json<QueueListResponse>, AppError> {
    let status = resolve_status_filter(query.status.as_deref())?;

    let mut select = queue_item::Entity::find();
    if let Some(status) = status {
        select = select.filter(queue_item::Column::Status.eq(status));
    }
    if let Some(table_id) = query.table_id {
        select = select.filter(queue_item::Column::TableId.eq(table_id));
    }

    let rows = select
        .find_also_related(song::Entity)
        .order_by_asc(queue_item::Column::AddedAt)
        .order_by_asc(queue_item::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(QueueListResponse {
        queue: build_queue_entries(&state.db, rows).await?,
    }))
}

/// Attach table numbers to joined queue rows.
async fn build_queue_entries(
    db: &DatabaseConnection,
    rows: Vec<(queue_item::Model, Option<song::Model>)>,
) -> Result<Vec<QueueEntry>, AppError> {
    if rows.is_empty() {
        return Ok(vec![]);
    }

    let mut table_ids: Vec<i32> = rows.iter().map(|(item, _)| item.table_id).collect();
    table_ids.sort_unstable();
    table_ids.dedup();

    let table_numbers: HashMap<i32, i32> = table::Entity::find()
        .filter(table::Column::Id.is_in(table_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t.table_number))
        .collect();

    let mut queue = Vec::with_capacity(rows.len());
    for (item, song_opt) in rows {
        let song = song_opt.ok_or_else(|| {
            AppError::Internal(format!("Song {} of queue item {} missing", item.song_id, item.id))
        })?;
        let table_number = *table_numbers.get(&item.table_id).ok_or_else(|| {
            AppError::Internal(format!(
                "Table {} of queue item {} missing",
                item.table_id, item.id
            ))
        })?;

        queue.push(QueueEntry {
            id: item.id,
            song_id: item.song_id,
            table_id: item.table_id,
            status: item.status,
            added_at: item.added_at,
            played_at: item.played_at,
            song: song.into(),
            table_number,
        });
    }

    Ok(queue)
}

#[utoipa::path(
    post,
    path = "/api/v1/queue",
    tag = "Queue",
    operation_id = "enqueueSong",
    summary = "Add a song to a table's queue",
    description = "Creates a pending queue entry. Both the song and the table must exist.",
    request_body = EnqueueRequest,
    responses(
        (status = 201, description = "Entry created", body = EnqueueResponse),
        (status = 400, description = "Missing ids (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Song or table not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(song_id = ?payload.song_id, table_id = ?payload.table_id))]
pub async fn enqueue(
    State(state): State<AppState>,
    AppJson(payload): AppJson<EnqueueRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (song_id, table_id) = validate_enqueue(&payload)?;

    if song::Entity::find_by_id(song_id).one(&state.db).await?.is_none() {
        return Err(AppError::NotFound("Song not found".into()));
    }
    if table::Entity::find_by_id(table_id).one(&state.db).await?.is_none() {
        return Err(AppError::NotFound("Table not found".into()));
    }

    let item = queue_item::ActiveModel {
        song_id: Set(song_id),
        table_id: Set(table_id),
        status: Set(QueueStatus::Pending),
        added_at: Set(Utc::now()),
        played_at: Set(None),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!(item_id = item.id, "Song queued");

    Ok((
        StatusCode::CREATED,
        Json(EnqueueResponse {
            success: true,
            item: item.into(),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/queue",
    tag = "Queue",
    operation_id = "setQueueStatus",
    summary = "Set a queue entry's status",
    description = "Sets the status of an entry. Moving to `playing` records `played_at`. Any status may follow any other.",
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = SuccessResponse),
        (status = 400, description = "Missing id or unknown status (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Queue entry not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(id = ?payload.id, status = ?payload.status))]
pub async fn set_status(
    State(state): State<AppState>,
    AppJson(payload): AppJson<SetStatusRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let (id, status) = validate_set_status(&payload)?;
    update_status(&state.db, id, status).await?;
    Ok(Json(SuccessResponse::ok()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/queue",
    tag = "Queue",
    operation_id = "cancelQueueItem",
    summary = "Cancel a queue entry",
    description = "Marks the entry `cancelled`. The row is kept.",
    params(QueueIdQuery),
    responses(
        (status = 200, description = "Entry cancelled", body = SuccessResponse),
        (status = 400, description = "Missing id (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Queue entry not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query), fields(id = ?query.id))]
pub async fn cancel_queue_item(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<QueueIdQuery>,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = query
        .id
        .ok_or_else(|| AppError::Validation("Queue ID required".into()))?;
    update_status(&state.db, id, QueueStatus::Cancelled).await?;
    Ok(Json(SuccessResponse::ok()))
}

async fn update_status<C: ConnectionTrait>(
    db: &C,
    id: i32,
    status: QueueStatus,
) -> Result<queue_item::Model, AppError> {
    let item = queue_item::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Queue item not found".into()))?;

    let mut active: queue_item::ActiveModel = item.into();
    active.status = Set(status);
    if status.stamps_played_at() {
        active.played_at = Set(Some(Utc::now()));
    }
    let item = active.update(db).await?;

    info!(item_id = item.id, status = %status, "Queue status changed");
    Ok(item)
}
