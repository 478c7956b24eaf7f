use chrono::{DateTime, Utc};
use common::QueueStatus;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QueueListQuery {
    /// Only items requested by this table.
    pub table_id: Option<i32>,
    /// Status to list. Defaults to `pending`; an empty value lists every status.
    pub status: Option<String>,
}

/// Resolve the status filter of a queue listing.
///
/// Absent means `pending`; present but blank disables the filter.
pub fn resolve_status_filter(status: Option<&str>) -> Result<Option<QueueStatus>, AppError> {
    match status.map(str::trim) {
        None => Ok(Some(QueueStatus::Pending)),
        Some("") => Ok(None),
        Some(s) => s
            .parse::<QueueStatus>()
            .map(Some)
            .map_err(|e| AppError::Validation(e.to_string())),
    }
}

/// Song details embedded in a queue entry.
#[derive(Serialize, utoipa::ToSchema)]
pub struct QueuedSong {
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub file_url: String,
    pub file_format: String,
}

impl From<crate::entity::song::Model> for QueuedSong {
    fn from(s: crate::entity::song::Model) -> Self {
        Self {
            title: s.title,
            artist: s.artist,
            genre: s.genre,
            file_url: s.file_url,
            file_format: s.file_format,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QueueEntry {
    pub id: i32,
    pub song_id: i32,
    pub table_id: i32,
    pub status: QueueStatus,
    pub added_at: DateTime<Utc>,
    pub played_at: Option<DateTime<Utc>>,
    pub song: QueuedSong,
    pub table_number: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QueueListResponse {
    pub queue: Vec<QueueEntry>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct EnqueueRequest {
    #[schema(example = 5)]
    pub song_id: Option<i32>,
    #[schema(example = 2)]
    pub table_id: Option<i32>,
}

pub fn validate_enqueue(payload: &EnqueueRequest) -> Result<(i32, i32), AppError> {
    match (payload.song_id, payload.table_id) {
        (Some(song_id), Some(table_id)) if song_id > 0 && table_id > 0 => Ok((song_id, table_id)),
        _ => Err(AppError::Validation(
            "song_id and table_id required".into(),
        )),
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EnqueuedItem {
    pub id: i32,
    pub song_id: i32,
    pub table_id: i32,
    pub status: QueueStatus,
    pub added_at: DateTime<Utc>,
}

impl From<crate::entity::queue_item::Model> for EnqueuedItem {
    fn from(m: crate::entity::queue_item::Model) -> Self {
        Self {
            id: m.id,
            song_id: m.song_id,
            table_id: m.table_id,
            status: m.status,
            added_at: m.added_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EnqueueResponse {
    #[schema(example = true)]
    pub success: bool,
    pub item: EnqueuedItem,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct SetStatusRequest {
    #[schema(example = 17)]
    pub id: Option<i32>,
    #[schema(example = "playing")]
    pub status: Option<String>,
}

pub fn validate_set_status(payload: &SetStatusRequest) -> Result<(i32, QueueStatus), AppError> {
    let (Some(id), Some(status)) = (
        payload.id.filter(|id| *id > 0),
        payload.status.as_deref().map(str::trim).filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::Validation("id and status required".into()));
    };
    let status = status
        .parse::<QueueStatus>()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    Ok((id, status))
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QueueIdQuery {
    /// Queue item to cancel.
    pub id: Option<i32>,
}
