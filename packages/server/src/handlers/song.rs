use axum::Json;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;
use common::storage::BlobKey;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::{info, instrument, warn};

use crate::entity::song;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::extractors::query::AppQuery;
use crate::models::shared::{escape_like, non_blank};
use crate::models::song::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/songs",
    tag = "Songs",
    operation_id = "listSongs",
    summary = "List the song catalog",
    description = "Returns all songs ordered by artist, then title. `search` matches title or artist case-insensitively as a substring; `genre` must match exactly. Both filters combine with AND; blank values are ignored.",
    params(SongListQuery),
    responses(
        (status = 200, description = "Matching songs", body = SongListResponse),
    ),
)]
#[instrument(skip(state, query), fields(search = ?query.search, genre = ?query.genre))]
pub async fn list_songs(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SongListQuery>,
) -> Result<Json<SongListResponse>, AppError> {
    let mut select = song::Entity::find();

    if let Some(search) = non_blank(&query.search) {
        let pattern = format!("%{}%", escape_like(search).to_lowercase());
        select = select.filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(song::Column::Title)))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(song::Column::Artist)))
                        .like(LikeExpr::new(pattern).escape('\\')),
                ),
        );
    }

    if let Some(genre) = non_blank(&query.genre) {
        select = select.filter(song::Column::Genre.eq(genre));
    }

    let songs = select
        .order_by_asc(song::Column::Artist)
        .order_by_asc(song::Column::Title)
        .order_by_asc(song::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(SongListResponse {
        songs: songs.into_iter().map(SongResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/songs",
    tag = "Songs",
    operation_id = "uploadSong",
    summary = "Upload a song",
    description = "Stores the base64-decoded file under `karaoke/{artist}_{title}.{file_format}` and adds a catalog row pointing at its public URL. Re-uploading the same artist and title replaces the stored file and adds another row.",
    request_body = UploadSongRequest,
    responses(
        (status = 201, description = "Song stored", body = UploadSongResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 413, description = "File too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(title = ?payload.title, artist = ?payload.artist))]
pub async fn upload_song(
    State(state): State<AppState>,
    AppJson(payload): AppJson<UploadSongRequest>,
) -> Result<impl IntoResponse, AppError> {
    let upload = validate_upload(payload)?;

    let key = BlobKey::for_song(&upload.artist, &upload.title, &upload.file_format)?;
    let existed = state.blob_store.exists(&key).await?;

    state
        .blob_store
        .put(&key, &upload.data, &content_type_for(&upload.file_format))
        .await?;
    let file_url = state.blob_store.public_url(&key)?;

    let new_song = song::ActiveModel {
        title: Set(upload.title),
        artist: Set(upload.artist),
        genre: Set(upload.genre),
        file_url: Set(file_url),
        file_format: Set(upload.file_format),
        duration: Set(upload.duration),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let song = match new_song.insert(&state.db).await {
        Ok(song) => song,
        Err(e) => {
            if !existed && let Err(cleanup) = state.blob_store.delete(&key).await {
                warn!(key = %key, "Failed to remove blob after insert error: {}", cleanup);
            }
            return Err(e.into());
        }
    };

    info!(song_id = song.id, key = %key, bytes = upload.data.len(), "Song uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadSongResponse {
            success: true,
            song: song.into(),
        }),
    ))
}

/// Body limit layer for the upload route.
pub fn upload_body_limit(max_upload_size: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_upload_size)
}
