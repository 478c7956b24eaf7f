use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use common::storage::{MAX_FILE_NAME_LEN, song_file_name};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::shared::non_blank;

/// Genre stored when an upload does not name one.
pub const DEFAULT_GENRE: &str = "uncategorized";

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SongListQuery {
    /// Case-insensitive substring matched against title or artist.
    pub search: Option<String>,
    /// Exact genre match.
    pub genre: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SongResponse {
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = "Bohemian Rhapsody")]
    pub title: String,
    #[schema(example = "Queen")]
    pub artist: String,
    #[schema(example = "rock")]
    pub genre: String,
    pub file_url: String,
    #[schema(example = "kar")]
    pub file_format: String,
    /// Length in seconds, when known.
    pub duration: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::song::Model> for SongResponse {
    fn from(m: crate::entity::song::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            artist: m.artist,
            genre: m.genre,
            file_url: m.file_url,
            file_format: m.file_format,
            duration: m.duration,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SongListResponse {
    pub songs: Vec<SongResponse>,
}

/// Request body for a song upload. The audio file travels base64-encoded.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UploadSongRequest {
    #[schema(example = "Bohemian Rhapsody")]
    pub title: Option<String>,
    #[schema(example = "Queen")]
    pub artist: Option<String>,
    /// Defaults to `uncategorized`.
    #[schema(example = "rock")]
    pub genre: Option<String>,
    /// File extension without the dot.
    #[schema(example = "kar")]
    pub file_format: Option<String>,
    /// Base64-encoded file contents (a `data:` URL is also accepted).
    pub file_data: Option<String>,
    /// Length in seconds.
    pub duration: Option<i32>,
}

/// An upload with decoded payload and normalised fields.
#[derive(Debug)]
pub struct ValidatedUpload {
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub file_format: String,
    pub data: Vec<u8>,
    pub duration: Option<i32>,
}

pub fn validate_upload(payload: UploadSongRequest) -> Result<ValidatedUpload, AppError> {
    let (Some(title), Some(artist), Some(file_format), Some(file_data)) = (
        non_blank(&payload.title),
        non_blank(&payload.artist),
        non_blank(&payload.file_format),
        non_blank(&payload.file_data),
    ) else {
        return Err(AppError::Validation(
            "Title, artist, file_format and file_data required".into(),
        ));
    };

    if title.chars().count() > 256 || artist.chars().count() > 256 {
        return Err(AppError::Validation(
            "Title and artist must be at most 256 characters".into(),
        ));
    }

    let file_format = file_format.trim_start_matches('.').to_ascii_lowercase();
    if file_format.is_empty()
        || file_format.len() > 10
        || !file_format.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(AppError::Validation(
            "file_format must be 1-10 letters or digits".into(),
        ));
    }

    if song_file_name(artist, title, &file_format).len() > MAX_FILE_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Artist and title together must fit in a {MAX_FILE_NAME_LEN}-byte file name"
        )));
    }

    if let Some(duration) = payload.duration
        && duration < 0
    {
        return Err(AppError::Validation("duration must be >= 0".into()));
    }

    let data = decode_file_data(file_data)?;
    if data.is_empty() {
        return Err(AppError::Validation("file_data is empty".into()));
    }

    Ok(ValidatedUpload {
        title: title.to_string(),
        artist: artist.to_string(),
        genre: non_blank(&payload.genre).unwrap_or(DEFAULT_GENRE).to_string(),
        file_format,
        data,
        duration: payload.duration,
    })
}

fn decode_file_data(encoded: &str) -> Result<Vec<u8>, AppError> {
    let encoded = match encoded.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| AppError::Validation("Malformed data URL in file_data".into()))?,
        None => encoded,
    };
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| AppError::Validation(format!("file_data is not valid base64: {e}")))
}

/// Content type for a stored audio file.
pub fn content_type_for(file_format: &str) -> String {
    mime_guess::from_ext(file_format)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| format!("audio/{file_format}"))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadSongResponse {
    #[schema(example = true)]
    pub success: bool,
    pub song: SongResponse,
}
