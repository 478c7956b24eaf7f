use std::fmt;

use super::error::StorageError;

/// Prefix under which song audio files are stored.
pub const SONG_PREFIX: &str = "karaoke";

/// Longest file name, in bytes, that common filesystems accept.
pub const MAX_FILE_NAME_LEN: usize = 255;

/// A validated object key: `/`-separated, relative, no `..` or empty segments.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BlobKey(String);

impl BlobKey {
    /// Validate a raw key.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        if raw.is_empty() {
            return Err(StorageError::InvalidKey("key is empty".into()));
        }
        if raw.len() > 1024 {
            return Err(StorageError::InvalidKey(format!(
                "key is {} bytes, max 1024",
                raw.len()
            )));
        }
        if raw.chars().any(|c| c.is_control() || c == '\\') {
            return Err(StorageError::InvalidKey(
                "control characters and backslashes are not allowed".into(),
            ));
        }
        for segment in raw.split('/') {
            match segment {
                "" => {
                    return Err(StorageError::InvalidKey(
                        "empty path segment (leading, trailing or doubled '/')".into(),
                    ));
                }
                "." | ".." => {
                    return Err(StorageError::InvalidKey(format!(
                        "'{segment}' segments are not allowed"
                    )));
                }
                _ => {}
            }
        }
        Ok(Self(raw.to_string()))
    }

    /// Key for an uploaded song: `karaoke/{artist}_{title}.{format}`.
    ///
    /// Characters that would change the key's structure (path separators,
    /// URL delimiters and escapes, control characters) are replaced with `_`. Repeated
    /// uploads of the same artist/title/format map to the same key.
    pub fn for_song(artist: &str, title: &str, format: &str) -> Result<Self, StorageError> {
        let name = song_file_name(artist, title, format);
        if name.len() > MAX_FILE_NAME_LEN {
            return Err(StorageError::InvalidKey(format!(
                "file name is {} bytes, max {MAX_FILE_NAME_LEN}",
                name.len()
            )));
        }
        Self::parse(&format!("{SONG_PREFIX}/{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

/// File name part of a song key: `{artist}_{title}.{format}`.
pub fn song_file_name(artist: &str, title: &str, format: &str) -> String {
    format!(
        "{}_{}.{}",
        sanitize_component(artist.trim()),
        sanitize_component(title.trim()),
        sanitize_component(format.trim()),
    )
}

fn sanitize_component(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '/' | '\\' | '?' | '#' | '%' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

impl fmt::Debug for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlobKey({})", self.0)
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlobKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
