#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a queued song request.
///
/// Transitions are not enforced: any status may be written over any other.
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    /// Waiting for its turn.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "pending"))]
    Pending,
    /// On stage right now.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "playing"))]
    Playing,
    /// Finished.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "played"))]
    Played,
    /// Withdrawn by the table or the host.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "cancelled"))]
    Cancelled,
}

impl QueueStatus {
    /// All possible status values.
    pub const ALL: &'static [QueueStatus] = &[
        Self::Pending,
        Self::Playing,
        Self::Played,
        Self::Cancelled,
    ];

    /// Returns the wire representation (lowercase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Playing => "playing",
            Self::Played => "played",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether moving into this status stamps `played_at`.
    pub fn stamps_played_at(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for QueueStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    invalid: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Valid values: {}",
            self.invalid,
            QueueStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for QueueStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "playing" => Ok(Self::Playing),
            "played" => Ok(Self::Played),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}
