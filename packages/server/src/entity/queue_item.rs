use common::QueueStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One table's request to sing one song.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "queue")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub song_id: i32,
    #[sea_orm(belongs_to, from = "song_id", to = "id")]
    pub song: HasOne<super::song::Entity>,

    pub table_id: i32,
    #[sea_orm(belongs_to, from = "table_id", to = "id")]
    pub table: HasOne<super::table::Entity>,

    pub status: QueueStatus,

    pub added_at: DateTimeUtc,
    /// Set when the item last moved to `playing`.
    pub played_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
