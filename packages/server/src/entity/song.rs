use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "songs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    pub artist: String,
    pub genre: String,
    /// Public URL of the audio object in the blob store.
    pub file_url: String,
    pub file_format: String, // lowercase extension, e.g. "kar", "mid"
    pub duration: Option<i32>, // in seconds

    #[sea_orm(has_many)]
    pub queue_items: HasMany<super::queue_item::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
