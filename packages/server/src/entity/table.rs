use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A bar table with its own time-limited login.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tables")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub table_number: i32,
    /// Unique among active tables (partial index, see `seed::ensure_indexes`).
    pub login: String,
    pub password_hash: String,
    pub expires_at: DateTimeUtc,
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_by: Option<i32>,
    #[sea_orm(belongs_to, from = "created_by", to = "id")]
    pub creator: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub queue_items: HasMany<super::queue_item::Entity>,

    pub created_at: DateTimeUtc,
}

impl Model {
    /// A session is over once `now` reaches `expires_at`.
    pub fn is_expired_at(&self, now: DateTimeUtc) -> bool {
        now >= self.expires_at
    }
}

impl ActiveModelBehavior for ActiveModel {}
