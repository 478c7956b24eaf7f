use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored in `password_hash` until the account's first login sets a real password.
pub const BOOTSTRAP_SENTINEL: &str = "temp_hash";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    /// Argon2 PHC string, or [`BOOTSTRAP_SENTINEL`].
    pub password_hash: String,
    pub role: String,

    #[sea_orm(has_many)]
    pub tables: HasMany<super::table::Entity>,

    pub created_at: DateTimeUtc,
}

impl Model {
    pub fn needs_bootstrap(&self) -> bool {
        self.password_hash == BOOTSTRAP_SENTINEL
    }
}

impl ActiveModelBehavior for ActiveModel {}
