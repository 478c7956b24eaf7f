use chrono::Utc;
use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder, SqliteQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{queue_item, user};

/// Role given to the seeded bootstrap account.
pub const ADMIN_ROLE: &str = "admin";

/// Seed the bootstrap admin account if no user with that name exists.
///
/// The account holds [`user::BOOTSTRAP_SENTINEL`] until its first login.
pub async fn seed_bootstrap_admin(db: &DatabaseConnection, username: &str) -> Result<(), DbErr> {
    let model = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(user::BOOTSTRAP_SENTINEL.to_string()),
        role: Set(ADMIN_ROLE.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(
            OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(0) | Err(DbErr::RecordNotInserted) => Ok(()),
        Ok(_) => {
            info!(username, "Seeded bootstrap admin account");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't create partial or composite non-unique
/// indexes, so they are created here on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // A login may be reused once the previous table holding it is inactive.
    // Partial indexes share this syntax on Postgres and SQLite.
    db.execute_unprepared(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_tables_active_login \
         ON tables (login) WHERE is_active",
    )
    .await?;
    info!("Ensured index idx_tables_active_login exists");

    // FIFO listing: WHERE table_id = ? AND status = ? ORDER BY added_at
    let index = Index::create()
        .if_not_exists()
        .name("idx_queue_table_status_added")
        .table(queue_item::Entity)
        .col(queue_item::Column::TableId)
        .col(queue_item::Column::Status)
        .col(queue_item::Column::AddedAt)
        .to_owned();
    let stmt = match db.get_database_backend() {
        DbBackend::Sqlite => index.to_string(SqliteQueryBuilder),
        _ => index.to_string(PostgresQueryBuilder),
    };

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_queue_table_status_added exists"),
        Err(e) => tracing::warn!("Failed to create index idx_queue_table_status_added: {}", e),
    }

    Ok(())
}
