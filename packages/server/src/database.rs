use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::DatabaseConfig;

pub async fn init_db(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.url.to_owned());

    // Set connection pool options
    opt.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(true);

    if let Some(schema) = config.schema.as_deref().filter(|s| !s.is_empty()) {
        opt.set_schema_search_path(schema);
    }

    let db = Database::connect(opt).await?;
    db.get_schema_registry("karaoke_server::entity::*")
        .sync(&db)
        .await?;

    Ok(db)
}
