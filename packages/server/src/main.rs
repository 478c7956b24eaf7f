use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use common::storage::BlobStore;
use common::storage::filesystem::FilesystemBlobStore;
use common::storage::s3::{S3BlobStore, S3Settings};
use tracing::info;
use url::Url;

use karaoke_server::config::{AppConfig, StorageBackend, StorageConfig};
use karaoke_server::state::AppState;
use karaoke_server::{build_router, database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = database::init_db(&config.database)
        .await
        .context("Failed to initialize database")?;
    seed::ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;
    seed::seed_bootstrap_admin(&db, &config.auth.bootstrap_admin)
        .await
        .context("Failed to seed bootstrap admin")?;

    let blob_store = init_blob_store(&config.storage).await?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        blob_store,
        config,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn init_blob_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn BlobStore>> {
    let public_base = Url::parse(&config.public_base_url)
        .with_context(|| format!("Invalid storage.public_base_url: {}", config.public_base_url))?;

    let store: Arc<dyn BlobStore> = match config.backend {
        StorageBackend::Filesystem => {
            let store = FilesystemBlobStore::new(
                PathBuf::from(&config.filesystem.path),
                public_base,
                config.max_blob_size,
            )
            .await
            .context("Failed to initialize filesystem storage")?;
            info!(path = %config.filesystem.path, "Using filesystem blob storage");
            Arc::new(store)
        }
        StorageBackend::S3 => {
            let s3 = config
                .s3
                .as_ref()
                .context("storage.backend is \"s3\" but the [storage.s3] section is missing")?;
            let store = S3BlobStore::new(
                &S3Settings {
                    bucket: s3.bucket.clone(),
                    region: s3.region.clone(),
                    endpoint: s3.endpoint.clone(),
                    access_key: s3.access_key.clone(),
                    secret_key: s3.secret_key.clone(),
                },
                public_base,
                config.max_blob_size,
            )
            .context("Failed to initialize S3 storage")?;
            info!(bucket = %s3.bucket, endpoint = %s3.endpoint, "Using S3 blob storage");
            Arc::new(store)
        }
    };

    Ok(store)
}
