use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Method};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde_json::{Value, json};
use tempfile::TempDir;
use url::Url;

use common::storage::filesystem::FilesystemBlobStore;
use karaoke_server::config::{
    AppConfig, AuthConfig, CorsConfig, DatabaseConfig, FilesystemStorageConfig, ServerConfig,
    StorageBackend, StorageConfig,
};
use karaoke_server::entity::table;
use karaoke_server::state::AppState;
use karaoke_server::utils::hash;

pub const BOOTSTRAP_ADMIN: &str = "admin";

pub mod routes {
    pub const AUTH: &str = "/api/v1/auth";
    pub const SONGS: &str = "/api/v1/songs";
    pub const QUEUE: &str = "/api/v1/queue";
    pub const TABLES: &str = "/api/v1/tables";
}

/// A running test server backed by its own SQLite file and media directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub media_dir: PathBuf,
    _data_dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    pub headers: reqwest::header::HeaderMap,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let data_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = data_dir.path().join("karaoke.db");
        let media_dir = data_dir.path().join("media");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();
        let public_base_url = format!("http://{addr}{}", karaoke_server::MEDIA_ROUTE);

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: addr.port(),
                cors: CorsConfig {
                    allow_origins: vec!["*".to_string()],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: format!("sqlite://{}?mode=rwc", db_path.display()),
                schema: None,
                max_connections: 5,
            },
            storage: StorageConfig {
                backend: StorageBackend::Filesystem,
                max_upload_size: 4 * 1024 * 1024,
                max_blob_size: 1024 * 1024,
                public_base_url: public_base_url.clone(),
                filesystem: FilesystemStorageConfig {
                    path: media_dir.display().to_string(),
                },
                s3: None,
            },
            auth: AuthConfig {
                bootstrap_admin: BOOTSTRAP_ADMIN.to_string(),
            },
        };

        let db = karaoke_server::database::init_db(&app_config.database)
            .await
            .expect("Failed to initialize test database");
        karaoke_server::seed::ensure_indexes(&db)
            .await
            .expect("Failed to create indexes");
        karaoke_server::seed::seed_bootstrap_admin(&db, BOOTSTRAP_ADMIN)
            .await
            .expect("Failed to seed bootstrap admin");

        let blob_store = FilesystemBlobStore::new(
            media_dir.clone(),
            Url::parse(&public_base_url).unwrap(),
            app_config.storage.max_blob_size,
        )
        .await
        .expect("Failed to create blob store");

        let state = AppState {
            db: db.clone(),
            blob_store: Arc::new(blob_store),
            config: app_config,
        };

        let app = karaoke_server::build_router(state);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            media_dir,
            _data_dir: data_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(self.client.get(self.url(path))).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> TestResponse {
        self.send(self.client.put(self.url(path)).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.send(self.client.delete(self.url(path))).await
    }

    /// POST a raw body labelled as JSON.
    pub async fn send_raw(&self, path: &str, body: &str) -> TestResponse {
        self.send(
            self.client
                .post(self.url(path))
                .header("Content-Type", "application/json")
                .body(body.to_string()),
        )
        .await
    }

    pub async fn request(&self, method: Method, path: &str) -> TestResponse {
        self.send(self.client.request(method, self.url(path))).await
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> TestResponse {
        let res = req.send().await.expect("Failed to send request");
        TestResponse::from_response(res).await
    }

    /// Upload a `kar` song through the API.
    pub async fn upload_song(
        &self,
        title: &str,
        artist: &str,
        genre: Option<&str>,
        data: &[u8],
    ) -> TestResponse {
        let mut body = json!({
            "title": title,
            "artist": artist,
            "file_format": "kar",
            "file_data": STANDARD.encode(data),
        });
        if let Some(genre) = genre {
            body["genre"] = json!(genre);
        }
        self.post(routes::SONGS, &body).await
    }

    pub async fn create_song(&self, title: &str, artist: &str, genre: Option<&str>) -> i32 {
        let res = self.upload_song(title, artist, genre, b"MThd-test").await;
        assert_eq!(res.status, 201, "upload_song failed: {}", res.text);
        res.body["song"]["id"]
            .as_i64()
            .expect("song response should contain an id") as i32
    }

    /// Create a table through the API and return its `id`.
    pub async fn create_table(&self, table_number: i32, login: &str, password: &str) -> i32 {
        let res = self
            .post(
                routes::TABLES,
                &json!({
                    "table_number": table_number,
                    "login": login,
                    "password": password,
                }),
            )
            .await;
        assert_eq!(res.status, 201, "create_table failed: {}", res.text);
        res.body["table"]["id"]
            .as_i64()
            .expect("table response should contain an id") as i32
    }

    /// Insert an active table row directly, bypassing validation of `expires_at`.
    pub async fn insert_table(
        &self,
        table_number: i32,
        login: &str,
        password: &str,
        expires_at: DateTime<Utc>,
    ) -> i32 {
        let model = table::ActiveModel {
            table_number: Set(table_number),
            login: Set(login.to_string()),
            password_hash: Set(hash::hash_password(password).unwrap()),
            expires_at: Set(expires_at),
            is_active: Set(true),
            created_by: Set(None),
            created_at: Set(Utc::now() - Duration::hours(3)),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .expect("Failed to insert table");
        model.id
    }

    pub async fn find_table(&self, id: i32) -> table::Model {
        table::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .expect("DB query failed")
            .expect("table should exist")
    }

    pub async fn enqueue(&self, song_id: i32, table_id: i32) -> i32 {
        let res = self
            .post(
                routes::QUEUE,
                &json!({"song_id": song_id, "table_id": table_id}),
            )
            .await;
        assert_eq!(res.status, 201, "enqueue failed: {}", res.text);
        res.body["item"]["id"]
            .as_i64()
            .expect("item response should contain an id") as i32
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            headers,
            text,
            body,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
