//! Test application: the real router over a throwaway SQLite file and upload root

use std::path::{Path, PathBuf};

use axum::http::HeaderValue;
use axum_test::TestServer;
use base64::prelude::*;
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::core::app::{build_router, AppServices};
use crate::core::config::{
    AdminConfig, AppConfig, AuthConfig, Config, DatabaseConfig, SwaggerConfig, UploadConfig,
};
use crate::modules::storage::LocalStorage;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-secret";

pub struct TestApp {
    pub server: TestServer,
    pub pool: SqlitePool,
    pub storage: LocalStorage,
    pub config: Config,
    // Removed (with the database and uploads) when the app is dropped
    dir: TempDir,
}

pub fn test_config(dir: &Path) -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_allowed_origins: vec!["*".to_string()],
            max_request_body_size: 64 * 1024,
        },
        database: DatabaseConfig {
            url: format!("sqlite://{}?mode=rwc", dir.join("civicsync-test.db").display()),
            max_connections: 4,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 60,
            max_lifetime_secs: 300,
        },
        upload: UploadConfig {
            dir: dir.join("uploads"),
            max_images: 5,
            max_image_size: 1024,
            max_audio_size: 2048,
        },
        auth: AuthConfig { bcrypt_cost: 4 },
        admin: AdminConfig {
            username: Some(ADMIN_USERNAME.to_string()),
            password: Some(ADMIN_PASSWORD.to_string()),
        },
        swagger: SwaggerConfig {
            username: None,
            password: None,
            title: "CivicSync API".to_string(),
            version: "test".to_string(),
            description: "Test instance".to_string(),
        },
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let mut config = test_config(dir.path());
        customize(&mut config);

        let services = AppServices::init(&config)
            .await
            .expect("initialize test services");
        let server =
            TestServer::new(build_router(&services, &config)).expect("start test server");

        Self {
            server,
            pool: services.pool.clone(),
            storage: services.storage.clone(),
            config,
            dir,
        }
    }

    pub fn upload_root(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    /// Number of files currently under `<upload root>/<sub>`
    pub fn files_in(&self, sub: &str) -> usize {
        std::fs::read_dir(self.upload_root().join(sub))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub async fn count_rows(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .expect("count rows")
    }
}

/// `Authorization` header value for the configured admin
pub fn admin_auth() -> HeaderValue {
    basic_auth(ADMIN_USERNAME, ADMIN_PASSWORD)
}

pub fn basic_auth(username: &str, password: &str) -> HeaderValue {
    let encoded = BASE64_STANDARD.encode(format!("{}:{}", username, password));
    HeaderValue::from_str(&format!("Basic {}", encoded)).expect("valid header")
}
