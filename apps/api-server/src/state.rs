//! Application state - shared across all handlers.

use std::sync::Arc;

use inkpost_core::ports::{PostRepository, StorageError, UploadStore, UserRepository};
use inkpost_core::services::{AuthService, PostService};
use inkpost_infra::database::DatabaseConfig;
use inkpost_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemoryUserRepository, JwtTokenService,
    LocalUploadStore,
};

#[cfg(feature = "postgres")]
use inkpost_infra::{PostgresPostRepository, PostgresUserRepository, database};

use crate::config::AppConfig;

/// Which backend the stores run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Postgres,
    InMemory,
}

impl StorageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageMode::Postgres => "postgres",
            StorageMode::InMemory => "in-memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub posts: Arc<PostService>,
    pub secure_cookies: bool,
    pub max_upload_bytes: usize,
    pub storage: StorageMode,
}

type Stores = (Arc<dyn UserRepository>, Arc<dyn PostRepository>, StorageMode);

fn in_memory_stores() -> Stores {
    let users = Arc::new(InMemoryUserRepository::new());
    let posts = Arc::new(InMemoryPostRepository::new(users.clone()));
    (users, posts, StorageMode::InMemory)
}

#[cfg(feature = "postgres")]
async fn stores(db_config: Option<&DatabaseConfig>) -> Stores {
    let Some(config) = db_config else {
        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        return in_memory_stores();
    };

    match database::connect(config).await {
        Ok(conn) => {
            let pool = Arc::new(conn);
            (
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresPostRepository::new(pool)),
                StorageMode::Postgres,
            )
        }
        Err(e) => {
            tracing::error!(
                "Failed to connect to database: {}. Using in-memory fallback.",
                e
            );
            in_memory_stores()
        }
    }
}

#[cfg(not(feature = "postgres"))]
async fn stores(_db_config: Option<&DatabaseConfig>) -> Stores {
    tracing::info!("Running without postgres feature - using in-memory stores");
    in_memory_stores()
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, StorageError> {
        let (users, posts, storage) = stores(config.database.as_ref()).await;
        let uploads = Arc::new(LocalUploadStore::open(&config.uploads.dir).await?);
        tracing::info!(dir = %uploads.dir().display(), "Upload directory ready");

        let state = Self::from_parts(users, posts, uploads, storage, config);
        tracing::info!(storage = storage.as_str(), "Application state initialized");
        Ok(state)
    }

    /// Wire the services over already-built stores.
    pub fn from_parts(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        uploads: Arc<dyn UploadStore>,
        storage: StorageMode,
        config: &AppConfig,
    ) -> Self {
        let tokens = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords = Arc::new(Argon2PasswordService::new());

        Self {
            auth: Arc::new(AuthService::new(users.clone(), passwords, tokens)),
            posts: Arc::new(PostService::new(posts, users, uploads)),
            secure_cookies: config.secure_cookies,
            max_upload_bytes: config.uploads.max_bytes,
            storage,
        }
    }
}
