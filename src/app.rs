use std::{path::PathBuf, sync::Arc};

use crate::{
    adapters::outbound::storage::{GcsBackend, GcsConfig, InMemoryBackend},
    domain::{errors::StorageError, value_objects::Location},
    ports::storage::StorageBackend,
    services::{BucketServiceImpl, ObjectServiceImpl},
};

/// Selects the storage backend, `memory` or `gcs`
pub const STORAGE_BACKEND: &str = "STORAGE_BACKEND";
/// Service account key file for the `gcs` backend
pub const GCP_CREDENTIALS: &str = "GCP_CREDENTIALS";
/// Project owning the buckets for the `gcs` backend
pub const GCP_PROJECT_ID: &str = "GCP_PROJECT_ID";
/// Location of buckets created without one
pub const DEFAULT_LOCATION: &str = "DEFAULT_LOCATION";

/// Configuration for the application
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub backend: BackendKind,
    pub default_location: Location,
}

/// Storage backend configuration
#[derive(Debug, Clone, Default)]
pub enum BackendKind {
    #[default]
    InMemory,
    Gcs(GcsConfig),
}

impl AppConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, keyed by the constants above
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup(STORAGE_BACKEND).as_deref() {
            None | Some("memory") => BackendKind::InMemory,
            Some("gcs") => {
                let credentials_path =
                    lookup(GCP_CREDENTIALS).ok_or_else(|| AppError::Configuration {
                        message: format!("{} is required for the gcs backend", GCP_CREDENTIALS),
                    })?;

                BackendKind::Gcs(GcsConfig {
                    credentials_path: PathBuf::from(credentials_path),
                    project_id: lookup(GCP_PROJECT_ID),
                })
            }
            Some(other) => {
                return Err(AppError::Configuration {
                    message: format!("Unknown {} '{}'", STORAGE_BACKEND, other),
                })
            }
        };

        let default_location = match lookup(DEFAULT_LOCATION) {
            Some(location) => Location::new(location).map_err(|err| AppError::Configuration {
                message: format!("Invalid {}: {}", DEFAULT_LOCATION, err),
            })?,
            None => Location::default(),
        };

        Ok(Self {
            backend,
            default_location,
        })
    }
}

/// Application services container
#[derive(Clone)]
pub struct AppServices {
    pub bucket_service: BucketServiceImpl,
    pub object_service: ObjectServiceImpl,
}

/// Application builder for dependency injection
pub struct AppBuilder {
    config: AppConfig,
    backend: Option<Arc<dyn StorageBackend>>,
}

impl AppBuilder {
    /// Create a new application builder
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            backend: None,
        }
    }

    /// Configure the application with custom settings
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Use an already constructed backend instead of the configured one
    pub fn with_backend(mut self, backend: Arc<dyn StorageBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_default_location(mut self, location: Location) -> Self {
        self.config.default_location = location;
        self
    }

    /// Connect the configured storage backend
    async fn build_backend(&self) -> Result<Arc<dyn StorageBackend>, AppError> {
        if let Some(backend) = &self.backend {
            return Ok(Arc::clone(backend));
        }

        match &self.config.backend {
            BackendKind::InMemory => Ok(Arc::new(InMemoryBackend::new())),
            BackendKind::Gcs(config) => {
                let backend = GcsBackend::connect(config.clone()).await?;
                Ok(Arc::new(backend))
            }
        }
    }

    /// Build the complete application with services
    pub async fn build(self) -> Result<AppServices, AppError> {
        let backend = self.build_backend().await?;

        let bucket_service = BucketServiceImpl::new(backend, self.config.default_location);
        let object_service = ObjectServiceImpl::new(bucket_service.clone());

        Ok(AppServices {
            bucket_service,
            object_service,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage initialization error: {0}")]
    StorageInit(#[from] StorageError),
}

/// Create an in-memory application for testing and development
pub async fn create_in_memory_app() -> Result<AppServices, AppError> {
    AppBuilder::new().build().await
}

/// Create a Cloud Storage backed application
pub async fn create_gcs_app(config: GcsConfig) -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_config(AppConfig {
            backend: BackendKind::Gcs(config),
            default_location: Location::default(),
        })
        .build()
        .await
}

/// Create application from environment variables
pub async fn create_app_from_env() -> Result<AppServices, AppError> {
    AppBuilder::new()
        .with_config(AppConfig::from_env()?)
        .build()
        .await
}
