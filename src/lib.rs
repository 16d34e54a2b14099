pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - core business entities and value objects
pub use domain::{
    // Models
    Bucket,
    // Value objects
    BucketName,
    // Errors
    ErrorKind,
    ListBucketsRequest,
    Location,
    ObjectHandle,
    ObjectKey,
    Outcome,
    StorageError,
    StorageResult,
    ValidationError,
};

// Port types - interfaces for external systems
pub use ports::{
    // Service ports
    BucketService,
    // Storage ports
    BucketStream,
    NameStream,
    ObjectService,
    ObjectStream,
    StorageBackend,
};

// Service implementations - business logic
pub use services::{BucketServiceImpl, ObjectServiceImpl};

// Application factory and configuration
pub use app::{
    create_app_from_env, create_gcs_app, create_in_memory_app, AppBuilder, AppConfig, AppError,
    AppServices, BackendKind,
};

// Adapter types - infrastructure implementations
pub use adapters::outbound::storage::{GcsBackend, GcsConfig, InMemoryBackend};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_app_from_env, create_in_memory_app, AppBuilder, AppServices, BucketName,
        BucketService, ErrorKind, InMemoryBackend, ListBucketsRequest, ObjectKey, ObjectService,
        Outcome, StorageError, StorageResult,
    };
}
