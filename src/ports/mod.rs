pub mod services;
pub mod storage;

// Re-export all port traits for convenience
pub use services::{BucketService, NameStream, ObjectService};
pub use storage::{BucketStream, ObjectStream, StorageBackend};
