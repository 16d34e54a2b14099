mod storage_backend;

pub use storage_backend::{BucketStream, ObjectStream, StorageBackend};
