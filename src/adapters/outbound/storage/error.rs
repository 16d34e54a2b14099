use crate::domain::{
    errors::StorageError,
    value_objects::{BucketName, ObjectKey},
};

/// Convert an object_store error raised while working on `bucket/key`
pub fn object_error(err: object_store::Error, bucket: &BucketName, key: &ObjectKey) -> StorageError {
    match err {
        object_store::Error::NotFound { .. } => StorageError::ObjectNotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        err @ object_store::Error::PermissionDenied { .. } => StorageError::AccessDenied {
            message: err.to_string(),
        },
        err @ object_store::Error::Unauthenticated { .. } => StorageError::Authentication {
            message: format!("Credentials rejected for {}/{}", bucket, key),
            source: Some(Box::new(err)),
        },
        err => StorageError::backend(format!("Object operation on {}/{} failed", bucket, key), err),
    }
}

/// Convert an object_store error raised while listing `bucket`
pub fn listing_error(err: object_store::Error, bucket: &BucketName) -> StorageError {
    match err {
        object_store::Error::NotFound { .. } => StorageError::BucketNotFound {
            bucket: bucket.to_string(),
        },
        err @ object_store::Error::PermissionDenied { .. } => StorageError::AccessDenied {
            message: err.to_string(),
        },
        err @ object_store::Error::Unauthenticated { .. } => StorageError::Authentication {
            message: format!("Credentials rejected while listing {}", bucket),
            source: Some(Box::new(err)),
        },
        err => StorageError::backend(format!("Failed to list objects in {}", bucket), err),
    }
}
