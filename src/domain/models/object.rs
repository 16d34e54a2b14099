use chrono::{DateTime, Utc};

use crate::domain::value_objects::{BucketName, ObjectKey};

/// Handle to an object stored in a bucket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHandle {
    pub bucket: BucketName,
    pub key: ObjectKey,
    pub size: u64,
    pub etag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}
