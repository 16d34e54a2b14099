use chrono::{DateTime, Utc};

use crate::domain::value_objects::{BucketName, Location};

/// Handle to a bucket that exists in the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: BucketName,
    pub location: Location,
    pub created: Option<DateTime<Utc>>,
}

/// Request to enumerate buckets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBucketsRequest {
    /// Stop after this many buckets
    pub max_results: Option<usize>,
    /// Only return buckets whose name starts with this prefix
    pub prefix: Option<String>,
}

impl ListBucketsRequest {
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Whether a bucket name passes the prefix filter
    pub fn matches(&self, name: &BucketName) -> bool {
        self.prefix
            .as_deref()
            .map_or(true, |prefix| name.as_str().starts_with(prefix))
    }
}
