use crate::{
    domain::{
        errors::StorageResult,
        models::{Bucket, ListBucketsRequest, Outcome},
    },
    ports::storage::BucketStream,
};
use async_trait::async_trait;

/// Port for bucket level operations
/// Names arrive unvalidated; malformed names are reported as validation errors
#[async_trait]
pub trait BucketService: Send + Sync + 'static {
    /// Create a bucket, in the default location when `location` is `None`
    async fn create_bucket(&self, name: &str, location: Option<&str>) -> StorageResult<Outcome>;

    /// Resolve a bucket by name
    async fn retrieve_bucket(&self, name: &str) -> StorageResult<Bucket>;

    /// Enumerate buckets, optionally bounded and filtered by prefix
    fn retrieve_buckets(&self, request: ListBucketsRequest) -> BucketStream;

    /// Delete a bucket; without `force` only empty buckets can be deleted
    async fn delete_bucket(&self, name: &str, force: bool) -> StorageResult<Outcome>;
}
