use std::path::Path;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::{
    errors::StorageResult,
    models::{Bucket, ListBucketsRequest, ObjectHandle},
    value_objects::{BucketName, Location, ObjectKey},
};

/// Lazy sequence of buckets; errors are yielded in place and end the listing
pub type BucketStream = BoxStream<'static, StorageResult<Bucket>>;

/// Lazy sequence of objects in one bucket
pub type ObjectStream = BoxStream<'static, StorageResult<ObjectHandle>>;

/// Port for the cloud storage backend
/// This abstracts the vendor SDK (transport, auth, retries, pagination)
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Create a bucket in the given location
    async fn create_bucket(&self, name: &BucketName, location: &Location)
        -> StorageResult<Bucket>;

    /// Look up an existing bucket
    async fn get_bucket(&self, name: &BucketName) -> StorageResult<Bucket>;

    /// Enumerate buckets; every call starts a fresh listing
    fn list_buckets(&self, request: ListBucketsRequest) -> BucketStream;

    /// Delete a bucket; `force` deletes its objects first
    async fn delete_bucket(&self, bucket: &Bucket, force: bool) -> StorageResult<()>;

    /// Upload the local file at `source` as `key`
    async fn upload_object(
        &self,
        bucket: &Bucket,
        key: &ObjectKey,
        source: &Path,
    ) -> StorageResult<ObjectHandle>;

    /// Download `key` into the local file at `destination`, returning bytes written
    async fn download_object(
        &self,
        bucket: &Bucket,
        key: &ObjectKey,
        destination: &Path,
    ) -> StorageResult<u64>;

    /// Delete a single object
    async fn delete_object(&self, bucket: &Bucket, key: &ObjectKey) -> StorageResult<()>;

    /// Enumerate every object in a bucket; every call starts a fresh listing
    fn list_objects(&self, bucket: &Bucket) -> ObjectStream;
}
