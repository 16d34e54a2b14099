use std::path::Path;

use crate::{
    domain::{errors::StorageResult, models::Outcome, value_objects::ObjectKey},
    ports::storage::ObjectStream,
};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Lazy sequence of object names in one bucket
pub type NameStream = BoxStream<'static, StorageResult<ObjectKey>>;

/// Port for object level operations scoped to a named bucket
#[async_trait]
pub trait ObjectService: Send + Sync + 'static {
    /// Upload a local file as `object_name`
    async fn create_object(
        &self,
        bucket_name: &str,
        object_name: &str,
        source: &Path,
    ) -> StorageResult<Outcome>;

    /// Download `object_name` to a local file
    async fn retrieve_object(
        &self,
        bucket_name: &str,
        object_name: &str,
        destination: &Path,
    ) -> StorageResult<Outcome>;

    /// List every object in the bucket as handles
    async fn retrieve_objects(&self, bucket_name: &str) -> StorageResult<ObjectStream>;

    /// Download every object in the bucket into `directory`, named after the object
    async fn download_objects(&self, bucket_name: &str, directory: &Path)
        -> StorageResult<Outcome>;

    /// List the names of every object in the bucket
    async fn retrieve_object_names(&self, bucket_name: &str) -> StorageResult<NameStream>;

    /// Delete a single object
    async fn delete_object(&self, bucket_name: &str, object_name: &str)
        -> StorageResult<Outcome>;
}
