use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    domain::{
        errors::StorageResult,
        models::{Bucket, ListBucketsRequest, Outcome},
        value_objects::{BucketName, Location},
    },
    ports::{
        services::BucketService,
        storage::{BucketStream, StorageBackend},
    },
};

/// Bucket client: validates names and forwards bucket operations to the backend
#[derive(Clone)]
pub struct BucketServiceImpl {
    backend: Arc<dyn StorageBackend>,
    default_location: Location,
}

impl BucketServiceImpl {
    /// Create a new BucketServiceImpl over a connected backend
    pub fn new(backend: Arc<dyn StorageBackend>, default_location: Location) -> Self {
        Self {
            backend,
            default_location,
        }
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    pub fn default_location(&self) -> &Location {
        &self.default_location
    }

    async fn create(&self, name: &str, location: Option<&str>) -> StorageResult<Bucket> {
        let name = BucketName::new(name.to_string())?;
        let location = match location {
            Some(location) => Location::new(location.to_string())?,
            None => self.default_location.clone(),
        };

        self.backend.create_bucket(&name, &location).await
    }

    async fn resolve(&self, name: &str) -> StorageResult<Bucket> {
        let name = BucketName::new(name.to_string())?;
        self.backend.get_bucket(&name).await
    }

    async fn delete(&self, name: &str, force: bool) -> StorageResult<Bucket> {
        let bucket = self.resolve(name).await?;
        self.backend.delete_bucket(&bucket, force).await?;
        Ok(bucket)
    }
}

#[async_trait]
impl BucketService for BucketServiceImpl {
    async fn create_bucket(&self, name: &str, location: Option<&str>) -> StorageResult<Outcome> {
        let bucket = self.create(name, location).await.inspect_err(|err| {
            debug!(operation = "create_bucket", bucket = name, error = %err, "bucket operation failed")
        })?;

        info!(bucket = %bucket.name, location = %bucket.location, "bucket created");
        Ok(Outcome::created())
    }

    async fn retrieve_bucket(&self, name: &str) -> StorageResult<Bucket> {
        self.resolve(name).await.inspect_err(|err| {
            debug!(operation = "retrieve_bucket", bucket = name, error = %err, "bucket operation failed")
        })
    }

    fn retrieve_buckets(&self, request: ListBucketsRequest) -> BucketStream {
        self.backend
            .list_buckets(request)
            .inspect_err(|err| {
                debug!(operation = "retrieve_buckets", error = %err, "bucket listing failed")
            })
            .boxed()
    }

    async fn delete_bucket(&self, name: &str, force: bool) -> StorageResult<Outcome> {
        let bucket = self.delete(name, force).await.inspect_err(|err| {
            debug!(operation = "delete_bucket", bucket = name, force, error = %err, "bucket operation failed")
        })?;

        info!(bucket = %bucket.name, force, "bucket deleted");
        Ok(Outcome::deleted())
    }
}
