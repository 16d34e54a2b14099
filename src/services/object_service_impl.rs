use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use std::path::Path;
use tracing::{debug, info};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{Bucket, Outcome},
        value_objects::ObjectKey,
    },
    ports::{
        services::{BucketService, NameStream, ObjectService},
        storage::ObjectStream,
    },
    services::BucketServiceImpl,
};

/// Object client: resolves the bucket through the bucket client, then works on its objects
#[derive(Clone)]
pub struct ObjectServiceImpl {
    buckets: BucketServiceImpl,
}

impl ObjectServiceImpl {
    /// Create a new ObjectServiceImpl instance
    pub fn new(buckets: BucketServiceImpl) -> Self {
        Self { buckets }
    }

    async fn resolve(&self, bucket_name: &str, object_name: &str) -> StorageResult<(Bucket, ObjectKey)> {
        let key = ObjectKey::new(object_name.to_string())?;
        let bucket = self.buckets.retrieve_bucket(bucket_name).await?;
        Ok((bucket, key))
    }

    async fn upload(&self, bucket_name: &str, object_name: &str, source: &Path) -> StorageResult<()> {
        let (bucket, key) = self.resolve(bucket_name, object_name).await?;
        let object = self
            .buckets
            .backend()
            .upload_object(&bucket, &key, source)
            .await?;

        info!(bucket = %object.bucket, object = %object.key, size = object.size, "object uploaded");
        Ok(())
    }

    async fn download(
        &self,
        bucket_name: &str,
        object_name: &str,
        destination: &Path,
    ) -> StorageResult<()> {
        let (bucket, key) = self.resolve(bucket_name, object_name).await?;
        let written = self
            .buckets
            .backend()
            .download_object(&bucket, &key, destination)
            .await?;

        debug!(bucket = %bucket.name, object = %key, bytes = written, "object downloaded");
        Ok(())
    }

    async fn list(&self, bucket_name: &str) -> StorageResult<ObjectStream> {
        let bucket = self.buckets.retrieve_bucket(bucket_name).await?;
        Ok(self.buckets.backend().list_objects(&bucket))
    }

    /// Downloads sequentially and stops at the first failure; files written
    /// before the failure are left in place.
    async fn download_all(&self, bucket_name: &str, directory: &Path) -> StorageResult<usize> {
        let bucket = self.buckets.retrieve_bucket(bucket_name).await?;
        let backend = self.buckets.backend();
        let mut objects = backend.list_objects(&bucket);
        let mut count = 0;

        while let Some(object) = objects.try_next().await? {
            let destination = object.key.local_path_in(directory)?;
            if let Some(parent) = destination.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|err| StorageError::local_io(parent, err))?;
            }

            backend
                .download_object(&bucket, &object.key, &destination)
                .await?;
            count += 1;
        }

        Ok(count)
    }

    async fn delete(&self, bucket_name: &str, object_name: &str) -> StorageResult<()> {
        let (bucket, key) = self.resolve(bucket_name, object_name).await?;
        self.buckets.backend().delete_object(&bucket, &key).await?;

        info!(bucket = %bucket.name, object = %key, "object deleted");
        Ok(())
    }
}

#[async_trait]
impl ObjectService for ObjectServiceImpl {
    async fn create_object(
        &self,
        bucket_name: &str,
        object_name: &str,
        source: &Path,
    ) -> StorageResult<Outcome> {
        self.upload(bucket_name, object_name, source)
            .await
            .inspect_err(|err| {
                debug!(operation = "create_object", bucket = bucket_name, object = object_name, error = %err, "object operation failed")
            })?;

        Ok(Outcome::created())
    }

    async fn retrieve_object(
        &self,
        bucket_name: &str,
        object_name: &str,
        destination: &Path,
    ) -> StorageResult<Outcome> {
        self.download(bucket_name, object_name, destination)
            .await
            .inspect_err(|err| {
                debug!(operation = "retrieve_object", bucket = bucket_name, object = object_name, error = %err, "object operation failed")
            })?;

        Ok(Outcome::downloaded())
    }

    async fn retrieve_objects(&self, bucket_name: &str) -> StorageResult<ObjectStream> {
        let objects = self.list(bucket_name).await.inspect_err(|err| {
            debug!(operation = "retrieve_objects", bucket = bucket_name, error = %err, "object listing failed")
        })?;

        let bucket = bucket_name.to_string();
        Ok(objects
            .inspect_err(move |err| {
                debug!(operation = "retrieve_objects", bucket = %bucket, error = %err, "object listing failed")
            })
            .boxed())
    }

    async fn download_objects(
        &self,
        bucket_name: &str,
        directory: &Path,
    ) -> StorageResult<Outcome> {
        let count = self
            .download_all(bucket_name, directory)
            .await
            .inspect_err(|err| {
                debug!(operation = "download_objects", bucket = bucket_name, directory = %directory.display(), error = %err, "object operation failed")
            })?;

        debug!(bucket = bucket_name, count, "{} object(s) downloaded successfully", count);
        Ok(Outcome::downloaded())
    }

    async fn retrieve_object_names(&self, bucket_name: &str) -> StorageResult<NameStream> {
        let objects = self.retrieve_objects(bucket_name).await?;
        Ok(objects.map_ok(|object| object.key).boxed())
    }

    async fn delete_object(
        &self,
        bucket_name: &str,
        object_name: &str,
    ) -> StorageResult<Outcome> {
        self.delete(bucket_name, object_name)
            .await
            .inspect_err(|err| {
                debug!(operation = "delete_object", bucket = bucket_name, object = object_name, error = %err, "object operation failed")
            })?;

        Ok(Outcome::deleted())
    }
}
