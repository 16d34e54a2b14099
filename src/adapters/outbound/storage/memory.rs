use async_trait::async_trait;
use chrono::Utc;
use futures::{stream, StreamExt, TryStreamExt};
use object_store::{memory::InMemory, ObjectStore};
use std::{collections::BTreeMap, path::Path, sync::Arc};
use tokio::sync::RwLock;
use tracing::debug;

use super::transfer;
use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{Bucket, ListBucketsRequest, ObjectHandle},
        value_objects::{BucketName, Location, ObjectKey},
    },
    ports::storage::{BucketStream, ObjectStream, StorageBackend},
};

type BucketTable = BTreeMap<BucketName, BucketEntry>;

/// In-memory implementation of StorageBackend for testing and development
///
/// Every bucket owns its own `object_store` in-memory store.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    buckets: Arc<RwLock<BucketTable>>,
}

#[derive(Clone)]
struct BucketEntry {
    bucket: Bucket,
    store: Arc<InMemory>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    async fn store_for(&self, name: &BucketName) -> StorageResult<Arc<InMemory>> {
        lookup_store(&self.buckets, name).await
    }
}

async fn lookup_store(
    buckets: &RwLock<BucketTable>,
    name: &BucketName,
) -> StorageResult<Arc<InMemory>> {
    buckets
        .read()
        .await
        .get(name)
        .map(|entry| Arc::clone(&entry.store))
        .ok_or_else(|| StorageError::BucketNotFound {
            bucket: name.to_string(),
        })
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn create_bucket(
        &self,
        name: &BucketName,
        location: &Location,
    ) -> StorageResult<Bucket> {
        let mut buckets = self.buckets.write().await;

        if buckets.contains_key(name) {
            return Err(StorageError::BucketAlreadyExists {
                bucket: name.to_string(),
            });
        }

        let bucket = Bucket {
            name: name.clone(),
            location: location.clone(),
            created: Some(Utc::now()),
        };
        buckets.insert(
            name.clone(),
            BucketEntry {
                bucket: bucket.clone(),
                store: Arc::new(InMemory::new()),
            },
        );

        Ok(bucket)
    }

    async fn get_bucket(&self, name: &BucketName) -> StorageResult<Bucket> {
        self.buckets
            .read()
            .await
            .get(name)
            .map(|entry| entry.bucket.clone())
            .ok_or_else(|| StorageError::BucketNotFound {
                bucket: name.to_string(),
            })
    }

    fn list_buckets(&self, request: ListBucketsRequest) -> BucketStream {
        let buckets = Arc::clone(&self.buckets);

        // Snapshot taken when the stream is first polled
        stream::once(async move {
            let table = buckets.read().await;
            table
                .values()
                .map(|entry| entry.bucket.clone())
                .filter(|bucket| request.matches(&bucket.name))
                .take(request.max_results.unwrap_or(usize::MAX))
                .collect::<Vec<_>>()
        })
        .flat_map(|snapshot| stream::iter(snapshot.into_iter().map(Ok)))
        .boxed()
    }

    async fn delete_bucket(&self, bucket: &Bucket, force: bool) -> StorageResult<()> {
        let mut buckets = self.buckets.write().await;

        let entry = buckets
            .get(&bucket.name)
            .ok_or_else(|| StorageError::BucketNotFound {
                bucket: bucket.name.to_string(),
            })?;

        if force {
            let removed = transfer::clear(entry.store.as_ref(), &bucket.name).await?;
            debug!(bucket = %bucket.name, removed, "bucket emptied before deletion");
        } else if !transfer::is_empty(entry.store.as_ref(), &bucket.name).await? {
            return Err(StorageError::BucketNotEmpty {
                bucket: bucket.name.to_string(),
            });
        }

        buckets.remove(&bucket.name);
        Ok(())
    }

    async fn upload_object(
        &self,
        bucket: &Bucket,
        key: &ObjectKey,
        source: &Path,
    ) -> StorageResult<ObjectHandle> {
        let store = self.store_for(&bucket.name).await?;
        transfer::upload_file(store, &bucket.name, key, source).await
    }

    async fn download_object(
        &self,
        bucket: &Bucket,
        key: &ObjectKey,
        destination: &Path,
    ) -> StorageResult<u64> {
        let store = self.store_for(&bucket.name).await?;
        transfer::download_file(store.as_ref(), &bucket.name, key, destination).await
    }

    async fn delete_object(&self, bucket: &Bucket, key: &ObjectKey) -> StorageResult<()> {
        let store = self.store_for(&bucket.name).await?;
        transfer::delete_file(store.as_ref(), &bucket.name, key).await
    }

    fn list_objects(&self, bucket: &Bucket) -> ObjectStream {
        let buckets = Arc::clone(&self.buckets);
        let name = bucket.name.clone();

        stream::once(async move {
            let store: Arc<dyn ObjectStore> = lookup_store(&buckets, &name).await?;
            Ok::<_, StorageError>(transfer::list_files(store, name))
        })
        .try_flatten()
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(value: &str) -> BucketName {
        BucketName::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_bucket() {
        let backend = InMemoryBackend::new();
        let location = Location::new("eu".to_string()).unwrap();

        let created = backend
            .create_bucket(&name("test-bucket"), &location)
            .await
            .unwrap();
        let fetched = backend.get_bucket(&name("test-bucket")).await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.location.as_str(), "EU");
        assert!(fetched.created.is_some());
    }

    #[tokio::test]
    async fn test_create_duplicate_bucket_fails() {
        let backend = InMemoryBackend::new();
        let location = Location::default();

        backend
            .create_bucket(&name("test-bucket"), &location)
            .await
            .unwrap();
        let err = backend
            .create_bucket(&name("test-bucket"), &location)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::BucketAlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_list_buckets_is_sorted_and_filtered() {
        let backend = InMemoryBackend::new();
        for bucket in ["logs-b", "data", "logs-a"] {
            backend
                .create_bucket(&name(bucket), &Location::default())
                .await
                .unwrap();
        }

        let names: Vec<String> = backend
            .list_buckets(ListBucketsRequest::default().with_prefix("logs-"))
            .map_ok(|bucket| bucket.name.to_string())
            .try_collect()
            .await
            .unwrap();

        assert_eq!(names, vec!["logs-a", "logs-b"]);
    }

    #[tokio::test]
    async fn test_list_objects_of_deleted_bucket() {
        let backend = InMemoryBackend::new();
        let bucket = backend
            .create_bucket(&name("short-lived"), &Location::default())
            .await
            .unwrap();
        backend.delete_bucket(&bucket, false).await.unwrap();

        let err = backend
            .list_objects(&bucket)
            .try_collect::<Vec<_>>()
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::BucketNotFound { .. }));
    }
}
