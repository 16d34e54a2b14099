use async_stream::try_stream;
use async_trait::async_trait;
use futures::{stream, Stream, StreamExt};
use object_store::{gcp::GoogleCloudStorageBuilder, ObjectStore};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};
use tracing::{debug, info};

use super::{
    client::{GcsClient, GcsError},
    types::ServiceAccountKey,
};
use crate::{
    adapters::outbound::storage::transfer,
    domain::{
        errors::{BoxError, StorageError, StorageResult},
        models::{Bucket, ListBucketsRequest, ObjectHandle},
        value_objects::{BucketName, Location, ObjectKey},
    },
    ports::storage::{BucketStream, ObjectStream, StorageBackend},
};

/// Largest page `buckets.list` returns
const MAX_PAGE_SIZE: usize = 1000;

/// Configuration for the Cloud Storage backend
#[derive(Debug, Clone)]
pub struct GcsConfig {
    /// Path of the service account key file
    pub credentials_path: PathBuf,
    /// Project that owns the buckets; defaults to the key file's project
    pub project_id: Option<String>,
}

fn auth_error(message: impl Into<String>, source: impl Into<BoxError>) -> StorageError {
    StorageError::Authentication {
        message: message.into(),
        source: Some(source.into()),
    }
}

type StoreCache = RwLock<HashMap<BucketName, Arc<dyn ObjectStore>>>;

/// Cloud Storage implementation of StorageBackend
///
/// Bucket operations go through the JSON API client; object operations use one
/// `object_store` GCS store per bucket, created on first use and shared by all
/// later calls. Both use the same credential provider.
pub struct GcsBackend {
    client: GcsClient,
    stores: StoreCache,
}

impl GcsBackend {
    /// Load the service account key and check it against the service
    ///
    /// Access tokens for a service account key are signed locally, so the key
    /// is only known to be accepted once a request has gone through. Fails with
    /// `StorageError::Authentication` when the key file is missing or malformed,
    /// or when the service rejects the account.
    pub async fn connect(config: GcsConfig) -> StorageResult<Self> {
        let service_account_key = tokio::fs::read_to_string(&config.credentials_path)
            .await
            .map_err(|err| {
                auth_error(
                    format!(
                        "Cannot read credentials file '{}'",
                        config.credentials_path.display()
                    ),
                    err,
                )
            })?;

        let account: ServiceAccountKey = serde_json::from_str(&service_account_key)
            .map_err(|err| auth_error("Credentials file is not a service account key", err))?;

        let project_id = config
            .project_id
            .or(account.project_id)
            .ok_or_else(|| StorageError::Authentication {
                message: "No project id configured or found in the credentials file".to_string(),
                source: None,
            })?;

        // Credential providers do not depend on the bucket; the project id
        // fills the builder's required bucket name.
        let credentials = GoogleCloudStorageBuilder::new()
            .with_service_account_key(service_account_key)
            .with_bucket_name(project_id.clone())
            .build()
            .map_err(|err| auth_error("Failed to load service account credentials", err))?
            .credentials()
            .clone();

        let client = GcsClient::new(credentials, project_id)
            .map_err(|err| StorageError::internal("Failed to build HTTP client", err))?;

        let backend = Self::with_client(client).await?;

        info!(
            project = backend.client.project_id(),
            account = %account.client_email,
            "connected to Cloud Storage"
        );
        Ok(backend)
    }

    /// Wrap an existing client after one authenticated request
    pub async fn with_client(client: GcsClient) -> StorageResult<Self> {
        client
            .list_buckets_page(None, 1, None)
            .await
            .map_err(|err| match err {
                GcsError::Service {
                    status: 401 | 403,
                    message,
                } => StorageError::Authentication {
                    message,
                    source: None,
                },
                err => err.into_storage_error(client.project_id()),
            })?;

        Ok(Self::new(client))
    }

    fn new(client: GcsClient) -> Self {
        Self {
            client,
            stores: RwLock::new(HashMap::new()),
        }
    }

    fn store_for(&self, bucket: &BucketName) -> StorageResult<Arc<dyn ObjectStore>> {
        if let Some(store) = self
            .stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(bucket)
        {
            return Ok(Arc::clone(store));
        }

        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = stores.get(bucket) {
            return Ok(Arc::clone(store));
        }

        let store: Arc<dyn ObjectStore> = Arc::new(
            GoogleCloudStorageBuilder::new()
                .with_bucket_name(bucket.as_str())
                .with_credentials(Arc::clone(self.client.credentials()))
                .build()
                .map_err(|err| {
                    StorageError::internal(format!("Failed to open bucket {}", bucket), err)
                })?,
        );
        stores.insert(bucket.clone(), Arc::clone(&store));

        Ok(store)
    }

    fn forget_store(&self, bucket: &BucketName) {
        self.stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(bucket);
    }
}

/// Page through `buckets.list` until `max_results` buckets have been yielded
fn bucket_pages(
    client: GcsClient,
    request: ListBucketsRequest,
) -> impl Stream<Item = StorageResult<Bucket>> + Send + 'static {
    try_stream! {
        let mut remaining = request.max_results;
        let mut page_token: Option<String> = None;

        while remaining != Some(0) {
            let page_size = remaining.map_or(MAX_PAGE_SIZE, |n| n.min(MAX_PAGE_SIZE));
            let page = client
                .list_buckets_page(request.prefix.as_deref(), page_size, page_token.as_deref())
                .await
                .map_err(|err| err.into_storage_error(client.project_id()))?;

            for resource in page.items {
                if remaining == Some(0) {
                    break;
                }
                yield resource.into_bucket()?;
                if let Some(n) = remaining.as_mut() {
                    *n -= 1;
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
    }
}

#[async_trait]
impl StorageBackend for GcsBackend {
    async fn create_bucket(
        &self,
        name: &BucketName,
        location: &Location,
    ) -> StorageResult<Bucket> {
        self.client
            .insert_bucket(name.as_str(), location.as_str())
            .await
            .map_err(|err| err.into_storage_error(name.as_str()))?
            .into_bucket()
    }

    async fn get_bucket(&self, name: &BucketName) -> StorageResult<Bucket> {
        self.client
            .get_bucket(name.as_str())
            .await
            .map_err(|err| err.into_storage_error(name.as_str()))?
            .into_bucket()
    }

    fn list_buckets(&self, request: ListBucketsRequest) -> BucketStream {
        bucket_pages(self.client.clone(), request).boxed()
    }

    async fn delete_bucket(&self, bucket: &Bucket, force: bool) -> StorageResult<()> {
        if force {
            let store = self.store_for(&bucket.name)?;
            let removed = transfer::clear(store.as_ref(), &bucket.name).await?;
            debug!(bucket = %bucket.name, removed, "bucket emptied before deletion");
        }

        self.client
            .delete_bucket(bucket.name.as_str())
            .await
            .map_err(|err| match err {
                GcsError::Service { status: 409, .. } => StorageError::BucketNotEmpty {
                    bucket: bucket.name.to_string(),
                },
                err => err.into_storage_error(bucket.name.as_str()),
            })?;

        self.forget_store(&bucket.name);
        Ok(())
    }

    async fn upload_object(
        &self,
        bucket: &Bucket,
        key: &ObjectKey,
        source: &Path,
    ) -> StorageResult<ObjectHandle> {
        let store = self.store_for(&bucket.name)?;
        transfer::upload_file(store, &bucket.name, key, source).await
    }

    async fn download_object(
        &self,
        bucket: &Bucket,
        key: &ObjectKey,
        destination: &Path,
    ) -> StorageResult<u64> {
        let store = self.store_for(&bucket.name)?;
        transfer::download_file(store.as_ref(), &bucket.name, key, destination).await
    }

    async fn delete_object(&self, bucket: &Bucket, key: &ObjectKey) -> StorageResult<()> {
        let store = self.store_for(&bucket.name)?;
        transfer::delete_file(store.as_ref(), &bucket.name, key).await
    }

    fn list_objects(&self, bucket: &Bucket) -> ObjectStream {
        match self.store_for(&bucket.name) {
            Ok(store) => transfer::list_files(store, bucket.name.clone()).boxed(),
            Err(err) => stream::once(async move { Err(err) }).boxed(),
        }
    }
}
