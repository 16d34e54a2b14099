//! File transfers between the local filesystem and any `object_store` store.
//!
//! Both backends keep objects in an `object_store::ObjectStore` per bucket;
//! these helpers hold the shared upload, download, delete and listing logic.

use std::{path::Path, sync::Arc};

use async_stream::try_stream;
use futures::{Stream, StreamExt, TryStreamExt};
use object_store::{buffered::BufWriter, path::Path as ObjectPath, ObjectStore};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::error::{listing_error, object_error};
use crate::domain::{
    errors::{StorageError, StorageResult},
    models::ObjectHandle,
    value_objects::{BucketName, ObjectKey},
};

const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

fn object_path(key: &ObjectKey) -> ObjectPath {
    ObjectPath::from(key.as_str())
}

/// Stream the file at `source` into `key`
///
/// Small files go up in a single put, larger ones as a multipart upload.
pub async fn upload_file(
    store: Arc<dyn ObjectStore>,
    bucket: &BucketName,
    key: &ObjectKey,
    source: &Path,
) -> StorageResult<ObjectHandle> {
    let mut file = tokio::fs::File::open(source)
        .await
        .map_err(|err| StorageError::local_io(source, err))?;

    let path = object_path(key);
    let mut writer = BufWriter::new(Arc::clone(&store), path.clone());
    let mut buffer = vec![0u8; UPLOAD_CHUNK_SIZE];

    loop {
        let read = match file.read(&mut buffer).await {
            Ok(read) => read,
            Err(err) => {
                writer.abort().await.ok();
                return Err(StorageError::local_io(source, err));
            }
        };
        if read == 0 {
            break;
        }

        if let Err(err) = writer.write_all(&buffer[..read]).await {
            writer.abort().await.ok();
            return Err(upload_error(err, bucket, key));
        }
    }

    writer
        .shutdown()
        .await
        .map_err(|err| upload_error(err, bucket, key))?;

    let meta = store
        .head(&path)
        .await
        .map_err(|err| object_error(err, bucket, key))?;

    Ok(ObjectHandle {
        bucket: bucket.clone(),
        key: key.clone(),
        size: meta.size as u64,
        etag: meta.e_tag,
        last_modified: Some(meta.last_modified),
    })
}

/// Unwrap the store error carried by a failed `BufWriter` write
fn upload_error(err: std::io::Error, bucket: &BucketName, key: &ObjectKey) -> StorageError {
    match err.into_inner().map(|inner| inner.downcast::<object_store::Error>()) {
        Some(Ok(store_err)) => object_error(*store_err, bucket, key),
        Some(Err(other)) => {
            StorageError::backend(format!("Upload of {}/{} failed", bucket, key), other)
        }
        None => StorageError::Internal {
            message: format!("Upload of {}/{} failed", bucket, key),
            source: None,
        },
    }
}

/// Stream `key` into the file at `destination`, returning the bytes written
///
/// The object is looked up before the file is created, so a missing object
/// leaves no empty file behind.
pub async fn download_file(
    store: &dyn ObjectStore,
    bucket: &BucketName,
    key: &ObjectKey,
    destination: &Path,
) -> StorageResult<u64> {
    let result = store
        .get(&object_path(key))
        .await
        .map_err(|err| object_error(err, bucket, key))?;

    let mut file = tokio::fs::File::create(destination)
        .await
        .map_err(|err| StorageError::local_io(destination, err))?;

    let mut chunks = result.into_stream();
    let mut written = 0u64;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(|err| object_error(err, bucket, key))?;
        file.write_all(&chunk)
            .await
            .map_err(|err| StorageError::local_io(destination, err))?;
        written += chunk.len() as u64;
    }

    file.flush()
        .await
        .map_err(|err| StorageError::local_io(destination, err))?;

    Ok(written)
}

/// Delete `key`, failing with `ObjectNotFound` when it does not exist
///
/// Some stores treat deleting a missing object as success, so existence is
/// checked first.
pub async fn delete_file(
    store: &dyn ObjectStore,
    bucket: &BucketName,
    key: &ObjectKey,
) -> StorageResult<()> {
    let path = object_path(key);

    store
        .head(&path)
        .await
        .map_err(|err| object_error(err, bucket, key))?;
    store
        .delete(&path)
        .await
        .map_err(|err| object_error(err, bucket, key))
}

/// Lazily list every object in `store`
pub fn list_files(
    store: Arc<dyn ObjectStore>,
    bucket: BucketName,
) -> impl Stream<Item = StorageResult<ObjectHandle>> + Send + 'static {
    try_stream! {
        let mut listing = store.list(None);

        while let Some(meta) = listing.next().await {
            let meta = meta.map_err(|err| listing_error(err, &bucket))?;
            let key = ObjectKey::new(meta.location.to_string())?;

            yield ObjectHandle {
                bucket: bucket.clone(),
                key,
                size: meta.size as u64,
                etag: meta.e_tag,
                last_modified: Some(meta.last_modified),
            };
        }
    }
}

/// Whether `store` holds at least one object
pub async fn is_empty(store: &dyn ObjectStore, bucket: &BucketName) -> StorageResult<bool> {
    match store.list(None).next().await {
        None => Ok(true),
        Some(Ok(_)) => Ok(false),
        Some(Err(err)) => Err(listing_error(err, bucket)),
    }
}

/// Delete every object in `store`, returning how many were removed
///
/// Objects are deleted as the listing streams in, in batches where the store
/// supports it.
pub async fn clear(store: &dyn ObjectStore, bucket: &BucketName) -> StorageResult<usize> {
    let locations = store.list(None).map_ok(|meta| meta.location).boxed();
    let mut deleted = store.delete_stream(locations);
    let mut count = 0;

    while let Some(result) = deleted.next().await {
        result.map_err(|err| listing_error(err, bucket))?;
        count += 1;
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::{memory::InMemory, PutPayload};

    fn bucket() -> BucketName {
        BucketName::new("test-bucket".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_upload_and_download_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source.bin");
        let destination = dir.path().join("destination.bin");
        let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        std::fs::write(&source, &data).unwrap();

        let store = Arc::new(InMemory::new());
        let key = ObjectKey::new("nested/data.bin".to_string()).unwrap();

        let handle = upload_file(store.clone(), &bucket(), &key, &source)
            .await
            .unwrap();
        assert_eq!(handle.size, data.len() as u64);
        assert_eq!(handle.key, key);
        assert!(handle.etag.is_some());

        let written = download_file(store.as_ref(), &bucket(), &key, &destination)
            .await
            .unwrap();
        assert_eq!(written, data.len() as u64);
        assert_eq!(std::fs::read(&destination).unwrap(), data);
    }

    #[tokio::test]
    async fn test_download_missing_object_creates_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("missing.txt");
        let key = ObjectKey::new("missing.txt".to_string()).unwrap();

        let err = download_file(&InMemory::new(), &bucket(), &key, &destination)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::ObjectNotFound { .. }));
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_upload_missing_source_is_local_io() {
        let dir = tempfile::tempdir().unwrap();
        let key = ObjectKey::new("a.txt".to_string()).unwrap();

        let err = upload_file(
            Arc::new(InMemory::new()),
            &bucket(),
            &key,
            &dir.path().join("nope"),
        )
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::LocalIo { .. }));
    }

    #[tokio::test]
    async fn test_delete_missing_object_fails() {
        let key = ObjectKey::new("missing.txt".to_string()).unwrap();
        let err = delete_file(&InMemory::new(), &bucket(), &key)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::ObjectNotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_and_clear() {
        let store = Arc::new(InMemory::new());
        for name in ["a.txt", "b/c.txt"] {
            store
                .put(&ObjectPath::from(name), PutPayload::from(b"x".to_vec()))
                .await
                .unwrap();
        }

        let mut names: Vec<String> = list_files(store.clone(), bucket())
            .map_ok(|object| object.key.to_string())
            .try_collect()
            .await
            .unwrap();
        names.sort();
        assert_eq!(names, vec!["a.txt", "b/c.txt"]);

        assert!(!is_empty(store.as_ref(), &bucket()).await.unwrap());
        assert_eq!(clear(store.as_ref(), &bucket()).await.unwrap(), 2);
        assert!(is_empty(store.as_ref(), &bucket()).await.unwrap());
    }

    #[tokio::test]
    async fn test_upload_larger_than_write_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("large.bin");
        let destination = dir.path().join("large.out");
        let data: Vec<u8> = (0..12 * 1024 * 1024u32).map(|i| (i % 253) as u8).collect();
        std::fs::write(&source, &data).unwrap();

        let store = Arc::new(InMemory::new());
        let key = ObjectKey::new("large.bin".to_string()).unwrap();

        let handle = upload_file(store.clone(), &bucket(), &key, &source)
            .await
            .unwrap();
        assert_eq!(handle.size, data.len() as u64);

        download_file(store.as_ref(), &bucket(), &key, &destination)
            .await
            .unwrap();
        assert_eq!(std::fs::read(&destination).unwrap(), data);
    }

    #[tokio::test]
    async fn test_clear_counts_streamed_deletes() {
        let store = Arc::new(InMemory::new());
        for i in 0..250 {
            store
                .put(
                    &ObjectPath::from(format!("batch/{i:03}.txt")),
                    PutPayload::from(b"x".to_vec()),
                )
                .await
                .unwrap();
        }

        assert_eq!(clear(store.as_ref(), &bucket()).await.unwrap(), 250);
        assert!(is_empty(store.as_ref(), &bucket()).await.unwrap());
        assert_eq!(clear(store.as_ref(), &bucket()).await.unwrap(), 0);
    }
}
