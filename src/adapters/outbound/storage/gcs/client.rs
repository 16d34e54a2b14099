use object_store::{gcp::GcpCredentialProvider, CredentialProvider};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use thiserror::Error;

use super::types::{BucketPage, BucketResource, ErrorResponse, InsertBucket};
use crate::domain::errors::{StorageError, ValidationError};

const DEFAULT_BASE_URL: &str = "https://storage.googleapis.com/storage/v1";

/// Errors raised by the JSON API client
#[derive(Error, Debug)]
pub enum GcsError {
    #[error("Failed to obtain access token: {0}")]
    Credentials(#[source] object_store::Error),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Service error: {status} - {message}")]
    Service { status: u16, message: String },
}

impl GcsError {
    /// Convert into the domain error for an operation on `bucket`
    ///
    /// A 409 is reported as `BucketAlreadyExists`; callers for which a conflict
    /// means something else match on `GcsError::Service` first.
    pub fn into_storage_error(self, bucket: &str) -> StorageError {
        match self {
            GcsError::Credentials(err) => StorageError::Authentication {
                message: "Failed to obtain an access token".to_string(),
                source: Some(Box::new(err)),
            },
            GcsError::Transport(err) => {
                StorageError::backend(format!("Request for bucket {} failed", bucket), err)
            }
            GcsError::Service { status, message } => match status {
                400 => ValidationError::RejectedByBackend(message).into(),
                401 => StorageError::Authentication {
                    message,
                    source: None,
                },
                403 => StorageError::AccessDenied { message },
                404 => StorageError::BucketNotFound {
                    bucket: bucket.to_string(),
                },
                409 => StorageError::BucketAlreadyExists {
                    bucket: bucket.to_string(),
                },
                _ => StorageError::Backend {
                    message,
                    status: Some(status),
                    source: None,
                },
            },
        }
    }
}

/// Client for the bucket half of the Cloud Storage JSON API
#[derive(Clone, Debug)]
pub struct GcsClient {
    http: Client,
    credentials: GcpCredentialProvider,
    project_id: String,
    base_url: String,
}

impl GcsClient {
    pub fn new(credentials: GcpCredentialProvider, project_id: String) -> Result<Self, GcsError> {
        Self::with_base_url(credentials, project_id, DEFAULT_BASE_URL.to_string())
    }

    /// Create a client against another endpoint, e.g. a local emulator
    pub fn with_base_url(
        credentials: GcpCredentialProvider,
        project_id: String,
        base_url: String,
    ) -> Result<Self, GcsError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http,
            credentials,
            project_id,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn credentials(&self) -> &GcpCredentialProvider {
        &self.credentials
    }

    fn bucket_url(&self, name: &str) -> String {
        format!("{}/b/{}", self.base_url, name)
    }

    /// Authorize and send a request, turning non-success statuses into errors
    async fn execute(&self, request: RequestBuilder) -> Result<Response, GcsError> {
        let credential = self
            .credentials
            .get_credential()
            .await
            .map_err(GcsError::Credentials)?;

        let response = request.bearer_auth(&credential.bearer).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Extract error message from response body
        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(parsed) => parsed.error.message,
            Err(_) if body.trim().is_empty() => status.to_string(),
            Err(_) => body,
        };

        Err(GcsError::Service {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn insert_bucket(
        &self,
        name: &str,
        location: &str,
    ) -> Result<BucketResource, GcsError> {
        let request = self
            .http
            .post(format!("{}/b", self.base_url))
            .query(&[("project", self.project_id.as_str())])
            .json(&InsertBucket { name, location });

        Ok(self.execute(request).await?.json().await?)
    }

    pub async fn get_bucket(&self, name: &str) -> Result<BucketResource, GcsError> {
        let request = self.http.get(self.bucket_url(name));
        Ok(self.execute(request).await?.json().await?)
    }

    /// Fetch one page of buckets
    pub async fn list_buckets_page(
        &self,
        prefix: Option<&str>,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<BucketPage, GcsError> {
        let mut query = vec![
            ("project", self.project_id.clone()),
            ("maxResults", max_results.to_string()),
        ];
        if let Some(prefix) = prefix {
            query.push(("prefix", prefix.to_string()));
        }
        if let Some(token) = page_token {
            query.push(("pageToken", token.to_string()));
        }

        let request = self.http.get(format!("{}/b", self.base_url)).query(&query);
        Ok(self.execute(request).await?.json().await?)
    }

    /// Delete an empty bucket
    pub async fn delete_bucket(&self, name: &str) -> Result<(), GcsError> {
        let request = self.http.delete(self.bucket_url(name));
        self.execute(request).await?;
        Ok(())
    }
}
