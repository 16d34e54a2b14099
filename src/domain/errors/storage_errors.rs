use std::path::PathBuf;

use http::StatusCode;

use super::ValidationError;

/// Boxed error kept as the underlying cause of a [`StorageError`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Stable classification of a [`StorageError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Authentication,
    InvalidArgument,
    NotFound,
    AlreadyExists,
    Conflict,
    PermissionDenied,
    LocalIo,
    Backend,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Authentication => "authentication",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::NotFound => "not_found",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::Conflict => "conflict",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::LocalIo => "local_io",
            ErrorKind::Backend => "backend",
            ErrorKind::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during bucket and object operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Credentials could not be loaded or were rejected by the backend
    #[error("Authentication failed: {message}")]
    Authentication {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// A name or argument was rejected before reaching the backend
    #[error("Invalid argument: {0}")]
    Validation(#[from] ValidationError),

    #[error("Bucket not found: {bucket}")]
    BucketNotFound { bucket: String },

    #[error("Bucket already exists: {bucket}")]
    BucketAlreadyExists { bucket: String },

    #[error("Bucket is not empty: {bucket}")]
    BucketNotEmpty { bucket: String },

    #[error("Object not found: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    /// Reading a source file or writing a destination file failed
    #[error("Local I/O error on '{}': {source}", path.display())]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backend reported an error (network, quota, unexpected status)
    #[error("Storage backend error: {message}")]
    Backend {
        message: String,
        status: Option<u16>,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::Authentication { .. } => ErrorKind::Authentication,
            StorageError::Validation(_) => ErrorKind::InvalidArgument,
            StorageError::BucketNotFound { .. } | StorageError::ObjectNotFound { .. } => {
                ErrorKind::NotFound
            }
            StorageError::BucketAlreadyExists { .. } => ErrorKind::AlreadyExists,
            StorageError::BucketNotEmpty { .. } => ErrorKind::Conflict,
            StorageError::AccessDenied { .. } => ErrorKind::PermissionDenied,
            StorageError::LocalIo { .. } => ErrorKind::LocalIo,
            StorageError::Backend { .. } => ErrorKind::Backend,
            StorageError::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::LocalIo {
            path: path.into(),
            source,
        }
    }

    pub fn backend(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        StorageError::Backend {
            message: message.into(),
            status: None,
            source: Some(source.into()),
        }
    }

    pub fn internal(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        StorageError::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Convert a storage error to the HTTP status reported to callers
impl From<&StorageError> for StatusCode {
    fn from(err: &StorageError) -> Self {
        match err {
            StorageError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            StorageError::Validation(_) => StatusCode::BAD_REQUEST,
            StorageError::BucketNotFound { .. } | StorageError::ObjectNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            StorageError::BucketAlreadyExists { .. } | StorageError::BucketNotEmpty { .. } => {
                StatusCode::CONFLICT
            }
            StorageError::AccessDenied { .. } => StatusCode::FORBIDDEN,
            StorageError::Backend { status, .. } => status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            StorageError::LocalIo { .. } | StorageError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
