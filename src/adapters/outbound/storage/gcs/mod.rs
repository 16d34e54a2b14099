//! Google Cloud Storage backend.
//!
//! Bucket operations go through the JSON API with `reqwest`; object transfers
//! go through `object_store`'s GCS client, whose credential provider also
//! supplies the bearer token for the JSON API.

mod client;
mod gcs_backend;
mod types;

pub use client::{GcsClient, GcsError};
pub use gcs_backend::{GcsBackend, GcsConfig};
pub use types::ServiceAccountKey;
