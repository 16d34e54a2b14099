// Infrastructure error mapping
pub mod error;

// Storage implementations
pub mod gcs;
pub mod memory;
pub mod transfer;

// Re-export key types
pub use gcs::{GcsBackend, GcsConfig};
pub use memory::InMemoryBackend;
