mod bucket_service;
mod object_service;

pub use bucket_service::BucketService;
pub use object_service::{NameStream, ObjectService};
