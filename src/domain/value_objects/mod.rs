mod bucket_name;
mod location;
mod object_key;

pub use bucket_name::BucketName;
pub use location::Location;
pub use object_key::ObjectKey;
