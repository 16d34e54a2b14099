pub mod bucket;
pub mod object;
pub mod outcome;

pub use bucket::*;
pub use object::*;
pub use outcome::*;
