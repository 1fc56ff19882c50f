pub mod normalize;
pub mod resolve;
pub mod types;

pub use normalize::normalize;
pub use resolve::{detect_key_column, resolve_schema};
pub use types::{Dataset, HeaderIndex, KeyColumn, KeyDetection, Record, SchemaResult};
