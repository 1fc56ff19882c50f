//! Template lookup: resolve a spreadsheet-style dataset's key column, find the
//! record matching a query and split its populated fields into display groups.

pub mod config;
pub mod fetch;
pub mod lookup;
pub mod process;
pub mod schema;
pub mod server;

pub use config::{AppConfig, GroupingConfig, KeyConfig, LookupConfig};
pub use lookup::{lookup, locate_and_group, LookupResult, LookupStatus};
pub use schema::{normalize, resolve_schema, Dataset, Record, SchemaResult};
