//! CSV-backed task table
//!
//! One UTF-8 CSV file holds every task, one row each, under a header row.
//! Every read re-parses the file and every mutation rewrites it whole, so the
//! file is always the only source of truth.

pub mod error;
pub mod medium;
pub mod query;
pub mod schema;
pub mod task_store;

pub use error::{StoreError, StoreResult};
pub use query::TaskFilter;
pub use schema::SchemaVersion;
pub use task_store::TaskStore;
