pub mod database;
pub mod error;
pub mod ingest;
pub mod models;
pub mod sync;
pub mod utils;

pub use database::repo::TransactionManager;
pub use error::{Result, SyncError};
pub use ingest::snapshot::{BatchSource, SnapshotSource};
pub use sync::pipeline::{run_once, RunOutcome};
