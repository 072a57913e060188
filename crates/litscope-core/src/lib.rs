//! litscope core: document records, the SQLite record store and configuration.

pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use config::{AppConfig, DedupConfig, DiscoveryConfig, ExportConfig, ScoreConfig, SortOrder};
pub use error::{CoreError, ExitCode, Result};
pub use models::*;

pub use storage::database::{ConnectionPool, Database, SCHEMA_VERSION, open_database, open_in_memory};
pub use storage::queries::StoreStatsQuery;
pub use storage::repositories::{RecordStore, SqliteRecordRepository};
pub use storage::session::StoreSession;
