//! SQLite storage backend for crosswalk
//!
//! Implements [`crosswalk_core::CorrelationStore`] over a single SQLite file:
//!
//! - **Atomic writes**: a canonical entity and its correlation commit together
//! - **WAL mode**: readers do not block the relay's writer
//! - **Versioned schema**: migrations tracked in `schema_migrations`
//!
//! ```rust,ignore
//! use crosswalk_sqlite::{SqliteConfig, SqliteCorrelationStore, SqlitePool};
//!
//! let pool = SqlitePool::new(SqliteConfig::new("./crosswalk.db"))?;
//! let store = SqliteCorrelationStore::new(pool);
//! let matches = store.find_by_source_id("Student", "42").await?;
//! ```

pub mod config;
pub mod connection;
pub mod correlation_store;
pub mod error;
pub mod schema;

pub use config::SqliteConfig;
pub use connection::SqlitePool;
pub use correlation_store::SqliteCorrelationStore;
pub use error::{SqliteError, SqliteResult};
