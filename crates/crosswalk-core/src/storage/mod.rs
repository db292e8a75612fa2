//! Correlation storage
//!
//! Canonical entities and identity correlations are written together, once
//! per successful forward. Lookups go both ways: from a source-side id and
//! from a destination-side id.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryCorrelationStore;
pub use traits::CorrelationStore;
