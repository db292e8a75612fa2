//! Correlation store abstraction

use async_trait::async_trait;

use super::error::StorageResult;
use crate::canonical::{CanonicalEntity, CanonicalId, IdentityCorrelation};

/// Durable storage of canonical entities and identity correlations.
///
/// Implementations must be `Send + Sync`; the relay records correlations from
/// concurrently processed events.
#[async_trait]
pub trait CorrelationStore: Send + Sync {
    /// Persist a canonical entity and its correlation as one unit.
    ///
    /// Either both rows become visible or neither does. The correlation must
    /// reference `canonical.canonical_id`.
    async fn record(
        &self,
        canonical: &CanonicalEntity,
        correlation: &IdentityCorrelation,
    ) -> StorageResult<()>;

    /// Get a canonical entity by id
    async fn get_canonical(&self, id: &CanonicalId) -> StorageResult<Option<CanonicalEntity>>;

    /// Get the correlation owned by a canonical id
    async fn get_correlation(&self, id: &CanonicalId)
        -> StorageResult<Option<IdentityCorrelation>>;

    /// All correlations for a source-side identifier, oldest first.
    ///
    /// Replays of the same creation produce several rows.
    async fn find_by_source_id(
        &self,
        entity_type: &str,
        source_id: &str,
    ) -> StorageResult<Vec<IdentityCorrelation>>;

    /// All correlations for a destination-side identifier, oldest first.
    async fn find_by_destination_id(
        &self,
        entity_type: &str,
        destination_id: &str,
    ) -> StorageResult<Vec<IdentityCorrelation>>;

    /// Most recent correlations first, at most `limit`.
    async fn list_correlations(&self, limit: usize) -> StorageResult<Vec<IdentityCorrelation>>;

    async fn count_correlations(&self) -> StorageResult<usize>;
}

pub(crate) fn entity_matches(stored: &str, requested: &str) -> bool {
    stored.eq_ignore_ascii_case(requested.trim())
}
