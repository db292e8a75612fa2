//! In-memory correlation store
//!
//! Backs tests and single-shot runs. Data lives as long as the store.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::error::{StorageError, StorageResult};
use super::traits::{entity_matches, CorrelationStore};
use crate::canonical::{CanonicalEntity, CanonicalId, IdentityCorrelation};

#[derive(Debug, Default)]
struct MemoryState {
    canonicals: HashMap<CanonicalId, CanonicalEntity>,
    correlations: HashMap<CanonicalId, IdentityCorrelation>,
    /// Insertion order of correlations
    order: Vec<CanonicalId>,
}

/// Thread-safe in-memory [`CorrelationStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCorrelationStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryCorrelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of canonical entities held
    pub fn canonical_count(&self) -> usize {
        self.state.read().canonicals.len()
    }

    fn collect<F>(&self, predicate: F) -> Vec<IdentityCorrelation>
    where
        F: Fn(&IdentityCorrelation) -> bool,
    {
        let state = self.state.read();
        state
            .order
            .iter()
            .filter_map(|id| state.correlations.get(id))
            .filter(|c| predicate(c))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CorrelationStore for MemoryCorrelationStore {
    async fn record(
        &self,
        canonical: &CanonicalEntity,
        correlation: &IdentityCorrelation,
    ) -> StorageResult<()> {
        if correlation.canonical_id != canonical.canonical_id {
            return Err(StorageError::MissingCanonical(correlation.canonical_id));
        }
        if correlation.source_id.trim().is_empty() {
            return Err(StorageError::InvalidRecord(
                "correlation has an empty source id".to_string(),
            ));
        }

        // Single write guard: both inserts or neither
        let mut state = self.state.write();
        if state.canonicals.contains_key(&canonical.canonical_id) {
            return Err(StorageError::DuplicateCanonicalId(canonical.canonical_id));
        }

        state
            .canonicals
            .insert(canonical.canonical_id, canonical.clone());
        state
            .correlations
            .insert(correlation.canonical_id, correlation.clone());
        state.order.push(correlation.canonical_id);
        Ok(())
    }

    async fn get_canonical(&self, id: &CanonicalId) -> StorageResult<Option<CanonicalEntity>> {
        Ok(self.state.read().canonicals.get(id).cloned())
    }

    async fn get_correlation(
        &self,
        id: &CanonicalId,
    ) -> StorageResult<Option<IdentityCorrelation>> {
        Ok(self.state.read().correlations.get(id).cloned())
    }

    async fn find_by_source_id(
        &self,
        entity_type: &str,
        source_id: &str,
    ) -> StorageResult<Vec<IdentityCorrelation>> {
        let source_id = source_id.trim();
        Ok(self.collect(|c| entity_matches(&c.entity_type, entity_type) && c.source_id == source_id))
    }

    async fn find_by_destination_id(
        &self,
        entity_type: &str,
        destination_id: &str,
    ) -> StorageResult<Vec<IdentityCorrelation>> {
        let destination_id = destination_id.trim();
        Ok(self.collect(|c| {
            entity_matches(&c.entity_type, entity_type)
                && c.destination_id.as_deref() == Some(destination_id)
        }))
    }

    async fn list_correlations(&self, limit: usize) -> StorageResult<Vec<IdentityCorrelation>> {
        let mut all = self.collect(|_| true);
        all.reverse();
        all.truncate(limit);
        Ok(all)
    }

    async fn count_correlations(&self) -> StorageResult<usize> {
        Ok(self.state.read().correlations.len())
    }
}
