//! CorrelationStore implementation for SQLite

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crosswalk_core::{
    CanonicalEntity, CanonicalId, CorrelationStore, IdentityCorrelation, SourceSystem,
    StorageError, StorageResult,
};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use crate::connection::SqlitePool;
use crate::error::{SqliteError, SqliteResult};

const CORRELATION_COLUMNS: &str =
    "canonical_id, entity_type, source_system, source_id, destination_id, last_updated";

/// SQLite implementation of [`CorrelationStore`]
#[derive(Clone)]
pub struct SqliteCorrelationStore {
    pool: SqlitePool,
}

impl SqliteCorrelationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run blocking database work off the async executor.
    async fn blocking<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&SqlitePool) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || f(&pool))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?
            .map_err(Into::into)
    }

    async fn query_correlations(
        &self,
        filter: &'static str,
        entity_type: &str,
        value: &str,
    ) -> StorageResult<Vec<IdentityCorrelation>> {
        let entity_type = entity_type.trim().to_string();
        let value = value.trim().to_string();

        self.blocking(move |pool| {
            pool.with_connection(|conn| {
                let sql = format!(
                    "SELECT {} FROM identity_correlations
                     WHERE entity_type = ?1 AND {} = ?2
                     ORDER BY rowid ASC",
                    CORRELATION_COLUMNS, filter
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![entity_type, value], CorrelationRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows.into_iter().map(CorrelationRow::into_correlation).collect()
            })
        })
        .await
    }
}

#[async_trait]
impl CorrelationStore for SqliteCorrelationStore {
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

        let canonical = canonical.clone();
        let correlation = correlation.clone();

        self.blocking(move |pool| {
            pool.with_connection_mut(|conn| {
                let id = canonical.canonical_id.to_string();
                let data = serde_json::to_string(&canonical.attributes)
                    .map_err(|e| SqliteError::Serialization(e.to_string()))?;

                let tx = conn.transaction()?;

                let exists = tx
                    .query_row(
                        "SELECT 1 FROM canonical_entities WHERE canonical_id = ?1",
                        [&id],
                        |_| Ok(()),
                    )
                    .optional()?
                    .is_some();
                if exists {
                    return Err(SqliteError::Duplicate(canonical.canonical_id));
                }

                tx.execute(
                    "INSERT INTO canonical_entities (canonical_id, entity_type, data, created_at)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        id,
                        canonical.entity_type,
                        data,
                        canonical.created_at.to_rfc3339()
                    ],
                )?;
                tx.execute(
                    "INSERT INTO identity_correlations
                     (canonical_id, entity_type, source_system, source_id, destination_id, last_updated)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        id,
                        correlation.entity_type,
                        correlation.source_system.as_str(),
                        correlation.source_id.trim(),
                        correlation.destination_id,
                        correlation.last_updated.to_rfc3339()
                    ],
                )?;

                // Dropping `tx` without commit rolls back both rows
                tx.commit()?;
                debug!(canonical_id = %id, "Recorded canonical entity and correlation");
                Ok(())
            })
        })
        .await
    }

    async fn get_canonical(&self, id: &CanonicalId) -> StorageResult<Option<CanonicalEntity>> {
        let id = *id;
        self.blocking(move |pool| {
            pool.with_connection(|conn| {
                let row = conn
                    .query_row(
                        "SELECT canonical_id, entity_type, data, created_at
                         FROM canonical_entities WHERE canonical_id = ?1",
                        [id.to_string()],
                        CanonicalRow::from_row,
                    )
                    .optional()?;
                row.map(CanonicalRow::into_entity).transpose()
            })
        })
        .await
    }

    async fn get_correlation(
        &self,
        id: &CanonicalId,
    ) -> StorageResult<Option<IdentityCorrelation>> {
        let id = *id;
        self.blocking(move |pool| {
            pool.with_connection(|conn| {
                let sql = format!(
                    "SELECT {} FROM identity_correlations WHERE canonical_id = ?1",
                    CORRELATION_COLUMNS
                );
                let row = conn
                    .query_row(&sql, [id.to_string()], CorrelationRow::from_row)
                    .optional()?;
                row.map(CorrelationRow::into_correlation).transpose()
            })
        })
        .await
    }

    async fn find_by_source_id(
        &self,
        entity_type: &str,
        source_id: &str,
    ) -> StorageResult<Vec<IdentityCorrelation>> {
        self.query_correlations("source_id", entity_type, source_id)
            .await
    }

    async fn find_by_destination_id(
        &self,
        entity_type: &str,
        destination_id: &str,
    ) -> StorageResult<Vec<IdentityCorrelation>> {
        self.query_correlations("destination_id", entity_type, destination_id)
            .await
    }

    async fn list_correlations(&self, limit: usize) -> StorageResult<Vec<IdentityCorrelation>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.blocking(move |pool| {
            pool.with_connection(|conn| {
                let sql = format!(
                    "SELECT {} FROM identity_correlations ORDER BY rowid DESC LIMIT ?1",
                    CORRELATION_COLUMNS
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([limit], CorrelationRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows.into_iter().map(CorrelationRow::into_correlation).collect()
            })
        })
        .await
    }

    async fn count_correlations(&self) -> StorageResult<usize> {
        self.blocking(|pool| {
            pool.with_connection(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM identity_correlations", [], |row| {
                        row.get(0)
                    })?;
                Ok(usize::try_from(count).unwrap_or_default())
            })
        })
        .await
    }
}

/// Raw `canonical_entities` row
struct CanonicalRow {
    canonical_id: String,
    entity_type: String,
    data: String,
    created_at: String,
}

impl CanonicalRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            canonical_id: row.get(0)?,
            entity_type: row.get(1)?,
            data: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    fn into_entity(self) -> SqliteResult<CanonicalEntity> {
        Ok(CanonicalEntity {
            canonical_id: parse_canonical_id(&self.canonical_id)?,
            entity_type: self.entity_type,
            attributes: serde_json::from_str(&self.data)
                .map_err(|e| SqliteError::CorruptRow(format!("canonical data: {}", e)))?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// Raw `identity_correlations` row
struct CorrelationRow {
    canonical_id: String,
    entity_type: String,
    source_system: String,
    source_id: String,
    destination_id: Option<String>,
    last_updated: String,
}

impl CorrelationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            canonical_id: row.get(0)?,
            entity_type: row.get(1)?,
            source_system: row.get(2)?,
            source_id: row.get(3)?,
            destination_id: row.get(4)?,
            last_updated: row.get(5)?,
        })
    }

    fn into_correlation(self) -> SqliteResult<IdentityCorrelation> {
        let source_system: SourceSystem = self
            .source_system
            .parse()
            .map_err(|e| SqliteError::CorruptRow(format!("source system: {}", e)))?;

        Ok(IdentityCorrelation {
            canonical_id: parse_canonical_id(&self.canonical_id)?,
            entity_type: self.entity_type,
            source_system,
            source_id: self.source_id,
            destination_id: self.destination_id,
            last_updated: parse_timestamp(&self.last_updated)?,
        })
    }
}

fn parse_canonical_id(raw: &str) -> SqliteResult<CanonicalId> {
    raw.parse()
        .map_err(|e| SqliteError::CorruptRow(format!("canonical id '{}': {}", raw, e)))
}

fn parse_timestamp(raw: &str) -> SqliteResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SqliteError::CorruptRow(format!("timestamp '{}': {}", raw, e)))
}
