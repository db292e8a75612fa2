//! Schema management and migrations

use crate::error::{SqliteError, SqliteResult};
use rusqlite::Connection;
use tracing::{debug, info};

/// Schema version - increment when making schema changes
pub const SCHEMA_VERSION: i32 = 1;

/// Apply all pending migrations
pub fn apply_migrations(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )?;

    let current_version = current_version(conn)?;
    debug!(current_version, target_version = SCHEMA_VERSION, "Checking migrations");

    if current_version < 1 {
        info!(from = current_version, to = SCHEMA_VERSION, "Applying schema migrations");
        apply_migration_v1(conn)?;
    }

    Ok(())
}

/// Highest applied migration, 0 for a fresh database
pub fn current_version(conn: &Connection) -> SqliteResult<i32> {
    let version: Option<i32> =
        conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get(0)
        })?;
    Ok(version.unwrap_or(0))
}

fn record_migration(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("INSERT INTO schema_migrations (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: canonical entities and identity correlations
fn apply_migration_v1(conn: &Connection) -> SqliteResult<()> {
    debug!("Applying migration v1: correlation schema");

    conn.execute_batch(SCHEMA_V1)
        .map_err(|e| SqliteError::Schema(format!("Failed to apply v1 schema: {}", e)))?;

    record_migration(conn, 1)?;
    info!("Migration v1 applied");
    Ok(())
}

const SCHEMA_V1: &str = r#"
-- ============================================================================
-- TABLE: canonical_entities
-- ============================================================================
-- System-neutral form of every forwarded record. Written once, never updated.

CREATE TABLE IF NOT EXISTS canonical_entities (
    canonical_id TEXT PRIMARY KEY NOT NULL,
    entity_type TEXT NOT NULL COLLATE NOCASE,
    data TEXT NOT NULL,  -- JSON object of normalized attributes
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_canonical_entities_type ON canonical_entities(entity_type);

-- ============================================================================
-- TABLE: identity_correlations
-- ============================================================================
-- One row per canonical entity: its native id in each system.

CREATE TABLE IF NOT EXISTS identity_correlations (
    canonical_id TEXT PRIMARY KEY NOT NULL
        REFERENCES canonical_entities(canonical_id) ON DELETE CASCADE,
    entity_type TEXT NOT NULL COLLATE NOCASE,
    source_system TEXT NOT NULL,
    source_id TEXT NOT NULL CHECK (length(source_id) > 0),
    destination_id TEXT,
    last_updated TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_correlations_source
    ON identity_correlations(entity_type, source_id);
CREATE INDEX IF NOT EXISTS idx_correlations_destination
    ON identity_correlations(entity_type, destination_id);
"#;
