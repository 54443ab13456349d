//! Migration registry. Grounded in the teacher's `cetane`-based
//! `migrations/mod.rs`: an ordered, dependency-checked list of
//! `Migration`s, run once at startup by `repository::run_migrations`.
//! Partial unique indexes and CHECK constraints (SPEC_FULL.md §3) are
//! expressed as `RunSql::portable()` escape hatches, the same pattern the
//! teacher uses for backend-specific DDL Diesel's builder can't express.

pub mod m0001_initial;
pub mod m0002_annotation_relationship_indexes;

use cetane::prelude::MigrationRegistry;
use diesel::sqlite::SqliteConnection;

use crate::errors::Result;

pub fn registry() -> MigrationRegistry {
    let mut registry = MigrationRegistry::new();
    registry.register(m0001_initial::migration());
    registry.register(m0002_annotation_relationship_indexes::migration());
    registry
}

pub fn run_all(conn: &mut SqliteConnection) -> Result<()> {
    registry().run(conn).map_err(|e| crate::errors::CoreError::Integrity(e.to_string()))
}
