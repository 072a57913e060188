mod v1_initial;
mod v2_provenance;

use chrono::Utc;
use rusqlite::Connection;

use crate::error::Result;

pub trait Migration {
    fn version(&self) -> u32;
    fn description(&self) -> &'static str;
    fn up(&self, conn: &Connection) -> Result<()>;
}

fn all_migrations() -> Vec<Box<dyn Migration>> {
    vec![
        Box::new(v1_initial::V1Initial),
        Box::new(v2_provenance::V2Provenance),
    ]
}

fn record_migration(conn: &Connection, version: u32) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO schema_migrations(version, applied_at) VALUES (?1, ?2)",
        rusqlite::params![version, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

fn has_migrations_table(conn: &Connection) -> Result<bool> {
    let has_table = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='schema_migrations'")?
        .exists([])?;
    Ok(has_table)
}

fn is_migration_applied(conn: &Connection, version: u32) -> Result<bool> {
    if !has_migrations_table(conn)? {
        return Ok(false);
    }

    let applied: bool = conn
        .prepare("SELECT 1 FROM schema_migrations WHERE version = ?1")?
        .exists(rusqlite::params![version])?;
    Ok(applied)
}

/// Apply every pending migration in version order. Returns how many ran.
pub fn run_migrations(conn: &Connection) -> Result<usize> {
    let mut applied = 0;
    for migration in all_migrations() {
        if !is_migration_applied(conn, migration.version())? {
            tracing::info!(
                version = migration.version(),
                description = migration.description(),
                "applying migration"
            );
            migration.up(conn)?;
            record_migration(conn, migration.version())?;
            applied += 1;
        }
    }

    Ok(applied)
}

pub fn get_applied_versions(conn: &Connection) -> Result<Vec<u32>> {
    if !has_migrations_table(conn)? {
        return Ok(Vec::new());
    }

    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version")?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    let mut versions = Vec::new();
    for row in rows {
        versions.push(row?);
    }
    Ok(versions)
}
