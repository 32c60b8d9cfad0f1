//! Versioned DDL for the catalog and member tables.
//!
//! - v1 `catalog`: `movements`, `meals`, `programs`, `diets`, plus the
//!   `program_movements` / `diet_meals` link tables. Link rows keep a
//!   `position` for display order and cascade away with either side.
//!   Meal amount and macro columns are CHECKed to `0..=i32::MAX`.
//! - v2 `members`: one row per member, unique phone number, nullable
//!   program/diet references that become `NULL` when the target is deleted.
//!
//! The applied version lives in `PRAGMA user_version`. Pending steps run in a
//! single transaction, so a failed upgrade leaves the previous version intact.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "catalog",
        sql: include_str!("0001_catalog.sql"),
    },
    Migration {
        version: 2,
        name: "members",
        sql: include_str!("0002_members.sql"),
    },
];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` up to `latest_version()`.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let to_version = latest_version();

    if from_version > to_version {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: to_version,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
        info!(
            "event=db_migrate_step module=db version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={to_version}");
    Ok(())
}

/// Reads the schema version stored in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
