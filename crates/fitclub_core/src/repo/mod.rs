//! Repository layer abstractions and SQLite persistence.
//!
//! # Responsibility
//! - Define one data-access contract per entity.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call the entity's `validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Repositories only accept connections migrated to the latest schema.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::validation::{FieldError, ValidationErrors};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod diet_repo;
pub mod meal_repo;
pub mod member_repo;
pub mod movement_repo;
pub mod program_repo;

pub use diet_repo::DietRepository;
pub use meal_repo::MealRepository;
pub use member_repo::{MemberListQuery, MemberRepository};
pub use movement_repo::MovementRepository;
pub use program_repo::ProgramRepository;

pub type RepoResult<T> = Result<T, RepoError>;

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("movements", &["uuid", "name", "video", "sets", "reps", "updated_at"]),
    (
        "meals",
        &[
            "uuid", "name", "amount", "unit", "protein", "carbs", "oil", "calories",
        ],
    ),
    ("programs", &["uuid", "name"]),
    ("program_movements", &["program_uuid", "movement_uuid", "position"]),
    ("diets", &["uuid"]),
    ("diet_meals", &["diet_uuid", "meal_uuid", "position"]),
    (
        "members",
        &[
            "uuid",
            "phone_number",
            "password_hash",
            "membership_start",
            "membership_end",
            "program_uuid",
            "diet_uuid",
            "is_admin",
        ],
    ),
];

/// Repository error shared by every entity store.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationErrors),
    Db(DbError),
    NotFound { entity: &'static str, id: Uuid },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for RepoError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<FieldError> for RepoError {
    fn from(value: FieldError) -> Self {
        Self::Validation(value.into())
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Pagination options shared by list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: u32,
}

impl ListQuery {
    pub(crate) fn append_to(&self, sql: &mut String, bind_values: &mut Vec<Value>) {
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if self.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(self.offset)));
            }
        } else if self.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(self.offset)));
        }
    }

    /// Applies the same window as `append_to` to rows already in memory.
    pub(crate) fn paginate<T>(&self, rows: impl IntoIterator<Item = T>) -> Vec<T> {
        let rest = rows.into_iter().skip(self.offset as usize);
        match self.limit {
            Some(limit) => rest.take(limit as usize).collect(),
            None => rest.collect(),
        }
    }
}

/// SQLite-backed store implementing every entity repository trait.
pub struct SqliteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` is not latest.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not carry the expected shape.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version = current_user_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        for &(table, columns) in REQUIRED_COLUMNS {
            if !table_exists(conn, table)? {
                return Err(RepoError::MissingRequiredTable(table));
            }
            for &column in columns {
                if !table_has_column(conn, table, column)? {
                    return Err(RepoError::MissingRequiredColumn { table, column });
                }
            }
        }

        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &'conn Connection {
        self.conn
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

/// Checks that every id exists in `table`, reporting the first missing one
/// against `field`.
pub(crate) fn ensure_ids_exist(
    conn: &Connection,
    table: &str,
    field: &'static str,
    ids: &[Uuid],
) -> RepoResult<()> {
    let mut stmt = conn.prepare(&format!(
        "SELECT EXISTS(SELECT 1 FROM {table} WHERE uuid = ?1);"
    ))?;
    for id in ids {
        let exists: i64 = stmt.query_row([id.to_string()], |row| row.get(0))?;
        if exists != 1 {
            return Err(FieldError::UnknownReference { field, id: *id }.into());
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::ListQuery;

    #[test]
    fn paginate_matches_sql_limit_offset() {
        let rows = [1, 2, 3];
        assert_eq!(ListQuery::default().paginate(rows), vec![1, 2, 3]);
        assert_eq!(
            ListQuery {
                limit: Some(1),
                offset: 1
            }
            .paginate(rows),
            vec![2]
        );
        assert!(ListQuery {
            limit: None,
            offset: 3
        }
        .paginate(rows)
        .is_empty());
        assert!(ListQuery {
            limit: Some(0),
            offset: 0
        }
        .paginate(rows)
        .is_empty());
    }
}
