//! Program repository contract and SQLite implementation.
//!
//! # Invariants
//! - A program row and its movement links are written in one transaction.
//! - Link replacement is all-or-nothing: an unknown movement id aborts it.
//! - `position` mirrors the order of `Program::movement_ids`.

use crate::model::movement::MovementId;
use crate::model::program::{Program, ProgramId};
use crate::repo::{ensure_ids_exist, parse_uuid, ListQuery, RepoError, RepoResult, SqliteRepository};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

pub trait ProgramRepository {
    fn create_program(&self, program: &Program) -> RepoResult<ProgramId>;
    /// Replaces name and the full movement list.
    fn update_program(&self, program: &Program) -> RepoResult<()>;
    fn get_program(&self, id: ProgramId) -> RepoResult<Option<Program>>;
    fn list_programs(&self, query: &ListQuery) -> RepoResult<Vec<Program>>;
    fn delete_program(&self, id: ProgramId) -> RepoResult<()>;
}

impl ProgramRepository for SqliteRepository<'_> {
    fn create_program(&self, program: &Program) -> RepoResult<ProgramId> {
        program.validate()?;

        let tx = self.conn().unchecked_transaction()?;
        ensure_ids_exist(&tx, "movements", "movements", &program.movement_ids)?;
        tx.execute(
            "INSERT INTO programs (uuid, name) VALUES (?1, ?2);",
            params![program.id.to_string(), program.name.as_str()],
        )?;
        insert_links(&tx, program.id, &program.movement_ids)?;
        tx.commit()?;

        Ok(program.id)
    }

    fn update_program(&self, program: &Program) -> RepoResult<()> {
        program.validate()?;

        let tx = self.conn().unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE programs
             SET
                name = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![program.name.as_str(), program.id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "program",
                id: program.id,
            });
        }

        ensure_ids_exist(&tx, "movements", "movements", &program.movement_ids)?;
        tx.execute(
            "DELETE FROM program_movements WHERE program_uuid = ?1;",
            [program.id.to_string()],
        )?;
        insert_links(&tx, program.id, &program.movement_ids)?;
        tx.commit()?;

        Ok(())
    }

    fn get_program(&self, id: ProgramId) -> RepoResult<Option<Program>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT uuid, name FROM programs WHERE uuid = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            let id = parse_uuid(&uuid_text, "programs.uuid")?;
            return Ok(Some(Program {
                id,
                name: row.get(1)?,
                movement_ids: load_movement_ids(self.conn(), id)?,
            }));
        }
        Ok(None)
    }

    fn list_programs(&self, query: &ListQuery) -> RepoResult<Vec<Program>> {
        let mut sql =
            String::from("SELECT uuid, name FROM programs ORDER BY name COLLATE NOCASE ASC, uuid ASC");
        let mut bind_values: Vec<Value> = Vec::new();
        query.append_to(&mut sql, &mut bind_values);

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut programs = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            let id = parse_uuid(&uuid_text, "programs.uuid")?;
            programs.push(Program {
                id,
                name: row.get(1)?,
                movement_ids: load_movement_ids(self.conn(), id)?,
            });
        }
        Ok(programs)
    }

    fn delete_program(&self, id: ProgramId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM programs WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "program",
                id,
            });
        }
        Ok(())
    }
}

fn insert_links(conn: &Connection, program_id: ProgramId, movement_ids: &[MovementId]) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO program_movements (program_uuid, movement_uuid, position)
         VALUES (?1, ?2, ?3);",
    )?;
    for (position, movement_id) in movement_ids.iter().enumerate() {
        stmt.execute(params![
            program_id.to_string(),
            movement_id.to_string(),
            position as i64,
        ])?;
    }
    Ok(())
}

fn load_movement_ids(conn: &Connection, program_id: ProgramId) -> RepoResult<Vec<MovementId>> {
    let mut stmt = conn.prepare(
        "SELECT movement_uuid
         FROM program_movements
         WHERE program_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([program_id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "program_movements.movement_uuid")?);
    }
    Ok(ids)
}
