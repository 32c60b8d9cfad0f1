//! Movement repository contract and SQLite implementation.
//!
//! # Invariants
//! - Deleting a movement removes it from every program (FK cascade).

use crate::model::movement::{Movement, MovementId};
use crate::model::program::ProgramId;
use crate::repo::{parse_uuid, ListQuery, RepoError, RepoResult, SqliteRepository};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};

const MOVEMENT_SELECT_SQL: &str = "SELECT uuid, name, video, sets, reps FROM movements";

pub trait MovementRepository {
    fn create_movement(&self, movement: &Movement) -> RepoResult<MovementId>;
    fn update_movement(&self, movement: &Movement) -> RepoResult<()>;
    fn get_movement(&self, id: MovementId) -> RepoResult<Option<Movement>>;
    fn list_movements(&self, query: &ListQuery) -> RepoResult<Vec<Movement>>;
    /// Movements linked to a program, in program order.
    fn list_program_movements(&self, program_id: ProgramId) -> RepoResult<Vec<Movement>>;
    fn delete_movement(&self, id: MovementId) -> RepoResult<()>;
}

impl MovementRepository for SqliteRepository<'_> {
    fn create_movement(&self, movement: &Movement) -> RepoResult<MovementId> {
        movement.validate()?;

        self.conn().execute(
            "INSERT INTO movements (uuid, name, video, sets, reps)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                movement.id.to_string(),
                movement.name.as_str(),
                movement.video.as_str(),
                movement.sets,
                movement.reps,
            ],
        )?;

        Ok(movement.id)
    }

    fn update_movement(&self, movement: &Movement) -> RepoResult<()> {
        movement.validate()?;

        let changed = self.conn().execute(
            "UPDATE movements
             SET
                name = ?1,
                video = ?2,
                sets = ?3,
                reps = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?5;",
            params![
                movement.name.as_str(),
                movement.video.as_str(),
                movement.sets,
                movement.reps,
                movement.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "movement",
                id: movement.id,
            });
        }

        Ok(())
    }

    fn get_movement(&self, id: MovementId) -> RepoResult<Option<Movement>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{MOVEMENT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_movement_row(row)?));
        }
        Ok(None)
    }

    fn list_movements(&self, query: &ListQuery) -> RepoResult<Vec<Movement>> {
        let mut sql = format!("{MOVEMENT_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, uuid ASC");
        let mut bind_values: Vec<Value> = Vec::new();
        query.append_to(&mut sql, &mut bind_values);

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut movements = Vec::new();
        while let Some(row) = rows.next()? {
            movements.push(parse_movement_row(row)?);
        }
        Ok(movements)
    }

    fn list_program_movements(&self, program_id: ProgramId) -> RepoResult<Vec<Movement>> {
        let mut stmt = self.conn().prepare(
            "SELECT m.uuid, m.name, m.video, m.sets, m.reps
             FROM program_movements pm
             INNER JOIN movements m ON m.uuid = pm.movement_uuid
             WHERE pm.program_uuid = ?1
             ORDER BY pm.position ASC;",
        )?;
        let mut rows = stmt.query([program_id.to_string()])?;
        let mut movements = Vec::new();
        while let Some(row) = rows.next()? {
            movements.push(parse_movement_row(row)?);
        }
        Ok(movements)
    }

    fn delete_movement(&self, id: MovementId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM movements WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "movement",
                id,
            });
        }
        Ok(())
    }
}

fn parse_movement_row(row: &Row<'_>) -> RepoResult<Movement> {
    let uuid_text: String = row.get(0)?;
    let movement = Movement {
        id: parse_uuid(&uuid_text, "movements.uuid")?,
        name: row.get(1)?,
        video: row.get(2)?,
        sets: row.get(3)?,
        reps: row.get(4)?,
    };
    movement.validate()?;
    Ok(movement)
}
