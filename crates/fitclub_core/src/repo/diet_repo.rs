//! Diet repository contract and SQLite implementation.
//!
//! # Invariants
//! - A diet row and its meal links are written in one transaction.
//! - Totals are not stored; callers sum meals on read.

use crate::model::diet::{Diet, DietId};
use crate::model::meal::MealId;
use crate::repo::{ensure_ids_exist, parse_uuid, ListQuery, RepoError, RepoResult, SqliteRepository};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};

pub trait DietRepository {
    fn create_diet(&self, diet: &Diet) -> RepoResult<DietId>;
    /// Replaces the full meal list.
    fn update_diet(&self, diet: &Diet) -> RepoResult<()>;
    fn get_diet(&self, id: DietId) -> RepoResult<Option<Diet>>;
    fn list_diets(&self, query: &ListQuery) -> RepoResult<Vec<Diet>>;
    fn delete_diet(&self, id: DietId) -> RepoResult<()>;
}

impl DietRepository for SqliteRepository<'_> {
    fn create_diet(&self, diet: &Diet) -> RepoResult<DietId> {
        diet.validate()?;

        let tx = self.conn().unchecked_transaction()?;
        ensure_ids_exist(&tx, "meals", "meals", &diet.meal_ids)?;
        tx.execute("INSERT INTO diets (uuid) VALUES (?1);", [diet.id.to_string()])?;
        insert_links(&tx, diet.id, &diet.meal_ids)?;
        tx.commit()?;

        Ok(diet.id)
    }

    fn update_diet(&self, diet: &Diet) -> RepoResult<()> {
        diet.validate()?;

        let tx = self.conn().unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE diets
             SET updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            [diet.id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "diet",
                id: diet.id,
            });
        }

        ensure_ids_exist(&tx, "meals", "meals", &diet.meal_ids)?;
        tx.execute(
            "DELETE FROM diet_meals WHERE diet_uuid = ?1;",
            [diet.id.to_string()],
        )?;
        insert_links(&tx, diet.id, &diet.meal_ids)?;
        tx.commit()?;

        Ok(())
    }

    fn get_diet(&self, id: DietId) -> RepoResult<Option<Diet>> {
        let exists: i64 = self.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM diets WHERE uuid = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Ok(None);
        }

        Ok(Some(Diet {
            id,
            meal_ids: load_meal_ids(self.conn(), id)?,
        }))
    }

    fn list_diets(&self, query: &ListQuery) -> RepoResult<Vec<Diet>> {
        let mut sql = String::from("SELECT uuid FROM diets ORDER BY created_at ASC, uuid ASC");
        let mut bind_values: Vec<Value> = Vec::new();
        query.append_to(&mut sql, &mut bind_values);

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut diets = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            let id = parse_uuid(&uuid_text, "diets.uuid")?;
            diets.push(Diet {
                id,
                meal_ids: load_meal_ids(self.conn(), id)?,
            });
        }
        Ok(diets)
    }

    fn delete_diet(&self, id: DietId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM diets WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "diet", id });
        }
        Ok(())
    }
}

fn insert_links(conn: &Connection, diet_id: DietId, meal_ids: &[MealId]) -> RepoResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO diet_meals (diet_uuid, meal_uuid, position)
         VALUES (?1, ?2, ?3);",
    )?;
    for (position, meal_id) in meal_ids.iter().enumerate() {
        stmt.execute(params![
            diet_id.to_string(),
            meal_id.to_string(),
            position as i64,
        ])?;
    }
    Ok(())
}

fn load_meal_ids(conn: &Connection, diet_id: DietId) -> RepoResult<Vec<MealId>> {
    let mut stmt = conn.prepare(
        "SELECT meal_uuid
         FROM diet_meals
         WHERE diet_uuid = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([diet_id.to_string()])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        ids.push(parse_uuid(&value, "diet_meals.meal_uuid")?);
    }
    Ok(ids)
}
