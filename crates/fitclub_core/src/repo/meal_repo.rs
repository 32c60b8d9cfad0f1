//! Meal repository contract and SQLite implementation.

use crate::model::diet::DietId;
use crate::model::meal::{Meal, MealId, MealUnit};
use crate::repo::{parse_uuid, ListQuery, RepoError, RepoResult, SqliteRepository};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};

const MEAL_COLUMNS: &str = "uuid, name, amount, unit, protein, carbs, oil, calories";

pub trait MealRepository {
    fn create_meal(&self, meal: &Meal) -> RepoResult<MealId>;
    fn update_meal(&self, meal: &Meal) -> RepoResult<()>;
    fn get_meal(&self, id: MealId) -> RepoResult<Option<Meal>>;
    fn list_meals(&self, query: &ListQuery) -> RepoResult<Vec<Meal>>;
    /// Meals linked to a diet, in diet order.
    fn list_diet_meals(&self, diet_id: DietId) -> RepoResult<Vec<Meal>>;
    fn delete_meal(&self, id: MealId) -> RepoResult<()>;
}

impl MealRepository for SqliteRepository<'_> {
    fn create_meal(&self, meal: &Meal) -> RepoResult<MealId> {
        meal.validate()?;

        self.conn().execute(
            &format!("INSERT INTO meals ({MEAL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);"),
            params![
                meal.id.to_string(),
                meal.name.as_str(),
                meal.amount,
                meal.unit.as_str(),
                meal.protein,
                meal.carbs,
                meal.oil,
                meal.calories,
            ],
        )?;

        Ok(meal.id)
    }

    fn update_meal(&self, meal: &Meal) -> RepoResult<()> {
        meal.validate()?;

        let changed = self.conn().execute(
            "UPDATE meals
             SET
                name = ?1,
                amount = ?2,
                unit = ?3,
                protein = ?4,
                carbs = ?5,
                oil = ?6,
                calories = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?8;",
            params![
                meal.name.as_str(),
                meal.amount,
                meal.unit.as_str(),
                meal.protein,
                meal.carbs,
                meal.oil,
                meal.calories,
                meal.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "meal",
                id: meal.id,
            });
        }

        Ok(())
    }

    fn get_meal(&self, id: MealId) -> RepoResult<Option<Meal>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("SELECT {MEAL_COLUMNS} FROM meals WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_meal_row(row)?));
        }
        Ok(None)
    }

    fn list_meals(&self, query: &ListQuery) -> RepoResult<Vec<Meal>> {
        let mut sql =
            format!("SELECT {MEAL_COLUMNS} FROM meals ORDER BY name COLLATE NOCASE ASC, uuid ASC");
        let mut bind_values: Vec<Value> = Vec::new();
        query.append_to(&mut sql, &mut bind_values);

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut meals = Vec::new();
        while let Some(row) = rows.next()? {
            meals.push(parse_meal_row(row)?);
        }
        Ok(meals)
    }

    fn list_diet_meals(&self, diet_id: DietId) -> RepoResult<Vec<Meal>> {
        let mut stmt = self.conn().prepare(
            "SELECT m.uuid, m.name, m.amount, m.unit, m.protein, m.carbs, m.oil, m.calories
             FROM diet_meals dm
             INNER JOIN meals m ON m.uuid = dm.meal_uuid
             WHERE dm.diet_uuid = ?1
             ORDER BY dm.position ASC;",
        )?;
        let mut rows = stmt.query([diet_id.to_string()])?;
        let mut meals = Vec::new();
        while let Some(row) = rows.next()? {
            meals.push(parse_meal_row(row)?);
        }
        Ok(meals)
    }

    fn delete_meal(&self, id: MealId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM meals WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound { entity: "meal", id });
        }
        Ok(())
    }
}

fn parse_meal_row(row: &Row<'_>) -> RepoResult<Meal> {
    let uuid_text: String = row.get(0)?;
    let unit_text: String = row.get(3)?;
    let unit = MealUnit::parse(&unit_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid meal unit `{unit_text}` in meals.unit"))
    })?;

    let meal = Meal {
        id: parse_uuid(&uuid_text, "meals.uuid")?,
        name: row.get(1)?,
        amount: row.get(2)?,
        unit,
        protein: row.get(4)?,
        carbs: row.get(5)?,
        oil: row.get(6)?,
        calories: row.get(7)?,
    };
    meal.validate()?;
    Ok(meal)
}
