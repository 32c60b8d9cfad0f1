//! Meal domain model.

use crate::model::validation::ValidationErrors;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MealId = Uuid;

pub const MEAL_NAME_MAX_CHARS: usize = 200;

/// Upper bound for amount, macros and calories (32-bit column range).
pub const MEAL_VALUE_MAX: i64 = i32::MAX as i64;

/// Unit the meal `amount` is measured in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealUnit {
    #[default]
    Piece,
    Gram,
    Liter,
}

impl MealUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Piece => "piece",
            Self::Gram => "gram",
            Self::Liter => "liter",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "piece" => Some(Self::Piece),
            "gram" => Some(Self::Gram),
            "liter" => Some(Self::Liter),
            _ => None,
        }
    }
}

/// One portion of food with macro and calorie values.
///
/// Macros are grams, calories are kcal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meal {
    pub id: MealId,
    pub name: String,
    pub amount: i64,
    pub unit: MealUnit,
    pub protein: i64,
    pub carbs: i64,
    pub oil: i64,
    pub calories: i64,
}

/// Caller-supplied fields for creating or replacing a meal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MealDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub unit: MealUnit,
    #[serde(default)]
    pub protein: i64,
    #[serde(default)]
    pub carbs: i64,
    #[serde(default)]
    pub oil: i64,
    #[serde(default)]
    pub calories: i64,
}

impl Meal {
    pub fn from_draft(draft: &MealDraft) -> Self {
        Self::from_draft_with_id(Uuid::new_v4(), draft)
    }

    pub fn from_draft_with_id(id: MealId, draft: &MealDraft) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            amount: draft.amount,
            unit: draft.unit,
            protein: draft.protein,
            carbs: draft.carbs,
            oil: draft.oil,
            calories: draft.calories,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_id("id", self.id);
        errors.check_text("name", &self.name, MEAL_NAME_MAX_CHARS);
        errors.check_range("amount", self.amount, 0, MEAL_VALUE_MAX);
        errors.check_range("protein", self.protein, 0, MEAL_VALUE_MAX);
        errors.check_range("carbs", self.carbs, 0, MEAL_VALUE_MAX);
        errors.check_range("oil", self.oil, 0, MEAL_VALUE_MAX);
        errors.check_range("calories", self.calories, 0, MEAL_VALUE_MAX);
        errors.into_result()
    }
}
