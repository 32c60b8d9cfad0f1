//! Diet (meal plan) domain model and derived nutrition totals.
//!
//! # Invariants
//! - Totals are never stored; they are summed from constituent meals on read.
//! - Sums saturate at `i64::MAX` instead of overflowing.
//! - A diet's display name is derived from its total calories.

use crate::model::meal::{Meal, MealId};
use crate::model::program::dedup_ids;
use crate::model::validation::ValidationErrors;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type DietId = Uuid;

/// Collection of meals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diet {
    pub id: DietId,
    pub meal_ids: Vec<MealId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DietDraft {
    #[serde(default, alias = "meals")]
    pub meal_ids: Vec<MealId>,
}

/// Calorie and macro sums over a set of meals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NutritionTotals {
    pub total_calories: i64,
    pub total_protein: i64,
    pub total_carbs: i64,
    pub total_oil: i64,
}

impl NutritionTotals {
    pub fn from_meals<'a>(meals: impl IntoIterator<Item = &'a Meal>) -> Self {
        meals
            .into_iter()
            .fold(Self::default(), |totals, meal| Self {
                total_calories: totals.total_calories.saturating_add(meal.calories),
                total_protein: totals.total_protein.saturating_add(meal.protein),
                total_carbs: totals.total_carbs.saturating_add(meal.carbs),
                total_oil: totals.total_oil.saturating_add(meal.oil),
            })
    }
}

/// Diet with its meals resolved and totals computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DietSummary {
    pub diet: Diet,
    pub meals: Vec<Meal>,
    pub totals: NutritionTotals,
}

impl DietSummary {
    pub fn new(diet: Diet, meals: Vec<Meal>) -> Self {
        let totals = NutritionTotals::from_meals(&meals);
        Self {
            diet,
            meals,
            totals,
        }
    }

    /// Display name, e.g. `2150 Kcal Diet`.
    pub fn name(&self) -> String {
        format!("{} Kcal Diet", self.totals.total_calories)
    }
}

impl Diet {
    pub fn from_draft(draft: &DietDraft) -> Self {
        Self::from_draft_with_id(Uuid::new_v4(), draft)
    }

    pub fn from_draft_with_id(id: DietId, draft: &DietDraft) -> Self {
        Self {
            id,
            meal_ids: dedup_ids(&draft.meal_ids),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_id("id", self.id);
        for id in &self.meal_ids {
            errors.check_id("meals", *id);
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::{Diet, DietDraft, DietSummary, NutritionTotals};
    use crate::model::meal::{Meal, MealDraft};

    fn meal(calories: i64, protein: i64, carbs: i64, oil: i64) -> Meal {
        Meal::from_draft(&MealDraft {
            name: "meal".to_string(),
            amount: 1,
            calories,
            protein,
            carbs,
            oil,
            ..MealDraft::default()
        })
    }

    #[test]
    fn totals_sum_every_meal() {
        let meals = vec![meal(350, 30, 10, 20), meal(120, 4, 25, 1)];
        let totals = NutritionTotals::from_meals(&meals);
        assert_eq!(
            totals,
            NutritionTotals {
                total_calories: 470,
                total_protein: 34,
                total_carbs: 35,
                total_oil: 21,
            }
        );
    }

    #[test]
    fn empty_diet_is_zero_kcal() {
        let summary = DietSummary::new(Diet::from_draft(&DietDraft::default()), Vec::new());
        assert_eq!(summary.totals, NutritionTotals::default());
        assert_eq!(summary.name(), "0 Kcal Diet");
    }

    #[test]
    fn oversized_meal_values_saturate_instead_of_overflowing() {
        let half = i64::MAX / 2 + 1;
        let meals = vec![meal(half, 0, 0, 0), meal(half, 0, 0, 0)];
        let totals = NutritionTotals::from_meals(&meals);
        assert_eq!(totals.total_calories, i64::MAX);
        assert_eq!(totals.total_protein, 0);
    }
}
