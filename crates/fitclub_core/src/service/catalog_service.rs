//! Catalog use-case service (movements, meals, programs, diets).
//!
//! # Responsibility
//! - Turn caller drafts into validated entities and persist them.
//! - Resolve program movements and diet meals into read models.
//!
//! # Invariants
//! - Updates replace the whole entity (links included) under the same id.
//! - Diet totals are always recomputed from the meals read back.

use crate::model::diet::{Diet, DietDraft, DietId, DietSummary};
use crate::model::meal::{Meal, MealDraft, MealId};
use crate::model::movement::{Movement, MovementDraft, MovementId};
use crate::model::program::{Program, ProgramDetail, ProgramDraft, ProgramId};
use crate::repo::{DietRepository, ListQuery, MealRepository, MovementRepository, ProgramRepository};
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Every store the catalog needs.
pub trait CatalogRepository:
    MovementRepository + MealRepository + ProgramRepository + DietRepository
{
}

impl<T> CatalogRepository for T where
    T: MovementRepository + MealRepository + ProgramRepository + DietRepository
{
}

pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_movement(&self, draft: &MovementDraft) -> ServiceResult<Movement> {
        let movement = Movement::from_draft(draft);
        let id = self.repo.create_movement(&movement)?;
        info!("event=catalog_write module=service status=ok entity=movement action=create");
        self.repo
            .get_movement(id)?
            .ok_or(ServiceError::InconsistentState("created movement not found in read-back"))
    }

    pub fn update_movement(&self, id: MovementId, draft: &MovementDraft) -> ServiceResult<Movement> {
        let movement = Movement::from_draft_with_id(id, draft);
        self.repo.update_movement(&movement)?;
        self.repo
            .get_movement(id)?
            .ok_or(ServiceError::InconsistentState("updated movement not found in read-back"))
    }

    pub fn get_movement(&self, id: MovementId) -> ServiceResult<Option<Movement>> {
        Ok(self.repo.get_movement(id)?)
    }

    pub fn list_movements(&self, query: &ListQuery) -> ServiceResult<Vec<Movement>> {
        Ok(self.repo.list_movements(query)?)
    }

    pub fn delete_movement(&self, id: MovementId) -> ServiceResult<()> {
        self.repo.delete_movement(id)?;
        info!("event=catalog_write module=service status=ok entity=movement action=delete");
        Ok(())
    }

    pub fn create_meal(&self, draft: &MealDraft) -> ServiceResult<Meal> {
        let meal = Meal::from_draft(draft);
        let id = self.repo.create_meal(&meal)?;
        info!("event=catalog_write module=service status=ok entity=meal action=create");
        self.repo
            .get_meal(id)?
            .ok_or(ServiceError::InconsistentState("created meal not found in read-back"))
    }

    pub fn update_meal(&self, id: MealId, draft: &MealDraft) -> ServiceResult<Meal> {
        let meal = Meal::from_draft_with_id(id, draft);
        self.repo.update_meal(&meal)?;
        self.repo
            .get_meal(id)?
            .ok_or(ServiceError::InconsistentState("updated meal not found in read-back"))
    }

    pub fn get_meal(&self, id: MealId) -> ServiceResult<Option<Meal>> {
        Ok(self.repo.get_meal(id)?)
    }

    pub fn list_meals(&self, query: &ListQuery) -> ServiceResult<Vec<Meal>> {
        Ok(self.repo.list_meals(query)?)
    }

    pub fn delete_meal(&self, id: MealId) -> ServiceResult<()> {
        self.repo.delete_meal(id)?;
        info!("event=catalog_write module=service status=ok entity=meal action=delete");
        Ok(())
    }

    pub fn create_program(&self, draft: &ProgramDraft) -> ServiceResult<ProgramDetail> {
        let program = Program::from_draft(draft);
        let id = self.repo.create_program(&program)?;
        info!(
            "event=catalog_write module=service status=ok entity=program action=create movements={}",
            program.movement_ids.len()
        );
        self.program_detail(id)?
            .ok_or(ServiceError::InconsistentState("created program not found in read-back"))
    }

    pub fn update_program(&self, id: ProgramId, draft: &ProgramDraft) -> ServiceResult<ProgramDetail> {
        let program = Program::from_draft_with_id(id, draft);
        self.repo.update_program(&program)?;
        self.program_detail(id)?
            .ok_or(ServiceError::InconsistentState("updated program not found in read-back"))
    }

    /// Program with its movements resolved in program order.
    pub fn program_detail(&self, id: ProgramId) -> ServiceResult<Option<ProgramDetail>> {
        let Some(program) = self.repo.get_program(id)? else {
            return Ok(None);
        };
        let movements = self.repo.list_program_movements(id)?;
        Ok(Some(ProgramDetail { program, movements }))
    }

    pub fn list_programs(&self, query: &ListQuery) -> ServiceResult<Vec<ProgramDetail>> {
        let programs = self.repo.list_programs(query)?;
        let mut details = Vec::with_capacity(programs.len());
        for program in programs {
            let movements = self.repo.list_program_movements(program.id)?;
            details.push(ProgramDetail { program, movements });
        }
        Ok(details)
    }

    pub fn delete_program(&self, id: ProgramId) -> ServiceResult<()> {
        self.repo.delete_program(id)?;
        info!("event=catalog_write module=service status=ok entity=program action=delete");
        Ok(())
    }

    pub fn create_diet(&self, draft: &DietDraft) -> ServiceResult<DietSummary> {
        let diet = Diet::from_draft(draft);
        let id = self.repo.create_diet(&diet)?;
        info!(
            "event=catalog_write module=service status=ok entity=diet action=create meals={}",
            diet.meal_ids.len()
        );
        self.diet_summary(id)?
            .ok_or(ServiceError::InconsistentState("created diet not found in read-back"))
    }

    pub fn update_diet(&self, id: DietId, draft: &DietDraft) -> ServiceResult<DietSummary> {
        let diet = Diet::from_draft_with_id(id, draft);
        self.repo.update_diet(&diet)?;
        self.diet_summary(id)?
            .ok_or(ServiceError::InconsistentState("updated diet not found in read-back"))
    }

    /// Diet with meals resolved and totals summed.
    pub fn diet_summary(&self, id: DietId) -> ServiceResult<Option<DietSummary>> {
        let Some(diet) = self.repo.get_diet(id)? else {
            return Ok(None);
        };
        let meals = self.repo.list_diet_meals(id)?;
        Ok(Some(DietSummary::new(diet, meals)))
    }

    pub fn list_diets(&self, query: &ListQuery) -> ServiceResult<Vec<DietSummary>> {
        let diets = self.repo.list_diets(query)?;
        let mut summaries = Vec::with_capacity(diets.len());
        for diet in diets {
            let meals = self.repo.list_diet_meals(diet.id)?;
            summaries.push(DietSummary::new(diet, meals));
        }
        Ok(summaries)
    }

    pub fn delete_diet(&self, id: DietId) -> ServiceResult<()> {
        self.repo.delete_diet(id)?;
        info!("event=catalog_write module=service status=ok entity=diet action=delete");
        Ok(())
    }
}
