//! Catalog handlers: movements, meals, programs and diets.
//!
//! Members may list and retrieve; every write needs an admin.

use crate::access::{authorize, Action, Principal, Resource};
use crate::api::views::{DietView, ProgramView};
use crate::api::{ApiContext, ApiError, ApiResult};
use crate::model::diet::{DietDraft, DietId};
use crate::model::meal::{Meal, MealDraft, MealId};
use crate::model::movement::{Movement, MovementDraft, MovementId};
use crate::model::program::{ProgramDraft, ProgramId};
use crate::repo::{ListQuery, SqliteRepository};
use crate::service::catalog_service::CatalogService;

impl ApiContext<'_> {
    fn catalog(&self) -> ApiResult<CatalogService<SqliteRepository<'_>>> {
        Ok(CatalogService::new(self.repo()?))
    }

    pub fn list_movements(
        &self,
        caller: Option<&Principal>,
        query: &ListQuery,
    ) -> ApiResult<Vec<Movement>> {
        authorize(caller, Resource::Movement, Action::List)?;
        Ok(self.catalog()?.list_movements(query)?)
    }

    pub fn retrieve_movement(
        &self,
        caller: Option<&Principal>,
        id: MovementId,
    ) -> ApiResult<Movement> {
        authorize(caller, Resource::Movement, Action::Retrieve)?;
        self.catalog()?
            .get_movement(id)?
            .ok_or(ApiError::NotFound { entity: "movement" })
    }

    pub fn create_movement(
        &self,
        caller: Option<&Principal>,
        draft: &MovementDraft,
    ) -> ApiResult<Movement> {
        authorize(caller, Resource::Movement, Action::Create)?;
        Ok(self.catalog()?.create_movement(draft)?)
    }

    pub fn update_movement(
        &self,
        caller: Option<&Principal>,
        id: MovementId,
        draft: &MovementDraft,
    ) -> ApiResult<Movement> {
        authorize(caller, Resource::Movement, Action::Update)?;
        Ok(self.catalog()?.update_movement(id, draft)?)
    }

    pub fn delete_movement(&self, caller: Option<&Principal>, id: MovementId) -> ApiResult<()> {
        authorize(caller, Resource::Movement, Action::Delete)?;
        Ok(self.catalog()?.delete_movement(id)?)
    }

    pub fn list_meals(&self, caller: Option<&Principal>, query: &ListQuery) -> ApiResult<Vec<Meal>> {
        authorize(caller, Resource::Meal, Action::List)?;
        Ok(self.catalog()?.list_meals(query)?)
    }

    pub fn retrieve_meal(&self, caller: Option<&Principal>, id: MealId) -> ApiResult<Meal> {
        authorize(caller, Resource::Meal, Action::Retrieve)?;
        self.catalog()?
            .get_meal(id)?
            .ok_or(ApiError::NotFound { entity: "meal" })
    }

    pub fn create_meal(&self, caller: Option<&Principal>, draft: &MealDraft) -> ApiResult<Meal> {
        authorize(caller, Resource::Meal, Action::Create)?;
        Ok(self.catalog()?.create_meal(draft)?)
    }

    pub fn update_meal(
        &self,
        caller: Option<&Principal>,
        id: MealId,
        draft: &MealDraft,
    ) -> ApiResult<Meal> {
        authorize(caller, Resource::Meal, Action::Update)?;
        Ok(self.catalog()?.update_meal(id, draft)?)
    }

    pub fn delete_meal(&self, caller: Option<&Principal>, id: MealId) -> ApiResult<()> {
        authorize(caller, Resource::Meal, Action::Delete)?;
        Ok(self.catalog()?.delete_meal(id)?)
    }

    pub fn list_programs(
        &self,
        caller: Option<&Principal>,
        query: &ListQuery,
    ) -> ApiResult<Vec<ProgramView>> {
        authorize(caller, Resource::Program, Action::List)?;
        let programs = self.catalog()?.list_programs(query)?;
        Ok(programs.into_iter().map(ProgramView::from).collect())
    }

    pub fn retrieve_program(
        &self,
        caller: Option<&Principal>,
        id: ProgramId,
    ) -> ApiResult<ProgramView> {
        authorize(caller, Resource::Program, Action::Retrieve)?;
        self.catalog()?
            .program_detail(id)?
            .map(ProgramView::from)
            .ok_or(ApiError::NotFound { entity: "program" })
    }

    pub fn create_program(
        &self,
        caller: Option<&Principal>,
        draft: &ProgramDraft,
    ) -> ApiResult<ProgramView> {
        authorize(caller, Resource::Program, Action::Create)?;
        Ok(self.catalog()?.create_program(draft)?.into())
    }

    pub fn update_program(
        &self,
        caller: Option<&Principal>,
        id: ProgramId,
        draft: &ProgramDraft,
    ) -> ApiResult<ProgramView> {
        authorize(caller, Resource::Program, Action::Update)?;
        Ok(self.catalog()?.update_program(id, draft)?.into())
    }

    pub fn delete_program(&self, caller: Option<&Principal>, id: ProgramId) -> ApiResult<()> {
        authorize(caller, Resource::Program, Action::Delete)?;
        Ok(self.catalog()?.delete_program(id)?)
    }

    pub fn list_diets(
        &self,
        caller: Option<&Principal>,
        query: &ListQuery,
    ) -> ApiResult<Vec<DietView>> {
        authorize(caller, Resource::Diet, Action::List)?;
        let diets = self.catalog()?.list_diets(query)?;
        Ok(diets.into_iter().map(DietView::from).collect())
    }

    pub fn retrieve_diet(&self, caller: Option<&Principal>, id: DietId) -> ApiResult<DietView> {
        authorize(caller, Resource::Diet, Action::Retrieve)?;
        self.catalog()?
            .diet_summary(id)?
            .map(DietView::from)
            .ok_or(ApiError::NotFound { entity: "diet" })
    }

    pub fn create_diet(&self, caller: Option<&Principal>, draft: &DietDraft) -> ApiResult<DietView> {
        authorize(caller, Resource::Diet, Action::Create)?;
        Ok(self.catalog()?.create_diet(draft)?.into())
    }

    pub fn update_diet(
        &self,
        caller: Option<&Principal>,
        id: DietId,
        draft: &DietDraft,
    ) -> ApiResult<DietView> {
        authorize(caller, Resource::Diet, Action::Update)?;
        Ok(self.catalog()?.update_diet(id, draft)?.into())
    }

    pub fn delete_diet(&self, caller: Option<&Principal>, id: DietId) -> ApiResult<()> {
        authorize(caller, Resource::Diet, Action::Delete)?;
        Ok(self.catalog()?.delete_diet(id)?)
    }
}
