//! Workout program domain model.
//!
//! # Invariants
//! - `movement_ids` keeps caller order and contains no duplicates.

use crate::model::movement::{Movement, MovementId};
use crate::model::validation::ValidationErrors;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

pub type ProgramId = Uuid;

pub const PROGRAM_NAME_MAX_CHARS: usize = 200;

/// Named collection of movements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,
    pub name: String,
    pub movement_ids: Vec<MovementId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProgramDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "movements")]
    pub movement_ids: Vec<MovementId>,
}

/// Program with its movements resolved, in program order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDetail {
    pub program: Program,
    pub movements: Vec<Movement>,
}

impl Program {
    pub fn from_draft(draft: &ProgramDraft) -> Self {
        Self::from_draft_with_id(Uuid::new_v4(), draft)
    }

    pub fn from_draft_with_id(id: ProgramId, draft: &ProgramDraft) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            movement_ids: dedup_ids(&draft.movement_ids),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_id("id", self.id);
        errors.check_text("name", &self.name, PROGRAM_NAME_MAX_CHARS);
        for id in &self.movement_ids {
            errors.check_id("movements", *id);
        }
        errors.into_result()
    }
}

/// Removes repeated ids while keeping first-seen order.
pub fn dedup_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
