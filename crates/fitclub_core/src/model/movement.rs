//! Movement (exercise) domain model.
//!
//! # Invariants
//! - `sets` and `reps` are always >= 1.
//! - `video` is an absolute http(s) url.

use crate::model::validation::{FieldError, ValidationErrors};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

pub type MovementId = Uuid;

pub const MOVEMENT_NAME_MAX_CHARS: usize = 200;
pub const MOVEMENT_VIDEO_MAX_CHARS: usize = 200;
pub const DEFAULT_SETS: i64 = 3;
pub const DEFAULT_REPS: i64 = 12;

/// One exercise with a demonstration video and set/rep prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub name: String,
    /// Demonstration video link (usually YouTube).
    pub video: String,
    pub sets: i64,
    pub reps: i64,
}

/// Caller-supplied fields for creating or replacing a movement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MovementDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub video: String,
    #[serde(default = "default_sets")]
    pub sets: i64,
    #[serde(default = "default_reps")]
    pub reps: i64,
}

fn default_sets() -> i64 {
    DEFAULT_SETS
}

fn default_reps() -> i64 {
    DEFAULT_REPS
}

impl MovementDraft {
    /// Draft with default prescription (3 x 12).
    pub fn new(name: impl Into<String>, video: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            video: video.into(),
            sets: DEFAULT_SETS,
            reps: DEFAULT_REPS,
        }
    }
}

impl Movement {
    /// Materializes a draft under a freshly generated id.
    pub fn from_draft(draft: &MovementDraft) -> Self {
        Self::from_draft_with_id(Uuid::new_v4(), draft)
    }

    pub fn from_draft_with_id(id: MovementId, draft: &MovementDraft) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            video: draft.video.trim().to_string(),
            sets: draft.sets,
            reps: draft.reps,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_id("id", self.id);
        errors.check_text("name", &self.name, MOVEMENT_NAME_MAX_CHARS);
        errors.check_text("video", &self.video, MOVEMENT_VIDEO_MAX_CHARS);
        if !self.video.trim().is_empty() && !is_http_url(&self.video) {
            errors.push(FieldError::InvalidUrl {
                field: "video",
                value: self.video.clone(),
            });
        }
        errors.check_min("sets", self.sets, 1);
        errors.check_min("reps", self.reps, 1);
        errors.into_result()
    }
}

fn is_http_url(value: &str) -> bool {
    match Url::parse(value.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}
