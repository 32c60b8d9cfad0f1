//! Member use-case service.
//!
//! # Responsibility
//! - Register members (validation + password hashing).
//! - Apply partial updates and re-validate the merged record.
//! - Build member profiles with nested program/diet and derived state.
//!
//! # Invariants
//! - Raw passwords are hashed before they reach the repository.
//! - Missing `membership_start` defaults to the registration day.
//! - Derived attributes are evaluated against the caller-supplied `today`.

use crate::auth::password::hash_password;
use crate::model::diet::DietSummary;
use crate::model::member::{
    check_birth_date, normalize_phone_number, Member, MemberDraft, MemberId, MemberPatch,
};
use crate::model::program::ProgramDetail;
use crate::model::validation::FieldError;
use crate::repo::{MemberListQuery, MemberRepository};
use crate::service::catalog_service::CatalogRepository;
use crate::service::{ServiceError, ServiceResult};
use chrono::NaiveDate;
use log::info;
use uuid::Uuid;

/// Member record with links resolved and derived attributes evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberProfile {
    pub member: Member,
    pub program: Option<ProgramDetail>,
    pub diet: Option<DietSummary>,
    pub age: Option<u32>,
    pub active: bool,
    pub remaining_days: i64,
}

pub struct MemberService<R: MemberRepository + CatalogRepository> {
    repo: R,
}

impl<R: MemberRepository + CatalogRepository> MemberService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new member from a draft.
    ///
    /// # Errors
    /// - `Validation` with every failed field (missing values, bad phone,
    ///   reversed membership window, duplicate phone, unknown links).
    pub fn register(&self, draft: &MemberDraft, today: NaiveDate) -> ServiceResult<Member> {
        let password_hash = if draft.password.is_empty() {
            String::new()
        } else {
            hash_password(&draft.password).map_err(|err| ServiceError::PasswordHash(err.to_string()))?
        };

        let membership_start = draft.membership_start.unwrap_or(today);
        let member = Member {
            id: Uuid::new_v4(),
            phone_number: normalize_phone_number(&draft.phone_number),
            name: draft.name.trim().to_string(),
            surname: draft.surname.trim().to_string(),
            password_hash,
            height: draft.height,
            weight: draft.weight,
            birth_date: draft.birth_date,
            blood_type: draft.blood_type,
            membership_start,
            membership_end: draft.membership_end.unwrap_or(membership_start),
            program_id: draft.program_id,
            diet_id: draft.diet_id,
            is_admin: draft.is_admin,
        };

        let mut errors = member.validate().err().unwrap_or_default();
        if draft.membership_end.is_none() {
            errors.push(FieldError::Required {
                field: "membership_end",
            });
        }
        if let Err(err) = check_birth_date(member.birth_date, today) {
            errors.push(err);
        }
        errors.into_result()?;

        let id = self.repo.create_member(&member)?;
        info!(
            "event=member_register module=service status=ok is_admin={}",
            member.is_admin
        );
        self.repo
            .get_member(id)?
            .ok_or(ServiceError::InconsistentState("registered member not found in read-back"))
    }

    pub fn get(&self, id: MemberId) -> ServiceResult<Option<Member>> {
        Ok(self.repo.get_member(id)?)
    }

    pub fn list(&self, query: &MemberListQuery) -> ServiceResult<Vec<Member>> {
        Ok(self.repo.list_members(query)?)
    }

    /// Applies a partial update; only touched fields change.
    pub fn apply_patch(
        &self,
        id: MemberId,
        patch: &MemberPatch,
        today: NaiveDate,
    ) -> ServiceResult<Member> {
        let mut member = self
            .repo
            .get_member(id)?
            .ok_or(ServiceError::NotFound {
                entity: "member",
                id,
            })?;

        patch.apply_to(&mut member);

        if let Some(password) = &patch.password {
            if password.is_empty() {
                return Err(FieldError::Required { field: "password" }.into());
            }
            member.password_hash =
                hash_password(password).map_err(|err| ServiceError::PasswordHash(err.to_string()))?;
        }

        if patch.birth_date.is_some() {
            check_birth_date(member.birth_date, today)?;
        }

        self.repo.update_member(&member)?;
        info!(
            "event=member_update module=service status=ok fields={}",
            patch
                .touched_fields()
                .iter()
                .map(|field| field.as_str())
                .collect::<Vec<_>>()
                .join(",")
        );
        self.repo
            .get_member(id)?
            .ok_or(ServiceError::InconsistentState("updated member not found in read-back"))
    }

    pub fn delete(&self, id: MemberId) -> ServiceResult<()> {
        self.repo.delete_member(id)?;
        info!("event=member_delete module=service status=ok");
        Ok(())
    }

    /// Member with program/diet resolved and derived state for `today`.
    pub fn profile(&self, id: MemberId, today: NaiveDate) -> ServiceResult<Option<MemberProfile>> {
        match self.repo.get_member(id)? {
            Some(member) => Ok(Some(self.build_profile(member, today)?)),
            None => Ok(None),
        }
    }

    pub fn profiles(
        &self,
        query: &MemberListQuery,
        today: NaiveDate,
    ) -> ServiceResult<Vec<MemberProfile>> {
        self.repo
            .list_members(query)?
            .into_iter()
            .map(|member| self.build_profile(member, today))
            .collect()
    }

    fn build_profile(&self, member: Member, today: NaiveDate) -> ServiceResult<MemberProfile> {
        let program = match member.program_id {
            Some(program_id) => match self.repo.get_program(program_id)? {
                Some(program) => {
                    let movements = self.repo.list_program_movements(program_id)?;
                    Some(ProgramDetail { program, movements })
                }
                None => None,
            },
            None => None,
        };

        let diet = match member.diet_id {
            Some(diet_id) => match self.repo.get_diet(diet_id)? {
                Some(diet) => Some(DietSummary::new(diet, self.repo.list_diet_meals(diet_id)?)),
                None => None,
            },
            None => None,
        };

        Ok(MemberProfile {
            age: member.age_on(today),
            active: member.is_active_on(today),
            remaining_days: member.remaining_days_on(today),
            program,
            diet,
            member,
        })
    }
}

