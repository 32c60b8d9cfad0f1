//! Wire representations returned by API handlers.

use crate::model::diet::{DietId, DietSummary};
use crate::model::meal::Meal;
use crate::model::member::{BloodType, MemberId};
use crate::model::movement::Movement;
use crate::model::program::{ProgramDetail, ProgramId};
use crate::service::member_service::MemberProfile;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgramView {
    pub id: ProgramId,
    pub name: String,
    pub movements: Vec<Movement>,
}

impl From<ProgramDetail> for ProgramView {
    fn from(value: ProgramDetail) -> Self {
        Self {
            id: value.program.id,
            name: value.program.name,
            movements: value.movements,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DietView {
    pub id: DietId,
    pub name: String,
    pub meals: Vec<Meal>,
    pub total_calories: i64,
    pub total_protein: i64,
    pub total_carbs: i64,
    pub total_oil: i64,
}

impl From<DietSummary> for DietView {
    fn from(value: DietSummary) -> Self {
        let name = value.name();
        Self {
            id: value.diet.id,
            name,
            meals: value.meals,
            total_calories: value.totals.total_calories,
            total_protein: value.totals.total_protein,
            total_carbs: value.totals.total_carbs,
            total_oil: value.totals.total_oil,
        }
    }
}

/// Member as seen by callers. Carries no password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberView {
    pub id: MemberId,
    pub phone_number: String,
    pub name: String,
    pub surname: String,
    pub height: Option<Decimal>,
    pub weight: Option<Decimal>,
    pub birth_date: Option<NaiveDate>,
    pub blood_type: Option<BloodType>,
    pub membership_start: NaiveDate,
    pub membership_end: NaiveDate,
    pub program: Option<ProgramView>,
    pub diet: Option<DietView>,
    pub age: Option<u32>,
    pub active: bool,
    pub remaining_days: i64,
    pub is_admin: bool,
}

impl From<MemberProfile> for MemberView {
    fn from(value: MemberProfile) -> Self {
        let member = value.member;
        Self {
            id: member.id,
            phone_number: member.phone_number,
            name: member.name,
            surname: member.surname,
            height: member.height,
            weight: member.weight,
            birth_date: member.birth_date,
            blood_type: member.blood_type,
            membership_start: member.membership_start,
            membership_end: member.membership_end,
            program: value.program.map(ProgramView::from),
            diet: value.diet.map(DietView::from),
            age: value.age,
            active: value.active,
            remaining_days: value.remaining_days,
            is_admin: member.is_admin,
        }
    }
}
