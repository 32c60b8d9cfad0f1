//! Member (gym customer account) domain model.
//!
//! # Responsibility
//! - Define the stored member record and its create/patch payloads.
//! - Compute derived membership state (`age`, `active`, `remaining_days`).
//!
//! # Invariants
//! - `phone_number` is stored normalized and matches `^\+?1?\d{9,15}$`.
//! - `membership_end >= membership_start`.
//! - The raw password never lives on `Member`; only its Argon2 hash does.
//! - Derived attributes take `today` explicitly and are never persisted.

use crate::model::diet::DietId;
use crate::model::program::ProgramId;
use crate::model::validation::{FieldError, ValidationErrors};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

pub type MemberId = Uuid;

pub const MEMBER_NAME_MAX_CHARS: usize = 100;
/// Height/weight columns keep at most 5 digits, 2 of them decimals.
pub const MEASUREMENT_MAX_SCALE: u32 = 2;

static PHONE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?1?\d{9,15}$").expect("valid phone number regex"));

static MEASUREMENT_LIMIT: Lazy<Decimal> = Lazy::new(|| Decimal::new(99_999, 2));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "0+", alias = "O+")]
    ZeroPositive,
    #[serde(rename = "0-", alias = "O-")]
    ZeroNegative,
}

impl BloodType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::ZeroPositive => "0+",
            Self::ZeroNegative => "0-",
        }
    }

    /// Parses a blood type label; `O` is accepted as a spelling of `0`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "A+" => Some(Self::APositive),
            "A-" => Some(Self::ANegative),
            "B+" => Some(Self::BPositive),
            "B-" => Some(Self::BNegative),
            "AB+" => Some(Self::AbPositive),
            "AB-" => Some(Self::AbNegative),
            "0+" | "O+" => Some(Self::ZeroPositive),
            "0-" | "O-" => Some(Self::ZeroNegative),
            _ => None,
        }
    }
}

/// Stored member record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub phone_number: String,
    pub name: String,
    pub surname: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    /// Centimeters.
    pub height: Option<Decimal>,
    /// Kilograms.
    pub weight: Option<Decimal>,
    pub birth_date: Option<NaiveDate>,
    pub blood_type: Option<BloodType>,
    pub membership_start: NaiveDate,
    pub membership_end: NaiveDate,
    pub program_id: Option<ProgramId>,
    pub diet_id: Option<DietId>,
    pub is_admin: bool,
}

impl Member {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    /// Whole years since `birth_date`, birthday-aware.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        let mut years = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }

    /// Membership is active through the end date inclusive.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        today <= self.membership_end
    }

    /// Days until `membership_end`; negative once the membership lapsed.
    pub fn remaining_days_on(&self, today: NaiveDate) -> i64 {
        (self.membership_end - today).num_days()
    }

    /// Checks every stored-field invariant.
    ///
    /// Date-relative checks (birth date not in the future) need a reference
    /// day and live in [`check_birth_date`].
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check_id("id", self.id);
        if self.phone_number.trim().is_empty() {
            errors.push(FieldError::Required {
                field: "phone_number",
            });
        } else if !PHONE_NUMBER_RE.is_match(&self.phone_number) {
            errors.push(FieldError::InvalidPhoneNumber);
        }
        errors.check_text("name", &self.name, MEMBER_NAME_MAX_CHARS);
        errors.check_text("surname", &self.surname, MEMBER_NAME_MAX_CHARS);
        if self.password_hash.is_empty() {
            errors.push(FieldError::Required { field: "password" });
        }
        check_measurement(&mut errors, "height", self.height);
        check_measurement(&mut errors, "weight", self.weight);
        if self.membership_end < self.membership_start {
            errors.push(FieldError::InvalidMembershipWindow {
                start: self.membership_start,
                end: self.membership_end,
            });
        }
        if let Some(id) = self.program_id {
            errors.check_id("program", id);
        }
        if let Some(id) = self.diet_id {
            errors.check_id("diet", id);
        }
        errors.into_result()
    }
}

/// Rejects a birth date after `today`.
pub fn check_birth_date(birth_date: Option<NaiveDate>, today: NaiveDate) -> Result<(), FieldError> {
    match birth_date {
        Some(date) if date > today => Err(FieldError::FutureDate {
            field: "birth_date",
            date,
        }),
        _ => Ok(()),
    }
}

/// Strips common separators from a phone number.
///
/// Validation of the remaining text is left to [`Member::validate`].
pub fn normalize_phone_number(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !matches!(ch, ' ' | '-' | '(' | ')' | '.'))
        .collect()
}

fn check_measurement(errors: &mut ValidationErrors, field: &'static str, value: Option<Decimal>) {
    let Some(value) = value else {
        return;
    };
    if value <= Decimal::ZERO {
        errors.push(FieldError::InvalidMeasurement {
            field,
            reason: "must be positive",
        });
    } else if value.normalize().scale() > MEASUREMENT_MAX_SCALE {
        errors.push(FieldError::InvalidMeasurement {
            field,
            reason: "must have at most 2 decimal places",
        });
    } else if value > *MEASUREMENT_LIMIT {
        errors.push(FieldError::InvalidMeasurement {
            field,
            reason: "must be at most 999.99",
        });
    }
}

/// Payload for registering a member.
///
/// Text fields default to empty so a missing field surfaces as a field-level
/// `Required` error instead of a decode failure. Unknown keys are a decode
/// failure, so a misspelled field is never silently dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberDraft {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub height: Option<Decimal>,
    #[serde(default)]
    pub weight: Option<Decimal>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub blood_type: Option<BloodType>,
    /// Defaults to the registration day.
    #[serde(default)]
    pub membership_start: Option<NaiveDate>,
    #[serde(default)]
    pub membership_end: Option<NaiveDate>,
    #[serde(default, alias = "program")]
    pub program_id: Option<ProgramId>,
    #[serde(default, alias = "diet")]
    pub diet_id: Option<DietId>,
    #[serde(default)]
    pub is_admin: bool,
}

/// Member fields a caller can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberField {
    PhoneNumber,
    Name,
    Surname,
    Password,
    Height,
    Weight,
    BirthDate,
    BloodType,
    MembershipStart,
    MembershipEnd,
    Program,
    Diet,
    IsAdmin,
}

impl MemberField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PhoneNumber => "phone_number",
            Self::Name => "name",
            Self::Surname => "surname",
            Self::Password => "password",
            Self::Height => "height",
            Self::Weight => "weight",
            Self::BirthDate => "birth_date",
            Self::BloodType => "blood_type",
            Self::MembershipStart => "membership_start",
            Self::MembershipEnd => "membership_end",
            Self::Program => "program",
            Self::Diet => "diet",
            Self::IsAdmin => "is_admin",
        }
    }
}

/// Partial update for a member.
///
/// Outer `None` leaves a field untouched. For nullable fields the inner
/// `None` (JSON `null`) clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberPatch {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub height: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub weight: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub birth_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub blood_type: Option<Option<BloodType>>,
    #[serde(default)]
    pub membership_start: Option<NaiveDate>,
    #[serde(default)]
    pub membership_end: Option<NaiveDate>,
    #[serde(default, alias = "program", deserialize_with = "explicit_null")]
    pub program_id: Option<Option<ProgramId>>,
    #[serde(default, alias = "diet", deserialize_with = "explicit_null")]
    pub diet_id: Option<Option<DietId>>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl MemberPatch {
    /// Fields this patch writes, in declaration order.
    pub fn touched_fields(&self) -> Vec<MemberField> {
        let mut fields = Vec::new();
        let mut mark = |touched: bool, field: MemberField| {
            if touched {
                fields.push(field);
            }
        };
        mark(self.phone_number.is_some(), MemberField::PhoneNumber);
        mark(self.name.is_some(), MemberField::Name);
        mark(self.surname.is_some(), MemberField::Surname);
        mark(self.password.is_some(), MemberField::Password);
        mark(self.height.is_some(), MemberField::Height);
        mark(self.weight.is_some(), MemberField::Weight);
        mark(self.birth_date.is_some(), MemberField::BirthDate);
        mark(self.blood_type.is_some(), MemberField::BloodType);
        mark(self.membership_start.is_some(), MemberField::MembershipStart);
        mark(self.membership_end.is_some(), MemberField::MembershipEnd);
        mark(self.program_id.is_some(), MemberField::Program);
        mark(self.diet_id.is_some(), MemberField::Diet);
        mark(self.is_admin.is_some(), MemberField::IsAdmin);
        fields
    }

    pub fn is_empty(&self) -> bool {
        self.touched_fields().is_empty()
    }

    /// Applies every non-password field onto `member`.
    ///
    /// The password needs hashing and is handled by the member service.
    pub fn apply_to(&self, member: &mut Member) {
        if let Some(value) = &self.phone_number {
            member.phone_number = normalize_phone_number(value);
        }
        if let Some(value) = &self.name {
            member.name = value.trim().to_string();
        }
        if let Some(value) = &self.surname {
            member.surname = value.trim().to_string();
        }
        if let Some(value) = self.height {
            member.height = value;
        }
        if let Some(value) = self.weight {
            member.weight = value;
        }
        if let Some(value) = self.birth_date {
            member.birth_date = value;
        }
        if let Some(value) = self.blood_type {
            member.blood_type = value;
        }
        if let Some(value) = self.membership_start {
            member.membership_start = value;
        }
        if let Some(value) = self.membership_end {
            member.membership_end = value;
        }
        if let Some(value) = self.program_id {
            member.program_id = value;
        }
        if let Some(value) = self.diet_id {
            member.diet_id = value;
        }
        if let Some(value) = self.is_admin {
            member.is_admin = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_phone_number, BloodType, Member, MemberField, MemberPatch};
    use crate::model::validation::FieldError;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn member() -> Member {
        Member {
            id: Uuid::new_v4(),
            phone_number: "+905551112233".to_string(),
            name: "Deniz".to_string(),
            surname: "Kaya".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            height: None,
            weight: None,
            birth_date: Some(day(1990, 6, 15)),
            blood_type: None,
            membership_start: day(2024, 1, 1),
            membership_end: day(2024, 12, 31),
            program_id: None,
            diet_id: None,
            is_admin: false,
        }
    }

    #[test]
    fn age_counts_whole_years_around_birthday() {
        let member = member();
        assert_eq!(member.age_on(day(2024, 6, 14)), Some(33));
        assert_eq!(member.age_on(day(2024, 6, 15)), Some(34));
    }

    #[test]
    fn age_is_none_without_birth_date() {
        let mut member = member();
        member.birth_date = None;
        assert_eq!(member.age_on(day(2024, 1, 1)), None);
    }

    #[test]
    fn active_through_end_date_inclusive() {
        let member = member();
        assert!(member.is_active_on(day(2024, 12, 31)));
        assert!(!member.is_active_on(day(2025, 1, 1)));
        assert_eq!(member.remaining_days_on(day(2024, 12, 1)), 30);
        assert_eq!(member.remaining_days_on(day(2025, 1, 2)), -2);
    }

    #[test]
    fn rejects_reversed_membership_window() {
        let mut member = member();
        member.membership_end = day(2023, 12, 31);
        let errors = member.validate().unwrap_err();
        assert_eq!(
            errors.errors(),
            &[FieldError::InvalidMembershipWindow {
                start: day(2024, 1, 1),
                end: day(2023, 12, 31),
            }]
        );
    }

    #[test]
    fn phone_number_pattern() {
        let mut member = member();
        for bad in ["12345", "+90abc1234567", "+12345678901234567"] {
            member.phone_number = bad.to_string();
            assert!(member.validate().unwrap_err().has_field("phone_number"), "{bad}");
        }
        member.phone_number = normalize_phone_number("+90 (555) 111-22-33");
        assert_eq!(member.phone_number, "+905551112233");
        assert!(member.validate().is_ok());
    }

    #[test]
    fn measurements_must_fit_column() {
        let mut member = member();
        member.height = Some(Decimal::new(18_050, 2));
        member.weight = Some(Decimal::new(72_125, 3));
        let errors = member.validate().unwrap_err();
        assert!(!errors.has_field("height"));
        assert!(errors.has_field("weight"));

        member.weight = Some(Decimal::new(100_000, 2));
        assert!(member.validate().unwrap_err().has_field("weight"));
    }

    #[test]
    fn blood_type_accepts_letter_o() {
        assert_eq!(BloodType::parse("o+"), Some(BloodType::ZeroPositive));
        let parsed: BloodType = serde_json::from_str("\"O-\"").unwrap();
        assert_eq!(parsed, BloodType::ZeroNegative);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"0-\"");
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let patch: MemberPatch =
            serde_json::from_value(serde_json::json!({ "height": null, "weight": "80.5" }))
                .unwrap();
        assert_eq!(
            patch.touched_fields(),
            vec![MemberField::Height, MemberField::Weight]
        );

        let mut member = member();
        member.height = Some(Decimal::new(180, 0));
        patch.apply_to(&mut member);
        assert_eq!(member.height, None);
        assert_eq!(member.weight, Some(Decimal::new(805, 1)));
        assert_eq!(member.birth_date, Some(day(1990, 6, 15)));
    }

    #[test]
    fn patch_rejects_unknown_fields() {
        let result = serde_json::from_value::<MemberPatch>(serde_json::json!({ "age": 40 }));
        assert!(result.is_err());
    }
}
