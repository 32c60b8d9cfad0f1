//! Member repository contract and SQLite implementation.
//!
//! # Invariants
//! - `phone_number` is unique; a clash surfaces as a field-level
//!   `DuplicatePhoneNumber` validation error, not a raw constraint failure.
//! - Program/diet links must reference existing rows on write.
//! - Deleting a program or diet nulls the link (FK `ON DELETE SET NULL`).

use crate::model::member::{BloodType, Member, MemberId};
use crate::model::validation::FieldError;
use crate::repo::{
    bool_to_int, ensure_ids_exist, parse_uuid, ListQuery, RepoError, RepoResult, SqliteRepository,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use rust_decimal::Decimal;
use std::str::FromStr;

const MEMBER_SELECT_SQL: &str = "SELECT
    uuid,
    phone_number,
    name,
    surname,
    password_hash,
    height,
    weight,
    birth_date,
    blood_type,
    membership_start,
    membership_end,
    program_uuid,
    diet_uuid,
    is_admin
FROM members";

/// Query options for listing members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemberListQuery {
    /// Keeps only members whose membership is active on this day.
    pub active_on: Option<NaiveDate>,
    pub page: ListQuery,
}

pub trait MemberRepository {
    fn create_member(&self, member: &Member) -> RepoResult<MemberId>;
    fn update_member(&self, member: &Member) -> RepoResult<()>;
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
    /// Looks up by normalized phone number.
    fn find_member_by_phone(&self, phone_number: &str) -> RepoResult<Option<Member>>;
    fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<Member>>;
    fn delete_member(&self, id: MemberId) -> RepoResult<()>;
}

impl MemberRepository for SqliteRepository<'_> {
    fn create_member(&self, member: &Member) -> RepoResult<MemberId> {
        member.validate()?;
        ensure_member_references(self.conn(), member)?;

        self.conn().execute(
            "INSERT INTO members (
                uuid,
                phone_number,
                name,
                surname,
                password_hash,
                height,
                weight,
                birth_date,
                blood_type,
                membership_start,
                membership_end,
                program_uuid,
                diet_uuid,
                is_admin
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params![
                member.id.to_string(),
                member.phone_number.as_str(),
                member.name.as_str(),
                member.surname.as_str(),
                member.password_hash.as_str(),
                member.height.map(|value| value.to_string()),
                member.weight.map(|value| value.to_string()),
                member.birth_date,
                member.blood_type.map(BloodType::as_str),
                member.membership_start,
                member.membership_end,
                member.program_id.map(|id| id.to_string()),
                member.diet_id.map(|id| id.to_string()),
                bool_to_int(member.is_admin),
            ],
        )?;

        Ok(member.id)
    }

    fn update_member(&self, member: &Member) -> RepoResult<()> {
        member.validate()?;
        ensure_member_references(self.conn(), member)?;

        let changed = self.conn().execute(
            "UPDATE members
             SET
                phone_number = ?1,
                name = ?2,
                surname = ?3,
                password_hash = ?4,
                height = ?5,
                weight = ?6,
                birth_date = ?7,
                blood_type = ?8,
                membership_start = ?9,
                membership_end = ?10,
                program_uuid = ?11,
                diet_uuid = ?12,
                is_admin = ?13,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?14;",
            params![
                member.phone_number.as_str(),
                member.name.as_str(),
                member.surname.as_str(),
                member.password_hash.as_str(),
                member.height.map(|value| value.to_string()),
                member.weight.map(|value| value.to_string()),
                member.birth_date,
                member.blood_type.map(BloodType::as_str),
                member.membership_start,
                member.membership_end,
                member.program_id.map(|id| id.to_string()),
                member.diet_id.map(|id| id.to_string()),
                bool_to_int(member.is_admin),
                member.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "member",
                id: member.id,
            });
        }

        Ok(())
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    fn find_member_by_phone(&self, phone_number: &str) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn()
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE phone_number = ?1;"))?;
        let mut rows = stmt.query([phone_number])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    fn list_members(&self, query: &MemberListQuery) -> RepoResult<Vec<Member>> {
        let mut sql = format!("{MEMBER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(day) = query.active_on {
            sql.push_str(" AND membership_end >= ?");
            bind_values.push(Value::Text(day.format("%F").to_string()));
        }

        sql.push_str(" ORDER BY surname COLLATE NOCASE ASC, name COLLATE NOCASE ASC, uuid ASC");
        query.page.append_to(&mut sql, &mut bind_values);

        let mut stmt = self.conn().prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn delete_member(&self, id: MemberId) -> RepoResult<()> {
        let changed = self
            .conn()
            .execute("DELETE FROM members WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "member",
                id,
            });
        }
        Ok(())
    }
}

fn ensure_member_references(conn: &Connection, member: &Member) -> RepoResult<()> {
    let taken: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM members
            WHERE phone_number = ?1
              AND uuid != ?2
        );",
        params![member.phone_number.as_str(), member.id.to_string()],
        |row| row.get(0),
    )?;
    if taken == 1 {
        return Err(FieldError::DuplicatePhoneNumber.into());
    }

    if let Some(program_id) = member.program_id {
        ensure_ids_exist(conn, "programs", "program", &[program_id])?;
    }
    if let Some(diet_id) = member.diet_id {
        ensure_ids_exist(conn, "diets", "diet", &[diet_id])?;
    }
    Ok(())
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "members.uuid")?;

    let blood_type = match row.get::<_, Option<String>>("blood_type")? {
        Some(value) => Some(BloodType::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid blood type `{value}` in members.blood_type"
            ))
        })?),
        None => None,
    };

    let program_id = match row.get::<_, Option<String>>("program_uuid")? {
        Some(value) => Some(parse_uuid(&value, "members.program_uuid")?),
        None => None,
    };
    let diet_id = match row.get::<_, Option<String>>("diet_uuid")? {
        Some(value) => Some(parse_uuid(&value, "members.diet_uuid")?),
        None => None,
    };

    let is_admin = match row.get::<_, i64>("is_admin")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_admin value `{other}` in members.is_admin"
            )));
        }
    };

    let member = Member {
        id,
        phone_number: row.get("phone_number")?,
        name: row.get("name")?,
        surname: row.get("surname")?,
        password_hash: row.get("password_hash")?,
        height: parse_decimal(row.get("height")?, "members.height")?,
        weight: parse_decimal(row.get("weight")?, "members.weight")?,
        birth_date: row.get("birth_date")?,
        blood_type,
        membership_start: row.get("membership_start")?,
        membership_end: row.get("membership_end")?,
        program_id,
        diet_id,
        is_admin,
    };
    member.validate()?;
    Ok(member)
}

fn parse_decimal(value: Option<String>, column: &str) -> RepoResult<Option<Decimal>> {
    value
        .map(|text| {
            Decimal::from_str(&text).map_err(|_| {
                RepoError::InvalidData(format!("invalid decimal value `{text}` in {column}"))
            })
        })
        .transpose()
}
