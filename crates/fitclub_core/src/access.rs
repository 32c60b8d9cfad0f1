//! Role-based access policy for catalog and member resources.
//!
//! # Responsibility
//! - Decide whether a caller may run an action on a resource.
//! - Scope member-role callers to their own member record.
//! - Gate member self-updates to the self-writable field subset.
//!
//! # Invariants
//! - No principal means no access (`Unauthenticated`).
//! - Admins pass every check.
//! - Members read catalog resources and never write them.
//! - Members see exactly one member record: their own. Another record is
//!   reported as not visible, never as forbidden.

use crate::model::member::{MemberField, MemberId, MemberPatch};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Member fields a member-role caller may change on their own record.
pub const SELF_WRITABLE_MEMBER_FIELDS: &[MemberField] = &[MemberField::Height, MemberField::Weight];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "admin" => Some(Self::Admin),
            "member" => Some(Self::Member),
            _ => None,
        }
    }
}

/// Authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub member_id: MemberId,
    pub role: Role,
}

impl Principal {
    pub fn admin(member_id: MemberId) -> Self {
        Self {
            member_id,
            role: Role::Admin,
        }
    }

    pub fn member(member_id: MemberId) -> Self {
        Self {
            member_id,
            role: Role::Member,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Retrieve => "retrieve",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    pub fn is_read(self) -> bool {
        matches!(self, Self::List | Self::Retrieve)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Movement,
    Meal,
    Program,
    Diet,
    Member,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movement => "movement",
            Self::Meal => "meal",
            Self::Program => "program",
            Self::Diet => "diet",
            Self::Member => "member",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    Unauthenticated,
    ActionDenied {
        role: Role,
        resource: Resource,
        action: Action,
    },
    FieldsDenied {
        fields: Vec<MemberField>,
    },
    NotVisible {
        resource: Resource,
        id: Uuid,
    },
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "authentication credentials were not provided"),
            Self::ActionDenied {
                role,
                resource,
                action,
            } => write!(
                f,
                "role `{}` may not {} {} records",
                role.as_str(),
                action.as_str(),
                resource.as_str()
            ),
            Self::FieldsDenied { fields } => {
                let names = fields
                    .iter()
                    .map(|field| field.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "fields are read-only for this caller: {names}")
            }
            Self::NotVisible { resource, id } => write!(f, "{} not found: {id}", resource.as_str()),
        }
    }
}

impl Error for AccessError {}

/// Checks that a caller is present and its role allows `action` on `resource`.
///
/// Member-record scoping is a separate step ([`ensure_member_visible`]).
pub fn authorize(
    caller: Option<&Principal>,
    resource: Resource,
    action: Action,
) -> Result<&Principal, AccessError> {
    let Some(principal) = caller else {
        warn!(
            "event=access_check module=access status=denied reason=unauthenticated resource={} action={}",
            resource.as_str(),
            action.as_str()
        );
        return Err(AccessError::Unauthenticated);
    };

    if principal.is_admin() || role_allows(principal.role, resource, action) {
        return Ok(principal);
    }

    warn!(
        "event=access_check module=access status=denied reason=role role={} resource={} action={}",
        principal.role.as_str(),
        resource.as_str(),
        action.as_str()
    );
    Err(AccessError::ActionDenied {
        role: principal.role,
        resource,
        action,
    })
}

/// Whether `principal` may see member record `target`.
pub fn can_view_member(principal: &Principal, target: MemberId) -> bool {
    principal.is_admin() || principal.member_id == target
}

/// Rejects access to another member's record for non-admin callers.
pub fn ensure_member_visible(principal: &Principal, target: MemberId) -> Result<(), AccessError> {
    if can_view_member(principal, target) {
        return Ok(());
    }
    warn!(
        "event=access_check module=access status=denied reason=not_owner role={}",
        principal.role.as_str()
    );
    Err(AccessError::NotVisible {
        resource: Resource::Member,
        id: target,
    })
}

/// Checks a member update against the caller's writable field set.
///
/// Visibility is checked first, so a member patching someone else gets
/// `NotVisible` whatever the patch contains.
pub fn authorize_member_patch(
    principal: &Principal,
    target: MemberId,
    patch: &MemberPatch,
) -> Result<(), AccessError> {
    ensure_member_visible(principal, target)?;
    if principal.is_admin() {
        return Ok(());
    }

    let denied: Vec<MemberField> = patch
        .touched_fields()
        .into_iter()
        .filter(|field| !SELF_WRITABLE_MEMBER_FIELDS.contains(field))
        .collect();
    if denied.is_empty() {
        return Ok(());
    }

    warn!(
        "event=access_check module=access status=denied reason=read_only_fields role={} fields={}",
        principal.role.as_str(),
        denied.len()
    );
    Err(AccessError::FieldsDenied { fields: denied })
}

fn role_allows(role: Role, resource: Resource, action: Action) -> bool {
    match role {
        Role::Admin => true,
        Role::Member => match resource {
            Resource::Movement | Resource::Meal | Resource::Program | Resource::Diet => {
                action.is_read()
            }
            Resource::Member => matches!(action, Action::List | Action::Retrieve | Action::Update),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{
        authorize, authorize_member_patch, AccessError, Action, Principal, Resource, Role,
    };
    use crate::model::member::{MemberField, MemberPatch};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    const CATALOG: [Resource; 4] = [
        Resource::Movement,
        Resource::Meal,
        Resource::Program,
        Resource::Diet,
    ];
    const ACTIONS: [Action; 5] = [
        Action::List,
        Action::Retrieve,
        Action::Create,
        Action::Update,
        Action::Delete,
    ];

    #[test]
    fn missing_principal_is_unauthenticated() {
        for action in ACTIONS {
            assert_eq!(
                authorize(None, Resource::Meal, action).unwrap_err(),
                AccessError::Unauthenticated
            );
        }
    }

    #[test]
    fn admin_passes_every_check() {
        let admin = Principal::admin(Uuid::new_v4());
        for resource in CATALOG.into_iter().chain([Resource::Member]) {
            for action in ACTIONS {
                assert!(authorize(Some(&admin), resource, action).is_ok());
            }
        }
    }

    #[test]
    fn member_reads_catalog_but_never_writes_it() {
        let member = Principal::member(Uuid::new_v4());
        for resource in CATALOG {
            for action in ACTIONS {
                let result = authorize(Some(&member), resource, action);
                assert_eq!(result.is_ok(), action.is_read(), "{resource:?} {action:?}");
            }
        }
    }

    #[test]
    fn member_cannot_create_or_delete_members() {
        let member = Principal::member(Uuid::new_v4());
        for action in [Action::Create, Action::Delete] {
            assert!(matches!(
                authorize(Some(&member), Resource::Member, action),
                Err(AccessError::ActionDenied {
                    role: Role::Member,
                    ..
                })
            ));
        }
    }

    #[test]
    fn member_may_patch_own_height_and_weight_only() {
        let id = Uuid::new_v4();
        let member = Principal::member(id);

        let body_patch = MemberPatch {
            height: Some(Some(Decimal::new(180, 0))),
            weight: Some(None),
            ..MemberPatch::default()
        };
        assert!(authorize_member_patch(&member, id, &body_patch).is_ok());

        let membership_patch = MemberPatch {
            weight: Some(Some(Decimal::new(70, 0))),
            membership_end: Some(chrono::NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()),
            is_admin: Some(true),
            ..MemberPatch::default()
        };
        assert_eq!(
            authorize_member_patch(&member, id, &membership_patch).unwrap_err(),
            AccessError::FieldsDenied {
                fields: vec![MemberField::MembershipEnd, MemberField::IsAdmin],
            }
        );
    }

    #[test]
    fn member_cannot_patch_another_member() {
        let member = Principal::member(Uuid::new_v4());
        let other = Uuid::new_v4();
        let patch = MemberPatch {
            weight: Some(Some(Decimal::new(70, 0))),
            ..MemberPatch::default()
        };
        assert_eq!(
            authorize_member_patch(&member, other, &patch).unwrap_err(),
            AccessError::NotVisible {
                resource: Resource::Member,
                id: other,
            }
        );
    }

    #[test]
    fn admin_may_patch_anything_on_anyone() {
        let admin = Principal::admin(Uuid::new_v4());
        let patch = MemberPatch {
            is_admin: Some(true),
            membership_end: Some(chrono::NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()),
            ..MemberPatch::default()
        };
        assert!(authorize_member_patch(&admin, Uuid::new_v4(), &patch).is_ok());
    }

    #[test]
    fn role_strings_round_trip() {
        for role in [Role::Admin, Role::Member] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("staff"), None);
    }
}
