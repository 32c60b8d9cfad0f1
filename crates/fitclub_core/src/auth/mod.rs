//! Credential authentication.
//!
//! # Responsibility
//! - Hash and verify member passwords.
//! - Resolve phone + password credentials into a `Principal`.
//!
//! # Invariants
//! - Unknown phone numbers and wrong passwords produce the same error and
//!   both pay for one Argon2 verification.
//! - Credentials are never logged; only the outcome is.
//!
//! Token/session transport is owned by the embedding web layer.

use crate::access::{Principal, Role};
use crate::model::member::normalize_phone_number;
use crate::repo::{MemberRepository, RepoError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod password;

pub use password::{hash_password, verify_password, PasswordHashError};

#[derive(Debug)]
pub enum AuthError {
    InvalidCredentials,
    Repo(RepoError),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "invalid phone number or password"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::InvalidCredentials => None,
        }
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Authenticates a member by phone number and password.
pub fn authenticate<R: MemberRepository>(
    repo: &R,
    phone_number: &str,
    password: &str,
) -> Result<Principal, AuthError> {
    let normalized = normalize_phone_number(phone_number);
    let Some(member) = repo.find_member_by_phone(&normalized)? else {
        password::verify_against_dummy(password);
        warn!("event=auth_login module=auth status=denied reason=invalid_credentials");
        return Err(AuthError::InvalidCredentials);
    };

    if !verify_password(password, &member.password_hash) {
        warn!("event=auth_login module=auth status=denied reason=invalid_credentials");
        return Err(AuthError::InvalidCredentials);
    }

    let role = if member.is_admin {
        Role::Admin
    } else {
        Role::Member
    };
    info!(
        "event=auth_login module=auth status=ok role={}",
        role.as_str()
    );
    Ok(Principal {
        member_id: member.id,
        role,
    })
}
