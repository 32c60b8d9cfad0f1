//! Transport-agnostic request API.
//!
//! # Responsibility
//! - Gate every entity operation through the access policy.
//! - Shape domain records into wire views.
//! - Map every lower-layer failure onto a status-coded `ApiError`.
//!
//! # Invariants
//! - Handlers never return password hashes.
//! - Storage failure details are logged, never returned to callers.
//! - A non-admin asking for another member's record sees 404.
//!
//! Routing and token transport belong to the embedding web layer.

use crate::access::AccessError;
use crate::auth::AuthError;
use crate::model::validation::ValidationErrors;
use crate::repo::{RepoError, SqliteRepository};
use crate::service::ServiceError;
use chrono::{Local, NaiveDate};
use log::error;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod catalog;
pub mod members;
pub mod views;

pub use views::{DietView, MemberView, ProgramView};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// Field-level validation failure.
    BadRequest(ValidationErrors),
    /// Body could not be decoded into the expected payload.
    MalformedBody(String),
    Unauthorized,
    Forbidden(String),
    NotFound { entity: &'static str },
    /// Storage or backend failure; details were logged.
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::MalformedBody(_) => 400,
            Self::Unauthorized => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound { .. } => 404,
            Self::Internal => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "validation_failed",
            Self::MalformedBody(_) => "malformed_body",
            Self::Unauthorized => "not_authenticated",
            Self::Forbidden(_) => "permission_denied",
            Self::NotFound { .. } => "not_found",
            Self::Internal => "internal_error",
        }
    }

    /// Serializable response body.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            status: self.status_code(),
            code: self.code(),
            message: self.to_string(),
            errors: match self {
                Self::BadRequest(errors) => errors.by_field(),
                _ => BTreeMap::new(),
            },
        }
    }

    fn internal(source: &dyn Display) -> Self {
        error!(
            "event=api_error module=api status=error error={}",
            source
        );
        Self::Internal
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(_) => write!(f, "request failed validation"),
            Self::MalformedBody(message) => write!(f, "malformed request body: {message}"),
            Self::Unauthorized => write!(f, "authentication credentials were not provided or are invalid"),
            Self::Forbidden(message) => write!(f, "{message}"),
            Self::NotFound { entity } => write!(f, "{entity} not found"),
            Self::Internal => write!(f, "internal server error"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::BadRequest(err) => Some(err),
            _ => None,
        }
    }
}

/// Wire shape of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,
}

impl From<ValidationErrors> for ApiError {
    fn from(value: ValidationErrors) -> Self {
        Self::BadRequest(value)
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(errors) => Self::BadRequest(errors),
            ServiceError::NotFound { entity, .. } => Self::NotFound { entity },
            other => Self::internal(&other),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        ServiceError::from(value).into()
    }
}

impl From<AccessError> for ApiError {
    fn from(value: AccessError) -> Self {
        match value {
            AccessError::Unauthenticated => Self::Unauthorized,
            AccessError::NotVisible { resource, .. } => Self::NotFound {
                entity: resource.as_str(),
            },
            denied @ (AccessError::ActionDenied { .. } | AccessError::FieldsDenied { .. }) => {
                Self::Forbidden(denied.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidCredentials => Self::Unauthorized,
            AuthError::Repo(err) => err.into(),
        }
    }
}

/// Per-request handler context.
///
/// `today` anchors every derived date attribute for the request.
pub struct ApiContext<'conn> {
    conn: &'conn Connection,
    today: NaiveDate,
}

impl<'conn> ApiContext<'conn> {
    /// Context pinned to the local calendar day.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_today(conn, Local::now().date_naive())
    }

    pub fn with_today(conn: &'conn Connection, today: NaiveDate) -> Self {
        Self { conn, today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    fn repo(&self) -> ApiResult<SqliteRepository<'conn>> {
        Ok(SqliteRepository::try_new(self.conn)?)
    }
}

/// Decodes a JSON request body.
///
/// Unknown member patch fields and type mismatches surface as 400.
pub fn decode_body<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    serde_json::from_str(body).map_err(|err| ApiError::MalformedBody(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{decode_body, ApiError};
    use crate::access::{AccessError, Action, Resource, Role};
    use crate::auth::AuthError;
    use crate::model::member::{MemberDraft, MemberField, MemberPatch};
    use crate::model::validation::{FieldError, ValidationErrors};
    use crate::service::ServiceError;
    use uuid::Uuid;

    #[test]
    fn access_errors_map_to_expected_statuses() {
        let cases = [
            (AccessError::Unauthenticated, 401),
            (
                AccessError::ActionDenied {
                    role: Role::Member,
                    resource: Resource::Meal,
                    action: Action::Create,
                },
                403,
            ),
            (
                AccessError::FieldsDenied {
                    fields: vec![MemberField::MembershipEnd],
                },
                403,
            ),
            (
                AccessError::NotVisible {
                    resource: Resource::Member,
                    id: Uuid::new_v4(),
                },
                404,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(ApiError::from(error).status_code(), status);
        }
    }

    #[test]
    fn validation_body_groups_messages_by_field() {
        let mut errors = ValidationErrors::new();
        errors.push(FieldError::InvalidPhoneNumber);
        errors.push(FieldError::Required { field: "name" });

        let body = ApiError::from(ServiceError::Validation(errors)).body();
        assert_eq!(body.status, 400);
        assert!(body.errors.contains_key("phone_number"));
        assert!(body.errors.contains_key("name"));

        let json = serde_json::to_value(&body).unwrap();
        assert!(json["errors"]["phone_number"].is_array());
    }

    #[test]
    fn internal_errors_hide_details() {
        let error = ApiError::from(ServiceError::PasswordHash("backend exploded".to_string()));
        assert_eq!(error.status_code(), 500);
        assert!(!error.body().message.contains("exploded"));
        assert!(error.body().errors.is_empty());
    }

    #[test]
    fn invalid_credentials_are_unauthorized() {
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status_code(),
            401
        );
    }

    #[test]
    fn unknown_patch_fields_are_rejected() {
        let error = decode_body::<MemberPatch>(r#"{"height": "181.5", "nickname": "x"}"#)
            .unwrap_err();
        assert_eq!(error.status_code(), 400);
        assert_eq!(error.code(), "malformed_body");
    }

    #[test]
    fn unknown_registration_fields_are_rejected() {
        let error = decode_body::<MemberDraft>(
            r#"{"phone_number": "+905551112233", "first_name": "Deniz", "surname": "Kaya"}"#,
        )
        .unwrap_err();
        assert_eq!(error.status_code(), 400);
        assert_eq!(error.code(), "malformed_body");

        let aliased: MemberDraft =
            decode_body(r#"{"name": "Deniz", "program": null, "diet": null}"#).unwrap();
        assert_eq!(aliased.name, "Deniz");
    }
}
