use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Role tag issued by the identity provider alongside the user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Coordinator,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Coordinator => "coordinator",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "coordinator" => Some(Role::Coordinator),
            _ => None,
        }
    }
}

/// Authenticated caller as asserted by the gateway in front of this service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: UserId::new(user_id),
            role,
        }
    }

    /// Caller-side role check; the registry itself only checks ownership.
    pub fn require(&self, role: Role) -> Result<(), ActorRejection> {
        if self.role == role {
            Ok(())
        } else {
            Err(ActorRejection::WrongRole { required: role })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRejection {
    MissingIdentity,
    UnknownRole,
    WrongRole { required: Role },
}

impl IntoResponse for ActorRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ActorRejection::MissingIdentity => (
                StatusCode::UNAUTHORIZED,
                format!("missing {USER_ID_HEADER} or {USER_ROLE_HEADER} header"),
            ),
            ActorRejection::UnknownRole => (
                StatusCode::UNAUTHORIZED,
                format!("{USER_ROLE_HEADER} must be student or coordinator"),
            ),
            ActorRejection::WrongRole { required } => (
                StatusCode::FORBIDDEN,
                format!("operation requires the {} role", required.label()),
            ),
        };

        let kind = if status == StatusCode::FORBIDDEN {
            "role"
        } else {
            "unauthenticated"
        };
        (status, axum::Json(json!({ "error": message, "kind": kind }))).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ActorRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let user_id = header(USER_ID_HEADER).ok_or(ActorRejection::MissingIdentity)?;
        let role = header(USER_ROLE_HEADER).ok_or(ActorRejection::MissingIdentity)?;
        let role = Role::parse(&role).ok_or(ActorRejection::UnknownRole)?;

        Ok(Actor::new(user_id, role))
    }
}
