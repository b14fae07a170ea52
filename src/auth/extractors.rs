use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use crate::{
    auth::{jwt::JwtKeys, role::Role},
    error::ApiError,
};

/// The verified identity behind a request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl Identity {
    /// Role gate: pass when the identity holds at least `minimum`.
    pub fn require(&self, minimum: Role) -> Result<(), ApiError> {
        if self.role >= minimum {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

/// Extracts the bearer token from the Authorization header and verifies it.
/// Verification is purely cryptographic; no credential-store lookup happens
/// per request.
pub struct AuthUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header"))?;

        let claims = keys
            .verify(token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

        Ok(AuthUser(Identity {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            username: "tester".into(),
            role,
        }
    }

    #[test]
    fn gate_admits_the_minimum_and_above() {
        assert!(identity(Role::Admin).require(Role::Admin).is_ok());
        assert!(identity(Role::Superadmin).require(Role::Admin).is_ok());
        assert!(identity(Role::Superadmin).require(Role::Superadmin).is_ok());
        assert!(identity(Role::User).require(Role::User).is_ok());
    }

    #[test]
    fn gate_rejects_lower_roles() {
        assert!(matches!(
            identity(Role::User).require(Role::Admin),
            Err(ApiError::Forbidden)
        ));
        assert!(matches!(
            identity(Role::Admin).require(Role::Superadmin),
            Err(ApiError::Forbidden)
        ));
    }
}
