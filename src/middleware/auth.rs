use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError};

pub const ADMIN_ROLE: &str = "admin";
pub const USER_ROLE: &str = "user";

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }

    pub fn view_role(&self) -> ViewRole {
        if self.is_admin() {
            ViewRole::Admin
        } else {
            ViewRole::Customer
        }
    }
}

/// Which projection of a resource the caller is entitled to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRole {
    Admin,
    Customer,
}

pub fn ensure_role(user: &AuthUser, role: &str) -> Result<(), AppError> {
    if user.role != role {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    ensure_role(user, ADMIN_ROLE)
}

fn authenticate(parts: &Parts) -> Result<AuthUser, AppError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    let Some(token) = auth_str.strip_prefix("Bearer ") else {
        return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
    };
    let token = token.trim();

    let secret = std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

    Ok(AuthUser {
        user_id,
        role: decoded.claims.role,
    })
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticate(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: &str) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            role: role.into(),
        }
    }

    #[test]
    fn view_role_follows_user_role() {
        assert_eq!(user(ADMIN_ROLE).view_role(), ViewRole::Admin);
        assert_eq!(user(USER_ROLE).view_role(), ViewRole::Customer);
    }

    #[test]
    fn only_staff_pass_admin_checks() {
        assert!(ensure_admin(&user(ADMIN_ROLE)).is_ok());
        assert!(matches!(
            ensure_admin(&user(USER_ROLE)),
            Err(AppError::Forbidden)
        ));
    }
}
