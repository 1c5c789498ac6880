//! Caller identity extractors.
//!
//! Authentication happens in front of this service. The fronting layer
//! forwards the authenticated user id in `x-user-id` and, for staff,
//! `x-user-role: admin`.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";

pub const USER_ROLE_HEADER: &str = "x-user-role";

pub const ADMIN_ROLE: &str = "admin";

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("missing user identity".to_string()))?;

        match raw.parse::<i64>() {
            Ok(user_id) if user_id > 0 => Ok(CurrentUser(user_id)),
            _ => {
                debug!(header = USER_ID_HEADER, value = raw, "rejecting malformed user id");
                Err(ApiError::Unauthorized("invalid user identity".to_string()))
            }
        }
    }
}

/// An authenticated caller holding the admin role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser(user_id) = CurrentUser::from_request_parts(parts, state).await?;

        let is_admin = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|role| {
                role.split(',')
                    .any(|role| role.trim().eq_ignore_ascii_case(ADMIN_ROLE))
            });

        if !is_admin {
            debug!(user_id, "admin access denied");
            return Err(ApiError::Forbidden("admin role required".to_string()));
        }
        Ok(AdminUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract<T>(headers: &[(&str, &str)]) -> Result<T, ApiError>
    where
        T: FromRequestParts<(), Rejection = ApiError>,
    {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        T::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_current_user() {
        let user: CurrentUser = extract(&[(USER_ID_HEADER, "42")]).await.unwrap();
        assert_eq!(user, CurrentUser(42));

        assert!(matches!(
            extract::<CurrentUser>(&[]).await,
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            extract::<CurrentUser>(&[(USER_ID_HEADER, "abc")]).await,
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_admin_user() {
        let admin: AdminUser = extract(&[(USER_ID_HEADER, "1"), (USER_ROLE_HEADER, "staff, Admin")])
            .await
            .unwrap();
        assert_eq!(admin, AdminUser(1));

        assert!(matches!(
            extract::<AdminUser>(&[(USER_ID_HEADER, "1"), (USER_ROLE_HEADER, "viewer")]).await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            extract::<AdminUser>(&[(USER_ROLE_HEADER, "admin")]).await,
            Err(ApiError::Unauthorized(_))
        ));
    }
}
