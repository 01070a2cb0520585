use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    Json,
};

use crate::api::handlers::ErrorResponse;

/// Bearer token pulled from the Authorization header.
///
/// This only requires that a credential is present; scope checks happen in the
/// handlers through the [`Authorizer`] collaborator.
///
/// [`Authorizer`]: crate::auth::Authorizer
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match token {
            Some(token) if !token.is_empty() => Ok(BearerToken(token.to_string())),
            _ => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("Unauthorized")),
            )),
        }
    }
}
