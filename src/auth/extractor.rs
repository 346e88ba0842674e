use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::principal::Principal;
use crate::error::AppError;

/// Handlers take a `Principal` argument; the access middleware has already
/// resolved it and stored it in the request extensions.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}
