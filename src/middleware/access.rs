use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::AppError;
use crate::policy::{guard, Decision, Requirement};
use crate::state::SharedState;

/// Resolve the caller and apply the access policy before the handler runs.
///
/// On success the [`Principal`](crate::auth::Principal) is stored in the
/// request extensions. Denied requests never reach the handler, so their body
/// is never read.
pub async fn enforce_access(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let requirement = state.policy.requirement_for(req.uri().path());

    // Public paths skip credential resolution entirely.
    if requirement == Requirement::Public {
        return Ok(next.run(req).await);
    }

    let principal = state
        .identity
        .resolve(req.headers(), &state.users, &state.login_limiter)?;

    match guard(principal.as_ref(), requirement) {
        Decision::Allow => {}
        Decision::Unauthenticated => {
            return Err(AppError::Unauthorized(
                "Authentication required".to_string(),
            ));
        }
        Decision::Forbidden(role) => {
            tracing::warn!(
                principal = principal.as_ref().map(|p| p.id.as_str()).unwrap_or("-"),
                path = req.uri().path(),
                required = %role,
                "Access denied"
            );
            return Err(AppError::Forbidden(format!("{role} role required")));
        }
    }

    if let Some(principal) = principal {
        req.extensions_mut().insert(principal);
    }

    Ok(next.run(req).await)
}
