use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use rollcall_core::AppError;
use rollcall_domain::Edipi;

use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the caller's EDIPI, set by the authenticating proxy in
/// front of the API after certificate validation.
pub const EDIPI_HEADER: &str = "x-rollcall-edipi";

/// Resolves the calling user from the proxy-provided EDIPI header and
/// injects the loaded user (with memberships) as a request extension.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let header = request
        .headers()
        .get(EDIPI_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let edipi = Edipi::new(header)
        .map_err(|_| AppError::Unauthorized("malformed identity header".to_owned()))?;

    let user = state
        .user_repository
        .find_user_with_roles(&edipi)
        .await?
        .ok_or_else(|| AppError::Unauthorized("unknown user".to_owned()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
