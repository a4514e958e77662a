//! Bearer token authentication.

use super::AppState;
use crate::{
    core::user,
    errors::{Error, Result},
};
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use tracing::debug;

fn bearer_token(request: &Request) -> Option<String> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Resolves the bearer token to a user and stores it as a request extension.
///
/// # Errors
/// Returns `Error::Unauthenticated` when the header is missing or the token
/// matches no user.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let Some(token) = bearer_token(&request) else {
        debug!("Rejected {} without bearer token", request.uri().path());
        return Err(Error::Unauthenticated);
    };
    let user = user::get_user_by_token(&state.db, &token)
        .await?
        .ok_or(Error::Unauthenticated)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
