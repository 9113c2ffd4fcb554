//! Refresh Coordinator: rotation with stale-reuse detection, plus logout.
//!
//! Rotation always overwrites the single stored session slot, so a presented
//! refresh token that no longer matches the slot is either superseded or
//! cleared — both are rejected the same way.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    cookies, guard, hash_refresh_token, issue_session,
    state::AuthState,
    types::{RefreshRequest, TokenData},
};
use crate::{
    expends::{envelope::reply, error::Error},
    store::SharedStore,
};

#[utoipa::path(
    post,
    path = "/refresh-token",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New pair issued", body = TokenData),
        (status = 401, description = "Missing, invalid, expired, or stale refresh token"),
    ),
    tag = "auth"
)]
#[instrument(skip(state, store, headers, payload))]
pub async fn refresh_token(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(store): Extension<SharedStore>,
    headers: HeaderMap,
    payload: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, Error> {
    let presented = guard::extract_refresh_cookie(&headers)
        .or_else(|| {
            payload
                .map(|Json(body)| body)
                .and_then(|body| body.refresh_token)
                .filter(|token| !token.is_empty())
        })
        .ok_or_else(|| Error::Auth("missing credential".to_string()))?;

    let user_id = state.tokens().verify_refresh(&presented)?;

    let user = store
        .user_by_id(user_id)
        .await
        .map_err(Error::internal)?
        .ok_or_else(|| Error::Auth("unknown subject".to_string()))?;

    // Reuse check: a valid signature is not enough. The presented token must
    // be the one currently in the slot; anything else is a replay of a
    // superseded or logged-out token.
    let presented_hash = hash_refresh_token(&presented);
    let current = user
        .refresh_session
        .as_ref()
        .map(|session| session.token_hash.clone());
    if current.as_deref() != Some(presented_hash.as_slice()) {
        return Err(Error::Auth("stale or already-used token".to_string()));
    }

    let pair = issue_session(&state, &store, user.id).await?;

    debug!(user_id = %user.id, "refresh token rotated");

    let mut response_headers = HeaderMap::new();
    cookies::set_pair(&mut response_headers, &pair, state.config());

    let data = TokenData {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    };
    let (status, body) = reply(StatusCode::OK, data, "Access token refreshed successfully.");
    Ok((status, response_headers, body))
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session cleared, cookies expired"),
        (status = 401, description = "Missing or invalid access token"),
    ),
    tag = "auth"
)]
#[instrument(skip(state, store, headers))]
pub async fn logout(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(store): Extension<SharedStore>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, Error> {
    let principal = guard::require_auth(&headers, &state, &store).await?;

    // Clearing the slot makes every previously issued refresh token fail the
    // reuse check until the next login.
    store
        .set_refresh_session(principal.user_id, None)
        .await
        .map_err(Error::internal)?;

    debug!(user_id = %principal.user_id, "session cleared");

    let mut response_headers = HeaderMap::new();
    cookies::clear_pair(&mut response_headers, state.config());

    let (status, body) = reply(
        StatusCode::OK,
        serde_json::json!({}),
        "User logged out successfully.",
    );
    Ok((status, response_headers, body))
}
