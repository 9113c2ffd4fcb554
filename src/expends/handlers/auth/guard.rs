//! Session Guard: resolve an access credential to a caller identity.
//!
//! The access token is read from the `accessToken` cookie or an
//! `Authorization: Bearer` header, cookie taking precedence. Every
//! verification failure surfaces as the same error kind; the message text is
//! the only thing that varies.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::{
    cookies::{ACCESS_COOKIE, REFRESH_COOKIE},
    state::AuthState,
};
use crate::{expends::error::Error, store::SharedStore};

/// Authenticated caller context attached by the guard.
///
/// This is the only way downstream handlers learn who is calling.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: uuid::Uuid,
    pub username: String,
}

/// Verify the presented access token and resolve it to a user.
pub async fn require_auth(
    headers: &HeaderMap,
    state: &AuthState,
    store: &SharedStore,
) -> Result<Principal, Error> {
    let token = extract_access_token(headers)
        .ok_or_else(|| Error::Auth("missing credential".to_string()))?;
    let user_id = state.tokens().verify_access(&token)?;

    let user = store
        .user_by_id(user_id)
        .await
        .map_err(Error::internal)?
        .ok_or_else(|| Error::Auth("unknown subject".to_string()))?;

    Ok(Principal {
        user_id: user.id,
        username: user.username,
    })
}

/// Access token from cookie or bearer header; cookie wins when both exist.
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, ACCESS_COOKIE).or_else(|| bearer_token(headers))
}

/// Refresh token from its cookie, if present.
pub fn extract_refresh_cookie(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, REFRESH_COOKIE)
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name && !val.is_empty() {
            return Some(val.to_string());
        }
    }
    None
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
