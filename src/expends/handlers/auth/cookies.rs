//! `HttpOnly` cookie helpers for the token pair.

use axum::http::{
    header::{InvalidHeaderValue, SET_COOKIE},
    HeaderMap, HeaderValue,
};

use super::{state::AuthConfig, tokens::TokenPair};

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

fn token_cookie(
    name: &str,
    value: &str,
    max_age_seconds: i64,
    secure: bool,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_seconds}");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Append `Set-Cookie` headers carrying a freshly minted pair.
pub fn set_pair(headers: &mut HeaderMap, pair: &TokenPair, config: &AuthConfig) {
    let secure = config.secure_cookies();
    if let Ok(cookie) = token_cookie(
        ACCESS_COOKIE,
        &pair.access_token,
        config.access_ttl_seconds(),
        secure,
    ) {
        headers.append(SET_COOKIE, cookie);
    }
    if let Ok(cookie) = token_cookie(
        REFRESH_COOKIE,
        &pair.refresh_token,
        config.refresh_ttl_seconds(),
        secure,
    ) {
        headers.append(SET_COOKIE, cookie);
    }
}

/// Append `Set-Cookie` headers expiring both token cookies.
pub fn clear_pair(headers: &mut HeaderMap, config: &AuthConfig) {
    let secure = config.secure_cookies();
    for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
        if let Ok(cookie) = clear_cookie(name, secure) {
            headers.append(SET_COOKIE, cookie);
        }
    }
}
