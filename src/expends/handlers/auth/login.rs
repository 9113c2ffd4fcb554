//! Login endpoint: credential check, pair issuance, cookie delivery.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    cookies, issue_session, password,
    state::AuthState,
    types::{LoginData, LoginRequest, UserResponse},
};
use crate::{
    expends::{envelope::reply, error::Error},
    store::SharedStore,
};

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; pair returned and set as cookies", body = LoginData),
        (status = 400, description = "Missing identifier or password"),
        (status = 401, description = "Wrong password"),
        (status = 404, description = "No such user"),
    ),
    tag = "auth"
)]
#[instrument(skip(state, store, payload))]
pub async fn login(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(store): Extension<SharedStore>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, Error> {
    let request = payload.map(|Json(body)| body).unwrap_or_default();

    let identifier = request
        .username
        .as_deref()
        .or(request.email.as_deref())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::Validation("Please enter username or email.".to_string()))?;
    let plain = request
        .password
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::Validation("Please enter password.".to_string()))?;

    let user = store
        .user_by_identifier(identifier)
        .await
        .map_err(Error::internal)?
        .ok_or_else(|| {
            Error::NotFound("User with that username or email does not exist.".to_string())
        })?;

    // Same message as any other credential failure: the response must not
    // confirm which part was wrong.
    if !password::verify(plain, &user.password_digest) {
        return Err(Error::Auth("Invalid credentials.".to_string()));
    }

    let pair = issue_session(&state, &store, user.id).await?;

    debug!(user_id = %user.id, "session issued");

    let mut headers = HeaderMap::new();
    cookies::set_pair(&mut headers, &pair, state.config());

    let data = LoginData {
        user: UserResponse::from(&user),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
    };
    let (status, body) = reply(StatusCode::OK, data, "User logged in successfully.");
    Ok((status, headers, body))
}
