//! Registration endpoint.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use tracing::{debug, instrument};

use super::{password, types::{RegisterRequest, UserResponse}};
use crate::{
    expends::{
        envelope::reply,
        error::Error,
        handlers::{normalize_email, valid_email},
    },
    store::{NewUser, SharedStore},
};

#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Missing or malformed field"),
        (status = 409, description = "Username or email already taken"),
    ),
    tag = "auth"
)]
#[instrument(skip(store, payload))]
pub async fn register(
    Extension(store): Extension<SharedStore>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<impl IntoResponse, Error> {
    let Some(Json(request)) = payload else {
        return Err(Error::Validation("Missing payload.".to_string()));
    };

    let username = request.username.trim().to_lowercase();
    let email = normalize_email(&request.email);
    if username.is_empty() || email.is_empty() || request.password.trim().is_empty() {
        return Err(Error::Validation("All fields are required.".to_string()));
    }
    if !valid_email(&email) {
        return Err(Error::Validation("Invalid email address.".to_string()));
    }

    let digest = password::hash(&request.password)?;
    let created = store
        .insert_user(NewUser {
            username,
            email,
            password_digest: digest,
        })
        .await?;

    debug!(user_id = %created.id, "user created");

    // Read back the freshly created record; a miss here means the store is
    // not keeping its contract.
    let user = store
        .user_by_id(created.id)
        .await
        .map_err(Error::internal)?
        .ok_or_else(|| {
            Error::internal(anyhow::anyhow!(
                "created user {} not found on read-back",
                created.id
            ))
        })?;

    Ok(reply(
        StatusCode::CREATED,
        UserResponse::from(&user),
        "User registered successfully.",
    ))
}
