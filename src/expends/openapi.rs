//! OpenAPI document composition.
//!
//! Handlers carry `#[utoipa::path]` annotations; this module gathers them
//! into one document. The `openapi` bin target prints it as JSON.

use utoipa::OpenApi;

use super::handlers::{auth, health, statements};
use crate::store::StatementKind;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "expends",
        description = "Expense ledger backend with rotating token-pair authentication"
    ),
    paths(
        health::health,
        auth::register::register,
        auth::login::login,
        auth::refresh::refresh_token,
        auth::refresh::logout,
        statements::create_statement,
        statements::delete_statement,
        statements::get_statement,
        statements::get_all_statements,
        statements::update_statement,
    ),
    components(schemas(
        health::Health,
        auth::types::RegisterRequest,
        auth::types::LoginRequest,
        auth::types::RefreshRequest,
        auth::types::UserResponse,
        auth::types::LoginData,
        auth::types::TokenData,
        statements::CreateStatementRequest,
        statements::UpdateStatementRequest,
        statements::StatementResponse,
        StatementKind,
    )),
    tags(
        (name = "auth", description = "Credential and session lifecycle"),
        (name = "statements", description = "Ledger entries owned by the caller"),
        (name = "health", description = "Service health"),
    )
)]
struct ApiDoc;

/// Build the OpenAPI document for the service.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
