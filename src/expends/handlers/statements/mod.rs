//! Ledger Manager: statement CRUD behind the session guard.
//!
//! Ownership is enforced on every by-id operation; a statement that exists
//! but belongs to someone else is reported as not found, so ids cannot be
//! probed across users.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    expends::{
        envelope::reply,
        error::Error,
        handlers::auth::{require_auth, AuthState, Principal},
    },
    store::{NewStatement, SharedStore, StatementChanges, StatementKind, StatementRecord},
};

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct CreateStatementRequest {
    pub name: Option<String>,
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct UpdateStatementRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Read projection with human-readable date/time from the creation timestamp.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatementResponse {
    pub id: String,
    pub name: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: StatementKind,
    pub user_id: String,
    pub date: String,
    pub time: String,
}

impl From<&StatementRecord> for StatementResponse {
    fn from(record: &StatementRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name.clone(),
            amount: record.amount,
            kind: record.kind,
            user_id: record.user_id.to_string(),
            date: record.created_at.format("%Y-%m-%d").to_string(),
            time: record.created_at.format("%H:%M:%S").to_string(),
        }
    }
}

fn parse_kind(value: &str) -> Result<StatementKind, Error> {
    value.parse().map_err(|()| {
        Error::Validation(format!(
            "Invalid statement type {value:?}; expected \"Income\" or \"Expend\"."
        ))
    })
}

fn parse_statement_id(value: &str) -> Result<Uuid, Error> {
    value
        .parse()
        .map_err(|_| Error::Validation("Invalid statement id.".to_string()))
}

/// Fetch a statement the caller owns, hiding foreign ones as missing.
async fn owned_statement(
    store: &SharedStore,
    principal: &Principal,
    id: Uuid,
) -> Result<StatementRecord, Error> {
    store
        .statement_by_id(id)
        .await
        .map_err(Error::internal)?
        .filter(|record| record.user_id == principal.user_id)
        .ok_or_else(|| Error::NotFound("Statement does not exist.".to_string()))
}

#[utoipa::path(
    post,
    path = "/create-statement",
    request_body = CreateStatementRequest,
    responses(
        (status = 201, description = "Statement created", body = StatementResponse),
        (status = 400, description = "Missing field or invalid type"),
        (status = 401, description = "Missing or invalid access token"),
    ),
    tag = "statements"
)]
#[instrument(skip(state, store, headers, payload))]
pub async fn create_statement(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(store): Extension<SharedStore>,
    headers: HeaderMap,
    payload: Option<Json<CreateStatementRequest>>,
) -> Result<impl IntoResponse, Error> {
    let principal = require_auth(&headers, &state, &store).await?;
    let request = payload.map(|Json(body)| body).unwrap_or_default();

    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::Validation("Statement name is required.".to_string()))?;
    let amount = request
        .amount
        .filter(|value| value.is_finite())
        .ok_or_else(|| Error::Validation("Statement amount is required.".to_string()))?;
    let kind = request
        .kind
        .as_deref()
        .ok_or_else(|| Error::Validation("Statement type is required.".to_string()))
        .and_then(parse_kind)?;

    let record = store
        .insert_statement(NewStatement {
            user_id: principal.user_id,
            name: name.to_string(),
            amount,
            kind,
        })
        .await?;

    debug!(statement_id = %record.id, user_id = %principal.user_id, "statement created");

    Ok(reply(
        StatusCode::CREATED,
        StatementResponse::from(&record),
        "Statement created successfully.",
    ))
}

#[utoipa::path(
    delete,
    path = "/delete-statement/{id}",
    params(("id" = String, Path, description = "Statement id")),
    responses(
        (status = 200, description = "Statement deleted", body = StatementResponse),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "No such statement for this user"),
    ),
    tag = "statements"
)]
#[instrument(skip(state, store, headers))]
pub async fn delete_statement(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(store): Extension<SharedStore>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let principal = require_auth(&headers, &state, &store).await?;
    let id = parse_statement_id(&id)?;

    // Ownership check first, so foreign statements read as missing.
    owned_statement(&store, &principal, id).await?;

    let deleted = store
        .delete_statement(id)
        .await
        .map_err(Error::internal)?
        .ok_or_else(|| Error::NotFound("Statement does not exist.".to_string()))?;

    debug!(statement_id = %id, user_id = %principal.user_id, "statement deleted");

    Ok(reply(
        StatusCode::OK,
        StatementResponse::from(&deleted),
        "Statement deleted successfully.",
    ))
}

#[utoipa::path(
    get,
    path = "/get-statement/{id}",
    params(("id" = String, Path, description = "Statement id")),
    responses(
        (status = 200, description = "Statement found", body = StatementResponse),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "No such statement for this user"),
    ),
    tag = "statements"
)]
#[instrument(skip(state, store, headers))]
pub async fn get_statement(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(store): Extension<SharedStore>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let principal = require_auth(&headers, &state, &store).await?;
    let id = parse_statement_id(&id)?;
    let record = owned_statement(&store, &principal, id).await?;

    Ok(reply(
        StatusCode::OK,
        StatementResponse::from(&record),
        "Statement fetched successfully.",
    ))
}

#[utoipa::path(
    get,
    path = "/get-all-statements",
    responses(
        (status = 200, description = "All statements owned by the caller", body = [StatementResponse]),
        (status = 401, description = "Missing or invalid access token"),
    ),
    tag = "statements"
)]
#[instrument(skip(state, store, headers))]
pub async fn get_all_statements(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(store): Extension<SharedStore>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, Error> {
    let principal = require_auth(&headers, &state, &store).await?;

    let records = store
        .statements_for_owner(principal.user_id)
        .await
        .map_err(Error::internal)?;
    let data: Vec<StatementResponse> = records.iter().map(StatementResponse::from).collect();

    Ok(reply(
        StatusCode::OK,
        data,
        "Statements fetched successfully.",
    ))
}

#[utoipa::path(
    patch,
    path = "/update-statement",
    request_body = UpdateStatementRequest,
    responses(
        (status = 200, description = "Statement updated", body = StatementResponse),
        (status = 400, description = "Missing id or invalid type"),
        (status = 401, description = "Missing or invalid access token"),
        (status = 404, description = "No such statement for this user"),
    ),
    tag = "statements"
)]
#[instrument(skip(state, store, headers, payload))]
pub async fn update_statement(
    Extension(state): Extension<Arc<AuthState>>,
    Extension(store): Extension<SharedStore>,
    headers: HeaderMap,
    payload: Option<Json<UpdateStatementRequest>>,
) -> Result<impl IntoResponse, Error> {
    let principal = require_auth(&headers, &state, &store).await?;
    let request = payload.map(|Json(body)| body).unwrap_or_default();

    let id = request
        .id
        .as_deref()
        .ok_or_else(|| Error::Validation("Statement id is required.".to_string()))
        .and_then(parse_statement_id)?;
    let kind = request.kind.as_deref().map(parse_kind).transpose()?;
    if let Some(amount) = request.amount {
        if !amount.is_finite() {
            return Err(Error::Validation(
                "Statement amount must be a finite number.".to_string(),
            ));
        }
    }

    owned_statement(&store, &principal, id).await?;

    let changes = StatementChanges {
        name: request
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()),
        amount: request.amount,
        kind,
    };
    let updated = store
        .update_statement(id, changes)
        .await
        .map_err(Error::internal)?
        .ok_or_else(|| Error::NotFound("Statement does not exist.".to_string()))?;

    debug!(statement_id = %id, user_id = %principal.user_id, "statement updated");

    Ok(reply(
        StatusCode::OK,
        StatementResponse::from(&updated),
        "Statement updated successfully.",
    ))
}
