//! Credential store abstraction.
//!
//! The service talks to persistence exclusively through the [`Store`] trait:
//! per-entity CRUD for users and statements with unique-index enforcement on
//! username/email. Every mutation that must keep two collections consistent
//! (statement insert + owner list append, delete + pull, session overwrite)
//! is a single trait method so an implementation can apply both writes
//! atomically.
//!
//! [`MemoryStore`](memory::MemoryStore) is the reference implementation.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Shared handle used by handlers and the server bootstrap.
pub type SharedStore = Arc<dyn Store>;

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index (username or email) rejected the write.
    #[error("user with that {0} already exists")]
    Conflict(UniqueField),

    /// A write referenced a user id that does not exist.
    #[error("unknown user")]
    UnknownUser,

    /// The backing store could not complete the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Unique-index field names reported in conflict errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username => f.write_str("username"),
            Self::Email => f.write_str("email"),
        }
    }
}

/// Ledger entry classification. Any other value is rejected at the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum StatementKind {
    Income,
    Expend,
}

impl FromStr for StatementKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Income" => Ok(Self::Income),
            "Expend" => Ok(Self::Expend),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => f.write_str("Income"),
            Self::Expend => f.write_str("Expend"),
        }
    }
}

/// The single live session slot for a user.
///
/// Only a hash of the refresh token is kept; rotation overwrites the slot and
/// logout clears it, which is what makes superseded tokens detectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSession {
    pub token_hash: Vec<u8>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Stored user record. The digest never leaves the store layer in responses.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    /// Stored lower-cased; unique case-insensitively.
    pub username: String,
    /// Stored trimmed and lower-cased; unique.
    pub email: String,
    pub password_digest: String,
    pub refresh_session: Option<RefreshSession>,
    /// Ordered ids of owned statements; mirrors the statement collection.
    pub statement_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Stored ledger entry.
#[derive(Debug, Clone)]
pub struct StatementRecord {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
    pub kind: StatementKind,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for user creation; identifiers are expected pre-normalized.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_digest: String,
}

/// Input for statement creation.
#[derive(Debug, Clone)]
pub struct NewStatement {
    pub user_id: Uuid,
    pub name: String,
    pub amount: f64,
    pub kind: StatementKind,
}

/// Partial update for a statement; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct StatementChanges {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub kind: Option<StatementKind>,
}

/// Persistence seam for users and statements.
///
/// Implementations must be thread-safe; every method is one suspend-until-
/// complete operation from the caller's point of view.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap reachability check for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Create a user, enforcing the username/email unique indexes.
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    async fn user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    /// Look up by username (case-insensitive) or email.
    async fn user_by_identifier(&self, identifier: &str)
        -> Result<Option<UserRecord>, StoreError>;

    /// Overwrite the session slot; `None` clears it (logout).
    async fn set_refresh_session(
        &self,
        user_id: Uuid,
        session: Option<RefreshSession>,
    ) -> Result<(), StoreError>;

    /// Create a statement and append its id to the owner's list in one step.
    async fn insert_statement(
        &self,
        statement: NewStatement,
    ) -> Result<StatementRecord, StoreError>;

    async fn statement_by_id(&self, id: Uuid) -> Result<Option<StatementRecord>, StoreError>;

    /// All statements owned by `owner`, in insertion order.
    async fn statements_for_owner(
        &self,
        owner: Uuid,
    ) -> Result<Vec<StatementRecord>, StoreError>;

    /// Apply a partial update; `Ok(None)` when the statement does not exist.
    async fn update_statement(
        &self,
        id: Uuid,
        changes: StatementChanges,
    ) -> Result<Option<StatementRecord>, StoreError>;

    /// Delete a statement and pull its id from the owner's list in one step.
    /// Returns the deleted record, or `Ok(None)` when it does not exist.
    async fn delete_statement(&self, id: Uuid) -> Result<Option<StatementRecord>, StoreError>;
}
