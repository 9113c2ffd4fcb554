//! In-memory reference implementation of [`Store`].
//!
//! Backed by two hash maps behind a single `RwLock`. Holding the write lock
//! across both halves of the paired mutations (statement insert + owner list
//! append, delete + pull, session overwrite) keeps `statement_ids` and the
//! statement collection in sync without a separate transaction layer.
//!
//! Data is not persisted; everything is lost when the process exits.

use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    NewStatement, NewUser, RefreshSession, StatementChanges, StatementRecord, Store, StoreError,
    UniqueField, UserRecord,
};
use async_trait::async_trait;

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, UserRecord>,
    statements: HashMap<Uuid, StatementRecord>,
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let _ = self.inner.read().await;
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut inner = self.inner.write().await;

        // Callers normalize identifiers, but the unique index must not depend
        // on that: compare case-insensitively here as well.
        let username = user.username.to_lowercase();
        let email = user.email.to_lowercase();
        for existing in inner.users.values() {
            if existing.username == username {
                return Err(StoreError::Conflict(UniqueField::Username));
            }
            if existing.email == email {
                return Err(StoreError::Conflict(UniqueField::Email));
            }
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            username,
            email,
            password_digest: user.password_digest,
            refresh_session: None,
            statement_ids: Vec::new(),
            created_at: Utc::now(),
        };
        inner.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn user_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let needle = identifier.to_lowercase();
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|user| user.username == needle || user.email == needle)
            .cloned())
    }

    async fn set_refresh_session(
        &self,
        user_id: Uuid,
        session: Option<RefreshSession>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&user_id).ok_or(StoreError::UnknownUser)?;
        user.refresh_session = session;
        Ok(())
    }

    async fn insert_statement(
        &self,
        statement: NewStatement,
    ) -> Result<StatementRecord, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&statement.user_id) {
            return Err(StoreError::UnknownUser);
        }

        let now = Utc::now();
        let record = StatementRecord {
            id: Uuid::new_v4(),
            name: statement.name,
            amount: statement.amount,
            kind: statement.kind,
            user_id: statement.user_id,
            created_at: now,
            updated_at: now,
        };
        inner.statements.insert(record.id, record.clone());
        if let Some(owner) = inner.users.get_mut(&record.user_id) {
            owner.statement_ids.push(record.id);
        }
        Ok(record)
    }

    async fn statement_by_id(&self, id: Uuid) -> Result<Option<StatementRecord>, StoreError> {
        Ok(self.inner.read().await.statements.get(&id).cloned())
    }

    async fn statements_for_owner(
        &self,
        owner: Uuid,
    ) -> Result<Vec<StatementRecord>, StoreError> {
        let inner = self.inner.read().await;
        let Some(user) = inner.users.get(&owner) else {
            return Ok(Vec::new());
        };
        // Walk the owner's id list so insertion order is preserved.
        Ok(user
            .statement_ids
            .iter()
            .filter_map(|id| inner.statements.get(id))
            .cloned()
            .collect())
    }

    async fn update_statement(
        &self,
        id: Uuid,
        changes: StatementChanges,
    ) -> Result<Option<StatementRecord>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.statements.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            record.name = name;
        }
        if let Some(amount) = changes.amount {
            record.amount = amount;
        }
        if let Some(kind) = changes.kind {
            record.kind = kind;
        }
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete_statement(&self, id: Uuid) -> Result<Option<StatementRecord>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.statements.remove(&id) else {
            return Ok(None);
        };
        if let Some(owner) = inner.users.get_mut(&record.user_id) {
            owner.statement_ids.retain(|owned| *owned != id);
        }
        Ok(Some(record))
    }
}
