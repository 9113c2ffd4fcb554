//! Credential/session lifecycle: registration, login, guard, rotation.

pub mod cookies;
pub mod guard;
pub mod login;
pub mod password;
pub mod refresh;
pub mod register;
pub mod state;
pub mod tokens;
pub mod types;

pub use guard::{require_auth, Principal};
pub use state::{AuthConfig, AuthState};

use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    expends::error::Error,
    store::{RefreshSession, SharedStore},
};
use tokens::TokenPair;

/// Hash a refresh token for storage and comparison; raw tokens never touch
/// the store.
pub(crate) fn hash_refresh_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Mint a pair for `user_id` and overwrite the stored session slot.
///
/// The overwrite is unconditional: one live session per user. When the
/// persist fails the pair is dropped and the caller gets an internal error,
/// so unpersisted tokens never reach a client.
pub(crate) async fn issue_session(
    state: &AuthState,
    store: &SharedStore,
    user_id: Uuid,
) -> Result<TokenPair, Error> {
    let pair = state.tokens().issue(user_id)?;

    let issued_at = Utc::now();
    let session = RefreshSession {
        token_hash: hash_refresh_token(&pair.refresh_token),
        issued_at,
        expires_at: issued_at + Duration::seconds(state.tokens().refresh_ttl_seconds()),
    };
    store
        .set_refresh_session(user_id, Some(session))
        .await
        .map_err(Error::internal)?;

    Ok(pair)
}
