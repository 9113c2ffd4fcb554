use crate::{
    cli::actions::Action,
    expends,
    expends::handlers::auth::{AuthConfig, AuthState},
    store::{memory::MemoryStore, SharedStore},
};
use anyhow::Result;
use std::sync::Arc;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            access_secret,
            refresh_secret,
            access_ttl_minutes,
            refresh_ttl_days,
            secure_cookies,
        } => {
            let config = AuthConfig::new(access_secret, refresh_secret)
                .with_access_ttl_seconds(access_ttl_minutes * 60)
                .with_refresh_ttl_seconds(refresh_ttl_days * 24 * 60 * 60)
                .with_secure_cookies(secure_cookies);
            let auth_state = Arc::new(AuthState::new(config)?);
            let store: SharedStore = Arc::new(MemoryStore::new());

            expends::new(port, auth_state, store).await?;
        }
    }

    Ok(())
}
