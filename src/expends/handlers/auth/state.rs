//! Auth configuration and shared state.
//!
//! All secrets and expiry windows are threaded in explicitly at construction
//! time; nothing in the request path reads ambient environment state.

use secrecy::SecretString;

use super::tokens::TokenIssuer;

const DEFAULT_ACCESS_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Signing secrets and expiry windows for the two token classes.
///
/// The access and refresh secrets must differ so compromise of one class
/// cannot forge the other; [`AuthState::new`] rejects equal secrets.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    access_secret: SecretString,
    refresh_secret: SecretString,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
    secure_cookies: bool,
}

impl AuthConfig {
    #[must_use]
    pub fn new(access_secret: SecretString, refresh_secret: SecretString) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_ttl_seconds: DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: DEFAULT_REFRESH_TTL_SECONDS,
            secure_cookies: true,
        }
    }

    #[must_use]
    pub fn with_access_ttl_seconds(mut self, seconds: i64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_refresh_ttl_seconds(mut self, seconds: i64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub(crate) fn access_secret(&self) -> &SecretString {
        &self.access_secret
    }

    pub(crate) fn refresh_secret(&self) -> &SecretString {
        &self.refresh_secret
    }

    #[must_use]
    pub fn access_ttl_seconds(&self) -> i64 {
        self.access_ttl_seconds
    }

    #[must_use]
    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh_ttl_seconds
    }

    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}

/// Shared auth state handed to handlers via an extension layer.
#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    tokens: TokenIssuer,
}

impl AuthState {
    /// Build the shared state, deriving the token issuer from the config.
    ///
    /// # Errors
    /// Returns an error when the two signing secrets are identical.
    pub fn new(config: AuthConfig) -> anyhow::Result<Self> {
        let tokens = TokenIssuer::new(&config)?;
        Ok(Self { config, tokens })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::new(
            SecretString::from("access-secret".to_string()),
            SecretString::from("refresh-secret".to_string()),
        )
    }

    #[test]
    fn defaults_are_minutes_and_days() {
        let config = config();
        assert_eq!(config.access_ttl_seconds(), 15 * 60);
        assert_eq!(config.refresh_ttl_seconds(), 7 * 24 * 60 * 60);
        assert!(config.secure_cookies());
    }

    #[test]
    fn builders_override_defaults() {
        let config = config()
            .with_access_ttl_seconds(60)
            .with_refresh_ttl_seconds(120)
            .with_secure_cookies(false);
        assert_eq!(config.access_ttl_seconds(), 60);
        assert_eq!(config.refresh_ttl_seconds(), 120);
        assert!(!config.secure_cookies());
    }

    #[test]
    fn equal_secrets_are_rejected() {
        let config = AuthConfig::new(
            SecretString::from("same".to_string()),
            SecretString::from("same".to_string()),
        );
        assert!(AuthState::new(config).is_err());
    }
}
