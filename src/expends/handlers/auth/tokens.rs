//! Token Issuer: minting and verification of the access/refresh pair.
//!
//! Both classes are HS256 JWTs over distinct server-held secrets. The access
//! token authorizes individual requests for a short window; the refresh token
//! exists solely to obtain a new pair and lives for days. Verification uses
//! zero leeway so an expired credential is expired, full stop.

use anyhow::{anyhow, Result};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use uuid::Uuid;

use super::state::AuthConfig;
use crate::expends::error::Error;

/// Claims carried by both token classes.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Owning user id.
    pub sub: String,
    /// Unique token id; makes every minted token distinct.
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct TokenClass {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl TokenClass {
    fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }
}

/// Mints and verifies token pairs for user ids.
pub struct TokenIssuer {
    access: TokenClass,
    refresh: TokenClass,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// # Errors
    /// Returns an error when the access and refresh secrets are identical.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let access_secret = config.access_secret().expose_secret();
        let refresh_secret = config.refresh_secret().expose_secret();
        if access_secret == refresh_secret {
            return Err(anyhow!(
                "access and refresh token secrets must be distinct"
            ));
        }
        Ok(Self {
            access: TokenClass::new(access_secret, config.access_ttl_seconds()),
            refresh: TokenClass::new(refresh_secret, config.refresh_ttl_seconds()),
        })
    }

    /// Mint a new pair bound to `user_id`.
    ///
    /// Persisting the refresh side is the caller's job; a pair whose persist
    /// fails must never reach the client.
    pub fn issue(&self, user_id: Uuid) -> Result<TokenPair, Error> {
        Ok(TokenPair {
            access_token: sign(&self.access, user_id)?,
            refresh_token: sign(&self.refresh, user_id)?,
        })
    }

    /// Verify an access token and return its subject.
    pub fn verify_access(&self, token: &str) -> Result<Uuid, Error> {
        verify(&self.access, token)
    }

    /// Verify a refresh token and return its subject.
    pub fn verify_refresh(&self, token: &str) -> Result<Uuid, Error> {
        verify(&self.refresh, token)
    }

    /// Refresh-token lifetime, used to stamp the stored session slot.
    #[must_use]
    pub fn refresh_ttl_seconds(&self) -> i64 {
        self.refresh.ttl_seconds
    }
}

fn sign(class: &TokenClass, user_id: Uuid) -> Result<String, Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        jti: Ulid::new().to_string(),
        iat: now,
        exp: now + class.ttl_seconds,
    };
    encode(&Header::new(Algorithm::HS256), &claims, &class.encoding)
        .map_err(Error::internal)
}

fn verify(class: &TokenClass, token: &str) -> Result<Uuid, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    let data = decode::<Claims>(token, &class.decoding, &validation)
        .map_err(|err| Error::Auth(err.to_string()))?;
    data.claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| Error::Auth("invalid credential subject".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn issuer() -> TokenIssuer {
        let config = AuthConfig::new(
            SecretString::from("access-secret".to_string()),
            SecretString::from("refresh-secret".to_string()),
        );
        TokenIssuer::new(&config).unwrap()
    }

    #[test]
    fn issued_pair_verifies_with_matching_class() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let pair = issuer.issue(user_id).unwrap();

        assert_eq!(issuer.verify_access(&pair.access_token).unwrap(), user_id);
        assert_eq!(issuer.verify_refresh(&pair.refresh_token).unwrap(), user_id);
    }

    #[test]
    fn classes_do_not_cross_verify() {
        let issuer = issuer();
        let pair = issuer.issue(Uuid::new_v4()).unwrap();

        assert!(issuer.verify_access(&pair.refresh_token).is_err());
        assert!(issuer.verify_refresh(&pair.access_token).is_err());
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let config = AuthConfig::new(
            SecretString::from("access-secret".to_string()),
            SecretString::from("refresh-secret".to_string()),
        )
        .with_access_ttl_seconds(-10);
        let issuer = TokenIssuer::new(&config).unwrap();
        let pair = issuer.issue(Uuid::new_v4()).unwrap();

        let err = issuer.verify_access(&pair.access_token).unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let issuer = issuer();
        let pair = issuer.issue(Uuid::new_v4()).unwrap();

        let mut tampered = pair.access_token.clone();
        tampered.pop();
        assert!(issuer.verify_access(&tampered).is_err());
        assert!(issuer.verify_access("not-a-token").is_err());
    }

    #[test]
    fn every_mint_is_unique() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let first = issuer.issue(user_id).unwrap();
        let second = issuer.issue(user_id).unwrap();
        assert_ne!(first.refresh_token, second.refresh_token);
    }
}
