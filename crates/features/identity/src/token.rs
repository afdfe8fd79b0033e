//! HS256 access/refresh tokens and the access-token revocation list.

use crate::error::IdentityError;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use lvai_domain::config::JwtConfig;
use lvai_kernel::safe_nanoid;
use moka::Expiry;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Why a presented token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    Expired,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Each revoked `jti` lives exactly as long as its token has left to run.
struct UntilTokenExpiry;

impl Expiry<String, std::time::Duration> for UntilTokenExpiry {
    fn expire_after_create(
        &self,
        _jti: &String,
        remaining: &std::time::Duration,
        _created_at: Instant,
    ) -> Option<std::time::Duration> {
        Some(*remaining)
    }
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    revoked: Cache<String, std::time::Duration>,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("revoked", &self.revoked.entry_count())
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// # Errors
    ///
    /// Returns [`IdentityError::Config`] when a lifetime does not fit a duration.
    pub fn new(config: &JwtConfig) -> Result<Self, IdentityError> {
        let minutes = i64::try_from(config.access_ttl_minutes).ok();
        let days = i64::try_from(config.refresh_ttl_days).ok();
        let (Some(access_ttl), Some(refresh_ttl)) =
            (minutes.and_then(Duration::try_minutes), days.and_then(Duration::try_days))
        else {
            return Err(IdentityError::Config {
                message: "token lifetimes are out of range".into(),
                context: None,
            });
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.leeway = 0;

        // Unbounded; an entry leaves only when its token expires.
        let revoked = Cache::builder().expire_after(UntilTokenExpiry).build();

        Ok(Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            access_ttl,
            refresh_ttl,
            revoked,
        })
    }

    #[must_use]
    pub fn access_ttl_seconds(&self) -> u64 {
        self.access_ttl.num_seconds().unsigned_abs()
    }

    /// Signs a fresh access/refresh pair for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Signing`] if encoding fails.
    pub fn issue_pair(&self, user_id: &str) -> Result<TokenPair, IdentityError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, TokenKind::Access)?,
            refresh_token: self.issue(user_id, TokenKind::Refresh)?,
            expires_in: self.access_ttl_seconds(),
        })
    }

    fn issue(&self, user_id: &str, kind: TokenKind) -> Result<String, IdentityError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        self.sign(&Claims {
            sub: user_id.to_owned(),
            kind,
            jti: safe_nanoid!(16),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: self.issuer.clone(),
        })
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, IdentityError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| IdentityError::Signing { message: e.to_string().into(), context: None })
    }

    /// Verifies signature, issuer, expiry, type and revocation.
    ///
    /// # Errors
    ///
    /// [`TokenRejection::Expired`] for an expired but otherwise valid token,
    /// [`TokenRejection::Invalid`] for everything else.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenRejection> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenRejection::Expired,
                _ => TokenRejection::Invalid,
            })?;

        if claims.kind != expected || self.is_revoked(&claims.jti) {
            return Err(TokenRejection::Invalid);
        }
        Ok(claims)
    }

    /// Remembers `claims.jti` until the token would have expired anyway.
    pub fn revoke(&self, claims: &Claims) {
        let remaining = claims.exp.saturating_sub(Utc::now().timestamp());
        if let Ok(secs) = u64::try_from(remaining)
            && secs > 0
        {
            self.revoked.insert(claims.jti.clone(), std::time::Duration::from_secs(secs));
        }
    }

    #[must_use]
    pub fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.contains_key(jti)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_owned(),
            ..JwtConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn pair_round_trips_with_distinct_types() {
        let tokens = service();
        let pair = tokens.issue_pair("user-1").unwrap();
        assert_eq!(pair.expires_in, 30 * 60);

        let access = tokens.verify(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!(access.sub, "user-1");
        assert_eq!(access.iss, "lvai");
        assert_eq!(access.exp - access.iat, 30 * 60);

        let refresh = tokens.verify(&pair.refresh_token, TokenKind::Refresh).unwrap();
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 3600);
        assert_ne!(access.jti, refresh.jti);

        assert_eq!(tokens.verify(&pair.refresh_token, TokenKind::Access), Err(TokenRejection::Invalid));
        assert_eq!(tokens.verify(&pair.access_token, TokenKind::Refresh), Err(TokenRejection::Invalid));
    }

    #[test]
    fn expired_tokens_are_reported_as_expired() {
        let tokens = service();
        let now = Utc::now().timestamp();
        let stale = tokens
            .sign(&Claims {
                sub: "user-1".to_owned(),
                kind: TokenKind::Access,
                jti: "stale".to_owned(),
                iat: now - 7200,
                exp: now - 3600,
                iss: "lvai".to_owned(),
            })
            .unwrap();

        assert_eq!(tokens.verify(&stale, TokenKind::Access), Err(TokenRejection::Expired));
    }

    #[test]
    fn foreign_signatures_and_issuers_are_invalid() {
        let tokens = service();
        let other = TokenService::new(&JwtConfig {
            secret: "ffffffffffffffffffffffffffffffff".to_owned(),
            ..JwtConfig::default()
        })
        .unwrap();
        let forged = other.issue_pair("user-1").unwrap().access_token;
        assert_eq!(tokens.verify(&forged, TokenKind::Access), Err(TokenRejection::Invalid));
        assert_eq!(tokens.verify("garbage", TokenKind::Access), Err(TokenRejection::Invalid));

        let elsewhere = TokenService::new(&JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_owned(),
            issuer: "someone-else".to_owned(),
            ..JwtConfig::default()
        })
        .unwrap();
        let token = elsewhere.issue_pair("user-1").unwrap().access_token;
        assert_eq!(tokens.verify(&token, TokenKind::Access), Err(TokenRejection::Invalid));
    }

    #[test]
    fn revoked_access_tokens_stop_verifying() {
        let tokens = service();
        let pair = tokens.issue_pair("user-1").unwrap();
        let claims = tokens.verify(&pair.access_token, TokenKind::Access).unwrap();

        tokens.revoke(&claims);
        assert!(tokens.is_revoked(&claims.jti));
        assert_eq!(tokens.verify(&pair.access_token, TokenKind::Access), Err(TokenRejection::Invalid));
        assert!(tokens.verify(&pair.refresh_token, TokenKind::Refresh).is_ok());
    }

    #[test]
    fn every_revocation_is_kept_under_load() {
        let tokens = service();
        let pairs: Vec<TokenPair> = (0..500).map(|i| tokens.issue_pair(&format!("user-{i}")).unwrap()).collect();

        for pair in &pairs {
            let claims = tokens.verify(&pair.access_token, TokenKind::Access).unwrap();
            tokens.revoke(&claims);
            tokens.revoked.run_pending_tasks();
        }

        let still_valid = pairs
            .iter()
            .filter(|pair| tokens.verify(&pair.access_token, TokenKind::Access).is_ok())
            .count();
        assert_eq!(still_valid, 0);
        assert_eq!(tokens.revoked.entry_count(), 500);
    }

    #[test]
    fn expired_claims_are_not_remembered() {
        let tokens = service();
        let now = Utc::now().timestamp();
        tokens.revoke(&Claims {
            sub: "user-1".to_owned(),
            kind: TokenKind::Access,
            jti: "gone".to_owned(),
            iat: now - 7200,
            exp: now - 1,
            iss: "lvai".to_owned(),
        });
        assert!(!tokens.is_revoked("gone"));
    }
}
