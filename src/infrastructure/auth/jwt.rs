//! JWT verification for caller identity
//!
//! Token issuance belongs to the external auth service; this service only
//! verifies bearer tokens and extracts the stable subject identifier that
//! becomes the document owner id.

use std::fmt::Debug;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Claims expected inside a verified token.
///
/// Only the `sub` claim is consumed; it carries the caller's owner id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the stable user identifier
    pub sub: String,
    /// Issued at timestamp (Unix epoch)
    pub iat: i64,
    /// Expiration timestamp (Unix epoch)
    pub exp: i64,
}

impl JwtClaims {
    /// Create claims for a subject, expiring after `expiration_hours`
    pub fn new(subject: impl Into<String>, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);
        Self {
            sub: subject.into(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    /// The verified owner id
    pub fn owner_id(&self) -> &str {
        &self.sub
    }
}

/// Configuration for the JWT service
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 secret shared with the token issuer
    pub secret: String,
    /// Expiration applied to locally minted tokens
    pub expiration_hours: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }
}

/// Trait for verifying bearer credentials into a caller identity
pub trait JwtVerifier: Send + Sync + Debug {
    /// Validate a token and return its claims
    fn verify(&self, token: &str) -> Result<JwtClaims, DomainError>;
}

/// HS256 JWT service sharing a secret with the token issuer
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("expiration_hours", &self.config.expiration_hours)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Mint a token for a subject. The deployed issuer lives elsewhere;
    /// this exists for local development and tests.
    pub fn generate(&self, subject: &str) -> Result<String, DomainError> {
        let claims = JwtClaims::new(subject, self.config.expiration_hours);
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| DomainError::unauthorized(format!("Failed to generate JWT: {}", e)))
    }
}

impl JwtVerifier for JwtService {
    fn verify(&self, token: &str) -> Result<JwtClaims, DomainError> {
        let validation = Validation::default();

        let token_data = decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map_err(|_| DomainError::unauthorized("Could not validate credentials"))?;

        if token_data.claims.sub.is_empty() {
            return Err(DomainError::unauthorized("Could not validate credentials"));
        }

        Ok(token_data.claims)
    }
}
