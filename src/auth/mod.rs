pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::User;

pub use password::PasswordHasher;

/// JWT claims carried by every bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Who a verified token speaks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("JWT generation error: {0}")]
    Signing(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Issues and verifies HS256 bearer tokens
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl TokenService {
    pub fn new(config: &SecurityConfig) -> Result<Self, TokenError> {
        let expiry = i64::try_from(config.jwt_expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| {
                TokenError::Signing(format!("expiry of {} hours is out of range", config.jwt_expiry_hours))
            })?;
        Self::with_expiry(&config.jwt_secret, expiry)
    }

    pub fn with_expiry(secret: &str, expiry: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry,
        })
    }

    /// Sign a fresh token for `identity`
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.expiry)
            .ok_or_else(|| TokenError::Signing("token expiry is out of range".to_string()))?;
        let claims = Claims {
            sub: identity.user_id,
            username: identity.username.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Check signature then expiry, and return the identity the token carries
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;

        Ok(data.claims.into())
    }

    /// Re-issue a token for an identity that already passed `verify`
    pub fn refresh(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue(identity)
    }
}
