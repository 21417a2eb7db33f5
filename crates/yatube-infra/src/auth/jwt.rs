//! Session tokens as HS256-signed JWTs.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use yatube_core::domain::User;
use yatube_core::ports::{AuthError, SessionClaims, SessionTokens};

const DEV_SECRET: &str = "yatube-dev-secret";

/// Signing settings for session tokens.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Session lifetime.
    pub expiration_hours: i64,
    /// Written to `iss` and required back on every request.
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: DEV_SECRET.to_string(),
            expiration_hours: 24,
            issuer: "yatube".to_string(),
        }
    }
}

impl JwtConfig {
    /// Read `JWT_SECRET`, `JWT_EXPIRATION_HOURS` and `JWT_ISSUER`, keeping
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => config.secret = secret,
            _ => tracing::warn!("JWT_SECRET not set; sessions are signed with a development key"),
        }
        if let Some(hours) = std::env::var("JWT_EXPIRATION_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.expiration_hours = hours;
        }
        if let Ok(issuer) = std::env::var("JWT_ISSUER") {
            config.issuer = issuer;
        }

        config
    }
}

/// Wire form of the session claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    name: String,
    iat: i64,
    exp: i64,
    iss: String,
}

pub struct JwtSessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    lifetime: TimeDelta,
}

impl JwtSessionTokens {
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer,
            lifetime: TimeDelta::hours(config.expiration_hours),
        }
    }
}

impl SessionTokens for JwtSessionTokens {
    fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            name: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::BadToken(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::SessionExpired,
                _ => AuthError::BadToken(e.to_string()),
            })?
            .claims;

        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::BadToken("exp out of range".to_string()))?;

        Ok(SessionClaims {
            user_id: claims.sub,
            username: claims.name,
            expires_at,
        })
    }

    fn lifetime(&self) -> TimeDelta {
        self.lifetime
    }
}
