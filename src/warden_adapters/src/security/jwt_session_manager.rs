use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use warden_core::{Identity, Role, SessionError, SessionManager, SessionToken, UserId};

use crate::config::JwtSettings;

/// Claims carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Stateless HS256 sessions. Only HS256 is accepted on validation, whatever
/// the token header claims.
#[derive(Clone)]
pub struct JwtSessionManager {
    secret: Secret<String>,
    issuer: String,
    ttl: Duration,
}

impl JwtSessionManager {
    pub fn new(secret: Secret<String>, issuer: String, ttl: Duration) -> Self {
        Self {
            secret,
            issuer,
            ttl,
        }
    }

    pub fn from_settings(settings: &JwtSettings) -> Self {
        Self::new(
            settings.secret.clone(),
            settings.issuer.clone(),
            Duration::seconds(settings.ttl_seconds),
        )
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation
    }
}

impl SessionManager for JwtSessionManager {
    fn generate(&self, identity: &Identity) -> Result<SessionToken, SessionError> {
        let issued_at = Utc::now();
        let expires_at = issued_at
            .checked_add_signed(self.ttl)
            .ok_or_else(|| SessionError::IssueFailed("Duration out of range".to_owned()))?;

        let claims = Claims {
            sub: identity.user_id,
            role: identity.role,
            iss: self.issuer.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map(SessionToken::new)
        .map_err(|e| SessionError::IssueFailed(e.to_string()))
    }

    fn validate(&self, token: &str) -> Result<Identity, SessionError> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &self.validation(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            SessionError::Unauthenticated
        })?;

        Ok(Identity::new(claims.sub, claims.role))
    }
}
