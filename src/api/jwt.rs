use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::config::AuthConfig;

/// Global cached JwtService instance
static JWT_SERVICE: OnceLock<JwtService> = OnceLock::new();

/// Get the cached JwtService instance
///
/// The service is initialized once from `auth` config on first use.
pub fn get_jwt_service() -> &'static JwtService {
    JWT_SERVICE.get_or_init(JwtService::from_config)
}

/// Session Token Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// 用户邮箱
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// JWT Service for issuing and validating session tokens (HS256)
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_secs: u64,
}

impl JwtService {
    pub fn new(secret: &str, token_ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_ttl_secs,
        }
    }

    /// Create JwtService from config
    pub fn from_config() -> Self {
        Self::from_auth(&crate::config::get_config().auth)
    }

    /// secret 为空时生成随机值，已签发的 token 在重启后失效
    pub fn from_auth(auth: &AuthConfig) -> Self {
        let secret = if auth.jwt_secret.trim().is_empty() {
            tracing::warn!("JWT secret not configured or empty, generating random secret");
            crate::utils::generate_random_code(48)
        } else {
            auth.jwt_secret.clone()
        };

        Self::new(&secret, auth.token_ttl_secs)
    }

    pub fn token_ttl_secs(&self) -> u64 {
        self.token_ttl_secs
    }

    /// Issue a session token for `email`
    pub fn issue_token(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: email.to_string(),
            name: name.map(str::to_string),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.token_ttl_secs as i64)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate a session token
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidSubject,
            ));
        }

        Ok(token_data.claims)
    }
}
