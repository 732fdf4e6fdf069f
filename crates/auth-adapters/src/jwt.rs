use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domains::{AppError, Caller, IdentityProvider, Result, UserRepo};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// The user id.
    sub: String,
    exp: i64,
}

/// HS256 bearer-token verification backed by the user store.
pub struct JwtIdentity {
    decoding: DecodingKey,
    users: Arc<dyn UserRepo>,
}

impl JwtIdentity {
    pub fn new(secret: &[u8], users: Arc<dyn UserRepo>) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret),
            users,
        }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentity {
    async fn resolve(&self, token: &str) -> Result<Caller> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|err| AppError::Unauthorized(format!("invalid token: {err}")))?;
        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("malformed subject claim".into()))?;

        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown account".into()))?;
        if user.disabled {
            return Err(AppError::Unauthorized("account disabled".into()));
        }
        Ok(Caller {
            id: user.id,
            role: user.role,
        })
    }
}

/// Mint a token for `user_id`. The development sign-in endpoint and the
/// seed tool use this; production deployments point the secret at the
/// external identity provider's.
pub fn issue_token(secret: &[u8], user_id: Uuid, ttl_hours: i64) -> Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::hours(ttl_hours)).timestamp(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
        .map_err(AppError::internal)
}
