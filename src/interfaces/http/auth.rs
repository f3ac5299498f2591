//! Bearer-token authentication for the payment routes.
//!
//! Tokens are HS256 JWTs carrying the user id, email and account type. Only
//! student accounts may call the payment endpoints.

use super::AppState;
use super::response::ApiError;
use crate::domain::ids::UserId;
use crate::error::{PaymentError, Result};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Admin,
    Student,
    Instructor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub id: UserId,
    pub email: String,
    pub account_type: AccountType,
    pub exp: u64,
}

/// HS256 signing and verification keys derived from the shared JWT secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, claims: &Claims) -> Result<String> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| PaymentError::InternalError(Box::new(e)))
    }

    /// Issues a student token valid for `ttl_secs` from now.
    pub fn issue_student(&self, id: UserId, email: String, ttl_secs: u64) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        self.issue(&Claims {
            id,
            email,
            account_type: AccountType::Student,
            exp: now.saturating_add(ttl_secs),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| PaymentError::Unauthorized("Invalid token".to_string()))
    }
}

/// Extractor for an authenticated student.
#[derive(Debug, Clone)]
pub struct AuthenticatedStudent(pub Claims);

impl AuthenticatedStudent {
    pub fn id(&self) -> &UserId {
        &self.0.id
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthenticatedStudent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != "null" && *t != "undefined")
            .ok_or_else(|| PaymentError::Unauthorized("Token is missing".to_string()))?;

        let claims = state.tokens.verify(token)?;
        if claims.account_type != AccountType::Student {
            return Err(PaymentError::Unauthorized(
                "This is a private route for students".to_string(),
            )
            .into());
        }
        Ok(Self(claims))
    }
}
