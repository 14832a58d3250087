//! Per-request authentication decision, independent of axum's middleware plumbing.
//!
//! 1. no `Authorization: Bearer ...` header      -> anonymous, request proceeds
//! 2. token fails to decode / is past `exp`      -> EXPIRED_TOKEN (401)
//! 3. (userId, provider) has no account          -> USER_NOT_FOUND (401)
//! 4. store or unexpected decode failure         -> INTERNAL_ERROR (500)
use std::error::Error as StdError;

use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::v1::extractors::AuthCtx;
use crate::error::error_response;
use crate::models::{AuthProvider, UnknownProvider};
use crate::repos::{RepoError, UserStore};
use crate::services::auth::{TokenError, TokenValidator};

pub const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug)]
pub enum AuthOutcome {
    Anonymous,
    Authenticated(AuthCtx),
}

#[derive(Debug, Error)]
pub enum AuthRejection {
    #[error("access token is expired or malformed")]
    ExpiredToken,
    #[error("no account for {user_id} ({provider})")]
    UserNotFound { user_id: String, provider: String },
    #[error("token decode failed after expiry check")]
    Decode(#[source] TokenError),
    #[error("account lookup failed")]
    Store(#[source] RepoError),
}

impl AuthRejection {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExpiredToken => "EXPIRED_TOKEN",
            Self::UserNotFound { .. } => "USER_NOT_FOUND",
            Self::Decode(_) | Self::Store(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::ExpiredToken | Self::UserNotFound { .. } => StatusCode::UNAUTHORIZED,
            Self::Decode(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client. Never carries internal detail.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::ExpiredToken => "EXPIRED_ACCESS_TOKEN",
            Self::UserNotFound { .. } => "CANNOT_FOUND_USER",
            Self::Decode(_) | Self::Store(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// `outer: inner: innermost` rendering of the source chain, for logs.
    pub fn chain(&self) -> String {
        std::iter::successors(Some(self as &(dyn StdError + 'static)), |&e| e.source())
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(": ")
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        error_response(self.status(), self.client_message())
    }
}

/// Extract the bearer token, if any. Non-UTF-8 headers count as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
}

pub async fn authenticate(
    headers: &HeaderMap,
    tokens: &TokenValidator,
    store: &dyn UserStore,
) -> Result<AuthOutcome, AuthRejection> {
    let Some(token) = bearer_token(headers) else {
        return Ok(AuthOutcome::Anonymous);
    };

    if tokens.is_expired(token) {
        return Err(AuthRejection::ExpiredToken);
    }

    let claims = tokens.decode_claims(token).map_err(AuthRejection::Decode)?;

    // an unknown provider can never match a stored account
    let provider = match claims.provider.parse::<AuthProvider>() {
        Ok(provider) => provider,
        Err(UnknownProvider(provider)) => {
            return Err(AuthRejection::UserNotFound {
                user_id: claims.user_id,
                provider,
            });
        }
    };

    let found = store
        .exists(&claims.user_id, provider)
        .await
        .map_err(AuthRejection::Store)?;

    if !found {
        return Err(AuthRejection::UserNotFound {
            user_id: claims.user_id,
            provider: claims.provider,
        });
    }

    Ok(AuthOutcome::Authenticated(AuthCtx::new(
        claims.user_id,
        provider,
    )))
}
