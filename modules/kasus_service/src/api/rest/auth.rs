//! Bearer-token authentication
//!
//! Validates an HS256 JWT from the `Authorization` header and injects the resulting
//! [`Actor`] into request extensions. Token issuance happens elsewhere; [`AuthState::issue`]
//! exists for operators and tests.

use super::error::Problem;
use crate::contract::{Actor, Role};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    /// Role label, e.g. "Ketua Tim"
    pub role: String,
    /// Expiry (unix seconds)
    pub exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingToken,
    #[error("expected 'Bearer <token>'")]
    InvalidScheme,
    #[error("invalid or expired token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

/// Key material shared across middleware instances
#[derive(Clone)]
pub struct AuthState {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl AuthState {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a token for `actor` valid for `ttl`
    pub fn issue(&self, actor: &Actor, ttl: chrono::Duration) -> Result<String, AuthError> {
        let claims = Claims {
            sub: actor.user_id,
            role: actor.role.to_string(),
            exp: (chrono::Utc::now() + ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Validate a raw token and resolve the caller
    pub fn authenticate(&self, token: &str) -> Result<Actor, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        let role: Role = data
            .claims
            .role
            .parse()
            .map_err(|_| AuthError::UnknownRole(data.claims.role.clone()))?;
        Ok(Actor::new(data.claims.sub, role))
    }
}

fn bearer_token(request: &Request) -> Result<&str, AuthError> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::InvalidScheme)
}

/// Reject the request with 401 unless it carries a valid bearer token
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, Problem> {
    let actor = bearer_token(&request)
        .and_then(|token| state.authenticate(token))
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected request");
            Problem::unauthorized(e.to_string())
        })?;

    tracing::Span::current().record("actor", tracing::field::display(actor.user_id));
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;

    fn app(state: Arc<AuthState>) -> Router {
        Router::new()
            .route(
                "/me",
                get(|Extension(actor): Extension<Actor>| async move { actor.role.to_string() }),
            )
            .route_layer(middleware::from_fn_with_state(state, require_auth))
    }

    fn get_me(token: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/me");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn valid_token_resolves_the_actor() {
        let state = Arc::new(AuthState::new(b"secret"));
        let actor = Actor::new(Uuid::new_v4(), Role::KetuaTim);
        let token = state.issue(&actor, chrono::Duration::minutes(5)).unwrap();

        let response = app(state)
            .oneshot(get_me(Some(&format!("Bearer {token}"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Ketua Tim");
    }

    #[tokio::test]
    async fn missing_or_malformed_tokens_are_unauthorized() {
        let state = Arc::new(AuthState::new(b"secret"));
        for header_value in [None, Some("Basic abc"), Some("Bearer not-a-jwt")] {
            let response = app(state.clone()).oneshot(get_me(header_value)).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn expired_and_foreign_tokens_are_rejected() {
        let state = AuthState::new(b"secret");
        let actor = Actor::new(Uuid::new_v4(), Role::Admin);

        let expired = state.issue(&actor, chrono::Duration::minutes(-5)).unwrap();
        assert!(state.authenticate(&expired).is_err());

        let foreign = AuthState::new(b"other")
            .issue(&actor, chrono::Duration::minutes(5))
            .unwrap();
        assert!(state.authenticate(&foreign).is_err());
    }

    #[test]
    fn unknown_roles_are_rejected() {
        let state = AuthState::new(b"secret");
        let claims = Claims {
            sub: Uuid::new_v4(),
            role: "Superuser".into(),
            exp: (chrono::Utc::now() + chrono::Duration::minutes(5)).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &state.encoding).unwrap();
        assert!(matches!(
            state.authenticate(&token),
            Err(AuthError::UnknownRole(role)) if role == "Superuser"
        ));
    }
}
