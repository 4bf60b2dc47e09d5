//! JWT authentication middleware.
//!
//! Every request gets an `Actor` in its extensions: anonymous without an
//! `Authorization` header, the resolved principal otherwise. A header
//! that does not carry a valid token is rejected outright.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::Actor;
use crate::errors::AppError;

/// Resolve the bearer token, if any, into the request's `Actor`.
///
/// Roles are re-read from the store on every request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let actor = match request.headers().get(AUTHORIZATION) {
        None => Actor::Anonymous,
        Some(value) => {
            let token = value
                .to_str()
                .ok()
                .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
                .ok_or(AppError::Unauthorized)?;
            let principal = state.services.auth().authenticate(token.trim()).await?;
            Actor::User(principal)
        }
    };

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

/// Reject anonymous requests; mount after `auth_middleware`.
pub async fn require_auth(request: Request, next: Next) -> Result<Response, AppError> {
    match request.extensions().get::<Actor>() {
        Some(Actor::User(_)) => Ok(next.run(request).await),
        _ => Err(AppError::Unauthorized),
    }
}

/// The acting user as resolved by `auth_middleware`
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentActor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = parts
            .extensions
            .get::<Actor>()
            .cloned()
            .unwrap_or(Actor::Anonymous);
        Ok(CurrentActor(actor))
    }
}

/// Like `CurrentActor`, but anonymous requests are rejected with 401.
#[derive(Debug, Clone)]
pub struct SignedIn(pub Actor);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for SignedIn {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Actor>() {
            Some(actor @ Actor::User(_)) => Ok(SignedIn(actor.clone())),
            _ => Err(AppError::Unauthorized),
        }
    }
}
