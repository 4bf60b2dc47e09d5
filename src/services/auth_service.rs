//! Authentication service - Registration, login and request identity.
//!
//! Tokens carry only the account id. Roles and the agent profile are
//! read from the store each time a token is resolved, so grants and
//! revocations apply to the very next request.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{normalize_email, Password, Principal, RegisterUser, Role, User, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::infra::{NewAccount, UnitOfWork};

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account holding the default `user` role
    async fn register(&self, request: RegisterUser) -> AppResult<UserResponse>;

    /// Login and return JWT token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Resolve a bearer token to the account and its current roles.
    ///
    /// Unknown or deactivated accounts are `Unauthorized`.
    async fn authenticate(&self, token: &str) -> AppResult<Principal>;
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    fn issue_token(&self, user: &User) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.jwt_expiration_hours);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret_bytes()),
        )?;

        Ok(TokenResponse {
            access_token: token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.jwt_expiration_hours * SECONDS_PER_HOUR,
        })
    }
}

/// Verified against when the email is unknown so both failure paths cost the same.
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$ZHVtbXlzYWx0MTIzNDU2$3vV0cJ5GQ0bq2qHk0Yp1tKk3Zr0yQmH7m3K1fJvYw2c";

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, request: RegisterUser) -> AppResult<UserResponse> {
        request.check()?;

        let email = normalize_email(&request.email);
        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User with this email"));
        }

        let account = NewAccount {
            email,
            password_hash: Password::new(&request.password)?.into_string(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            phone_number: request
                .phone_number
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
        };

        let (user, roles) = self
            .uow
            .transaction(move |tx| {
                Box::pin(async move {
                    let accounts = tx.accounts();
                    let user = accounts.create_user(account).await.map_err(|e| match e {
                        AppError::Conflict(_) => AppError::conflict("User with this email"),
                        other => other,
                    })?;
                    accounts.grant_role(user.id, Role::User).await?;
                    let roles = accounts.roles(user.id).await?;
                    Ok((user, roles))
                })
            })
            .await?;

        tracing::info!(user_id = %user.id, "Account registered");
        Ok(UserResponse::new(user, &roles))
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self
            .uow
            .users()
            .find_by_email(&normalize_email(&email))
            .await?
            .filter(|u| u.is_active);

        let stored = match &user {
            Some(user) => Password::from_hash(user.password_hash.as_str()),
            None => Password::from_hash(DUMMY_HASH),
        };
        let password_valid = stored.verify(&password);

        match user {
            Some(user) if password_valid => self.issue_token(&user),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn authenticate(&self, token: &str) -> AppResult<Principal> {
        let claims = self.verify_token(token)?;
        let users = self.uow.users();

        let user = users
            .find_by_id(claims.sub)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::Unauthorized)?;

        Ok(Principal {
            user_id: user.id,
            roles: users.roles(user.id).await?,
            agent_id: users.agent_id(user.id).await?,
        })
    }
}
