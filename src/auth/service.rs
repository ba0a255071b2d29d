// Signup and login, independent of HTTP
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::auth::password::{self, PasswordError};
use crate::auth::tokens::TokenKeys;
use crate::db::models::UserRecord;
use crate::feed::{DynFeedRepository, NewUser, RepositoryError, ValidationError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("User exists")]
    UsernameTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Repository(RepositoryError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("token signing failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => AuthError::UsernameTaken,
            other => AuthError::Repository(other),
        }
    }
}

/// The identity returned to callers. Carries no credential material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub name: String,
}

impl From<UserRecord> for PublicUser {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
        }
    }
}

#[derive(Clone)]
pub struct AuthService {
    repo: DynFeedRepository,
    tokens: Arc<TokenKeys>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(repo: DynFeedRepository, tokens: Arc<TokenKeys>, bcrypt_cost: u32) -> Self {
        Self {
            repo,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn tokens(&self) -> &TokenKeys {
        &self.tokens
    }

    /// Register a new account.
    pub async fn signup(
        &self,
        username: &str,
        name: &str,
        password: &str,
    ) -> Result<PublicUser, AuthError> {
        let username = username.trim();
        let name = name.trim();
        if username.is_empty() || name.is_empty() || password.is_empty() {
            return Err(ValidationError::MissingFields.into());
        }

        if self.repo.find_user_by_username(username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = password::hash_password(password, self.bcrypt_cost).await?;

        // A concurrent signup can still win the race; the unique index reports it as Conflict
        let user = self
            .repo
            .create_user(&NewUser {
                username: username.to_string(),
                name: name.to_string(),
                password_hash,
            })
            .await?;

        Ok(user.into())
    }

    /// Check credentials and issue a bearer token.
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ValidationError::MissingFields.into());
        }

        let Some(user) = self.repo.find_user_by_username(username.trim()).await? else {
            password::verify_dummy(password, self.bcrypt_cost).await?;
            return Err(AuthError::InvalidCredentials);
        };

        if !password::verify_password(password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(self.tokens.issue(&user.id, &user.username)?)
    }
}
