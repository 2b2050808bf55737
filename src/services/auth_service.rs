//! Domain service for authentication and user management.
//!
//! Handles password login, access-token issuance and bearer-token resolution.
//! Every failure that concerns credentials collapses into one outward-facing
//! error at the HTTP boundary; the variants here keep the cause for logging.

use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::config::SecurityConfig;
use crate::constants::limits::MAX_LOGIN_LEN;
use crate::db::Repository;
use crate::models::User;
use crate::services::password::PasswordHasher;
use crate::services::token::{TokenError, TokenIssuer};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No such user")]
    NoSuchUser,

    #[error("Bad password")]
    BadPassword,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Token subject does not exist")]
    UnknownSubject,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("User {0} already exists")]
    AlreadyExists(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl AuthError {
    /// True for wrong login or wrong password.
    #[must_use]
    pub const fn is_bad_credentials(&self) -> bool {
        matches!(self, Self::NoSuchUser | Self::BadPassword)
    }

    /// True for anything that should read as "could not validate credentials".
    #[must_use]
    pub const fn is_bad_token(&self) -> bool {
        matches!(self, Self::Token(_) | Self::UnknownSubject)
    }
}

pub struct AuthService {
    repo: Arc<dyn Repository>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    /// Verified against when the login is unknown, so both failure paths pay
    /// for one Argon2 run.
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        repo: Arc<dyn Repository>,
        hasher: PasswordHasher,
        tokens: TokenIssuer,
    ) -> anyhow::Result<Self> {
        let dummy_hash = hasher.hash(&uuid::Uuid::new_v4().to_string())?;
        Ok(Self {
            repo,
            hasher,
            tokens,
            dummy_hash,
        })
    }

    pub fn from_config(repo: Arc<dyn Repository>, config: &SecurityConfig) -> anyhow::Result<Self> {
        Self::new(
            repo,
            PasswordHasher::new(config)?,
            TokenIssuer::from_config(config),
        )
    }

    #[must_use]
    pub const fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Looks up `login` exactly and checks `password` against its hash.
    ///
    /// # Errors
    ///
    /// [`AuthError::NoSuchUser`] or [`AuthError::BadPassword`].
    pub async fn authenticate(&self, login: &str, password: &str) -> Result<User, AuthError> {
        let Some(user) = self.repo.find_user_by_login(login).await? else {
            PasswordHasher::verify_blocking(password, &self.dummy_hash).await?;
            return Err(AuthError::NoSuchUser);
        };

        if !PasswordHasher::verify_blocking(password, &user.password).await? {
            return Err(AuthError::BadPassword);
        }

        Ok(user)
    }

    /// Authenticates and issues an access token scoped to the user's login.
    pub async fn login(&self, login: &str, password: &str) -> Result<String, AuthError> {
        let user = self.authenticate(login, password).await?;
        let token = self.tokens.issue(&user.login)?;
        debug!("Issued access token for {}", user.login);
        Ok(token)
    }

    /// Verifies a bearer token and loads the user it names.
    pub async fn resolve_bearer(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.verify(token)?;

        self.repo
            .find_user_by_login(claims.subject())
            .await?
            .ok_or(AuthError::UnknownSubject)
    }

    /// Creates a user with a freshly hashed password.
    pub async fn register(&self, login: &str, password: &str) -> Result<User, AuthError> {
        validate_login(login)?;
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }

        let user = User {
            login: login.to_string(),
            password: self.hasher.hash_blocking(password).await?,
        };

        if !self.repo.insert_user(&user).await? {
            return Err(AuthError::AlreadyExists(login.to_string()));
        }

        Ok(user)
    }
}

fn validate_login(login: &str) -> Result<(), AuthError> {
    if login.is_empty() {
        return Err(AuthError::Validation("Login is required".to_string()));
    }

    if login.chars().count() > MAX_LOGIN_LEN {
        return Err(AuthError::Validation(format!(
            "Login must be {MAX_LOGIN_LEN} characters or less"
        )));
    }

    if login.chars().any(char::is_whitespace) {
        return Err(AuthError::Validation(
            "Login cannot contain whitespace".to_string(),
        ));
    }

    Ok(())
}
