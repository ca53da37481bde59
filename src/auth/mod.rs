//! Admin users, passwords and session tokens.
//!
//! # Data Flow
//! ```text
//! POST /login {login, password}
//!     → UserManager::try_sign_in → user id
//!     → AuthManager::issue_token → HS256 token (2h)
//! Authorization: Bearer <token | api key>
//!     → AuthManager::authorize → Principal
//! ```
//!
//! # Design Decisions
//! - Everything persists through the settings store: `users` holds the
//!   accounts, `auth` the token secret, `admin` the static API key
//! - Sections are read once and cached; request checks never touch the store
//! - A missing token secret is generated and saved on first start
//! - With no users and no API key the admin API is open, so the first
//!   account can be created

pub mod passwords;
pub mod tokens;
pub mod users;

use base64::{engine::general_purpose::STANDARD, Engine};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;

use self::passwords::PasswordError;
use self::tokens::{Claims, TokenError};
use self::users::UserManager;
use crate::settings::{SettingsError, Store};

/// Settings section holding the token secret.
pub const AUTH_SECTION: &str = "auth";

/// Settings section holding the static admin API key.
pub const CREDENTIALS_SECTION: &str = "admin";

const SECRET_BYTES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("login already exists")]
    LoginExists,
    #[error("login is empty")]
    LoginEmpty,
    #[error("user login not found")]
    LoginNotFound,
    #[error("password too short")]
    PasswordTooShort,
    #[error("user not found")]
    UserNotFound,
    #[error("user is disabled")]
    UserDisabled,
    #[error("missing credentials")]
    MissingCredentials,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("auth settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("auth settings: token secret is not base64")]
    SecretEncoding,
}

/// Contents of the `admin` settings section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub api_key: String,
}

/// Contents of the `auth` settings section.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AuthSettings {
    /// Standard base64.
    jwt_secret: String,
}

/// Who an admin request was authorized as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// No credentials are configured.
    Anonymous,
    /// The static API key.
    ApiKey,
    /// An enabled user, by id.
    User(String),
}

struct Secrets {
    jwt_secret: Vec<u8>,
    api_key: Option<String>,
}

pub struct AuthManager {
    store: Arc<dyn Store>,
    users: UserManager,
    secrets: RwLock<Secrets>,
}

impl AuthManager {
    /// Load accounts and secrets, generating the token secret if missing.
    pub fn new(store: Arc<dyn Store>) -> Result<Self, AuthError> {
        let users = UserManager::new(store.clone())?;
        let secrets = load_secrets(store.as_ref())?;
        Ok(Self {
            store,
            users,
            secrets: RwLock::new(secrets),
        })
    }

    pub fn users(&self) -> &UserManager {
        &self.users
    }

    /// Re-read accounts and secrets from the store.
    pub fn reload(&self) -> Result<(), AuthError> {
        self.users.reload()?;
        let secrets = load_secrets(self.store.as_ref())?;
        *self.secrets.write() = secrets;
        tracing::info!("Auth settings reloaded");
        Ok(())
    }

    /// Signed token naming `user_id` as its subject.
    pub fn issue_token(&self, user_id: &str) -> Result<String, AuthError> {
        let claims = Claims::for_user(user_id, tokens::now());
        Ok(tokens::encode(&self.secrets.read().jwt_secret, &claims)?)
    }

    /// User id carried by a valid token.
    pub fn process_token(&self, token: &str) -> Result<String, AuthError> {
        let claims = tokens::decode(&self.secrets.read().jwt_secret, token, tokens::now())?;
        Ok(claims.sub)
    }

    /// Check credentials and sign in.
    pub fn sign_in(&self, login: &str, password: &str) -> Result<String, AuthError> {
        let id = self.users.try_sign_in(login, password)?;
        self.issue_token(&id)
    }

    /// Whether admin requests need credentials at all.
    pub fn is_open(&self) -> bool {
        self.secrets.read().api_key.is_none() && self.users.is_empty()
    }

    /// Resolve a bearer credential to a principal.
    ///
    /// Tokens of deleted or disabled users are refused even before they expire.
    pub fn authorize(&self, bearer: Option<&str>) -> Result<Principal, AuthError> {
        if self.is_open() {
            return Ok(Principal::Anonymous);
        }
        let bearer = bearer.ok_or(AuthError::MissingCredentials)?;

        let api_key_matches = self
            .secrets
            .read()
            .api_key
            .as_deref()
            .is_some_and(|key| constant_time_eq(key.as_bytes(), bearer.as_bytes()));
        if api_key_matches {
            return Ok(Principal::ApiKey);
        }

        let id = self.process_token(bearer)?;
        if !self.users.is_enabled(&id)? {
            return Err(AuthError::UserDisabled);
        }
        Ok(Principal::User(id))
    }
}

fn load_secrets(store: &dyn Store) -> Result<Secrets, AuthError> {
    let jwt_secret = match store.load::<AuthSettings>(AUTH_SECTION) {
        Ok(settings) => STANDARD
            .decode(settings.jwt_secret)
            .map_err(|_| AuthError::SecretEncoding)?,
        Err(SettingsError::NotFound(_)) => {
            let secret: [u8; SECRET_BYTES] = rand::random();
            store.save(AUTH_SECTION, &AuthSettings { jwt_secret: STANDARD.encode(secret) })?;
            tracing::info!("Generated token signing secret");
            secret.to_vec()
        }
        Err(e) => return Err(e.into()),
    };

    let api_key = match store.load::<AdminCredentials>(CREDENTIALS_SECTION) {
        Ok(credentials) => Some(credentials.api_key),
        Err(SettingsError::NotFound(_)) => None,
        Err(e) => return Err(e.into()),
    };

    Ok(Secrets { jwt_secret, api_key })
}

/// `len` random bytes as lowercase hex.
pub(crate) fn random_hex(len: usize) -> String {
    let bytes: Vec<u8> = (0..len).map(|_| rand::random::<u8>()).collect();
    bytes.iter().fold(String::with_capacity(len * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
