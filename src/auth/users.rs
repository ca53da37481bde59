//! Admin user accounts persisted in the `users` settings section.
//!
//! # Responsibilities
//! - Create, rename, disable and delete users
//! - Store passwords only as salted hashes
//! - Check sign-in attempts
//!
//! # Design Decisions
//! - The section maps a random hex id to `{login, password, is_enabled}`
//! - A missing section means no users yet
//! - Every change is written to the store before it becomes visible; a
//!   failed write leaves the in-memory accounts untouched
//! - Logins are unique and non-empty; passwords need at least eight bytes

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::passwords::{check_password, encode_password, verify_encoding};
use crate::auth::{random_hex, AuthError};
use crate::settings::{SettingsError, Store};

/// Settings section holding the accounts.
pub const USERS_SECTION: &str = "users";

pub const MIN_PASSWORD_LEN: usize = 8;

const ID_BYTES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct UserRecord {
    login: String,
    password: String,
    is_enabled: bool,
}

/// Public view of an account, without its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub login: String,
    pub enabled: bool,
}

type Accounts = HashMap<String, UserRecord>;

pub struct UserManager {
    store: Arc<dyn Store>,
    users: RwLock<Accounts>,
}

impl UserManager {
    pub fn new(store: Arc<dyn Store>) -> Result<Self, AuthError> {
        let users = load_accounts(store.as_ref())?;
        Ok(Self {
            store,
            users: RwLock::new(users),
        })
    }

    /// Re-read the accounts from the store.
    pub fn reload(&self) -> Result<(), AuthError> {
        let users = load_accounts(self.store.as_ref())?;
        *self.users.write() = users;
        Ok(())
    }

    /// Create an enabled user and return its id.
    pub fn create(&self, login: &str, password: &str) -> Result<String, AuthError> {
        self.update(|users| {
            check_login(users, login)?;
            Self::validate_password(password)?;

            let id = loop {
                let id = random_hex(ID_BYTES);
                if !users.contains_key(&id) {
                    break id;
                }
            };
            users.insert(
                id.clone(),
                UserRecord {
                    login: login.to_string(),
                    password: encode_password(password),
                    is_enabled: true,
                },
            );
            Ok(id)
        })
    }

    pub fn delete(&self, id: &str) -> Result<(), AuthError> {
        self.update(|users| users.remove(id).map(|_| ()).ok_or(AuthError::UserNotFound))
    }

    pub fn id_by_login(&self, login: &str) -> Result<String, AuthError> {
        find_by_login(&self.users.read(), login)
            .map(|(id, _)| id.clone())
            .ok_or(AuthError::LoginNotFound)
    }

    pub fn login(&self, id: &str) -> Result<String, AuthError> {
        self.with_user(id, |user| user.login.clone())
    }

    pub fn is_enabled(&self, id: &str) -> Result<bool, AuthError> {
        self.with_user(id, |user| user.is_enabled)
    }

    pub fn set_password(&self, id: &str, password: &str) -> Result<(), AuthError> {
        self.update(|users| {
            let user = users.get_mut(id).ok_or(AuthError::UserNotFound)?;
            Self::validate_password(password)?;
            user.password = encode_password(password);
            Ok(())
        })
    }

    pub fn set_login(&self, id: &str, login: &str) -> Result<(), AuthError> {
        self.update(|users| {
            if !users.contains_key(id) {
                return Err(AuthError::UserNotFound);
            }
            check_login(users, login)?;
            if let Some(user) = users.get_mut(id) {
                user.login = login.to_string();
            }
            Ok(())
        })
    }

    pub fn set_enabled(&self, id: &str, enabled: bool) -> Result<(), AuthError> {
        self.update(|users| {
            let user = users.get_mut(id).ok_or(AuthError::UserNotFound)?;
            user.is_enabled = enabled;
            Ok(())
        })
    }

    /// Id of the enabled user with these credentials.
    pub fn try_sign_in(&self, login: &str, password: &str) -> Result<String, AuthError> {
        let users = self.users.read();
        let (id, user) = find_by_login(&users, login).ok_or(AuthError::LoginNotFound)?;
        if !user.is_enabled {
            return Err(AuthError::UserDisabled);
        }
        check_password(&user.password, password)?;
        Ok(id.clone())
    }

    /// Checks that `login` could be given to a user.
    pub fn validate_login(&self, login: &str) -> Result<(), AuthError> {
        check_login(&self.users.read(), login)
    }

    pub fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }
        Ok(())
    }

    /// All accounts, ordered by login.
    pub fn list(&self) -> Vec<UserInfo> {
        let mut list: Vec<UserInfo> = self
            .users
            .read()
            .iter()
            .map(|(id, user)| UserInfo {
                id: id.clone(),
                login: user.login.clone(),
                enabled: user.is_enabled,
            })
            .collect();
        list.sort_by(|a, b| a.login.cmp(&b.login));
        list
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    fn with_user<T>(&self, id: &str, f: impl FnOnce(&UserRecord) -> T) -> Result<T, AuthError> {
        self.users.read().get(id).map(f).ok_or(AuthError::UserNotFound)
    }

    /// Apply `change` to a copy of the accounts, persist it, then publish it.
    fn update<T>(&self, change: impl FnOnce(&mut Accounts) -> Result<T, AuthError>) -> Result<T, AuthError> {
        let mut users = self.users.write();
        let mut next = users.clone();
        let result = change(&mut next)?;
        self.store.save(USERS_SECTION, &next)?;
        *users = next;
        Ok(result)
    }
}

fn load_accounts(store: &dyn Store) -> Result<Accounts, AuthError> {
    let users = match store.load::<Accounts>(USERS_SECTION) {
        Ok(users) => users,
        Err(SettingsError::NotFound(_)) => Accounts::new(),
        Err(e) => return Err(e.into()),
    };

    for (id, user) in &users {
        if let Err(e) = verify_encoding(&user.password) {
            tracing::warn!(id = %id, login = %user.login, error = %e, "User has an unusable password hash");
        }
    }
    tracing::debug!(count = users.len(), "User accounts loaded");
    Ok(users)
}

fn find_by_login<'a>(users: &'a Accounts, login: &str) -> Option<(&'a String, &'a UserRecord)> {
    users.iter().find(|(_, user)| user.login == login)
}

fn check_login(users: &Accounts, login: &str) -> Result<(), AuthError> {
    if login.is_empty() {
        return Err(AuthError::LoginEmpty);
    }
    if find_by_login(users, login).is_some() {
        return Err(AuthError::LoginExists);
    }
    Ok(())
}
