//! Sign-in and user management routes.
//!
//! # Design Decisions
//! - Store writes can block, so changes run on the blocking pool
//! - Sign-in failures all look alike to the caller
//! - A PATCH applies login, then password, then enabled, stopping at the
//!   first rejected field

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::admin::AdminState;
use crate::auth::{passwords::PasswordError, users::UserInfo, AuthError, AuthManager};

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedUser {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserChanges {
    pub login: Option<String>,
    pub password: Option<String>,
    pub enabled: Option<bool>,
}

/// Exchange a login and password for a session token.
pub async fn login(State(state): State<AdminState>, Json(credentials): Json<Credentials>) -> Response {
    match state.auth.sign_in(&credentials.login, &credentials.password) {
        Ok(token) => {
            tracing::info!(login = %credentials.login, "Admin user signed in");
            Json(TokenResponse { token }).into_response()
        }
        Err(
            AuthError::LoginNotFound
            | AuthError::UserDisabled
            | AuthError::Password(PasswordError::Mismatch),
        ) => {
            tracing::warn!(login = %credentials.login, "Failed sign-in attempt");
            (StatusCode::UNAUTHORIZED, "Invalid login or password").into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn list_users(State(state): State<AdminState>) -> Json<Vec<UserInfo>> {
    Json(state.auth.users().list())
}

pub async fn get_user(State(state): State<AdminState>, Path(id): Path<String>) -> Response {
    let users = state.auth.users();
    let info = users.login(&id).and_then(|login| {
        let enabled = users.is_enabled(&id)?;
        Ok(UserInfo { id, login, enabled })
    });
    match info {
        Ok(info) => Json(info).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_user(State(state): State<AdminState>, Json(credentials): Json<Credentials>) -> Response {
    let result = blocking(state.auth, move |auth| {
        auth.users().create(&credentials.login, &credentials.password)
    })
    .await;

    match result {
        Ok(id) => {
            tracing::info!(user = %id, "Admin user created");
            (StatusCode::CREATED, Json(CreatedUser { id })).into_response()
        }
        Err(response) => response,
    }
}

pub async fn update_user(
    State(state): State<AdminState>,
    Path(id): Path<String>,
    Json(changes): Json<UserChanges>,
) -> Response {
    let result = blocking(state.auth, move |auth| {
        let users = auth.users();
        if let Some(login) = &changes.login {
            users.set_login(&id, login)?;
        }
        if let Some(password) = &changes.password {
            users.set_password(&id, password)?;
        }
        if let Some(enabled) = changes.enabled {
            users.set_enabled(&id, enabled)?;
        }
        users.login(&id).map(|_| ())
    })
    .await;

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(response) => response,
    }
}

pub async fn delete_user(State(state): State<AdminState>, Path(id): Path<String>) -> Response {
    let result = blocking(state.auth, move |auth| auth.users().delete(&id)).await;
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(response) => response,
    }
}

async fn blocking<T, F>(auth: Arc<AuthManager>, f: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&AuthManager) -> Result<T, AuthError> + Send + 'static,
{
    match tokio::task::spawn_blocking(move || f(&auth)).await {
        Ok(result) => result.map_err(IntoResponse::into_response),
        Err(e) => {
            tracing::error!(error = %e, "User operation panicked");
            Err(StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
    }
}
