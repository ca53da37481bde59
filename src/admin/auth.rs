//! Admin API authentication.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::admin::AdminState;
use crate::auth::{passwords::PasswordError, AuthError, Principal};

/// Requires `Authorization: Bearer <token | api key>` once credentials exist.
///
/// Checks run against the cached auth state; the settings store is not read.
pub async fn admin_auth_middleware(
    State(state): State<AdminState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let bearer = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match state.auth.authorize(bearer) {
        Ok(principal) => {
            if let Principal::User(id) = &principal {
                tracing::debug!(user = %id, path = %request.uri().path(), "Authorized admin request");
            }
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::warn!(path = %request.uri().path(), error = %e, "Rejected admin request");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuthError::LoginExists => StatusCode::CONFLICT,
            AuthError::LoginEmpty | AuthError::PasswordTooShort => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::LoginNotFound
            | AuthError::UserDisabled
            | AuthError::MissingCredentials
            | AuthError::Password(PasswordError::Mismatch)
            | AuthError::Token(_) => StatusCode::UNAUTHORIZED,
            AuthError::Password(PasswordError::Encoding(_))
            | AuthError::Settings(_)
            | AuthError::SecretEncoding => {
                tracing::error!(error = %self, "Auth operation failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Auth operation failed").into_response();
            }
        };
        (status, self.to_string()).into_response()
    }
}
