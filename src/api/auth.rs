//! Admin login/logout/check handlers and the `/admin` route guard.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::errors::ApiError;
use super::AppState;
use crate::session::{
    clear_cookie, extract_session_token, issue_token, now_millis, session_cookie, validate_token,
    SessionStatus,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    secret_key: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    success: bool,
    message: String,
}

#[derive(Serialize)]
pub struct CheckResponse {
    authenticated: bool,
}

/// POST /api/auth/login — compare the provided secret, set the session
/// cookie on a match.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if body.secret_key.is_empty() {
        return Err(ApiError::MissingSecret);
    }

    let Some(ref admin_secret) = state.config.admin_secret else {
        error!("Admin secret is not configured; login cannot succeed");
        return Err(ApiError::ServerMisconfigured);
    };

    // Plain value comparison by design; see the session module notes.
    if body.secret_key != *admin_secret {
        warn!("Admin login attempt with wrong secret");
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(admin_secret, now_millis());
    let cookie = session_cookie(&token, state.config.secure_cookies);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        cookie.parse().map_err(|_| ApiError::ServerMisconfigured)?,
    );

    info!("Admin session issued");
    Ok((
        StatusCode::OK,
        headers,
        Json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
        }),
    )
        .into_response())
}

/// POST /api/auth/logout — overwrite the cookie with an empty value and
/// zero lifetime.
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    if let Ok(value) = clear_cookie(state.config.secure_cookies).parse() {
        headers.insert(header::SET_COOKIE, value);
    }

    (
        StatusCode::OK,
        headers,
        Json(LoginResponse {
            success: true,
            message: "Logged out successfully".to_string(),
        }),
    )
}

/// GET /api/auth/check — report whether the current session is valid.
/// An expired cookie is cleared here too, not just at the guard.
pub async fn check(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    let token = extract_session_token(&headers);
    let status = validate_token(token.as_deref(), now_millis());

    let mut resp_headers = HeaderMap::new();
    if status == SessionStatus::Expired {
        if let Ok(value) = clear_cookie(state.config.secure_cookies).parse() {
            resp_headers.insert(header::SET_COOKIE, value);
        }
    }

    (
        StatusCode::OK,
        resp_headers,
        Json(CheckResponse {
            authenticated: status.is_valid(),
        }),
    )
}

/// Middleware gating the `/admin` prefix.
///
/// Paths outside the prefix always pass, whatever the session state.
/// Inside it, anything but a valid token redirects to the login entry
/// point; the expired case additionally clears the dead cookie and
/// tells the login page why.
pub async fn guard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    if !request.uri().path().starts_with("/admin") {
        return next.run(request).await;
    }

    let token = extract_session_token(&headers);
    match validate_token(token.as_deref(), now_millis()) {
        SessionStatus::Valid => next.run(request).await,
        SessionStatus::Expired => {
            warn!("Expired admin session on {}", request.uri().path());
            let mut response =
                Redirect::to("/?showLogin=true&expired=true").into_response();
            if let Ok(value) = clear_cookie(state.config.secure_cookies).parse() {
                response.headers_mut().insert(header::SET_COOKIE, value);
            }
            response
        }
        SessionStatus::Malformed | SessionStatus::Absent => {
            Redirect::to("/?showLogin=true").into_response()
        }
    }
}
