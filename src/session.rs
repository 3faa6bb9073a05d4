//! Admin session token codec and cookie handling.
//!
//! The token is `base64("<issued-at-millis>-<admin-secret>")`, held only
//! in the browser's cookie jar. The server keeps just the comparison
//! secret, read from configuration at startup. This is a shared-secret
//! membership check, not a signed token: anyone holding the admin
//! secret can forge a token with any timestamp. That is an accepted
//! simplification for a single-operator deployment.

use axum::http::{header, HeaderMap};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// Cookie carrying the admin session token.
pub const SESSION_COOKIE: &str = "admin_session";

/// Session lifetime: 24 hours.
pub const SESSION_TTL_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Cookie Max-Age in seconds, matching the token lifetime.
const COOKIE_MAX_AGE_SECS: i64 = SESSION_TTL_MILLIS / 1000;

/// Outcome of validating a session token.
///
/// Everything except `Valid` fails closed at the guard; `Expired` is
/// distinguished only so the guard can clear the dead cookie and tell
/// the login page why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Valid,
    Expired,
    Malformed,
    Absent,
}

impl SessionStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, SessionStatus::Valid)
    }
}

/// Mint a session token for a successful login.
pub fn issue_token(admin_secret: &str, now_millis: i64) -> String {
    BASE64.encode(format!("{}-{}", now_millis, admin_secret))
}

/// Validate a token against the 24h window.
///
/// A token is `Valid` only if it base64-decodes to UTF-8, splits into
/// at least two hyphen-delimited parts, the first part parses as a
/// base-10 integer, and the issue time is within the TTL of `now`.
pub fn validate_token(token: Option<&str>, now_millis: i64) -> SessionStatus {
    let token = match token {
        Some(t) if !t.is_empty() => t,
        _ => return SessionStatus::Absent,
    };

    let decoded = match BASE64.decode(token) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(_) => return SessionStatus::Malformed,
        },
        Err(_) => return SessionStatus::Malformed,
    };

    let mut parts = decoded.splitn(2, '-');
    let issued_at = match (parts.next(), parts.next()) {
        (Some(ts), Some(_secret)) => ts,
        _ => return SessionStatus::Malformed,
    };

    let issued_at_millis: i64 = match issued_at.parse() {
        Ok(ms) => ms,
        Err(_) => return SessionStatus::Malformed,
    };

    if now_millis - issued_at_millis > SESSION_TTL_MILLIS {
        SessionStatus::Expired
    } else {
        SessionStatus::Valid
    }
}

/// Set-Cookie value that installs a session token.
///
/// HttpOnly + SameSite=Strict always; `Secure` only when the deployment
/// says so (production behind TLS).
pub fn session_cookie(token: &str, secure: bool) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}{}",
        SESSION_COOKIE,
        token,
        COOKIE_MAX_AGE_SECS,
        if secure { "; Secure" } else { "" }
    )
}

/// Set-Cookie value that revokes the session: empty value, zero max-age.
pub fn clear_cookie(secure: bool) -> String {
    format!(
        "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0{}",
        SESSION_COOKIE,
        if secure { "; Secure" } else { "" }
    )
}

/// Extract the session token from the request `Cookie` header.
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|part| {
            let part = part.trim();
            part.strip_prefix("admin_session=")
                .map(|value| value.to_string())
        })
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
