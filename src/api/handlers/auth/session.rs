//! Session verification endpoint and cookie helpers.

use axum::{
    extract::Extension,
    http::{
        header::{InvalidHeaderValue, COOKIE},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::error;

use super::state::{AuthConfig, AuthState};
use super::types::SessionCheckResponse;

const SESSION_COOKIE_NAME: &str = "token";

/// Capability query over a presented session cookie.
///
/// This endpoint never raises: absent, malformed, foreign-signed, and
/// expired tokens are normal input and answer `{"valid": false}`. A store
/// failure is logged and also answers negatively rather than erroring.
#[utoipa::path(
    get,
    path = "/api/verifyUser",
    responses(
        (status = 200, description = "Verification result", body = SessionCheckResponse)
    ),
    tag = "auth"
)]
pub async fn verify_user(
    state: Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let Some(token) = extract_session_token(&headers) else {
        return Json(SessionCheckResponse::invalid());
    };

    let Some(user_id) = state.signer().verify(&token) else {
        return Json(SessionCheckResponse::invalid());
    };

    match state.store().find_by_id(user_id).await {
        Ok(Some(user)) => Json(SessionCheckResponse {
            valid: true,
            name: Some(user.username),
            role: user.role,
        }),
        Ok(None) => Json(SessionCheckResponse::invalid()),
        Err(err) => {
            error!("session lookup failed: {err}");
            Json(SessionCheckResponse::invalid())
        }
    }
}

/// Build the `HttpOnly` cookie carrying the session token.
pub(super) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == SESSION_COOKIE_NAME {
            return Some(val.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_has_expected_attributes() {
        let config = AuthConfig::new().with_session_ttl_seconds(259_200);
        let cookie = session_cookie(&config, "abc").expect("cookie");
        let cookie = cookie.to_str().expect("ascii");
        assert!(cookie.starts_with("token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=259200"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn secure_flag_is_policy_driven() {
        let config = AuthConfig::new().with_cookie_secure(true);
        let cookie = session_cookie(&config, "abc").expect("cookie");
        assert!(cookie.to_str().expect("ascii").ends_with("; Secure"));
    }

    #[test]
    fn extract_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; token=abc123; lang=eo"),
        );
        assert_eq!(extract_session_token(&headers), Some("abc123".to_string()));
    }

    #[test]
    fn missing_cookie_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(extract_session_token(&headers), None);
    }
}
