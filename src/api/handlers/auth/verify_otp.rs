//! Challenge verification endpoint.
//!
//! Lookup is by challenge value alone; "wrong code" and "no pending
//! challenge" are deliberately indistinguishable to the caller.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use super::errors::AuthError;
use super::session::session_cookie;
use super::state::AuthState;
use super::types::{OtpRequest, VerifyOtpResponse};

#[utoipa::path(
    post,
    path = "/api/verifyOTP",
    request_body = OtpRequest,
    responses(
        (status = 200, description = "Challenge consumed, session issued", body = VerifyOtpResponse),
        (status = 404, description = "No live challenge matches the code"),
        (status = 500, description = "Store unavailable")
    ),
    tag = "auth"
)]
pub async fn verify_otp(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<OtpRequest>>,
) -> Result<Response, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    let code = request.otp.unwrap_or_default();
    let code = code.trim();
    if code.is_empty() {
        return Err(AuthError::NotFound("Invalid OTP or email".to_string()));
    }

    // Compare-and-clear: consumption is the sole mutation that ends the
    // pending-challenge state, and it happens atomically in the store.
    let Some(user) = state
        .store()
        .consume_otp(code, state.config().otp_ttl())
        .await?
    else {
        return Err(AuthError::NotFound("Invalid OTP or email".to_string()));
    };

    let token = state.signer().mint(user.id)?;
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        session_cookie(state.config(), &token).map_err(anyhow::Error::from)?,
    );

    let body = Json(VerifyOtpResponse {
        success: true,
        message: "OTP verified successfully".to_string(),
        username: user.username,
    });

    Ok((headers, body).into_response())
}
