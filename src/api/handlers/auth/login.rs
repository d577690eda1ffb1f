//! Login (password step) endpoint.
//!
//! Success here never returns a session token: it only advances the state
//! machine to "challenge issued" and acknowledges that the code went out.

use axum::{
    extract::Extension,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{debug, error};

use crate::api::email::OtpMessage;

use super::errors::AuthError;
use super::otp;
use super::password;
use super::state::AuthState;
use super::types::{Acknowledgement, LoginRequest};

#[utoipa::path(
    post,
    path = "/api/verifyLogin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "OTP issued and sent", body = Acknowledgement),
        (status = 404, description = "Unknown email or wrong password"),
        (status = 500, description = "Store or delivery unavailable")
    ),
    tag = "auth"
)]
pub async fn login(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Response, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    let email = request.email.unwrap_or_default();
    let password = request.password.unwrap_or_default();

    let Some(user) = state.store().find_by_email(&email).await? else {
        debug!("login attempt for unknown email");
        return Err(AuthError::NotFound("Invalid email".to_string()));
    };

    if !password::verify(&password, &user.password_hash) {
        debug!("password mismatch for user {}", user.id);
        return Err(AuthError::Authentication("Invalid Password".to_string()));
    }

    // Overwrites any previous unconsumed challenge for this user.
    let code = otp::generate();

    // Write-before-ack: the challenge must be durable before the caller
    // hears anything, and before delivery is attempted.
    state.store().set_otp(user.id, &code).await?;

    let message = OtpMessage {
        to_email: user.email.clone(),
        code,
    };
    state.sender().deliver(&message).await.map_err(|err| {
        // The persisted challenge stays live for an out-of-band retry.
        error!("failed to deliver OTP to {}: {err:?}", user.id);
        AuthError::Dependency(err)
    })?;

    Ok(Json(Acknowledgement {
        success: true,
        message: "OTP sent to email successfully".to_string(),
    })
    .into_response())
}
