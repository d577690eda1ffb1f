//! Registration endpoint.
//!
//! Registration is a separate entry path into the state machine: it mints a
//! session directly, without an OTP challenge step.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::debug;

use crate::api::handlers::valid_email;

use super::errors::AuthError;
use super::password;
use super::session::session_cookie;
use super::state::AuthState;
use super::storage::NewUser;
use super::types::{RegisterRequest, RegisterResponse, UserResponse};

#[utoipa::path(
    post,
    path = "/api/registerUser",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = RegisterResponse),
        (status = 400, description = "Missing fields or email already registered"),
        (status = 500, description = "Store unavailable")
    ),
    tag = "auth"
)]
pub async fn register(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<Response, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::Validation("Missing payload".to_string()));
    };

    debug!("register request for {:?}", request.email);

    let email = request.email.unwrap_or_default();
    let password = request.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::Validation(
            "Email and Password required".to_string(),
        ));
    }
    if !valid_email(&email) {
        return Err(AuthError::Validation("Invalid email".to_string()));
    }

    // Pre-check keeps the common duplicate case cheap; the store's unique
    // constraint still closes the check-then-write race.
    if state.store().find_by_email(&email).await?.is_some() {
        return Err(AuthError::Conflict("User already exists".to_string()));
    }

    let password_hash = password::hash(&password)?;

    let record = state
        .store()
        .insert_user(NewUser {
            username: request.username.unwrap_or_default(),
            email,
            password_hash,
            role: request.role,
            is_verified: request.is_verified.unwrap_or(false),
            otp: request.otp,
        })
        .await?;

    let token = state.signer().mint(record.id)?;
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        session_cookie(state.config(), &token).map_err(anyhow::Error::from)?,
    );

    let body = Json(RegisterResponse {
        message: "User registered successfully".to_string(),
        user: UserResponse::from(&record),
    });

    Ok((StatusCode::CREATED, headers, body).into_response())
}
