//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::storage::UserRecord;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    #[serde(rename = "isVerified")]
    pub is_verified: Option<bool>,
    /// Optional seed challenge, stored as the initial live OTP.
    pub otp: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
}

impl From<&UserRecord> for UserResponse {
    // The password hash is deliberately not part of the response type.
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id.to_string(),
            username: record.username.clone(),
            email: record.email.clone(),
            role: record.role.clone(),
            is_verified: record.is_verified,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Acknowledgement {
    pub success: bool,
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct OtpRequest {
    pub otp: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub message: String,
    pub username: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionCheckResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl SessionCheckResponse {
    pub(super) fn invalid() -> Self {
        Self {
            valid: false,
            name: None,
            role: None,
        }
    }
}
