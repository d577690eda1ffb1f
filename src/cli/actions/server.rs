use crate::api::{
    self,
    email::{HttpOtpSender, LogOtpSender, OtpSender},
    handlers::auth::AuthConfig,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::warn;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub session_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub otp_ttl_seconds: u64,
    pub cookie_secure: bool,
    pub allowed_origins: Vec<String>,
    pub otp_endpoint: Option<String>,
    pub otp_api_key: Option<SecretString>,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = AuthConfig::new()
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_otp_ttl_seconds(args.otp_ttl_seconds)
        .with_cookie_secure(args.cookie_secure);

    let sender: Arc<dyn OtpSender> = match args.otp_endpoint {
        Some(endpoint) => {
            let endpoint =
                Url::parse(&endpoint).context("invalid OTP delivery endpoint URL")?;
            let api_key = args.otp_api_key.unwrap_or_else(|| SecretString::from(""));
            Arc::new(HttpOtpSender::new(endpoint, api_key)?)
        }
        None => {
            // Local dev fallback: the code is logged instead of delivered.
            warn!("no OTP delivery endpoint configured, codes will be logged");
            Arc::new(LogOtpSender)
        }
    };

    api::new(
        args.port,
        args.dsn,
        auth_config,
        args.session_secret,
        args.allowed_origins,
        sender,
    )
    .await
}
