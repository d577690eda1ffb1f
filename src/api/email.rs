//! OTP delivery abstractions.
//!
//! The login flow persists the challenge first, then hands the code to an
//! `OtpSender`. The sender decides how to deliver (SMTP gateway, HTTP API,
//! etc.) and returns `Ok`/`Err`. A delivery failure never touches the
//! already-persisted challenge: the code stays live so the caller can retry
//! delivery out-of-band.
//!
//! The default sender for local dev is `LogOtpSender`, which logs the code
//! and returns `Ok(())`. Production deployments configure `HttpOtpSender`
//! with a provider endpoint and API key.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::info;
use url::Url;

#[derive(Clone, Debug)]
pub struct OtpMessage {
    pub to_email: String,
    pub code: String,
}

/// Delivery abstraction: deliver a code to an address, fail or succeed.
#[async_trait]
pub trait OtpSender: Send + Sync {
    /// Deliver a message or return an error.
    async fn deliver(&self, message: &OtpMessage) -> Result<()>;
}

/// Local dev sender that logs the code instead of sending it.
#[derive(Clone, Debug)]
pub struct LogOtpSender;

#[async_trait]
impl OtpSender for LogOtpSender {
    async fn deliver(&self, message: &OtpMessage) -> Result<()> {
        info!(
            to_email = %message.to_email,
            code = %message.code,
            "otp delivery stub"
        );
        Ok(())
    }
}

/// Sender that posts the code to a delivery provider over HTTPS.
#[derive(Clone, Debug)]
pub struct HttpOtpSender {
    endpoint: Url,
    api_key: SecretString,
    client: Client,
}

impl HttpOtpSender {
    /// Build a sender for the given provider endpoint.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(endpoint: Url, api_key: SecretString) -> Result<Self> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .build()
            .context("failed to create delivery client")?;

        Ok(Self {
            endpoint,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl OtpSender for HttpOtpSender {
    async fn deliver(&self, message: &OtpMessage) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_key.expose_secret())
            .json(&json!({
                "to": message.to_email,
                "code": message.code,
            }))
            .send()
            .await
            .context("failed to reach delivery provider")?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(anyhow!("delivery provider returned {status}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_sender_always_succeeds() {
        let sender = LogOtpSender;
        let message = OtpMessage {
            to_email: "a@x.com".to_string(),
            code: "482913".to_string(),
        };
        assert!(sender.deliver(&message).await.is_ok());
    }

    #[test]
    fn http_sender_builds_from_endpoint() {
        let endpoint = Url::parse("https://mailer.internal/otp").expect("url");
        let sender = HttpOtpSender::new(endpoint, SecretString::from("key"));
        assert!(sender.is_ok());
    }
}
