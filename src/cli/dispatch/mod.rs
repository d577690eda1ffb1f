//! Command-line argument dispatch and server initialization.
//!
//! This module maps validated CLI arguments to the appropriate action, such
//! as starting the API server with its full configuration state.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::auth;
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        session_secret: SecretString::from(auth_opts.session_secret),
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        otp_ttl_seconds: auth_opts.otp_ttl_seconds,
        cookie_secure: auth_opts.cookie_secure,
        allowed_origins: auth_opts.allowed_origins,
        otp_endpoint: auth_opts.otp_endpoint,
        otp_api_key: auth_opts.otp_api_key.map(SecretString::from),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn session_secret_required() {
        temp_env::with_vars(
            [
                ("GARDI_SESSION_SECRET", None::<&str>),
                (
                    "GARDI_DSN",
                    Some("postgres://user@localhost:5432/gardi"),
                ),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.try_get_matches_from(vec!["gardi"]);
                // clap enforces required=true before dispatch runs
                assert!(matches.is_err());
            },
        );
    }

    #[test]
    fn server_action_from_matches() {
        temp_env::with_vars(
            [
                ("GARDI_SESSION_SECRET", Some("sekrit")),
                (
                    "GARDI_DSN",
                    Some("postgres://user@localhost:5432/gardi"),
                ),
                ("GARDI_OTP_ENDPOINT", Some("https://mailer.internal/otp")),
                ("GARDI_OTP_API_KEY", Some("key")),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec!["gardi"]);
                let action = handler(&matches).expect("server action");
                let Action::Server(args) = action;
                assert_eq!(args.port, 8080);
                assert_eq!(args.session_secret.expose_secret(), "sekrit");
                assert_eq!(args.session_ttl_seconds, 259_200);
                assert_eq!(args.otp_ttl_seconds, 600);
                assert_eq!(
                    args.otp_endpoint.as_deref(),
                    Some("https://mailer.internal/otp")
                );
            },
        );
    }
}
