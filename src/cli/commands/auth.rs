use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

pub fn with_args(command: Command) -> Command {
    let command = with_session_args(command);
    let command = with_origin_args(command);
    with_delivery_args(command)
}

fn with_session_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("session-secret")
                .long("session-secret")
                .help("Secret used to sign session tokens")
                .env("GARDI_SESSION_SECRET")
                .required(true),
        )
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Session token and cookie TTL in seconds")
                .env("GARDI_SESSION_TTL_SECONDS")
                .default_value("259200")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("otp-ttl-seconds")
                .long("otp-ttl-seconds")
                .help("Maximum age of an unconsumed OTP challenge in seconds")
                .env("GARDI_OTP_TTL_SECONDS")
                .default_value("600")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("cookie-secure")
                .long("cookie-secure")
                .help("Mark the session cookie as Secure (HTTPS deployments)")
                .env("GARDI_COOKIE_SECURE")
                .action(clap::ArgAction::SetTrue),
        )
}

fn with_origin_args(command: Command) -> Command {
    command.arg(
        Arg::new("allowed-origin")
            .long("allowed-origin")
            .help("Origin allowed to call the API with credentials (repeatable)")
            .env("GARDI_ALLOWED_ORIGINS")
            .value_delimiter(',')
            .action(clap::ArgAction::Append)
            .default_value("http://localhost:3000"),
    )
}

fn with_delivery_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("otp-endpoint")
                .long("otp-endpoint")
                .help("Delivery provider endpoint for OTP messages (logs the code when unset)")
                .env("GARDI_OTP_ENDPOINT"),
        )
        .arg(
            Arg::new("otp-api-key")
                .long("otp-api-key")
                .help("Delivery provider API key")
                .env("GARDI_OTP_API_KEY"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub session_secret: String,
    pub session_ttl_seconds: i64,
    pub otp_ttl_seconds: u64,
    pub cookie_secure: bool,
    pub allowed_origins: Vec<String>,
    pub otp_endpoint: Option<String>,
    pub otp_api_key: Option<String>,
}

impl Options {
    /// Extract auth options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            session_secret: matches
                .get_one::<String>("session-secret")
                .cloned()
                .context("missing required argument: --session-secret")?,
            session_ttl_seconds: matches
                .get_one::<i64>("session-ttl-seconds")
                .copied()
                .unwrap_or(259_200),
            otp_ttl_seconds: matches
                .get_one::<u64>("otp-ttl-seconds")
                .copied()
                .unwrap_or(600),
            cookie_secure: matches.get_flag("cookie-secure"),
            allowed_origins: matches
                .get_many::<String>("allowed-origin")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            otp_endpoint: matches.get_one::<String>("otp-endpoint").cloned(),
            otp_api_key: matches.get_one::<String>("otp-api-key").cloned(),
        })
    }
}
