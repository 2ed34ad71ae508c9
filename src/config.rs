use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

/// How repeated certificate requests for the same user are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CertificatePolicy {
    /// One certificate per completed attempt. Asking again for the same
    /// attempt returns the certificate minted the first time.
    #[default]
    PerAttempt,
    /// One certificate per user. Any existing certificate is reused.
    PerUser,
}

impl FromStr for CertificatePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per_attempt" => Ok(Self::PerAttempt),
            "per_user" => Ok(Self::PerUser),
            other => Err(Error::Config(format!(
                "Invalid value for CERTIFICATE_POLICY: {} (expected per_attempt or per_user)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub public_rps: u32,
    pub resend_api_key: Option<String>,
    pub email_from: String,
    pub verify_base_url: String,
    pub certificate_policy: CertificatePolicy,
    pub session_idle_minutes: i64,
    pub log_json: bool,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            public_rps: get_env_parse("PUBLIC_RPS")?,
            resend_api_key: env::var("RESEND_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            email_from: get_env_or("EMAIL_FROM", "Cyber Quiz <onboarding@resend.dev>"),
            verify_base_url: get_env_or("VERIFY_BASE_URL", "http://localhost:5173/verify/"),
            certificate_policy: get_env_or("CERTIFICATE_POLICY", "per_attempt").parse()?,
            session_idle_minutes: get_env_parse_or("SESSION_IDLE_MINUTES", 60)?,
            log_json: get_env_or("LOG_FORMAT", "plain").eq_ignore_ascii_case("json"),
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(_) => get_env_parse(name),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certificate_policy_parses_known_values() {
        assert_eq!("per_attempt".parse::<CertificatePolicy>().unwrap(), CertificatePolicy::PerAttempt);
        assert_eq!(" PER_USER ".parse::<CertificatePolicy>().unwrap(), CertificatePolicy::PerUser);
    }

    #[test]
    fn certificate_policy_rejects_unknown_values() {
        let err = "one_per_day".parse::<CertificatePolicy>().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
