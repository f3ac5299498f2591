//! Process configuration read from environment variables.
//!
//! Secrets (gateway key secret, JWT secret) only ever come from the
//! environment; command-line flags override non-secret settings in `main`.

use crate::error::{PaymentError, Result};
use std::time::Duration;

pub const DEFAULT_BIND: &str = "0.0.0.0:4000";
pub const DEFAULT_GATEWAY_BASE: &str = "https://api.razorpay.com/v1";
pub const DEFAULT_CURRENCY: &str = "INR";
pub const OFFLINE_KEY_ID: &str = "rzp_offline";

#[derive(Clone)]
pub struct GatewayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub base_url: String,
    pub currency: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct MailConfig {
    pub url: String,
    pub token: Option<String>,
    pub from: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub gateway: GatewayConfig,
    pub jwt_secret: String,
    pub mail: Option<MailConfig>,
    pub log_json: bool,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("gateway_key_id", &self.gateway.key_id)
            .field("gateway_base_url", &self.gateway.base_url)
            .field("currency", &self.gateway.currency)
            .field("mail_enabled", &self.mail.is_some())
            .field("log_json", &self.log_json)
            .finish_non_exhaustive()
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env(offline: bool) -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok(), offline)
    }

    /// Reads configuration through `lookup`, which maps a variable name to its value.
    ///
    /// In offline mode the gateway credentials are optional and default to a
    /// local key pair, since no order ever leaves the process.
    pub fn from_lookup<F>(lookup: F, offline: bool) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| PaymentError::ConfigError(format!("{name} must be set")))
        };

        let (key_id, key_secret) = if offline {
            (
                var("RAZORPAY_KEY").unwrap_or_else(|| OFFLINE_KEY_ID.to_string()),
                var("RAZORPAY_SECRET").unwrap_or_else(|| "offline_secret".to_string()),
            )
        } else {
            (required("RAZORPAY_KEY")?, required("RAZORPAY_SECRET")?)
        };

        let gateway_timeout = parse_u64(&var, "COURSEPAY_GATEWAY_TIMEOUT_MS", 10_000)?;
        let gateway = GatewayConfig {
            key_id,
            key_secret,
            base_url: var("RAZORPAY_API_BASE").unwrap_or_else(|| DEFAULT_GATEWAY_BASE.to_string()),
            currency: var("COURSEPAY_CURRENCY").unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            timeout: Duration::from_millis(gateway_timeout),
        };

        let mail = var("MAIL_API_URL").map(|url| MailConfig {
            url,
            token: var("MAIL_API_TOKEN"),
            from: var("MAIL_FROM").unwrap_or_else(|| "noreply@coursepay.local".to_string()),
            timeout: Duration::from_millis(gateway_timeout),
        });

        Ok(Self {
            bind_addr: var("COURSEPAY_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            gateway,
            jwt_secret: required("JWT_SECRET")?,
            mail,
            log_json: parse_bool(var("COURSEPAY_LOG_JSON"), false),
        })
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn parse_u64<F>(var: &F, name: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| PaymentError::ConfigError(format!("{name} must be an integer"))),
        None => Ok(default),
    }
}
