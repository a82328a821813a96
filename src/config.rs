//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default report sink endpoint.
pub const DEFAULT_CALLBACK_URL: &str = "https://hackathon.guvi.in/api/updateHoneyPotFinalResult";

/// Default classifier artifact location.
pub const DEFAULT_MODEL_PATH: &str = "model/scam_model.json";

/// Default probability above which the model flags a message.
pub const DEFAULT_SCAM_THRESHOLD: f64 = 0.7;

/// Service configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct HoneypotConfig {
    /// Shared key expected in the `x-api-key` header.
    pub api_key: SecretString,
    /// Where the final report is POSTed.
    pub callback_url: String,
    /// HTTP listen port.
    pub port: u16,
    /// Classifier artifact path.
    pub model_path: PathBuf,
    /// Model probability threshold.
    pub scam_threshold: f64,
    /// Upper bound on a single report delivery.
    pub report_timeout: Duration,
    /// Fixed seed for reply selection (random when unset).
    pub rng_seed: Option<u64>,
}

impl HoneypotConfig {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("HONEYPOT_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("HONEYPOT_API_KEY".into()))?;

        let callback_url = lookup("HONEYPOT_CALLBACK_URL")
            .unwrap_or_else(|| DEFAULT_CALLBACK_URL.to_string());
        if !(callback_url.starts_with("http://") || callback_url.starts_with("https://")) {
            return Err(invalid("HONEYPOT_CALLBACK_URL", "must be an http(s) URL"));
        }

        let port: u16 = parse_or("HONEYPOT_PORT", &lookup, 8000)?;

        let model_path = lookup("HONEYPOT_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));

        let scam_threshold: f64 =
            parse_or("HONEYPOT_SCAM_THRESHOLD", &lookup, DEFAULT_SCAM_THRESHOLD)?;
        if !(scam_threshold > 0.0 && scam_threshold < 1.0) {
            return Err(invalid(
                "HONEYPOT_SCAM_THRESHOLD",
                "must be strictly between 0 and 1",
            ));
        }

        let timeout_secs: u64 = parse_or("HONEYPOT_REPORT_TIMEOUT_SECS", &lookup, 5)?;
        if timeout_secs == 0 {
            return Err(invalid("HONEYPOT_REPORT_TIMEOUT_SECS", "must be positive"));
        }

        let rng_seed = lookup("HONEYPOT_RNG_SEED")
            .map(|raw| raw.trim().parse::<u64>())
            .transpose()
            .map_err(|e| invalid("HONEYPOT_RNG_SEED", &e.to_string()))?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            callback_url,
            port,
            model_path,
            scam_threshold,
            report_timeout: Duration::from_secs(timeout_secs),
            rng_seed,
        })
    }
}

fn parse_or<T, F>(key: &str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, &e.to_string())),
        None => Ok(default),
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
