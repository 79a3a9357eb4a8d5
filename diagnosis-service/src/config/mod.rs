use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::Semaphore;

const DEFAULT_COMPLETION_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_SITE_URL: &str = "https://daignostics2.onrender.com";
const DEFAULT_SITE_TITLE: &str = "RVS Garage Diagnostics";
const DEFAULT_BODY_LIMIT_BYTES: usize = 1_048_576;
const DEFAULT_STATIC_DIR: &str = "public";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct DiagnosisConfig {
    pub common: core_config::Config,
    pub completion: CompletionSettings,
    pub server: ServerSettings,
    pub observability: ObservabilitySettings,
}

#[derive(Debug, Clone)]
pub struct CompletionSettings {
    /// Bearer credential. Not validated locally; a bad key surfaces as an
    /// upstream authentication error.
    pub api_key: Secret<String>,
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    /// Sent as `HTTP-Referer`.
    pub site_url: String,
    /// Sent as `X-Title`.
    pub site_title: String,
    /// Unset means the outbound call may wait indefinitely.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub body_limit_bytes: usize,
    pub static_dir: PathBuf,
    /// Unset means no cap on concurrent diagnoses.
    pub max_in_flight: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ObservabilitySettings {
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl DiagnosisConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        Self::from_lookup(common, |key| std::env::var(key).ok())
    }

    /// Build the service settings from an arbitrary key lookup.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let max_in_flight: Option<usize> =
            parse("DIAGNOSIS_MAX_IN_FLIGHT", get("DIAGNOSIS_MAX_IN_FLIGHT"))?;
        if let Some(cap) = max_in_flight {
            if cap == 0 || cap > Semaphore::MAX_PERMITS {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "DIAGNOSIS_MAX_IN_FLIGHT must be between 1 and {}, got {}",
                    Semaphore::MAX_PERMITS,
                    cap
                )));
            }
        }

        Ok(DiagnosisConfig {
            common,
            completion: CompletionSettings {
                api_key: Secret::new(lookup("OPENROUTER_API_KEY").unwrap_or_default()),
                endpoint: get_or("DIAGNOSIS_COMPLETION_URL", DEFAULT_COMPLETION_URL),
                model: get_or("DIAGNOSIS_MODEL", DEFAULT_MODEL),
                temperature: parse("DIAGNOSIS_TEMPERATURE", get("DIAGNOSIS_TEMPERATURE"))?
                    .unwrap_or(DEFAULT_TEMPERATURE),
                site_url: get_or("DIAGNOSIS_SITE_URL", DEFAULT_SITE_URL),
                site_title: get_or("DIAGNOSIS_SITE_TITLE", DEFAULT_SITE_TITLE),
                timeout: parse::<u64>(
                    "DIAGNOSIS_UPSTREAM_TIMEOUT_SECS",
                    get("DIAGNOSIS_UPSTREAM_TIMEOUT_SECS"),
                )?
                .map(Duration::from_secs),
            },
            server: ServerSettings {
                body_limit_bytes: parse(
                    "DIAGNOSIS_BODY_LIMIT_BYTES",
                    get("DIAGNOSIS_BODY_LIMIT_BYTES"),
                )?
                .unwrap_or(DEFAULT_BODY_LIMIT_BYTES),
                static_dir: PathBuf::from(get_or("DIAGNOSIS_STATIC_DIR", DEFAULT_STATIC_DIR)),
                max_in_flight,
            },
            observability: ObservabilitySettings {
                log_level: get_or("LOG_LEVEL", DEFAULT_LOG_LEVEL),
                otlp_endpoint: get("OTLP_ENDPOINT"),
            },
        })
    }
}

fn parse<T>(key: &str, raw: Option<String>) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value.trim().parse::<T>().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, value, e))
        })
    })
    .transpose()
}
