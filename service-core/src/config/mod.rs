use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::Deserialize;

/// Listening port used when neither `PORT` nor `APP__PORT` is set.
pub const DEFAULT_PORT: u16 = 3000;

/// Settings shared by every HTTP service.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Config {
    /// Load from `.env`, an optional `configuration` file and `APP__*` variables.
    ///
    /// A bare `PORT` variable (as set by most PaaS hosts) is honoured as the
    /// default port; `APP__PORT` still takes precedence over it.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let port_default = match std::env::var("PORT") {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("PORT must be a valid port number: {}", e))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let config = Cfg::builder()
            .set_default("port", port_default)?
            .add_source(File::with_name("configuration").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
