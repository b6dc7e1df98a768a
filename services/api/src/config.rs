//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use study_notes_core::GenerationConfig;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which provider answers chat completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionBackend {
    /// The hosted AI gateway function, which applies per-user quotas.
    Hosted,
    /// A direct OpenAI-compatible chat endpoint.
    OpenAi,
}

impl FromStr for CompletionBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hosted" => Ok(Self::Hosted),
            "openai" => Ok(Self::OpenAi),
            other => Err(format!("'{}' is not one of hosted, openai", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub completion_backend: CompletionBackend,
    /// Base URL of the hosted functions, e.g. `https://<project>.supabase.co/functions/v1`.
    pub hosted_functions_url: String,
    pub hosted_api_key: String,
    pub ai_function: String,
    pub link_function: String,
    pub storage_url: String,
    pub storage_bucket: String,
    pub openai_api_key: Option<String>,
    pub http_timeout: Duration,
    pub allowed_origin: String,
    pub generation: GenerationConfig,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Load Server and Database Settings ---
        let bind_address = parse("BIND_ADDRESS", or_default("BIND_ADDRESS", "0.0.0.0:3000"))?;
        let database_url = required("DATABASE_URL")?;

        let log_level_str = or_default("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Backend Settings ---
        let completion_backend = parse("COMPLETION_BACKEND", or_default("COMPLETION_BACKEND", "hosted"))?;
        let hosted_functions_url = required("HOSTED_FUNCTIONS_URL")?.trim_end_matches('/').to_string();
        let hosted_api_key = required("HOSTED_API_KEY")?;
        let ai_function = or_default("AI_FUNCTION", "ai-gateway");
        let link_function = or_default("LINK_FUNCTION", "process-link");
        let storage_url = lookup("STORAGE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| derive_storage_url(&hosted_functions_url));
        let storage_bucket = or_default("STORAGE_BUCKET", "audio-recordings");

        let openai_api_key = lookup("OPENAI_API_KEY");
        if completion_backend == CompletionBackend::OpenAi && openai_api_key.is_none() {
            return Err(ConfigError::MissingVar("OPENAI_API_KEY".to_string()));
        }

        let http_timeout = Duration::from_secs(parse("HTTP_TIMEOUT_SECS", or_default("HTTP_TIMEOUT_SECS", "300"))?);
        let allowed_origin = or_default("ALLOWED_ORIGIN", "http://localhost:5173");

        // --- Load Generation Tuning ---
        let mut generation = GenerationConfig::default();
        if let Some(model) = lookup("CHAT_MODEL") {
            generation.model = model;
        }
        if let Some(value) = lookup("CHAT_TEMPERATURE") {
            generation.temperature = parse_temperature("CHAT_TEMPERATURE", value)?;
        }
        if let Some(value) = lookup("STRUCTURED_TEMPERATURE") {
            generation.structured_temperature = parse_temperature("STRUCTURED_TEMPERATURE", value)?;
        }

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            completion_backend,
            hosted_functions_url,
            hosted_api_key,
            ai_function,
            link_function,
            storage_url,
            storage_bucket,
            openai_api_key,
            http_timeout,
            allowed_origin,
            generation,
        })
    }
}

fn parse<T>(key: &str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

fn parse_temperature(key: &str, value: String) -> Result<f32, ConfigError> {
    let temperature: f32 = parse(key, value)?;
    if (0.0..=1.0).contains(&temperature) {
        Ok(temperature)
    } else {
        Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("{} is outside 0.0..=1.0", temperature),
        ))
    }
}

/// Functions and storage share a project host: `.../functions/v1` becomes `.../storage/v1`.
fn derive_storage_url(functions_url: &str) -> String {
    match functions_url.strip_suffix("/functions/v1") {
        Some(project) => format!("{}/storage/v1", project),
        None => format!("{}/storage/v1", functions_url),
    }
}
