//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `COURSE_COMPASS_` prefix and nested values use underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use course_compass::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Primary provider: {:?}", config.ai.primary_provider);
//! ```

mod ai;
mod error;
mod retrieval;

pub use ai::{AiConfig, AiProvider};
pub use error::{ConfigError, ValidationError};
pub use retrieval::RetrievalConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections for the chat engine.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Chat provider configuration (Anthropic/OpenAI)
    #[serde(default)]
    pub ai: AiConfig,

    /// Knowledge retrieval configuration (thresholds, embedding model)
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `COURSE_COMPASS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `COURSE_COMPASS__AI__ANTHROPIC_API_KEY=...` -> `ai.anthropic_api_key = ...`
    /// - `COURSE_COMPASS__RETRIEVAL__MATCH_COUNT=5` -> `retrieval.match_count = 5`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("COURSE_COMPASS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.retrieval.validate()?;
        Ok(())
    }
}
