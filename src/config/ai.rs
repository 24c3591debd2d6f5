//! Chat provider configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Chat provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Anthropic API key
    pub anthropic_api_key: Option<String>,

    /// Primary chat provider
    #[serde(default = "default_provider")]
    pub primary_provider: AiProvider,

    /// Fallback chat provider
    pub fallback_provider: Option<AiProvider>,

    /// Per-provider request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum in-provider retries on transient failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

/// Chat provider type
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenAI,
    #[default]
    Anthropic,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if OpenAI is configured
    pub fn has_openai(&self) -> bool {
        self.openai_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Check if Anthropic is configured
    pub fn has_anthropic(&self) -> bool {
        self.anthropic_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Check if a given provider has an API key
    fn has_key_for(&self, provider: AiProvider) -> bool {
        match provider {
            AiProvider::OpenAI => self.has_openai(),
            AiProvider::Anthropic => self.has_anthropic(),
        }
    }

    /// Validate chat provider configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        // At least one provider must have an API key
        if !self.has_openai() && !self.has_anthropic() {
            return Err(ValidationError::NoChatProviderConfigured);
        }

        // Primary provider must have an API key
        match self.primary_provider {
            AiProvider::OpenAI if !self.has_openai() => {
                return Err(ValidationError::MissingRequired("OPENAI_API_KEY"));
            }
            AiProvider::Anthropic if !self.has_anthropic() => {
                return Err(ValidationError::MissingRequired("ANTHROPIC_API_KEY"));
            }
            _ => {}
        }

        // A configured fallback must have an API key too
        if let Some(fallback) = self.fallback_provider {
            if !self.has_key_for(fallback) {
                return Err(match fallback {
                    AiProvider::OpenAI => ValidationError::MissingRequired("OPENAI_API_KEY"),
                    AiProvider::Anthropic => ValidationError::MissingRequired("ANTHROPIC_API_KEY"),
                });
            }
        }

        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            anthropic_api_key: None,
            primary_provider: default_provider(),
            fallback_provider: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

fn default_provider() -> AiProvider {
    AiProvider::Anthropic
}

fn default_timeout() -> u64 {
    12
}

fn default_retries() -> u32 {
    2
}
