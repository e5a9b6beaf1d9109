//! Explicit configuration for the remote services.
//!
//! Credentials are resolved once at the CLI surface and handed to clients as
//! plain values; nothing below this layer reads the process environment.

use crate::error::ConfigError;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_LLM_API_BASE: &str = "https://api.openai.com/v1";

/// Default Polygon API endpoint.
pub const DEFAULT_POLYGON_URL: &str = "https://polygon.codeforces.com/api";

/// Default model for the Polygon-facing tools.
pub const DEFAULT_POLYGON_MODEL: &str = "gpt-4";

/// Default model for the TopCoder tools.
pub const DEFAULT_TOPCODER_MODEL: &str = "gpt-4o";

/// Settings for the chat-completion client.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL; `/chat/completions` is appended.
    pub api_base: String,
    /// Bearer token.
    pub api_key: String,
    /// Model identifier sent with every request.
    pub model: String,
}

impl LlmConfig {
    /// Builds a config, failing when the key is absent or blank.
    ///
    /// A missing or blank base URL falls back to [`DEFAULT_LLM_API_BASE`].
    pub fn resolve(
        api_key: Option<String>,
        api_base: Option<String>,
        model: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let api_key = non_blank(api_key).ok_or(ConfigError::MissingCredential {
            name: "OpenAI API key",
            hint: "Provide it via --api-key or the OPENAI_API_KEY environment variable",
        })?;
        let api_base = non_blank(api_base)
            .unwrap_or_else(|| DEFAULT_LLM_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_base,
            api_key,
            model: model.into(),
        })
    }
}

/// Settings for the Polygon client.
#[derive(Debug, Clone)]
pub struct PolygonConfig {
    pub api_url: String,
    pub api_key: String,
    pub api_secret: String,
}

impl PolygonConfig {
    /// Builds a config, failing when the key or the secret is absent.
    pub fn resolve(
        api_url: impl Into<String>,
        api_key: Option<String>,
        api_secret: Option<String>,
    ) -> Result<Self, ConfigError> {
        const HINT: &str = "Provide --polygon-key/--polygon-secret or the POLYGON_API_KEY/POLYGON_API_SECRET environment variables";

        let api_key = non_blank(api_key).ok_or(ConfigError::MissingCredential {
            name: "Polygon API key",
            hint: HINT,
        })?;
        let api_secret = non_blank(api_secret).ok_or(ConfigError::MissingCredential {
            name: "Polygon API secret",
            hint: HINT,
        })?;

        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key,
            api_secret,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_config_requires_key() {
        let err = LlmConfig::resolve(None, None, "gpt-4o").unwrap_err();
        assert!(err.to_string().contains("OpenAI API key"));

        let err = LlmConfig::resolve(Some("  ".to_string()), None, "gpt-4o").unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }

    #[test]
    fn test_llm_config_defaults_base() {
        let config = LlmConfig::resolve(Some("sk-test".to_string()), None, "gpt-4o").unwrap();
        assert_eq!(config.api_base, DEFAULT_LLM_API_BASE);
        assert_eq!(config.model, "gpt-4o");

        let config = LlmConfig::resolve(
            Some("sk-test".to_string()),
            Some("http://localhost:4000/v1/".to_string()),
            "m",
        )
        .unwrap();
        assert_eq!(config.api_base, "http://localhost:4000/v1");
    }

    #[test]
    fn test_polygon_config_requires_both_credentials() {
        assert!(PolygonConfig::resolve(DEFAULT_POLYGON_URL, Some("k".into()), None).is_err());
        assert!(PolygonConfig::resolve(DEFAULT_POLYGON_URL, None, Some("s".into())).is_err());

        let config =
            PolygonConfig::resolve(DEFAULT_POLYGON_URL, Some("k".into()), Some("s".into()))
                .unwrap();
        assert_eq!(config.api_url, DEFAULT_POLYGON_URL);
    }
}
