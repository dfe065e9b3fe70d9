use std::time::Duration;

use tryon_core::error::TryOnError;

/// Default image-capable model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Default REST base URL.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for the Gemini API.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`.
    pub api_key: String,
    /// Model name, e.g. `gemini-2.5-flash-image-preview`.
    pub model: String,
    /// Base URL without trailing slash.
    pub api_url: String,
    /// Timeout applied to each `generateContent` call.
    pub timeout: Duration,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GeminiConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var               | Default                                      |
    /// |-----------------------|----------------------------------------------|
    /// | `GEMINI_API_KEY`      | required (falls back to `API_KEY`)           |
    /// | `GEMINI_MODEL`        | `gemini-2.5-flash-image-preview`             |
    /// | `GEMINI_API_URL`      | `https://generativelanguage.googleapis.com`  |
    /// | `GEMINI_TIMEOUT_SECS` | `120`                                        |
    ///
    /// A missing key is a [`TryOnError::Configuration`]; callers treat it as
    /// fatal at startup.
    pub fn from_env() -> Result<Self, TryOnError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TryOnError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("API_KEY"))
            .ok_or_else(|| {
                TryOnError::Configuration("GEMINI_API_KEY environment variable is not set".into())
            })?;

        let model = non_empty("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.into());

        let api_url = non_empty("GEMINI_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.into())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = match non_empty("GEMINI_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                TryOnError::Configuration(format!(
                    "GEMINI_TIMEOUT_SECS must be a valid u64 (got '{raw}')"
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            model,
            api_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_key_is_configuration_error() {
        let result = GeminiConfig::from_lookup(lookup(&[]));
        assert_matches!(result, Err(TryOnError::Configuration(_)));
    }

    #[test]
    fn blank_key_is_configuration_error() {
        let result = GeminiConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")]));
        assert_matches!(result, Err(TryOnError::Configuration(_)));
    }

    #[test]
    fn defaults_apply() {
        let config = GeminiConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn legacy_api_key_variable_is_accepted() {
        let config = GeminiConfig::from_lookup(lookup(&[("API_KEY", "legacy")])).unwrap();
        assert_eq!(config.api_key, "legacy");
    }

    #[test]
    fn overrides_and_trailing_slash() {
        let config = GeminiConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_MODEL", "gemini-test"),
            ("GEMINI_API_URL", "http://localhost:9000/"),
            ("GEMINI_TIMEOUT_SECS", "7"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gemini-test");
        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.timeout, Duration::from_secs(7));
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let result = GeminiConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_TIMEOUT_SECS", "soon"),
        ]));
        assert_matches!(result, Err(TryOnError::Configuration(_)));
    }

    #[test]
    fn debug_redacts_key() {
        let config = GeminiConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "secret")])).unwrap();
        assert!(!format!("{config:?}").contains("secret"));
    }
}
