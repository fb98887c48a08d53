// src/config.rs
// =============================================================================
// Runtime configuration read from environment variables.
//
// main.rs calls dotenvy::dotenv() first, so a .env file in the working
// directory works the same as exported variables. The API key is only
// required by the `match` command; `crawl` runs without it.
//
// Variables:
//   OPENAI_API_KEY           bearer credential for the chat-completions API
//   OPENAI_BASE_URL          default https://api.openai.com/v1
//   LINK_INTENT_MODEL        default gpt-4o
//   LINK_INTENT_TIMEOUT_SECS default 10 (page fetch timeout)
//   LINK_INTENT_LLM_TIMEOUT_SECS default 60 (one chat-completion request)
// =============================================================================

use std::fmt;
use std::time::Duration;

use crate::crawl::DEFAULT_FETCH_TIMEOUT;
use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub fetch_timeout: Duration,
    pub llm_timeout: Duration,
}

impl Config {
    // Reads the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    // Builds a config from any name -> value lookup.
    // Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let fetch_timeout = match get("LINK_INTENT_TIMEOUT_SECS") {
            Some(raw) => parse_timeout("LINK_INTENT_TIMEOUT_SECS", raw)?,
            None => DEFAULT_FETCH_TIMEOUT,
        };
        let llm_timeout = match get("LINK_INTENT_LLM_TIMEOUT_SECS") {
            Some(raw) => parse_timeout("LINK_INTENT_LLM_TIMEOUT_SECS", raw)?,
            None => DEFAULT_LLM_TIMEOUT,
        };

        Ok(Self {
            api_key: get("OPENAI_API_KEY"),
            base_url: get("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: get("LINK_INTENT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            fetch_timeout,
            llm_timeout,
        })
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))
    }
}

// Whole seconds, at least one
fn parse_timeout(var: &'static str, raw: String) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid { var, value: raw }),
    }
}

// Never print the key
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("llm_timeout", &self.llm_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert!(config.api_key.is_none());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.llm_timeout, Duration::from_secs(60));
        assert!(matches!(
            config.require_api_key(),
            Err(ConfigError::Missing("OPENAI_API_KEY"))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1/"),
            ("LINK_INTENT_MODEL", "gpt-4o-mini"),
            ("LINK_INTENT_TIMEOUT_SECS", "3"),
            ("LINK_INTENT_LLM_TIMEOUT_SECS", "15"),
        ])
        .unwrap();
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));
        assert_eq!(config.llm_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_empty_key_is_missing() {
        let config = config_from(&[("OPENAI_API_KEY", "  ")]).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(matches!(
            config_from(&[("LINK_INTENT_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            config_from(&[("LINK_INTENT_TIMEOUT_SECS", "0")]),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            config_from(&[("LINK_INTENT_LLM_TIMEOUT_SECS", "-5")]),
            Err(ConfigError::Invalid {
                var: "LINK_INTENT_LLM_TIMEOUT_SECS",
                ..
            })
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-secret")]).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("sk-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
