use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

pub const APP_NAME: &str = "Chefing";

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_IMAGE_LABEL: &str = "Fridge image";

const ENV_API_URL: &str = "CHEFING_API_URL";
const ENV_TIMEOUT: &str = "CHEFING_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Shown in place of the text when an image is sent on its own.
    #[serde(default = "default_image_label")]
    pub placeholder_image_label: String,
}

fn default_image_label() -> String {
    DEFAULT_IMAGE_LABEL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            placeholder_image_label: default_image_label(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|s| !s.trim().is_empty()) {
            if Url::parse(url.trim()).is_ok() {
                config.api_base_url = url.trim().to_string();
            } else {
                tracing::warn!("Ignoring invalid {}: {}", ENV_API_URL, url);
            }
        }

        if let Some(raw) = lookup(ENV_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout_secs = secs,
                _ => tracing::warn!("Ignoring invalid {}: {}", ENV_TIMEOUT, raw),
            }
        }

        config
    }

    /// Base URL with a trailing slash, so relative endpoints join beneath it.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        let mut raw = self.api_base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url().unwrap().as_str(), "http://localhost:8000/");
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://chef.example.com/app"),
            (ENV_TIMEOUT, "15"),
        ]));
        assert_eq!(config.base_url().unwrap().as_str(), "https://chef.example.com/app/");
        assert_eq!(config.request_timeout_secs, 15);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_URL, "not a url"),
            (ENV_TIMEOUT, "0"),
        ]));
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_missing_label_uses_default() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"api_base_url":"http://localhost:9000","request_timeout_secs":5}"#,
        )
        .unwrap();
        assert_eq!(config.placeholder_image_label, "Fridge image");
    }
}
