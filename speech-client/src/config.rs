use serde::{Deserialize, Serialize};

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default base URL for the OpenAI API.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Provider connection settings, embedded in the calling program's config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderSettings {
    /// API key (optional, can use env var instead)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Custom base URL for OpenAI-compatible servers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderSettings {
    /// Base URL to use, falling back to the public OpenAI endpoint.
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(OPENAI_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_url() {
        let settings = ProviderSettings::default();
        assert_eq!(settings.base_url(), "https://api.openai.com/v1");
    }

    #[test]
    fn test_custom_base_url() {
        let settings = ProviderSettings {
            api_key: None,
            base_url: Some("http://localhost:8880/v1".to_string()),
        };
        assert_eq!(settings.base_url(), "http://localhost:8880/v1");
    }

    #[test]
    fn test_empty_settings_serialize_to_nothing() {
        let settings = ProviderSettings::default();
        let toml_str = toml::to_string(&settings).unwrap();
        assert!(toml_str.trim().is_empty());
    }
}
