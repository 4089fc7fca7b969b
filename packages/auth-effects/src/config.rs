use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Auth configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Admin API base URL, always ending with `/`.
    pub api_url: String,
    pub oauth_client_id: String,
    pub oauth_client_secret: String,
    pub demo_page_available: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut api_url =
            var("FRS_API_URL").unwrap_or_else(|| "http://localhost:8000/admin/".to_string());
        if !api_url.ends_with('/') {
            api_url.push('/');
        }

        Ok(Self {
            api_url,
            oauth_client_id: var("FRS_OAUTH_CLIENT_ID")
                .unwrap_or_else(|| "CommonClient".to_string()),
            oauth_client_secret: var("FRS_OAUTH_CLIENT_SECRET")
                .unwrap_or_else(|| "password".to_string()),
            demo_page_available: var("FRS_DEMO_PAGE_AVAILABLE")
                .unwrap_or_else(|| "false".to_string())
                .parse()
                .context("FRS_DEMO_PAGE_AVAILABLE must be true or false")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]).unwrap();

        assert_eq!(config.api_url, "http://localhost:8000/admin/");
        assert_eq!(config.oauth_client_id, "CommonClient");
        assert_eq!(config.oauth_client_secret, "password");
        assert!(!config.demo_page_available);
    }

    #[test]
    fn api_url_gets_trailing_slash() {
        let config = config(&[
            ("FRS_API_URL", "https://frs.example.org/admin"),
            ("FRS_DEMO_PAGE_AVAILABLE", "true"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "https://frs.example.org/admin/");
        assert!(config.demo_page_available);
    }

    #[test]
    fn rejects_non_bool_demo_flag() {
        let err = config(&[("FRS_DEMO_PAGE_AVAILABLE", "yes")]).unwrap_err();
        assert!(err.to_string().contains("FRS_DEMO_PAGE_AVAILABLE"));
    }
}
