//! Client configuration.
//!
//! On native builds load configuration using `ClientConfig::from_env()` after
//! calling `dotenvy::dotenv()`. The browser build bakes the API URL in at
//! compile time.

/// Default backend base URL
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Default tracing filter for the command-line client
pub const DEFAULT_LOG_FILTER: &str = "lumera=info";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend REST base URL, without trailing slash
    /// Example: http://localhost:8080/api
    pub api_url: String,

    /// File used to persist the session on native builds
    pub storage_path: Option<std::path::PathBuf>,

    /// `tracing` filter directive
    pub log_filter: String,
}

impl ClientConfig {
    /// Build a config for the given base URL, keeping other defaults
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            api_url: normalize_api_url(&api_url.into()),
            storage_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `LUMERA_API_URL` wins over `NEXT_PUBLIC_API_URL`; blank values are
    /// ignored.
    #[cfg(not(feature = "hydrate"))]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Browser build: base URL fixed at compile time.
    #[cfg(feature = "hydrate")]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| match key {
            "LUMERA_API_URL" => option_env!("LUMERA_API_URL").map(str::to_string),
            "NEXT_PUBLIC_API_URL" => option_env!("NEXT_PUBLIC_API_URL").map(str::to_string),
            _ => None,
        })
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_blank("LUMERA_API_URL")
            .or_else(|| non_blank("NEXT_PUBLIC_API_URL"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self {
            api_url: normalize_api_url(&api_url),
            storage_path: non_blank("LUMERA_STORAGE_PATH").map(std::path::PathBuf::from),
            log_filter: non_blank("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }
    }

    /// Session file location: explicit path or `<config dir>/lumera/session.json`
    #[cfg(feature = "ssr")]
    pub fn session_file(&self) -> std::path::PathBuf {
        self.storage_path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("lumera")
                .join("session.json")
        })
    }

    /// Absolute URL for an endpoint path such as `/v1/auth/me`
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_url, endpoint)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn normalize_api_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ========================================================================
    // Lookup Tests (no env var dependencies - thread safe)
    // ========================================================================

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = ClientConfig::from_lookup(lookup(&[]));

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.storage_path.is_none());
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_next_public_api_url_overrides_default() {
        let config =
            ClientConfig::from_lookup(lookup(&[("NEXT_PUBLIC_API_URL", "https://api.lumera.io/api")]));

        assert_eq!(config.api_url, "https://api.lumera.io/api");
    }

    #[test]
    fn test_lumera_api_url_wins() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("NEXT_PUBLIC_API_URL", "https://old.example/api"),
            ("LUMERA_API_URL", "https://new.example/api"),
        ]));

        assert_eq!(config.api_url, "https://new.example/api");
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("LUMERA_API_URL", "   "),
            ("RUST_LOG", ""),
        ]));

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = ClientConfig::with_api_url("http://localhost:8080/api/");
        assert_eq!(config.api_url, "http://localhost:8080/api");
        assert_eq!(
            config.endpoint_url("/v1/auth/me"),
            "http://localhost:8080/api/v1/auth/me"
        );
    }

    #[test]
    fn test_storage_path_and_log_filter() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("LUMERA_STORAGE_PATH", "/tmp/lumera.json"),
            ("RUST_LOG", "lumera=debug"),
        ]));

        assert_eq!(
            config.storage_path,
            Some(std::path::PathBuf::from("/tmp/lumera.json"))
        );
        assert_eq!(config.log_filter, "lumera=debug");
    }

    #[cfg(feature = "ssr")]
    #[test]
    fn test_session_file_prefers_explicit_path() {
        let mut config = ClientConfig::with_api_url(DEFAULT_API_URL);
        assert!(config.session_file().ends_with("lumera/session.json"));

        config.storage_path = Some(std::path::PathBuf::from("/tmp/custom.json"));
        assert_eq!(config.session_file(), std::path::PathBuf::from("/tmp/custom.json"));
    }

    #[test]
    fn test_config_from_env_returns_config() {
        // Actual values depend on environment
        let config = ClientConfig::from_env();
        assert!(!config.api_url.ends_with('/'));
    }
}
