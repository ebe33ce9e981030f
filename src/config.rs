use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{ClassifierError, Result};

/// Default Twelve Labs API root
pub const DEFAULT_BASE_URL: &str = "https://api.twelvelabs.io/v1.2";

/// Configuration for the sports classifier
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote service settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// HTTP API session settings
    #[serde(default)]
    pub api: ApiConfig,

    /// API key and index id, supplied through the environment only
    #[serde(skip)]
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// API root, e.g. https://api.twelvelabs.io/v1.2
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Maximum metadata lookups in flight (1 = sequential)
    pub resolve_concurrency: usize,

    /// Ask the classifier for per-clip detail
    pub include_clips: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
            resolve_concurrency: 4,
            include_clips: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Idle seconds after which a session and its custom categories are dropped
    pub session_ttl_seconds: u64,

    /// Upper bound on live sessions; the least recently used one is evicted beyond it
    pub max_sessions: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: 3600,
            max_sessions: 1000,
        }
    }
}

impl ServiceConfig {
    /// Build an endpoint URL by appending path segments to the base URL.
    ///
    /// Segments are percent-encoded, so opaque ids are safe to pass through.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClassifierError::Configuration(format!("invalid base URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ClassifierError::Configuration(format!(
                    "base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[derive(Clone, Default)]
pub struct Credentials {
    pub api_key: Option<String>,
    pub index_id: Option<String>,
}

// Keep the key out of debug logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("index_id", &self.index_id)
            .finish()
    }
}

impl Config {
    /// Load configuration.
    ///
    /// Reads the given TOML file, or the first default location that exists,
    /// then applies environment overrides (including a `.env` file) and validates.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_default_locations()?,
        };

        dotenv::dotenv().ok();
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path).map_err(|e| {
            ClassifierError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&config_str).map_err(|e| {
            ClassifierError::Configuration(format!("cannot parse {}: {}", path.display(), e))
        })?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    fn from_default_locations() -> Result<Self> {
        let config_paths = [
            PathBuf::from("sports-classifier.toml"),
            PathBuf::from("config/sports-classifier.toml"),
        ];

        for path in &config_paths {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Override settings from environment-style variables
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("SPORTS_CLASSIFIER_BASE_URL") {
            self.service.base_url = base_url;
        }

        if let Some(timeout) = lookup("SPORTS_CLASSIFIER_TIMEOUT") {
            match timeout.parse() {
                Ok(seconds) => self.service.timeout_seconds = seconds,
                Err(_) => tracing::warn!("Ignoring invalid SPORTS_CLASSIFIER_TIMEOUT: {}", timeout),
            }
        }

        if let Some(concurrency) = lookup("SPORTS_CLASSIFIER_CONCURRENCY") {
            match concurrency.parse() {
                Ok(n) => self.service.resolve_concurrency = n,
                Err(_) => tracing::warn!(
                    "Ignoring invalid SPORTS_CLASSIFIER_CONCURRENCY: {}",
                    concurrency
                ),
            }
        }

        if let Some(ttl) = lookup("SPORTS_CLASSIFIER_SESSION_TTL") {
            match ttl.parse() {
                Ok(seconds) => self.api.session_ttl_seconds = seconds,
                Err(_) => tracing::warn!("Ignoring invalid SPORTS_CLASSIFIER_SESSION_TTL: {}", ttl),
            }
        }

        if let Some(api_key) = lookup("API_KEY").filter(|v| !v.is_empty()) {
            self.credentials.api_key = Some(api_key);
        }

        if let Some(index_id) = lookup("INDEX_ID").filter(|v| !v.is_empty()) {
            self.credentials.index_id = Some(index_id);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.api_key()?;
        self.index_id()?;

        if self.service.timeout_seconds == 0 {
            return Err(ClassifierError::Configuration(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.service.resolve_concurrency == 0 {
            return Err(ClassifierError::Configuration(
                "resolve_concurrency must be greater than 0".to_string(),
            ));
        }

        if self.api.session_ttl_seconds == 0 || self.api.max_sessions == 0 {
            return Err(ClassifierError::Configuration(
                "session_ttl_seconds and max_sessions must be greater than 0".to_string(),
            ));
        }

        self.service.endpoint(&[])?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    pub fn api_key(&self) -> Result<&str> {
        self.credentials
            .api_key
            .as_deref()
            .ok_or_else(|| ClassifierError::Configuration("API_KEY is not set".to_string()))
    }

    pub fn index_id(&self) -> Result<&str> {
        self.credentials
            .index_id
            .as_deref()
            .ok_or_else(|| ClassifierError::Configuration("INDEX_ID is not set".to_string()))
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Sports Classifier Configuration:\n\
            - API: {}\n\
            - Index: {}\n\
            - Timeout: {}s\n\
            - Lookup Concurrency: {}\n\
            - Clip Detail: {}\n\
            - Session TTL: {}s (max {} sessions)",
            self.service.base_url,
            self.credentials.index_id.as_deref().unwrap_or("<unset>"),
            self.service.timeout_seconds,
            self.service.resolve_concurrency,
            self.service.include_clips,
            self.api.session_ttl_seconds,
            self.api.max_sessions
        )
    }
}

/// Builder for assembling a configuration in code
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.service.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config.service.timeout_seconds = seconds;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.service.resolve_concurrency = concurrency;
        self
    }

    pub fn include_clips(mut self, enabled: bool) -> Self {
        self.config.service.include_clips = enabled;
        self
    }

    pub fn with_session_ttl(mut self, seconds: u64) -> Self {
        self.config.api.session_ttl_seconds = seconds;
        self
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.config.api.max_sessions = max_sessions;
        self
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>, index_id: impl Into<String>) -> Self {
        self.config.credentials = Credentials {
            api_key: Some(api_key.into()),
            index_id: Some(index_id.into()),
        };
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
