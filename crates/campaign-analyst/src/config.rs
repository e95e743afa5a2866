//! Configuration for the campaign analysis service.

use std::path::PathBuf;
use std::time::Duration;

/// Model API configuration constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for the Gemini REST API.
    pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Default text generation model.
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-04-17";

    /// Request timeout (long-form analyses with search grounding are slow).
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Cache TTL for identical analysis requests (10 minutes).
    pub const CACHE_TTL: Duration = Duration::from_secs(600);

    /// Maximum cache size.
    pub const CACHE_MAX_SIZE: u64 = 100;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 4;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Warning logged when no credential is configured.
    pub const API_KEY_WARNING: &str =
        "GEMINI_API_KEY environment variable not set. Please set it to use the Gemini API.";
}

/// Brand constants used in prompts, rendered views and exported documents.
pub mod branding {
    /// Short brand name, used as the export subtitle.
    pub const SHORT_NAME: &str = "HERE AND NOW AI";

    /// Long brand name, used in the prompt preamble.
    pub const LONG_NAME: &str = "HERE AND NOW AI - Artificial Intelligence Research Institute";

    /// Brand slogan.
    pub const SLOGAN: &str = "designed with passion for innovation";

    /// Primary brand colour (title rules, accents).
    pub const PRIMARY_COLOR: &str = "#FFDF00";

    /// Secondary brand colour (headings, export title).
    pub const SECONDARY_COLOR: &str = "#004040";

    /// Title logo placed at the top of exported documents.
    pub const LOGO_URL: &str = "https://raw.githubusercontent.com/hereandnowai/images/refs/heads/main/logos/HNAI%20Title%20-Teal%20%26%20Golden%20Logo%20-%20DESIGN%203%20-%20Raj-07.png";

    /// Public website.
    pub const WEBSITE: &str = "https://hereandnowai.com";
}

/// Where the brand mark for exported documents comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrandMarkSource {
    /// Fetch over HTTP(S).
    Url(String),
    /// Read from the local filesystem.
    Path(PathBuf),
}

impl BrandMarkSource {
    /// Interpret a string as a URL when it parses as one with an http(s)
    /// scheme, otherwise as a filesystem path.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match url::Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Url(value.to_string()),
            _ => Self::Path(PathBuf::from(value)),
        }
    }
}

impl Default for BrandMarkSource {
    fn default() -> Self {
        Self::Url(branding::LOGO_URL.to_string())
    }
}

/// Service configuration.
#[derive(Clone)]
pub struct Config {
    /// Gemini API key. Absent keys fail closed on first model call.
    pub api_key: Option<String>,

    /// Model identifier.
    pub model: String,

    /// Base URL for the model API (for testing with mock servers).
    pub api_base_url: String,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Retries for transient model API failures.
    pub max_retries: u32,

    /// Cache TTL.
    pub cache_ttl: Duration,

    /// Maximum cache size.
    pub cache_max_size: u64,

    /// Brand mark for exported documents.
    pub brand_mark: BrandMarkSource,

    /// Directory exported documents are saved into.
    pub export_dir: PathBuf,

    /// Local preferences file.
    pub preferences_path: PathBuf,
}

impl Config {
    /// Create a new configuration with an optional API key and defaults for
    /// everything else.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: api::DEFAULT_MODEL.to_string(),
            api_base_url: api::BASE_URL.to_string(),
            request_timeout: api::REQUEST_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            max_retries: 2,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
            brand_mark: BrandMarkSource::default(),
            export_dir: PathBuf::from("exports"),
            preferences_path: PathBuf::from("preferences.json"),
        }
    }

    /// Create a test configuration pointing at a mock server.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            api_key: Some("test-key".to_string()),
            model: "test-model".to_string(),
            api_base_url: base_url.to_string(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            max_retries: 0,
            cache_ttl: Duration::from_secs(0), // No caching in tests
            cache_max_size: 0,
            brand_mark: BrandMarkSource::Url(format!("{base_url}/logo.png")),
            export_dir: std::env::temp_dir().join("campaign-analyst-exports"),
            preferences_path: std::env::temp_dir().join("campaign-analyst-preferences.json"),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// `GEMINI_API_KEY` takes precedence over the legacy `API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").or_else(|_| std::env::var("API_KEY")).ok();
        let mut config = Self::new(api_key);

        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = model;
        }
        if let Ok(url) = std::env::var("GEMINI_API_BASE_URL") {
            url::Url::parse(&url)
                .map_err(|e| anyhow::anyhow!("GEMINI_API_BASE_URL is not a valid URL: {e}"))?;
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(path) = std::env::var("BRAND_MARK_PATH") {
            config.brand_mark = BrandMarkSource::Path(PathBuf::from(path));
        } else if let Ok(url) = std::env::var("BRAND_MARK_URL") {
            config.brand_mark = BrandMarkSource::parse(&url);
        }
        if let Ok(dir) = std::env::var("EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }
        if let Ok(path) = std::env::var("PREFERENCES_PATH") {
            config.preferences_path = PathBuf::from(path);
        }
        if let Ok(secs) = std::env::var("GEMINI_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| anyhow::anyhow!("GEMINI_TIMEOUT_SECS must be an integer: {e}"))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Check if an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("has_api_key", &self.has_api_key())
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("brand_mark", &self.brand_mark)
            .field("export_dir", &self.export_dir)
            .finish()
    }
}
