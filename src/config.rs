//! Process-wide configuration for the menu extraction service.
//!
//! Everything the service needs to know at start-up lives in one
//! [`ServiceConfig`], built once and shared read-only (behind `Arc`) by every
//! request. Nothing is read from the environment after start-up.
//!
//! Build it via [`ServiceConfig::builder()`] or [`ServiceConfig::from_env()`].

use crate::error::MenuError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default provider name passed to `ProviderFactory`.
pub const DEFAULT_PROVIDER: &str = "gemini";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Local proxy used when development mode is on.
pub const DEFAULT_PROXY_URL: &str = "http://localhost:5000";

/// Configuration for the extraction service.
///
/// # Example
/// ```rust
/// use menu_extract::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .model("gemini-1.5-flash-latest")
///     .default_timeout_secs(45)
///     .build()
///     .unwrap();
/// assert_eq!(config.default_timeout_secs, 45);
/// ```
#[derive(Clone)]
pub struct ServiceConfig {
    /// Provider name handed to `ProviderFactory` (e.g. "gemini", "openai").
    pub provider_name: String,

    /// Model identifier. Default: `gemini-1.5-flash-latest`.
    pub model: String,

    /// Pre-constructed provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// API key handed directly to the named provider.
    ///
    /// When None, the provider's own variable is consulted (see
    /// [`provider_key_var`]). Ignored when `provider` is set.
    pub api_key: Option<String>,

    /// Sampling temperature. Default: 0.2.
    ///
    /// Low randomness keeps prices and dish names faithful to the page.
    pub temperature: f32,

    /// Nucleus sampling cutoff. Default: 0.8.
    pub top_p: f32,

    /// Maximum tokens the model may generate per unit. Default: 4096.
    pub max_tokens: usize,

    /// Rendering DPI for PDF pages. Range: 72–400. Default: 150.
    pub dpi: u32,

    /// Cap on the longest edge of a rendered page, in pixels. Default: 2000.
    pub max_rendered_pixels: u32,

    /// Download timeout used when the caller does not pass one. Default: 30.
    pub default_timeout_secs: u64,

    /// Route outbound traffic through [`ServiceConfig::proxy_url`]. Default: false.
    pub development: bool,

    /// Proxy used in development mode. Default: `http://localhost:5000`.
    pub proxy_url: String,

    /// Directory containing libpdfium. If None, the system library is used.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Directory for scratch files (DOCX extraction). If None, the OS temp dir.
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider_name: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            provider: None,
            api_key: None,
            temperature: 0.2,
            top_p: 0.8,
            max_tokens: 4096,
            dpi: 150,
            max_rendered_pixels: 2000,
            default_timeout_secs: 30,
            development: false,
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            pdfium_lib_path: None,
            scratch_dir: None,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("default_timeout_secs", &self.default_timeout_secs)
            .field("development", &self.development)
            .field("proxy_url", &self.proxy_url)
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("scratch_dir", &self.scratch_dir)
            .finish()
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a configuration from the process environment.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `MENU_API_KEY`, else the provider's own key variable | `api_key` |
    /// | `DEVELOPMENT` | `development` (`True`, `true` or `1`) |
    /// | `MENU_LLM_PROVIDER` | `provider_name` |
    /// | `MENU_MODEL` | `model` |
    /// | `PDFIUM_LIB_PATH` | `pdfium_lib_path` |
    pub fn from_env() -> Result<Self, MenuError> {
        let mut builder = Self::builder();

        if let Some(flag) = non_empty_var("DEVELOPMENT") {
            builder = builder.development(parse_flag(&flag));
        }
        if let Some(provider) = non_empty_var("MENU_LLM_PROVIDER") {
            builder = builder.provider_name(provider);
        }
        if let Some(model) = non_empty_var("MENU_MODEL") {
            builder = builder.model(model);
        }
        if let Some(path) = non_empty_var("PDFIUM_LIB_PATH") {
            builder = builder.pdfium_lib_path(path);
        }
        if let Some(key) = api_key_from_env(&builder.config.provider_name) {
            builder = builder.api_key(key);
        }

        builder.build()
    }

    /// The proxy to route outbound traffic through, if any.
    pub fn active_proxy(&self) -> Option<&str> {
        self.development.then_some(self.proxy_url.as_str())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// The environment variable holding the API key of a keyed provider.
///
/// `None` for providers that need no key or are resolved by
/// `ProviderFactory` alone (ollama, lmstudio, mock, ...).
pub fn provider_key_var(provider_name: &str) -> Option<&'static str> {
    match provider_name.trim().to_ascii_lowercase().as_str() {
        "gemini" => Some("GEMINI_API_KEY"),
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        _ => None,
    }
}

/// `MENU_API_KEY` if set, else the selected provider's own key variable.
pub fn api_key_from_env(provider_name: &str) -> Option<String> {
    non_empty_var("MENU_API_KEY").or_else(|| provider_key_var(provider_name).and_then(non_empty_var))
}

/// Interpret an environment flag. Accepts `True`, `true`, `1`, `yes`.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.config.top_p = p.clamp(0.0, 1.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn default_timeout_secs(mut self, secs: u64) -> Self {
        self.config.default_timeout_secs = secs;
        self
    }

    pub fn development(mut self, v: bool) -> Self {
        self.config.development = v;
        self
    }

    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.config.proxy_url = url.into();
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.scratch_dir = Some(dir.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, MenuError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(MenuError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.default_timeout_secs == 0 {
            return Err(MenuError::InvalidConfig(
                "Default timeout must be ≥ 1 second".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(MenuError::InvalidConfig("Model must not be empty".into()));
        }
        if c.development && reqwest::Url::parse(&c.proxy_url).is_err() {
            return Err(MenuError::InvalidConfig(format!(
                "Proxy URL is not a valid URL: '{}'",
                c.proxy_url
            )));
        }
        Ok(self.config)
    }
}
