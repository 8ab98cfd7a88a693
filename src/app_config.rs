//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with FOLIO_, sections split by `__`)
//! 2. Config file (folio.toml)
//! 3. Default values
//!
//! Secrets like the relay API key or SMTP password should be kept in
//! environment variables (e.g. `FOLIO_RELAY__API_KEY`), not in the config file.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Global application configuration
pub static APP_CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    }))
});

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Folio".to_string(),
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind: String,
    /// Mark the session cookie `Secure` (requires HTTPS)
    pub cookie_secure: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            cookie_secure: false,
        }
    }
}

/// Comment pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    /// Reject submissions for slugs that are not a published article
    pub require_published_article: bool,
    /// Lifetime of cached public listings in seconds
    pub public_cache_ttl_seconds: u64,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            require_published_article: false,
            public_cache_ttl_seconds: 30,
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum failed login attempts before account lockout
    pub max_failed_logins: u32,
    /// Account lockout duration in minutes
    pub lockout_duration_minutes: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_failed_logins: 5,
            lockout_duration_minutes: 15,
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Comment submissions per window per IP
    pub comment_max: u32,
    pub comment_window_seconds: u32,
    /// Like toggles per window per IP
    pub like_max: u32,
    pub like_window_seconds: u32,
    /// Contact form messages per window per IP
    pub contact_max: u32,
    pub contact_window_seconds: u32,
    /// Operator login attempts per window per IP and email
    pub login_max: u32,
    pub login_window_seconds: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            comment_max: 5,
            comment_window_seconds: 600,
            like_max: 30,
            like_window_seconds: 60,
            contact_max: 3,
            contact_window_seconds: 3600,
            login_max: 5,
            login_window_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayTransport {
    /// JSON API of a transactional email provider
    Http,
    /// Plain SMTP submission
    Smtp,
}

/// Contact form email relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub transport: RelayTransport,
    /// Endpoint of the transactional email API
    pub api_url: String,
    /// API key (should be in env var FOLIO_RELAY__API_KEY)
    pub api_key: String,
    /// Sender mailbox, e.g. `Studio <onboarding@example.com>`
    pub from: String,
    /// Operator inbox every contact message is sent to
    pub to: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_tls: bool,
    pub smtp_username: String,
    /// SMTP password (should be in env var FOLIO_RELAY__SMTP_PASSWORD)
    pub smtp_password: String,
    /// Log messages instead of sending them
    pub mock: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            transport: RelayTransport::Http,
            api_url: "https://api.resend.com/emails".to_string(),
            api_key: String::new(),
            from: "Folio <onboarding@resend.dev>".to_string(),
            to: "contact@localhost".to_string(),
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_tls: true,
            smtp_username: String::new(),
            smtp_password: String::new(),
            mock: false,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub server: ServerConfig,
    pub comments: CommentsConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
    pub relay: RelayConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("folio.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // e.g. FOLIO_SITE__NAME, FOLIO_RELAY__API_KEY
            .add_source(
                Environment::with_prefix("FOLIO")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Initialize application configuration
///
/// Triggers the lazy loading of the config file and logs the result.
/// Should be called early in application startup.
pub fn init() {
    let config = get_config();
    log::info!(
        "Configuration loaded: site.name = {}, relay transport = {:?}",
        config.site.name,
        config.relay.transport
    );
}

/// Get the current application configuration
pub fn get_config() -> AppConfig {
    APP_CONFIG.read().map(|c| c.clone()).unwrap_or_default()
}

pub fn comments() -> CommentsConfig {
    get_config().comments
}

pub fn security() -> SecurityConfig {
    get_config().security
}
