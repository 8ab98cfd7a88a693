/// Rate limiting for the public forms and operator login
///
/// Implements sliding window rate limiting using in-memory storage (DashMap).
/// This is suitable for single-instance deployments.
///
/// Limits come from the `[rate_limit]` section of the application
/// configuration and can be swapped at runtime.
///
/// # Example Usage
///
/// ```rust,ignore
/// use folio::rate_limit::check_comment_rate_limit;
///
/// if let Err(e) = check_comment_rate_limit("192.168.1.1") {
///     return Err(ApiError::TooManyRequests(e.retry_after_seconds));
/// }
/// ```
use crate::app_config;
use arc_swap::ArcSwap;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Global rate limiter instance
pub static RATE_LIMITER: Lazy<Arc<RateLimiter>> = Lazy::new(|| Arc::new(RateLimiter::new()));

/// Global rate limit configuration (hot-reloadable)
static RATE_LIMIT_CONFIG: Lazy<ArcSwap<RateLimitConfig>> =
    Lazy::new(|| ArcSwap::from_pointee(RateLimitConfig::default()));

/// Resolved limits per action
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub comment_max: usize,
    pub comment_window: Duration,
    pub like_max: usize,
    pub like_window: Duration,
    pub contact_max: usize,
    pub contact_window: Duration,
    pub login_max: usize,
    pub login_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::from_settings(&app_config::RateLimitConfig::default())
    }
}

impl RateLimitConfig {
    /// Convert the configuration file section into durations
    pub fn from_settings(settings: &app_config::RateLimitConfig) -> Self {
        let secs = |s: u32| Duration::from_secs(s as u64);
        Self {
            comment_max: settings.comment_max as usize,
            comment_window: secs(settings.comment_window_seconds),
            like_max: settings.like_max as usize,
            like_window: secs(settings.like_window_seconds),
            contact_max: settings.contact_max as usize,
            contact_window: secs(settings.contact_window_seconds),
            login_max: settings.login_max as usize,
            login_window: secs(settings.login_window_seconds),
        }
    }
}

/// Install limits (call at startup after loading configuration, and again
/// after a reload)
pub fn init_rate_limits(settings: &app_config::RateLimitConfig) {
    RATE_LIMIT_CONFIG.store(Arc::new(RateLimitConfig::from_settings(settings)));
    log::info!("Rate limit configuration initialized");
}

/// Get the current rate limit configuration
pub fn get_rate_limit_config() -> Arc<RateLimitConfig> {
    RATE_LIMIT_CONFIG.load_full()
}

/// Rate limiter using in-memory storage
pub struct RateLimiter {
    /// Map of (action_type:identifier) -> Request timestamps
    requests: DashMap<String, Vec<Instant>>,
}

/// Error returned when rate limit is exceeded
#[derive(Debug, Clone)]
pub struct RateLimitError {
    /// Number of seconds until the rate limit resets
    pub retry_after_seconds: u64,
}

impl std::fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Too many requests, retry in {} seconds",
            self.retry_after_seconds
        )
    }
}

impl std::error::Error for RateLimitError {}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            requests: DashMap::new(),
        }
    }

    /// Check if a request should be rate limited
    ///
    /// # Arguments
    /// * `action` - The action being rate limited (e.g., "comment", "login")
    /// * `identifier` - Unique identifier for the requester (e.g., IP address)
    /// * `max_requests` - Maximum number of requests allowed in the window
    /// * `window` - Time window for the rate limit
    pub fn check_rate_limit(
        &self,
        action: &str,
        identifier: &str,
        max_requests: usize,
        window: Duration,
    ) -> Result<(), RateLimitError> {
        let key = format!("{}:{}", action, identifier);
        let now = Instant::now();

        let mut entry = self.requests.entry(key).or_default();

        // Sliding window
        entry.retain(|&timestamp| now.duration_since(timestamp) < window);

        if entry.len() >= max_requests {
            let oldest = entry[0];
            let retry_after = window.saturating_sub(now.duration_since(oldest));

            return Err(RateLimitError {
                retry_after_seconds: retry_after.as_secs() + 1, // Round up
            });
        }

        entry.push(now);

        Ok(())
    }

    /// Drop keys whose requests have all left `max_window`.
    ///
    /// Called periodically to keep memory bounded.
    pub fn cleanup_old_entries(&self, max_window: Duration) {
        let now = Instant::now();
        self.requests.retain(|_, timestamps| {
            timestamps.retain(|&t| now.duration_since(t) < max_window);
            !timestamps.is_empty()
        });
    }

    /// Clear all requests for a specific action/identifier
    pub fn clear_requests(&self, action: &str, identifier: &str) {
        let key = format!("{}:{}", action, identifier);
        self.requests.remove(&key);
    }

    /// Get the number of tracked keys (for monitoring/debugging)
    pub fn tracked_keys_count(&self) -> usize {
        self.requests.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helper functions for rate-limited actions
// ============================================================================

/// Comment submissions, per IP address
pub fn check_comment_rate_limit(ip: &str) -> Result<(), RateLimitError> {
    let config = get_rate_limit_config();
    RATE_LIMITER.check_rate_limit("comment", ip, config.comment_max, config.comment_window)
}

/// Like toggles, per IP address
pub fn check_like_rate_limit(ip: &str) -> Result<(), RateLimitError> {
    let config = get_rate_limit_config();
    RATE_LIMITER.check_rate_limit("like", ip, config.like_max, config.like_window)
}

/// Contact form messages, per IP address
pub fn check_contact_rate_limit(ip: &str) -> Result<(), RateLimitError> {
    let config = get_rate_limit_config();
    RATE_LIMITER.check_rate_limit("contact", ip, config.contact_max, config.contact_window)
}

/// Operator login attempts, per IP and email combination
pub fn check_login_rate_limit(ip: &str, email: &str) -> Result<(), RateLimitError> {
    let config = get_rate_limit_config();
    RATE_LIMITER.check_rate_limit(
        "login",
        &format!("{}:{}", ip, email.to_lowercase()),
        config.login_max,
        config.login_window,
    )
}

/// Forget login attempts after a successful login
pub fn clear_login_attempts(ip: &str, email: &str) {
    RATE_LIMITER.clear_requests("login", &format!("{}:{}", ip, email.to_lowercase()));
}

/// Prune the global limiter using the longest configured window
pub fn cleanup_old_entries_public() {
    let config = get_rate_limit_config();
    let longest = [
        config.comment_window,
        config.like_window,
        config.contact_window,
        config.login_window,
    ]
    .into_iter()
    .max()
    .unwrap_or(Duration::from_secs(3600));
    RATE_LIMITER.cleanup_old_entries(longest);
}
