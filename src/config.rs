//! Analyzer configuration
//!
//! Built once by the caller and handed to [`Analyzer::new`](crate::Analyzer::new).
//! Nothing here is global, so concurrent scans can run with different settings.

use std::time::Duration;

/// User agent for requests (standard Chrome on Windows)
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Whole-scan timeout in seconds
pub const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 120;

/// Timeout for speculative HEAD checks and plugin readme fetches
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Homepage fetch retries on transport errors
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Settings consumed by the analyzer
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Timeout applied to every HTTP request by the client
    pub request_timeout: Duration,

    /// Upper bound for a whole scan, homepage fetch through merge
    pub analysis_timeout: Duration,

    /// Shorter timeout for opportunistic probes (HEAD verification, readme.txt)
    pub probe_timeout: Duration,

    /// Retries for the homepage fetch; other probes are never retried
    pub max_retries: u32,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Run the WordPress version detector
    pub detect_version: bool,

    /// Run the theme detector
    pub detect_theme: bool,

    /// Run the plugin detector
    pub detect_plugins: bool,

    /// Allow scanning private/internal IP addresses (localhost, 192.168.x.x, etc.)
    pub allow_private: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            analysis_timeout: Duration::from_secs(DEFAULT_ANALYSIS_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            detect_version: true,
            detect_theme: true,
            detect_plugins: true,
            allow_private: false,
        }
    }
}
