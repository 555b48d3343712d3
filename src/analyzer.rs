//! Scan orchestration
//!
//! A scan fetches the homepage once, classifies the site, fans the detectors
//! out over the shared snapshot and merges their return values into one
//! [`SiteInfo`]. The whole span runs under the configured analysis timeout.

use crate::config::AnalyzerConfig;
use crate::detect::{metadata, plugins, presence, security, server, theme, version};
use crate::error::{Error, FetchError, Result};
use crate::model::SiteInfo;
use crate::page::Homepage;
use crate::probe::ProbeClient;
use crate::target::ScanTarget;
use log::{debug, info, warn};
use std::future::Future;
use std::time::{Duration, Instant};

/// Base delay between homepage fetch attempts
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// WordPress site analyzer
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Create an analyzer with the given settings
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Settings this analyzer runs with
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a URL or bare domain
    ///
    /// A reachable site that is not WordPress is a successful scan with
    /// `is_wordpress == false`. Only an unreachable homepage
    /// ([`Error::Fetch`]) or an expired scan ([`Error::Timeout`]) fail.
    pub async fn analyze(&self, url: &str, deep_scan: bool) -> Result<SiteInfo> {
        let target = ScanTarget::parse(url, deep_scan)?;
        self.analyze_target(&target).await
    }

    /// Analyze an already normalized target
    pub async fn analyze_target(&self, target: &ScanTarget) -> Result<SiteInfo> {
        let started = Instant::now();
        info!("analyzing {} (deep scan: {})", target.url, target.deep_scan);

        // Dropped when the scan ends, closing its connections.
        let client = ProbeClient::new(target.url.clone(), &self.config)?;

        let timeout = self.config.analysis_timeout;
        let mut site = match tokio::time::timeout(timeout, self.run(target, &client)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("analysis of {} timed out after {:?}", target.url, timeout);
                return Err(Error::Timeout(timeout));
            }
        };

        let elapsed = started.elapsed();
        site.scan_duration_ms = Some(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        info!(
            "finished {} in {:?}: wordpress={} plugins={}",
            site.url,
            elapsed,
            site.is_wordpress,
            site.plugin_count()
        );
        Ok(site)
    }

    async fn run(&self, target: &ScanTarget, client: &ProbeClient) -> Result<SiteInfo> {
        if !self.config.allow_private {
            target.check_host().await?;
        }

        let homepage = self.fetch_homepage(client).await?;
        let mut site = SiteInfo::new(target.url.as_str());

        match presence::detect(&homepage, client).await {
            Some(signal) => debug!("WordPress detected via {:?}", signal),
            None => {
                info!("{} does not appear to be WordPress", target.url);
                return Ok(site);
            }
        }
        site.is_wordpress = true;

        let config = &self.config;
        let (wordpress_version, theme, plugins, security_info) = tokio::join!(
            enabled(config.detect_version, version::detect(&homepage, client)),
            enabled(config.detect_theme, theme::detect(&homepage, client)),
            enabled(
                config.detect_plugins,
                plugins::detect(&homepage, client, target.deep_scan, config.probe_timeout),
            ),
            security::detect(client),
        );

        site.wordpress_version = wordpress_version.flatten();
        site.theme = theme.flatten();
        site.plugins = plugins.unwrap_or_default();
        site.server_info = server::detect(&homepage);
        site.security_info = Some(security_info);
        site.metadata = Some(metadata::extract(&homepage.dom));

        Ok(site)
    }

    /// Fetch the homepage, retrying transport failures only
    async fn fetch_homepage(&self, client: &ProbeClient) -> Result<Homepage> {
        let url = client.base_url().as_str();
        let mut attempt = 0;

        loop {
            match client.get(url).await {
                Ok(response) if response.is_success() => {
                    return Ok(Homepage::new(response.url, response.headers, response.body));
                }
                Ok(response) => return Err(FetchError::Status(response.status).into()),
                Err(e) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(
                        "homepage fetch failed ({}), retry {}/{}",
                        e, attempt, self.config.max_retries
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(e) => return Err(FetchError::Request(e.to_string()).into()),
            }
        }
    }
}

/// Run `detector` only when enabled; a disabled detector is never polled
async fn enabled<T>(on: bool, detector: impl Future<Output = T>) -> Option<T> {
    if on { Some(detector.await) } else { None }
}
