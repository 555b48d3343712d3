//! Result model of a scan
//!
//! Optional fields are omitted from JSON when a signal was not determined;
//! an unknown value is never reported as an empty string.

use serde::Serialize;

/// Which method produced the WordPress version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSource {
    /// `<meta name="generator" content="WordPress X.Y">`
    MetaGenerator,
    /// `<generator>` element of `/feed/`
    RssFeed,
    /// `Version X.Y` in `/readme.html`
    ReadmeHtml,
    /// Most frequent `ver=` query string on the homepage
    AssetVersion,
}

impl std::fmt::Display for VersionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MetaGenerator => write!(f, "meta_generator"),
            Self::RssFeed => write!(f, "rss_feed"),
            Self::ReadmeHtml => write!(f, "readme_html"),
            Self::AssetVersion => write!(f, "asset_version"),
        }
    }
}

/// Detected WordPress core version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordPressVersion {
    pub version: String,
    pub detected_from: VersionSource,
}

/// Active theme
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThemeInfo {
    /// Directory name under `/wp-content/themes/`
    pub slug: String,
    /// Slug title-cased for display
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_url: Option<String>,
}

/// Installed plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    /// Directory name under `/wp-content/plugins/`
    pub slug: String,
    /// Slug title-cased for display
    pub name: String,
    /// `Stable tag` from readme.txt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// First description found in readme.txt, at most 200 characters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// PHP version and where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhpVersion {
    pub version: String,
    pub detected_from: String,
}

/// Server software read from homepage headers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub powered_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub php_version: Option<PhpVersion>,
}

impl ServerInfo {
    /// True when no header yielded anything
    pub fn is_empty(&self) -> bool {
        self.server.is_none() && self.powered_by.is_none() && self.php_version.is_none()
    }
}

/// Security posture checks; a failed probe leaves its flag `false`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SecurityInfo {
    pub xmlrpc_enabled: bool,
    pub rest_api_enabled: bool,
    pub directory_listing: bool,
    pub readme_accessible: bool,
    pub wp_json_exposed: bool,
}

/// General homepage metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charset: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
}

/// Everything learned about one site
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteInfo {
    /// Normalized target URL
    pub url: String,
    pub is_wordpress: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wordpress_version: Option<WordPressVersion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<ThemeInfo>,
    /// Unique by slug, sorted by slug
    pub plugins: Vec<PluginInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_info: Option<ServerInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_info: Option<SecurityInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SiteMetadata>,
    /// Wall-clock duration of the scan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_duration_ms: Option<u64>,
}

impl SiteInfo {
    /// Empty record for a scan that has not classified the site yet
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_wordpress: false,
            wordpress_version: None,
            theme: None,
            plugins: Vec::new(),
            server_info: None,
            security_info: None,
            metadata: None,
            scan_duration_ms: None,
        }
    }

    /// Get count of detected plugins
    pub fn plugin_count(&self) -> usize {
        self.plugins.len()
    }

    /// Look up a plugin by slug
    pub fn plugin(&self, slug: &str) -> Option<&PluginInfo> {
        self.plugins.iter().find(|p| p.slug == slug)
    }
}
