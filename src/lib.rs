//! WordPress Analyzer - fingerprint WordPress sites from their public surface
//!
//! Detects whether a site runs WordPress and, if so, its version, active
//! theme, plugins, server software and security posture.
//!
//! # Example
//!
//! ```no_run
//! use wordpress_analyzer::{Analyzer, AnalyzerConfig};
//!
//! #[tokio::main]
//! async fn main() -> wordpress_analyzer::Result<()> {
//!     let analyzer = Analyzer::new(AnalyzerConfig::default());
//!     let site = analyzer.analyze("example.com", false).await?;
//!     if let Some(version) = &site.wordpress_version {
//!         println!("WordPress {}", version.version);
//!     }
//!     Ok(())
//! }
//! ```

pub mod analyzer;
pub mod config;
pub mod detect;
pub mod error;
pub mod model;
pub mod output;
pub mod page;
pub mod probe;
pub mod target;

pub use analyzer::Analyzer;
pub use config::AnalyzerConfig;
pub use error::{Error, FetchError, Result};
pub use model::{
    PhpVersion, PluginInfo, SecurityInfo, ServerInfo, SiteInfo, SiteMetadata, ThemeInfo,
    VersionSource, WordPressVersion,
};
pub use output::{OutputFormat, output_site_info};
pub use probe::{ProbeClient, ProbeFailure, ProbeResponse};
pub use target::ScanTarget;
