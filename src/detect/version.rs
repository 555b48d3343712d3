//! WordPress core version detection
//!
//! Methods are tried strictly in order and the first match wins:
//! meta generator, RSS feed, readme.html, then the most frequent `ver=`
//! query string on the homepage.

use crate::model::{VersionSource, WordPressVersion};
use crate::page::Homepage;
use crate::probe::ProbeClient;
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

use super::most_frequent;

const WP_FEED_PATH: &str = "/feed/";
const WP_README_PATH: &str = "/readme.html";

static GENERATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)WordPress\s+([\d.]+)").expect("generator regex"));
static FEED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"generator>https://wordpress\.org/\?v=([\d.]+)").expect("feed regex")
});
static README_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Version\s+([\d.]+)").expect("readme regex"));
static ASSET_VER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ver=([\d.]+)").expect("asset version regex"));

/// Detect the WordPress version
pub async fn detect(homepage: &Homepage, client: &ProbeClient) -> Option<WordPressVersion> {
    if let Some(version) = from_generator(homepage) {
        return Some(found(version, VersionSource::MetaGenerator));
    }

    if let Some(version) = from_remote(client, WP_FEED_PATH, &FEED_RE).await {
        return Some(found(version, VersionSource::RssFeed));
    }

    if let Some(version) = from_remote(client, WP_README_PATH, &README_RE).await {
        return Some(found(version, VersionSource::ReadmeHtml));
    }

    from_asset_versions(&homepage.html).map(|version| found(version, VersionSource::AssetVersion))
}

fn found(version: String, detected_from: VersionSource) -> WordPressVersion {
    debug!("WordPress version {} from {}", version, detected_from);
    WordPressVersion {
        version,
        detected_from,
    }
}

/// Version from `<meta name="generator" content="WordPress X.Y.Z">`
pub fn from_generator(homepage: &Homepage) -> Option<String> {
    let content = homepage.dom.generator()?;
    capture(&GENERATOR_RE, content)
}

/// Fetch `path` and apply `re` to a 200 body; any failure is a miss
async fn from_remote(client: &ProbeClient, path: &str, re: &Regex) -> Option<String> {
    match client.get(path).await {
        Ok(response) if response.status == 200 => capture(re, &response.body),
        Ok(response) => {
            debug!("{} answered {}", path, response.status);
            None
        }
        Err(e) => {
            debug!("{} probe failed: {}", path, e);
            None
        }
    }
}

/// Most frequent `ver=` value across the homepage
pub fn from_asset_versions(html: &str) -> Option<String> {
    let versions = ASSET_VER_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str());
    most_frequent(versions)
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)?.get(1).map(|m| m.as_str().to_string())
}
