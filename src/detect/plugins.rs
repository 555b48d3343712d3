//! Plugin detection
//!
//! Cheap methods run over the homepage snapshot and always contribute. With
//! `deep_scan`, HTML-comment candidates and a list of popular plugins are
//! added after [`verify`](super::verify) confirms them. Every surviving slug is
//! then enriched from its `readme.txt`.

use crate::model::PluginInfo;
use crate::page::Homepage;
use crate::probe::ProbeClient;
use futures::future::join_all;
use log::debug;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;
use std::time::Duration;

use super::{display_name, truncate_chars, verify};

/// Bytes of readme.txt read from the server
const README_PREFIX_BYTES: usize = 3000;

/// Characters of readme.txt considered
const README_PREFIX_CHARS: usize = 3000;

/// Maximum description length in characters
const MAX_DESCRIPTION_CHARS: usize = 200;

/// Shortest description worth reporting
const MIN_DESCRIPTION_CHARS: usize = 11;

/// Shortest slug accepted from an HTML comment
const MIN_COMMENT_SLUG_LEN: usize = 4;

/// HTML fingerprints of well-known plugins, matched case-insensitively
const PLUGIN_INDICATORS: &[(&str, &str)] = &[
    ("yoast", "wordpress-seo"),
    ("woocommerce", "woocommerce"),
    ("elementor", "elementor"),
    ("wpforms", "wpforms"),
    ("wp-rocket", "wp-rocket"),
    ("jetpack", "jetpack"),
    ("akismet", "akismet"),
    ("wordfence", "wordfence"),
    ("contact-form-7", "contact-form-7"),
    ("wp-super-cache", "wp-super-cache"),
    ("all-in-one-seo", "all-in-one-seo-pack"),
    ("rankmath", "seo-by-rank-math"),
    ("wp-optimize", "wp-optimize"),
    ("smush", "wp-smushit"),
    ("updraft", "updraftplus"),
];

/// Popular plugins probed speculatively in deep scans
const POPULAR_PLUGINS: &[&str] = &[
    "wordpress-seo",
    "akismet",
    "jetpack",
    "contact-form-7",
    "woocommerce",
    "elementor",
    "wpforms-lite",
    "wordfence",
    "wp-super-cache",
    "classic-editor",
    "duplicate-post",
    "google-analytics-for-wordpress",
    "all-in-one-seo-pack",
    "wp-mail-smtp",
    "updraftplus",
    "wp-optimize",
    "smush",
    "really-simple-ssl",
    "redirection",
    "wpforms",
    "sucuri-scanner",
];

static HTML_PLUGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)/wp-content/plugins/([^/'"?\s]+)"#).expect("plugin path regex")
});
static ATTR_PLUGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/wp-content/plugins/([^/]+)/").expect("attribute regex"));
static INLINE_PLUGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"/wp-content/plugins/([^/'"]+)"#).expect("inline script regex")
});
static COMMENT_PLUGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:plugin[:\s]+|wp-)([a-z0-9-]+)").expect("comment regex")
});
static VALID_SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9\-_]+$").expect("slug regex"));
static STABLE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Stable tag:\s*([\d.]+)").expect("stable tag regex"));
static DESCRIPTION_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?is)===\s*Description\s*===\s*(.*?)(?:\n===|\z)"),
        Regex::new(r"(?is)Description:\s*(.*?)(?:\n[A-Z][a-z]+:|\n===|\z)"),
        Regex::new(r"(?is)(?:^|\n)(.*?)(?:\n===|\z)"),
    ]
    .map(|re| re.expect("description regex"))
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));

/// Detect installed plugins
pub async fn detect(
    homepage: &Homepage,
    client: &ProbeClient,
    deep_scan: bool,
    probe_timeout: Duration,
) -> Vec<PluginInfo> {
    let mut slugs = cheap_candidates(homepage);

    if deep_scan {
        let from_comments: Vec<String> = comment_candidates(&homepage.dom.comments)
            .into_iter()
            .filter(|slug| !slugs.contains(slug))
            .collect();
        let popular: Vec<String> = POPULAR_PLUGINS
            .iter()
            .filter(|slug| !slugs.contains(**slug))
            .map(|slug| slug.to_string())
            .collect();

        let (confirmed_comments, confirmed_popular) = tokio::join!(
            verify::confirm_plugins(client, from_comments, probe_timeout),
            verify::confirm_plugins(client, popular, probe_timeout),
        );
        debug!(
            "deep scan confirmed {} comment and {} popular candidates",
            confirmed_comments.len(),
            confirmed_popular.len()
        );
        slugs.extend(confirmed_comments);
        slugs.extend(confirmed_popular);
    }

    let valid: Vec<String> = slugs.into_iter().filter(|s| is_valid_slug(s)).collect();
    let infos = valid
        .into_iter()
        .map(|slug| plugin_info(client, slug, probe_timeout));

    join_all(infos).await
}

/// Candidates from every method that needs no extra request
///
/// Ordered and unique by slug.
pub fn cheap_candidates(homepage: &Homepage) -> BTreeSet<String> {
    let dom = &homepage.dom;
    let mut slugs = BTreeSet::new();

    // raw HTML
    slugs.extend(captures(&HTML_PLUGIN_RE, &homepage.html));

    for href in &dom.link_hrefs {
        slugs.extend(captures(&ATTR_PLUGIN_RE, href).next());
    }

    for src in &dom.script_srcs {
        slugs.extend(captures(&ATTR_PLUGIN_RE, src).next());
    }

    for body in &dom.inline_scripts {
        slugs.extend(captures(&INLINE_PLUGIN_RE, body).next());
    }

    for meta in &dom.meta {
        let text = format!(
            "{}{}",
            meta.content.as_deref().unwrap_or(""),
            meta.name.as_deref().unwrap_or("")
        );
        slugs.extend(captures(&ATTR_PLUGIN_RE, &text).next());
    }

    let html_lower = homepage.html.to_lowercase();
    slugs.extend(indicated_slugs(&html_lower));

    for generator in dom.generators() {
        let generator = generator.to_lowercase();
        let mentions_plugin = generator.contains("plugin")
            || PLUGIN_INDICATORS.iter().any(|(ind, _)| generator.contains(ind));
        if mentions_plugin {
            slugs.extend(indicated_slugs(&generator));
        }
    }

    slugs
}

/// Slugs guessed from HTML comments mentioning plugins; unverified
pub fn comment_candidates(comments: &[String]) -> Vec<String> {
    let mut candidates = Vec::new();
    for comment in comments {
        let text = comment.to_lowercase();
        if !(text.contains("plugin") || text.contains("wp-")) {
            continue;
        }
        let Some(slug) = captures(&COMMENT_PLUGIN_RE, &text).next() else {
            continue;
        };
        if slug.len() >= MIN_COMMENT_SLUG_LEN && !candidates.contains(&slug) {
            candidates.push(slug);
        }
    }
    candidates
}

/// Slugs of well-known plugins whose fingerprint occurs in `text_lower`
fn indicated_slugs(text_lower: &str) -> impl Iterator<Item = String> + '_ {
    PLUGIN_INDICATORS
        .iter()
        .filter(move |(indicator, _)| text_lower.contains(indicator))
        .map(|(_, slug)| slug.to_string())
}

/// Slug shape accepted for reporting
pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() >= 2 && VALID_SLUG_RE.is_match(slug)
}

fn captures<'a>(re: &'a Regex, text: &'a str) -> impl Iterator<Item = String> + 'a {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
}

/// Build the plugin entry, reading readme.txt when it is served
///
/// Existence is already established, so a failed readme fetch only leaves
/// version and description unset.
async fn plugin_info(client: &ProbeClient, slug: String, timeout: Duration) -> PluginInfo {
    let mut info = PluginInfo {
        name: display_name(&slug.replace('_', " ")),
        slug,
        version: None,
        description: None,
    };

    let path = format!("/wp-content/plugins/{}/readme.txt", info.slug);
    match client.get_prefix(&path, README_PREFIX_BYTES, Some(timeout)).await {
        Ok(response) if response.status == 200 => {
            let (version, description) = parse_readme(&response.body);
            info.version = version;
            info.description = description;
        }
        Ok(response) => debug!("{} answered {}", path, response.status),
        Err(e) => debug!("{} probe failed: {}", path, e),
    }

    info
}

/// Stable tag and description from a readme.txt body
///
/// Bodies that are really HTML pages (catch-all 200 responses) yield nothing.
pub fn parse_readme(body: &str) -> (Option<String>, Option<String>) {
    let content = truncate_chars(body, README_PREFIX_CHARS);

    let head = content.trim_start().to_lowercase();
    if head.starts_with("<!doctype") || head.starts_with("<html") {
        return (None, None);
    }

    let version = STABLE_TAG_RE
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string());

    let description = DESCRIPTION_RES.iter().find_map(|re| {
        let raw = re.captures(content)?.get(1)?.as_str();
        let stripped = TAG_RE.replace_all(raw.trim(), "");
        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        (collapsed.chars().count() >= MIN_DESCRIPTION_CHARS)
            .then(|| truncate_chars(&collapsed, MAX_DESCRIPTION_CHARS).to_string())
    });

    (version, description)
}
