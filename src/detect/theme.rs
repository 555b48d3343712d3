//! Active theme detection

use crate::model::ThemeInfo;
use crate::page::Homepage;
use crate::probe::ProbeClient;
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

use super::plugins::is_valid_slug;
use super::{display_name, most_frequent};

/// Bytes of style.css read for the theme header
const STYLE_HEADER_BYTES: usize = 2000;

static THEME_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"/wp-content/themes/([^/'"\s<>]+)/"#).expect("theme path regex")
});
static STYLE_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Version:\s*([\d.]+)").expect("style version regex"));
static STYLE_AUTHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Author:\s*([^\n]+)").expect("style author regex"));

/// Detect the active theme and enrich it from its directory
pub async fn detect(homepage: &Homepage, client: &ProbeClient) -> Option<ThemeInfo> {
    let slug = active_slug(&homepage.html)?;
    debug!("active theme slug: {}", slug);

    let base = format!("/wp-content/themes/{}/", slug);
    let template_url = client.resolve(&base).ok().map(String::from);

    let screenshot_path = format!("{}screenshot.png", base);
    let style_path = format!("{}style.css", base);
    let (screenshot_url, (version, author)) = tokio::join!(
        screenshot(client, &screenshot_path),
        style_header(client, &style_path),
    );

    Some(ThemeInfo {
        name: display_name(&slug),
        slug,
        version,
        author,
        template_url,
        screenshot_url,
    })
}

/// Most referenced well-formed theme slug in the homepage
pub fn active_slug(html: &str) -> Option<String> {
    let slugs = THEME_PATH_RE
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|slug| is_valid_slug(slug));
    most_frequent(slugs)
}

/// Screenshot URL when `HEAD` answers 200
async fn screenshot(client: &ProbeClient, path: &str) -> Option<String> {
    match client.head(path, None).await {
        Ok(response) if response.status == 200 => client.resolve(path).ok().map(String::from),
        Ok(_) => None,
        Err(e) => {
            debug!("screenshot probe failed: {}", e);
            None
        }
    }
}

/// Version and author from the style.css header comment
async fn style_header(client: &ProbeClient, path: &str) -> (Option<String>, Option<String>) {
    match client.get_prefix(path, STYLE_HEADER_BYTES, None).await {
        Ok(response) if response.status == 200 => parse_style_header(&response.body),
        Ok(_) => (None, None),
        Err(e) => {
            debug!("style.css probe failed: {}", e);
            (None, None)
        }
    }
}

/// Extract `Version:` and `Author:` from a stylesheet header
pub fn parse_style_header(css: &str) -> (Option<String>, Option<String>) {
    let field = |re: &Regex| {
        re.captures(css)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|v| !v.is_empty())
    };
    (field(&STYLE_VERSION_RE), field(&STYLE_AUTHOR_RE))
}
