//! Homepage snapshot shared by all detectors
//!
//! The homepage is parsed exactly once. Detectors that scan raw text use
//! [`Homepage::html`]; detectors that need structure use [`Homepage::dom`],
//! which holds everything pulled out of the parsed tree. Both are plain owned
//! data so the snapshot can be borrowed by concurrent detectors.

use reqwest::header::HeaderMap;
use scraper::{Html, Node, Selector};
use std::sync::LazyLock;
use url::Url;

static LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[href]").expect("link[href] selector"));
static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("script selector"));
static META: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta").expect("meta selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("title selector"));
static HTML_ROOT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("html").expect("html selector"));

/// Attributes of one `<meta>` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaTag {
    pub name: Option<String>,
    pub content: Option<String>,
    pub charset: Option<String>,
}

/// Structural facts extracted from the parsed homepage
#[derive(Debug, Clone, Default)]
pub struct DomSnapshot {
    /// `href` of every `<link>`
    pub link_hrefs: Vec<String>,
    /// `src` of every external `<script>`
    pub script_srcs: Vec<String>,
    /// Bodies of inline `<script>` elements
    pub inline_scripts: Vec<String>,
    /// Text of every HTML comment
    pub comments: Vec<String>,
    /// Every `<meta>` element, in document order
    pub meta: Vec<MetaTag>,
    /// First `<title>` text, trimmed
    pub title: Option<String>,
    /// `lang` attribute of `<html>`
    pub lang: Option<String>,
}

impl DomSnapshot {
    /// Parse `html` and walk it once
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let link_hrefs = document
            .select(&LINK)
            .filter_map(|e| e.value().attr("href"))
            .map(str::to_string)
            .collect();

        let mut script_srcs = Vec::new();
        let mut inline_scripts = Vec::new();
        for script in document.select(&SCRIPT) {
            match script.value().attr("src") {
                Some(src) => script_srcs.push(src.to_string()),
                None => {
                    let body: String = script.text().collect();
                    if !body.trim().is_empty() {
                        inline_scripts.push(body);
                    }
                }
            }
        }

        let comments = document
            .tree
            .values()
            .filter_map(|node| match node {
                Node::Comment(comment) => Some(comment.comment.to_string()),
                _ => None,
            })
            .collect();

        let meta = document
            .select(&META)
            .map(|e| {
                let attr = |name: &str| e.value().attr(name).map(str::to_string);
                MetaTag {
                    name: attr("name"),
                    content: attr("content"),
                    charset: attr("charset"),
                }
            })
            .collect();

        let title = document
            .select(&TITLE)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string());

        let lang = document
            .select(&HTML_ROOT)
            .next()
            .and_then(|e| e.value().attr("lang"))
            .map(str::to_string);

        Self {
            link_hrefs,
            script_srcs,
            inline_scripts,
            comments,
            meta,
            title,
            lang,
        }
    }

    /// Content of the first `<meta name="generator">`
    pub fn generator(&self) -> Option<&str> {
        self.meta_content("generator")
    }

    /// Content of the first `<meta name="...">` matching `name` case-insensitively
    pub fn meta_content(&self, name: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|m| m.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
            .map(|m| m.content.as_deref().unwrap_or(""))
    }

    /// Every `<meta name="generator">` content, in document order
    pub fn generators(&self) -> impl Iterator<Item = &str> {
        self.meta
            .iter()
            .filter(|m| {
                m.name
                    .as_deref()
                    .is_some_and(|n| n.eq_ignore_ascii_case("generator"))
            })
            .filter_map(|m| m.content.as_deref())
    }

    /// `charset` of the first `<meta charset>`
    pub fn charset(&self) -> Option<&str> {
        self.meta.iter().find_map(|m| m.charset.as_deref())
    }
}

/// The one homepage fetch of a scan
#[derive(Debug, Clone)]
pub struct Homepage {
    /// URL the homepage was served from (after redirects)
    pub url: Url,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body, for substring and regex scans
    pub html: String,
    /// Parsed structure
    pub dom: DomSnapshot,
}

impl Homepage {
    /// Build a snapshot from a fetched body
    pub fn new(url: Url, headers: HeaderMap, html: String) -> Self {
        let dom = DomSnapshot::parse(&html);
        Self {
            url,
            headers,
            html,
            dom,
        }
    }

    /// Header value as text, if present and valid
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
