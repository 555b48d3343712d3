//! Server software from homepage headers; no extra request

use crate::model::{PhpVersion, ServerInfo};
use crate::page::Homepage;
use regex::Regex;
use std::sync::LazyLock;

static PHP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PHP/([\d.]+)").expect("php regex"));

/// Read `Server` and `X-Powered-By`; `None` when neither says anything
pub fn detect(homepage: &Homepage) -> Option<ServerInfo> {
    let header = |name| {
        homepage
            .header(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let server = header("server");
    let powered_by = header("x-powered-by");
    let php_version = powered_by.as_deref().and_then(php_version);

    let info = ServerInfo {
        server,
        powered_by,
        php_version,
    };
    (!info.is_empty()).then_some(info)
}

/// PHP version from an `X-Powered-By` value
pub fn php_version(powered_by: &str) -> Option<PhpVersion> {
    PHP_RE.captures(powered_by)?.get(1).map(|m| PhpVersion {
        version: m.as_str().to_string(),
        detected_from: "x_powered_by_header".to_string(),
    })
}
