//! Is this site WordPress at all?

use crate::page::Homepage;
use crate::probe::ProbeClient;
use futures::future::join_all;
use log::debug;
use serde_json::Value;

/// WordPress REST API root
const WP_JSON_PATH: &str = "/wp-json/";

/// Files every WordPress install serves
const COMMON_FILES: &[&str] = &["/wp-login.php", "/xmlrpc.php", "/wp-admin/"];

/// Statuses that prove a common file exists
const EXISTS_STATUSES: &[u16] = &[200, 302, 403];

/// Which check classified the site as WordPress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceSignal {
    MetaGenerator,
    AssetPaths,
    RestApi,
    CommonFiles,
}

/// Run the presence checks in priority order, stopping at the first hit
///
/// `None` is a definitive negative, not an error.
pub async fn detect(homepage: &Homepage, client: &ProbeClient) -> Option<PresenceSignal> {
    if has_wordpress_generator(homepage) {
        return Some(PresenceSignal::MetaGenerator);
    }

    if has_asset_paths(&homepage.html) {
        return Some(PresenceSignal::AssetPaths);
    }

    if rest_api_answers(client).await {
        return Some(PresenceSignal::RestApi);
    }

    if common_files_exist(client).await {
        return Some(PresenceSignal::CommonFiles);
    }

    None
}

/// `<meta name="generator">` mentioning WordPress
pub fn has_wordpress_generator(homepage: &Homepage) -> bool {
    homepage
        .dom
        .generator()
        .is_some_and(|content| content.to_lowercase().contains("wordpress"))
}

/// `wp-content` or `wp-includes` anywhere in the raw HTML
pub fn has_asset_paths(html: &str) -> bool {
    html.contains("wp-content") || html.contains("wp-includes")
}

/// `GET /wp-json/` returns a JSON object with WordPress root keys
async fn rest_api_answers(client: &ProbeClient) -> bool {
    let response = match client.get(WP_JSON_PATH).await {
        Ok(response) if response.status == 200 => response,
        Ok(response) => {
            debug!("wp-json answered {}", response.status);
            return false;
        }
        Err(e) => {
            debug!("wp-json probe failed: {}", e);
            return false;
        }
    };

    is_wp_json_root(&response.body)
}

/// Body parses as an object with `namespaces` or `authentication`
pub fn is_wp_json_root(body: &str) -> bool {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => {
            map.contains_key("namespaces") || map.contains_key("authentication")
        }
        _ => false,
    }
}

/// HEAD the common files concurrently; any existing one is enough
async fn common_files_exist(client: &ProbeClient) -> bool {
    let checks = COMMON_FILES.iter().map(|path| async move {
        match client.head(path, None).await {
            Ok(response) => response.status_in(EXISTS_STATUSES),
            Err(e) => {
                debug!("HEAD {} failed: {}", path, e);
                false
            }
        }
    });

    join_all(checks).await.into_iter().any(|exists| exists)
}
