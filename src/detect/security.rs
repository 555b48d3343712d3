//! Security posture probes
//!
//! Each check is independent; a failed request leaves its flag `false`.

use crate::model::SecurityInfo;
use crate::probe::{ProbeClient, ProbeFailure, ProbeResponse};
use log::debug;

const XMLRPC_PATH: &str = "/xmlrpc.php";
const WP_JSON_PATH: &str = "/wp-json/";
const README_PATH: &str = "/readme.html";
const WP_CONTENT_PATH: &str = "/wp-content/";

/// Run all security probes concurrently
pub async fn detect(client: &ProbeClient) -> SecurityInfo {
    let (xmlrpc, wp_json, readme, wp_content) = tokio::join!(
        client.post(XMLRPC_PATH),
        client.get(WP_JSON_PATH),
        client.get(README_PATH),
        client.get(WP_CONTENT_PATH),
    );

    // 405 means the endpoint exists but wants a real XML-RPC call
    let xmlrpc_enabled = check(XMLRPC_PATH, xmlrpc, |r| r.status_in(&[200, 405]));
    let wp_json_exposed = check(WP_JSON_PATH, wp_json, |r| r.status == 200);
    let readme_accessible = check(README_PATH, readme, |r| r.status == 200);
    let directory_listing = check(WP_CONTENT_PATH, wp_content, is_directory_listing);

    SecurityInfo {
        xmlrpc_enabled,
        rest_api_enabled: wp_json_exposed,
        directory_listing,
        readme_accessible,
        wp_json_exposed,
    }
}

fn check(
    path: &str,
    result: Result<ProbeResponse, ProbeFailure>,
    passes: impl FnOnce(&ProbeResponse) -> bool,
) -> bool {
    match result {
        Ok(response) => passes(&response),
        Err(e) => {
            debug!("security probe {} failed: {}", path, e);
            false
        }
    }
}

/// 200 with an auto-generated index page
pub fn is_directory_listing(response: &ProbeResponse) -> bool {
    response.status == 200 && response.body.to_lowercase().contains("index of")
}
