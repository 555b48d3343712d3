//! Speculative verification of weak plugin candidates
//!
//! A candidate from an HTML comment or from the popular-plugin list is only
//! reported once `HEAD /wp-content/plugins/<slug>/` proves the directory exists.

use crate::probe::{ProbeClient, ProbeFailure};
use futures::future::join_all;
use log::debug;
use std::time::Duration;

/// 403 means the directory exists but listing is forbidden
const EXISTS_STATUSES: &[u16] = &[200, 403];

/// HEAD the plugin directory and report whether it exists
pub async fn probe_plugin_dir(
    client: &ProbeClient,
    slug: &str,
    timeout: Duration,
) -> Result<bool, ProbeFailure> {
    let path = format!("/wp-content/plugins/{}/", slug);
    let response = client.head(&path, Some(timeout)).await?;
    Ok(response.status_in(EXISTS_STATUSES))
}

/// Verify candidates concurrently, keeping confirmed slugs in input order
///
/// A probe failure counts as "not confirmed".
pub async fn confirm_plugins<I>(
    client: &ProbeClient,
    candidates: I,
    timeout: Duration,
) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let checks = candidates.into_iter().map(|slug| async move {
        match probe_plugin_dir(client, &slug, timeout).await {
            Ok(true) => Some(slug),
            Ok(false) => None,
            Err(e) => {
                debug!("plugin {} unconfirmed: {}", slug, e);
                None
            }
        }
    });

    join_all(checks).await.into_iter().flatten().collect()
}
