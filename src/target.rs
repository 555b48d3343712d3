//! Scan target normalization and SSRF guard

use crate::error::{Error, Result};
use log::debug;
use std::net::IpAddr;
use url::Url;

/// Allowed URL schemes
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Normalized input of one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTarget {
    /// Target URL with scheme filled in
    pub url: Url,
    /// Enables speculative, network-verified detection methods
    pub deep_scan: bool,
}

impl ScanTarget {
    /// Normalize a URL or bare domain, defaulting the scheme to https
    pub fn parse(url: &str, deep_scan: bool) -> Result<Self> {
        let url = url.trim();
        let url_with_scheme = if !url.contains("://") {
            format!("https://{}", url)
        } else {
            url.to_string()
        };

        let parsed = Url::parse(&url_with_scheme).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        if !ALLOWED_SCHEMES.contains(&parsed.scheme()) {
            return Err(Error::InvalidUrl(format!(
                "scheme '{}' not allowed (use http or https)",
                parsed.scheme()
            )));
        }

        if parsed.host_str().is_none() {
            return Err(Error::InvalidUrl("missing host".to_string()));
        }

        Ok(Self {
            url: parsed,
            deep_scan,
        })
    }

    /// Reject loopback, private and metadata addresses
    ///
    /// The hostname is resolved asynchronously; an unresolvable name is let
    /// through so the homepage fetch reports the real DNS failure.
    pub async fn check_host(&self) -> Result<()> {
        let host = self
            .url
            .host_str()
            .ok_or_else(|| Error::InvalidUrl("missing host".to_string()))?;

        if host == "localhost" || host.ends_with(".localhost") {
            return Err(Error::InvalidUrl("localhost not allowed".to_string()));
        }

        let port = self.url.port_or_known_default().unwrap_or(443);
        let host = host.trim_start_matches('[').trim_end_matches(']');

        match tokio::net::lookup_host((host, port)).await {
            Ok(addrs) => {
                for addr in addrs {
                    if is_internal_ip(addr.ip()) {
                        return Err(Error::InvalidUrl(format!(
                            "internal/private IP address not allowed: {}",
                            addr.ip()
                        )));
                    }
                }
            }
            Err(e) => debug!("could not resolve {}: {}", host, e),
        }

        Ok(())
    }
}

/// Check if an IP address is internal/private (RFC 1918, link-local, loopback, etc.)
pub(crate) fn is_internal_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            ipv4.is_loopback()
                || ipv4.is_private()
                || ipv4.is_link_local() // includes 169.254.169.254 metadata
                || ipv4.is_broadcast()
                || ipv4.is_unspecified()
                || (octets[0] == 100 && (64..=127).contains(&octets[1])) // CGNAT 100.64.0.0/10
                || octets[..3] == [192, 0, 0] // IETF protocol assignments
                || octets[..3] == [192, 0, 2] // TEST-NET-1
                || octets[..3] == [198, 51, 100] // TEST-NET-2
                || octets[..3] == [203, 0, 113] // TEST-NET-3
                || (octets[0] == 198 && (octets[1] & 0xfe) == 18) // benchmarking 198.18.0.0/15
        }
        IpAddr::V6(ipv6) => {
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                || (ipv6.segments()[0] & 0xfe00) == 0xfc00
                || (ipv6.segments()[0] & 0xffc0) == 0xfe80
                || ipv6.to_ipv4_mapped().is_some_and(|v4| is_internal_ip(IpAddr::V4(v4)))
        }
    }
}
