//! End-to-end analysis against a mock WordPress site

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use wordpress_analyzer::{Analyzer, AnalyzerConfig, Error, FetchError, SiteInfo, VersionSource};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config for local mock servers
fn test_config() -> AnalyzerConfig {
    AnalyzerConfig {
        allow_private: true,
        max_retries: 0,
        ..Default::default()
    }
}

async fn mount_homepage(server: &MockServer, html: &str) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=UTF-8")
                .set_body_string(html),
        )
        .mount(server)
        .await;
}

async fn mount(server: &MockServer, verb: &str, route: &str, response: ResponseTemplate) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn analyze(server: &MockServer, deep_scan: bool) -> SiteInfo {
    Analyzer::new(test_config())
        .analyze(&server.uri(), deep_scan)
        .await
        .expect("analysis should succeed")
}

fn slugs(site: &SiteInfo) -> BTreeSet<String> {
    site.plugins.iter().map(|p| p.slug.clone()).collect()
}

#[tokio::test]
async fn meta_generator_beats_asset_versions() {
    let server = MockServer::start().await;
    mount_homepage(
        &server,
        r#"<html><head>
        <meta name="generator" content="WordPress 6.4.2">
        <link rel="stylesheet" href="/wp-includes/css/a.css?ver=5.0">
        <script src="/wp-includes/js/b.js?ver=5.0"></script>
        <script src="/wp-includes/js/c.js?ver=5.0"></script>
        </head></html>"#,
    )
    .await;
    mount(
        &server,
        "GET",
        "/feed/",
        ResponseTemplate::new(200).set_body_string("<generator>https://wordpress.org/?v=6.0</generator>"),
    )
    .await;

    let site = analyze(&server, false).await;

    let version = site.wordpress_version.expect("version detected");
    assert_eq!(version.version, "6.4.2");
    assert_eq!(version.detected_from, VersionSource::MetaGenerator);
}

#[tokio::test]
async fn version_falls_back_to_feed_then_readme() {
    let server = MockServer::start().await;
    mount_homepage(&server, r#"<link href="/wp-content/themes/t/style.css?ver=1.0">"#).await;
    mount(
        &server,
        "GET",
        "/readme.html",
        ResponseTemplate::new(200).set_body_string("<h1>WordPress</h1><br /> Version 6.1.1"),
    )
    .await;

    let site = analyze(&server, false).await;
    let version = site.wordpress_version.expect("version detected");
    assert_eq!(version.version, "6.1.1");
    assert_eq!(version.detected_from, VersionSource::ReadmeHtml);

    mount(
        &server,
        "GET",
        "/feed/",
        ResponseTemplate::new(200).set_body_string("<generator>https://wordpress.org/?v=6.2</generator>"),
    )
    .await;

    let site = analyze(&server, false).await;
    let version = site.wordpress_version.expect("version detected");
    assert_eq!(version.version, "6.2");
    assert_eq!(version.detected_from, VersionSource::RssFeed);
}

#[tokio::test]
async fn version_from_asset_majority_as_last_resort() {
    let server = MockServer::start().await;
    mount_homepage(
        &server,
        r#"<link href="/wp-includes/a.css?ver=6.3"><script src="/wp-includes/b.js?ver=6.3"></script>
        <script src="/wp-content/plugins/x/c.js?ver=2.0"></script>"#,
    )
    .await;

    let site = analyze(&server, false).await;
    let version = site.wordpress_version.expect("version detected");
    assert_eq!(version.version, "6.3");
    assert_eq!(version.detected_from, VersionSource::AssetVersion);
}

#[tokio::test]
async fn site_without_wordpress_signals() {
    let server = MockServer::start().await;
    mount_homepage(
        &server,
        "<html><head><title>Static</title></head><body>Hello</body></html>",
    )
    .await;

    let site = analyze(&server, true).await;

    assert!(!site.is_wordpress);
    assert!(site.wordpress_version.is_none());
    assert!(site.theme.is_none());
    assert!(site.plugins.is_empty());
    assert!(site.security_info.is_none());
    assert!(site.metadata.is_none());
    assert!(site.scan_duration_ms.is_some());
}

#[tokio::test]
async fn wordpress_detected_through_rest_api() {
    let server = MockServer::start().await;
    mount_homepage(&server, "<html><body>headless front end</body></html>").await;
    mount(
        &server,
        "GET",
        "/wp-json/",
        ResponseTemplate::new(200).set_body_string(r#"{"name":"Blog","namespaces":["wp/v2"]}"#),
    )
    .await;

    let site = analyze(&server, false).await;

    assert!(site.is_wordpress);
    assert!(site.security_info.expect("security probed").wp_json_exposed);
}

#[tokio::test]
async fn wordpress_detected_through_login_page() {
    let server = MockServer::start().await;
    mount_homepage(&server, "<html><body>custom</body></html>").await;
    mount(&server, "HEAD", "/wp-login.php", ResponseTemplate::new(403)).await;

    let site = analyze(&server, false).await;
    assert!(site.is_wordpress);
}

#[tokio::test]
async fn theme_majority_vote_and_enrichment() {
    let server = MockServer::start().await;
    mount_homepage(
        &server,
        r#"<link rel="stylesheet" href="/wp-content/themes/foo/a.css">
        <script src="/wp-content/themes/bar/b.js"></script>
        <script src="/wp-content/themes/bar/b.js?x=1"></script>
        <script src="/wp-content/themes/bar/b.js?x=2"></script>"#,
    )
    .await;
    mount(
        &server,
        "GET",
        "/wp-content/themes/bar/style.css",
        ResponseTemplate::new(200)
            .set_body_string("/*\nTheme Name: Bar\nAuthor: Jane Doe\nVersion: 1.2.0\n*/\nbody{}"),
    )
    .await;
    mount(
        &server,
        "HEAD",
        "/wp-content/themes/bar/screenshot.png",
        ResponseTemplate::new(200),
    )
    .await;

    let site = analyze(&server, false).await;
    let theme = site.theme.expect("theme detected");

    assert_eq!(theme.slug, "bar");
    assert_eq!(theme.name, "Bar");
    assert_eq!(theme.version.as_deref(), Some("1.2.0"));
    assert_eq!(theme.author.as_deref(), Some("Jane Doe"));
    assert_eq!(
        theme.template_url,
        Some(format!("{}/wp-content/themes/bar/", server.uri()))
    );
    assert_eq!(
        theme.screenshot_url,
        Some(format!("{}/wp-content/themes/bar/screenshot.png", server.uri()))
    );
}

#[tokio::test]
async fn theme_probe_failures_leave_fields_unset() {
    let server = MockServer::start().await;
    mount_homepage(&server, r#"<link href="/wp-content/themes/my-theme/style.css">"#).await;

    let site = analyze(&server, false).await;
    let theme = site.theme.expect("theme detected");

    assert_eq!(theme.name, "My Theme");
    assert!(theme.version.is_none());
    assert!(theme.author.is_none());
    assert!(theme.screenshot_url.is_none());
}

#[tokio::test]
async fn plugin_found_by_several_methods_is_reported_once() {
    let server = MockServer::start().await;
    mount_homepage(
        &server,
        r#"<html><head>
        <link rel="stylesheet" href="/wp-content/plugins/wordpress-seo/css/x.css">
        </head><body><!-- This site is optimized with the Yoast SEO plugin --></body></html>"#,
    )
    .await;
    mount(
        &server,
        "GET",
        "/wp-content/plugins/wordpress-seo/readme.txt",
        ResponseTemplate::new(200).set_body_string(
            "=== Yoast SEO ===\nStable tag: 21.7\n\n=== Description ===\nImprove your <b>WordPress</b> SEO with the Yoast plugin.\n",
        ),
    )
    .await;

    let site = analyze(&server, false).await;

    assert_eq!(site.plugin_count(), 1);
    let plugin = site.plugin("wordpress-seo").expect("plugin detected");
    assert_eq!(plugin.name, "Wordpress Seo");
    assert_eq!(plugin.version.as_deref(), Some("21.7"));
    assert_eq!(
        plugin.description.as_deref(),
        Some("Improve your WordPress SEO with the Yoast plugin.")
    );
}

#[tokio::test]
async fn html_catch_all_readme_keeps_plugin_without_version() {
    let server = MockServer::start().await;
    mount_homepage(&server, r#"<script src="/wp-content/plugins/my-plugin/app.js"></script>"#).await;
    mount(
        &server,
        "GET",
        "/wp-content/plugins/my-plugin/readme.txt",
        ResponseTemplate::new(200)
            .set_body_string("<!DOCTYPE html><html><body>Stable tag: 9.9</body></html>"),
    )
    .await;

    let site = analyze(&server, false).await;
    let plugin = site.plugin("my-plugin").expect("plugin kept");
    assert!(plugin.version.is_none());
    assert!(plugin.description.is_none());
}

#[tokio::test]
async fn deep_scan_only_adds_plugins() {
    let server = MockServer::start().await;
    mount_homepage(
        &server,
        r#"<html><head><script src="/wp-content/plugins/jetpack/j.js"></script></head>
        <body><!-- plugin: cookie-notice --><!-- plugin: ghost-plugin --></body></html>"#,
    )
    .await;
    mount(&server, "HEAD", "/wp-content/plugins/cookie-notice/", ResponseTemplate::new(403)).await;
    mount(&server, "HEAD", "/wp-content/plugins/akismet/", ResponseTemplate::new(200)).await;

    let shallow = slugs(&analyze(&server, false).await);
    let deep = slugs(&analyze(&server, true).await);

    assert_eq!(shallow, BTreeSet::from(["jetpack".to_string()]));
    assert!(shallow.is_subset(&deep));
    assert!(deep.contains("cookie-notice"));
    assert!(deep.contains("akismet"));
    assert!(!deep.contains("ghost-plugin"));
}

#[tokio::test]
async fn slow_plugin_requests_do_not_fail_the_scan() {
    let server = MockServer::start().await;
    mount_homepage(
        &server,
        r#"<html><head><script src="/wp-content/plugins/jetpack/j.js"></script></head>
        <body><!-- plugin: slow-plugin --></body></html>"#,
    )
    .await;
    let slow = ResponseTemplate::new(200).set_delay(Duration::from_secs(5));
    mount(&server, "HEAD", "/wp-content/plugins/slow-plugin/", slow.clone()).await;
    mount(
        &server,
        "GET",
        "/wp-content/plugins/jetpack/readme.txt",
        slow.set_body_string("=== Jetpack ===\nStable tag: 13.0\n"),
    )
    .await;

    let config = AnalyzerConfig {
        probe_timeout: Duration::from_millis(300),
        ..test_config()
    };
    let started = Instant::now();
    let site = Analyzer::new(config)
        .analyze(&server.uri(), true)
        .await
        .expect("slow plugin requests are absorbed");

    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(!slugs(&site).contains("slow-plugin"));
    let jetpack = site.plugin("jetpack").expect("cheap candidate kept");
    assert!(jetpack.version.is_none());
    assert!(jetpack.description.is_none());
}

#[tokio::test]
async fn readme_is_read_from_its_first_bytes() {
    let server = MockServer::start().await;
    mount_homepage(&server, r#"<script src="/wp-content/plugins/big/b.js"></script>"#).await;
    let mut body = String::from("=== Big ===\nStable tag: 2.1\n");
    body.push_str(&"x".repeat(64 * 1024));
    body.push_str("\n=== Description ===\nNever reached by the reader.\n");
    mount(
        &server,
        "GET",
        "/wp-content/plugins/big/readme.txt",
        ResponseTemplate::new(200).set_body_string(body),
    )
    .await;

    let site = analyze(&server, false).await;
    let plugin = site.plugin("big").expect("plugin detected");
    assert_eq!(plugin.version.as_deref(), Some("2.1"));
    let description = plugin.description.as_deref().unwrap_or_default();
    assert!(!description.contains("Never reached"));
}

#[tokio::test]
async fn disabled_detectors_leave_fields_unset() {
    let server = MockServer::start().await;
    mount_homepage(
        &server,
        r#"<meta name="generator" content="WordPress 6.4">
        <link href="/wp-content/themes/astra/style.css">
        <script src="/wp-content/plugins/akismet/a.js"></script>"#,
    )
    .await;

    let config = AnalyzerConfig {
        detect_version: false,
        detect_theme: false,
        detect_plugins: false,
        ..test_config()
    };
    let site = Analyzer::new(config)
        .analyze(&server.uri(), false)
        .await
        .unwrap();

    assert!(site.is_wordpress);
    assert!(site.wordpress_version.is_none());
    assert!(site.theme.is_none());
    assert!(site.plugins.is_empty());
    assert!(site.metadata.is_some());
}

#[tokio::test]
async fn server_and_security_signals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("server", "Apache/2.4.58")
                .insert_header("x-powered-by", "PHP/8.1.27")
                .set_body_string(r#"<link href="/wp-content/themes/t/style.css">"#),
        )
        .mount(&server)
        .await;
    mount(&server, "POST", "/xmlrpc.php", ResponseTemplate::new(405)).await;
    mount(&server, "GET", "/readme.html", ResponseTemplate::new(200).set_body_string("readme")).await;
    mount(
        &server,
        "GET",
        "/wp-content/",
        ResponseTemplate::new(200).set_body_string("<title>Index of /wp-content</title>"),
    )
    .await;

    let site = analyze(&server, false).await;

    let info = site.server_info.expect("server headers");
    assert_eq!(info.server.as_deref(), Some("Apache/2.4.58"));
    assert_eq!(info.php_version.expect("php").version, "8.1.27");

    let security = site.security_info.expect("security probed");
    assert!(security.xmlrpc_enabled);
    assert!(security.readme_accessible);
    assert!(security.directory_listing);
    assert!(!security.wp_json_exposed);
    assert!(!security.rest_api_enabled);
}

#[tokio::test]
async fn hanging_detector_times_out() {
    let server = MockServer::start().await;
    mount_homepage(&server, r#"<link href="/wp-content/themes/t/style.css">"#).await;
    mount(
        &server,
        "GET",
        "/feed/",
        ResponseTemplate::new(200).set_delay(Duration::from_secs(20)),
    )
    .await;

    let config = AnalyzerConfig {
        analysis_timeout: Duration::from_secs(1),
        ..test_config()
    };
    let started = Instant::now();
    let result = Analyzer::new(config).analyze(&server.uri(), false).await;

    let err = result.expect_err("scan should time out");
    assert!(err.is_timeout());
    assert!(matches!(err, Error::Timeout(_)));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn repeated_scans_are_identical() {
    let server = MockServer::start().await;
    mount_homepage(
        &server,
        r#"<meta name="generator" content="WordPress 6.5">
        <link href="/wp-content/themes/astra/style.css">
        <script src="/wp-content/plugins/zeta/z.js"></script>
        <script src="/wp-content/plugins/alpha/a.js"></script>
        <div class="elementor-widget"></div>"#,
    )
    .await;

    let mut first = analyze(&server, false).await;
    let mut second = analyze(&server, false).await;
    first.scan_duration_ms = None;
    second.scan_duration_ms = None;

    assert_eq!(first, second);
    let order: Vec<&str> = first.plugins.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(order, vec!["alpha", "elementor", "zeta"]);
}

#[tokio::test]
async fn minimal_wordpress_page() {
    let server = MockServer::start().await;
    mount_homepage(
        &server,
        r#"<html><head><meta name="generator" content="WordPress 5.9"><link rel="stylesheet" href="/wp-content/themes/twentytwentyone/style.css"></head></html>"#,
    )
    .await;

    let site = analyze(&server, false).await;

    assert!(site.is_wordpress);
    assert_eq!(site.wordpress_version.expect("version").version, "5.9");
    assert_eq!(site.theme.expect("theme").slug, "twentytwentyone");
    assert!(site.plugins.is_empty());
    assert_eq!(
        site.metadata.expect("metadata").generator.as_deref(),
        Some("WordPress 5.9")
    );
}

#[tokio::test]
async fn homepage_server_error_is_a_fetch_error() {
    let server = MockServer::start().await;
    mount(&server, "GET", "/", ResponseTemplate::new(500)).await;

    let result = Analyzer::new(test_config()).analyze(&server.uri(), false).await;

    assert!(matches!(result, Err(Error::Fetch(FetchError::Status(500)))));
}

#[tokio::test]
async fn unreachable_homepage_is_a_fetch_error() {
    // Grab a free port, then close it so nothing is listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = Analyzer::new(test_config())
        .analyze(&format!("http://127.0.0.1:{}", port), false)
        .await;

    assert!(matches!(result, Err(Error::Fetch(FetchError::Request(_)))));
}

#[tokio::test]
async fn private_targets_rejected_by_default() {
    let result = Analyzer::new(AnalyzerConfig::default())
        .analyze("http://127.0.0.1:9", false)
        .await;

    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}
