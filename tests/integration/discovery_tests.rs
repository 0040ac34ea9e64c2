use crate::common::{create_fetcher, create_test_config, html_page, relay_path, sitemap_index, urlset};
use spellspider::config::Config;
use spellspider::crawler::{Discoverer, NoProgress, Progress};
use spellspider::SpiderError;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_discoverer(config: &Config) -> Discoverer {
    Discoverer::new(create_fetcher(config), config.sitemap.clone())
}

/// Mounts `body` as a 200 response on `route`
async fn serve(server: &MockServer, route: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

async fn never_requested(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sitemap_urls_are_returned_sorted() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server);
    let base = mock_server.uri();

    let pages: Vec<String> = ["/pricing", "/about", "/", "/blog/hello", "/contact"]
        .iter()
        .map(|p| format!("{}{}", base, p))
        .collect();

    serve(&mock_server, "/sitemap.xml", urlset(&pages), 1).await;
    never_requested(&mock_server, "/sitemap_index.xml").await;
    never_requested(&mock_server, "/page-sitemap.xml").await;
    never_requested(&mock_server, "/").await;

    let urls = create_discoverer(&config)
        .discover_urls(&base, &NoProgress)
        .await
        .unwrap();

    let mut expected = pages.clone();
    expected.sort();
    assert_eq!(urls, expected);
}

#[tokio::test]
async fn test_falls_back_to_homepage_links() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server);
    let base = mock_server.uri();

    let body = r#"
        <nav>
          <a href="/about">About</a>
          <a href="/pricing">Pricing</a>
          <a href="blog">Blog</a>
          <a href="https://twitter.com/example">Twitter</a>
          <a href="https://other.example.org/page">Partner</a>
        </nav>
    "#;
    serve(&mock_server, "/", html_page("Home", body), 1).await;

    let events = Mutex::new(Vec::new());
    let sink = |progress: Progress| events.lock().unwrap().push(progress);

    let urls = create_discoverer(&config)
        .discover_urls(&base, &sink)
        .await
        .unwrap();

    assert_eq!(
        urls,
        vec![
            base.clone(),
            format!("{}/about", base),
            format!("{}/blog", base),
            format!("{}/pricing", base),
        ]
    );

    let events = events.into_inner().unwrap();
    assert!(events.contains(&Progress::FallingBackToCrawl));
    assert!(events.contains(&Progress::HomepageLinksFound { count: 4 }));
}

#[tokio::test]
async fn test_degrades_to_target_when_everything_fails() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server);
    let target = format!("{}/landing", mock_server.uri());

    let events = Mutex::new(Vec::new());
    let sink = |progress: Progress| events.lock().unwrap().push(progress);

    let urls = create_discoverer(&config)
        .discover_urls(&target, &sink)
        .await
        .expect("discovery never fails for a valid target");

    assert_eq!(urls, vec![target.clone()]);

    let events = events.into_inner().unwrap();
    assert_eq!(events.first(), Some(&Progress::SearchingSitemaps));
    assert_eq!(
        events.last(),
        Some(&Progress::UsingTargetOnly {
            url: target.clone()
        })
    );
}

#[tokio::test]
async fn test_target_is_trimmed() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server);
    let target = format!("{}/landing", mock_server.uri());

    let urls = create_discoverer(&config)
        .discover_urls(&format!("  {}\n", target), &NoProgress)
        .await
        .unwrap();

    assert_eq!(urls, vec![target]);
}

#[tokio::test]
async fn test_self_referencing_index_is_fetched_once() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server);
    let base = mock_server.uri();

    let index = sitemap_index(&[
        format!("{}/sitemap.xml", base),
        format!("{}/leaf-sitemap.xml", base),
    ]);
    let leaf = urlset(&[format!("{}/one", base), format!("{}/two", base)]);

    serve(&mock_server, "/sitemap.xml", index, 1).await;
    serve(&mock_server, "/leaf-sitemap.xml", leaf, 1).await;

    let urls = create_discoverer(&config)
        .discover_urls(&base, &NoProgress)
        .await
        .unwrap();

    assert_eq!(urls, vec![format!("{}/one", base), format!("{}/two", base)]);
}

#[tokio::test]
async fn test_failed_nested_sitemap_keeps_siblings() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server);
    let base = mock_server.uri();

    let index = sitemap_index(&[
        format!("{}/post-sitemap.xml", base),
        format!("{}/missing-sitemap.xml", base),
    ]);

    serve(&mock_server, "/sitemap.xml", index, 1).await;
    serve(
        &mock_server,
        "/post-sitemap.xml",
        urlset(&[format!("{}/posts/first", base)]),
        1,
    )
    .await;

    let events = Mutex::new(Vec::new());
    let sink = |progress: Progress| events.lock().unwrap().push(progress);

    let urls = create_discoverer(&config)
        .discover_urls(&base, &sink)
        .await
        .unwrap();

    assert_eq!(urls, vec![format!("{}/posts/first", base)]);

    let events = events.into_inner().unwrap();
    assert!(events.contains(&Progress::NestedSitemapsFound { count: 2 }));
    assert!(events.contains(&Progress::SitemapUrlsFound { count: 1 }));
}

#[tokio::test]
async fn test_next_candidate_used_when_first_is_missing() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server);
    let base = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    serve(
        &mock_server,
        "/sitemap_index.xml",
        urlset(&[format!("{}/from-second", base)]),
        1,
    )
    .await;
    never_requested(&mock_server, "/page-sitemap.xml").await;

    let events = Mutex::new(Vec::new());
    let sink = |progress: Progress| events.lock().unwrap().push(progress);

    let urls = create_discoverer(&config)
        .discover_urls(&base, &sink)
        .await
        .unwrap();

    assert_eq!(urls, vec![format!("{}/from-second", base)]);

    let checked: Vec<_> = events
        .into_inner()
        .unwrap()
        .into_iter()
        .filter_map(|p| match p {
            Progress::CheckingSitemap { file } => Some(file),
            _ => None,
        })
        .collect();
    assert_eq!(checked, vec!["sitemap.xml", "sitemap_index.xml"]);
}

#[tokio::test]
async fn test_sitemap_served_through_proxy() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server);
    let base = mock_server.uri();
    let sitemap_url = format!("{}/sitemap.xml", base);

    // The site answers with an HTML shell instead of XML
    serve(
        &mock_server,
        "/sitemap.xml",
        html_page("Not a sitemap", "<p>Nothing to see.</p>"),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path(relay_path("relay-a")))
        .and(query_param("url", sitemap_url.as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(urlset(&[format!("{}/via-relay", base)])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    never_requested(&mock_server, &relay_path("relay-b")).await;

    let events = Mutex::new(Vec::new());
    let sink = |progress: Progress| events.lock().unwrap().push(progress);

    let urls = create_discoverer(&config)
        .discover_urls(&base, &sink)
        .await
        .unwrap();

    assert_eq!(urls, vec![format!("{}/via-relay", base)]);

    let events = events.into_inner().unwrap();
    let direct = events
        .iter()
        .position(|p| *p == Progress::TryingSitemapDirectly)
        .expect("direct attempt reported");
    let relayed = events
        .iter()
        .position(|p| {
            *p == Progress::TryingProxy {
                proxy: "relay-a".to_string(),
            }
        })
        .expect("relay attempt reported");
    assert!(direct < relayed);
}

#[tokio::test]
async fn test_sitemap_entries_filtered_to_site_pages() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server);
    let base = mock_server.uri();

    let entries = vec![
        format!("{}/guide", base),
        format!("{}/files/brochure.pdf", base),
        format!("{}/img/Logo.PNG", base),
        "https://elsewhere.example.com/guide".to_string(),
        format!("{}/guide", base),
    ];
    serve(&mock_server, "/sitemap.xml", urlset(&entries), 1).await;

    let urls = create_discoverer(&config)
        .discover_urls(&base, &NoProgress)
        .await
        .unwrap();

    assert_eq!(urls, vec![format!("{}/guide", base)]);
}

#[tokio::test]
async fn test_sitemap_nesting_is_bounded() {
    let mock_server = MockServer::start().await;
    let mut config = create_test_config(&mock_server);
    config.sitemap.max_depth = 1;
    let base = mock_server.uri();

    serve(
        &mock_server,
        "/sitemap.xml",
        sitemap_index(&[format!("{}/level-1.xml", base)]),
        1,
    )
    .await;
    serve(
        &mock_server,
        "/level-1.xml",
        sitemap_index(&[format!("{}/level-2.xml", base)]),
        1,
    )
    .await;
    never_requested(&mock_server, "/level-2.xml").await;

    serve(
        &mock_server,
        "/",
        html_page("Home", r#"<a href="/docs">Docs</a>"#),
        1,
    )
    .await;

    let urls = create_discoverer(&config)
        .discover_urls(&base, &NoProgress)
        .await
        .unwrap();

    assert_eq!(urls, vec![base.clone(), format!("{}/docs", base)]);
}

#[tokio::test]
async fn test_invalid_target_is_an_error() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server);
    let discoverer = create_discoverer(&config);

    for target in ["", "not a url", "ftp://example.com/", "mailto:someone@example.com"] {
        let result = discoverer.discover_urls(target, &NoProgress).await;
        assert!(
            matches!(result, Err(SpiderError::Url(_))),
            "expected URL error for {:?}",
            target
        );
    }
}

#[tokio::test]
async fn test_free_function_uses_configuration() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server);
    let base = mock_server.uri();

    serve(
        &mock_server,
        "/sitemap.xml",
        urlset(&[format!("{}/only", base)]),
        1,
    )
    .await;

    let urls = spellspider::discover_urls(&config, &base, &NoProgress)
        .await
        .unwrap();

    assert_eq!(urls, vec![format!("{}/only", base)]);
}

#[tokio::test]
async fn test_nested_sitemaps_are_fetched_concurrently() {
    let mock_server = MockServer::start().await;
    let config = create_test_config(&mock_server);
    let base = mock_server.uri();
    let delay = Duration::from_millis(400);

    serve(
        &mock_server,
        "/sitemap.xml",
        sitemap_index(&[
            format!("{}/posts-sitemap.xml", base),
            format!("{}/pages-sitemap.xml", base),
        ]),
        1,
    )
    .await;

    for (route, page) in [("/posts-sitemap.xml", "/posts/a"), ("/pages-sitemap.xml", "/team")] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(urlset(&[format!("{}{}", base, page)]))
                    .set_delay(delay),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let started = Instant::now();
    let urls = create_discoverer(&config)
        .discover_urls(&base, &NoProgress)
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(urls, vec![format!("{}/posts/a", base), format!("{}/team", base)]);
    // One delay, not two: both children are in flight together
    assert!(elapsed >= delay, "elapsed {:?}", elapsed);
    assert!(elapsed < delay * 2 - Duration::from_millis(100), "elapsed {:?}", elapsed);
}
