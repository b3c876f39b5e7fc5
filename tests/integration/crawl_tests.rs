//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use link_atlas::config::Config;
use link_atlas::crawler::{
    build_http_client, fetch_url, Coordinator, CrawlSession, CrawlState, FetchResult,
    WaveScheduler,
};
use link_atlas::output::write_link_report;
use link_atlas::storage::{LinkStore, SqliteStorage};
use link_atlas::url::validate_seed_url;
use link_atlas::Link;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a short timeout
fn create_test_config(concurrency: u32) -> Config {
    let mut config = Config::default();
    config.crawler.concurrency = concurrency;
    config.crawler.request_timeout_secs = 5;
    config.user_agent.crawler_name = "TestBot".to_string();
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html; charset=utf-8",
    )
}

/// Mounts a GET mock that must be hit exactly once
async fn mount_page(server: &MockServer, page: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn stored_links(coordinator: &Coordinator<SqliteStorage>, origin: &str) -> Vec<Link> {
    coordinator
        .storage()
        .lock()
        .unwrap()
        .all_links_from(origin)
        .unwrap()
}

fn find<'a>(links: &'a [Link], href: &str) -> &'a Link {
    links
        .iter()
        .find(|l| l.href == href)
        .unwrap_or_else(|| panic!("link {} not stored", href))
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let origin = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html(
            r#"<nav><a href="/page1">Page <b>one</b></a></nav>
               <a href="/page2">Page 2</a>
               <a href="https://external.test/about">Elsewhere</a>"#,
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/page1",
        html(r#"<a href="/page1">Self</a><a href="/page3">Page 3</a>"#),
    )
    .await;
    mount_page(
        &mock_server,
        "/page2",
        ResponseTemplate::new(404).set_body_string("missing"),
    )
    .await;
    mount_page(&mock_server, "/page3", html("<p>Leaf</p>")).await;

    let seed = validate_seed_url(&format!("{}/", origin)).unwrap();
    let storage = SqliteStorage::new_in_memory().unwrap();
    let mut coordinator = Coordinator::new(&create_test_config(2), seed, storage).unwrap();

    let summary = coordinator.run().await.unwrap();

    assert_eq!(coordinator.state(), CrawlState::Done);
    assert_eq!(summary.base_origin.as_deref(), Some(origin.as_str()));
    // seed, then page1+page2, then page3
    assert_eq!(summary.waves, 3);
    assert_eq!(summary.targets_fetched, 4);
    assert_eq!(summary.targets_failed, 0);
    assert_eq!(summary.links_discovered, 4);

    let links = stored_links(&coordinator, &origin);
    assert_eq!(links.len(), 4);

    let page1 = find(&links, "/page1");
    assert_eq!(page1.text, "Page, one");
    assert_eq!(page1.base_url, origin);
    assert_eq!(page1.source_url, format!("{}/", origin));
    assert_eq!(page1.status_code, Some(200));
    assert_eq!(page1.status_message.as_deref(), Some("200 OK"));

    let page2 = find(&links, "/page2");
    assert_eq!(page2.status_code, Some(404));
    assert_eq!(page2.status_message.as_deref(), Some("404 Not Found"));

    let page3 = find(&links, "/page3");
    assert_eq!(page3.source_url, format!("{}/page1", origin));
    assert_eq!(page3.status_code, Some(200));

    // Absolute links are recorded but never fetched
    let external = find(&links, "https://external.test/about");
    assert_eq!(external.base_url, "");
    assert_eq!(external.status_code, None);

    let counts = coordinator
        .storage()
        .lock()
        .unwrap()
        .count_links(&origin)
        .unwrap();
    assert_eq!(counts.total, 4);
    assert_eq!(counts.resolved, 3);
    assert_eq!(counts.pending, 0);
    assert_eq!(counts.broken, 1);
}

#[tokio::test]
async fn test_crawl_writes_report() {
    let mock_server = MockServer::start().await;
    let origin = mock_server.uri();

    mount_page(&mock_server, "/", html(r#"<a href="/about">About</a>"#)).await;
    mount_page(&mock_server, "/about", html("<p>About us</p>")).await;

    let seed = validate_seed_url(&origin).unwrap();
    let storage = SqliteStorage::new_in_memory().unwrap();
    let mut coordinator = Coordinator::new(&create_test_config(2), seed, storage).unwrap();
    coordinator.run().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("links.csv");
    let written = {
        let storage = coordinator.storage().lock().unwrap();
        write_link_report(&*storage, &origin, &report).unwrap()
    };
    assert_eq!(written, 1);

    let contents = std::fs::read_to_string(&report).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "link,text,status code,status message");
    assert_eq!(lines[1], format!("{}/about,About,200,200 OK", origin));
}

#[tokio::test]
async fn test_seed_without_links_finishes_after_one_wave() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", html("<p>Nothing to see</p>")).await;

    let seed = validate_seed_url(&mock_server.uri()).unwrap();
    let storage = SqliteStorage::new_in_memory().unwrap();
    let mut coordinator = Coordinator::new(&create_test_config(2), seed, storage).unwrap();

    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.waves, 1);
    assert_eq!(summary.targets_fetched, 1);
    assert_eq!(summary.links_discovered, 0);
    assert_eq!(summary.base_origin.as_deref(), Some(mock_server.uri().as_str()));
}

#[tokio::test]
async fn test_seed_not_found_sets_no_base_origin() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        ResponseTemplate::new(404).set_body_string(r#"<a href="/never">Never</a>"#),
    )
    .await;

    let seed = validate_seed_url(&mock_server.uri()).unwrap();
    let storage = SqliteStorage::new_in_memory().unwrap();
    let mut coordinator = Coordinator::new(&create_test_config(2), seed, storage).unwrap();

    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.waves, 1);
    assert_eq!(summary.base_origin, None);
    assert!(stored_links(&coordinator, &mock_server.uri()).is_empty());
}

#[tokio::test]
async fn test_base_origin_follows_redirect() {
    let entry = MockServer::start().await;
    let site = MockServer::start().await;

    mount_page(
        &entry,
        "/start",
        ResponseTemplate::new(301)
            .insert_header("location", format!("{}/home", site.uri()).as_str()),
    )
    .await;
    mount_page(&site, "/home", html(r#"<a href="/docs">Docs</a>"#)).await;
    mount_page(&site, "/docs", html("<p>Docs</p>")).await;

    let seed = validate_seed_url(&format!("{}/start", entry.uri())).unwrap();
    let storage = SqliteStorage::new_in_memory().unwrap();
    let mut coordinator = Coordinator::new(&create_test_config(2), seed, storage).unwrap();

    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.base_origin.as_deref(), Some(site.uri().as_str()));
    assert_eq!(summary.waves, 2);

    let links = stored_links(&coordinator, &site.uri());
    let docs = find(&links, "/docs");
    assert_eq!(docs.base_url, site.uri());
    assert_eq!(docs.status_code, Some(200));
}

#[tokio::test]
async fn test_duplicate_hrefs_across_pages_fetched_once() {
    let mock_server = MockServer::start().await;
    let origin = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        html(r#"<a href="/a">A</a><a href="/b">B</a>"#),
    )
    .await;
    mount_page(
        &mock_server,
        "/a",
        html(r#"<a href="/b">B again</a><a href="/c">C</a>"#),
    )
    .await;
    mount_page(&mock_server, "/b", html(r#"<a href="/a">A again</a>"#)).await;
    mount_page(&mock_server, "/c", html("<p>C</p>")).await;

    let seed = validate_seed_url(&origin).unwrap();
    let storage = SqliteStorage::new_in_memory().unwrap();
    let mut coordinator = Coordinator::new(&create_test_config(3), seed, storage).unwrap();

    let summary = coordinator.run().await.unwrap();

    let links = stored_links(&coordinator, &origin);
    let hrefs: Vec<&str> = links.iter().map(|l| l.href.as_str()).collect();
    assert_eq!(hrefs, vec!["/a", "/b", "/c"]);
    assert_eq!(find(&links, "/b").text, "B");
    assert_eq!(summary.targets_fetched, 4);
}

#[tokio::test]
async fn test_non_html_content_is_not_parsed() {
    let mock_server = MockServer::start().await;
    let origin = mock_server.uri();

    mount_page(&mock_server, "/", html(r#"<a href="/data.json">Data</a>"#)).await;
    mount_page(
        &mock_server,
        "/data.json",
        ResponseTemplate::new(200)
            .set_body_raw(
                r#"{"html": "<a href=\"/hidden\">Hidden</a>"}"#,
                "application/json",
            ),
    )
    .await;

    let seed = validate_seed_url(&origin).unwrap();
    let storage = SqliteStorage::new_in_memory().unwrap();
    let mut coordinator = Coordinator::new(&create_test_config(2), seed, storage).unwrap();

    coordinator.run().await.unwrap();

    let links = stored_links(&coordinator, &origin);
    assert_eq!(links.len(), 1);
    assert_eq!(find(&links, "/data.json").status_code, Some(200));
}

#[tokio::test]
async fn test_wave_respects_concurrency_cap() {
    let mock_server = MockServer::start().await;
    let origin = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(html("<p>slow</p>").set_delay(Duration::from_millis(200)))
        .expect(6)
        .mount(&mock_server)
        .await;

    let config = create_test_config(2);
    let client = build_http_client(&config.crawler, &config.user_agent).unwrap();
    let session = Arc::new(CrawlSession::new());
    let storage = Arc::new(Mutex::new(SqliteStorage::new_in_memory().unwrap()));
    let scheduler = WaveScheduler::new(client, session, storage, 2);

    let pending: Vec<Link> = (0..6)
        .map(|i| Link {
            href: format!("/p{}", i),
            base_url: origin.clone(),
            ..Link::default()
        })
        .collect();

    let start = Instant::now();
    let report = scheduler.run_wave(pending).await;

    assert_eq!(report.processed, 6);
    assert_eq!(report.failed, 0);
    assert!(report.peak_in_flight <= 2);
    assert!(report.peak_in_flight >= 1);
    // Six 200ms responses two at a time take at least three rounds
    assert!(start.elapsed() >= Duration::from_millis(600));
}

#[tokio::test]
async fn test_redirects_disabled_records_redirect_status() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/moved",
        ResponseTemplate::new(301)
            .insert_header("location", format!("{}/new", mock_server.uri()).as_str()),
    )
    .await;

    let mut config = create_test_config(1);
    config.crawler.max_redirects = 0;
    let client = build_http_client(&config.crawler, &config.user_agent).unwrap();
    let session = CrawlSession::new();

    let result = fetch_url(&client, &format!("{}/moved", mock_server.uri()), &session).await;

    assert_eq!(result.status(), Some((301, "301 Moved Permanently")));
    assert!(matches!(result, FetchResult::HttpError { .. }));
    assert_eq!(session.base_origin(), None);
}
