//! End-to-end crawl tests against a local mock server

use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trawler::config::Config;
use trawler::crawler::Crawler;

fn test_config(seed: &str, out: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.crawler.seed_url = seed.to_string();
    config.crawler.allowed_domains = vec![String::from("127.0.0.1")];
    config.crawler.max_depth = 2;
    config.crawler.chunk_size = 2;
    config.crawler.worker_count = 4;
    config.crawler.request_timeout_secs = 5;
    config.crawler.exclude_patterns = vec![String::from("/login/")];
    config.output.dir = out.to_path_buf();
    config
}

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn crawl_seed_with_mixed_links() {
    let server = MockServer::start().await;
    let uri = server.uri();

    // Seed links to a page, a PDF, a foreign host and an excluded path.
    let seed_html = format!(
        r#"<html><body><h1>Index</h1>
        <a href="{uri}/p1">Page</a>
        <a href="{uri}/doc.pdf">Doc</a>
        <a href="https://other.com/x">Foreign</a>
        <a href="{uri}/login/">Login</a>
        </body></html>"#
    );
    mount_html(&server, "/", seed_html).await;
    mount_html(&server, "/p1", String::from("<html><body><p>p1</p></body></html>")).await;

    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let config = test_config(&format!("{uri}/"), out.path());
    let crawler = Crawler::new(&config).unwrap();
    let report = crawler.run().await.unwrap();

    // Seed, p1 and doc.pdf are processed; the foreign and excluded links
    // never enter the frontier.
    assert_eq!(report.stats.processed, 3);
    assert_eq!(report.stats.pages, 2);
    assert_eq!(report.stats.pdfs, 1);
    assert_eq!(report.stats.failures(), 0);
    assert_eq!(report.visited, 3);

    // Page chunk flushed when the threshold of 2 was met; the single PDF
    // record flushed at shutdown.
    let page_chunk = out.path().join("crawl_page_chunk_1.csv");
    let pdf_chunk = out.path().join("crawl_pdf_chunk_1.csv");
    assert!(page_chunk.exists());
    assert!(pdf_chunk.exists());
    assert!(!out.path().join("crawl_page_chunk_2.csv").exists());

    let pages = std::fs::read_to_string(&page_chunk).unwrap();
    assert!(pages.starts_with("\"url\",\"depth\",\"type\",\"content\""));
    assert!(pages.contains("/p1"));

    let pdfs = std::fs::read_to_string(&pdf_chunk).unwrap();
    assert!(pdfs.starts_with("\"url\",\"depth\",\"type\""));
    assert!(pdfs.contains("doc.pdf"));
    assert!(pdfs.contains("\"1\",\"pdf\""));

    // The excluded path was never requested.
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/login/"));
}

#[tokio::test]
async fn depth_limit_stops_link_expansion() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_html(
        &server,
        "/",
        format!(r#"<html><body><a href="{uri}/a">a</a></body></html>"#),
    )
    .await;
    mount_html(
        &server,
        "/a",
        format!(r#"<html><body><a href="{uri}/b">b</a></body></html>"#),
    )
    .await;
    mount_html(
        &server,
        "/b",
        String::from("<html><body>deep</body></html>"),
    )
    .await;

    let out = TempDir::new().unwrap();
    let mut config = test_config(&format!("{uri}/"), out.path());
    config.crawler.max_depth = 1;
    let crawler = Crawler::new(&config).unwrap();
    let report = crawler.run().await.unwrap();

    // Links on the depth-1 page are not expanded, so /b is never fetched.
    assert_eq!(report.stats.processed, 2);
    let requests = server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/b"));
}

#[tokio::test]
async fn failed_fetches_are_counted_and_not_retried() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_html(
        &server,
        "/",
        format!(
            r#"<html><body>
            <a href="{uri}/gone">gone</a>
            <a href="{uri}/ok">ok</a>
            </body></html>"#
        ),
    )
    .await;
    mount_html(&server, "/ok", String::from("<html><body>ok</body></html>")).await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let config = test_config(&format!("{uri}/"), out.path());
    let crawler = Crawler::new(&config).unwrap();
    let report = crawler.run().await.unwrap();

    assert_eq!(report.stats.processed, 3);
    assert_eq!(report.stats.pages, 2);
    assert_eq!(report.stats.status_errors, 1);

    // The failed URL stays claimed and is fetched exactly once.
    let requests = server.received_requests().await.unwrap();
    let gone_hits = requests.iter().filter(|r| r.url.path() == "/gone").count();
    assert_eq!(gone_hits, 1);
}

#[tokio::test]
async fn duplicate_links_are_fetched_once() {
    let server = MockServer::start().await;
    let uri = server.uri();

    // The same target appears twice on the seed page, plus once via a
    // query-string variant that normalization collapses.
    mount_html(
        &server,
        "/",
        format!(
            r#"<html><body>
            <a href="{uri}/p">one</a>
            <a href="{uri}/p">two</a>
            <a href="{uri}/p?ref=nav">three</a>
            </body></html>"#
        ),
    )
    .await;
    mount_html(&server, "/p", String::from("<html><body>p</body></html>")).await;

    let out = TempDir::new().unwrap();
    let config = test_config(&format!("{uri}/"), out.path());
    let crawler = Crawler::new(&config).unwrap();
    let report = crawler.run().await.unwrap();

    assert_eq!(report.stats.processed, 2);

    let requests = server.received_requests().await.unwrap();
    let p_hits = requests.iter().filter(|r| r.url.path() == "/p").count();
    assert_eq!(p_hits, 1, "duplicate frontier entries must collapse to one fetch");
}

#[tokio::test]
async fn sub_threshold_records_flush_at_shutdown() {
    let server = MockServer::start().await;
    let uri = server.uri();

    mount_html(
        &server,
        "/",
        String::from("<html><body>lonely page</body></html>"),
    )
    .await;

    let out = TempDir::new().unwrap();
    let mut config = test_config(&format!("{uri}/"), out.path());
    config.crawler.chunk_size = 100;
    let crawler = Crawler::new(&config).unwrap();
    let report = crawler.run().await.unwrap();

    assert_eq!(report.stats.pages, 1);

    // One record, far below the threshold, still lands in a chunk file.
    let page_chunk = out.path().join("crawl_page_chunk_1.csv");
    assert!(page_chunk.exists());
    let content = std::fs::read_to_string(&page_chunk).unwrap();
    assert!(content.contains("lonely page"));
}
