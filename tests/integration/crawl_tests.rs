//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full harvest cycle end-to-end over real HTTP.

use link_harvest::config::{parse_config, Config, UserAgentConfig};
use link_harvest::crawler::{crawl, Coordinator};
use link_harvest::output::{CsvOutputHandler, OutputHandler};
use link_harvest::HarvestError;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration for the given sitemap
fn create_test_config(sitemap_url: &str) -> Config {
    let mut config = Config::for_sitemap(sitemap_url);
    config.crawler.concurrency_limit = 3;
    config.crawler.min_delay_ms = 0;
    config.crawler.max_delay_ms = 10;
    config.crawler.max_retries = 1;
    config.crawler.request_timeout_ms = 500;
    config.crawler.retry_backoff_ms = 10;
    config.crawler.max_backoff_ms = 50;
    config.user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
    };
    config
}

fn sitemap_xml(base_url: &str, paths: &[&str]) -> String {
    let entries: String = paths
        .iter()
        .map(|p| format!("  <url><loc>{}{}</loc></url>\n", base_url, p))
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>",
        entries
    )
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html")
}

/// Mounts a sitemap listing `paths` at `/sitemap.xml` and returns its URL
async fn mount_sitemap(mock_server: &MockServer, paths: &[&str]) -> String {
    let base_url = mock_server.uri();
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(sitemap_xml(&base_url, paths))
                .insert_header("content-type", "application/xml"),
        )
        .mount(mock_server)
        .await;
    format!("{}/sitemap.xml", base_url)
}

#[tokio::test]
async fn test_full_harvest_with_timeout_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let sitemap_url = mount_sitemap(&mock_server, &["/page1", "/page2", "/page3"]).await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html_page(
            r#"<html><head><title>Page 1</title></head><body>
            <a href="/download/file.zip">Download</a>
            <a href="https://other.example/about">About</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    // Slower than the request timeout on every attempt
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html_page("<html><head><title>Page 2</title></head></html>").set_delay(Duration::from_secs(3)))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page3"))
        .respond_with(html_page(
            "<html><head><title>Page 3</title></head><body>No links here</body></html>",
        ))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&sitemap_url);
    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Crawl failed");

    let rows = report.dataset.rows();
    assert_eq!(rows.len(), 2, "Expected exactly two rows from page1");
    for row in rows {
        assert_eq!(row.post_title, "Page 1");
        assert_eq!(row.post_url, format!("{}/page1", base_url));
    }
    assert_eq!(rows[0].found_link, format!("{}/download/file.zip", base_url));
    assert_eq!(rows[1].found_link, "https://other.example/about");

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].url, format!("{}/page2", base_url));
    assert_eq!(report.statistics.pages_harvested, 1);
    assert_eq!(report.statistics.pages_without_links, 1);
    assert_eq!(report.statistics.pages_skipped, 1);
}

#[tokio::test]
async fn test_not_found_page_is_skipped_without_retry() {
    let mock_server = MockServer::start().await;
    let sitemap_url = mount_sitemap(&mock_server, &["/gone", "/live"]).await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/live"))
        .respond_with(html_page(
            r#"<html><head><title>Live</title></head><body><a href="next">next</a></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&sitemap_url);
    config.crawler.max_retries = 3;

    let dataset = crawl(&config).await.expect("Crawl failed");

    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.rows()[0].post_title, "Live");
    assert_eq!(
        dataset.rows()[0].found_link,
        format!("{}/next", mock_server.uri())
    );
}

#[tokio::test]
async fn test_server_error_retried_then_harvested() {
    let mock_server = MockServer::start().await;
    let sitemap_url = mount_sitemap(&mock_server, &["/flaky"]).await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(html_page(
            r#"<html><head><title>Recovered</title></head><body><a href="/a">a</a></body></html>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&sitemap_url);
    let report = Coordinator::new(config)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    assert_eq!(report.dataset.len(), 1);
    assert_eq!(report.dataset.rows()[0].post_title, "Recovered");
    assert!(report.skipped.is_empty());
    assert_eq!(report.statistics.fetch_attempts, 2);
}

#[tokio::test]
async fn test_redirect_keeps_sitemap_url_as_page_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let sitemap_url = mount_sitemap(&mock_server, &["/old/post"]).await;

    Mock::given(method("GET"))
        .and(path("/old/post"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new/post", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new/post"))
        .respond_with(html_page(
            r##"<html><body><a href="related">Related</a><a href="#top">Top</a></body></html>"##,
        ))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&sitemap_url);
    let dataset = crawl(&config).await.expect("Crawl failed");

    assert_eq!(dataset.len(), 1);
    let row = &dataset.rows()[0];
    assert_eq!(row.post_url, format!("{}/old/post", base_url));
    assert_eq!(row.post_title, format!("{}/old/post", base_url));
    assert_eq!(row.found_link, format!("{}/old/related", base_url));
}

#[tokio::test]
async fn test_legacy_charset_decoded() {
    let mock_server = MockServer::start().await;
    let sitemap_url = mount_sitemap(&mock_server, &["/latin1"]).await;

    let mut body = b"<html><head><title>Caf".to_vec();
    body.push(0xE9);
    body.extend_from_slice(b"</title></head><body><a href=\"/menu\">menu</a></body></html>");

    Mock::given(method("GET"))
        .and(path("/latin1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=iso-8859-1"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&sitemap_url);
    let dataset = crawl(&config).await.expect("Crawl failed");

    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.rows()[0].post_title, "Caf\u{e9}");
}

#[tokio::test]
async fn test_sitemap_not_found_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/sitemap.xml", mock_server.uri()));
    let err = crawl(&config).await.unwrap_err();

    assert!(matches!(err, HarvestError::SitemapFetch { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_html_sitemap_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(html_page("<html><body><a href=\"/page\">page</a></body></html>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html_page("<html></html>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/sitemap.xml", mock_server.uri()));
    let err = crawl(&config).await.unwrap_err();

    assert!(matches!(err, HarvestError::SitemapParse { .. }), "got {:?}", err);
}

#[tokio::test]
async fn test_user_agent_sent() {
    let mock_server = MockServer::start().await;
    let agent = "TestBot/1.0.0 (+https://example.com/contact)";

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .and(header("user-agent", agent))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap_xml(&mock_server.uri(), &["/p"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p"))
        .and(header("user-agent", agent))
        .respond_with(html_page(r#"<a href="/q">q</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/sitemap.xml", mock_server.uri()));
    let dataset = crawl(&config).await.expect("Crawl failed");

    assert_eq!(dataset.len(), 1);
}

#[tokio::test]
async fn test_csv_written_from_toml_config() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let sitemap_url = mount_sitemap(&mock_server, &["/a", "/b"]).await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page(
            r#"<html><head><title>Alpha, "quoted"</title></head>
            <body><a href="/x">x</a><a href="/x">x again</a></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html_page(
            r#"<html><head><title>Beta</title></head><body><a href="mailto:me@example.com">mail</a></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let csv_path = temp_dir.path().join("links.csv");

    let toml = format!(
        r#"
[crawler]
sitemap-url = "{}"
concurrency-limit = 2
min-delay-ms = 0
max-delay-ms = 5
max-retries = 0
request-timeout-ms = 2000

[user-agent]
crawler-name = "TestBot"
contact-url = "https://example.com/contact"

[output]
csv-path = "{}"
"#,
        sitemap_url,
        csv_path.display()
    );
    let config = parse_config(&toml).expect("Failed to parse config");

    let report = Coordinator::new(config.clone())
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Crawl failed");

    let mut output = CsvOutputHandler::new(&config.output.csv_path);
    output
        .write_dataset(&report.dataset)
        .expect("Failed to write CSV");

    let contents = std::fs::read_to_string(&csv_path).expect("Failed to read CSV");
    let expected = format!(
        "Title,URL,found_link\n\
         \"Alpha, \"\"quoted\"\"\",{base}/a,{base}/x\n\
         \"Alpha, \"\"quoted\"\"\",{base}/a,{base}/x\n\
         Beta,{base}/b,mailto:me@example.com\n",
        base = base_url
    );
    assert_eq!(contents, expected);
}
