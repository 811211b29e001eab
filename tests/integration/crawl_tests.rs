//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from configuration to written files.

use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use web_rollup::config::{parse_config, Config, FetcherConfig};
use web_rollup::crawler::{run, HttpFetcher};
use web_rollup::output::{FailureKind, HtmdConverter};
use web_rollup::RollupError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing into `output_dir`
///
/// `sites` is the TOML of the `[[sites]]` tables.
fn create_test_config(output_type: &str, output_dir: &TempDir, sites: &str) -> Config {
    let content = format!(
        r#"
output-type = "{}"
output-dir = "{}"
single-file-name = "all.md"
requests-per-second = 100.0
burst-limit = 10
max-workers = 4

{}
"#,
        output_type,
        output_dir.path().display(),
        sites
    );
    parse_config(&content).expect("Failed to parse test config")
}

async fn mount_page(server: &MockServer, page_path: &str, body: String, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn run_config(config: &Config) -> Result<web_rollup::RunReport, RollupError> {
    let fetcher = Arc::new(HttpFetcher::new(FetcherConfig::default()));
    run(config, fetcher, &HtmdConverter, CancellationToken::new()).await
}

#[tokio::test]
async fn test_full_crawl_single_mode() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Index links to both pages and back to itself
    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><head><title>Home</title></head><body><main>
            <p>Welcome</p>
            <a href="{0}/page2">Page 2</a>
            <a href="/page1">Page 1</a>
            <a href="{0}/">Home</a>
            </main></body></html>"#,
            base_url
        ),
        1,
    )
    .await;

    mount_page(
        &mock_server,
        "/page1",
        r#"<html><head><title>Page 1</title></head><body>
        <main><p>Content 1</p><div class="ads">Buy now</div></main>
        <a href="/">Home</a>
        </body></html>"#
            .to_string(),
        1,
    )
    .await;

    mount_page(
        &mock_server,
        "/page2",
        r#"<html><head><title>Page 2</title></head><body><main><p>Content 2</p></main></body></html>"#
            .to_string(),
        1,
    )
    .await;

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(
        "single",
        &output_dir,
        &format!(
            r#"
[[sites]]
base-url = "{}"
css-locator = "main"
exclude-selectors = [".ads"]
max-depth = 2
"#,
            base_url
        ),
    );

    let report = run_config(&config).await.expect("Run should succeed");

    assert_eq!(report.stats.attempted, 3);
    assert_eq!(report.stats.succeeded, 3);
    assert_eq!(report.files(), &[output_dir.path().join("all.md")]);

    let text = std::fs::read_to_string(output_dir.path().join("all.md")).unwrap();

    let home = text
        .find(&format!("# ::: Content from {}\n", base_url))
        .expect("home section missing");
    let page1 = text
        .find(&format!("# ::: Content from {}/page1\n", base_url))
        .expect("page1 section missing");
    let page2 = text
        .find(&format!("# ::: Content from {}/page2\n", base_url))
        .expect("page2 section missing");
    assert!(home < page1 && page1 < page2, "sections must be ordered by URL");

    assert!(text.contains("Content 1"));
    assert!(text.contains("Content 2"));
    assert!(!text.contains("Buy now"));
    assert_eq!(text.matches("\n---\n").count(), 2);
}

#[tokio::test]
async fn test_allowed_paths_without_discovery() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/a",
        r#"<html><head><title>Section A</title></head><body><a href="/c">C</a>A body</body></html>"#
            .to_string(),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/b",
        r#"<html><head><title>Section B</title></head><body>B body</body></html>"#.to_string(),
        1,
    )
    .await;
    mount_page(&mock_server, "/c", "<p>never</p>".to_string(), 0).await;

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(
        "separate",
        &output_dir,
        &format!(
            r#"
[[sites]]
base-url = "{}/"
allowed-paths = ["/a", "/b"]
max-depth = 0
"#,
            base_url
        ),
    );

    let report = run_config(&config).await.expect("Run should succeed");

    assert_eq!(report.stats.attempted, 2);
    assert_eq!(
        report.files(),
        &[
            output_dir.path().join("Section_A.rollup.md"),
            output_dir.path().join("Section_B.rollup.md"),
        ]
    );
}

#[tokio::test]
async fn test_failed_pages_omitted() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/ok">ok</a><a href="/missing">missing</a></body></html>"#
            .to_string(),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/ok",
        r#"<html><head><title>Fine Page</title></head><body><p>fine</p></body></html>"#
            .to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(
        "single",
        &output_dir,
        &format!(
            r#"
[[sites]]
base-url = "{}"
max-depth = 1
"#,
            base_url
        ),
    );

    let report = run_config(&config).await.expect("Run should succeed");

    assert_eq!(report.stats.attempted, 3);
    assert_eq!(report.stats.succeeded, 2);
    assert_eq!(report.stats.failed.get(&FailureKind::Fetch), Some(&1));

    let text = std::fs::read_to_string(output_dir.path().join("all.md")).unwrap();
    assert!(text.contains(&format!("# ::: Content from {}/ok", base_url)));
    assert!(!text.contains("/missing\n"));
}

#[tokio::test]
async fn test_all_pages_failing_is_an_error() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let output_dir = TempDir::new().unwrap();
    let out = output_dir.path().join("out");
    let config = {
        let mut config = create_test_config(
            "single",
            &output_dir,
            &format!("[[sites]]\nbase-url = \"{}\"\n", base_url),
        );
        config.output_dir = out.display().to_string();
        config
    };

    let result = run_config(&config).await;

    assert!(matches!(
        result,
        Err(RollupError::NoContent { attempted: 1 })
    ));
    assert!(!out.exists(), "nothing should be written");
}

#[tokio::test]
async fn test_cancelled_run_writes_nothing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", "<p>home</p>".to_string(), 0).await;

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(
        "single",
        &output_dir,
        &format!("[[sites]]\nbase-url = \"{}\"\n", base_url),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();

    let fetcher = Arc::new(HttpFetcher::new(FetcherConfig::default()));
    let result = run(&config, fetcher, &HtmdConverter, cancel).await;

    assert!(matches!(
        result,
        Err(RollupError::NoContent { attempted: 0 })
    ));
}

#[tokio::test]
async fn test_invalid_config_rejected_before_crawling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let output_dir = TempDir::new().unwrap();
    let config = create_test_config(
        "single",
        &output_dir,
        &format!(
            "[[sites]]\nbase-url = \"{}\"\ncss-locator = \"main[\"\n",
            mock_server.uri()
        ),
    );

    let result = run_config(&config).await;
    assert!(matches!(result, Err(RollupError::Config(_))));
}
