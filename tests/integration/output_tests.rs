//! Integration tests for separate-mode output naming

use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use web_rollup::config::{parse_config, FetcherConfig};
use web_rollup::crawler::{run, HttpFetcher};
use web_rollup::output::HtmdConverter;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_html(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_separate_files_named_from_titles_and_urls() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><head><title>Hello World</title></head><body>
        <h1>Welcome</h1>
        <a href="/first">first</a>
        <a href="/second">second</a>
        <a href="/untitled-page">untitled</a>
        </body></html>"#,
    )
    .await;
    mount_html(
        &mock_server,
        "/first",
        "<html><head><title>Guide</title></head><body><p>one</p></body></html>",
    )
    .await;
    mount_html(
        &mock_server,
        "/second",
        "<html><head><title>Guide!</title></head><body><p>two</p></body></html>",
    )
    .await;
    mount_html(&mock_server, "/untitled-page", "<html><body><p>three</p></body></html>").await;

    let output_dir = TempDir::new().unwrap();
    let config = parse_config(&format!(
        r#"
output-type = "separate"
output-dir = "{}"
requests-per-second = 100.0
burst-limit = 10

[[sites]]
base-url = "{}"
max-depth = 1
"#,
        output_dir.path().display(),
        base_url
    ))
    .unwrap();

    let fetcher = Arc::new(HttpFetcher::new(FetcherConfig::default()));
    let report = run(&config, fetcher, &HtmdConverter, CancellationToken::new())
        .await
        .expect("Run should succeed");

    let mut names: Vec<String> = report
        .files()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let mut expected = vec![
        "Guide-2.rollup.md".to_string(),
        "Guide.rollup.md".to_string(),
        "Hello_World.rollup.md".to_string(),
        "127_0_0_1_untitled-page.rollup.md".to_string(),
    ];
    expected.sort();
    assert_eq!(names, expected);

    // Groups are named in URL order: /first claims the plain name
    let first = std::fs::read_to_string(output_dir.path().join("Guide.rollup.md")).unwrap();
    assert!(first.starts_with(&format!("# ::: Content from {}/first\n\none", base_url)));

    let home = std::fs::read_to_string(output_dir.path().join("Hello_World.rollup.md")).unwrap();
    assert!(home.contains("# Welcome"));
}
