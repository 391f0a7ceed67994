//! Integration tests for the scanner
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full scan cycle end-to-end.

use affiliate_scout::config::{parse_config, Config, ScannerConfig};
use affiliate_scout::follow::{FollowDriver, FollowError, LoggingDriver};
use affiliate_scout::input::InputSource;
use affiliate_scout::job::{run_follows, run_scan, write_reports};
use affiliate_scout::output::{CsvReport, ReportSink, RunInfo};
use affiliate_scout::ScoutError;
use affiliate_scout::scanner::{
    build_http_client, scan_targets, BatchRunner, LinkClassifier, Pacing, Platform, SiteScanner,
    DEFAULT_PROGRAM_KEYWORDS,
};
use std::io::Write;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a scanner with a short timeout and the default tables
fn create_test_scanner() -> SiteScanner {
    let config = ScannerConfig {
        timeout_secs: 5,
        ..ScannerConfig::default()
    };
    let client = build_http_client(&config).expect("Failed to build client");
    let classifier = LinkClassifier::new(DEFAULT_PROGRAM_KEYWORDS, Platform::Instagram)
        .expect("Failed to build classifier");

    SiteScanner::new(client, classifier, true)
}

/// Creates a runner with a very short pacing delay
fn create_test_runner(max_concurrent: usize) -> BatchRunner {
    BatchRunner::new(
        create_test_scanner(),
        Pacing::new(Duration::from_millis(10), Duration::ZERO),
        max_concurrent,
    )
}

async fn mount_page(server: &MockServer, page: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html.to_string(), "text/html"),
        )
        .mount(server)
        .await;
}

fn url(s: &str) -> Url {
    Url::parse(s).expect("Failed to parse URL")
}

#[tokio::test]
async fn test_unreachable_site_skipped_good_site_scanned() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Good Example</title></head><body>
            <a href="https://www.facebook.com/goodexample">Facebook</a>
            <a href="/partners">Partner Program</a>
        </body></html>"#,
    )
    .await;

    let runner = create_test_runner(1);
    let result = runner
        .scan_all(vec!["badhost.invalid".to_string(), format!("{}/", base_url)])
        .await;

    assert_eq!(result.attempted, 2);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].url, "badhost.invalid");

    let record = &result.records[0];
    assert_eq!(record.url, format!("{}/", base_url));
    assert_eq!(
        record.program_links.iter().collect::<Vec<_>>(),
        vec![&url(&format!("{}/partners", base_url))]
    );
    assert_eq!(record.social_links.len(), 1);
    assert_eq!(
        record.social_links[&Platform::Facebook]
            .iter()
            .collect::<Vec<_>>(),
        vec![&url("https://www.facebook.com/goodexample")]
    );
}

#[tokio::test]
async fn test_duplicate_social_links_collapse() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body>
            <header><a href="https://instagram.com/acme">IG</a></header>
            <main><a href="https://instagram.com/acme">Follow us</a></main>
            <footer><a href="https://instagram.com/acme"><img alt="Instagram" src="ig.png"></a></footer>
        </body></html>"#,
    )
    .await;

    let record = create_test_scanner()
        .try_scan(&mock_server.uri())
        .await
        .expect("Scan failed");

    assert_eq!(record.social_links[&Platform::Instagram].len(), 1);
    assert!(!record.social_links.contains_key(&Platform::Facebook));
    assert!(record.program_links.is_empty());
}

#[tokio::test]
async fn test_title_and_missing_description() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Acme Co</title></head><body><h1>Welcome</h1></body></html>"#,
    )
    .await;

    let record = create_test_scanner()
        .try_scan(&mock_server.uri())
        .await
        .expect("Scan failed");

    assert_eq!(record.display_name, "Acme Co");
    assert_eq!(record.meta_description, "");
}

#[tokio::test]
async fn test_h1_display_name_and_description() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><meta name="description" content="Hand-made goods"></head>
            <body><h1>Welcome</h1></body></html>"#,
    )
    .await;

    let record = create_test_scanner()
        .try_scan(&mock_server.uri())
        .await
        .expect("Scan failed");

    assert_eq!(record.display_name, "Welcome");
    assert_eq!(record.meta_description, "Hand-made goods");
}

#[tokio::test]
async fn test_relative_links_resolve_against_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/about/",
        r#"<html><body>
            <a href="../contact">Become an AFFILIATE</a>
            <a href="team">Team</a>
        </body></html>"#,
    )
    .await;

    let record = create_test_scanner()
        .try_scan(&format!("{}/about/", base_url))
        .await
        .expect("Scan failed");

    assert!(record
        .program_links
        .contains(&url(&format!("{}/contact", base_url))));
    assert_eq!(record.program_links.len(), 1);
}

#[tokio::test]
async fn test_redirect_sets_base_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new/"))
        .mount(&mock_server)
        .await;

    mount_page(
        &mock_server,
        "/new/",
        r#"<html><body><a href="affiliates">Affiliates</a></body></html>"#,
    )
    .await;

    let record = create_test_scanner()
        .try_scan(&format!("{}/old", base_url))
        .await
        .expect("Scan failed");

    assert_eq!(record.url, format!("{}/old", base_url));
    assert!(record
        .program_links
        .contains(&url(&format!("{}/new/affiliates", base_url))));
}

#[tokio::test]
async fn test_error_status_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let runner = create_test_runner(1);
    let result = runner
        .scan_all(vec![format!("{}/missing", base_url), format!("{}/broken", base_url)])
        .await;

    assert!(result.is_empty());
    assert_eq!(result.attempted, 2);
    assert!(result.skipped.iter().all(|s| s.kind == "http_status"));
    assert!(result.skipped[0].reason.contains("404"));
    assert!(result.skipped[1].reason.contains("503"));
}

#[tokio::test]
async fn test_mislabelled_html_still_scanned() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><title>Shop</title></head>
            <body><a href="/affiliate">Affiliate</a></body></html>"#,
            "application/octet-stream",
        ))
        .mount(&mock_server)
        .await;

    let record = create_test_scanner()
        .try_scan(&mock_server.uri())
        .await
        .expect("mislabelled HTML should still produce a record");

    assert_eq!(record.display_name, "Shop");
    assert_eq!(record.program_links.len(), 1);
}

#[tokio::test]
async fn test_non_markup_body_yields_empty_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/brochure.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .mount(&mock_server)
        .await;

    let record = create_test_scanner()
        .try_scan(&format!("{}/brochure.pdf", mock_server.uri()))
        .await
        .expect("a 2xx body is always parsed");

    assert!(record.program_links.is_empty());
    assert!(record.social_links.is_empty());
}

#[tokio::test]
async fn test_text_fallback_finds_instagram_handle() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><p>Say hi on instagram.com/acme.studio!</p>
            <script>var x = "instagram.com/ignored";</script></body></html>"#,
    )
    .await;

    let record = create_test_scanner()
        .try_scan(&mock_server.uri())
        .await
        .expect("Scan failed");

    assert_eq!(
        record
            .social_for(Platform::Instagram)
            .map(Url::as_str)
            .collect::<Vec<_>>(),
        vec!["https://instagram.com/acme.studio"]
    );
}

#[tokio::test]
async fn test_parallel_scan_keeps_input_order() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Earlier sites answer more slowly so completion order is reversed
    for (i, delay_ms) in [(0, 300u64), (1, 150), (2, 0)] {
        Mock::given(method("GET"))
            .and(path(format!("/site{}", i)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(
                        format!("<html><head><title>Site {}</title></head></html>", i),
                        "text/html",
                    )
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(&mock_server)
            .await;
    }

    let runner = create_test_runner(3);
    let targets: Vec<String> = (0..3).map(|i| format!("{}/site{}", base_url, i)).collect();
    let result = runner.scan_all(targets).await;

    let names: Vec<&str> = result.iter().map(|r| r.display_name.as_str()).collect();
    assert_eq!(names, vec!["Site 0", "Site 1", "Site 2"]);
}

#[tokio::test]
async fn test_csv_input_scan_and_export() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/shop",
        r#"<html><head><title>Shop</title></head><body>
            <a href="/brand-ambassador">Ambassadors</a>
            <a href="https://www.tiktok.com/@shop">TikTok</a>
            <a href="https://www.youtube.com/shopchannel">YouTube</a>
        </body></html>"#,
    )
    .await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let input_path = dir.path().join("sites.csv");
    let mut input = std::fs::File::create(&input_path).expect("Failed to create input");
    writeln!(input, "brand,Website_URL").unwrap();
    writeln!(input, "Shop,{}/shop", base_url).unwrap();
    writeln!(input, "Blank,").unwrap();

    let source = InputSource::CsvFile {
        path: input_path,
        column: "website_url".to_string(),
    };
    let targets = source
        .load(&reqwest::Client::new())
        .await
        .expect("Failed to load targets");
    assert_eq!(targets.len(), 1);

    let started_at = chrono::Utc::now();
    let batch = create_test_runner(1).scan_all(targets).await;
    let run = RunInfo {
        started_at,
        finished_at: chrono::Utc::now(),
        config_hash: None,
        source: source.describe(),
    };

    let report = CsvReport::new(dir.path().join("reports"), "website_scanning_results");
    let report_path = report.export(&batch, &run).expect("Export failed");

    let mut rdr = csv::Reader::from_path(&report_path).expect("Failed to open report");
    let headers = rdr.headers().expect("Missing headers").clone();
    assert_eq!(&headers[0], "Website URL");
    assert_eq!(&headers[8], "Youtube Links");

    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(&rows[0][1], "Shop");
    assert_eq!(&rows[0][3], format!("{}/brand-ambassador", base_url));
    assert_eq!(&rows[0][8], "https://www.youtube.com/shopchannel");
    assert_eq!(&rows[0][9], "https://www.tiktok.com/@shop");
}

#[tokio::test]
async fn test_config_driven_runner() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/creators">Creator Fund</a><a href="/affiliate">Affiliate</a></body></html>"#,
    )
    .await;

    let config = parse_config(
        r#"
[scanner]
timeout-secs = 5

[classifier]
program-keywords = ["creator fund"]
"#,
    )
    .expect("Failed to parse config");

    let result = scan_targets(&config, vec![mock_server.uri()])
        .await
        .expect("Failed to build runner");

    let record = &result.records[0];
    assert_eq!(record.program_links.len(), 1);
    assert!(record
        .program_links
        .contains(&url(&format!("{}/creators", mock_server.uri()))));
}

/// Config for end-to-end runs: reports under `dir`, no follow delays
fn run_config(dir: &std::path::Path, summary: bool) -> Config {
    let summary_line = if summary {
        format!("summary-path = \"{}\"", dir.join("summary.md").display())
    } else {
        String::new()
    };

    parse_config(&format!(
        r#"
[scanner]
timeout-secs = 5

[output]
directory = "{}"
file-prefix = "run"
{}

[follow]
platform = "instagram"
min-delay-ms = 0
max-delay-ms = 0
"#,
        dir.join("reports").display(),
        summary_line
    ))
    .expect("Failed to parse config")
}

#[tokio::test]
async fn test_full_run_reports_and_follow_plan() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Acme</title></head><body>
            <a href="/partners">Partner Program</a>
            <a href="https://instagram.com/acme">Instagram</a>
        </body></html>"#,
    )
    .await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config = run_config(dir.path(), true);
    let source = InputSource::Inline(vec![mock_server.uri()]);

    let outcome = run_scan(&config, &source, Some("abc123".to_string()))
        .await
        .expect("Scan failed");
    assert_eq!(outcome.batch.len(), 1);
    assert_eq!(outcome.run.config_hash.as_deref(), Some("abc123"));

    let paths = write_reports(&config, &outcome, dir.path()).expect("Export failed");
    assert_eq!(paths.len(), 2);
    assert!(paths[0].starts_with(dir.path().join("reports")));
    let summary = std::fs::read_to_string(&paths[1]).expect("Missing summary");
    assert!(summary.contains("Acme"));

    let mut driver = LoggingDriver::default();
    let plan = run_follows(&config, &outcome.batch, &mut driver)
        .await
        .expect("Follow queue failed");
    assert_eq!(plan.followed, vec![url("https://instagram.com/acme")]);
    assert_eq!(driver.followed, plan.followed);
}

#[tokio::test]
async fn test_unreadable_input_is_input_error() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config = run_config(dir.path(), false);
    let source = InputSource::CsvFile {
        path: dir.path().join("missing.csv"),
        column: "website_url".to_string(),
    };

    let err = run_scan(&config, &source, None)
        .await
        .expect_err("Missing input should fail the run");
    assert!(matches!(err, ScoutError::Input(_)));
}

#[tokio::test]
async fn test_blocked_report_directory_is_export_error() {
    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let blocker = dir.path().join("blocked");
    std::fs::write(&blocker, "not a directory").unwrap();

    // Both the configured directory and the fallback sit under a file
    let config = run_config(&blocker, false);
    let outcome = run_scan(&config, &InputSource::Inline(Vec::new()), None)
        .await
        .expect("An empty target list still runs");
    assert!(outcome.batch.is_empty());

    let err = write_reports(&config, &outcome, &blocker.join("fallback"))
        .expect_err("Both destinations are unwritable");
    assert!(matches!(err, ScoutError::Export(_)));
}

struct BrokenDriver;

impl FollowDriver for BrokenDriver {
    async fn follow(&mut self, _profile: &Url) -> Result<(), FollowError> {
        Err(FollowError::Driver("browser session closed".to_string()))
    }
}

#[tokio::test]
async fn test_broken_driver_is_follow_error() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="https://instagram.com/acme">IG</a></body></html>"#,
    )
    .await;

    let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config = run_config(dir.path(), false);
    let outcome = run_scan(&config, &InputSource::Inline(vec![mock_server.uri()]), None)
        .await
        .expect("Scan failed");

    let err = run_follows(&config, &outcome.batch, &mut BrokenDriver)
        .await
        .expect_err("Driver failure should stop the queue");
    assert!(matches!(err, ScoutError::Follow(FollowError::Driver(_))));
}
