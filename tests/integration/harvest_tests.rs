//! Integration tests for the fetch engine
//!
//! These tests use wiremock to create mock HTTP servers and run whole waves
//! and ranges against temporary directories.

use std::collections::BTreeSet;
use std::path::Path;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wave_harvest::config::{
    Config, FetchConfig, NamingConfig, PathsConfig, ProxyConfig, ThrottleConfig,
};
use wave_harvest::harvest::{RoundDecision, BROWSER_USER_AGENT};
use wave_harvest::{Engine, HarvestError, IndexRange};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted in `root`
fn create_test_config(root: &Path, min_round_interval_secs: u64) -> Config {
    Config {
        fetch: FetchConfig {
            timeout_secs: 5,
            max_concurrent: 3,
        },
        proxy: ProxyConfig::default(),
        paths: PathsConfig {
            urls_path: root.join("urls"),
            fail_path: root.join("fail"),
            storage_path: root.join("images"),
            log_path: root.join("logs"),
        },
        naming: NamingConfig {
            prefix: "list-".to_string(),
            width: 3,
            suffix: String::new(),
        },
        throttle: ThrottleConfig {
            min_round_interval_secs,
        },
    }
}

fn write_list(root: &Path, stem: &str, lines: &[String]) {
    let dir = root.join("urls");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(format!("{}.txt", stem)), lines.join("\n")).unwrap();
}

fn failure_lines(path: &Path) -> BTreeSet<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_mixed_outcome_wave() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount(
        &mock_server,
        "/ok.jpg",
        ResponseTemplate::new(200).set_body_bytes(b"JPEGDATA".to_vec()),
    )
    .await;
    mount(
        &mock_server,
        "/forbidden.png",
        ResponseTemplate::new(403).set_body_bytes(b"PNGDATA".to_vec()),
    )
    .await;
    mount(&mock_server, "/limited.webp", ResponseTemplate::new(429)).await;
    mount(
        &mock_server,
        "/missing.png",
        ResponseTemplate::new(404).set_body_string("not found"),
    )
    .await;
    mount(
        &mock_server,
        "/anim.gif",
        ResponseTemplate::new(200).set_body_bytes(b"GIF89a".to_vec()),
    )
    .await;

    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let lines = vec![
        format!("{}/ok.jpg list-001/ok.JPG?w=100", base),
        format!("{}/forbidden.png list-001/forbidden.png", base),
        format!("{}/limited.webp   list-001/limited.webp  ", base),
        format!("{}/missing.png list-001/missing.png", base),
        format!("{}/anim.gif list-001/anim.gif", base),
        format!("{}/ok.jpg list-001/no-such-dir/ok.jpg", base),
        "http://127.0.0.1:1/refused.jpg list-001/refused.jpg".to_string(),
        format!("{}/ok.jpg", base),
    ];
    write_list(root, "list-001", &lines);

    let config = create_test_config(root, 300);
    let mut engine = Engine::new(&config).expect("Failed to create engine");
    engine.layout().provision("list-001").unwrap();

    let report = engine.run_wave("list-001").await.expect("Wave failed");

    assert_eq!(report.lines, 8);
    assert_eq!(report.items, 7);
    assert_eq!(report.skipped_lines, 1);
    assert_eq!(report.failures, 4);
    assert!(report.flush_error.is_none());
    assert_eq!(report.decision, RoundDecision::Continue);
    assert!(engine.recorder().is_empty());

    // Failure log holds exactly the failed items, in input format
    let expected: BTreeSet<String> = [
        format!("{}/forbidden.png list-001/forbidden.png", base),
        format!("{}/limited.webp list-001/limited.webp", base),
        format!("{}/ok.jpg list-001/no-such-dir/ok.jpg", base),
        "http://127.0.0.1:1/refused.jpg list-001/refused.jpg".to_string(),
    ]
    .into_iter()
    .collect();
    assert_eq!(failure_lines(&root.join("fail/list-001.txt")), expected);

    // Sanitized destination keeps the original case and drops the query
    let images = root.join("images/list-001");
    assert_eq!(std::fs::read(images.join("ok.JPG")).unwrap(), b"JPEGDATA");

    // Refused statuses never produce a file
    assert!(!images.join("forbidden.png").exists());
    assert!(!images.join("limited.webp").exists());

    // Other error statuses are stored as if they were payloads
    assert_eq!(
        std::fs::read_to_string(images.join("missing.png")).unwrap(),
        "not found"
    );

    // Non-image destinations are dropped without a failure record
    assert!(!images.join("anim.gif").exists());
}

/// Accepts one connection, answers it with the raw `response` bytes, then
/// closes it; the handle yields the lowercased request head
async fn serve_one_raw(response: String) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut head: Vec<u8> = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            head.extend_from_slice(&buf[..n]);
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&head).to_lowercase()
    });

    (format!("http://{}", addr), handle)
}

/// Accepts one connection and answers it with a complete 200 carrying `body`
async fn capture_one_request(body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    serve_one_raw(format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    ))
    .await
}

#[tokio::test]
async fn test_requests_carry_browser_user_agent() {
    let (base, server) = capture_one_request("matched").await;

    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_list(root, "list-001", &[format!("{}/ua.png list-001/ua.png", base)]);

    let config = create_test_config(root, 300);
    let mut engine = Engine::new(&config).unwrap();
    engine.layout().provision("list-001").unwrap();

    let report = engine.run_wave("list-001").await.unwrap();
    let request_head = server.await.unwrap();

    assert_eq!(report.failures, 0);
    assert!(request_head.starts_with("get /ua.png http/1.1"));
    assert!(request_head.contains(&format!(
        "user-agent: {}",
        BROWSER_USER_AGENT.to_lowercase()
    )));
    assert_eq!(
        std::fs::read_to_string(root.join("images/list-001/ua.png")).unwrap(),
        "matched"
    );
}

#[tokio::test]
async fn test_truncated_body_is_recorded_as_failure() {
    // Promises 1000 bytes, sends 5, then hangs up
    let (base, server) =
        serve_one_raw("HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\nshort".to_string()).await;

    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let line = format!("{}/a.jpg list-001/a.jpg", base);
    write_list(root, "list-001", &[line.clone()]);

    let config = create_test_config(root, 300);
    let mut engine = Engine::new(&config).unwrap();
    engine.layout().provision("list-001").unwrap();

    let report = engine.run_wave("list-001").await.unwrap();
    server.await.unwrap();

    assert_eq!(report.items, 1);
    assert_eq!(report.failures, 1);
    assert!(report.flush_error.is_none());
    assert_eq!(
        std::fs::read_to_string(root.join("fail/list-001.txt")).unwrap(),
        format!("{}\n", line)
    );
    assert!(!root.join("images/list-001/a.jpg").exists());
}

#[tokio::test]
async fn test_wave_larger_than_ceiling_completes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"IMG".to_vec())
                .set_delay(std::time::Duration::from_millis(20)),
        )
        .expect(12)
        .mount(&mock_server)
        .await;

    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let lines: Vec<String> = (0..12)
        .map(|i| format!("{}/{}.png list-001/{}.png", mock_server.uri(), i, i))
        .collect();
    write_list(root, "list-001", &lines);

    let config = create_test_config(root, 300);
    let mut engine = Engine::new(&config).unwrap();
    engine.layout().provision("list-001").unwrap();

    let report = engine.run_wave("list-001").await.unwrap();

    assert_eq!(report.items, 12);
    assert_eq!(report.failures, 0);
    assert_eq!(engine.pool().in_flight(), 0);
    for i in 0..12 {
        assert!(root.join(format!("images/list-001/{}.png", i)).is_file());
    }
}

#[tokio::test]
async fn test_missing_list_is_skipped() {
    let tmp = TempDir::new().unwrap();
    let config = create_test_config(tmp.path(), 300);
    let mut engine = Engine::new(&config).unwrap();
    engine.layout().provision("list-009").unwrap();

    let result = engine.run_wave("list-009").await;

    assert!(matches!(result, Err(HarvestError::InputUnreadable { .. })));
    assert!(!tmp.path().join("fail/list-009.txt").exists());
}

async fn serve_three_lists(root: &Path) -> MockServer {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        "/img.jpg",
        ResponseTemplate::new(200).set_body_bytes(b"JPEG".to_vec()),
    )
    .await;

    for stem in ["list-001", "list-002", "list-003"] {
        write_list(
            root,
            stem,
            &[format!("{}/img.jpg {}/img.jpg", mock_server.uri(), stem)],
        );
    }
    mock_server
}

#[tokio::test]
async fn test_fast_consecutive_waves_stop_the_range() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let _server = serve_three_lists(root).await;

    let config = create_test_config(root, 300);
    let mut engine = Engine::new(&config).unwrap();

    let summary = engine
        .run_range(IndexRange::new(1, 3).unwrap())
        .await
        .expect("Range failed");

    assert_eq!(summary.waves_completed, 2);
    assert_eq!(summary.stopped_after.as_deref(), Some("list-002"));

    assert!(root.join("images/list-001/img.jpg").is_file());
    assert!(root.join("images/list-002/img.jpg").is_file());
    assert!(root.join("fail/list-002.txt").is_file());

    // The third list is never touched
    assert!(!root.join("images/list-003/img.jpg").exists());
    assert!(!root.join("fail/list-003.txt").exists());
}

#[tokio::test]
async fn test_slow_enough_waves_process_whole_range() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    let _server = serve_three_lists(root).await;

    let config = create_test_config(root, 0);
    let mut engine = Engine::new(&config).unwrap();

    let summary = engine
        .run_range(IndexRange::new(1, 3).unwrap())
        .await
        .unwrap();

    assert_eq!(summary.waves_completed, 3);
    assert_eq!(summary.failures, 0);
    assert!(summary.stopped_after.is_none());
    for stem in ["list-001", "list-002", "list-003"] {
        assert!(root.join(format!("images/{}/img.jpg", stem)).is_file());
        assert_eq!(
            std::fs::read_to_string(root.join(format!("fail/{}.txt", stem))).unwrap(),
            ""
        );
    }

    let run_log = std::fs::read_to_string(root.join("logs/log-1-3.txt")).unwrap();
    assert_eq!(run_log.lines().count(), 3);
    assert!(run_log.contains("completed list-003 (0 failures)"));
}

#[tokio::test]
async fn test_failure_log_can_be_fed_back_as_input() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, "/busy.png", ResponseTemplate::new(429)).await;

    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    write_list(
        root,
        "list-001",
        &[format!("{}/busy.png list-001/busy.png", mock_server.uri())],
    );

    let config = create_test_config(root, 0);
    let mut engine = Engine::new(&config).unwrap();
    engine.layout().provision("list-001").unwrap();
    engine.run_wave("list-001").await.unwrap();

    // Re-run the failure log as the next list
    std::fs::copy(
        root.join("fail/list-001.txt"),
        root.join("urls/list-002.txt"),
    )
    .unwrap();
    engine.layout().provision("list-002").unwrap();
    let retry = engine.run_wave("list-002").await.unwrap();

    assert_eq!(retry.items, 1);
    assert_eq!(retry.failures, 1);
    assert_eq!(
        failure_lines(&root.join("fail/list-002.txt")),
        failure_lines(&root.join("fail/list-001.txt"))
    );
}
