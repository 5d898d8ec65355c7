use rcycletime::config::Config;
use rcycletime::core::service::LineService;
use rcycletime::models::shift::ShiftClock;
use rcycletime::server::build_router;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;

mod common;
use common::memory_store;

/// Start the API on an ephemeral port and return its base URL.
async fn spawn_server() -> String {
    let devices = Config::with_database(":memory:").devices;
    let service = Arc::new(LineService::new(memory_store(), ShiftClock::utc(), devices));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(service)).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn post(client: &reqwest::Client, url: String, body: Value) -> (StatusCode, Value) {
    let resp = client.post(url).json(&body).send().await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

async fn get(client: &reqwest::Client, url: String) -> (StatusCode, Value) {
    let resp = client.get(url).send().await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn test_health() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let (status, body) = get(&client, format!("{base}/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_set_mode_validation() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let (status, body) = post(&client, format!("{base}/set-mode"), json!({ "mode": "WORK" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "esp_id required");

    let (status, body) = post(
        &client,
        format!("{base}/set-mode"),
        json!({ "esp_id": "ESP01", "mode": "LUNCH" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid mode");
}

#[tokio::test]
async fn test_mode_status_unknown_device() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let (status, body) = get(&client, format!("{base}/mode-status?esp_id=ESP77")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown device");

    let (status, _) = get(&client, format!("{base}/job-event")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_work_press_and_blocked_break() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let (status, body) = post(
        &client,
        format!("{base}/set-mode"),
        json!({ "esp_id": "ESP01", "mode": "WORK" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "WORK");
    assert_eq!(body["allowed"], true);

    // pressing in WORK starts a board; a bounce right after is ignored
    let (_, body) = post(&client, format!("{base}/job-done"), json!({ "esp_id": "ESP01" })).await;
    assert_eq!(body["action"], "started");
    let (status, body) = post(&client, format!("{base}/job-done"), json!({ "esp_id": "ESP01" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ignored"], true);
    assert_eq!(body["reason"], "hardware debounce");

    let (_, body) = get(&client, format!("{base}/mode-status?esp_id=ESP01")).await;
    assert_eq!(body["mode"], "WORK");
    assert_eq!(body["boardActive"], true);

    // within the guard window the break cancels the board
    let (status, body) = post(
        &client,
        format!("{base}/set-mode"),
        json!({ "esp_id": "ESP01", "mode": "BREAK" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "BREAK");
    assert_eq!(body["message"], "board cancelled");

    let (_, body) = get(&client, format!("{base}/mode-status?esp_id=ESP01")).await;
    assert_eq!(body["boardActive"], false);
    assert!(body["elapsed"].is_null());

    let (_, body) = get(&client, format!("{base}/job-event?esp_id=ESP01")).await;
    assert!(body["eventTime"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_press_in_break_is_soft_ignored() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let (status, body) = post(&client, format!("{base}/job-done"), json!({ "deviceId": "ESP02" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ignored"], true);
    assert_eq!(body["reason"], "not in WORK mode");
}

#[tokio::test]
async fn test_set_target_and_graph_data() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    let (status, body) = post(
        &client,
        format!("{base}/set-target"),
        json!({ "department": "Assembly", "model": "Model_A", "target_time_sec": -5 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid data");

    let (status, body) = post(
        &client,
        format!("{base}/set-target"),
        json!({ "department": "Assembly", "model": "Model_A", "target_time_sec": 45 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active_target_updated");

    let (status, body) = get(&client, format!("{base}/graph-data?esp_id=ESP01")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deviceId"], "ESP01");
    assert_eq!(body["department"], "Assembly");
    assert_eq!(body["targetTime"], 45);
    assert_eq!(body["model"], "Model_A");
    assert!(body["currentShiftRecords"].as_array().unwrap().is_empty());
    assert!(body["breakSessions"].as_array().unwrap().is_empty());
}

#[test]
fn test_blocked_break_maps_to_forbidden() {
    use rcycletime::core::mode::ModeOutcome;
    use rcycletime::server::payload::mode_response;

    let (status, body) = mode_response(&ModeOutcome::Blocked { elapsed: 42 });
    assert_eq!(status.as_u16(), 403);
    assert_eq!(body["blocked"], true);
    assert_eq!(body["mode"], "WORK");
    assert_eq!(body["reason"], "board in progress");
    assert_eq!(body["elapsed"], 42);
}
