//! Integration tests for the honeypot HTTP API and report callback.
//!
//! Each test spins up the honeypot on a random port plus a mock callback
//! server, then drives the real HTTP contract with reqwest.

use std::fs::File;
use std::io::{BufReader, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

use scam_honeypot::detection::train::{TrainingParams, read_dataset, train};
use scam_honeypot::detection::{Detector, TfidfLogisticModel};
use scam_honeypot::engagement::{EngagementEngine, ResponseGenerator};
use scam_honeypot::report::HttpReportSink;
use scam_honeypot::server::{AppState, honeypot_routes};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

const API_KEY: &str = "integration-key";

const CLOSING_REPLY: &str = "I will visit the bank branch and confirm this.";

/// Train on the bundled dataset, write the artifact, and load it back the way main does.
fn trained_model() -> TfidfLogisticModel {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/scam_dataset.jsonl");
    let samples = read_dataset(BufReader::new(File::open(path).unwrap())).unwrap();
    let trained = train(&samples, &TrainingParams::default()).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    let json = serde_json::to_string(&trained.artifact).unwrap();
    file.write_all(json.as_bytes()).unwrap();
    TfidfLogisticModel::load(file.path()).unwrap()
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Mock callback endpoint: forwards every report body and answers with `status`.
async fn start_callback(status: StatusCode) -> (String, mpsc::UnboundedReceiver<Value>) {
    let (tx, rx) = mpsc::unbounded_channel::<Value>();

    async fn receive(
        State((tx, status)): State<(mpsc::UnboundedSender<Value>, StatusCode)>,
        Json(body): Json<Value>,
    ) -> StatusCode {
        let _ = tx.send(body);
        status
    }

    let app = Router::new()
        .route("/report", post(receive))
        .with_state((tx, status));
    let addr = serve(app).await;
    (format!("http://{addr}/report"), rx)
}

/// Start the honeypot wired to `callback_url`. Returns its base URL.
async fn start_honeypot(callback_url: &str) -> String {
    let detector = Detector::new(Arc::new(trained_model()));
    let sink = HttpReportSink::new(callback_url, Duration::from_secs(2)).unwrap();
    let engine = EngagementEngine::new(detector, ResponseGenerator::seeded(17), Arc::new(sink))
        .with_report_timeout(Duration::from_secs(2));
    let api_key = SecretString::from(API_KEY.to_string());
    let app = honeypot_routes(AppState::new(Arc::new(engine), api_key));
    let addr = serve(app).await;
    format!("http://{addr}")
}

async fn send(client: &reqwest::Client, base: &str, session: &str, text: &str) -> Value {
    let resp = client
        .post(format!("{base}/honeypot"))
        .header("x-api-key", API_KEY)
        .json(&json!({
            "sessionId": session,
            "message": {"sender": "scammer", "text": text, "timestamp": 1700000000},
            "conversationHistory": [],
            "metadata": {"channel": "SMS", "language": "English", "locale": "IN"}
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    resp.json().await.unwrap()
}

const SCENARIO: [&str; 4] = [
    "hello",
    "send otp",
    "my upi is a@b",
    "click this http://scam.example link",
];

async fn next_report(reports: &mut mpsc::UnboundedReceiver<Value>) -> Value {
    timeout(Duration::from_secs(3), reports.recv())
        .await
        .expect("callback not called")
        .expect("callback channel closed")
}

async fn assert_no_report(reports: &mut mpsc::UnboundedReceiver<Value>) {
    let extra = timeout(Duration::from_millis(300), reports.recv()).await;
    assert!(extra.is_err(), "unexpected extra report: {extra:?}");
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn scenario_delivers_report_to_callback() {
    timeout(TEST_TIMEOUT, async {
        let (callback, mut reports) = start_callback(StatusCode::OK).await;
        let base = start_honeypot(&callback).await;
        let client = reqwest::Client::new();

        let mut last = Value::Null;
        for text in SCENARIO {
            last = send(&client, &base, "int-1", text).await;
            assert_eq!(last["status"], "success");
        }
        assert_eq!(last["reply"], CLOSING_REPLY);

        let report = next_report(&mut reports).await;
        assert_eq!(report["sessionId"], "int-1");
        assert_eq!(report["scamDetected"], true);
        assert_eq!(report["totalMessagesExchanged"], 4);
        assert_eq!(
            report["agentNotes"],
            "Scammer used urgency, payment redirection, and phishing tactics"
        );

        let intel = &report["extractedIntelligence"];
        let upi_ids = strings(&intel["upiIds"]);
        assert!(upi_ids.contains(&"a@b".to_string()));
        let links = strings(&intel["phishingLinks"]);
        assert!(links.contains(&"http://scam.example".to_string()));
        let keywords = strings(&intel["suspiciousKeywords"]);
        assert!(keywords.contains(&"otp".to_string()));
        assert!(keywords.contains(&"link".to_string()));

        // Further messages never re-report.
        for _ in 0..3 {
            let reply = send(&client, &base, "int-1", "visit http://again.example").await;
            assert_eq!(reply["status"], "success");
        }
        assert_no_report(&mut reports).await;
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn two_sessions_report_independently() {
    timeout(TEST_TIMEOUT, async {
        let (callback, mut reports) = start_callback(StatusCode::OK).await;
        let base = start_honeypot(&callback).await;
        let client = reqwest::Client::new();

        for session in ["left", "right"] {
            for text in SCENARIO {
                send(&client, &base, session, text).await;
            }
        }

        let mut seen = Vec::new();
        for _ in 0..2 {
            let report = next_report(&mut reports).await;
            assert_eq!(report["totalMessagesExchanged"], 4);
            seen.push(report["sessionId"].as_str().unwrap().to_string());
        }
        seen.sort();
        assert_eq!(seen, vec!["left".to_string(), "right".to_string()]);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn failing_callback_does_not_affect_reply() {
    timeout(TEST_TIMEOUT, async {
        let (callback, mut reports) = start_callback(StatusCode::INTERNAL_SERVER_ERROR).await;
        let base = start_honeypot(&callback).await;
        let client = reqwest::Client::new();

        let mut last = Value::Null;
        for text in SCENARIO {
            last = send(&client, &base, "flaky", text).await;
        }
        assert_eq!(last["reply"], CLOSING_REPLY);

        // Attempted once, never retried.
        next_report(&mut reports).await;
        send(&client, &base, "flaky", "http://x.example").await;
        assert_no_report(&mut reports).await;
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unreachable_callback_does_not_affect_reply() {
    timeout(TEST_TIMEOUT, async {
        let base = start_honeypot("http://127.0.0.1:9/report").await;
        let client = reqwest::Client::new();

        let mut last = Value::Null;
        for text in SCENARIO {
            last = send(&client, &base, "offline", text).await;
        }
        assert_eq!(last["status"], "success");
        assert_eq!(last["reply"], CLOSING_REPLY);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn invalid_key_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let (callback, _reports) = start_callback(StatusCode::OK).await;
        let base = start_honeypot(&callback).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/honeypot"))
            .header("x-api-key", "wrong")
            .json(&json!({"sessionId": "s", "message": {"text": "hi"}}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["detail"], "Invalid API key");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn health_counts_sessions() {
    timeout(TEST_TIMEOUT, async {
        let (callback, _reports) = start_callback(StatusCode::OK).await;
        let base = start_honeypot(&callback).await;
        let client = reqwest::Client::new();

        send(&client, &base, "a", "hello").await;
        send(&client, &base, "b", "hello").await;

        let health: Value = client
            .get(format!("{base}/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["sessions"], 2);
    })
    .await
    .expect("test timed out");
}
