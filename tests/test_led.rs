// LED client and worker against a local stand-in for the display API.
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use led_invaders::entities::Rgb;
use led_invaders::led::{self, LedClient, LedCommand, LedError, LedPublisher, TEXT_SPEED};

type Seen = Arc<Mutex<Vec<(String, Value)>>>;

const TIMEOUT: Duration = Duration::from_millis(1500);

async fn record(
    State((seen, status)): State<(Seen, StatusCode)>,
    Path(endpoint): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    seen.lock().unwrap().push((endpoint, body));
    status
}

/// Serve the display API on an ephemeral port; returns its base URL.
async fn spawn_device(status: StatusCode) -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/light/{endpoint}", post(record))
        .with_state((Arc::clone(&seen), status));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server failed");
    });
    (format!("http://{addr}/light"), seen)
}

fn endpoints(seen: &Seen) -> Vec<String> {
    seen.lock().unwrap().iter().map(|(e, _)| e.clone()).collect()
}

// ── Client ────────────────────────────────────────────────────────────────────

#[test]
fn trailing_slash_is_trimmed() {
    let client = LedClient::new("http://127.0.0.1:8000/light/", TIMEOUT).unwrap();
    assert_eq!(client.base_url(), "http://127.0.0.1:8000/light");
}

#[tokio::test]
async fn fill_posts_the_color() {
    let (url, seen) = spawn_device(StatusCode::OK).await;
    let client = LedClient::new(url, TIMEOUT).unwrap();

    client.fill(Rgb::RED).await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "fill");
    assert_eq!(seen[0].1, json!({ "color": { "r": 255, "g": 0, "b": 0 } }));
}

#[tokio::test]
async fn scroll_text_posts_text_speed_and_color() {
    let (url, seen) = spawn_device(StatusCode::OK).await;
    let client = LedClient::new(url, TIMEOUT).unwrap();

    client
        .send(&LedCommand::scroll("GAME START", Rgb::GREEN))
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    let (endpoint, body) = &seen[0];
    assert_eq!(endpoint, "scrolling-text");
    assert_eq!(body["text"], "GAME START");
    assert_eq!(body["color"], json!({ "r": 0, "g": 255, "b": 0 }));
    let speed = body["text_speed"].as_f64().unwrap();
    assert!((speed - TEXT_SPEED as f64).abs() < 1e-6);
}

#[tokio::test]
async fn error_status_is_reported() {
    let (url, _seen) = spawn_device(StatusCode::INTERNAL_SERVER_ERROR).await;
    let client = LedClient::new(url, TIMEOUT).unwrap();

    match client.fill(Rgb::BLACK).await {
        Err(LedError::Status(500)) => {}
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_device_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = LedClient::new(format!("http://{addr}/light"), TIMEOUT).unwrap();
    let err = client.fill(Rgb::BLACK).await.unwrap_err();
    assert!(matches!(err, LedError::Transport(_)));
    assert!(err.to_string().starts_with("led request failed"));
}

// ── Commands ──────────────────────────────────────────────────────────────────

#[test]
fn after_keeps_the_payload() {
    let cmd = LedCommand::scroll("YOU WIN", Rgb::GREEN).after(Duration::from_millis(250));
    assert_eq!(cmd.delay(), Duration::from_millis(250));
    match cmd {
        LedCommand::ScrollText { text, speed, color, .. } => {
            assert_eq!(text, "YOU WIN");
            assert_eq!(speed, TEXT_SPEED);
            assert_eq!(color, Rgb::GREEN);
        }
        other => panic!("unexpected command {other:?}"),
    }
    assert_eq!(LedCommand::fill(Rgb::RED).delay(), Duration::ZERO);
}

// ── Worker ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn drain_does_not_hold_later_commands_behind_a_delay() {
    let (url, seen) = spawn_device(StatusCode::OK).await;
    let client = Arc::new(LedClient::new(url, TIMEOUT).unwrap());
    let (tx, rx) = mpsc::channel(8);
    let worker = tokio::spawn(led::drain(rx, client));

    tx.send(LedCommand::fill(Rgb::BLACK).after(Duration::from_millis(300)))
        .await
        .unwrap();
    tx.send(LedCommand::scroll("GAME OVER", Rgb::RED))
        .await
        .unwrap();
    drop(tx);

    // Drain only returns once the delayed command has gone out too.
    worker.await.unwrap();
    assert_eq!(endpoints(&seen), vec!["scrolling-text", "fill"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn worker_thread_sends_published_commands() {
    let (url, seen) = spawn_device(StatusCode::OK).await;
    let client = LedClient::new(url, TIMEOUT).unwrap();
    let (publisher, handle) = led::spawn_worker(client, 8).unwrap();

    publisher.publish(LedCommand::fill(Rgb::RED));
    publisher.publish(LedCommand::fill(Rgb::BLACK).after(Duration::from_millis(100)));
    drop(publisher);

    tokio::task::spawn_blocking(move || handle.join())
        .await
        .unwrap()
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].1["color"]["r"], 255);
    assert_eq!(seen[1].1["color"]["r"], 0);
}

#[tokio::test]
async fn failing_device_does_not_stop_the_worker() {
    let (url, seen) = spawn_device(StatusCode::SERVICE_UNAVAILABLE).await;
    let client = Arc::new(LedClient::new(url, TIMEOUT).unwrap());
    let (tx, rx) = mpsc::channel(8);
    let worker = tokio::spawn(led::drain(rx, client));

    for _ in 0..3 {
        tx.send(LedCommand::fill(Rgb::WHITE)).await.unwrap();
    }
    drop(tx);
    worker.await.unwrap();
    assert_eq!(seen.lock().unwrap().len(), 3);
}

// ── Publisher ─────────────────────────────────────────────────────────────────

#[test]
fn full_queue_drops_the_command() {
    let (tx, mut rx) = mpsc::channel(1);
    let publisher = LedPublisher::new(tx);

    publisher.publish(LedCommand::fill(Rgb::RED));
    publisher.publish(LedCommand::fill(Rgb::BLACK));

    assert_eq!(rx.try_recv().unwrap(), LedCommand::fill(Rgb::RED));
    assert!(rx.try_recv().is_err());
}

#[test]
fn closed_queue_is_ignored() {
    let (tx, rx) = mpsc::channel(4);
    drop(rx);
    LedPublisher::new(tx).publish(LedCommand::fill(Rgb::RED));
}

#[test]
fn disabled_publisher_discards_everything() {
    let publisher = LedPublisher::disabled();
    for _ in 0..100 {
        publisher.publish(LedCommand::scroll("GAME START", Rgb::GREEN));
    }
}
