//! Gateway tests against an in-process CoT endpoint.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use chrono::{TimeZone, Utc};
use overwatch_cot::{encode_detection, from_xml};
use overwatch_dispatch::{CotGateway, DispatchError, GatewayConfig};
use overwatch_types::{Position, RfDetection, SensorId};
use tokio::net::TcpListener;

/// Bodies and content types the endpoint has seen.
type Received = Arc<Mutex<Vec<(String, String)>>>;

async fn accept_cot(
    State(received): State<Received>,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let rejected = body.contains("JAMMER");
    received.lock().unwrap().push((content_type, body));
    if rejected {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    }
}

async fn spawn_endpoint() -> (String, Received) {
    let received = Received::default();
    let app = Router::new()
        .route("/Marti/api/cot", post(accept_cot))
        .with_state(Arc::clone(&received));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/Marti/api/cot"), received)
}

fn detection(classification: &str, frequency_hz: f64) -> RfDetection {
    RfDetection {
        sensor_id: SensorId::from("sensor-a"),
        sensor_name: "North Ridge".to_owned(),
        timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        frequency_hz,
        power_dbm: -70.0,
        bandwidth_hz: 12_500.0,
        signal_type: "Radio".to_owned(),
        classification: classification.to_owned(),
        confidence: 0.8,
        location: Position::new(38.9, -77.0),
        bearing: None,
        metadata: None,
    }
}

#[tokio::test]
async fn send_posts_xml_once() {
    let (url, received) = spawn_endpoint().await;
    let gateway = CotGateway::new(&GatewayConfig::new(url)).unwrap();
    let event = encode_detection(&detection("Handheld", 146_520_000.0));

    assert!(gateway.send(&event).await);

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    let (content_type, body) = received.first().unwrap();
    assert_eq!(content_type, "application/xml");
    assert_eq!(from_xml(body).unwrap(), event);
}

#[tokio::test]
async fn rejection_is_reported_without_retry() {
    let (url, received) = spawn_endpoint().await;
    let gateway = CotGateway::new(&GatewayConfig::new(url)).unwrap();
    let event = encode_detection(&detection("JAMMER", 1_575_420_000.0));

    let result = gateway.try_send(&event).await;
    assert!(matches!(
        result,
        Err(DispatchError::Rejected(StatusCode::BAD_REQUEST))
    ));
    assert!(!gateway.send(&event).await);
    assert_eq!(received.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn batch_continues_past_failures() {
    let (url, received) = spawn_endpoint().await;
    let gateway = CotGateway::new(&GatewayConfig::new(url)).unwrap();
    let detections = [
        detection("Handheld", 146_520_000.0),
        detection("JAMMER", 1_575_420_000.0),
        detection("Repeater", 147_000_000.0),
    ];

    assert_eq!(gateway.send_detections(&detections).await, 2);
    assert_eq!(received.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn unreachable_endpoint_is_a_false_send() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = GatewayConfig {
        endpoint: format!("http://{addr}/Marti/api/cot"),
        timeout: Duration::from_secs(2),
    };
    let gateway = CotGateway::new(&config).unwrap();
    let event = encode_detection(&detection("Handheld", 146_520_000.0));

    assert!(matches!(
        gateway.try_send(&event).await,
        Err(DispatchError::Http(_))
    ));
    assert_eq!(gateway.send_batch(&[event]).await, 0);
}
