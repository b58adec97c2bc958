//! Reconciliation loop tests.
//!
//! Drive `run_reconciliation` with in-memory and HTTP snapshot sources and
//! check the merge order and callback traffic.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::routing::get;
use overwatch_sync::{
    EntityRegistry, HttpSnapshotSource, NoOpCallback, PictureCallback, PictureChange,
    SnapshotPhase, SnapshotSource, Synchronizer, export_map_state, run_reconciliation,
};
use overwatch_types::{
    EntityUid, EudPayload, LiveEvent, MapStateSnapshot, MarkerPayload, PointPayload,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Collects every batch of changes handed to the callback.
#[derive(Default)]
struct Recorder {
    batches: Vec<Vec<PictureChange>>,
    last_len: usize,
}

impl PictureCallback for Recorder {
    fn on_changes(&mut self, changes: &[PictureChange], registry: &EntityRegistry) {
        self.batches.push(changes.to_vec());
        self.last_len = registry.len();
    }
}

fn point(uid: &str, lat: f64, lon: f64) -> PointPayload {
    PointPayload {
        uid: Some(uid.to_owned()),
        latitude: Some(lat),
        longitude: Some(lon),
        ..PointPayload::default()
    }
}

fn eud(uid: &str, callsign: &str) -> EudPayload {
    EudPayload {
        uid: Some(uid.to_owned()),
        callsign: Some(callsign.to_owned()),
        last_status: Some("Connected".to_owned()),
        last_point: Some(point(uid, 38.9, -77.0)),
        ..EudPayload::default()
    }
}

fn snapshot() -> MapStateSnapshot {
    MapStateSnapshot {
        euds: vec![eud("u1", "snap-u1"), eud("u2", "snap-u2")],
        markers: vec![MarkerPayload {
            uid: Some("m1".to_owned()),
            point: Some(point("m1", 1.0, 1.0)),
            ..MarkerPayload::default()
        }],
        ..MapStateSnapshot::default()
    }
}

fn callsign(sync: &Synchronizer, uid: &str) -> Option<String> {
    sync.registry()
        .get(&EntityUid::from(uid))
        .map(|e| e.callsign.clone())
}

/// Serve `snapshot` after `delay` on an ephemeral port.
async fn serve_snapshot(snapshot: MapStateSnapshot, delay: Duration) -> String {
    let app = Router::new().route(
        "/api/map_state",
        get(move || {
            let snapshot = snapshot.clone();
            async move {
                tokio::time::sleep(delay).await;
                Json(snapshot)
            }
        }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/map_state")
}

#[tokio::test]
async fn static_snapshot_then_live_events() {
    let mut sync = Synchronizer::default();
    let source = SnapshotSource::Static(snapshot());
    let (tx, rx) = mpsc::channel(16);
    let mut recorder = Recorder::default();

    // Queue a live update for a snapshot entity, then close the channel.
    let mut moved = point("u1", 39.5, -76.5);
    moved.azimuth = Some(90.0);
    tx.send(LiveEvent::Point(moved)).await.unwrap();
    drop(tx);

    let report = run_reconciliation(&mut sync, &source, rx, &mut recorder).await;

    assert_eq!(report.snapshot_phase, SnapshotPhase::Applied);
    assert_eq!(report.events_received, 1);
    assert_eq!(report.events_applied, 1);
    assert_eq!(sync.registry().len(), 3);
    assert_eq!(recorder.last_len, 3);

    // Biased select merges the ready snapshot before the queued point.
    assert!(matches!(
        recorder.batches.first().and_then(|b| b.last()),
        Some(PictureChange::SnapshotApplied {
            applied: 3,
            skipped: 0
        })
    ));
    let position = sync
        .registry()
        .get(&EntityUid::from("u1"))
        .and_then(|e| e.position);
    assert!(position.is_some_and(|p| (p.lat - 39.5).abs() < 1e-9));
}

#[tokio::test]
async fn live_event_beats_slow_snapshot() {
    let url = serve_snapshot(snapshot(), Duration::from_millis(300)).await;
    let source =
        SnapshotSource::Http(HttpSnapshotSource::new(url, Duration::from_secs(5)).unwrap());
    let mut sync = Synchronizer::default();
    let (tx, rx) = mpsc::channel(16);

    let producer = tokio::spawn(async move {
        tx.send(LiveEvent::Eud(eud("u1", "live-u1"))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(800)).await;
        drop(tx);
    });

    let mut recorder = Recorder::default();
    let report = run_reconciliation(&mut sync, &source, rx, &mut recorder).await;
    producer.await.unwrap();

    assert_eq!(report.snapshot_phase, SnapshotPhase::Applied);
    assert_eq!(callsign(&sync, "u1").as_deref(), Some("live-u1"));
    assert_eq!(callsign(&sync, "u2").as_deref(), Some("snap-u2"));
    assert!(recorder.batches.iter().flatten().any(|c| matches!(
        c,
        PictureChange::SnapshotApplied {
            applied: 2,
            skipped: 1
        }
    )));
}

#[tokio::test]
async fn failed_snapshot_leaves_live_picture() {
    // Nothing listens on this port once the listener is dropped.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source = SnapshotSource::Http(
        HttpSnapshotSource::new(format!("http://{addr}/api/map_state"), Duration::from_secs(2))
            .unwrap(),
    );
    let mut sync = Synchronizer::default();
    let (tx, rx) = mpsc::channel(16);

    let producer = tokio::spawn(async move {
        // Let the fetch fail first.
        tokio::time::sleep(Duration::from_millis(200)).await;
        tx.send(LiveEvent::Eud(eud("u9", "live-u9"))).await.unwrap();
        drop(tx);
    });

    let report = run_reconciliation(&mut sync, &source, rx, &mut NoOpCallback).await;
    producer.await.unwrap();

    assert_eq!(report.snapshot_phase, SnapshotPhase::Failed);
    assert_eq!(report.events_applied, 1);
    assert_eq!(sync.registry().len(), 1);
}

#[tokio::test]
async fn malformed_events_are_counted_not_fatal() {
    let mut sync = Synchronizer::default();
    let source = SnapshotSource::Static(MapStateSnapshot::default());
    let (tx, rx) = mpsc::channel(16);

    tx.send(LiveEvent::Eud(EudPayload::default())).await.unwrap();
    tx.send(LiveEvent::Eud(eud("u1", "ok"))).await.unwrap();
    tx.send(LiveEvent::Point(point("u1", 0.0, 999_999.0)))
        .await
        .unwrap();
    drop(tx);

    let report = run_reconciliation(&mut sync, &source, rx, &mut NoOpCallback).await;

    assert_eq!(report.events_received, 3);
    assert_eq!(report.events_applied, 1);
    assert_eq!(report.events_dropped, 2);
    assert!(sync.registry().contains(&EntityUid::from("u1")));
}

#[tokio::test]
async fn exported_state_rebuilds_the_picture() {
    let mut sync = Synchronizer::default();
    let source = SnapshotSource::Static(snapshot());
    let (tx, rx) = mpsc::channel(1);
    drop(tx);
    run_reconciliation(&mut sync, &source, rx, &mut NoOpCallback).await;

    let exported = export_map_state(sync.registry());
    assert_eq!(exported.len(), 3);

    let mut rebuilt = Synchronizer::default();
    rebuilt.apply_snapshot(&exported).unwrap();
    let uids = |s: &Synchronizer| {
        s.registry()
            .entities()
            .map(|e| (e.uid.clone(), e.kind, e.callsign.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(uids(&rebuilt), uids(&sync));
}
