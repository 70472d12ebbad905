use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use runtrack_core::codec::decode_route;
use runtrack_core::{
    ActivityKind, LocationFix, Session, SessionTracker, SnapshotObserver, TrackerConfig,
    TrackingMode,
};

const DEG_PER_10M: f64 = 10.0 / 111_195.0;

/// Observatør som skyver hvert snapshot over på en testkanal.
struct ChannelObserver {
    tx: Mutex<Sender<Session>>,
}

impl SnapshotObserver for ChannelObserver {
    fn on_update(&self, snapshot: &Session) {
        if let Ok(tx) = self.tx.lock() {
            let _ = tx.send(snapshot.clone());
        }
    }
}

fn fix(lat: f64, ts_ms: i64) -> LocationFix {
    LocationFix {
        lat,
        lon: 10.75,
        speed_ms: None,
        altitude_m: None,
        accuracy_m: 5.0,
        timestamp_ms: ts_ms,
    }
}

#[test]
fn gps_session_accumulates_distance_and_route() {
    let mut tracker = SessionTracker::new(TrackerConfig::default());
    let ingest = tracker
        .start(TrackingMode::Gps, ActivityKind::Running, true)
        .expect("start feilet");
    assert!(ingest.is_none(), "GPS-modus skal ikke gi noe sensorinntak");
    assert!(tracker.is_tracking());

    let t0 = Utc::now().timestamp_millis();
    for i in 0..3 {
        tracker.on_location(&fix(59.9 + i as f64 * DEG_PER_10M, t0 + i * 1000));
    }

    let snap = tracker.snapshot().expect("mangler snapshot");
    assert!((snap.distance_m - 20.0).abs() < 0.5);
    assert_eq!(snap.route.len(), 3);
    assert_eq!(snap.activity, ActivityKind::Running);

    let record = tracker.stop().expect("stop skal levere en post");
    assert!(!tracker.is_tracking());
    assert!((record.distance_m - 20.0).abs() < 0.5);

    // Ruta overleveres binært og skal dekodes tilbake til samme punkter
    let bytes = record.route_bytes.expect("sporet økt skal ha rute-payload");
    let route = decode_route(&bytes).expect("kunne ikke dekode ruta");
    assert_eq!(route, snap.route);
}

#[test]
fn second_start_is_a_noop_and_keeps_accumulators() {
    let mut tracker = SessionTracker::new(TrackerConfig::default());
    tracker
        .start(TrackingMode::Gps, ActivityKind::Walking, true)
        .expect("start feilet");

    let t0 = Utc::now().timestamp_millis();
    tracker.on_location(&fix(59.9, t0));
    tracker.on_location(&fix(59.9 + DEG_PER_10M, t0 + 1000));
    let distance_before = tracker.snapshot().unwrap().distance_m;
    assert!(distance_before > 0.0);

    // Ny start uten stop: ingen nullstilling
    let second = tracker
        .start(TrackingMode::Automatic, ActivityKind::Running, true)
        .expect("no-op start skal ikke feile");
    assert!(second.is_none());

    let snap = tracker.snapshot().unwrap();
    assert_eq!(snap.mode, TrackingMode::Gps);
    assert_eq!(snap.distance_m, distance_before);
    assert_eq!(snap.route.len(), 2);
}

#[test]
fn stop_when_idle_is_a_noop() {
    let mut tracker = SessionTracker::new(TrackerConfig::default());
    assert!(tracker.stop().is_none());

    tracker
        .start(TrackingMode::Gps, ActivityKind::Walking, true)
        .expect("start feilet");
    assert!(tracker.stop().is_some());
    // Andre stop: allerede Idle
    assert!(tracker.stop().is_none());
}

#[test]
fn manual_session_has_no_route_payload() {
    let mut tracker = SessionTracker::new(TrackerConfig::default());
    tracker
        .start(TrackingMode::Manual, ActivityKind::Walking, true)
        .expect("start feilet");

    // Manuelle økter konsumerer ingen posisjonsstrøm
    tracker.on_location(&fix(59.9, Utc::now().timestamp_millis()));
    assert_eq!(tracker.snapshot().unwrap().route.len(), 0);

    let record = tracker.stop().expect("stop skal levere en post");
    // "aldri sporet" = fravær av payload, ikke en tom payload
    assert!(record.route_bytes.is_none());
}

#[test]
fn gps_session_with_no_accepted_fixes_yields_empty_payload() {
    let mut tracker = SessionTracker::new(TrackerConfig::default());
    tracker
        .start(TrackingMode::Gps, ActivityKind::Walking, true)
        .expect("start feilet");

    let record = tracker.stop().expect("stop skal levere en post");
    let bytes = record.route_bytes.expect("sporet økt skal ha payload");
    assert_eq!(decode_route(&bytes).expect("dekodefeil").len(), 0);
}

#[test]
fn automatic_session_runs_classification_worker() {
    let (tx, rx) = channel();
    let observer = Arc::new(ChannelObserver { tx: Mutex::new(tx) });

    let mut tracker = SessionTracker::new(TrackerConfig::default());
    tracker.set_observer(observer);

    let mut ingest = tracker
        .start(TrackingMode::Automatic, ActivityKind::Walking, true)
        .expect("start feilet")
        .expect("automatisk modus skal gi sensorinntak");

    // To hele blokker med ro (alt under støygulvet klippes til 0)
    for _ in 0..128 {
        ingest.on_raw_reading(0.01, 0.01, 0.01);
    }

    // Arbeidstråden skal publisere minst ett snapshot fra klassifiseringen
    let snap = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("fikk aldri noe snapshot fra arbeidstråden");
    assert_eq!(snap.activity, ActivityKind::Standing);

    let record = tracker.stop().expect("stop skal levere en post");
    // Varighetsdominant aktivitet for en rolig økt er Standing
    assert_eq!(record.activity, ActivityKind::Standing);
    assert!(record.route_bytes.is_some());
}

#[test]
fn derived_fields_are_guarded_against_zero_distance() {
    let mut tracker = SessionTracker::new(TrackerConfig::default());
    tracker
        .start(TrackingMode::Gps, ActivityKind::Running, true)
        .expect("start feilet");

    let record = tracker.stop().expect("stop skal levere en post");
    assert_eq!(record.distance_m, 0.0);
    assert_eq!(record.avg_pace_s_per_m, 0.0);
    assert_eq!(record.calories_kcal, 0.0);
}
