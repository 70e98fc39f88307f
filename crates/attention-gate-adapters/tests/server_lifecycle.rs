//! Integration tests for the server lifecycle.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use attention_gate_adapters::{AttentionServer, ServerConfig};
use attention_gate_core::lifecycle::LifecycleConfig;
use attention_gate_core::session::{SessionConfig, SessionOutcome};
use attention_gate_core::{AttentionError, LifecycleState, SessionEvent, SessionObserver};
use attention_gate_test_support::{
    calibration_frames, standard_thresholds, FaceBuilder, ManualClock, MemoryThresholdStore,
    RecordingObserver, ScriptedCapture, ScriptedPrompt,
};
use tokio::time;

struct Fixture {
    server: AttentionServer,
    capture: Arc<ScriptedCapture>,
    store: Arc<MemoryThresholdStore>,
    observer: Arc<RecordingObserver>,
}

fn config(port: u16) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port,
        session: SessionConfig {
            tick_interval: Duration::from_millis(10),
            ..SessionConfig::default()
        },
        ..ServerConfig::default()
    }
}

fn fixture(config: ServerConfig, capture: ScriptedCapture, store: MemoryThresholdStore) -> Fixture {
    let capture = Arc::new(capture);
    let store = Arc::new(store);
    let observer = Arc::new(RecordingObserver::new());
    let server = AttentionServer::new(
        config,
        capture.clone(),
        store.clone(),
        observer.clone(),
    );
    Fixture {
        server,
        capture,
        store,
        observer,
    }
}

fn calibrated() -> MemoryThresholdStore {
    MemoryThresholdStore::with(standard_thresholds())
}

fn attention_error(err: &anyhow::Error) -> &AttentionError {
    err.downcast_ref::<AttentionError>()
        .expect("attention error")
}

#[tokio::test]
async fn test_start_without_calibration_is_config_missing() {
    let f = fixture(
        config(0),
        ScriptedCapture::repeating(FaceBuilder::attentive()),
        MemoryThresholdStore::new(),
    );

    let err = f.server.start().await.unwrap_err();
    assert!(matches!(
        attention_error(&err),
        AttentionError::ConfigMissing { .. }
    ));
    assert_eq!(f.server.status().state, LifecycleState::Idle);
    assert_eq!(f.capture.open_count(), 0);
}

#[tokio::test]
async fn test_port_in_use_is_rejected_without_state_change() {
    let blocker = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = blocker.local_addr().unwrap().port();
    let f = fixture(
        config(port),
        ScriptedCapture::repeating(FaceBuilder::attentive()),
        calibrated(),
    );

    let err = f.server.start().await.unwrap_err();
    assert!(matches!(
        attention_error(&err),
        AttentionError::PortUnavailable { .. }
    ));
    assert_eq!(f.server.status().state, LifecycleState::Idle);
    assert_eq!(f.capture.open_count(), 0);
}

#[tokio::test]
async fn test_unavailable_capture_is_rejected_without_state_change() {
    let f = fixture(config(0), ScriptedCapture::unavailable(), calibrated());

    let err = f.server.start().await.unwrap_err();
    assert!(matches!(
        attention_error(&err),
        AttentionError::CaptureFailure(_)
    ));
    assert_eq!(f.server.status().state, LifecycleState::Idle);
    assert_eq!(f.server.status().addr, None);
}

#[tokio::test(start_paused = true)]
async fn test_start_stop_and_cooldown() {
    let f = fixture(
        config(0),
        ScriptedCapture::repeating(FaceBuilder::attentive()),
        calibrated(),
    );

    let addr = f.server.start().await.unwrap();
    let status = f.server.status();
    assert_eq!(status.state, LifecycleState::Running);
    assert_eq!(status.addr, Some(addr));

    let err = f.server.start().await.unwrap_err();
    assert!(matches!(
        attention_error(&err),
        AttentionError::SessionActive {
            state: LifecycleState::Running
        }
    ));
    assert_eq!(f.capture.open_count(), 1);

    time::sleep(Duration::from_millis(100)).await;
    let report = f.server.stop().await.unwrap();
    assert_eq!(report.outcome, SessionOutcome::Stopped);
    assert!(!report.forced);
    assert_eq!(f.capture.close_count(), 1);

    let status = f.server.status();
    assert_eq!(status.state, LifecycleState::Stopped);
    assert_eq!(status.addr, None);
    assert!(status.cooldown_remaining.is_some());

    let err = f.server.start().await.unwrap_err();
    assert!(matches!(
        attention_error(&err),
        AttentionError::Cooldown { remaining } if *remaining <= Duration::from_secs(30)
    ));

    time::advance(Duration::from_secs(31)).await;
    f.server.start().await.unwrap();
    assert_eq!(f.capture.open_count(), 2);
    f.server.stop().await.unwrap();
}

#[tokio::test]
async fn test_stop_when_idle_is_not_running() {
    let f = fixture(
        config(0),
        ScriptedCapture::repeating(FaceBuilder::attentive()),
        calibrated(),
    );
    let err = f.server.stop().await.unwrap_err();
    assert!(matches!(attention_error(&err), AttentionError::NotRunning));
}

#[tokio::test(start_paused = true)]
async fn test_capture_end_tears_session_down() {
    let f = fixture(
        config(0),
        ScriptedCapture::new(vec![FaceBuilder::attentive(); 8]),
        calibrated(),
    );

    f.server.start().await.unwrap();
    time::timeout(Duration::from_secs(5), f.server.wait_until_stopped())
        .await
        .expect("session should end with the recording");

    assert_eq!(f.server.status().state, LifecycleState::Stopped);
    assert_eq!(f.capture.close_count(), 1);
    assert!(f.observer.events().contains(&SessionEvent::Stopped {
        outcome: SessionOutcome::CaptureEnded,
        ticks: 9,
    }));
    assert!(matches!(
        f.server.stop().await.unwrap_err().downcast_ref::<AttentionError>(),
        Some(AttentionError::NotRunning)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_does_not_wait_for_blocked_read() {
    let f = fixture(
        config(0),
        ScriptedCapture::repeating(FaceBuilder::attentive()).with_delay(Duration::from_millis(1500)),
        calibrated(),
    );

    f.server.start().await.unwrap();
    time::sleep(Duration::from_millis(50)).await;

    let started = time::Instant::now();
    let report = f.server.stop().await.unwrap();
    assert!(started.elapsed() < Duration::from_millis(1000));
    assert!(!report.forced);
    assert_eq!(report.outcome, SessionOutcome::Stopped);
    assert_eq!(f.server.status().state, LifecycleState::Stopped);

    // The pending read still holds the device and releases it on return.
    let deadline = time::Instant::now() + Duration::from_secs(5);
    while f.capture.close_count() == 0 && time::Instant::now() < deadline {
        time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(f.capture.close_count(), 1);
}

/// Blocks the session task for a while on every signal.
struct SlowObserver(Duration);

impl SessionObserver for SlowObserver {
    fn on_event(&self, event: SessionEvent) {
        if matches!(event, SessionEvent::Signal { .. }) {
            std::thread::sleep(self.0);
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stuck_loop_is_torn_down_forcibly() {
    let capture = Arc::new(ScriptedCapture::repeating(FaceBuilder::attentive()));
    let server = AttentionServer::new(
        ServerConfig {
            lifecycle: LifecycleConfig {
                shutdown_timeout: Duration::from_millis(100),
                ..LifecycleConfig::default()
            },
            ..config(0)
        },
        capture.clone(),
        Arc::new(calibrated()),
        Arc::new(SlowObserver(Duration::from_millis(600))),
    );

    server.start().await.unwrap();
    // The first attentive tick emits play and the observer stalls the loop.
    time::sleep(Duration::from_millis(200)).await;

    let report = server.stop().await.unwrap();
    assert!(report.forced);
    assert_eq!(server.status().state, LifecycleState::Stopped);

    let deadline = time::Instant::now() + Duration::from_secs(5);
    while capture.close_count() == 0 && time::Instant::now() < deadline {
        time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(capture.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_calibration_is_rejected_while_running() {
    let f = fixture(
        config(0),
        ScriptedCapture::repeating(FaceBuilder::attentive()),
        calibrated(),
    );
    f.server.start().await.unwrap();

    let clock = ManualClock::new();
    let err = f
        .server
        .calibrate(&mut ScriptedPrompt::accept_all(), &clock)
        .unwrap_err();
    assert!(matches!(
        attention_error(&err),
        AttentionError::SessionActive { .. }
    ));
    assert_eq!(f.capture.open_count(), 1);
    assert_eq!(f.store.save_count(), 0);

    f.server.stop().await.unwrap();
}

#[test]
fn test_calibration_through_server_saves_and_restores_state() {
    let f = fixture(
        ServerConfig {
            calibration: attention_gate_core::CalibrationConfig {
                samples_per_step: 3,
                ..attention_gate_core::CalibrationConfig::default()
            },
            ..config(0)
        },
        ScriptedCapture::new(calibration_frames(3)),
        MemoryThresholdStore::new(),
    );
    let mut states = f.server.subscribe();

    let clock = ManualClock::new();
    let mut prompt = ScriptedPrompt::accept_all();
    let thresholds = f.server.calibrate(&mut prompt, &clock).unwrap();

    assert!((thresholds.eye_horizontal_left - 0.2).abs() < 1e-9);
    assert!((thresholds.face_vertical_down - 0.75).abs() < 1e-9);
    assert_eq!(f.store.get(), Some(thresholds));
    assert_eq!(prompt.finished(), Some(&thresholds));
    assert_eq!(clock.sleep_count(), 24 + 8);
    assert_eq!(f.capture.close_count(), 1);
    assert_eq!(f.server.status().state, LifecycleState::Idle);
    assert!(states.has_changed().unwrap());
}

#[test]
fn test_aborted_calibration_keeps_previous_thresholds() {
    let f = fixture(
        config(0),
        ScriptedCapture::new(calibration_frames(10)),
        calibrated(),
    );

    let clock = ManualClock::new();
    let err = f
        .server
        .calibrate(&mut ScriptedPrompt::abort_at(4), &clock)
        .unwrap_err();
    assert!(matches!(
        attention_error(&err),
        AttentionError::CalibrationAborted
    ));
    assert_eq!(f.store.get(), Some(standard_thresholds()));
    assert_eq!(f.store.save_count(), 0);
    assert_eq!(f.capture.close_count(), 1);
    assert_eq!(f.server.status().state, LifecycleState::Idle);
}

