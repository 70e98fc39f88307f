//! Timer-driven session loop.

use std::sync::Arc;

use tokio::sync::mpsc::error::SendTimeoutError;
use tokio::sync::{mpsc, watch};
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{AttentionSession, SessionConfig, SessionOutcome};
use crate::domain::{LandmarkFrame, Signal};
use crate::ports::{CaptureGuard, SessionEvent, SessionObserver, ThresholdStore};

type FrameRead = (CaptureGuard, anyhow::Result<Option<LandmarkFrame>>);

/// Drives one session until stopped, the capture ends, or the channel
/// closes.
///
/// Frames are read on the blocking pool, one read per tick, so a stalled
/// device never holds up a runtime worker. The stop flag is observed
/// between ticks and while a read is in flight. The capture is released
/// before the `Stopped` event is published, except when a stop arrives
/// mid-read: the loop then exits at once and the device closes as soon
/// as that read returns.
pub async fn run_session(
    capture: CaptureGuard,
    store: Arc<dyn ThresholdStore>,
    signals: mpsc::Sender<Signal>,
    observer: Arc<dyn SessionObserver>,
    config: SessionConfig,
    mut stop: watch::Receiver<bool>,
) -> SessionOutcome {
    let mut capture = Some(capture);
    let mut session = AttentionSession::new(&config);
    let period = config.tick_interval.max(Duration::from_millis(1));
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Session started, ticking every {period:?}");
    observer.on_event(SessionEvent::Started {
        tick_interval_ms: u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
    });

    let mut ticks: u64 = 0;
    let outcome = loop {
        tokio::select! {
            biased;
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    break SessionOutcome::Stopped;
                }
                continue;
            }
            _ = interval.tick() => {}
        }
        if *stop.borrow() {
            break SessionOutcome::Stopped;
        }
        let Some(guard) = capture.take() else {
            break SessionOutcome::CaptureFailed("capture already released".to_string());
        };
        ticks += 1;

        let mut read = read_frame(guard);
        let (guard, frame) = tokio::select! {
            biased;
            () = stop_requested(&mut stop) => {
                info!("Stop requested during a capture read; the device closes once it returns");
                break SessionOutcome::Stopped;
            }
            joined = &mut read => match joined {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("Capture read task failed: {e}");
                    break SessionOutcome::CaptureFailed(format!("capture read task failed: {e}"));
                }
            },
        };
        capture = Some(guard);

        let frame = match frame {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                info!("Landmark stream exhausted after {ticks} ticks");
                break SessionOutcome::CaptureEnded;
            }
            Err(e) => {
                warn!("Capture failed: {e:#}");
                break SessionOutcome::CaptureFailed(format!("{e:#}"));
            }
        };

        let report = session.tick(&frame, store.as_ref());
        match report.face_changed {
            Some(true) => observer.on_event(SessionEvent::FaceFound { tick: ticks }),
            Some(false) => observer.on_event(SessionEvent::FaceLost { tick: ticks }),
            None => {}
        }

        let Some(signal) = report.signal else {
            continue;
        };
        info!("Attention changed, emitting {signal}");
        observer.on_event(SessionEvent::Signal {
            signal,
            tick: ticks,
        });

        // Let the dispatcher run before queueing the next message.
        task::yield_now().await;
        match signals.send_timeout(signal, config.send_timeout).await {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => {
                warn!(
                    "Dropped {signal}: channel did not accept it within {:?}",
                    config.send_timeout
                );
            }
            Err(SendTimeoutError::Closed(_)) => {
                debug!("Signal channel closed");
                break SessionOutcome::ChannelClosed;
            }
        }
    };

    drop(capture);
    info!("Session ended ({outcome}) after {ticks} ticks");
    observer.on_event(SessionEvent::Stopped {
        outcome: outcome.clone(),
        ticks,
    });
    outcome
}

/// Pulls one frame on the blocking pool and hands the guard back.
///
/// Dropping the handle detaches the read; the guard is then dropped, and
/// the device closed, when the read completes.
fn read_frame(mut capture: CaptureGuard) -> JoinHandle<FrameRead> {
    task::spawn_blocking(move || {
        let frame = capture.next_frame();
        (capture, frame)
    })
}

/// Resolves once the stop flag is raised or its sender is gone.
async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    while !*stop.borrow_and_update() {
        if stop.changed().await.is_err() {
            return;
        }
    }
}
