//! WebSocket server hosting one attention session at a time.
//!
//! The server owns the lifecycle: it binds the endpoint, acquires the
//! capture device, runs the session loop and forwards its signals to the
//! single connected client. Calibration goes through the same object so it
//! can never overlap a session.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::Result;
use attention_gate_core::calibration::{CalibrationConfig, Calibrator};
use attention_gate_core::lifecycle::{Lifecycle, LifecycleConfig};
use attention_gate_core::ports::Clock;
use attention_gate_core::session::{run_session, SessionConfig, SessionOutcome};
use attention_gate_core::{
    AttentionError, CalibrationPrompt, CaptureBackend, CaptureGuard, LifecycleState,
    SessionObserver, Signal, ThresholdSet, ThresholdStore,
};
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

/// Capacity of the session-to-dispatcher and dispatcher-to-client queues.
const SIGNAL_QUEUE: usize = 16;

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host name or address to bind.
    pub host: String,
    /// Port to bind; 0 picks a free port.
    pub port: u16,
    /// Session loop tunables.
    pub session: SessionConfig,
    /// Cooldown and shutdown timing.
    pub lifecycle: LifecycleConfig,
    /// Calibration timing.
    pub calibration: CalibrationConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6789,
            session: SessionConfig::default(),
            lifecycle: LifecycleConfig::default(),
            calibration: CalibrationConfig::default(),
        }
    }
}

/// Result of stopping a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopReport {
    /// Why the session loop exited.
    pub outcome: SessionOutcome,
    /// True if the loop missed the shutdown deadline and was aborted.
    pub forced: bool,
}

/// Snapshot for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerStatus {
    /// Lifecycle state.
    pub state: LifecycleState,
    /// Time left before a restart is accepted.
    pub cooldown_remaining: Option<Duration>,
    /// Bound address while a session runs.
    pub addr: Option<SocketAddr>,
    /// Whether a client currently holds the channel.
    pub client_connected: bool,
}

/// Handle to the attention server. Cheap to clone.
#[derive(Clone)]
pub struct AttentionServer {
    inner: Arc<Inner>,
}

struct Inner {
    config: ServerConfig,
    capture: Arc<dyn CaptureBackend>,
    store: Arc<dyn ThresholdStore>,
    observer: Arc<dyn SessionObserver>,
    lifecycle: Mutex<Lifecycle>,
    state_tx: watch::Sender<LifecycleState>,
    bound: Mutex<Option<SocketAddr>>,
    clients: ClientSlot,
    active: tokio::sync::Mutex<Option<ActiveSession>>,
    next_id: AtomicU64,
}

struct ActiveSession {
    id: u64,
    stop: watch::Sender<bool>,
    session: JoinHandle<SessionOutcome>,
    dispatcher: JoinHandle<()>,
    http: JoinHandle<()>,
    http_shutdown: oneshot::Sender<()>,
}

impl AttentionServer {
    /// Creates an idle server.
    #[must_use]
    pub fn new(
        config: ServerConfig,
        capture: Arc<dyn CaptureBackend>,
        store: Arc<dyn ThresholdStore>,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        let (state_tx, _) = watch::channel(LifecycleState::Idle);
        Self {
            inner: Arc::new(Inner {
                lifecycle: Mutex::new(Lifecycle::new(config.lifecycle.cooldown)),
                config,
                capture,
                store,
                observer,
                state_tx,
                bound: Mutex::new(None),
                clients: ClientSlot::default(),
                active: tokio::sync::Mutex::new(None),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Starts a session and returns the bound address.
    ///
    /// Checks run in order: lifecycle (state and cooldown), thresholds,
    /// endpoint bind, capture device. Any failure leaves the state as it
    /// was.
    ///
    /// # Errors
    ///
    /// Returns an [`AttentionError`] describing the rejection.
    pub async fn start(&self) -> Result<SocketAddr> {
        self.inner.lifecycle().check_start(now())?;

        let mut active = self.inner.active.lock().await;
        self.inner.lifecycle().check_start(now())?;
        self.inner.store.load()?;

        let requested = format!("{}:{}", self.inner.config.host, self.inner.config.port);
        let listener =
            TcpListener::bind(&requested)
                .await
                .map_err(|e| AttentionError::PortUnavailable {
                    addr: requested.clone(),
                    reason: e.to_string(),
                })?;
        let addr = listener
            .local_addr()
            .map_err(|e| AttentionError::PortUnavailable {
                addr: requested,
                reason: e.to_string(),
            })?;

        let capture = CaptureGuard::open(self.inner.capture.as_ref())
            .map_err(|e| AttentionError::CaptureFailure(format!("{e:#}")))?;

        self.inner.lifecycle().begin_session(now())?;
        self.inner.publish();
        *self
            .inner
            .bound
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(addr);

        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let (signal_tx, signal_rx) = mpsc::channel(SIGNAL_QUEUE);
        let (stop_tx, stop_rx) = watch::channel(false);
        let (done_tx, done_rx) = oneshot::channel();

        let session = tokio::spawn({
            let store = Arc::clone(&self.inner.store);
            let observer = Arc::clone(&self.inner.observer);
            let config = self.inner.config.session;
            async move {
                let outcome =
                    run_session(capture, store, signal_tx, observer, config, stop_rx).await;
                let _ = done_tx.send(());
                outcome
            }
        });

        let dispatcher = tokio::spawn(dispatch(signal_rx, self.inner.clients.clone()));

        let (http_shutdown, http_shutdown_rx) = oneshot::channel::<()>();
        let app = Router::new()
            .route("/", get(client_route))
            .with_state(self.inner.clients.clone());
        let http = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = http_shutdown_rx.await;
                })
                .await;
            if let Err(e) = served {
                warn!("WebSocket server error: {e}");
            }
        });

        let server = self.clone();
        tokio::spawn(async move {
            if done_rx.await.is_ok() {
                server.finish_ended_session(id).await;
            }
        });

        *active = Some(ActiveSession {
            id,
            stop: stop_tx,
            session,
            dispatcher,
            http,
            http_shutdown,
        });
        info!("Serving attention signals on ws://{addr}/");
        Ok(addr)
    }

    /// Stops the running session.
    ///
    /// Waits up to the configured shutdown timeout for the loop to exit,
    /// then aborts it. The endpoint, channel and capture are released on
    /// every path and the cooldown starts.
    ///
    /// # Errors
    ///
    /// Returns [`AttentionError::NotRunning`] unless a session is running.
    pub async fn stop(&self) -> Result<StopReport> {
        self.inner.lifecycle().begin_stop()?;
        self.inner.publish();

        let active = self.inner.active.lock().await.take();
        let report = match active {
            Some(active) => self.teardown(active).await,
            None => StopReport {
                outcome: SessionOutcome::Stopped,
                forced: false,
            },
        };

        self.finish_stop();
        Ok(report)
    }

    /// Runs guided calibration on the capture device.
    ///
    /// Blocks the calling thread; call it from outside the async runtime.
    ///
    /// # Errors
    ///
    /// Rejects while a session owns the device, and otherwise returns the
    /// calibration error.
    pub fn calibrate<C: Clock>(
        &self,
        prompt: &mut dyn CalibrationPrompt,
        clock: C,
    ) -> Result<ThresholdSet> {
        self.inner.lifecycle().begin_calibration()?;
        self.inner.publish();

        let result = CaptureGuard::open(self.inner.capture.as_ref())
            .map_err(|e| AttentionError::CaptureFailure(format!("{e:#}")).into())
            .and_then(|mut capture| {
                Calibrator::with_clock(self.inner.config.calibration, clock).calibrate(
                    &mut *capture,
                    self.inner.store.as_ref(),
                    prompt,
                )
            });

        self.inner.lifecycle().end_calibration();
        self.inner.publish();
        result
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> ServerStatus {
        let status = self.inner.lifecycle().status(now());
        ServerStatus {
            state: status.state,
            cooldown_remaining: status.cooldown_remaining,
            addr: *self
                .inner
                .bound
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
            client_connected: self.inner.clients.is_occupied(),
        }
    }

    /// Subscribes to lifecycle state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.inner.state_tx.subscribe()
    }

    /// Resolves once the lifecycle reaches `Stopped`.
    pub async fn wait_until_stopped(&self) {
        let mut states = self.subscribe();
        let _ = states
            .wait_for(|state| *state == LifecycleState::Stopped)
            .await;
    }

    /// Tears down a session whose loop ended on its own.
    async fn finish_ended_session(&self, id: u64) {
        let mut slot = self.inner.active.lock().await;
        if slot.as_ref().map(|active| active.id) != Some(id) {
            return;
        }
        if self.inner.lifecycle().begin_stop().is_err() {
            return;
        }
        self.inner.publish();
        let Some(active) = slot.take() else {
            return;
        };
        drop(slot);

        let report = self.teardown(active).await;
        info!("Session ended on its own: {}", report.outcome);
        self.finish_stop();
    }

    async fn teardown(&self, mut active: ActiveSession) -> StopReport {
        let _ = active.stop.send(true);
        let waited = self.inner.config.lifecycle.shutdown_timeout;

        let (outcome, forced) = match time::timeout(waited, &mut active.session).await {
            Ok(Ok(outcome)) => (outcome, false),
            Ok(Err(e)) => {
                warn!("Session task failed: {e}");
                (SessionOutcome::CaptureFailed(e.to_string()), false)
            }
            Err(_) => {
                warn!("{}; forcing teardown", AttentionError::ShutdownTimeout { waited });
                active.session.abort();
                (SessionOutcome::Stopped, true)
            }
        };

        self.inner.clients.close();
        let _ = active.http_shutdown.send(());
        if time::timeout(waited, &mut active.http).await.is_err() {
            warn!("WebSocket server did not shut down within {waited:?}, aborting");
            active.http.abort();
        }
        active.dispatcher.abort();

        StopReport { outcome, forced }
    }

    fn finish_stop(&self) {
        *self
            .inner
            .bound
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.inner.lifecycle().finish_stop(now());
        self.inner.publish();
    }
}

impl Inner {
    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self) {
        let state = self.lifecycle().state();
        self.state_tx.send_replace(state);
    }
}

/// Lifecycle clock; follows tokio time so paused-clock tests see cooldowns.
fn now() -> std::time::Instant {
    time::Instant::now().into_std()
}

/// The one client allowed to receive signals, plus the latest signal of
/// the running session so a client that connects late starts in sync.
#[derive(Clone, Default)]
struct ClientSlot(Arc<Mutex<Slot>>);

#[derive(Default)]
struct Slot {
    client: Option<mpsc::Sender<Signal>>,
    last: Option<Signal>,
}

impl Slot {
    fn live(&self) -> Option<&mpsc::Sender<Signal>> {
        self.client.as_ref().filter(|tx| !tx.is_closed())
    }
}

impl ClientSlot {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the slot, or returns `None` if a live client holds it.
    ///
    /// The new client's queue starts with the session's latest signal.
    fn attach(&self) -> Option<mpsc::Receiver<Signal>> {
        let mut slot = self.lock();
        if slot.live().is_some() {
            return None;
        }
        let (tx, rx) = mpsc::channel(SIGNAL_QUEUE);
        if let Some(last) = slot.last {
            debug!("Replaying {last} to the new client");
            let _ = tx.try_send(last);
        }
        slot.client = Some(tx);
        Some(rx)
    }

    /// Records `signal` as the latest and queues it for the client.
    ///
    /// Returns the client's sender when its queue is full, so the caller
    /// can wait for room outside the lock.
    fn deliver(&self, signal: Signal) -> Option<mpsc::Sender<Signal>> {
        let mut slot = self.lock();
        slot.last = Some(signal);
        let Some(client) = slot.live() else {
            debug!("No client connected, kept {signal} for the next one");
            return None;
        };
        match client.try_send(signal) {
            Ok(()) => None,
            Err(mpsc::error::TrySendError::Full(_)) => Some(client.clone()),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Client went away, kept {signal} for the next one");
                None
            }
        }
    }

    fn is_occupied(&self) -> bool {
        self.lock().live().is_some()
    }

    /// Drops the client's sender, which ends its connection, and forgets
    /// the session's signal state.
    fn close(&self) {
        let mut slot = self.lock();
        slot.client = None;
        slot.last = None;
    }
}

/// Forwards session signals to whichever client is connected.
async fn dispatch(mut signals: mpsc::Receiver<Signal>, clients: ClientSlot) {
    while let Some(signal) = signals.recv().await {
        if let Some(client) = clients.deliver(signal) {
            if client.send(signal).await.is_err() {
                debug!("Client went away, dropped {signal}");
            }
        }
    }
}

async fn client_route(ws: WebSocketUpgrade, State(clients): State<ClientSlot>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| client_connection(socket, clients))
}

async fn client_connection(socket: WebSocket, clients: ClientSlot) {
    let (mut sink, mut incoming) = socket.split();

    let Some(mut signals) = clients.attach() else {
        info!("Rejected client: another client is connected");
        let _ = sink
            .send(Message::Close(Some(CloseFrame {
                code: close_code::POLICY,
                reason: "another client is connected".into(),
            })))
            .await;
        return;
    };
    info!("Client connected");

    loop {
        tokio::select! {
            signal = signals.recv() => {
                let Some(signal) = signal else {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                };
                if sink.send(Message::Text(signal.as_str().to_string())).await.is_err() {
                    break;
                }
            }
            message = incoming.next() => match message {
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    }
    info!("Client disconnected");
}
