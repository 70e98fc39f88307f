//! Mock implementations of core port traits.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use attention_gate_core::calibration::CalibrationStep;
use attention_gate_core::domain::{AttentionError, LandmarkFrame, Signal, ThresholdSet};
use attention_gate_core::ports::{
    CalibrationPrompt, CaptureBackend, Clock, LandmarkStream, PromptAction, SessionEvent,
    SessionObserver, ThresholdStore,
};

/// Mock implementation of `LandmarkStream` for testing.
///
/// Replays frames in order, then reports exhaustion. Streams built with
/// [`ScriptedLandmarkStream::repeating`] never run dry.
pub struct ScriptedLandmarkStream {
    frames: VecDeque<anyhow::Result<LandmarkFrame>>,
    repeat: Option<LandmarkFrame>,
    delay: Duration,
    closed: Arc<AtomicBool>,
}

impl ScriptedLandmarkStream {
    /// Creates a stream over the given frames.
    #[must_use]
    pub fn new(frames: Vec<LandmarkFrame>) -> Self {
        Self {
            frames: frames.into_iter().map(Ok).collect(),
            repeat: None,
            delay: Duration::ZERO,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a stream that never runs dry.
    #[must_use]
    pub fn repeating(frame: LandmarkFrame) -> Self {
        Self {
            repeat: Some(frame),
            ..Self::new(Vec::new())
        }
    }

    /// Appends a device error after the scripted frames.
    #[must_use]
    pub fn then_fail(mut self, message: &str) -> Self {
        self.frames
            .push_back(Err(anyhow::anyhow!(message.to_string())));
        self
    }

    /// Blocks the calling thread for `delay` on every pull.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared flag set once the stream is closed.
    #[must_use]
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

impl LandmarkStream for ScriptedLandmarkStream {
    fn next_frame(&mut self) -> anyhow::Result<Option<LandmarkFrame>> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        match self.frames.pop_front() {
            Some(result) => result.map(Some),
            None => Ok(self.repeat.clone()),
        }
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Mock implementation of `CaptureBackend` for testing.
///
/// Every `open` hands out a fresh copy of the script and counts opens and
/// closes, so tests can assert the device is always released.
pub struct ScriptedCapture {
    frames: Vec<LandmarkFrame>,
    repeat: Option<LandmarkFrame>,
    delay: Duration,
    fail_open: bool,
    opens: Arc<AtomicUsize>,
    streams: Arc<Mutex<Vec<Arc<AtomicBool>>>>,
}

impl ScriptedCapture {
    /// Creates a backend whose streams replay `frames` and then end.
    #[must_use]
    pub fn new(frames: Vec<LandmarkFrame>) -> Self {
        Self {
            frames,
            repeat: None,
            delay: Duration::ZERO,
            fail_open: false,
            opens: Arc::new(AtomicUsize::new(0)),
            streams: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Creates a backend whose streams repeat `frame` forever.
    #[must_use]
    pub fn repeating(frame: LandmarkFrame) -> Self {
        Self::new(Vec::new()).then_repeat(frame)
    }

    /// Repeats `frame` forever once the scripted frames run out.
    #[must_use]
    pub fn then_repeat(mut self, frame: LandmarkFrame) -> Self {
        self.repeat = Some(frame);
        self
    }

    /// Creates a backend that cannot open the device.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            fail_open: true,
            ..Self::new(Vec::new())
        }
    }

    /// Makes every frame pull block for `delay`.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns how many streams have been opened.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Returns how many opened streams have been closed.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|closed| closed.load(Ordering::SeqCst))
            .count()
    }
}

impl CaptureBackend for ScriptedCapture {
    fn open(&self) -> anyhow::Result<Box<dyn LandmarkStream>> {
        if self.fail_open {
            anyhow::bail!("camera not found");
        }
        self.opens.fetch_add(1, Ordering::SeqCst);

        let mut stream = ScriptedLandmarkStream::new(self.frames.clone()).with_delay(self.delay);
        stream.repeat.clone_from(&self.repeat);
        self.streams
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(stream.closed_flag());
        Ok(Box::new(stream))
    }

    fn describe(&self) -> String {
        "scripted capture".to_string()
    }
}

/// Mock implementation of `ThresholdStore` for testing.
///
/// Holds thresholds in memory; an empty store behaves like a missing file.
#[derive(Default)]
pub struct MemoryThresholdStore {
    value: Mutex<Option<ThresholdSet>>,
    saves: AtomicUsize,
    loads: AtomicUsize,
    fail_save: AtomicBool,
}

impl MemoryThresholdStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `thresholds`.
    #[must_use]
    pub fn with(thresholds: ThresholdSet) -> Self {
        let store = Self::new();
        store.set(Some(thresholds));
        store
    }

    /// Replaces the stored value.
    pub fn set(&self, thresholds: Option<ThresholdSet>) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = thresholds;
    }

    /// Returns the stored value.
    #[must_use]
    pub fn get(&self) -> Option<ThresholdSet> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes subsequent saves fail.
    pub fn fail_saves(&self) {
        self.fail_save.store(true, Ordering::SeqCst);
    }

    /// Returns the number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Returns the number of load calls.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ThresholdStore for MemoryThresholdStore {
    fn load(&self) -> Result<ThresholdSet, AttentionError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.get().ok_or_else(|| AttentionError::ConfigMissing {
            location: self.location(),
        })
    }

    fn save(&self, thresholds: &ThresholdSet) -> anyhow::Result<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.set(Some(*thresholds));
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// Mock implementation of `CalibrationPrompt` for testing.
///
/// Answers step prompts from a script (defaulting to capture) and records
/// what it was asked.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<PromptAction>,
    abort_after_samples: Option<usize>,
    steps: Vec<CalibrationStep>,
    samples: usize,
    finished: Option<ThresholdSet>,
}

impl ScriptedPrompt {
    /// A prompt that captures every step.
    #[must_use]
    pub fn accept_all() -> Self {
        Self::default()
    }

    /// A prompt that captures `steps` steps and then aborts.
    #[must_use]
    pub fn abort_at(steps: usize) -> Self {
        let mut answers: VecDeque<_> = std::iter::repeat(PromptAction::Capture)
            .take(steps)
            .collect();
        answers.push_back(PromptAction::Abort);
        Self {
            answers,
            ..Self::default()
        }
    }

    /// A prompt that requests abort after `samples` captured samples.
    #[must_use]
    pub fn abort_after_samples(samples: usize) -> Self {
        Self {
            abort_after_samples: Some(samples),
            ..Self::default()
        }
    }

    /// Steps that were announced.
    #[must_use]
    pub fn steps(&self) -> &[CalibrationStep] {
        &self.steps
    }

    /// Samples reported as captured.
    #[must_use]
    pub const fn samples(&self) -> usize {
        self.samples
    }

    /// Thresholds passed to `finished`, if it was called.
    #[must_use]
    pub const fn finished(&self) -> Option<&ThresholdSet> {
        self.finished.as_ref()
    }
}

impl CalibrationPrompt for ScriptedPrompt {
    fn begin_step(
        &mut self,
        step: CalibrationStep,
        _index: usize,
        _total: usize,
    ) -> anyhow::Result<PromptAction> {
        self.steps.push(step);
        Ok(self.answers.pop_front().unwrap_or(PromptAction::Capture))
    }

    fn sample_captured(&mut self, _step: CalibrationStep, _captured: usize, _required: usize) {
        self.samples += 1;
    }

    fn abort_requested(&mut self) -> bool {
        self.abort_after_samples
            .is_some_and(|limit| self.samples >= limit)
    }

    fn finished(&mut self, thresholds: &ThresholdSet) {
        self.finished = Some(*thresholds);
    }
}

/// Mock implementation of `Clock` for testing.
///
/// Never sleeps; accumulates the requested time instead.
#[derive(Debug, Default)]
pub struct ManualClock {
    elapsed: Mutex<Duration>,
    sleeps: AtomicUsize,
}

impl ManualClock {
    /// Creates a clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total time that would have been slept.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of sleep calls.
    #[must_use]
    pub fn sleep_count(&self) -> usize {
        self.sleeps.load(Ordering::SeqCst)
    }
}

impl Clock for ManualClock {
    fn sleep(&self, duration: Duration) {
        *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner) += duration;
        self.sleeps.fetch_add(1, Ordering::SeqCst);
    }
}

impl Clock for &ManualClock {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

/// Mock implementation of `SessionObserver` for testing.
///
/// Captures events for later assertions.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingObserver {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns only the emitted signals, in order.
    #[must_use]
    pub fn signals(&self) -> Vec<Signal> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::Signal { signal, .. } => Some(signal),
                _ => None,
            })
            .collect()
    }
}

impl SessionObserver for RecordingObserver {
    fn on_event(&self, event: SessionEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
