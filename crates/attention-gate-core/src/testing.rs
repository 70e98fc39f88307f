//! Frame fixtures shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::domain::{AttentionError, FaceMesh, Landmark, LandmarkFrame, MeshPoint, ThresholdSet};
use crate::ports::{LandmarkStream, ThresholdStore};

const SIZE: u32 = 1000;

/// Builds a 1000x1000 frame whose ratios come out as the given values.
///
/// Eye ratios apply to both eyes.
pub fn posed_frame(eye_h: f64, eye_v: f64, face_h: f64, face_v: f64) -> LandmarkFrame {
    let offset = |base: f64, span: f64, r: f64| (base + r * span).round();
    let mut points = vec![MeshPoint::default(); FaceMesh::REFINED_LEN];
    let mut put = |landmark: Landmark, x: f64, y: f64| {
        #[allow(clippy::cast_possible_truncation)]
        let to_norm = |px: f64| ((px + 0.5) / f64::from(SIZE)) as f32;
        points[landmark.mesh_index()] = MeshPoint::new(to_norm(x), to_norm(y));
    };

    put(Landmark::LeftEyeOuter, 300.0, 350.0);
    put(Landmark::LeftEyeInner, 400.0, 350.0);
    put(Landmark::LeftEyeTop, 350.0, 300.0);
    put(Landmark::LeftEyeBottom, 350.0, 400.0);
    put(
        Landmark::LeftPupil,
        offset(300.0, 100.0, eye_h),
        offset(300.0, 100.0, eye_v),
    );
    put(Landmark::RightEyeInner, 600.0, 350.0);
    put(Landmark::RightEyeOuter, 700.0, 350.0);
    put(Landmark::RightEyeTop, 650.0, 300.0);
    put(Landmark::RightEyeBottom, 650.0, 400.0);
    put(
        Landmark::RightPupil,
        offset(600.0, 100.0, eye_h),
        offset(300.0, 100.0, eye_v),
    );
    put(Landmark::Forehead, 500.0, 100.0);
    put(Landmark::Chin, 500.0, 900.0);
    put(
        Landmark::Nose,
        offset(300.0, 400.0, face_h),
        offset(100.0, 800.0, face_v),
    );

    LandmarkFrame::with_face(SIZE, SIZE, FaceMesh::new(points))
}

pub fn attentive_frame() -> LandmarkFrame {
    posed_frame(0.5, 0.5, 0.5, 0.5)
}

/// Head turned left with eyes centred.
pub fn distracted_frame() -> LandmarkFrame {
    posed_frame(0.5, 0.5, 0.1, 0.5)
}

pub fn no_face_frame() -> LandmarkFrame {
    LandmarkFrame::empty(SIZE, SIZE)
}

pub const THRESHOLDS: ThresholdSet = ThresholdSet {
    face_horizontal_left: 0.35,
    face_horizontal_right: 0.65,
    face_vertical_up: 0.35,
    face_vertical_down: 0.65,
    eye_horizontal_left: 0.35,
    eye_horizontal_right: 0.65,
    eye_vertical_up: 0.35,
    eye_vertical_down: 0.65,
};

/// Replays a fixed list of frames, then reports exhaustion.
pub struct FrameQueue {
    frames: VecDeque<anyhow::Result<LandmarkFrame>>,
    delay: Duration,
    pub closes: Arc<AtomicUsize>,
}

impl FrameQueue {
    pub fn new(frames: impl IntoIterator<Item = LandmarkFrame>) -> Self {
        Self {
            frames: frames.into_iter().map(Ok).collect(),
            delay: Duration::ZERO,
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Blocks the reading thread this long before every frame.
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn then_fail(mut self, message: &str) -> Self {
        self.frames.push_back(Err(anyhow::anyhow!(message.to_string())));
        self
    }
}

impl LandmarkStream for FrameQueue {
    fn next_frame(&mut self) -> anyhow::Result<Option<LandmarkFrame>> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.frames.pop_front().transpose()
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory store; `None` behaves like a missing file.
#[derive(Default)]
pub struct MemoryStore {
    pub value: Mutex<Option<ThresholdSet>>,
    pub saves: AtomicUsize,
}

impl MemoryStore {
    pub fn with(thresholds: ThresholdSet) -> Self {
        Self {
            value: Mutex::new(Some(thresholds)),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, thresholds: Option<ThresholdSet>) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = thresholds;
    }
}

impl ThresholdStore for MemoryStore {
    fn load(&self) -> Result<ThresholdSet, AttentionError> {
        self.value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .ok_or_else(|| AttentionError::ConfigMissing {
                location: self.location(),
            })
    }

    fn save(&self, thresholds: &ThresholdSet) -> anyhow::Result<()> {
        self.set(Some(*thresholds));
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
