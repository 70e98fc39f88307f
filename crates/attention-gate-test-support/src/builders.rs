//! Synthetic landmark frames with known ratios.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use attention_gate_core::domain::{FaceMesh, Landmark, LandmarkFrame, MeshPoint, ThresholdSet};

const FRAME_SIZE: u32 = 1000;

/// Builds a 1000x1000 frame whose six ratios are set directly.
///
/// Eye ratios are applied to both eyes. Each ratio is resolved to a whole
/// pixel, so values with more than two decimals (eyes) or 1/400 and 1/800
/// steps (head) are rounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBuilder {
    eye_horizontal: f64,
    eye_vertical: f64,
    face_horizontal: f64,
    face_vertical: f64,
}

impl FaceBuilder {
    /// A face looking straight at the camera.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            eye_horizontal: 0.5,
            eye_vertical: 0.5,
            face_horizontal: 0.5,
            face_vertical: 0.5,
        }
    }

    /// Sets the pupil position within both eyes.
    #[must_use]
    pub const fn eyes(mut self, horizontal: f64, vertical: f64) -> Self {
        self.eye_horizontal = horizontal;
        self.eye_vertical = vertical;
        self
    }

    /// Sets the nose position within the face.
    #[must_use]
    pub const fn head(mut self, horizontal: f64, vertical: f64) -> Self {
        self.face_horizontal = horizontal;
        self.face_vertical = vertical;
        self
    }

    /// Builds the frame.
    #[must_use]
    pub fn build(&self) -> LandmarkFrame {
        let mut points = vec![MeshPoint::default(); FaceMesh::REFINED_LEN];
        let mut place = |landmark: Landmark, x: f64, y: f64| {
            points[landmark.mesh_index()] = MeshPoint::new(normalize(x), normalize(y));
        };
        let along = |start: f64, span: f64, ratio: f64| (ratio.mul_add(span, start)).round();

        place(Landmark::LeftEyeOuter, 300.0, 350.0);
        place(Landmark::LeftEyeInner, 400.0, 350.0);
        place(Landmark::LeftEyeTop, 350.0, 300.0);
        place(Landmark::LeftEyeBottom, 350.0, 400.0);
        place(
            Landmark::LeftPupil,
            along(300.0, 100.0, self.eye_horizontal),
            along(300.0, 100.0, self.eye_vertical),
        );

        place(Landmark::RightEyeInner, 600.0, 350.0);
        place(Landmark::RightEyeOuter, 700.0, 350.0);
        place(Landmark::RightEyeTop, 650.0, 300.0);
        place(Landmark::RightEyeBottom, 650.0, 400.0);
        place(
            Landmark::RightPupil,
            along(600.0, 100.0, self.eye_horizontal),
            along(300.0, 100.0, self.eye_vertical),
        );

        place(Landmark::Forehead, 500.0, 100.0);
        place(Landmark::Chin, 500.0, 900.0);
        place(
            Landmark::Nose,
            along(300.0, 400.0, self.face_horizontal),
            along(100.0, 800.0, self.face_vertical),
        );

        LandmarkFrame::with_face(FRAME_SIZE, FRAME_SIZE, FaceMesh::new(points))
    }

    /// A centred face.
    #[must_use]
    pub fn attentive() -> LandmarkFrame {
        Self::new().build()
    }

    /// Head turned left with the eyes centred.
    #[must_use]
    pub fn distracted() -> LandmarkFrame {
        Self::new().head(0.1, 0.5).build()
    }

    /// A frame in which the detector found nothing.
    #[must_use]
    pub const fn no_face() -> LandmarkFrame {
        LandmarkFrame::empty(FRAME_SIZE, FRAME_SIZE)
    }
}

impl Default for FaceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pixel centre to normalized coordinate, so truncation recovers the pixel.
#[allow(clippy::cast_possible_truncation)]
fn normalize(pixel: f64) -> f32 {
    ((pixel + 0.5) / f64::from(FRAME_SIZE)) as f32
}

/// Thresholds with a 0.35..0.65 band on every axis.
#[must_use]
pub const fn standard_thresholds() -> ThresholdSet {
    ThresholdSet {
        face_horizontal_left: 0.35,
        face_horizontal_right: 0.65,
        face_vertical_up: 0.35,
        face_vertical_down: 0.65,
        eye_horizontal_left: 0.35,
        eye_horizontal_right: 0.65,
        eye_vertical_up: 0.35,
        eye_vertical_down: 0.65,
    }
}

/// Frames for a full calibration run, `per_step` for each of the eight poses.
///
/// Calibrating on them yields eye thresholds 0.2/0.8 and head thresholds
/// 0.3/0.7 (horizontal) and 0.25/0.75 (vertical).
#[must_use]
pub fn calibration_frames(per_step: usize) -> Vec<LandmarkFrame> {
    let poses = [
        FaceBuilder::new().eyes(0.2, 0.5),
        FaceBuilder::new().eyes(0.8, 0.5),
        FaceBuilder::new().eyes(0.5, 0.2),
        FaceBuilder::new().eyes(0.5, 0.8),
        FaceBuilder::new().head(0.3, 0.5),
        FaceBuilder::new().head(0.7, 0.5),
        FaceBuilder::new().head(0.5, 0.25),
        FaceBuilder::new().head(0.5, 0.75),
    ];
    poses
        .iter()
        .flat_map(|pose| std::iter::repeat(pose.build()).take(per_step))
        .collect()
}

/// Writes frames as a JSON-lines recording.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_jsonl(path: &Path, frames: &[LandmarkFrame]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = std::io::BufWriter::new(file);
    for frame in frames {
        serde_json::to_writer(&mut writer, frame)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use attention_gate_core::pipeline::{extract_ratios, is_attentive};

    use super::*;

    #[test]
    fn test_builder_ratios_round_trip_through_pixels() {
        let frame = FaceBuilder::new().eyes(0.2, 0.7).head(0.25, 0.75).build();
        let ratios = extract_ratios(&frame.landmarks().unwrap());
        assert!((ratios.left_eye_horizontal - 0.2).abs() < 1e-9);
        assert!((ratios.right_eye_horizontal - 0.2).abs() < 1e-9);
        assert!((ratios.left_eye_vertical - 0.7).abs() < 1e-9);
        assert!((ratios.face_horizontal - 0.25).abs() < 1e-9);
        assert!((ratios.face_vertical - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_presets_classify_as_named() {
        let thresholds = standard_thresholds();
        let attentive = extract_ratios(&FaceBuilder::attentive().landmarks().unwrap());
        let distracted = extract_ratios(&FaceBuilder::distracted().landmarks().unwrap());
        assert!(is_attentive(&attentive, &thresholds));
        assert!(!is_attentive(&distracted, &thresholds));
        assert!(FaceBuilder::no_face().landmarks().is_none());
    }

    #[test]
    fn test_calibration_frames_len() {
        assert_eq!(calibration_frames(3).len(), 24);
    }
}
