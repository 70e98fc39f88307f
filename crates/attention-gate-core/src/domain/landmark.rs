//! Landmark vocabulary and per-frame landmark data.

use std::ops::Index;

use serde::{Deserialize, Serialize};

/// A named facial point consumed by the geometry extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Landmark {
    /// Outer corner of the left eye.
    LeftEyeOuter,
    /// Inner corner of the left eye.
    LeftEyeInner,
    /// Outer corner of the right eye.
    RightEyeOuter,
    /// Inner corner of the right eye.
    RightEyeInner,
    /// Upper lid of the left eye.
    LeftEyeTop,
    /// Lower lid of the left eye.
    LeftEyeBottom,
    /// Upper lid of the right eye.
    RightEyeTop,
    /// Lower lid of the right eye.
    RightEyeBottom,
    /// Centre of the left iris.
    LeftPupil,
    /// Centre of the right iris.
    RightPupil,
    /// Nose tip.
    Nose,
    /// Bottom of the chin.
    Chin,
    /// Top of the forehead.
    Forehead,
}

impl Landmark {
    /// Number of named landmarks.
    pub const COUNT: usize = 13;

    /// Every landmark, in slot order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::LeftEyeOuter,
        Self::LeftEyeInner,
        Self::RightEyeOuter,
        Self::RightEyeInner,
        Self::LeftEyeTop,
        Self::LeftEyeBottom,
        Self::RightEyeTop,
        Self::RightEyeBottom,
        Self::LeftPupil,
        Self::RightPupil,
        Self::Nose,
        Self::Chin,
        Self::Forehead,
    ];

    /// Index of this landmark in the refined 478-point face mesh.
    #[must_use]
    pub const fn mesh_index(self) -> usize {
        match self {
            Self::LeftEyeOuter => 33,
            Self::LeftEyeInner => 173,
            Self::RightEyeOuter => 263,
            Self::RightEyeInner => 398,
            Self::LeftEyeTop => 222,
            Self::LeftEyeBottom => 230,
            Self::RightEyeTop => 442,
            Self::RightEyeBottom => 450,
            Self::LeftPupil => 468,
            Self::RightPupil => 473,
            Self::Nose => 4,
            Self::Chin => 152,
            Self::Forehead => 10,
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

/// Normalized detector output point (0.0-1.0 relative to frame size).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshPoint {
    /// Horizontal position as a fraction of frame width.
    pub x: f32,
    /// Vertical position as a fraction of frame height.
    pub y: f32,
    /// Relative depth. Unused by the ratio geometry.
    #[serde(default)]
    pub z: f32,
}

impl MeshPoint {
    /// Creates a point on the image plane.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: 0.0 }
    }
}

/// One detected face: normalized points addressed by detector index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceMesh(Vec<MeshPoint>);

impl FaceMesh {
    /// Number of points in a refined face mesh (468 face + 10 iris).
    pub const REFINED_LEN: usize = 478;

    /// Wraps detector points.
    #[must_use]
    pub const fn new(points: Vec<MeshPoint>) -> Self {
        Self(points)
    }

    /// Returns the point at a detector index, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<MeshPoint> {
        self.0.get(index).copied()
    }

    /// Returns the number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the mesh has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One captured frame as seen through the landmark detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// The detected face, or `None` when no face was found.
    #[serde(default)]
    pub face: Option<FaceMesh>,
}

impl LandmarkFrame {
    /// Creates a frame with no detected face.
    #[must_use]
    pub const fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            face: None,
        }
    }

    /// Creates a frame with a detected face.
    #[must_use]
    pub const fn with_face(width: u32, height: u32, face: FaceMesh) -> Self {
        Self {
            width,
            height,
            face: Some(face),
        }
    }

    /// Resolves the named landmarks in pixel space.
    ///
    /// Returns `None` when no face was detected or the mesh is missing
    /// one of the required indices.
    #[must_use]
    pub fn landmarks(&self) -> Option<LandmarkSet> {
        self.face
            .as_ref()
            .and_then(|mesh| LandmarkSet::from_mesh(mesh, self.width, self.height))
    }
}

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl PixelPoint {
    /// Creates a pixel coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Projects a normalized point onto a frame, truncating toward zero.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn from_normalized(point: MeshPoint, width: u32, height: u32) -> Self {
        Self {
            x: (f64::from(point.x) * f64::from(width)) as i32,
            y: (f64::from(point.y) * f64::from(height)) as i32,
        }
    }
}

/// Pixel positions for the full landmark vocabulary in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandmarkSet {
    points: [PixelPoint; Landmark::COUNT],
}

impl LandmarkSet {
    /// Builds a set by evaluating `f` for every landmark.
    pub fn from_fn(mut f: impl FnMut(Landmark) -> PixelPoint) -> Self {
        let mut points = [PixelPoint::default(); Landmark::COUNT];
        for landmark in Landmark::ALL {
            points[landmark.slot()] = f(landmark);
        }
        Self { points }
    }

    /// Picks the named landmarks out of a detector mesh and projects them
    /// to pixel coordinates.
    #[must_use]
    pub fn from_mesh(mesh: &FaceMesh, width: u32, height: u32) -> Option<Self> {
        let mut points = [PixelPoint::default(); Landmark::COUNT];
        for landmark in Landmark::ALL {
            let point = mesh.get(landmark.mesh_index())?;
            points[landmark.slot()] = PixelPoint::from_normalized(point, width, height);
        }
        Some(Self { points })
    }

    /// Returns the pixel position of a landmark.
    #[must_use]
    pub const fn get(&self, landmark: Landmark) -> PixelPoint {
        self.points[landmark.slot()]
    }
}

impl Index<Landmark> for LandmarkSet {
    type Output = PixelPoint;

    fn index(&self, landmark: Landmark) -> &Self::Output {
        &self.points[landmark.slot()]
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn mesh_with(index: usize, point: MeshPoint) -> FaceMesh {
        let mut points = vec![MeshPoint::default(); FaceMesh::REFINED_LEN];
        points[index] = point;
        FaceMesh::new(points)
    }

    #[test]
    fn test_mesh_indices_are_distinct() {
        let mut indices: Vec<_> = Landmark::ALL.iter().map(|l| l.mesh_index()).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), Landmark::COUNT);
        assert!(indices.iter().all(|&i| i < FaceMesh::REFINED_LEN));
    }

    #[test]
    fn test_pixel_projection_truncates() {
        let p = PixelPoint::from_normalized(MeshPoint::new(0.5, 0.999), 640, 480);
        assert_eq!(p, PixelPoint::new(320, 479));
    }

    #[test]
    fn test_from_mesh_projects_named_points() {
        let mesh = mesh_with(Landmark::Nose.mesh_index(), MeshPoint::new(0.25, 0.75));
        let set = LandmarkSet::from_mesh(&mesh, 400, 200).expect("complete mesh");
        assert_eq!(set[Landmark::Nose], PixelPoint::new(100, 150));
        assert_eq!(set.get(Landmark::Chin), PixelPoint::new(0, 0));
    }

    #[test]
    fn test_short_mesh_yields_no_landmarks() {
        // Face-only mesh without the iris points
        let mesh = FaceMesh::new(vec![MeshPoint::default(); 468]);
        let frame = LandmarkFrame::with_face(640, 480, mesh);
        assert!(frame.landmarks().is_none());
    }

    #[test]
    fn test_empty_frame_has_no_landmarks() {
        assert!(LandmarkFrame::empty(640, 480).landmarks().is_none());
    }

    #[test]
    fn test_frame_deserializes_without_face() {
        let frame: LandmarkFrame =
            serde_json::from_str(r#"{"width":640,"height":480}"#).expect("parse frame");
        assert_eq!(frame, LandmarkFrame::empty(640, 480));
    }
}
