/// A single facial keypoint in normalized image coordinates.
///
/// `x` and `y` are in `[0, 1]` relative to the frame width and height.
/// Detectors that estimate depth fill in `z`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: Option<f32>,
}

impl Landmark {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_depth(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z: Some(z) }
    }
}

/// Which point indices of a face hold the five key points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkScheme {
    /// 468 point face mesh.
    FaceMesh,
    /// YuNet style five point output.
    FivePoint,
}

impl LandmarkScheme {
    /// Indices of left eye, right eye, nose tip, left and right mouth corner.
    ///
    /// Left and right are as seen in the image, not from the subject's side.
    pub fn key_point_indices(&self) -> [usize; 5] {
        match self {
            LandmarkScheme::FaceMesh => [145, 374, 1, 61, 291],
            LandmarkScheme::FivePoint => [0, 1, 2, 3, 4],
        }
    }

    pub fn point_count(&self) -> usize {
        match self {
            LandmarkScheme::FaceMesh => 468,
            LandmarkScheme::FivePoint => 5,
        }
    }
}

/// The five points the head pose heuristic works on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPoints {
    pub left_eye: Landmark,
    pub right_eye: Landmark,
    pub nose: Landmark,
    pub mouth_left: Landmark,
    pub mouth_right: Landmark,
}

/// All landmarks detected for one face in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLandmarks {
    pub scheme: LandmarkScheme,
    pub points: Vec<Landmark>,
}

impl FaceLandmarks {
    pub fn new(scheme: LandmarkScheme, points: Vec<Landmark>) -> Self {
        Self { scheme, points }
    }

    /// Picks the key points out of the point list.
    ///
    /// Returns `None` if the list is too short for the scheme.
    pub fn key_points(&self) -> Option<KeyPoints> {
        let [left_eye, right_eye, nose, mouth_left, mouth_right] =
            self.scheme.key_point_indices();
        Some(KeyPoints {
            left_eye: *self.points.get(left_eye)?,
            right_eye: *self.points.get(right_eye)?,
            nose: *self.points.get(nose)?,
            mouth_left: *self.points.get(mouth_left)?,
            mouth_right: *self.points.get(mouth_right)?,
        })
    }
}
