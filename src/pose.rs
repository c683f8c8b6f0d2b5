use crate::landmarks::KeyPoints;

/// Yaw magnitude below which the user counts as facing the screen.
pub const DEFAULT_YAW_THRESHOLD_DEGREES: f32 = 10.0;

/// Head pose estimate for a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadPose {
    /// Horizontal rotation in degrees. Positive when the nose sits right of the mouth center.
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookingState {
    Looking,
    #[default]
    NotLooking,
}

impl LookingState {
    pub fn is_looking(&self) -> bool {
        matches!(self, LookingState::Looking)
    }
}

impl std::fmt::Display for LookingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookingState::Looking => write!(f, "looking at the screen"),
            LookingState::NotLooking => write!(f, "not looking at the screen"),
        }
    }
}

/// Estimates yaw from the horizontal offset of the nose against the mouth center,
/// scaled by the eye distance.
///
/// Degenerate input is left to `atan2`: equal eye positions give +-90 degrees.
pub fn estimate_head_pose(key_points: &KeyPoints) -> HeadPose {
    let mouth_midpoint_x = (key_points.mouth_left.x + key_points.mouth_right.x) / 2.0;
    let yaw = (key_points.nose.x - mouth_midpoint_x)
        .atan2(key_points.right_eye.x - key_points.left_eye.x)
        .to_degrees();
    HeadPose { yaw }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseClassifier {
    threshold_degrees: f32,
}

impl Default for PoseClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_YAW_THRESHOLD_DEGREES)
    }
}

impl PoseClassifier {
    pub fn new(threshold_degrees: f32) -> Self {
        Self { threshold_degrees }
    }

    pub fn threshold_degrees(&self) -> f32 {
        self.threshold_degrees
    }

    /// Strict comparison: a yaw exactly at the threshold is not looking.
    pub fn classify(&self, pose: &HeadPose) -> LookingState {
        if pose.yaw.abs() < self.threshold_degrees {
            LookingState::Looking
        } else {
            LookingState::NotLooking
        }
    }

    pub fn evaluate(&self, key_points: &KeyPoints) -> (HeadPose, LookingState) {
        let pose = estimate_head_pose(key_points);
        (pose, self.classify(&pose))
    }
}
