pub mod camera;
pub mod detector;
pub mod frame_loop;
pub mod landmarks;
pub mod models;
pub mod overlay;
pub mod pose;
pub mod scheduler;

pub use camera::{CameraConfig, CameraSource, FrameSource};
pub use detector::{DetectorConfig, LandmarkDetector, YuNetDetector};
pub use frame_loop::{FrameLoop, FrameLoopConfig, FrameOutcome};
pub use landmarks::{FaceLandmarks, KeyPoints, Landmark, LandmarkScheme};
pub use overlay::{Canvas, OverlayStyle, WindowCanvas};
pub use pose::{estimate_head_pose, HeadPose, LookingState, PoseClassifier};
pub use scheduler::{CancellationToken, FrameScheduler};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FaceAttentionError {
    #[error("Unable to open camera {index}")]
    CameraUnavailable { index: i32 },
    #[error("Downloading model {name} failed with status {status}")]
    ModelDownload { name: String, status: u16 },
    #[error("Detector returned {columns} columns per face, expected at least 15")]
    MalformedDetections { columns: i32 },
}
