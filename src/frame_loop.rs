use crate::camera::FrameSource;
use crate::detector::LandmarkDetector;
use crate::overlay::Canvas;
use crate::pose::{HeadPose, LookingState, PoseClassifier};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone)]
pub struct FrameLoopConfig {
    pub draw_points: bool,
    pub classifier: PoseClassifier,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            draw_points: true,
            classifier: PoseClassifier::default(),
        }
    }
}

/// What a single frame cycle did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// No frame available yet, nothing was detected or drawn.
    Waiting,
    /// Frame drawn, no usable face in it.
    NoFace,
    /// Frame drawn and the last face evaluated.
    Evaluated { pose: HeadPose, state: LookingState },
}

/// Capture, detect, draw and classify, one frame per call to [`FrameLoop::step`].
pub struct FrameLoop<S, D, C> {
    source: S,
    detector: D,
    canvas: C,
    config: FrameLoopConfig,
    looking: LookingState,
    started: Instant,
    last_timestamp: Option<Duration>,
}

impl<S, D, C> FrameLoop<S, D, C>
where
    S: FrameSource,
    D: LandmarkDetector<S::Frame>,
    C: Canvas<S::Frame>,
{
    pub fn new(source: S, detector: D, canvas: C, config: FrameLoopConfig) -> Self {
        Self {
            source,
            detector,
            canvas,
            config,
            looking: LookingState::default(),
            started: Instant::now(),
            last_timestamp: None,
        }
    }

    pub fn looking_state(&self) -> LookingState {
        self.looking
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn step(&mut self) -> anyhow::Result<FrameOutcome> {
        let outcome = self.process_frame()?;
        self.canvas.present(self.looking)?;
        Ok(outcome)
    }

    fn process_frame(&mut self) -> anyhow::Result<FrameOutcome> {
        let Some(frame) = self.source.latest_frame()? else {
            trace!("Waiting for video data");
            return Ok(FrameOutcome::Waiting);
        };

        let timestamp = self.next_timestamp();
        let faces = self.detector.detect(&frame, timestamp)?;

        self.canvas.clear()?;
        self.canvas.draw_frame(&frame)?;

        let mut outcome = FrameOutcome::NoFace;
        for face in &faces {
            trace!(points = face.points.len(), "Face landmarks: {:?}", face.points);
            if self.config.draw_points {
                self.canvas.draw_landmarks(face)?;
            }

            let Some(key_points) = face.key_points() else {
                warn!(
                    "Face has {} landmarks, too few for {:?}",
                    face.points.len(),
                    face.scheme
                );
                continue;
            };

            let (pose, state) = self.config.classifier.evaluate(&key_points);
            debug!(yaw = pose.yaw, "Head pose");
            if state != self.looking {
                info!("User is {}", state);
            }
            self.looking = state;
            outcome = FrameOutcome::Evaluated { pose, state };
        }

        Ok(outcome)
    }

    /// Time since the loop started, strictly increasing across calls.
    fn next_timestamp(&mut self) -> Duration {
        let mut timestamp = self.started.elapsed();
        if let Some(last) = self.last_timestamp {
            if timestamp <= last {
                timestamp = last + Duration::from_micros(1);
            }
        }
        self.last_timestamp = Some(timestamp);
        timestamp
    }
}
