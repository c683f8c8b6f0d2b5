use crate::FaceAttentionError;
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio;
use tracing::{info, warn};

/// Source of video frames for the frame loop.
pub trait FrameSource {
    type Frame;

    /// Latest frame, or `None` while the stream has no data yet.
    fn latest_frame(&mut self) -> anyhow::Result<Option<Self::Frame>>;
}

/// A missing source never produces frames.
///
/// Used when the camera could not be opened so the loop keeps running without a stream.
impl<S: FrameSource> FrameSource for Option<S> {
    type Frame = S::Frame;

    fn latest_frame(&mut self) -> anyhow::Result<Option<Self::Frame>> {
        match self {
            Some(source) => source.latest_frame(),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub index: i32,
    pub width: i32,
    pub height: i32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: 640,
            height: 480,
        }
    }
}

pub struct CameraSource {
    capture: videoio::VideoCapture,
}

impl CameraSource {
    pub fn new(config: &CameraConfig) -> anyhow::Result<Self> {
        let mut capture = videoio::VideoCapture::new(config.index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(FaceAttentionError::CameraUnavailable {
                index: config.index,
            }
            .into());
        }

        capture.set(videoio::CAP_PROP_FRAME_WIDTH, config.width as f64)?;
        capture.set(videoio::CAP_PROP_FRAME_HEIGHT, config.height as f64)?;
        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH)?;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT)?;
        if width as i32 != config.width || height as i32 != config.height {
            warn!(
                "Camera {} delivers {}x{} instead of {}x{}",
                config.index, width, height, config.width, config.height
            );
        }
        info!("Opened camera {} at {}x{}", config.index, width, height);

        Ok(Self { capture })
    }
}

impl FrameSource for CameraSource {
    type Frame = Mat;

    fn latest_frame(&mut self) -> anyhow::Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        if let Err(error) = self.capture.release() {
            warn!("Failed to release camera: {}", error);
        } else {
            info!("Released camera");
        }
    }
}
