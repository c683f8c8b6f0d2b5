use crate::landmarks::{FaceLandmarks, Landmark, LandmarkScheme};
use crate::FaceAttentionError;
use opencv::core::{Mat, Ptr, Size};
use opencv::objdetect::FaceDetectorYN;
use opencv::prelude::*;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Something that turns a frame into facial landmarks.
///
/// `timestamp` is the time since the frame loop started and increases with every call.
/// An empty result means no face was found.
pub trait LandmarkDetector<F> {
    fn detect(&mut self, frame: &F, timestamp: Duration) -> anyhow::Result<Vec<FaceLandmarks>>;
}

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub score_threshold: f32,
    pub nms_threshold: f32,
    pub top_k: i32,
    pub max_faces: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            score_threshold: 0.9,
            nms_threshold: 0.3,
            top_k: 5000,
            max_faces: 1,
        }
    }
}

// x, y, w, h, 5 landmark pairs, score
const YUNET_COLUMNS: i32 = 15;
const YUNET_LANDMARK_OFFSET: i32 = 4;
const YUNET_SCORE_COLUMN: i32 = 14;

/// OpenCV YuNet face detector producing five point landmarks.
pub struct YuNetDetector {
    detector: Ptr<FaceDetectorYN>,
    input_size: Size,
    max_faces: usize,
}

impl YuNetDetector {
    pub fn new(model_path: &Path, config: &DetectorConfig) -> anyhow::Result<Self> {
        let model = model_path.to_string_lossy();
        let input_size = Size::new(320, 320);
        let detector = FaceDetectorYN::create(
            &model,
            "",
            input_size,
            config.score_threshold,
            config.nms_threshold,
            config.top_k,
            0,
            0,
        )?;
        info!("Loaded face landmark model from {}", model);
        Ok(Self {
            detector,
            input_size,
            max_faces: config.max_faces,
        })
    }
}

impl LandmarkDetector<Mat> for YuNetDetector {
    fn detect(&mut self, frame: &Mat, timestamp: Duration) -> anyhow::Result<Vec<FaceLandmarks>> {
        let frame_size = frame.size()?;
        if frame_size != self.input_size {
            debug!(?frame_size, "Resizing detector input");
            self.detector.set_input_size(frame_size)?;
            self.input_size = frame_size;
        }

        let mut detections = Mat::default();
        self.detector.detect(frame, &mut detections)?;
        let faces = faces_from_detections(&detections, frame_size, self.max_faces)?;
        debug!(faces = faces.len(), ?timestamp, "Detected faces");
        Ok(faces)
    }
}

/// Converts YuNet output rows into normalized faces, best score first, at most `max_faces`.
pub fn faces_from_detections(
    detections: &Mat,
    frame_size: Size,
    max_faces: usize,
) -> anyhow::Result<Vec<FaceLandmarks>> {
    if detections.rows() == 0 {
        return Ok(Vec::new());
    }
    if detections.cols() < YUNET_COLUMNS {
        return Err(FaceAttentionError::MalformedDetections {
            columns: detections.cols(),
        }
        .into());
    }

    let mut scored = Vec::with_capacity(detections.rows() as usize);
    for row in 0..detections.rows() {
        let score = *detections.at_2d::<f32>(row, YUNET_SCORE_COLUMN)?;
        let mut points = Vec::with_capacity(5);
        for point in 0..5 {
            let column = YUNET_LANDMARK_OFFSET + point * 2;
            let x = *detections.at_2d::<f32>(row, column)?;
            let y = *detections.at_2d::<f32>(row, column + 1)?;
            points.push(normalize(x, y, frame_size));
        }
        scored.push((score, FaceLandmarks::new(LandmarkScheme::FivePoint, points)));
    }

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(max_faces);
    Ok(scored.into_iter().map(|(_, face)| face).collect())
}

fn normalize(x: f32, y: f32, frame_size: Size) -> Landmark {
    Landmark::new(x / frame_size.width as f32, y / frame_size.height as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_divides_by_frame_size() {
        let point = normalize(320.0, 120.0, Size::new(640, 480));
        assert_eq!(point, Landmark::new(0.5, 0.25));
    }

    /// YuNet row with the nose at `nose_x` pixels and the given score.
    fn detection(nose_x: f32, score: f32) -> [f32; 15] {
        [
            100.0, 100.0, 200.0, 200.0, // box
            160.0, 160.0, // left eye
            260.0, 160.0, // right eye
            nose_x, 220.0, // nose
            180.0, 260.0, // left mouth corner
            240.0, 260.0, // right mouth corner
            score,
        ]
    }

    const FRAME: Size = Size {
        width: 640,
        height: 480,
    };

    #[test]
    fn detections_are_normalized() {
        let detections = Mat::from_slice_2d(&[detection(210.0, 0.95)]).unwrap();
        let faces = faces_from_detections(&detections, FRAME, 1).unwrap();

        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].scheme, LandmarkScheme::FivePoint);
        assert_eq!(faces[0].points[0], Landmark::new(0.25, 160.0 / 480.0));
        let key_points = faces[0].key_points().unwrap();
        assert_eq!(key_points.nose.x, 210.0 / 640.0);
        assert_eq!(key_points.mouth_right.y, 260.0 / 480.0);
    }

    #[test]
    fn best_score_comes_first() {
        let detections = Mat::from_slice_2d(&[
            detection(100.0, 0.91),
            detection(320.0, 0.99),
            detection(200.0, 0.95),
        ])
        .unwrap();
        let faces = faces_from_detections(&detections, FRAME, 3).unwrap();

        let noses: Vec<f32> = faces.iter().map(|face| face.points[2].x * 640.0).collect();
        assert_eq!(noses, vec![320.0, 200.0, 100.0]);
    }

    #[test]
    fn truncated_to_max_faces() {
        let detections = Mat::from_slice_2d(&[
            detection(100.0, 0.91),
            detection(320.0, 0.99),
            detection(200.0, 0.95),
        ])
        .unwrap();
        let faces = faces_from_detections(&detections, FRAME, 1).unwrap();

        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].points[2].x, 0.5);
    }

    #[test]
    fn no_rows_no_faces() {
        let faces = faces_from_detections(&Mat::default(), FRAME, 1).unwrap();
        assert!(faces.is_empty());
    }

    #[test]
    fn too_few_columns_is_an_error() {
        let detections = Mat::from_slice_2d(&[[0.0f32; 14]]).unwrap();
        let error = faces_from_detections(&detections, FRAME, 1).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<FaceAttentionError>(),
            Some(FaceAttentionError::MalformedDetections { columns: 14 })
        ));
    }

    #[test]
    fn default_config_tracks_one_face() {
        assert_eq!(DetectorConfig::default().max_faces, 1);
    }
}
