use crate::landmarks::FaceLandmarks;
use crate::pose::LookingState;
use opencv::core::{self, Mat, Point, Scalar, Size};
use opencv::prelude::*;
use opencv::{highgui, imgproc};

/// Drawing surface the frame loop renders into.
pub trait Canvas<F> {
    fn clear(&mut self) -> anyhow::Result<()>;
    fn draw_frame(&mut self, frame: &F) -> anyhow::Result<()>;
    fn draw_landmarks(&mut self, landmarks: &FaceLandmarks) -> anyhow::Result<()>;
    /// Shows the current contents styled for `state`.
    fn present(&mut self, state: LookingState) -> anyhow::Result<()>;
}

/// BGR color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { b, g, r }
    }
}

impl From<Color> for Scalar {
    fn from(color: Color) -> Self {
        Scalar::new(color.b as f64, color.g as f64, color.r as f64, 0.0)
    }
}

pub const GREEN: Color = Color::rgb(0, 128, 0);
pub const RED: Color = Color::rgb(255, 0, 0);
pub const LIGHT_GREEN: Color = Color::rgb(144, 238, 144);
pub const LIGHT_CORAL: Color = Color::rgb(240, 128, 128);
const WHITE: Color = Color::rgb(255, 255, 255);

pub const BORDER_WIDTH: i32 = 100;
pub const LANDMARK_RADIUS: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub border_width: i32,
    pub border: Color,
    pub background: Color,
    pub opacity: f64,
}

impl OverlayStyle {
    pub fn for_state(state: LookingState) -> Self {
        match state {
            LookingState::Looking => Self {
                border_width: BORDER_WIDTH,
                border: GREEN,
                background: LIGHT_GREEN,
                opacity: 1.0,
            },
            LookingState::NotLooking => Self {
                border_width: BORDER_WIDTH,
                border: RED,
                background: LIGHT_CORAL,
                opacity: 0.5,
            },
        }
    }
}

/// Maps a normalized landmark onto canvas pixels.
pub fn to_canvas_point(x: f32, y: f32, size: Size) -> Point {
    Point::new(
        (x * size.width as f32).round() as i32,
        (y * size.height as f32).round() as i32,
    )
}

/// Highgui window standing in for a styled canvas.
///
/// Cleared pixels show the background color of the current style, as a transparent
/// canvas would.
pub struct WindowCanvas {
    window: String,
    size: Size,
    content: Option<Mat>,
    landmarks: Vec<Point>,
}

impl WindowCanvas {
    pub fn new(window: &str, size: Size) -> anyhow::Result<Self> {
        highgui::named_window_def(window)?;
        Ok(Self {
            window: window.to_owned(),
            size,
            content: None,
            landmarks: Vec::new(),
        })
    }

    /// Polls the window for `q` or `Esc`.
    pub fn quit_requested(&self) -> anyhow::Result<bool> {
        let key = highgui::poll_key()?;
        Ok(key == 'q' as i32 || key == 27)
    }

    fn compose(&self, style: &OverlayStyle) -> anyhow::Result<Mat> {
        let mut canvas = match &self.content {
            Some(content) => content.try_clone()?,
            None => Mat::new_size_with_default(self.size, core::CV_8UC3, style.background.into())?,
        };

        for center in &self.landmarks {
            imgproc::circle(
                &mut canvas,
                *center,
                LANDMARK_RADIUS,
                RED.into(),
                1,
                imgproc::LINE_8,
                0,
            )?;
        }

        let mut bordered = Mat::default();
        core::copy_make_border(
            &canvas,
            &mut bordered,
            style.border_width,
            style.border_width,
            style.border_width,
            style.border_width,
            core::BORDER_CONSTANT,
            style.border.into(),
        )?;

        // opacity covers the border too, faded towards a white page
        if style.opacity < 1.0 {
            let white = Mat::new_size_with_default(bordered.size()?, core::CV_8UC3, WHITE.into())?;
            let mut blended = Mat::default();
            core::add_weighted(
                &bordered,
                style.opacity,
                &white,
                1.0 - style.opacity,
                0.0,
                &mut blended,
                -1,
            )?;
            return Ok(blended);
        }
        Ok(bordered)
    }
}

impl Canvas<Mat> for WindowCanvas {
    fn clear(&mut self) -> anyhow::Result<()> {
        self.content = None;
        self.landmarks.clear();
        Ok(())
    }

    fn draw_frame(&mut self, frame: &Mat) -> anyhow::Result<()> {
        let mut resized = Mat::default();
        imgproc::resize(
            frame,
            &mut resized,
            self.size,
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )?;
        self.content = Some(resized);
        Ok(())
    }

    fn draw_landmarks(&mut self, landmarks: &FaceLandmarks) -> anyhow::Result<()> {
        let size = self.size;
        self.landmarks
            .extend(landmarks.points.iter().map(|p| to_canvas_point(p.x, p.y, size)));
        Ok(())
    }

    fn present(&mut self, state: LookingState) -> anyhow::Result<()> {
        let image = self.compose(&OverlayStyle::for_state(state))?;
        highgui::imshow(&self.window, &image)?;
        Ok(())
    }
}
