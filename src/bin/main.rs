use clap::Parser;
use face_attention::models::{self, YUNET_MODEL};
use face_attention::{
    CameraConfig, CameraSource, CancellationToken, DetectorConfig, FrameLoop, FrameLoopConfig,
    FrameScheduler, PoseClassifier, WindowCanvas, YuNetDetector,
};
use opencv::core::Size;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command()]
struct Args {
    /// Camera index.
    #[arg(short, long, default_value_t = 0)]
    camera: i32,

    /// Requested capture width.
    #[arg(long, default_value_t = 640)]
    width: i32,

    /// Requested capture height.
    #[arg(long, default_value_t = 480)]
    height: i32,

    /// Local landmark model. Downloaded to the data directory if omitted.
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Where to fetch the landmark model from.
    #[arg(long, default_value = YUNET_MODEL.url)]
    model_url: String,

    /// Frames per second.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    fps: u32,

    /// Yaw in degrees below which the user counts as looking at the screen.
    #[arg(long, default_value_t = face_attention::pose::DEFAULT_YAW_THRESHOLD_DEGREES)]
    yaw_threshold: f32,

    /// Minimum face detection score.
    #[arg(long, default_value_t = 0.9)]
    score_threshold: f32,

    /// Maximum number of tracked faces.
    #[arg(long, default_value_t = 1)]
    max_faces: usize,

    /// Don't draw landmark points.
    #[arg(long)]
    hide_points: bool,

    /// Verbosity, repeat for more.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args: Args = Args::parse();

    let filter = match args.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // blocking download, has to happen outside the runtime
    let model_path = match &args.model {
        Some(path) => path.clone(),
        None => models::ensure_model(&YUNET_MODEL, &args.model_url, &models::models_dir())?,
    };
    let detector_config = DetectorConfig {
        score_threshold: args.score_threshold,
        max_faces: args.max_faces,
        ..Default::default()
    };
    let detector = YuNetDetector::new(&model_path, &detector_config)?;

    let camera_config = CameraConfig {
        index: args.camera,
        width: args.width,
        height: args.height,
    };
    let camera = match CameraSource::new(&camera_config) {
        Ok(camera) => Some(camera),
        Err(e) => {
            error!("Error accessing the webcam: {:#}", e);
            None
        }
    };

    let canvas = WindowCanvas::new("face attention", Size::new(args.width, args.height))?;
    let loop_config = FrameLoopConfig {
        draw_points: !args.hide_points,
        classifier: PoseClassifier::new(args.yaw_threshold),
    };
    let frame_loop = FrameLoop::new(camera, detector, canvas, loop_config);

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(frame_loop, FrameScheduler::from_fps(args.fps)))
}

async fn run(
    mut frame_loop: FrameLoop<Option<CameraSource>, YuNetDetector, WindowCanvas>,
    scheduler: FrameScheduler,
) -> anyhow::Result<()> {
    let token = CancellationToken::new();

    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            ctrl_c_token.cancel();
        }
    });

    let window_token = token.clone();
    scheduler
        .run(token, |_| {
            frame_loop.step()?;
            if frame_loop.canvas().quit_requested()? {
                window_token.cancel();
            }
            Ok(())
        })
        .await?;

    info!("Stopped, last state: {}", frame_loop.looking_state());
    Ok(())
}
