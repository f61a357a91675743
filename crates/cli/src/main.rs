use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use ifd_core::detection::domain::backend_registry::BackendRegistry;
use ifd_core::detection::domain::face_detector::FaceDetector;
use ifd_core::detection::domain::rect_smoother::MIN_WINDOW_SIZE;
use ifd_core::detection::infrastructure::backend_config::BackendConfig;
use ifd_core::detection::infrastructure::default_registry::default_registry;
use ifd_core::pipeline::infrastructure::sequential_tracking::SequentialTracking;
use ifd_core::pipeline::infrastructure::threaded_tracking::ThreadedTracking;
use ifd_core::pipeline::track_faces_use_case::{FrameResult, TrackFacesUseCase};
use ifd_core::pipeline::tracking_executor::TrackingExecutor;
use ifd_core::shared::constants::{
    DEFAULT_DETECTION_SCALE, DEFAULT_MIN_CONFIDENCE, DEFAULT_WINDOW_SIZE,
};
use ifd_core::shared::pixel::PixelFormat;
use ifd_core::shared::rect::Rect;
use ifd_core::video::domain::frame_source::FrameSource;
use ifd_core::video::infrastructure::image_sequence_source::ImageSequenceSource;

/// Face detection with temporal smoothing over image sequences.
#[derive(Parser)]
#[command(name = "ifd")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the detection backends compiled into this build, best first.
    Backends(ModelArgs),
    /// Detect faces in a directory of frames or a list of image files.
    Detect(DetectArgs),
}

#[derive(Args)]
struct ModelArgs {
    /// Directory searched for model files before the user cache.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Never download missing models.
    #[arg(long)]
    offline: bool,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_MIN_CONFIDENCE)]
    confidence: f64,
}

#[derive(Args)]
struct DetectArgs {
    /// Image files, or a single directory of frames.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Backend name (default: the best available).
    #[arg(long)]
    backend: Option<String>,

    /// Pixel format handed to the detector (default: the backend's preferred one).
    #[arg(long, value_parser = parse_format)]
    format: Option<PixelFormat>,

    /// Smoothing window in frames (odd, at least 3).
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE)]
    window: usize,

    /// Downscale frames by this factor before detection.
    #[arg(long, default_value_t = DEFAULT_DETECTION_SCALE)]
    scale: u32,

    /// Print one JSON object per frame instead of text.
    #[arg(long)]
    json: bool,

    /// Decode frames on a separate thread.
    #[arg(long)]
    threaded: bool,

    #[command(flatten)]
    model: ModelArgs,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Command::Backends(args) => {
            validate_model_args(&args)?;
            list_backends(&default_registry(&backend_config(&args)));
            Ok(())
        }
        Command::Detect(args) => {
            validate(&args)?;
            run_detect(args)
        }
    }
}

fn list_backends(registry: &BackendRegistry) {
    let default = registry.default_backend();
    for name in registry.names() {
        if name == default {
            println!("{name} (default)");
        } else {
            println!("{name}");
        }
    }
}

fn run_detect(args: DetectArgs) -> Result<(), Box<dyn std::error::Error>> {
    let registry = default_registry(&backend_config(&args.model));

    let provisional = args.format.unwrap_or(PixelFormat::Rgb);
    let mut source = open_source(&args.inputs, provisional, args.scale)?;
    let (width, height) = source.frame_size();

    let detector = match &args.backend {
        Some(name) => FaceDetector::new(&registry, width, height, name)?,
        None => FaceDetector::with_default_backend(&registry, width, height)?,
    };
    let format = args.format.unwrap_or(detector.preferred_format());
    source.set_format(format);
    log::info!(
        "Detecting with '{}' on {} {}x{} {} frames (scale {}, window {})",
        detector.name(),
        source.len(),
        width,
        height,
        format,
        args.scale,
        args.window
    );

    let mut use_case = TrackFacesUseCase::new(detector, args.window, args.scale);
    let executor: Box<dyn TrackingExecutor> = if args.threaded {
        Box::new(ThreadedTracking::default())
    } else {
        Box::new(SequentialTracking)
    };

    let mut faces = 0;
    let mut print_error = None;
    let processed = executor.execute(Box::new(source), &mut use_case, &mut |result| {
        faces += result.raw.len();
        match print_result(result, args.json) {
            Ok(()) => true,
            Err(e) => {
                print_error = Some(e);
                false
            }
        }
    })?;
    if let Some(e) = print_error {
        return Err(e);
    }

    log::info!("Processed {processed} frames, {faces} face detections");
    Ok(())
}

fn open_source(
    inputs: &[PathBuf],
    format: PixelFormat,
    scale: u32,
) -> Result<ImageSequenceSource, Box<dyn std::error::Error>> {
    let source = match inputs {
        [dir] if dir.is_dir() => ImageSequenceSource::from_dir(dir, format, scale)?,
        _ => ImageSequenceSource::new(inputs.to_vec(), format, scale)?,
    };
    Ok(source)
}

fn print_result(result: &FrameResult, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string(result)?);
        return Ok(());
    }
    let rects = |list: &[Rect]| {
        list.iter()
            .map(|r| format!("{}x{}+{}+{}", r.width, r.height, r.x, r.y))
            .collect::<Vec<_>>()
            .join(" ")
    };
    println!(
        "frame {}: {} faces [{}] smoothed [{}] {} fps",
        result.index,
        result.raw.len(),
        rects(&result.raw),
        rects(&result.smoothed),
        result.fps
    );
    Ok(())
}

fn backend_config(args: &ModelArgs) -> BackendConfig {
    BackendConfig {
        min_confidence: args.confidence,
        model_dir: args.model_dir.clone(),
        allow_download: !args.offline,
    }
}

fn validate_model_args(args: &ModelArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&args.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            args.confidence
        )
        .into());
    }
    if let Some(dir) = &args.model_dir {
        if !dir.is_dir() {
            return Err(format!("Model directory not found: {}", dir.display()).into());
        }
    }
    Ok(())
}

fn validate(args: &DetectArgs) -> Result<(), Box<dyn std::error::Error>> {
    validate_model_args(&args.model)?;
    if let Some(missing) = args.inputs.iter().find(|p| !p.exists()) {
        return Err(format!("Input not found: {}", missing.display()).into());
    }
    if args.window < MIN_WINDOW_SIZE || args.window % 2 == 0 {
        return Err(format!(
            "Window must be an odd integer of at least {MIN_WINDOW_SIZE}, got {}",
            args.window
        )
        .into());
    }
    if args.scale == 0 {
        return Err("Scale must be at least 1".into());
    }
    Ok(())
}

fn parse_format(s: &str) -> Result<PixelFormat, String> {
    s.parse()
}
