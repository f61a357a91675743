pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// BlazeFace has no published download; it must be placed in the model dir.
pub const BLAZEFACE_MODEL_NAME: &str = "blazeface.onnx";

/// Minimum detection confidence applied by engine backends.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.5;

/// Smoothing window used when none is configured.
pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Frames are downscaled by this factor before detection unless overridden.
pub const DEFAULT_DETECTION_SCALE: u32 = 1;

/// Frames buffered between the capture thread and the detection thread.
pub const FRAME_CHANNEL_CAPACITY: usize = 4;

/// Number of recent frame instants kept by the FPS counter.
pub const FPS_WINDOW: usize = 30;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
