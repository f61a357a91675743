pub mod constants;
pub mod fps_counter;
pub mod frame;
pub mod image;
#[cfg(feature = "onnx")]
pub mod model_resolver;
pub mod pixel;
pub mod rect;
