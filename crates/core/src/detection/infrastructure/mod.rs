pub mod backend_config;
pub mod default_registry;
pub mod engine_backend;
pub mod format_adapter;
#[cfg(feature = "onnx")]
pub mod nms;
#[cfg(feature = "onnx")]
pub mod onnx_blazeface_engine;
#[cfg(feature = "onnx")]
pub mod onnx_session;
#[cfg(feature = "onnx")]
pub mod onnx_yolo_engine;
