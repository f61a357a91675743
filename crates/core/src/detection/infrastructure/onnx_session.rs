//! ONNX Runtime session setup shared by the ONNX engines.

use std::fmt::Display;
use std::path::Path;

use ndarray::ArrayView3;
use ort::session::Session;

use crate::detection::domain::backend::BackendError;
use crate::shared::pixel::RgbPixel;

/// Preferred ONNX execution providers for the current platform.
///
/// ONNX Runtime falls back to CPU when none of them can be initialized.
pub fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

pub fn load_session(model_path: &Path) -> Result<Session, BackendError> {
    log::info!("Loading ONNX model from {}", model_path.display());
    Session::builder()
        .map_err(session_error)?
        .with_execution_providers(preferred_execution_providers())
        .map_err(session_error)?
        .commit_from_file(model_path)
        .map_err(session_error)
}

/// Height of the model's square NCHW input, if the model declares one.
pub fn square_input_size(session: &Session) -> Option<u32> {
    session.inputs().first().and_then(|input| {
        if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
            if shape.len() >= 4 && shape[2] > 0 {
                return Some(shape[2] as u32);
            }
        }
        None
    })
}

/// Views packed RGB pixels as an `[H, W, C]` array.
pub fn rgb_view(pixels: &[RgbPixel], width: u32, height: u32) -> Result<ArrayView3<'_, u8>, BackendError> {
    let bytes: &[u8] = bytemuck::cast_slice(pixels);
    ArrayView3::from_shape((height as usize, width as usize, 3), bytes).map_err(inference_error)
}

pub fn session_error(e: impl Display) -> BackendError {
    BackendError::Session(e.to_string())
}

pub fn inference_error(e: impl Display) -> BackendError {
    BackendError::Inference(e.to_string())
}
