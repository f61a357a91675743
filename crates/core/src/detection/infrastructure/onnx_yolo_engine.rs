//! YOLO face engine on ONNX Runtime.
//!
//! Letterboxes the frame to the model's square input, runs inference, decodes
//! `[cx, cy, w, h, conf, ...]` rows back into frame coordinates and applies NMS.

use std::path::Path;

use ndarray::ArrayView3;

use crate::detection::domain::backend::BackendError;
use crate::detection::domain::face_engine::{FaceEngine, RawDetection};
use crate::shared::constants::{YOLO_MODEL_NAME, YOLO_MODEL_URL};
use crate::shared::image::Image;
use crate::shared::model_resolver::{self, ModelSource};
use crate::shared::pixel::PixelFormat;

use super::backend_config::BackendConfig;
use super::nms::nms;
use super::onnx_session::{inference_error, load_session, rgb_view, square_input_size};

/// Fallback input resolution when the model's input shape is dynamic.
const DEFAULT_INPUT_SIZE: u32 = 640;

const NMS_IOU_THRESH: f64 = 0.45;

/// Letterbox fill value, YOLO convention.
const PAD_VALUE: f32 = 114.0 / 255.0;

pub struct OnnxYoloEngine {
    session: ort::session::Session,
    input_size: u32,
    candidate_confidence: f64,
}

impl OnnxYoloEngine {
    pub const NAME: &'static str = "yolo";

    /// Resolves the YOLO model (downloading it if allowed) and loads it.
    pub fn load(config: &BackendConfig) -> Result<Self, BackendError> {
        let source = ModelSource {
            name: YOLO_MODEL_NAME,
            url: Some(YOLO_MODEL_URL),
            model_dir: config.model_dir.as_deref(),
            allow_download: config.allow_download,
        };
        let path = model_resolver::resolve(&source, None)?;
        Self::new(&path, config.min_confidence)
    }

    /// Candidates below `candidate_confidence` are dropped before NMS.
    pub fn new(model_path: &Path, candidate_confidence: f64) -> Result<Self, BackendError> {
        let session = load_session(model_path)?;
        let input_size = square_input_size(&session).unwrap_or(DEFAULT_INPUT_SIZE);
        log::info!("YOLO input size {input_size}x{input_size}");
        Ok(Self {
            session,
            input_size,
            candidate_confidence,
        })
    }
}

impl FaceEngine for OnnxYoloEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn preferred_format(&self) -> PixelFormat {
        PixelFormat::Rgb
    }

    fn detect(
        &mut self,
        image: Image<'_>,
        width: u32,
        height: u32,
        detections: &mut Vec<RawDetection>,
    ) -> Result<(), BackendError> {
        let Image::Rgb(pixels) = image else {
            return Err(BackendError::UnexpectedFormat {
                expected: PixelFormat::Rgb,
                actual: image.format(),
            });
        };
        let src = rgb_view(pixels, width, height)?;
        let (input_tensor, letterbox) = letterbox(src, self.input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor).map_err(inference_error)?;
        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(inference_error)?;
        if outputs.len() == 0 {
            return Err(BackendError::Inference("YOLO model produced no outputs".into()));
        }
        let tensor = outputs[0].try_extract_array::<f32>().map_err(inference_error)?;
        let shape = tensor.shape().to_vec();
        let data = tensor
            .as_slice()
            .ok_or_else(|| BackendError::Inference("YOLO output is not contiguous".into()))?;

        decode_output(data, &shape, self.candidate_confidence, &letterbox, detections)?;
        nms(detections, NMS_IOU_THRESH);
        Ok(())
    }
}

/// Mapping from letterboxed model coordinates back to the frame.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Letterbox {
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

impl Letterbox {
    fn to_frame(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.pad_x as f64) / self.scale,
            (y - self.pad_y as f64) / self.scale,
        )
    }
}

/// Letterbox-resize an `[H, W, 3]` image to `target_size × target_size`.
fn letterbox(src: ArrayView3<'_, u8>, target_size: u32) -> (ndarray::Array4<f32>, Letterbox) {
    let (src_h, src_w) = (src.shape()[0], src.shape()[1]);
    let target = target_size as f64;

    let scale = (target / src_w as f64).min(target / src_h as f64);
    let new_w = ((src_w as f64 * scale).round() as u32).min(target_size);
    let new_h = ((src_h as f64 * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let mut tensor = ndarray::Array4::<f32>::from_elem(
        (1, 3, target_size as usize, target_size as usize),
        PAD_VALUE,
    );

    // Nearest-neighbor resize into the padded region.
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, Letterbox { scale, pad_x, pad_y })
}

/// Decodes a `[1, features, candidates]` or `[1, candidates, features]` output.
fn decode_output(
    data: &[f32],
    shape: &[usize],
    min_confidence: f64,
    letterbox: &Letterbox,
    detections: &mut Vec<RawDetection>,
) -> Result<(), BackendError> {
    if shape.len() != 3 {
        return Err(BackendError::Inference(format!(
            "unexpected YOLO output shape {shape:?}"
        )));
    }
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 || data.len() < num_dets * num_feats {
        return Err(BackendError::Inference(format!(
            "YOLO output shape {shape:?} does not match {} values",
            data.len()
        )));
    }

    let value = |det: usize, feat: usize| -> f64 {
        let idx = if transposed {
            feat * num_dets + det
        } else {
            det * num_feats + feat
        };
        data[idx] as f64
    };

    for i in 0..num_dets {
        let confidence = value(i, 4);
        if confidence < min_confidence {
            continue;
        }
        let (cx, cy, w, h) = (value(i, 0), value(i, 1), value(i, 2), value(i, 3));
        let (x1, y1) = letterbox.to_frame(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.to_frame(cx + w / 2.0, cy + h / 2.0);
        detections.push(RawDetection {
            x1,
            y1,
            x2,
            y2,
            confidence,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    // ── Letterbox ──

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        let src = Array3::<u8>::from_elem((100, 200, 3), 128);
        let (tensor, lb) = letterbox(src.view(), 640);

        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert_relative_eq!(lb.scale, 3.2);
        assert_eq!((lb.pad_x, lb.pad_y), (0, 160));
    }

    #[test]
    fn test_letterbox_square_frame() {
        let src = Array3::<u8>::from_elem((100, 100, 3), 128);
        let (_, lb) = letterbox(src.view(), 640);

        assert_relative_eq!(lb.scale, 6.4);
        assert_eq!((lb.pad_x, lb.pad_y), (0, 0));
    }

    #[test]
    fn test_letterbox_values_normalized() {
        let src = Array3::<u8>::from_elem((50, 100, 3), 255);
        let (tensor, lb) = letterbox(src.view(), 640);

        let y = lb.pad_y as usize + 1;
        assert_relative_eq!(tensor[[0, 0, y, 1]], 1.0);
        assert_relative_eq!(tensor[[0, 2, 0, 0]], PAD_VALUE);
    }

    // ── Decoding ──

    const IDENTITY: Letterbox = Letterbox {
        scale: 1.0,
        pad_x: 0,
        pad_y: 0,
    };

    /// Lays out `rows` as `[1, 5, candidates]`, padding with zero-score rows.
    fn transposed_output(rows: &[[f32; 5]], candidates: usize) -> Vec<f32> {
        let mut data = vec![0.0f32; 5 * candidates];
        for (det, row) in rows.iter().enumerate() {
            for (feat, v) in row.iter().enumerate() {
                data[feat * candidates + det] = *v;
            }
        }
        data
    }

    #[test]
    fn test_decode_row_major() {
        // [1, 6 candidates, 5 features]
        let mut data = vec![0.0f32; 6 * 5];
        data[..10].copy_from_slice(&[50.0, 40.0, 20.0, 10.0, 0.9, 5.0, 5.0, 2.0, 2.0, 0.1]);
        let mut dets = Vec::new();

        decode_output(&data, &[1, 6, 5], 0.25, &IDENTITY, &mut dets).unwrap();

        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].x1, 40.0);
        assert_relative_eq!(dets[0].y1, 35.0);
        assert_relative_eq!(dets[0].x2, 60.0);
        assert_relative_eq!(dets[0].y2, 45.0);
        assert_relative_eq!(dets[0].confidence, 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_decode_transposed() {
        let data = transposed_output(&[[0.0; 5], [0.0; 5], [100.0, 100.0, 40.0, 40.0, 0.8]], 6);
        let mut dets = Vec::new();

        decode_output(&data, &[1, 5, 6], 0.25, &IDENTITY, &mut dets).unwrap();

        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].x1, 80.0);
        assert_relative_eq!(dets[0].y2, 120.0);
    }

    #[test]
    fn test_decode_undoes_letterbox() {
        let lb = Letterbox {
            scale: 2.0,
            pad_x: 0,
            pad_y: 100,
        };
        let data = transposed_output(&[[200.0, 300.0, 100.0, 100.0, 0.95]], 8);
        let mut dets = Vec::new();

        decode_output(&data, &[1, 5, 8], 0.5, &lb, &mut dets).unwrap();

        assert_eq!(dets.len(), 1);
        assert_relative_eq!(dets[0].x1, 75.0);
        assert_relative_eq!(dets[0].y1, 75.0);
        assert_relative_eq!(dets[0].x2, 125.0);
        assert_relative_eq!(dets[0].y2, 125.0);
    }

    #[test]
    fn test_decode_rejects_bad_shape() {
        let mut dets = Vec::new();
        let err = decode_output(&[0.0; 4], &[1, 4], 0.5, &IDENTITY, &mut dets).unwrap_err();
        assert!(matches!(err, BackendError::Inference(_)));

        let err = decode_output(&[0.0; 4], &[1, 1, 4], 0.5, &IDENTITY, &mut dets).unwrap_err();
        assert!(matches!(err, BackendError::Inference(_)));
    }
}
