//! BlazeFace (short-range) face engine on ONNX Runtime.
//!
//! Small and fast, but only reliable for faces filling a good part of the
//! frame. No download is published, so the model must already be on disk.

use std::path::Path;

use ndarray::ArrayView3;

use crate::detection::domain::backend::BackendError;
use crate::detection::domain::face_engine::{FaceEngine, RawDetection};
use crate::shared::constants::BLAZEFACE_MODEL_NAME;
use crate::shared::image::Image;
use crate::shared::model_resolver::{self, ModelSource};
use crate::shared::pixel::PixelFormat;

use super::backend_config::BackendConfig;
use super::nms::nms;
use super::onnx_session::{inference_error, load_session, rgb_view};

/// BlazeFace model input resolution.
const INPUT_SIZE: u32 = 128;

const NMS_IOU_THRESH: f64 = 0.3;

/// 16×16 grid × 2 anchors + 8×8 grid × 6 anchors.
const NUM_ANCHORS: usize = 896;

/// Values per anchor in the regressor output: box (4) + 6 keypoints (12).
const REGRESSOR_STRIDE: usize = 16;

pub struct OnnxBlazefaceEngine {
    session: ort::session::Session,
    anchors: Vec<[f32; 2]>,
    candidate_confidence: f64,
}

impl OnnxBlazefaceEngine {
    pub const NAME: &'static str = "blazeface";

    pub fn load(config: &BackendConfig) -> Result<Self, BackendError> {
        let source = ModelSource {
            name: BLAZEFACE_MODEL_NAME,
            url: None,
            model_dir: config.model_dir.as_deref(),
            allow_download: false,
        };
        let path = model_resolver::resolve(&source, None)?;
        Self::new(&path, config.min_confidence)
    }

    pub fn new(model_path: &Path, candidate_confidence: f64) -> Result<Self, BackendError> {
        Ok(Self {
            session: load_session(model_path)?,
            anchors: generate_anchors(),
            candidate_confidence,
        })
    }
}

impl FaceEngine for OnnxBlazefaceEngine {
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
        let input_tensor = preprocess(rgb_view(pixels, width, height)?, INPUT_SIZE);

        let input_value = ort::value::Tensor::from_array(input_tensor).map_err(inference_error)?;
        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(inference_error)?;

        // regressors: [1, 896, 16], classificators: [1, 896, 1]
        if outputs.len() < 2 {
            return Err(BackendError::Inference(format!(
                "BlazeFace model expected 2 outputs, got {}",
                outputs.len()
            )));
        }
        let regressors = outputs[0].try_extract_array::<f32>().map_err(inference_error)?;
        let scores = outputs[1].try_extract_array::<f32>().map_err(inference_error)?;
        let not_contiguous = || BackendError::Inference("BlazeFace output is not contiguous".into());
        let reg_data = regressors.as_slice().ok_or_else(not_contiguous)?;
        let score_data = scores.as_slice().ok_or_else(not_contiguous)?;

        decode(
            reg_data,
            score_data,
            &self.anchors,
            self.candidate_confidence,
            (width, height),
            detections,
        );
        nms(detections, NMS_IOU_THRESH);
        Ok(())
    }
}

/// Resize to `size × size` and normalize to [0,1] NCHW float32.
fn preprocess(src: ArrayView3<'_, u8>, size: u32) -> ndarray::Array4<f32> {
    let (src_h, src_w) = (src.shape()[0], src.shape()[1]);
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    tensor
}

/// Anchor centers for the short-range model, in unit coordinates.
fn generate_anchors() -> Vec<[f32; 2]> {
    let strides = [(8, 2), (16, 6)]; // (stride, anchors_per_cell)
    let mut anchors = Vec::with_capacity(NUM_ANCHORS);

    for &(stride, num) in &strides {
        let grid_size = INPUT_SIZE as usize / stride;
        for y in 0..grid_size {
            for x in 0..grid_size {
                let cx = (x as f32 + 0.5) / grid_size as f32;
                let cy = (y as f32 + 0.5) / grid_size as f32;
                for _ in 0..num {
                    anchors.push([cx, cy]);
                }
            }
        }
    }

    anchors
}

/// Turns anchor-relative regressions into frame-space boxes.
fn decode(
    reg_data: &[f32],
    score_data: &[f32],
    anchors: &[[f32; 2]],
    min_confidence: f64,
    (width, height): (u32, u32),
    detections: &mut Vec<RawDetection>,
) {
    let (fw, fh) = (width as f32, height as f32);
    let input = INPUT_SIZE as f32;

    for (i, (&raw_score, anchor)) in score_data.iter().zip(anchors).enumerate() {
        let score = sigmoid(raw_score) as f64;
        if score < min_confidence {
            continue;
        }
        let offset = i * REGRESSOR_STRIDE;
        let Some(reg) = reg_data.get(offset..offset + 4) else {
            break;
        };

        let cx = anchor[0] + reg[0] / input;
        let cy = anchor[1] + reg[1] / input;
        let w = reg[2] / input;
        let h = reg[3] / input;

        detections.push(RawDetection {
            x1: ((cx - w / 2.0) * fw) as f64,
            y1: ((cy - h / 2.0) * fh) as f64,
            x2: ((cx + w / 2.0) * fw) as f64,
            y2: ((cy + h / 2.0) * fh) as f64,
            confidence: score,
        });
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
