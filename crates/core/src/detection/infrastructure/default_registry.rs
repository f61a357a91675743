use crate::detection::domain::backend_registry::BackendRegistry;

use super::backend_config::BackendConfig;

/// Registry of every backend compiled into this build, best first.
///
/// Engines are constructed lazily by their factories, so listing names never
/// loads or downloads a model.
pub fn default_registry(config: &BackendConfig) -> BackendRegistry {
    #[cfg_attr(not(feature = "onnx"), allow(unused_mut))]
    let mut registry = BackendRegistry::new();

    #[cfg(feature = "onnx")]
    {
        use crate::detection::domain::backend::Backend;
        use super::engine_backend::EngineBackend;
        use super::onnx_blazeface_engine::OnnxBlazefaceEngine;
        use super::onnx_yolo_engine::OnnxYoloEngine;

        let yolo_config = config.clone();
        registry.register(OnnxYoloEngine::NAME, move |width, height| {
            let engine = OnnxYoloEngine::load(&yolo_config)?;
            let backend = EngineBackend::new(engine, width, height, yolo_config.min_confidence);
            Ok(Box::new(backend) as Box<dyn Backend>)
        });

        let blazeface_config = config.clone();
        registry.register(OnnxBlazefaceEngine::NAME, move |width, height| {
            let engine = OnnxBlazefaceEngine::load(&blazeface_config)?;
            let backend =
                EngineBackend::new(engine, width, height, blazeface_config.min_confidence);
            Ok(Box::new(backend) as Box<dyn Backend>)
        });
    }
    #[cfg(not(feature = "onnx"))]
    let _ = config;

    log::debug!("Registered backends: {:?}", registry.names());
    registry
}
