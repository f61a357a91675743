pub mod backend;
pub mod backend_registry;
pub mod face_detector;
pub mod face_engine;
pub mod rect_smoother;
pub mod stub_backend;
