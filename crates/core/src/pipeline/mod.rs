pub mod infrastructure;
pub mod track_faces_use_case;
pub mod tracking_executor;
