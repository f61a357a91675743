pub mod sequential_tracking;
pub mod threaded_tracking;
