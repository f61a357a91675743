//! Face detection core: pixel formats and conversion, pluggable detection
//! backends behind a thread-safe facade, and temporal rectangle smoothing.

pub mod conversion;
pub mod detection;
pub mod pipeline;
pub mod shared;
pub mod video;
