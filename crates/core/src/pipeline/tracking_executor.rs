use crate::video::domain::frame_source::FrameSource;

use super::track_faces_use_case::{FrameResult, PipelineError, TrackFacesUseCase};

/// Receives each frame's result; returning `false` stops the run.
pub type FrameCallback<'a> = dyn FnMut(&FrameResult) -> bool + 'a;

/// Drives frames from a source through the tracking use case.
///
/// Infrastructure decides how capture and detection are scheduled.
pub trait TrackingExecutor {
    /// Returns the number of frames processed.
    fn execute(
        &self,
        source: Box<dyn FrameSource>,
        use_case: &mut TrackFacesUseCase,
        on_frame: &mut FrameCallback<'_>,
    ) -> Result<usize, PipelineError>;
}
