use crate::pipeline::track_faces_use_case::{PipelineError, TrackFacesUseCase};
use crate::pipeline::tracking_executor::{FrameCallback, TrackingExecutor};
use crate::video::domain::frame_source::FrameSource;

/// Captures and detects on the calling thread, one frame at a time.
#[derive(Default)]
pub struct SequentialTracking;

impl TrackingExecutor for SequentialTracking {
    fn execute(
        &self,
        mut source: Box<dyn FrameSource>,
        use_case: &mut TrackFacesUseCase,
        on_frame: &mut FrameCallback<'_>,
    ) -> Result<usize, PipelineError> {
        let mut processed = 0;
        while let Some(frame) = source.next_frame()? {
            let result = use_case.process_frame(&frame)?;
            processed += 1;
            if !on_frame(&result) {
                log::info!("Tracking stopped by caller after {processed} frames");
                break;
            }
        }
        Ok(processed)
    }
}
