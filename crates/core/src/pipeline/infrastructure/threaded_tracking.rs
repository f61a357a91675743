use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::pipeline::track_faces_use_case::{PipelineError, TrackFacesUseCase};
use crate::pipeline::tracking_executor::{FrameCallback, TrackingExecutor};
use crate::shared::constants::FRAME_CHANNEL_CAPACITY;
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{FrameSource, FrameSourceError};

type FrameMessage = Result<Frame, FrameSourceError>;

/// Captures on a dedicated thread while detection runs on the caller's.
///
/// Layout: `capture → bounded channel → detect/smooth → callback`
///
/// Capture of the next frames overlaps detection of the current one. The
/// bounded channel keeps a slow detector from buffering unbounded frames.
pub struct ThreadedTracking {
    channel_capacity: usize,
}

impl ThreadedTracking {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            channel_capacity: channel_capacity.max(1),
        }
    }
}

impl Default for ThreadedTracking {
    fn default() -> Self {
        Self::new(FRAME_CHANNEL_CAPACITY)
    }
}

impl TrackingExecutor for ThreadedTracking {
    fn execute(
        &self,
        source: Box<dyn FrameSource>,
        use_case: &mut TrackFacesUseCase,
        on_frame: &mut FrameCallback<'_>,
    ) -> Result<usize, PipelineError> {
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<FrameMessage>(self.channel_capacity);
        let cancelled = Arc::new(AtomicBool::new(false));

        let capture_handle = spawn_capture(source, frame_tx, cancelled.clone());
        let outcome = run_detection_loop(frame_rx, use_case, on_frame);

        // The receiver is gone by now, so a capture thread blocked on `send` wakes up.
        cancelled.store(true, Ordering::Relaxed);
        let joined = capture_handle.join();

        let processed = outcome?;
        joined.map_err(|_| PipelineError::ThreadPanicked("capture"))?;
        Ok(processed)
    }
}

fn spawn_capture(
    mut source: Box<dyn FrameSource>,
    frame_tx: crossbeam_channel::Sender<FrameMessage>,
    cancelled: Arc<AtomicBool>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        while !cancelled.load(Ordering::Relaxed) {
            let message = match source.next_frame() {
                Ok(Some(frame)) => Ok(frame),
                Ok(None) => break,
                Err(e) => Err(e),
            };
            let failed = message.is_err();
            if frame_tx.send(message).is_err() || failed {
                break;
            }
        }
    })
}

fn run_detection_loop(
    frame_rx: crossbeam_channel::Receiver<FrameMessage>,
    use_case: &mut TrackFacesUseCase,
    on_frame: &mut FrameCallback<'_>,
) -> Result<usize, PipelineError> {
    let mut processed = 0;
    for message in frame_rx {
        let frame = message?;
        let result = use_case.process_frame(&frame)?;
        processed += 1;
        if !on_frame(&result) {
            log::info!("Tracking stopped by caller after {processed} frames");
            break;
        }
    }
    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::backend_registry::BackendRegistry;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::pipeline::infrastructure::sequential_tracking::SequentialTracking;
    use crate::pipeline::track_faces_use_case::FrameResult;
    use crate::video::domain::frame_source::testing::SyntheticSource;

    fn use_case(width: u32, height: u32) -> TrackFacesUseCase {
        let detector = FaceDetector::new(&BackendRegistry::new(), width, height, "stub").unwrap();
        TrackFacesUseCase::new(detector, 5, 1)
    }

    fn collect(executor: &dyn TrackingExecutor, count: usize) -> Vec<FrameResult> {
        let mut results = Vec::new();
        executor
            .execute(
                Box::new(SyntheticSource::new(32, 16, count)),
                &mut use_case(32, 16),
                &mut |r| {
                    results.push(r.clone());
                    true
                },
            )
            .unwrap();
        results
    }

    fn without_fps(results: Vec<FrameResult>) -> Vec<FrameResult> {
        results
            .into_iter()
            .map(|r| FrameResult { fps: 0, ..r })
            .collect()
    }

    #[test]
    fn test_matches_sequential_execution() {
        let threaded = collect(&ThreadedTracking::new(2), 12);
        let sequential = collect(&SequentialTracking, 12);

        assert_eq!(threaded.len(), 12);
        assert_eq!(without_fps(threaded), without_fps(sequential));
    }

    #[test]
    fn test_frames_arrive_in_order() {
        let results = collect(&ThreadedTracking::default(), 20);
        let indices: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(indices, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_callback_stop_does_not_hang_capture() {
        let mut use_case = use_case(8, 8);
        let mut seen = 0;

        let processed = ThreadedTracking::new(1)
            .execute(
                Box::new(SyntheticSource::new(8, 8, 10_000)),
                &mut use_case,
                &mut |_| {
                    seen += 1;
                    seen < 2
                },
            )
            .unwrap();

        assert_eq!(processed, 2);
    }

    #[test]
    fn test_source_error_propagates() {
        let mut use_case = use_case(8, 8);
        let mut source = SyntheticSource::new(8, 8, 10);
        source.fail_at = Some(3);
        let mut seen = 0;

        let err = ThreadedTracking::default()
            .execute(Box::new(source), &mut use_case, &mut |_| {
                seen += 1;
                true
            })
            .unwrap_err();

        assert!(matches!(err, PipelineError::Source(_)));
        assert_eq!(seen, 3);
    }

    #[test]
    fn test_capture_panic_is_reported() {
        let mut use_case = use_case(8, 8);
        let mut source = SyntheticSource::new(8, 8, 10);
        source.panic_at = Some(1);

        let err = ThreadedTracking::default()
            .execute(Box::new(source), &mut use_case, &mut |_| true)
            .unwrap_err();

        assert!(matches!(err, PipelineError::ThreadPanicked("capture")));
    }

    #[test]
    fn test_frame_size_error_stops_capture() {
        let mut use_case = use_case(16, 16);

        let err = ThreadedTracking::new(1)
            .execute(
                Box::new(SyntheticSource::new(8, 8, 10_000)),
                &mut use_case,
                &mut |_| true,
            )
            .unwrap_err();

        assert!(matches!(err, PipelineError::FrameSize { .. }));
    }
}
